use approx::assert_relative_eq;
use rand::{rngs::StdRng, Rng, SeedableRng};

use masklab_image::{GrayImage, Image, ImageSize};
use masklab_imgproc::{
    filter::{
        convolve, convolve_with, kernels, params, saturate_u8, FilterForm, Kernel, KernelSpec,
        MaskSize,
    },
    parallel::ExecutionStrategy,
    FilterError,
};

fn random_image(size: ImageSize, seed: u64) -> GrayImage {
    let mut rng = StdRng::seed_from_u64(seed);
    let data = (0..size.width * size.height)
        .map(|_| rng.random_range(0..=255u8))
        .collect::<Vec<_>>();
    Image::new(size, data).unwrap()
}

/// Straightforward reference: index the source directly and treat outside pixels as zero.
fn reference_correlation(src: &GrayImage, kernel: &Kernel) -> Vec<u8> {
    let c = kernel.center() as isize;
    let (h, w) = (src.height() as isize, src.width() as isize);
    let mut out = Vec::with_capacity(src.as_slice().len());
    for i in 0..h {
        for j in 0..w {
            let mut acc = 0.0f64;
            for ky in 0..kernel.size() as isize {
                for kx in 0..kernel.size() as isize {
                    let (y, x) = (i + ky - c, j + kx - c);
                    if y < 0 || y >= h || x < 0 || x >= w {
                        continue;
                    }
                    let pixel = *src.get(y as usize, x as usize).unwrap() as f64;
                    acc += pixel * kernel.get(ky as usize, kx as usize).unwrap();
                }
            }
            out.push(saturate_u8(acc));
        }
    }
    out
}

#[test]
fn box_5x5_end_to_end() -> Result<(), FilterError> {
    let src = Image::from_size_val([5, 5].into(), 100u8)?;
    let dst = convolve(&src, &kernels::box_kernel(MaskSize::new(3)?))?;

    assert_eq!(dst.size(), src.size());
    for i in 1..4 {
        for j in 1..4 {
            assert_eq!(dst.get(i, j), Some(&100));
        }
    }
    // 4 image pixels and 5 padded zeros
    assert_eq!(dst.get(0, 0), Some(&44));
    assert_eq!(dst.get(4, 4), Some(&44));
    Ok(())
}

#[test]
fn output_has_input_size() -> Result<(), FilterError> {
    let src = random_image([13, 7].into(), 1);
    for size in MaskSize::all() {
        let dst = convolve(&src, &kernels::gaussian_kernel(size, None)?)?;
        assert_eq!(dst.size(), src.size());
    }
    Ok(())
}

#[test]
fn constant_image_interior_is_preserved() -> Result<(), FilterError> {
    for value in [0u8, 1, 37, 128, 254, 255] {
        let src = Image::from_size_val([25, 25].into(), value)?;
        for size in MaskSize::all() {
            let n = size.get();
            let pad = n / 2;
            for kernel in [
                kernels::box_kernel(size),
                kernels::gaussian_kernel(size, None)?,
                kernels::gaussian_kernel(size, Some(3.0))?,
            ] {
                let dst = convolve(&src, &kernel)?;
                for i in pad..25 - pad {
                    for j in pad..25 - pad {
                        assert_eq!(dst.get(i, j), Some(&value), "size {n} at ({i}, {j})");
                    }
                }
            }
        }
    }
    Ok(())
}

#[test]
fn matches_reference_on_random_images() -> Result<(), FilterError> {
    let src = random_image([17, 11].into(), 7);
    let asymmetric = vec![
        vec![0.0, -1.0, 2.0],
        vec![1.0, 0.5, -3.0],
        vec![4.0, 0.0, 1.0],
    ];
    let candidates = [
        kernels::box_kernel(MaskSize::new(3)?),
        kernels::gaussian_kernel(MaskSize::new(7)?, Some(1.5))?,
        kernels::custom_kernel(&asymmetric, 3.0)?,
        kernels::box_kernel(MaskSize::new(21)?),
    ];
    for kernel in &candidates {
        let dst = convolve(&src, kernel)?;
        assert_eq!(dst.as_slice(), reference_correlation(&src, kernel).as_slice());
    }
    Ok(())
}

#[test]
fn strategies_are_bit_identical() -> Result<(), FilterError> {
    let src = random_image([64, 48].into(), 3);
    let kernel = kernels::gaussian_kernel(MaskSize::new(9)?, None)?;
    let serial = convolve_with(&src, &kernel, ExecutionStrategy::Serial)?;
    let rows = convolve_with(&src, &kernel, ExecutionStrategy::ParallelRows)?;
    let fixed = convolve_with(&src, &kernel, ExecutionStrategy::Fixed(3))?;
    assert_eq!(serial, rows);
    assert_eq!(serial, fixed);
    Ok(())
}

#[test]
fn custom_kernel_keeps_user_divisor() -> Result<(), FilterError> {
    let matrix = vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0], vec![7.0, 8.0, 9.0]];
    let kernel = kernels::custom_kernel(&matrix, 10.0)?;
    for (i, row) in matrix.iter().enumerate() {
        for (j, &value) in row.iter().enumerate() {
            assert_eq!(kernel.get(i, j), Some(value / 10.0));
        }
    }
    assert_relative_eq!(kernel.sum(), 4.5, epsilon = 1e-12);
    Ok(())
}

#[test]
fn gaussian_rejects_unparsable_sigma() -> Result<(), FilterError> {
    let err = params::parse_sigma("abc").unwrap_err();
    assert!(matches!(err, FilterError::InvalidParameter { .. }));

    let mut form = FilterForm::new("gaussian", 5);
    form.sigma = Some("abc".into());
    assert_eq!(
        KernelSpec::try_from(&form).unwrap_err().parameter(),
        Some("sigma")
    );
    Ok(())
}

#[test]
fn custom_rejects_bad_cell_without_partial_kernel() {
    let rows = vec![
        vec!["1", "1", "1"],
        vec!["1", "x", "1"],
        vec!["1", "1", "1"],
    ];
    let res = params::parse_mask(&rows, "2.0");
    match res {
        Err(FilterError::InvalidParameter { name, .. }) => assert_eq!(name, "mask[1][1]"),
        other => panic!("expected an invalid cell, got {other:?}"),
    }
}

#[test]
fn laplacian_sharpen_from_text() -> Result<(), FilterError> {
    let rows = params::parse_mask_rows("0 -1 0; -1 5 -1; 0 -1 0");
    let kernel = params::parse_mask(&rows, "1")?;

    let src = Image::from_size_slice(
        [3, 3].into(),
        &[10u8, 10, 10, 10, 50, 10, 10, 10, 10],
    )?;
    let dst = convolve(&src, &kernel)?;

    // center: 5 * 50 - 4 * 10; top middle: 5 * 10 - 10 - 10 - 50
    assert_eq!(dst.get(1, 1), Some(&210));
    assert_eq!(dst.get(0, 1), Some(&0));
    // corner: 5 * 10 - 10 - 10
    assert_eq!(dst.get(0, 0), Some(&30));
    Ok(())
}

#[test]
fn huge_weights_clip_instead_of_vanishing() -> Result<(), FilterError> {
    let rows = params::parse_mask_rows("1 1 1; 1 1 1; 1 1 1");
    let err = params::parse_mask(&rows, "1e-320").unwrap_err();
    assert_eq!(err.parameter(), Some("mask[0][0]"));

    // large but finite weights still saturate, padded zeros included
    let kernel = params::parse_mask(&rows, "1e-300")?;
    let src = Image::from_size_slice([3, 1].into(), &[0u8, 100, 0])?;
    let dst = convolve(&src, &kernel)?;
    assert_eq!(dst.as_slice(), &[255, 255, 255]);
    Ok(())
}

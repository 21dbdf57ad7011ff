use masklab_image::{GrayImage, ImageError};

use super::kernels::Kernel;
use crate::{
    error::FilterError,
    padding::{pad_zeros, Padding2D},
    parallel::{self, ExecutionStrategy},
};

/// Clip a filtered value to the 8-bit range and round it to the nearest integer.
#[inline]
pub fn saturate_u8(value: f64) -> u8 {
    value.clamp(0.0, 255.0).round() as u8
}

/// Apply a 2D kernel to a grayscale image with zero padding.
///
/// The image is padded with `kernel.size() / 2` zero pixels on every side and
/// the kernel is slid over every pixel without being flipped, i.e. each output
/// pixel is the weighted sum of its neighbourhood (correlation). The sum is
/// clipped to `[0, 255]` and rounded.
///
/// The cost is `O(height * width * size²)`.
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W).
/// * `dst` - The destination image with shape (H, W).
/// * `kernel` - The kernel to apply.
/// * `strategy` - How output rows are scheduled.
///
/// PRECONDITION: `src` and `dst` must have the same shape.
pub fn filter2d(
    src: &GrayImage,
    dst: &mut GrayImage,
    kernel: &Kernel,
    strategy: ExecutionStrategy,
) -> Result<(), FilterError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            dst.width(),
            dst.height(),
            src.width(),
            src.height(),
        )
        .into());
    }

    let ksize = kernel.size();
    let padded = pad_zeros(src, &Padding2D::uniform(kernel.center()))?;
    let padded_cols = padded.cols();
    let padded_data = padded.as_slice();
    let weights = kernel.as_slice();

    parallel::par_iter_rows_indexed(dst.as_slice_mut(), src.cols(), strategy, |row, dst_row| {
        for (col, dst_pixel) in dst_row.iter_mut().enumerate() {
            let mut acc = 0.0f64;
            for (ky, kernel_row) in weights.chunks_exact(ksize).enumerate() {
                let start = (row + ky) * padded_cols + col;
                let window = &padded_data[start..start + ksize];
                for (&pixel, &weight) in window.iter().zip(kernel_row) {
                    acc += pixel as f64 * weight;
                }
            }
            *dst_pixel = saturate_u8(acc);
        }
    })?;

    Ok(())
}

/// Apply a 2D kernel to a grayscale image, returning a new image.
///
/// Runs on the calling thread. See [`filter2d`] for the details.
///
/// # Example
///
/// ```
/// use masklab_image::Image;
/// use masklab_imgproc::filter::{convolve, kernels};
///
/// let src = Image::from_size_val([5, 5].into(), 100u8).unwrap();
/// let kernel = kernels::box_kernel(kernels::MaskSize::new(3).unwrap());
/// let dst = convolve(&src, &kernel).unwrap();
///
/// assert_eq!(dst.get(2, 2), Some(&100));
/// assert_eq!(dst.get(0, 0), Some(&44));
/// ```
pub fn convolve(src: &GrayImage, kernel: &Kernel) -> Result<GrayImage, FilterError> {
    convolve_with(src, kernel, ExecutionStrategy::Serial)
}

/// Apply a 2D kernel to a grayscale image with the given execution strategy.
pub fn convolve_with(
    src: &GrayImage,
    kernel: &Kernel,
    strategy: ExecutionStrategy,
) -> Result<GrayImage, FilterError> {
    let mut dst = GrayImage::from_size_val(src.size(), 0)?;
    filter2d(src, &mut dst, kernel, strategy)?;
    Ok(dst)
}

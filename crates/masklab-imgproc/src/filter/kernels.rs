use std::{fmt, str::FromStr};

use crate::error::FilterError;

/// The smallest accepted mask size.
pub const MIN_MASK_SIZE: usize = 3;

/// The largest accepted mask size.
pub const MAX_MASK_SIZE: usize = 21;

/// The side length of a box or gaussian mask.
///
/// Always odd and within [`MIN_MASK_SIZE`]..=[`MAX_MASK_SIZE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct MaskSize(usize);

impl MaskSize {
    /// Validate a mask size.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::InvalidParameter`] if `size` is even or out of range.
    pub fn new(size: usize) -> Result<Self, FilterError> {
        if size % 2 == 0 {
            return Err(FilterError::invalid(
                "mask_size",
                format!("{size} is not odd"),
            ));
        }
        if !(MIN_MASK_SIZE..=MAX_MASK_SIZE).contains(&size) {
            return Err(FilterError::invalid(
                "mask_size",
                format!("{size} is outside [{MIN_MASK_SIZE}, {MAX_MASK_SIZE}]"),
            ));
        }
        Ok(Self(size))
    }

    /// The side length in pixels.
    pub fn get(self) -> usize {
        self.0
    }

    /// Iterate over every valid mask size.
    pub fn all() -> impl Iterator<Item = MaskSize> {
        (MIN_MASK_SIZE..=MAX_MASK_SIZE).step_by(2).map(MaskSize)
    }
}

impl TryFrom<usize> for MaskSize {
    type Error = FilterError;

    fn try_from(size: usize) -> Result<Self, Self::Error> {
        MaskSize::new(size)
    }
}

impl FromStr for MaskSize {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let size = s
            .trim()
            .parse::<usize>()
            .map_err(|_| FilterError::invalid("mask_size", format!("`{s}` is not an integer")))?;
        MaskSize::new(size)
    }
}

impl fmt::Display for MaskSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A square matrix of filter weights with an odd side length.
///
/// Weights are stored row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct Kernel {
    size: usize,
    data: Vec<f64>,
}

impl Kernel {
    /// The side length of the kernel.
    pub fn size(&self) -> usize {
        self.size
    }

    /// The index of the center row and column.
    pub fn center(&self) -> usize {
        self.size / 2
    }

    /// The weight at `(row, col)`, or `None` if out of bounds.
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row >= self.size || col >= self.size {
            return None;
        }
        Some(self.data[row * self.size + col])
    }

    /// The weights as a row-major slice.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Iterate over the rows of the kernel.
    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        self.data.chunks_exact(self.size)
    }

    /// The sum of all weights.
    pub fn sum(&self) -> f64 {
        self.data.iter().sum()
    }
}

impl fmt::Display for Kernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.rows() {
            let cells = row
                .iter()
                .map(|w| format!("{w:>9.5}"))
                .collect::<Vec<_>>()
                .join(" ");
            writeln!(f, "[{cells} ]")?;
        }
        Ok(())
    }
}

/// Create a box (averaging) kernel.
///
/// Every weight is `1 / size²`.
///
/// # Example
///
/// ```
/// use masklab_imgproc::filter::kernels::{box_kernel, MaskSize};
///
/// let kernel = box_kernel(MaskSize::new(3).unwrap());
/// assert_eq!(kernel.size(), 3);
/// assert!(kernel.as_slice().iter().all(|&w| w == 1.0 / 9.0));
/// ```
pub fn box_kernel(size: MaskSize) -> Kernel {
    let size = size.get();
    let weight = 1.0 / (size * size) as f64;
    Kernel {
        size,
        data: vec![weight; size * size],
    }
}

/// The sigma used when none is given, `size / 6`.
pub fn auto_sigma(size: MaskSize) -> f64 {
    size.get() as f64 / 6.0
}

/// Create a normalized 2D gaussian kernel.
///
/// # Arguments
///
/// * `size` - The side length of the kernel.
/// * `sigma` - The standard deviation. `None` selects [`auto_sigma`].
///
/// # Errors
///
/// Returns [`FilterError::InvalidParameter`] if `sigma` is given but not a
/// finite positive number.
pub fn gaussian_kernel(size: MaskSize, sigma: Option<f64>) -> Result<Kernel, FilterError> {
    let sigma = match sigma {
        None => auto_sigma(size),
        Some(s) if s.is_finite() && s > 0.0 => s,
        Some(s) => {
            return Err(FilterError::invalid(
                "sigma",
                format!("{s} is not a positive number"),
            ))
        }
    };

    let size = size.get();
    let center = (size / 2) as f64;
    let two_sigma_sq = 2.0 * sigma * sigma;

    // compute the kernel
    let mut data = Vec::with_capacity(size * size);
    for i in 0..size {
        for j in 0..size {
            let x = i as f64 - center;
            let y = j as f64 - center;
            data.push((-(x * x + y * y) / two_sigma_sq).exp());
        }
    }

    // normalize the kernel
    let norm = data.iter().sum::<f64>();
    data.iter_mut().for_each(|k| *k /= norm);

    log::debug!("gaussian kernel: size={size} sigma={sigma}");

    Ok(Kernel { size, data })
}

/// Create a kernel from a user matrix divided by a scalar.
///
/// The result is `matrix[i][j] / divisor` and is not normalized, so classic
/// integer masks such as Sobel or Laplacian can be entered with their natural
/// divisor.
///
/// # Errors
///
/// Returns [`FilterError::InvalidParameter`] if the matrix is empty, not square,
/// has an even side, contains a non-finite cell or a cell whose quotient
/// overflows, or if `divisor` is zero or not finite.
pub fn custom_kernel(matrix: &[Vec<f64>], divisor: f64) -> Result<Kernel, FilterError> {
    let size = matrix.len();
    if size == 0 {
        return Err(FilterError::invalid("mask", "the matrix is empty"));
    }
    if size % 2 == 0 {
        return Err(FilterError::invalid(
            "mask",
            format!("side length {size} is not odd"),
        ));
    }
    if let Some((i, row)) = matrix.iter().enumerate().find(|(_, r)| r.len() != size) {
        return Err(FilterError::invalid(
            format!("mask[{i}]"),
            format!("expected {size} cells, got {}", row.len()),
        ));
    }
    if !divisor.is_finite() || divisor == 0.0 {
        return Err(FilterError::invalid(
            "divisor",
            format!("{divisor} is not a finite nonzero number"),
        ));
    }

    let mut data = Vec::with_capacity(size * size);
    for (i, row) in matrix.iter().enumerate() {
        for (j, &value) in row.iter().enumerate() {
            if !value.is_finite() {
                return Err(FilterError::invalid(
                    format!("mask[{i}][{j}]"),
                    format!("{value} is not a finite number"),
                ));
            }
            let weight = value / divisor;
            if !weight.is_finite() {
                return Err(FilterError::invalid(
                    format!("mask[{i}][{j}]"),
                    format!("{value} / {divisor} overflows"),
                ));
            }
            data.push(weight);
        }
    }

    Ok(Kernel { size, data })
}

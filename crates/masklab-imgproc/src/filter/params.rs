//! Parsing of free-form filter parameters into typed kernel specifications.
//!
//! Values usually arrive as text typed by a user. They are parsed and validated
//! once here, so the kernel builders and the convolution only see typed input.

use std::{fmt, str::FromStr};

use serde::Deserialize;

use super::kernels::{self, Kernel, MaskSize};
use crate::error::FilterError;

/// The family of mask to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterType {
    /// Uniform averaging mask.
    Box,
    /// Normalized gaussian mask.
    Gaussian,
    /// User matrix divided by a scalar.
    Custom,
}

impl FromStr for FilterType {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "box" | "smoothing" | "box(smoothing)" => Ok(FilterType::Box),
            "gaussian" => Ok(FilterType::Gaussian),
            "custom" | "other" => Ok(FilterType::Custom),
            _ => Err(FilterError::invalid(
                "filter",
                format!("unknown filter type `{s}`"),
            )),
        }
    }
}

impl fmt::Display for FilterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FilterType::Box => "box",
            FilterType::Gaussian => "gaussian",
            FilterType::Custom => "custom",
        };
        write!(f, "{name}")
    }
}

fn parse_number(name: &str, text: &str) -> Result<f64, FilterError> {
    let value = text
        .trim()
        .parse::<f64>()
        .map_err(|_| FilterError::invalid(name, format!("`{text}` is not a number")))?;
    if !value.is_finite() {
        return Err(FilterError::invalid(
            name,
            format!("`{text}` is not a finite number"),
        ));
    }
    Ok(value)
}

/// Parse a sigma field.
///
/// An empty field or `auto` (any case) selects the automatic sigma and yields `None`.
///
/// # Errors
///
/// Returns [`FilterError::InvalidParameter`] if the text is not a positive number.
///
/// # Example
///
/// ```
/// use masklab_imgproc::filter::params::parse_sigma;
///
/// assert_eq!(parse_sigma("Auto").unwrap(), None);
/// assert_eq!(parse_sigma("1.5").unwrap(), Some(1.5));
/// assert!(parse_sigma("abc").is_err());
/// ```
pub fn parse_sigma(text: &str) -> Result<Option<f64>, FilterError> {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("auto") {
        return Ok(None);
    }
    let sigma = parse_number("sigma", text)?;
    if sigma <= 0.0 {
        return Err(FilterError::invalid(
            "sigma",
            format!("`{text}` is not a positive number"),
        ));
    }
    Ok(Some(sigma))
}

/// Parse the divisor applied to a custom mask.
///
/// # Errors
///
/// Returns [`FilterError::InvalidParameter`] if the text is not a finite nonzero number.
pub fn parse_divisor(text: &str) -> Result<f64, FilterError> {
    let divisor = parse_number("divisor", text)?;
    if divisor == 0.0 {
        return Err(FilterError::invalid("divisor", "must not be zero"));
    }
    Ok(divisor)
}

/// Parse a grid of text cells into numbers.
///
/// # Errors
///
/// Returns [`FilterError::InvalidParameter`] naming the first cell, as
/// `mask[row][col]`, that is not a finite number.
pub fn parse_matrix<S: AsRef<str>>(rows: &[Vec<S>]) -> Result<Vec<Vec<f64>>, FilterError> {
    rows.iter()
        .enumerate()
        .map(|(i, row)| {
            row.iter()
                .enumerate()
                .map(|(j, cell)| parse_number(&format!("mask[{i}][{j}]"), cell.as_ref()))
                .collect::<Result<Vec<f64>, FilterError>>()
        })
        .collect()
}

/// Parse a grid of text cells and a divisor into a custom kernel.
///
/// No kernel is returned unless every cell and the divisor are valid.
pub fn parse_mask<S: AsRef<str>>(rows: &[Vec<S>], divisor: &str) -> Result<Kernel, FilterError> {
    let matrix = parse_matrix(rows)?;
    let divisor = parse_divisor(divisor)?;
    kernels::custom_kernel(&matrix, divisor)
}

/// Split a textual grid into cells.
///
/// Rows are separated by `;` or newlines and cells by `,` or whitespace. Blank
/// rows are skipped.
///
/// # Example
///
/// ```
/// use masklab_imgproc::filter::params::parse_mask_rows;
///
/// let rows = parse_mask_rows("1, 0, -1; 2 0 -2\n1,0,-1");
/// assert_eq!(rows.len(), 3);
/// assert_eq!(rows[1], vec!["2", "0", "-2"]);
/// ```
pub fn parse_mask_rows(text: &str) -> Vec<Vec<String>> {
    text.split(|c: char| c == ';' || c == '\n')
        .map(|row| {
            row.split(|c: char| c == ',' || c.is_whitespace())
                .filter(|cell| !cell.is_empty())
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
        .filter(|row| !row.is_empty())
        .collect()
}

/// A form field that may be written as text or as a number.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// A numeric value.
    Number(f64),
    /// A value still to be parsed.
    Text(String),
}

impl FieldValue {
    fn text(&self) -> String {
        match self {
            FieldValue::Number(v) => v.to_string(),
            FieldValue::Text(s) => s.clone(),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Number(v)
    }
}

fn default_mask_size() -> usize {
    kernels::MIN_MASK_SIZE
}

/// The raw filter parameters as entered by a user.
///
/// Missing optional fields take the defaults of an empty form: sigma `auto`,
/// divisor `1` and a custom grid of zeros.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FilterForm {
    /// The filter type name, see [`FilterType`].
    pub filter: String,
    /// The mask side length.
    #[serde(default = "default_mask_size")]
    pub mask_size: usize,
    /// The gaussian sigma, or `auto`.
    #[serde(default)]
    pub sigma: Option<FieldValue>,
    /// The divisor applied to a custom mask.
    #[serde(default)]
    pub divisor: Option<FieldValue>,
    /// The custom mask cells, `mask_size` rows of `mask_size` cells.
    #[serde(default)]
    pub mask: Option<Vec<Vec<FieldValue>>>,
}

impl FilterForm {
    /// Create a form for the given filter type and mask size with default fields.
    pub fn new(filter: impl Into<String>, mask_size: usize) -> Self {
        Self {
            filter: filter.into(),
            mask_size,
            sigma: None,
            divisor: None,
            mask: None,
        }
    }
}

/// A validated kernel description.
#[derive(Debug, Clone, PartialEq)]
pub enum KernelSpec {
    /// Uniform averaging mask.
    Box {
        /// The side length.
        size: MaskSize,
    },
    /// Normalized gaussian mask.
    Gaussian {
        /// The side length.
        size: MaskSize,
        /// The sigma, `None` for automatic.
        sigma: Option<f64>,
    },
    /// User matrix divided by a scalar.
    Custom {
        /// The matrix cells.
        matrix: Vec<Vec<f64>>,
        /// The divisor.
        divisor: f64,
    },
}

impl KernelSpec {
    /// The filter family of this spec.
    pub fn filter_type(&self) -> FilterType {
        match self {
            KernelSpec::Box { .. } => FilterType::Box,
            KernelSpec::Gaussian { .. } => FilterType::Gaussian,
            KernelSpec::Custom { .. } => FilterType::Custom,
        }
    }

    /// Build the kernel described by this spec.
    pub fn build(&self) -> Result<Kernel, FilterError> {
        match self {
            KernelSpec::Box { size } => Ok(kernels::box_kernel(*size)),
            KernelSpec::Gaussian { size, sigma } => kernels::gaussian_kernel(*size, *sigma),
            KernelSpec::Custom { matrix, divisor } => kernels::custom_kernel(matrix, *divisor),
        }
    }
}

impl TryFrom<&FilterForm> for KernelSpec {
    type Error = FilterError;

    fn try_from(form: &FilterForm) -> Result<Self, Self::Error> {
        let filter_type = form.filter.parse::<FilterType>()?;
        let size = MaskSize::new(form.mask_size)?;

        let spec = match filter_type {
            FilterType::Box => KernelSpec::Box { size },
            FilterType::Gaussian => {
                let sigma = match &form.sigma {
                    None => None,
                    Some(value) => parse_sigma(&value.text())?,
                };
                KernelSpec::Gaussian { size, sigma }
            }
            FilterType::Custom => {
                let n = size.get();
                let matrix = match &form.mask {
                    None => vec![vec![0.0; n]; n],
                    Some(rows) => {
                        if rows.len() != n || rows.iter().any(|row| row.len() != n) {
                            return Err(FilterError::invalid(
                                "mask",
                                format!("expected a {n}x{n} grid"),
                            ));
                        }
                        let cells = rows
                            .iter()
                            .map(|row| row.iter().map(FieldValue::text).collect::<Vec<_>>())
                            .collect::<Vec<_>>();
                        parse_matrix(&cells)?
                    }
                };
                let divisor = match &form.divisor {
                    None => 1.0,
                    Some(value) => parse_divisor(&value.text())?,
                };
                KernelSpec::Custom { matrix, divisor }
            }
        };

        Ok(spec)
    }
}

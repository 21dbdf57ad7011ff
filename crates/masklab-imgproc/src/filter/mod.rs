//! Filter operations
//!
//! This module provides the spatial filter kernels and the 2D convolution.

/// Filter kernels
pub mod kernels;

/// Parsing of user supplied filter parameters
pub mod params;

/// 2D convolution with zero padding
mod convolution;
pub use convolution::*;

pub use kernels::{Kernel, MaskSize};
pub use params::{FilterForm, FilterType, KernelSpec};

#![deny(missing_docs)]
//! Image types for generating and manipulating single channel images

/// image representation for spatial filtering.
pub mod image;

/// Error types for the image module.
pub mod error;

pub use crate::error::ImageError;
pub use crate::image::{GrayImage, Image, ImageSize};

#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// error types for the filtering operations.
pub mod error;

/// image filtering module.
pub mod filter;

/// image padding module.
pub mod padding;

/// module containing parallization utilities.
pub mod parallel;

/// filter session holding the loaded image.
pub mod session;

pub use error::FilterError;

use masklab_image::ImageError;

use crate::parallel::ParallelError;

/// An error type for the filtering operations.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum FilterError {
    /// A caller supplied value was malformed or out of range.
    #[error("Invalid parameter `{name}`: {reason}")]
    InvalidParameter {
        /// The parameter that was rejected, e.g. `sigma` or `mask[1][2]`.
        name: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// The filter was applied before an image was loaded.
    #[error("No input image has been loaded")]
    MissingInput,

    /// Error from the image container.
    #[error(transparent)]
    ImageError(#[from] ImageError),

    /// Error from the parallel execution backend.
    #[error(transparent)]
    ParallelError(#[from] ParallelError),
}

impl FilterError {
    pub(crate) fn invalid(name: impl Into<String>, reason: impl Into<String>) -> Self {
        FilterError::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// The name of the rejected parameter, if this is an [`FilterError::InvalidParameter`].
    pub fn parameter(&self) -> Option<&str> {
        match self {
            FilterError::InvalidParameter { name, .. } => Some(name),
            _ => None,
        }
    }
}

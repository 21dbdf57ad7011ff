use std::time::{Duration, Instant};

use masklab_image::GrayImage;

use crate::{
    error::FilterError,
    filter::{filter2d, FilterForm, Kernel, KernelSpec},
    parallel::ExecutionStrategy,
};

/// The result of applying a filter in a [`FilterSession`].
#[derive(Debug, Clone)]
pub struct FilterOutput {
    /// The filtered image, same size as the input.
    pub image: GrayImage,
    /// The kernel that was applied.
    pub kernel: Kernel,
    /// Wall-clock time spent in the convolution.
    pub elapsed: Duration,
}

/// Holds the currently loaded image and applies filters to it.
///
/// # Example
///
/// ```
/// use masklab_image::Image;
/// use masklab_imgproc::{filter::FilterForm, session::FilterSession, FilterError};
///
/// let mut session = FilterSession::new();
/// let form = FilterForm::new("box", 3);
/// assert!(matches!(session.apply_form(&form), Err(FilterError::MissingInput)));
///
/// session.set_image(Image::from_size_val([8, 8].into(), 10u8).unwrap());
/// let output = session.apply_form(&form).unwrap();
/// assert_eq!(output.image.width(), 8);
/// ```
#[derive(Debug, Clone, Default)]
pub struct FilterSession {
    image: Option<GrayImage>,
    strategy: ExecutionStrategy,
}

impl FilterSession {
    /// Create an empty session that filters serially.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use the given execution strategy for the convolution.
    pub fn with_strategy(mut self, strategy: ExecutionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Replace the loaded image.
    pub fn set_image(&mut self, image: GrayImage) {
        log::debug!("loaded image {}", image.size());
        self.image = Some(image);
    }

    /// The loaded image, if any.
    pub fn image(&self) -> Option<&GrayImage> {
        self.image.as_ref()
    }

    /// Drop the loaded image.
    pub fn clear(&mut self) {
        self.image = None;
    }

    /// Build the kernel described by `spec` and apply it to the loaded image.
    ///
    /// Only the convolution itself is timed.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::MissingInput`] if no image is loaded, before the
    /// kernel is built, and [`FilterError::InvalidParameter`] if the kernel is invalid.
    pub fn apply(&self, spec: &KernelSpec) -> Result<FilterOutput, FilterError> {
        let image = self.image.as_ref().ok_or(FilterError::MissingInput)?;
        let kernel = spec.build()?;

        let mut dst = GrayImage::from_size_val(image.size(), 0)?;

        let start = Instant::now();
        filter2d(image, &mut dst, &kernel, self.strategy)?;
        let elapsed = start.elapsed();

        log::debug!(
            "{} filter {}x{} on {}: {:?}",
            spec.filter_type(),
            kernel.size(),
            kernel.size(),
            image.size(),
            elapsed
        );

        Ok(FilterOutput {
            image: dst,
            kernel,
            elapsed,
        })
    }

    /// Parse `form` and apply the resulting kernel to the loaded image.
    ///
    /// The image is checked before the form is parsed.
    pub fn apply_form(&self, form: &FilterForm) -> Result<FilterOutput, FilterError> {
        if self.image.is_none() {
            return Err(FilterError::MissingInput);
        }
        let spec = KernelSpec::try_from(form)?;
        self.apply(&spec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::MaskSize;
    use masklab_image::Image;

    #[test]
    fn test_missing_input() -> Result<(), FilterError> {
        let session = FilterSession::new();
        let spec = KernelSpec::Box {
            size: MaskSize::new(3)?,
        };
        assert_eq!(session.apply(&spec).unwrap_err(), FilterError::MissingInput);

        // an invalid form still reports the missing image first
        let form = FilterForm::new("box", 4);
        assert_eq!(
            session.apply_form(&form).unwrap_err(),
            FilterError::MissingInput
        );
        Ok(())
    }

    #[test]
    fn test_invalid_form_leaves_session_untouched() -> Result<(), FilterError> {
        let mut session = FilterSession::new();
        let image = Image::from_size_val([4, 4].into(), 50u8)?;
        session.set_image(image.clone());

        let mut form = FilterForm::new("gaussian", 5);
        form.sigma = Some("abc".into());
        let err = session.apply_form(&form).unwrap_err();
        assert_eq!(err.parameter(), Some("sigma"));
        assert_eq!(session.image(), Some(&image));
        Ok(())
    }

    #[test]
    fn test_apply_strategies_agree() -> Result<(), FilterError> {
        let data = (0..64u32).map(|v| (v * 37 % 256) as u8).collect::<Vec<_>>();
        let image = Image::new([8, 8].into(), data)?;
        let spec = KernelSpec::Gaussian {
            size: MaskSize::new(5)?,
            sigma: Some(1.2),
        };

        let mut serial = FilterSession::new();
        serial.set_image(image.clone());
        let mut parallel = FilterSession::new().with_strategy(ExecutionStrategy::ParallelRows);
        parallel.set_image(image);

        let a = serial.apply(&spec)?;
        let b = parallel.apply(&spec)?;
        assert_eq!(a.image, b.image);
        assert_eq!(a.kernel, b.kernel);
        Ok(())
    }

    #[test]
    fn test_clear() -> Result<(), FilterError> {
        let mut session = FilterSession::new();
        session.set_image(Image::from_size_val([2, 2].into(), 0u8)?);
        assert!(session.image().is_some());
        session.clear();
        assert!(session.image().is_none());
        Ok(())
    }
}

use masklab_image::{Image, ImageError, ImageSize};

/// Represents 2D padding with top, bottom, left, and right values (in pixels).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Padding2D {
    /// Amount of padding to add on the top side.
    pub top: usize,
    /// Amount of padding to add on the bottom side.
    pub bottom: usize,
    /// Amount of padding to add on the left side.
    pub left: usize,
    /// Amount of padding to add on the right side.
    pub right: usize,
}

impl Padding2D {
    /// The same amount of padding on every side.
    pub fn uniform(pad: usize) -> Self {
        Self {
            top: pad,
            bottom: pad,
            left: pad,
            right: pad,
        }
    }

    /// The size of an image of `size` once this padding is applied.
    pub fn padded_size(&self, size: ImageSize) -> ImageSize {
        ImageSize {
            width: size.width + self.left + self.right,
            height: size.height + self.top + self.bottom,
        }
    }

    /// Validates that a new image size correctly matches the expected dimensions
    /// after applying this padding to an existing image.
    ///
    /// # Example
    /// ```rust
    /// use masklab_image::ImageSize;
    /// use masklab_imgproc::padding::Padding2D;
    /// let padding = Padding2D { top: 1, bottom: 1, left: 2, right: 2 };
    /// let old_size = ImageSize { width: 4, height: 4 };
    /// let new_size = ImageSize { width: 8, height: 6 };
    ///
    /// assert!(padding.validate_size(old_size, new_size));
    /// ```
    pub fn validate_size(&self, old_size: ImageSize, new_size: ImageSize) -> bool {
        self.padded_size(old_size) == new_size
    }
}

/// Copies `src` into the center of `dst` and fills the border with `constant_value`.
///
/// # Errors
///
/// Returns an error if the size of `dst` does not match the size of `src` after
/// applying `padding`.
pub fn spatial_padding<T>(
    src: &Image<T>,
    dst: &mut Image<T>,
    padding: &Padding2D,
    constant_value: T,
) -> Result<(), ImageError>
where
    T: Copy,
{
    if !padding.validate_size(src.size(), dst.size()) {
        let expected = padding.padded_size(src.size());
        return Err(ImageError::InvalidImageSize(
            dst.width(),
            dst.height(),
            expected.width,
            expected.height,
        ));
    }

    let old_stride = src.width();
    let new_stride = dst.width();
    let new_data = dst.as_slice_mut();
    new_data.fill(constant_value);

    // copy old image data as center of new image data
    let row_offset = padding.top * new_stride + padding.left;
    for (src_row, dst_row) in src
        .as_slice()
        .chunks_exact(old_stride)
        .zip(new_data[row_offset..].chunks_mut(new_stride))
    {
        dst_row[..old_stride].copy_from_slice(src_row);
    }

    Ok(())
}

/// Allocates a new image with `padding` zero-valued pixels around `src`.
///
/// # Example
///
/// ```rust
/// use masklab_image::Image;
/// use masklab_imgproc::padding::{pad_zeros, Padding2D};
///
/// let src = Image::from_size_val([2, 2].into(), 1u8).unwrap();
/// let padded = pad_zeros(&src, &Padding2D::uniform(1)).unwrap();
///
/// assert_eq!(padded.width(), 4);
/// assert_eq!(padded.height(), 4);
/// assert_eq!(padded.as_slice().iter().map(|&v| v as usize).sum::<usize>(), 4);
/// ```
pub fn pad_zeros<T>(src: &Image<T>, padding: &Padding2D) -> Result<Image<T>, ImageError>
where
    T: Copy + Default,
{
    let mut dst = Image::from_size_val(padding.padded_size(src.size()), T::default())?;
    spatial_padding(src, &mut dst, padding, T::default())?;
    Ok(dst)
}

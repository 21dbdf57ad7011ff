use std::path::Path;

use masklab_image::{GrayImage, ImageSize};

use crate::error::IoError;

/// Reads an image from the given file path as 8-bit grayscale.
///
/// The method reads any format supported by the image crate. Color images are
/// converted to luma.
///
/// # Arguments
///
/// * `file_path` - The path to a valid image file.
///
/// # Returns
///
/// A grayscale image containing the image data.
pub fn read_image_gray8(file_path: impl AsRef<Path>) -> Result<GrayImage, IoError> {
    let file_path = file_path.as_ref();

    // verify the file exists
    if !file_path.exists() {
        return Err(IoError::FileDoesNotExist(file_path.to_path_buf()));
    }

    let img = image::ImageReader::open(file_path)?
        .with_guessed_format()?
        .decode()?;

    log::debug!(
        "decoded {} ({}x{}, {:?})",
        file_path.display(),
        img.width(),
        img.height(),
        img.color()
    );

    let size = ImageSize {
        width: img.width() as usize,
        height: img.height() as usize,
    };

    Ok(GrayImage::new(size, img.into_luma8().into_raw())?)
}

/// Writes a grayscale image to the given file path.
///
/// The format is chosen from the file extension.
///
/// # Arguments
///
/// * `file_path` - The destination path, e.g. `out.png`.
/// * `image` - The image to encode.
pub fn write_image_gray8(file_path: impl AsRef<Path>, image: &GrayImage) -> Result<(), IoError> {
    let (width, height) = (image.width(), image.height());
    let (Ok(w), Ok(h)) = (u32::try_from(width), u32::try_from(height)) else {
        return Err(IoError::ImageTooLarge(width, height));
    };

    image::save_buffer(
        file_path,
        image.as_slice(),
        w,
        h,
        image::ExtendedColorType::L8,
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use masklab_image::Image;

    #[test]
    fn write_then_read_png() -> Result<(), IoError> {
        let tmp_dir = tempfile::tempdir()?;
        let file_path = tmp_dir.path().join("gradient.png");

        let data = (0..6 * 4).map(|v| (v * 10) as u8).collect::<Vec<_>>();
        let image = Image::new([6, 4].into(), data)?;

        write_image_gray8(&file_path, &image)?;
        let read = read_image_gray8(&file_path)?;

        assert_eq!(read, image);
        Ok(())
    }

    #[test]
    fn read_color_as_gray() -> Result<(), IoError> {
        let tmp_dir = tempfile::tempdir()?;
        let file_path = tmp_dir.path().join("white.png");

        image::RgbImage::from_pixel(3, 2, image::Rgb([255, 255, 255])).save(&file_path)?;

        let read = read_image_gray8(&file_path)?;
        assert_eq!(read.width(), 3);
        assert_eq!(read.height(), 2);
        assert!(read.as_slice().iter().all(|&v| v == 255));
        Ok(())
    }

    #[test]
    fn read_missing_file() {
        let res = read_image_gray8("does/not/exist.png");
        assert!(matches!(res, Err(IoError::FileDoesNotExist(_))));
    }
}

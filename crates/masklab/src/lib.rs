//! Spatial filtering of grayscale images with box, gaussian and custom masks.

#[doc(inline)]
pub use masklab_image as image;

#[doc(inline)]
pub use masklab_imgproc as imgproc;

#[doc(inline)]
pub use masklab_io as io;

//! Image loading.

use std::path::Path;

use ndarray::Array3;

use crate::error::FlexCocoError;

/// Image pixels in `[channels, height, width]` layout.
pub type ImageTensor = Array3<u8>;

/// Loads the pixels of an image file.
pub trait ImageLoader {
    fn load(&self, path: &Path) -> Result<ImageTensor, FlexCocoError>;
}

impl<F> ImageLoader for F
where
    F: Fn(&Path) -> Result<ImageTensor, FlexCocoError>,
{
    fn load(&self, path: &Path) -> Result<ImageTensor, FlexCocoError> {
        self(path)
    }
}

/// Decodes image files with the `image` crate.
///
/// The channel count of the file is kept: 1 for grayscale, 2 for grayscale
/// with alpha, 4 for anything with alpha, 3 otherwise. Samples wider than
/// 8 bits are reduced to 8 bits.
#[derive(Clone, Copy, Debug, Default)]
pub struct FileImageLoader;

impl ImageLoader for FileImageLoader {
    fn load(&self, path: &Path) -> Result<ImageTensor, FlexCocoError> {
        let image = image::open(path).map_err(|source| FlexCocoError::ImageLoad {
            path: path.to_path_buf(),
            source,
        })?;

        let height = image.height() as usize;
        let width = image.width() as usize;
        let (channels, raw) = match image.color().channel_count() {
            1 => (1, image.into_luma8().into_raw()),
            2 => (2, image.into_luma_alpha8().into_raw()),
            4 => (4, image.into_rgba8().into_raw()),
            _ => (3, image.into_rgb8().into_raw()),
        };

        Ok(Array3::from_shape_fn((channels, height, width), |(c, y, x)| {
            raw[(y * width + x) * channels + c]
        }))
    }
}

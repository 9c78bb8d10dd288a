//! Segmentation decoding.
//!
//! Turns an annotation's [`Segmentation`] into a `[height, width]` boolean
//! raster. Dataset types take a [`MaskDecoder`] so that a different decoder
//! (or a stub in tests) can be plugged in; [`CocoMaskDecoder`] is the
//! default and understands polygons plus both RLE encodings.

pub mod polygon;
pub mod rle;

use ndarray::Array2;

use crate::coco::Segmentation;
use crate::error::FlexCocoError;

/// Decodes a segmentation into a `[height, width]` mask.
pub trait MaskDecoder {
    fn decode(
        &self,
        segmentation: &Segmentation,
        height: usize,
        width: usize,
    ) -> Result<Array2<bool>, FlexCocoError>;
}

impl<F> MaskDecoder for F
where
    F: Fn(&Segmentation, usize, usize) -> Result<Array2<bool>, FlexCocoError>,
{
    fn decode(
        &self,
        segmentation: &Segmentation,
        height: usize,
        width: usize,
    ) -> Result<Array2<bool>, FlexCocoError> {
        self(segmentation, height, width)
    }
}

/// Decoder for the segmentation encodings found in COCO files.
#[derive(Clone, Copy, Debug, Default)]
pub struct CocoMaskDecoder;

impl MaskDecoder for CocoMaskDecoder {
    fn decode(
        &self,
        segmentation: &Segmentation,
        height: usize,
        width: usize,
    ) -> Result<Array2<bool>, FlexCocoError> {
        match segmentation {
            Segmentation::Polygons(polygons) => polygon::rasterize_polygons(polygons, height, width),
            Segmentation::Rle(encoded) => rle::decode_rle(encoded, height, width),
        }
    }
}

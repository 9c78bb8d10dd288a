use std::path::PathBuf;
use thiserror::Error;

use crate::coco::{CategoryId, ImageId};

/// The main error type for flexcoco operations.
#[derive(Debug, Error)]
pub enum FlexCocoError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse COCO JSON from {path}: {source}")]
    CocoJsonParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write COCO JSON to {path}: {source}")]
    CocoJsonWrite {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Record {index} has no key '{key}'")]
    KeyMissing { key: String, index: usize },

    #[error("Sample index {index} out of range for dataset of length {len}")]
    OutOfRange { index: usize, len: usize },

    #[error("Category {0} not found")]
    CategoryNotFound(CategoryId),

    #[error("Image {0} not found")]
    ImageNotFound(ImageId),

    #[error("Failed to load image {path}: {source}")]
    ImageLoad {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Failed to decode segmentation: {message}")]
    MaskDecode { message: String },

    #[error("Failed to serialize report: {0}")]
    ReportSerialize(#[source] serde_json::Error),
}

//! COCO annotation documents.
//!
//! This module holds the typed model of a COCO JSON document, the JSON
//! reader/writer, and the keyed-record filters the dataset filter is built
//! on.
//!
//! # Example
//!
//! ```
//! use flexcoco::coco::{Annotation, AnnotationDocument, Category, Image, Segmentation};
//!
//! let document = AnnotationDocument {
//!     images: vec![Image::new(1u64, "image.jpg", 640, 480)],
//!     categories: vec![Category::new(1u64, "person")],
//!     annotations: vec![Annotation::new(1u64, 1u64, 1u64)
//!         .with_segmentation(Segmentation::rectangle(10.0, 20.0, 100.0, 200.0))],
//!     ..Default::default()
//! };
//! assert!(document.image(1u64.into()).is_some());
//! ```

mod ids;
pub mod io_coco_json;
mod model;
mod record;

pub use ids::{AnnotationId, CategoryId, ImageId};
pub use model::{Annotation, AnnotationDocument, Category, Image, Rle, RleCounts, Segmentation};
pub use record::{filter_by_exclusion, filter_by_inclusion, Record};

//! COCO annotation document model.
//!
//! The typed fields are the ones filtering and mask materialization read.
//! Everything else a record carries (`coco_url`, `flickr_url`, `keypoints`,
//! tool-specific keys, ...) lands in the flattened `extra` map so that a
//! filtered document serializes back with the same content it was read with.
//! Known keys that are only passed through (`info`, `licenses`, `bbox`,
//! `area`, `iscrowd`, `supercategory` and `segmentation` itself) are kept as
//! raw JSON: a value of any shape is accepted, an explicit `null` stays
//! `null`, and an absent key stays absent.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use super::ids::{AnnotationId, CategoryId, ImageId};
use crate::error::FlexCocoError;

/// Wraps any present value, `null` included, in `Some`. Absent keys fall
/// back to `None` through `#[serde(default)]`.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// A complete COCO annotation document.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AnnotationDocument {
    /// Opaque dataset metadata.
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub info: Option<Value>,

    /// Opaque license records.
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub licenses: Option<Value>,

    pub images: Vec<Image>,

    pub annotations: Vec<Annotation>,

    pub categories: Vec<Category>,

    /// Top-level keys outside the COCO schema.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AnnotationDocument {
    /// Finds an image by id.
    pub fn image(&self, id: ImageId) -> Option<&Image> {
        self.images.iter().find(|image| image.id == id)
    }

    /// Finds a category by id.
    pub fn category(&self, id: CategoryId) -> Option<&Category> {
        self.categories.iter().find(|category| category.id == id)
    }
}

/// An image entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub id: ImageId,

    /// File name relative to the dataset's image directory.
    pub file_name: String,

    pub height: u32,

    pub width: u32,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Image {
    /// Creates a new image with the given properties.
    pub fn new(
        id: impl Into<ImageId>,
        file_name: impl Into<String>,
        width: u32,
        height: u32,
    ) -> Self {
        Self {
            id: id.into(),
            file_name: file_name.into(),
            height,
            width,
            extra: Map::new(),
        }
    }

    /// Adds an opaque field to the image.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

/// A category (class label).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,

    pub name: String,

    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub supercategory: Option<Value>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Category {
    /// Creates a new category with the given properties.
    pub fn new(id: impl Into<CategoryId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            supercategory: None,
            extra: Map::new(),
        }
    }

    /// Creates a new category with a supercategory.
    pub fn with_supercategory(
        id: impl Into<CategoryId>,
        name: impl Into<String>,
        supercategory: impl Into<String>,
    ) -> Self {
        Self {
            supercategory: Some(Value::from(supercategory.into())),
            ..Self::new(id, name)
        }
    }
}

/// An object annotation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub id: AnnotationId,

    pub image_id: ImageId,

    pub category_id: CategoryId,

    /// Object outline as written in the file. See
    /// [`Annotation::parse_segmentation`].
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub segmentation: Option<Value>,

    /// COCO bbox, normally `[x, y, width, height]` in pixels.
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub bbox: Option<Value>,

    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub area: Option<Value>,

    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub iscrowd: Option<Value>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Annotation {
    /// Creates a new annotation with the minimum required fields.
    pub fn new(
        id: impl Into<AnnotationId>,
        image_id: impl Into<ImageId>,
        category_id: impl Into<CategoryId>,
    ) -> Self {
        Self {
            id: id.into(),
            image_id: image_id.into(),
            category_id: category_id.into(),
            segmentation: None,
            bbox: None,
            area: None,
            iscrowd: None,
            extra: Map::new(),
        }
    }

    /// Sets the segmentation of the annotation.
    pub fn with_segmentation(mut self, segmentation: Segmentation) -> Self {
        self.segmentation = Some(segmentation.into());
        self
    }

    /// Sets the COCO `[x, y, width, height]` bbox.
    pub fn with_bbox(mut self, bbox: [f64; 4]) -> Self {
        self.bbox = Some(Value::from(bbox.to_vec()));
        self
    }

    /// Decodes the raw `segmentation` value.
    ///
    /// Returns `Ok(None)` when the key is absent or `null`.
    ///
    /// # Errors
    /// Returns [`FlexCocoError::MaskDecode`] if the value is neither a list of
    /// polygons nor an RLE object.
    pub fn parse_segmentation(&self) -> Result<Option<Segmentation>, FlexCocoError> {
        match &self.segmentation {
            None | Some(Value::Null) => Ok(None),
            Some(raw) => Segmentation::deserialize(raw).map(Some).map_err(|err| {
                FlexCocoError::MaskDecode {
                    message: format!("annotation {}: {err}", self.id),
                }
            }),
        }
    }
}

/// Segmentation of a single annotation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Segmentation {
    /// One or more polygons, each a flat `[x0, y0, x1, y1, ...]` list.
    Polygons(Vec<Vec<f64>>),
    /// Run-length encoded mask (typically `iscrowd = 1`).
    Rle(Rle),
}

impl Segmentation {
    /// Builds a single-polygon segmentation from an axis-aligned rectangle.
    pub fn rectangle(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Segmentation::Polygons(vec![vec![x0, y0, x1, y0, x1, y1, x0, y1]])
    }
}

impl From<Segmentation> for Value {
    fn from(segmentation: Segmentation) -> Self {
        match segmentation {
            Segmentation::Polygons(polygons) => Value::from(polygons),
            Segmentation::Rle(Rle { size, counts }) => {
                let counts = match counts {
                    RleCounts::Runs(runs) => Value::from(runs),
                    RleCounts::Compressed(encoded) => Value::from(encoded),
                };
                let mut object = Map::new();
                object.insert("size".to_string(), Value::from(size.to_vec()));
                object.insert("counts".to_string(), counts);
                Value::Object(object)
            }
        }
    }
}

/// A COCO run-length encoded mask.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rle {
    /// Mask size as `[height, width]`.
    pub size: [u32; 2],
    pub counts: RleCounts,
}

/// RLE counts, as stored in the JSON.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RleCounts {
    /// Uncompressed: alternating runs of 0s and 1s, starting with 0s.
    Runs(Vec<u32>),
    /// Compressed COCO string encoding of the same runs.
    Compressed(String),
}

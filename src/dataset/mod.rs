//! Indexed access to a COCO document for training loops.
//!
//! [`CocoDataset`] turns an annotation document into an ordered list of
//! image ids plus the lookups every sample type needs. Concrete sample types
//! such as [`SemanticSegmentationDataset`] wrap it and implement
//! [`SampleDataset`], the interface a data-loading harness drives.
//!
//! All lookups are built when the dataset is constructed and are read-only
//! afterwards; a dataset can be shared between loader threads.

mod category_index;
mod loader;
mod semantic;

pub use category_index::CategoryIndex;
pub use loader::{FileImageLoader, ImageLoader, ImageTensor};
pub use semantic::{
    DataTransform, LabelTransform, MaskTensor, SegmentationTarget, SemanticSegmentationDataset,
};

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use log::debug;

use crate::coco::io_coco_json::read_coco_json;
use crate::coco::{Annotation, AnnotationDocument, CategoryId, Image, ImageId};
use crate::error::FlexCocoError;
use crate::filter::{create_filtered_annotation_file, FilterOptions};

/// An indexable collection of samples.
pub trait SampleDataset {
    /// The model input of one sample.
    type Sample;
    /// What the model should predict for that input.
    type Target;

    /// Number of samples.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Materializes the sample at `index`.
    ///
    /// # Errors
    /// Returns [`FlexCocoError::OutOfRange`] if `index >= self.len()`, and
    /// whatever loading the sample's data fails with.
    fn get_sample(&self, index: usize) -> Result<(Self::Sample, Self::Target), FlexCocoError>;
}

/// A COCO document indexed by image.
///
/// Sample `i` is the `i`-th image of the document's image list.
#[derive(Clone, Debug)]
pub struct CocoDataset {
    image_dir: PathBuf,
    document: AnnotationDocument,
    ids: Vec<ImageId>,
    images_by_id: HashMap<ImageId, usize>,
    annotations_by_image: HashMap<ImageId, Vec<usize>>,
    category_index: CategoryIndex,
}

impl CocoDataset {
    /// Indexes an in-memory document. Image files are resolved relative to
    /// `image_dir`.
    pub fn from_document(image_dir: impl Into<PathBuf>, document: AnnotationDocument) -> Self {
        let mut ids = Vec::with_capacity(document.images.len());
        let mut images_by_id = HashMap::with_capacity(document.images.len());
        for (pos, image) in document.images.iter().enumerate() {
            // First occurrence of a duplicated id wins.
            if !images_by_id.contains_key(&image.id) {
                images_by_id.insert(image.id, pos);
                ids.push(image.id);
            }
        }

        let mut annotations_by_image: HashMap<ImageId, Vec<usize>> = HashMap::new();
        for (pos, ann) in document.annotations.iter().enumerate() {
            annotations_by_image.entry(ann.image_id).or_default().push(pos);
        }

        let category_index = CategoryIndex::new(&document.categories);

        debug!(
            "indexed {} image(s), {} annotation(s), {} category(ies)",
            ids.len(),
            document.annotations.len(),
            category_index.len()
        );

        Self {
            image_dir: image_dir.into(),
            document,
            ids,
            images_by_id,
            annotations_by_image,
            category_index,
        }
    }

    /// Loads an annotation file, filtering it first when `opts` sets any
    /// criterion.
    ///
    /// Filtering goes through [`create_filtered_annotation_file`], so a
    /// filtered copy is written next to `annotation_file` and then loaded.
    ///
    /// # Errors
    /// Returns an error if the annotation file cannot be read or parsed, or
    /// the filtered copy cannot be written.
    pub fn open(
        image_dir: impl Into<PathBuf>,
        annotation_file: &Path,
        opts: &FilterOptions,
    ) -> Result<Self, FlexCocoError> {
        let annotation_file = create_filtered_annotation_file(annotation_file, None, opts)?;
        let document = read_coco_json(&annotation_file)?;
        Ok(Self::from_document(image_dir, document))
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Image ids in sample order.
    pub fn ids(&self) -> &[ImageId] {
        &self.ids
    }

    pub fn document(&self) -> &AnnotationDocument {
        &self.document
    }

    pub fn image_dir(&self) -> &Path {
        &self.image_dir
    }

    /// The image id of sample `index`.
    pub fn image_id(&self, index: usize) -> Result<ImageId, FlexCocoError> {
        self.ids
            .get(index)
            .copied()
            .ok_or(FlexCocoError::OutOfRange {
                index,
                len: self.ids.len(),
            })
    }

    /// Image metadata by id.
    pub fn image(&self, id: ImageId) -> Result<&Image, FlexCocoError> {
        self.images_by_id
            .get(&id)
            .map(|&pos| &self.document.images[pos])
            .ok_or(FlexCocoError::ImageNotFound(id))
    }

    /// Annotations of one image, in document order.
    pub fn annotations_for(&self, id: ImageId) -> impl Iterator<Item = &Annotation> + '_ {
        self.annotations_by_image
            .get(&id)
            .into_iter()
            .flatten()
            .map(|&pos| &self.document.annotations[pos])
    }

    /// Name of the category with this id.
    pub fn category_name(&self, id: CategoryId) -> Result<&str, FlexCocoError> {
        self.document
            .category(id)
            .map(|category| category.name.as_str())
            .ok_or(FlexCocoError::CategoryNotFound(id))
    }

    /// Names of all categories, in document order.
    pub fn category_names(&self) -> Vec<&str> {
        self.document
            .categories
            .iter()
            .map(|category| category.name.as_str())
            .collect()
    }

    pub fn category_index(&self) -> &CategoryIndex {
        &self.category_index
    }

    /// Number of annotations per category name. Every category is listed,
    /// unused ones with a count of zero.
    pub fn category_statistics(&self) -> BTreeMap<String, usize> {
        let mut per_id: HashMap<CategoryId, usize> = HashMap::new();
        for ann in &self.document.annotations {
            *per_id.entry(ann.category_id).or_insert(0) += 1;
        }

        let mut counts = BTreeMap::new();
        for category in &self.document.categories {
            let count = per_id.get(&category.id).copied().unwrap_or(0);
            *counts.entry(category.name.clone()).or_insert(0) += count;
        }
        counts
    }
}

//! Semantic segmentation samples.
//!
//! Each sample is an image plus one mask per category: the union of the
//! segmentations of all the image's annotations with that category. The mask
//! stack always has one slot per category of the dataset, in category-list
//! order, whether or not the image uses the category.

use std::fmt;
use std::path::Path;

use log::trace;
use ndarray::{Array3, Axis};

use super::loader::{FileImageLoader, ImageLoader, ImageTensor};
use super::{CocoDataset, SampleDataset};
use crate::coco::Image;
use crate::error::FlexCocoError;
use crate::filter::FilterOptions;
use crate::mask::{CocoMaskDecoder, MaskDecoder};

/// Per-category masks as `[categories, height, width]`, 1.0 inside.
pub type MaskTensor = Array3<f32>;

/// Transform applied to every loaded image.
pub type DataTransform = Box<dyn Fn(ImageTensor) -> ImageTensor + Send + Sync>;

/// Transform applied to every mask stack.
pub type LabelTransform = Box<dyn Fn(MaskTensor) -> MaskTensor + Send + Sync>;

/// Target of a semantic segmentation sample.
#[derive(Clone, Debug, PartialEq)]
pub struct SegmentationTarget {
    /// Mask stack after the label transform.
    pub masks: MaskTensor,
    pub file_name: String,
    /// Image height recorded in the annotations, before any transform.
    pub origin_height: u32,
    /// Image width recorded in the annotations, before any transform.
    pub origin_width: u32,
}

/// A [`CocoDataset`] whose samples are images with per-category masks.
pub struct SemanticSegmentationDataset {
    coco: CocoDataset,
    decoder: Box<dyn MaskDecoder + Send + Sync>,
    loader: Box<dyn ImageLoader + Send + Sync>,
    data_transform: Option<DataTransform>,
    label_transform: Option<LabelTransform>,
}

impl SemanticSegmentationDataset {
    /// Wraps an indexed document, decoding with [`CocoMaskDecoder`] and
    /// loading images with [`FileImageLoader`].
    pub fn new(coco: CocoDataset) -> Self {
        Self {
            coco,
            decoder: Box::new(CocoMaskDecoder),
            loader: Box::new(FileImageLoader),
            data_transform: None,
            label_transform: None,
        }
    }

    /// Loads (and optionally filters) an annotation file.
    ///
    /// See [`CocoDataset::open`].
    pub fn open(
        image_dir: impl Into<std::path::PathBuf>,
        annotation_file: &Path,
        opts: &FilterOptions,
    ) -> Result<Self, FlexCocoError> {
        CocoDataset::open(image_dir, annotation_file, opts).map(Self::new)
    }

    pub fn with_mask_decoder(mut self, decoder: impl MaskDecoder + Send + Sync + 'static) -> Self {
        self.decoder = Box::new(decoder);
        self
    }

    pub fn with_image_loader(mut self, loader: impl ImageLoader + Send + Sync + 'static) -> Self {
        self.loader = Box::new(loader);
        self
    }

    pub fn with_data_transform(
        mut self,
        transform: impl Fn(ImageTensor) -> ImageTensor + Send + Sync + 'static,
    ) -> Self {
        self.data_transform = Some(Box::new(transform));
        self
    }

    pub fn with_label_transform(
        mut self,
        transform: impl Fn(MaskTensor) -> MaskTensor + Send + Sync + 'static,
    ) -> Self {
        self.label_transform = Some(Box::new(transform));
        self
    }

    /// The underlying indexed document.
    pub fn coco(&self) -> &CocoDataset {
        &self.coco
    }

    /// Boolean per-category masks of sample `index`, without loading the
    /// image.
    ///
    /// Annotations without a segmentation (key absent or `null`) add
    /// nothing to their category's mask.
    ///
    /// # Errors
    /// Returns [`FlexCocoError::OutOfRange`] for a bad index,
    /// [`FlexCocoError::CategoryNotFound`] for an annotation whose category
    /// is not in the dataset, and [`FlexCocoError::MaskDecode`] for a
    /// segmentation that cannot be decoded at the image's size.
    pub fn category_masks(&self, index: usize) -> Result<Array3<bool>, FlexCocoError> {
        self.build_masks(index).map(|(_, masks)| masks)
    }

    fn build_masks(&self, index: usize) -> Result<(&Image, Array3<bool>), FlexCocoError> {
        let image_id = self.coco.image_id(index)?;
        let image = self.coco.image(image_id)?;
        let height = image.height as usize;
        let width = image.width as usize;

        let slots = self.coco.category_index();
        let mut masks = Array3::from_elem((slots.len(), height, width), false);

        for ann in self.coco.annotations_for(image_id) {
            let slot = slots
                .slot(ann.category_id)
                .ok_or(FlexCocoError::CategoryNotFound(ann.category_id))?;
            let Some(segmentation) = ann.parse_segmentation()? else {
                continue;
            };

            let decoded = self.decoder.decode(&segmentation, height, width)?;
            if decoded.dim() != (height, width) {
                return Err(FlexCocoError::MaskDecode {
                    message: format!(
                        "annotation {} decoded to {:?}, expected ({height}, {width})",
                        ann.id,
                        decoded.dim()
                    ),
                });
            }
            masks
                .index_axis_mut(Axis(0), slot)
                .zip_mut_with(&decoded, |dst, &src| *dst |= src);
        }

        Ok((image, masks))
    }
}

impl SampleDataset for SemanticSegmentationDataset {
    type Sample = ImageTensor;
    type Target = SegmentationTarget;

    fn len(&self) -> usize {
        self.coco.len()
    }

    /// Loads image `index` and builds its `[categories, height, width]` mask
    /// stack, 1.0 inside. Annotations without a segmentation are skipped, as
    /// in [`SemanticSegmentationDataset::category_masks`].
    fn get_sample(&self, index: usize) -> Result<(ImageTensor, SegmentationTarget), FlexCocoError> {
        let (image, masks) = self.build_masks(index)?;

        let path = self.coco.image_dir().join(&image.file_name);
        let mut pixels = self.loader.load(&path)?;
        let mut masks: MaskTensor = masks.mapv(|inside| if inside { 1.0 } else { 0.0 });

        if let Some(transform) = &self.data_transform {
            pixels = transform(pixels);
        }
        if let Some(transform) = &self.label_transform {
            masks = transform(masks);
        }

        trace!(
            "sample {index}: {} -> image {:?}, masks {:?}",
            image.file_name,
            pixels.dim(),
            masks.dim()
        );

        Ok((
            pixels,
            SegmentationTarget {
                masks,
                file_name: image.file_name.clone(),
                origin_height: image.height,
                origin_width: image.width,
            },
        ))
    }
}

impl fmt::Debug for SemanticSegmentationDataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SemanticSegmentationDataset")
            .field("coco", &self.coco)
            .field("data_transform", &self.data_transform.is_some())
            .field("label_transform", &self.label_transform.is_some())
            .finish_non_exhaustive()
    }
}

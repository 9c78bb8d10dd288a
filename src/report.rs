//! Reports printed by the CLI.

use std::fmt;

use ndarray::Axis;
use serde::Serialize;

use crate::dataset::{CocoDataset, ImageTensor, SegmentationTarget};

/// One row per category, in slot order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CategoriesReport {
    pub categories: Vec<CategoryRow>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CategoryRow {
    pub slot: usize,
    pub id: u64,
    pub name: String,
    pub annotations: usize,
}

impl CategoriesReport {
    pub fn from_dataset(dataset: &CocoDataset) -> Self {
        let stats = dataset.category_statistics();
        let categories = dataset
            .document()
            .categories
            .iter()
            .enumerate()
            .map(|(slot, category)| CategoryRow {
                slot,
                id: category.id.as_u64(),
                name: category.name.clone(),
                annotations: stats.get(&category.name).copied().unwrap_or(0),
            })
            .collect();
        Self { categories }
    }
}

impl fmt::Display for CategoriesReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name_width = self
            .categories
            .iter()
            .map(|row| row.name.len())
            .max()
            .unwrap_or(0)
            .max(4);

        writeln!(f, "{:>4}  {:>6}  {:<name_width$}  annotations", "slot", "id", "name")?;
        for row in &self.categories {
            writeln!(
                f,
                "{:>4}  {:>6}  {:<name_width$}  {}",
                row.slot, row.id, row.name, row.annotations
            )?;
        }
        Ok(())
    }
}

/// Summary of one materialized segmentation sample.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MaskReport {
    pub index: usize,
    pub file_name: String,
    pub origin_height: u32,
    pub origin_width: u32,
    pub image_shape: Vec<usize>,
    pub mask_shape: Vec<usize>,
    pub categories: Vec<MaskRow>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MaskRow {
    pub slot: usize,
    pub name: String,
    /// Foreground pixels in the category's mask.
    pub pixels: usize,
}

impl MaskReport {
    pub fn new(
        index: usize,
        dataset: &CocoDataset,
        image: &ImageTensor,
        target: &SegmentationTarget,
    ) -> Self {
        let names = dataset.category_names();
        let categories = target
            .masks
            .axis_iter(Axis(0))
            .enumerate()
            .map(|(slot, mask)| MaskRow {
                slot,
                name: names.get(slot).map(|name| name.to_string()).unwrap_or_default(),
                pixels: mask.iter().filter(|&&v| v > 0.5).count(),
            })
            .collect();

        Self {
            index,
            file_name: target.file_name.clone(),
            origin_height: target.origin_height,
            origin_width: target.origin_width,
            image_shape: image.shape().to_vec(),
            mask_shape: target.masks.shape().to_vec(),
            categories,
        }
    }
}

impl fmt::Display for MaskReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "sample {}: {} ({}x{})",
            self.index, self.file_name, self.origin_width, self.origin_height
        )?;
        writeln!(f, "  image: {:?}", self.image_shape)?;
        writeln!(f, "  masks: {:?}", self.mask_shape)?;
        for row in &self.categories {
            writeln!(f, "  [{}] {}: {} px", row.slot, row.name, row.pixels)?;
        }
        Ok(())
    }
}

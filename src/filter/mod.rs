//! Dataset subsetting by image file name and category name.
//!
//! Filtering runs in two stages over a copy of the document:
//!
//! 1. **File names** (when `include_files` or `exclude_files` is set): the
//!    image list is narrowed, then annotations are recomputed from the
//!    surviving image ids. Categories pass through.
//! 2. **Category names** (when `include_categories` or `exclude_categories`
//!    is set): the category list is narrowed, annotations are recomputed from
//!    the surviving category ids, and images are then recomputed from the
//!    surviving annotations. An image left without annotations is dropped
//!    even if its file name was never filtered.
//!
//! Within a stage inclusion is applied before exclusion, so a name listed in
//! both ends up excluded. `info`, `licenses` and unknown top-level keys are
//! never touched.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::coco::io_coco_json::{read_coco_json, write_coco_json};
use crate::coco::{filter_by_exclusion, filter_by_inclusion, AnnotationDocument, CategoryId, ImageId};
use crate::error::FlexCocoError;

/// Filter criteria. A `None` list means "not filtering on this"; an empty
/// list is a real criterion (e.g. `include_files: Some(vec![])` keeps no
/// image).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilterOptions {
    pub include_files: Option<Vec<String>>,
    pub exclude_files: Option<Vec<String>>,
    pub include_categories: Option<Vec<String>>,
    pub exclude_categories: Option<Vec<String>>,
}

impl FilterOptions {
    /// Keep only images with these file names.
    pub fn include_files<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include_files = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Drop images with these file names.
    pub fn exclude_files<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_files = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Keep only categories with these names.
    pub fn include_categories<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include_categories = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Drop categories with these names.
    pub fn exclude_categories<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_categories = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// True when no criterion is set at all.
    pub fn is_empty(&self) -> bool {
        !self.filters_files() && !self.filters_categories()
    }

    fn filters_files(&self) -> bool {
        self.include_files.is_some() || self.exclude_files.is_some()
    }

    fn filters_categories(&self) -> bool {
        self.include_categories.is_some() || self.exclude_categories.is_some()
    }
}

/// Filter a document by file names and category names.
///
/// Returns `Ok(None)` when `opts` sets no criterion: the caller should keep
/// using `document` as it is. Otherwise returns the filtered copy, which may
/// well be empty.
///
/// # Errors
/// Returns [`FlexCocoError::KeyMissing`] if a record lacks a filtered key.
/// The typed COCO records always carry the keys used here.
pub fn filter_dataset(
    document: &AnnotationDocument,
    opts: &FilterOptions,
) -> Result<Option<AnnotationDocument>, FlexCocoError> {
    if opts.is_empty() {
        return Ok(None);
    }

    let mut filtered = document.clone();

    if opts.filters_files() {
        filter_by_file_names(
            &mut filtered,
            opts.include_files.as_deref(),
            opts.exclude_files.as_deref(),
        )?;
    }

    if opts.filters_categories() {
        filter_by_category_names(
            &mut filtered,
            opts.include_categories.as_deref(),
            opts.exclude_categories.as_deref(),
        )?;
    }

    Ok(Some(filtered))
}

fn filter_by_file_names(
    document: &mut AnnotationDocument,
    include: Option<&[String]>,
    exclude: Option<&[String]>,
) -> Result<(), FlexCocoError> {
    let mut images = std::mem::take(&mut document.images);
    if let Some(include) = include {
        images = filter_by_inclusion(&images, "file_name", include.iter().map(String::as_str))?;
    }
    if let Some(exclude) = exclude {
        images = filter_by_exclusion(&images, "file_name", exclude.iter().map(String::as_str))?;
    }

    let image_ids: Vec<ImageId> = images.iter().map(|image| image.id).collect();
    document.annotations = filter_by_inclusion(&document.annotations, "image_id", image_ids)?;
    document.images = images;

    debug!(
        "file name filter kept {} image(s), {} annotation(s)",
        document.images.len(),
        document.annotations.len()
    );
    Ok(())
}

fn filter_by_category_names(
    document: &mut AnnotationDocument,
    include: Option<&[String]>,
    exclude: Option<&[String]>,
) -> Result<(), FlexCocoError> {
    let mut categories = std::mem::take(&mut document.categories);
    if let Some(include) = include {
        categories = filter_by_inclusion(&categories, "name", include.iter().map(String::as_str))?;
    }
    if let Some(exclude) = exclude {
        categories = filter_by_exclusion(&categories, "name", exclude.iter().map(String::as_str))?;
    }

    let category_ids: Vec<CategoryId> = categories.iter().map(|category| category.id).collect();
    let annotations = filter_by_inclusion(&document.annotations, "category_id", category_ids)?;

    let image_ids: Vec<ImageId> = annotations.iter().map(|ann| ann.image_id).collect();
    document.images = filter_by_inclusion(&document.images, "id", image_ids)?;
    document.annotations = annotations;
    document.categories = categories;

    debug!(
        "category filter kept {} category(ies), {} image(s), {} annotation(s)",
        document.categories.len(),
        document.images.len(),
        document.annotations.len()
    );
    Ok(())
}

/// Filter an annotation file and write the result next to it.
///
/// When `opts` sets no criterion nothing is read or written and `path` is
/// returned. Otherwise the filtered document is written to `output` (or to
/// [`default_filtered_path`]) and that path is returned.
///
/// # Errors
/// Returns an error if `path` cannot be read or parsed, or if the output
/// cannot be written.
pub fn create_filtered_annotation_file(
    path: &Path,
    output: Option<&Path>,
    opts: &FilterOptions,
) -> Result<PathBuf, FlexCocoError> {
    if opts.is_empty() {
        debug!("no filter criteria, using {} as is", path.display());
        return Ok(path.to_path_buf());
    }

    let document = read_coco_json(path)?;
    let Some(filtered) = filter_dataset(&document, opts)? else {
        return Ok(path.to_path_buf());
    };

    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_filtered_path(path));
    write_coco_json(&output, &filtered)?;

    info!(
        "wrote filtered annotations to {} ({} of {} image(s), {} of {} annotation(s))",
        output.display(),
        filtered.images.len(),
        document.images.len(),
        filtered.annotations.len(),
        document.annotations.len()
    );
    Ok(output)
}

/// Default location of a filtered copy of `path`.
///
/// The first `.json` in the path is replaced by `_filtered.json`
/// (`train.json` -> `train_filtered.json`). A path without `.json` gets
/// `_filtered` inserted before its extension so it never maps onto itself.
pub fn default_filtered_path(path: &Path) -> PathBuf {
    if let Some(text) = path.to_str() {
        if text.contains(".json") {
            return PathBuf::from(text.replacen(".json", "_filtered.json", 1));
        }
    }

    let mut name = path.file_stem().map(OsString::from).unwrap_or_default();
    name.push("_filtered");
    if let Some(ext) = path.extension() {
        name.push(".");
        name.push(ext);
    }
    path.with_file_name(name)
}

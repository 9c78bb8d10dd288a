#![allow(dead_code)]

use std::collections::{BTreeSet, HashMap, HashSet};

use flexcoco::coco::{
    Annotation, AnnotationDocument, Category, CategoryId, Image, ImageId, Segmentation,
};
use proptest::prelude::*;
use proptest::strategy::BoxedStrategy;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};

pub fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(64);

    let mut config = ProptestConfig::with_failure_persistence(FileFailurePersistence::WithSource(
        "proptest-regressions",
    ));
    config.cases = cases;
    config.max_shrink_iters = 1024;
    config
}

pub fn file_names(document: &AnnotationDocument) -> BTreeSet<String> {
    document
        .images
        .iter()
        .map(|img| img.file_name.clone())
        .collect()
}

pub fn category_names(document: &AnnotationDocument) -> BTreeSet<String> {
    document
        .categories
        .iter()
        .map(|cat| cat.name.clone())
        .collect()
}

pub fn assert_valid_references(document: &AnnotationDocument) -> Result<(), String> {
    let image_ids: BTreeSet<ImageId> = document.images.iter().map(|img| img.id).collect();
    let category_ids: BTreeSet<CategoryId> =
        document.categories.iter().map(|cat| cat.id).collect();

    for ann in &document.annotations {
        if !image_ids.contains(&ann.image_id) {
            return Err(format!(
                "annotation {} references missing image_id {}",
                ann.id.as_u64(),
                ann.image_id.as_u64()
            ));
        }
        if !category_ids.contains(&ann.category_id) {
            return Err(format!(
                "annotation {} references missing category_id {}",
                ann.id.as_u64(),
                ann.category_id.as_u64()
            ));
        }
    }

    Ok(())
}

/// Referentially valid documents with unique file and category names.
/// Images may be left without annotations.
pub fn arb_document(
    max_images: usize,
    max_cats: usize,
    max_anns: usize,
) -> BoxedStrategy<AnnotationDocument> {
    assert!(max_images > 0, "max_images must be > 0");
    assert!(max_cats > 0, "max_cats must be > 0");

    (1usize..=max_images, 1usize..=max_cats, 0usize..=max_anns)
        .prop_flat_map(|(image_count, category_count, ann_count)| {
            (
                proptest::collection::hash_map(
                    image_file_name_strategy(),
                    (2u32..=64, 2u32..=64),
                    image_count..=image_count,
                ),
                proptest::collection::hash_set(
                    category_name_strategy(),
                    category_count..=category_count,
                ),
                proptest::collection::vec(ann_seed_strategy(), ann_count..=ann_count),
            )
                .prop_map(|(images, categories, ann_seeds)| {
                    build_document(images, categories, ann_seeds)
                })
        })
        .boxed()
}

/// A subset of `names`, in their original order, sometimes with a name that
/// matches nothing.
pub fn arb_name_subset(names: Vec<String>) -> BoxedStrategy<Vec<String>> {
    let len = names.len();
    (proptest::sample::subsequence(names, 0..=len), any::<bool>())
        .prop_map(|(mut picked, add_unknown)| {
            if add_unknown {
                picked.push("no-such-name".to_string());
            }
            picked
        })
        .boxed()
}

type AnnSeed = (u16, u16, bool);

fn ann_seed_strategy() -> impl Strategy<Value = AnnSeed> {
    (any::<u16>(), any::<u16>(), any::<bool>())
}

fn image_file_name_strategy() -> BoxedStrategy<String> {
    proptest::string::string_regex("[a-z0-9_]{1,12}\\.jpg")
        .expect("valid filename regex")
        .boxed()
}

fn category_name_strategy() -> BoxedStrategy<String> {
    proptest::string::string_regex("[a-z]{1,20}")
        .expect("valid category name regex")
        .boxed()
}

fn build_document(
    image_data: HashMap<String, (u32, u32)>,
    category_names: HashSet<String>,
    ann_seeds: Vec<AnnSeed>,
) -> AnnotationDocument {
    let mut image_rows: Vec<(String, (u32, u32))> = image_data.into_iter().collect();
    image_rows.sort_by(|a, b| a.0.cmp(&b.0));

    let mut category_rows: Vec<String> = category_names.into_iter().collect();
    category_rows.sort();

    let images: Vec<Image> = image_rows
        .iter()
        .enumerate()
        .map(|(idx, (file_name, (width, height)))| {
            Image::new((idx + 1) as u64, file_name.clone(), *width, *height)
                .with_field("license", 1)
        })
        .collect();

    let categories: Vec<Category> = category_rows
        .iter()
        .enumerate()
        .map(|(idx, name)| Category::with_supercategory((idx + 1) as u64, name.clone(), "thing"))
        .collect();

    let annotations: Vec<Annotation> = ann_seeds
        .into_iter()
        .enumerate()
        .map(|(idx, (image_seed, category_seed, with_polygon))| {
            let image = &images[image_seed as usize % images.len()];
            let category = &categories[category_seed as usize % categories.len()];
            let ann = Annotation::new((idx + 1) as u64, image.id, category.id);
            if with_polygon {
                ann.with_segmentation(Segmentation::rectangle(
                    0.0,
                    0.0,
                    image.width as f64 / 2.0,
                    image.height as f64 / 2.0,
                ))
            } else {
                ann
            }
        })
        .collect();

    AnnotationDocument {
        info: Some(serde_json::json!({"description": "generated"})),
        licenses: Some(serde_json::json!([{"id": 1, "name": "generated"}])),
        images,
        categories,
        annotations,
        ..Default::default()
    }
}

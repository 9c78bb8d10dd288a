//! Fuzz target for COCO JSON parsing and filtering.
//!
//! Run with:
//!   cargo +nightly fuzz run coco_json_parse

#![no_main]

use flexcoco::coco::io_coco_json::from_coco_slice;
use flexcoco::filter::{filter_dataset, FilterOptions};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 10 * 1024 * 1024 {
        return;
    }

    let Ok(document) = from_coco_slice(data) else {
        return;
    };

    // Any document that parses must also filter.
    let names: Vec<String> = document
        .images
        .iter()
        .step_by(2)
        .map(|img| img.file_name.clone())
        .collect();
    let opts = FilterOptions::default()
        .include_files(names)
        .exclude_categories(["background"]);
    filter_dataset(&document, &opts).expect("typed records carry every filtered key");
});

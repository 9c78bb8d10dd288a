//! Fuzz target for compressed RLE strings.
//!
//! Run with:
//!   cargo +nightly fuzz run rle_string_decode

#![no_main]

use flexcoco::mask::rle::{decode_compressed_counts, runs_to_mask};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(encoded) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(counts) = decode_compressed_counts(encoded) {
        let _ = runs_to_mask(&counts, 32, 32);
    }
});

//! COCO run-length encoding.
//!
//! Runs alternate between background and foreground, starting with
//! background, and walk the mask in column-major (Fortran) order. The
//! compressed form packs each run into 6-bit characters offset by `'0'`:
//! five payload bits per character, `0x20` as the continuation flag and
//! `0x10` as the sign bit of the last character. From the fourth run on, the
//! stored value is the difference to the run two positions earlier.

use ndarray::{Array2, ShapeBuilder};

use crate::coco::{Rle, RleCounts};
use crate::error::FlexCocoError;

/// Decode an RLE mask into a `[height, width]` boolean raster.
///
/// # Errors
/// Fails if the RLE `size` is not `[height, width]`, if the runs cover more
/// than `height * width` pixels, or if a compressed string is malformed.
pub fn decode_rle(rle: &Rle, height: usize, width: usize) -> Result<Array2<bool>, FlexCocoError> {
    let [rle_height, rle_width] = rle.size;
    if rle_height as usize != height || rle_width as usize != width {
        return Err(FlexCocoError::MaskDecode {
            message: format!(
                "RLE size [{rle_height}, {rle_width}] does not match image size [{height}, {width}]"
            ),
        });
    }

    match &rle.counts {
        RleCounts::Runs(counts) => runs_to_mask(counts, height, width),
        RleCounts::Compressed(encoded) => {
            let counts = decode_compressed_counts(encoded)?;
            runs_to_mask(&counts, height, width)
        }
    }
}

/// Expand alternating runs into a `[height, width]` raster.
///
/// Runs that stop short of `height * width` leave the remainder as
/// background.
pub fn runs_to_mask(counts: &[u32], height: usize, width: usize) -> Result<Array2<bool>, FlexCocoError> {
    let total = height * width;
    let mut column_major = vec![false; total];

    let mut pos = 0usize;
    let mut value = false;
    for &count in counts {
        let end = pos + count as usize;
        if end > total {
            return Err(FlexCocoError::MaskDecode {
                message: format!("RLE runs cover more than the {total} pixels of a {height}x{width} mask"),
            });
        }
        if value {
            column_major[pos..end].fill(true);
        }
        pos = end;
        value = !value;
    }

    let mask = Array2::from_shape_vec((height, width).f(), column_major).map_err(|err| {
        FlexCocoError::MaskDecode {
            message: err.to_string(),
        }
    })?;
    Ok(mask.as_standard_layout().into_owned())
}

/// Decode COCO's compressed RLE string into run lengths.
///
/// # Errors
/// Fails on characters outside the encoding alphabet, on a string that ends
/// in the middle of a value, and on runs that decode to a negative length.
pub fn decode_compressed_counts(encoded: &str) -> Result<Vec<u32>, FlexCocoError> {
    let bytes = encoded.as_bytes();
    let mut counts: Vec<u32> = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        let mut x: i64 = 0;
        let mut k = 0;
        loop {
            let Some(&byte) = bytes.get(pos) else {
                return Err(malformed(encoded, "string ends inside a value"));
            };
            let c = i64::from(byte) - 48;
            if !(0..64).contains(&c) {
                return Err(malformed(encoded, "character outside the encoding alphabet"));
            }
            if k > 11 {
                return Err(malformed(encoded, "value too long"));
            }

            x |= (c & 0x1f) << (5 * k);
            pos += 1;
            k += 1;

            if c & 0x20 == 0 {
                if c & 0x10 != 0 {
                    x |= -1i64 << (5 * k);
                }
                break;
            }
        }

        if counts.len() > 2 {
            x += i64::from(counts[counts.len() - 2]);
        }
        let run = u32::try_from(x).map_err(|_| malformed(encoded, "run length out of range"))?;
        counts.push(run);
    }

    Ok(counts)
}

fn malformed(encoded: &str, reason: &str) -> FlexCocoError {
    let preview: String = encoded.chars().take(32).collect();
    FlexCocoError::MaskDecode {
        message: format!("malformed compressed RLE '{preview}': {reason}"),
    }
}

//! Polygon rasterization.
//!
//! A pixel belongs to a polygon when its centre `(x + 0.5, y + 0.5)` lies
//! inside it under the even-odd rule. Each polygon of an annotation is
//! filled on its own and the results are unioned.

use ndarray::Array2;

use crate::error::FlexCocoError;

/// Rasterize COCO polygons (flat `[x0, y0, x1, y1, ...]` lists) into a
/// `[height, width]` mask.
///
/// Polygons with fewer than three vertices cover no pixel and are skipped.
///
/// # Errors
/// Fails if a polygon has an odd number of coordinates or a non-finite one.
pub fn rasterize_polygons(
    polygons: &[Vec<f64>],
    height: usize,
    width: usize,
) -> Result<Array2<bool>, FlexCocoError> {
    let mut mask = Array2::from_elem((height, width), false);

    for (index, coords) in polygons.iter().enumerate() {
        if coords.len() % 2 != 0 {
            return Err(FlexCocoError::MaskDecode {
                message: format!(
                    "polygon {index} has an odd number of coordinates ({})",
                    coords.len()
                ),
            });
        }
        if coords.iter().any(|c| !c.is_finite()) {
            return Err(FlexCocoError::MaskDecode {
                message: format!("polygon {index} has a non-finite coordinate"),
            });
        }
        if coords.len() < 6 {
            continue;
        }

        let points: Vec<(f64, f64)> = coords.chunks_exact(2).map(|p| (p[0], p[1])).collect();
        fill_polygon(&mut mask, &points);
    }

    Ok(mask)
}

fn fill_polygon(mask: &mut Array2<bool>, points: &[(f64, f64)]) {
    let (height, width) = mask.dim();

    let (min_y, max_y) = points
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &(_, y)| {
            (lo.min(y), hi.max(y))
        });
    let first_row = pixel_index(min_y - 0.5, height);
    let last_row = pixel_index(max_y - 0.5, height);

    let mut crossings: Vec<f64> = Vec::with_capacity(points.len());
    for row in first_row..last_row {
        let yc = row as f64 + 0.5;

        crossings.clear();
        for (i, &(x0, y0)) in points.iter().enumerate() {
            let (x1, y1) = points[(i + 1) % points.len()];
            if (y0 <= yc && yc < y1) || (y1 <= yc && yc < y0) {
                crossings.push(x0 + (yc - y0) * (x1 - x0) / (y1 - y0));
            }
        }
        crossings.sort_by(f64::total_cmp);

        for span in crossings.chunks_exact(2) {
            let start = pixel_index(span[0] - 0.5, width);
            let end = pixel_index(span[1] - 0.5, width);
            for col in start..end {
                mask[[row, col]] = true;
            }
        }
    }
}

/// First pixel index whose centre is at or past `edge + 0.5`, clamped to
/// `0..=len`.
fn pixel_index(edge: f64, len: usize) -> usize {
    let index = edge.ceil();
    if index <= 0.0 {
        0
    } else if index >= len as f64 {
        len
    } else {
        index as usize
    }
}

//! Criterion microbenches for flexcoco parsing, filtering and mask decoding.
//!
//! Run with: `cargo bench`

use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use std::hint::black_box;

use flexcoco::coco::io_coco_json::{from_coco_slice, from_coco_str};
use flexcoco::coco::{Rle, RleCounts};
use flexcoco::filter::{filter_dataset, FilterOptions};
use flexcoco::mask::polygon::rasterize_polygons;
use flexcoco::mask::rle::{decode_compressed_counts, decode_rle};

// Include test fixtures at compile time (no file I/O during benchmark)
const COCO_FIXTURE: &str = include_str!("../tests/fixtures/sample_coco.json");

fn bench_coco_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("coco_parse");
    group.throughput(Throughput::Bytes(COCO_FIXTURE.len() as u64));

    group.bench_function("from_coco_str", |b| {
        b.iter(|| black_box(from_coco_str(black_box(COCO_FIXTURE)).unwrap()))
    });
    group.bench_function("from_coco_slice", |b| {
        b.iter(|| black_box(from_coco_slice(black_box(COCO_FIXTURE.as_bytes())).unwrap()))
    });

    group.finish();
}

fn bench_filter(c: &mut Criterion) {
    let document = from_coco_str(COCO_FIXTURE).unwrap();
    let by_file = FilterOptions::default().exclude_files(["000000000002.jpg"]);
    let by_category = FilterOptions::default().include_categories(["label1", "label4"]);

    let mut group = c.benchmark_group("filter_dataset");
    group.bench_function("file_names", |b| {
        b.iter(|| black_box(filter_dataset(black_box(&document), &by_file).unwrap()))
    });
    group.bench_function("category_names", |b| {
        b.iter(|| black_box(filter_dataset(black_box(&document), &by_category).unwrap()))
    });
    group.finish();
}

fn bench_masks(c: &mut Criterion) {
    // A 64-gon inscribed in a 640x480 frame.
    let polygon: Vec<f64> = (0..64)
        .flat_map(|i| {
            let angle = i as f64 / 64.0 * std::f64::consts::TAU;
            [320.0 + 300.0 * angle.cos(), 240.0 + 220.0 * angle.sin()]
        })
        .collect();
    let polygons = vec![polygon];

    let rle = Rle {
        size: [480, 640],
        counts: RleCounts::Runs((0..640).flat_map(|_| [120, 240]).collect()),
    };
    let compressed = "04L3N2M2N2N2M3N1O1N2N2O0O1O1O1O1N2O1O0O1O1N2O1N2N2N3M3L6J_S1";

    let mut group = c.benchmark_group("masks");
    group.bench_function("rasterize_polygon_640x480", |b| {
        b.iter(|| black_box(rasterize_polygons(black_box(&polygons), 480, 640).unwrap()))
    });
    group.bench_function("decode_rle_runs_640x480", |b| {
        b.iter(|| black_box(decode_rle(black_box(&rle), 480, 640).unwrap()))
    });
    group.bench_function("decode_compressed_counts", |b| {
        b.iter(|| black_box(decode_compressed_counts(black_box(compressed))))
    });
    group.finish();
}

criterion_group!(benches, bench_coco_parse, bench_filter, bench_masks);
criterion_main!(benches);

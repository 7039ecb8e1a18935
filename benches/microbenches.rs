//! Criterion microbenches for labelcoco hot paths.
//!
//! Run with: `cargo bench`
//!
//! These benchmarks measure:
//! - label file parsing (from_labelme_str)
//! - base64 image payload decoding (decode_payload)
//! - manifest serialization (to_coco_string)

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use std::hint::black_box;
use std::path::Path;

use labelcoco::ir::io_coco_json::to_coco_string;
use labelcoco::ir::io_labelme_json::from_labelme_str;
use labelcoco::ir::{Annotation, BBoxXYXY, Category, Coord, Dataset, Image};
use labelcoco::materialize::decode_payload;

// 1x1 GIF, base64
const PAYLOAD: &str = "R0lGODlhAQABAIAAAAAAAP///yH5BAEAAAAALAAAAAABAAEAAAICRAEAOw==";

fn label_fixture(shapes: usize) -> String {
    let shapes: Vec<String> = (0..shapes)
        .map(|i| {
            let x = (i % 40) as f64 * 15.0;
            let y = (i / 40) as f64 * 15.0;
            format!(
                r#"{{"label": "{}", "points": [[{x}, {y}], [{}, {}]], "shape_type": "rectangle"}}"#,
                i % 7,
                x + 12.5,
                y + 9.0
            )
        })
        .collect();

    format!(
        r#"{{"version": "4.5.6", "imagePath": "frame.gif", "imageData": "{PAYLOAD}", "imageWidth": 640, "imageHeight": 480, "shapes": [{}]}}"#,
        shapes.join(",")
    )
}

fn manifest_fixture(images: u64, per_image: u64) -> Dataset {
    let mut dataset = Dataset {
        categories: (0..7i64)
            .map(|id| Category::new(id, id.to_string()))
            .collect(),
        ..Default::default()
    };

    for image in 0..images {
        dataset
            .images
            .push(Image::new(image, format!("output/{image:05}.jpg"), 640, 480));
        for k in 0..per_image {
            let id = image * per_image + k;
            let offset = (k * 10) as f64;
            dataset.annotations.push(Annotation::new(
                id,
                image,
                (id % 7) as i64,
                BBoxXYXY::from_corners(
                    Coord::new(offset, offset),
                    Coord::new(offset + 40.0, offset + 30.0),
                    640,
                    480,
                ),
            ));
        }
    }
    dataset
}

fn bench_labelme_parse(c: &mut Criterion) {
    let json = label_fixture(200);
    let mut group = c.benchmark_group("labelme_parse");
    group.throughput(Throughput::Bytes(json.len() as u64));

    group.bench_function("from_labelme_str", |b| {
        b.iter(|| {
            let record = from_labelme_str(black_box(&json), Path::new("bench.json")).unwrap();
            black_box(record)
        })
    });

    group.finish();
}

fn bench_decode_payload(c: &mut Criterion) {
    // Roughly the size of a small embedded JPEG.
    let raw: Vec<u8> = (0..48_000u32).map(|i| (i % 251) as u8).collect();
    let payload = STANDARD.encode(raw);
    let mut group = c.benchmark_group("payload_decode");
    group.throughput(Throughput::Bytes(payload.len() as u64));

    group.bench_function("decode_payload", |b| {
        b.iter(|| {
            let bytes = decode_payload(black_box(&payload)).unwrap();
            black_box(bytes)
        })
    });

    group.finish();
}

/// Manifest serialization, measured per annotation.
fn bench_coco_write(c: &mut Criterion) {
    let dataset = manifest_fixture(100, 20);

    let mut group = c.benchmark_group("coco_write");
    group.throughput(Throughput::Elements(dataset.annotations.len() as u64));

    group.bench_function("to_coco_string", |b| {
        b.iter(|| {
            let json = to_coco_string(black_box(&dataset)).unwrap();
            black_box(json)
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_labelme_parse,
    bench_decode_payload,
    bench_coco_write,
);
criterion_main!(benches);

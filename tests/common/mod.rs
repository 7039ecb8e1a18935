#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::{json, Value};

/// A minimal uncompressed 24-bit BMP, enough for header sniffing.
pub fn bmp_bytes(width: u32, height: u32) -> Vec<u8> {
    let row_stride = (width * 3).div_ceil(4) * 4;
    let pixel_array_size = row_stride * height;
    let file_size = 54 + pixel_array_size;

    let mut bytes = Vec::with_capacity(file_size as usize);
    bytes.extend_from_slice(b"BM");
    bytes.extend_from_slice(&file_size.to_le_bytes());
    bytes.extend_from_slice(&[0, 0, 0, 0]);
    bytes.extend_from_slice(&54u32.to_le_bytes());

    bytes.extend_from_slice(&40u32.to_le_bytes());
    bytes.extend_from_slice(&(width as i32).to_le_bytes());
    bytes.extend_from_slice(&(height as i32).to_le_bytes());
    bytes.extend_from_slice(&1u16.to_le_bytes());
    bytes.extend_from_slice(&24u16.to_le_bytes());
    bytes.extend_from_slice(&[0u8; 24]);

    bytes.resize(file_size as usize, 0);
    bytes
}

/// A label document whose embedded image is a BMP of the declared size.
pub fn label_doc(image_path: &str, width: u32, height: u32, shapes: Value) -> Value {
    json!({
        "version": "4.5.6",
        "flags": {},
        "imagePath": image_path,
        "imageData": STANDARD.encode(bmp_bytes(width, height)),
        "imageWidth": width,
        "imageHeight": height,
        "shapes": shapes,
    })
}

/// A rectangle shape in the form the labeling tool writes it.
pub fn rect(label: impl Into<Value>, p0: [f64; 2], p1: [f64; 2]) -> Value {
    json!({
        "label": label.into(),
        "points": [p0, p1],
        "shape_type": "rectangle",
        "group_id": null,
        "flags": {},
    })
}

/// Writes `doc` to `dir/name`, creating `dir` if needed.
pub fn write_label(dir: &Path, name: &str, doc: &Value) -> PathBuf {
    fs::create_dir_all(dir).expect("create label dir");
    let path = dir.join(name);
    fs::write(&path, serde_json::to_vec_pretty(doc).expect("serialize label"))
        .expect("write label file");
    path
}

/// Reads a written manifest back as raw JSON.
pub fn read_manifest(path: &Path) -> Value {
    let text = fs::read_to_string(path).expect("read manifest");
    serde_json::from_str(&text).expect("manifest is JSON")
}

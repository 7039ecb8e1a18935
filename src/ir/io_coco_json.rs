//! COCO JSON manifest writer and reader.
//!
//! The manifest is the fixed output contract of a conversion run:
//!
//! ```json
//! {
//!   "categories":  [{"supercategory": "meter", "id": 1111, "name": "meter"}],
//!   "images":      [{"file_name": "out/a.jpg", "id": 0, "width": 640, "height": 480}],
//!   "annotations": [{"area": 1600.0, "bbox": [10.0, 10.0, 40.0, 40.0],
//!                    "category_id": 1111, "id": 0, "image_id": 0, "iscrowd": 0,
//!                    "segmentation": [[10.0, 10.0, 50.0, 10.0, 50.0, 50.0, 10.0, 50.0]]}]
//! }
//! ```
//!
//! COCO bounding boxes use `[x, y, width, height]` with `(x, y)` the top-left
//! corner, unlike the XYXY boxes kept in memory.
//!
//! Entries are written in the order they were assembled. Image and
//! annotation ids are already sequential in that order, so no sorting pass
//! is applied (sorting would also reorder categories, whose order carries
//! reconciliation meaning).

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::model::{Annotation, Category, Dataset, Image};
use super::{AnnotationId, BBoxXYXY, CategoryId, ImageId};
use crate::error::LabelcocoError;

// ============================================================================
// COCO Schema Types (internal to this module)
// ============================================================================

/// Top-level COCO dataset structure.
#[derive(Debug, Serialize, Deserialize)]
struct CocoDataset {
    categories: Vec<CocoCategory>,
    images: Vec<CocoImage>,
    annotations: Vec<CocoAnnotation>,
}

/// COCO image entry.
#[derive(Debug, Serialize, Deserialize)]
struct CocoImage {
    file_name: String,
    id: ImageId,
    width: u32,
    height: u32,
}

/// COCO category entry.
#[derive(Debug, Serialize, Deserialize)]
struct CocoCategory {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    supercategory: Option<String>,
    id: CategoryId,
    name: String,
}

/// COCO annotation entry.
#[derive(Debug, Serialize, Deserialize)]
struct CocoAnnotation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    area: Option<f64>,

    /// COCO bbox format: [x, y, width, height] with (x,y) as top-left corner
    bbox: [f64; 4],

    category_id: CategoryId,
    id: AnnotationId,
    image_id: ImageId,

    #[serde(default)]
    iscrowd: u8,

    /// Polygon segmentation. Detection readers only need the bbox, so any
    /// shape (including RLE objects) is accepted on input.
    #[serde(default)]
    segmentation: serde_json::Value,
}

// ============================================================================
// Public API
// ============================================================================

/// Writes a manifest to a COCO JSON file.
///
/// # Errors
/// Returns an error if the file cannot be created or written.
pub fn write_coco_json(path: &Path, dataset: &Dataset) -> Result<(), LabelcocoError> {
    let file = File::create(path).map_err(LabelcocoError::Io)?;
    let mut writer = BufWriter::new(file);

    let coco = ir_to_coco(dataset);

    serde_json::to_writer(&mut writer, &coco).map_err(|source| {
        LabelcocoError::ManifestWrite {
            path: path.to_path_buf(),
            source,
        }
    })?;
    writer.flush().map_err(LabelcocoError::Io)
}

/// Reads a manifest back from a COCO JSON file.
///
/// # Example
/// ```no_run
/// use std::path::Path;
/// use labelcoco::ir::io_coco_json::read_coco_json;
///
/// let dataset = read_coco_json(Path::new("output/batch1.json"))?;
/// println!("{} images", dataset.images.len());
/// # Ok::<(), labelcoco::LabelcocoError>(())
/// ```
pub fn read_coco_json(path: &Path) -> Result<Dataset, LabelcocoError> {
    let file = File::open(path).map_err(LabelcocoError::Io)?;
    let reader = BufReader::new(file);

    let coco: CocoDataset =
        serde_json::from_reader(reader).map_err(|source| LabelcocoError::ManifestParse {
            path: path.to_path_buf(),
            source,
        })?;

    Ok(coco_to_ir(coco))
}

/// Reads a manifest from a COCO JSON string.
///
/// Useful for testing without file I/O.
pub fn from_coco_str(json: &str) -> Result<Dataset, serde_json::Error> {
    let coco: CocoDataset = serde_json::from_str(json)?;
    Ok(coco_to_ir(coco))
}

/// Writes a manifest to a COCO JSON string.
///
/// Useful for testing without file I/O.
pub fn to_coco_string(dataset: &Dataset) -> Result<String, serde_json::Error> {
    serde_json::to_string(&ir_to_coco(dataset))
}

// ============================================================================
// Conversion: COCO -> IR
// ============================================================================

fn coco_to_ir(coco: CocoDataset) -> Dataset {
    let images = coco
        .images
        .into_iter()
        .map(|img| Image::new(img.id, img.file_name, img.width, img.height))
        .collect();

    let categories = coco
        .categories
        .into_iter()
        .map(|cat| match cat.supercategory {
            Some(supercategory) => Category::with_supercategory(cat.id, cat.name, supercategory),
            None => Category::new(cat.id, cat.name),
        })
        .collect();

    let annotations = coco
        .annotations
        .into_iter()
        .map(|ann| {
            let [x, y, w, h] = ann.bbox;
            let mut annotation = Annotation::new(
                ann.id,
                ann.image_id,
                ann.category_id,
                BBoxXYXY::from_xywh(x, y, w, h),
            );
            annotation.iscrowd = ann.iscrowd != 0;
            annotation
        })
        .collect();

    Dataset {
        categories,
        images,
        annotations,
    }
}

// ============================================================================
// Conversion: IR -> COCO
// ============================================================================

fn ir_to_coco(dataset: &Dataset) -> CocoDataset {
    let categories = dataset
        .categories
        .iter()
        .map(|cat| CocoCategory {
            supercategory: Some(cat.supercategory.clone()),
            id: cat.id,
            name: cat.name.clone(),
        })
        .collect();

    let images = dataset
        .images
        .iter()
        .map(|img| CocoImage {
            file_name: img.file_name.clone(),
            id: img.id,
            width: img.width,
            height: img.height,
        })
        .collect();

    let annotations = dataset
        .annotations
        .iter()
        .map(|ann| {
            let (x, y, w, h) = ann.bbox.to_xywh();
            CocoAnnotation {
                area: Some(ann.area()),
                bbox: [x, y, w, h],
                category_id: ann.category_id,
                id: ann.id,
                image_id: ann.image_id,
                iscrowd: u8::from(ann.iscrowd),
                segmentation: serde_json::json!(ann.segmentation()),
            }
        })
        .collect();

    CocoDataset {
        categories,
        images,
        annotations,
    }
}

// ============================================================================
// Tests
// ============================================================================

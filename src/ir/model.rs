//! Core manifest model.
//!
//! These types mirror the entries of a COCO detection manifest. The
//! assembler builds them in memory, and `io_coco_json` maps them to and from
//! the wire schema.

use super::bbox::BBoxXYXY;
use super::ids::{AnnotationId, CategoryId, ImageId};

/// A complete dataset manifest: every image, annotation and category
/// produced by one conversion run.
#[derive(Clone, Debug, Default)]
pub struct Dataset {
    /// All category definitions, in reconciliation order.
    pub categories: Vec<Category>,

    /// All images, in processing order.
    pub images: Vec<Image>,

    /// All annotations (bounding boxes with labels), in processing order.
    pub annotations: Vec<Annotation>,
}

/// An image in the dataset.
#[derive(Clone, Debug, PartialEq)]
pub struct Image {
    /// Unique identifier for this image.
    pub id: ImageId,

    /// Path the decoded image was written to.
    pub file_name: String,

    /// Width of the image in pixels.
    pub width: u32,

    /// Height of the image in pixels.
    pub height: u32,
}

impl Image {
    /// Creates a new image with the given properties.
    pub fn new(
        id: impl Into<ImageId>,
        file_name: impl Into<String>,
        width: u32,
        height: u32,
    ) -> Self {
        Self {
            id: id.into(),
            file_name: file_name.into(),
            width,
            height,
        }
    }
}

/// A category (class label) in the dataset.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Category {
    /// Category id, either an integer label or a synthetic id.
    pub id: CategoryId,

    /// Name of the category (e.g., "meter", "7").
    pub name: String,

    /// Supercategory. Conversion always sets it to the name.
    pub supercategory: String,
}

impl Category {
    /// Creates a category whose supercategory equals its name.
    pub fn new(id: impl Into<CategoryId>, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: id.into(),
            supercategory: name.clone(),
            name,
        }
    }

    /// Creates a category with an explicit supercategory.
    pub fn with_supercategory(
        id: impl Into<CategoryId>,
        name: impl Into<String>,
        supercategory: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            supercategory: supercategory.into(),
        }
    }
}

/// An annotation (bounding box with label) in the dataset.
#[derive(Clone, Debug, PartialEq)]
pub struct Annotation {
    /// Unique identifier for this annotation.
    pub id: AnnotationId,

    /// ID of the image this annotation belongs to.
    pub image_id: ImageId,

    /// ID of the category (class) for this annotation.
    pub category_id: CategoryId,

    /// Bounding box in pixel coordinates (XYXY format).
    pub bbox: BBoxXYXY,

    /// COCO crowd flag. Boxes drawn by hand are never crowd regions.
    pub iscrowd: bool,
}

impl Annotation {
    /// Creates a new non-crowd annotation.
    pub fn new(
        id: impl Into<AnnotationId>,
        image_id: impl Into<ImageId>,
        category_id: impl Into<CategoryId>,
        bbox: BBoxXYXY,
    ) -> Self {
        Self {
            id: id.into(),
            image_id: image_id.into(),
            category_id: category_id.into(),
            bbox,
            iscrowd: false,
        }
    }

    /// Area of the box, `width * height`.
    pub fn area(&self) -> f64 {
        self.bbox.area()
    }

    /// Single-polygon segmentation equal to the box outline.
    pub fn segmentation(&self) -> Vec<Vec<f64>> {
        vec![self.bbox.polygon().to_vec()]
    }
}

//! In-memory representation of labeling-tool records and the COCO manifest.
//!
//! Two sides live here:
//!
//! 1. **Input records** ([`io_labelme_json`]): one label file, as written by
//!    the annotation tool, with raw labels and unordered corner points.
//!
//! 2. **Manifest model** ([`Dataset`] and friends): the categories, images and
//!    annotations that make up a COCO detection manifest, with boxes held in
//!    canonical XYXY pixel form and typed ids that cannot be mixed up.
//!
//! # Example
//!
//! ```
//! use labelcoco::ir::{Annotation, BBoxXYXY, Category, Coord, Dataset, Image};
//!
//! let bbox = BBoxXYXY::from_corners(Coord::new(50.0, 50.0), Coord::new(10.0, 10.0), 100, 100);
//! let dataset = Dataset {
//!     categories: vec![Category::new(7i64, "7")],
//!     images: vec![Image::new(0u64, "output/0001.jpg", 100, 100)],
//!     annotations: vec![Annotation::new(0u64, 0u64, 7i64, bbox)],
//! };
//! assert_eq!(dataset.annotations[0].area(), 1600.0);
//! ```

mod bbox;
mod coord;
mod ids;
pub mod io_coco_json;
pub mod io_labelme_json;
mod model;

// Re-export core types for convenient access
pub use bbox::BBoxXYXY;
pub use coord::Coord;
pub use ids::{AnnotationId, CategoryId, ImageId};
pub use io_labelme_json::{InputRecord, RawLabel, RawShape};
pub use model::{Annotation, Category, Dataset, Image};

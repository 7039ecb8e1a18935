//! Reader for per-image labeling-tool JSON files.
//!
//! Each file describes exactly one image, embedded as base64 text, and the
//! rectangles drawn on it:
//!
//! ```json
//! {
//!   "imagePath": "0001.jpg",
//!   "imageData": "/9j/4AAQSkZJRg...",
//!   "imageWidth": 640,
//!   "imageHeight": 480,
//!   "shapes": [
//!     {"label": "7", "points": [[10, 20], [110, 220]], "shape_type": "rectangle"},
//!     {"label": "meter", "points": [[300.5, 40], [250, 90.25]]}
//!   ]
//! }
//! ```
//!
//! The document is walked as a [`serde_json::Value`] rather than derived
//! into a struct, so that a rejected file can be reported with the exact
//! field that is missing or malformed.

use std::fs;
use std::path::Path;

use serde_json::{Map, Value};

use super::Coord;
use crate::error::LabelcocoError;

/// A label as written by the annotator.
///
/// Labels that read as integers are category ids already. Anything else is
/// a free-form class name that needs a synthetic id.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum RawLabel {
    Integer(i64),
    Text(String),
}

impl RawLabel {
    /// Interprets a JSON label value using integer-coercion rules.
    ///
    /// Integers, finite floats (truncated toward zero) and strings holding a
    /// base-10 integer (surrounding whitespace allowed) become
    /// [`RawLabel::Integer`]. Other strings become [`RawLabel::Text`]
    /// verbatim. Any other JSON value becomes the text of its JSON encoding.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    RawLabel::Integer(i)
                } else {
                    match n.as_f64() {
                        Some(f) if f.is_finite() && f.trunc().abs() < i64::MAX as f64 => {
                            RawLabel::Integer(f.trunc() as i64)
                        }
                        _ => RawLabel::Text(n.to_string()),
                    }
                }
            }
            Value::String(s) => match s.trim().parse::<i64>() {
                Ok(i) => RawLabel::Integer(i),
                Err(_) => RawLabel::Text(s.clone()),
            },
            other => RawLabel::Text(other.to_string()),
        }
    }
}

impl std::fmt::Display for RawLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RawLabel::Integer(i) => write!(f, "{i}"),
            RawLabel::Text(s) => write!(f, "{s}"),
        }
    }
}

/// One labeled rectangle, before normalization.
#[derive(Clone, Debug, PartialEq)]
pub struct RawShape {
    pub label: RawLabel,
    /// Two opposite corners, in no particular order.
    pub points: [Coord; 2],
    /// The tool's own shape kind, if recorded. Only kept for diagnostics.
    pub shape_type: Option<String>,
}

/// The parsed contents of one label file.
#[derive(Clone, Debug, PartialEq)]
pub struct InputRecord {
    /// Image file name as recorded by the tool (may include directories).
    pub image_path: String,
    /// Base64-encoded image bytes.
    pub image_data: String,
    pub image_width: u32,
    pub image_height: u32,
    pub shapes: Vec<RawShape>,
}

/// Reads and validates one label file.
///
/// # Errors
/// Returns [`LabelcocoError::RecordParse`] naming the file and the reason if
/// the file cannot be read, is not a JSON object, or lacks a required field.
pub fn read_labelme_json(path: &Path) -> Result<InputRecord, LabelcocoError> {
    let bytes = fs::read(path).map_err(|source| LabelcocoError::RecordParse {
        path: path.to_path_buf(),
        reason: format!("cannot read file: {source}"),
    })?;
    from_labelme_slice(&bytes, path)
}

/// Parses a label file from a string. `path` is only used for error context.
pub fn from_labelme_str(json: &str, path: &Path) -> Result<InputRecord, LabelcocoError> {
    from_labelme_slice(json.as_bytes(), path)
}

/// Parses a label file from raw bytes. `path` is only used for error context.
///
/// Useful for fuzzing and processing raw bytes without UTF-8 validation overhead.
pub fn from_labelme_slice(bytes: &[u8], path: &Path) -> Result<InputRecord, LabelcocoError> {
    let value: Value = serde_json::from_slice(bytes).map_err(|source| LabelcocoError::RecordParse {
        path: path.to_path_buf(),
        reason: format!("invalid JSON: {source}"),
    })?;

    parse_record(&value).map_err(|reason| LabelcocoError::RecordParse {
        path: path.to_path_buf(),
        reason,
    })
}

fn parse_record(value: &Value) -> Result<InputRecord, String> {
    let obj = value
        .as_object()
        .ok_or_else(|| "file content is not a JSON object".to_string())?;

    let image_path = required_str(obj, "imagePath")?;
    if image_path.is_empty() {
        return Err("field 'imagePath' is empty".to_string());
    }
    let image_data = required_str(obj, "imageData")?;

    let shapes = required(obj, "shapes")?
        .as_array()
        .ok_or_else(|| "field 'shapes' is not a list".to_string())?;

    let image_width = required_dimension(obj, "imageWidth")?;
    let image_height = required_dimension(obj, "imageHeight")?;

    let shapes = shapes
        .iter()
        .enumerate()
        .map(|(idx, shape)| parse_shape(shape).map_err(|msg| format!("shapes[{idx}]: {msg}")))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(InputRecord {
        image_path: image_path.to_string(),
        image_data: image_data.to_string(),
        image_width,
        image_height,
        shapes,
    })
}

fn required<'a>(obj: &'a Map<String, Value>, field: &str) -> Result<&'a Value, String> {
    match obj.get(field) {
        Some(Value::Null) | None => Err(format!("missing field '{field}'")),
        Some(value) => Ok(value),
    }
}

fn required_str<'a>(obj: &'a Map<String, Value>, field: &str) -> Result<&'a str, String> {
    required(obj, field)?
        .as_str()
        .ok_or_else(|| format!("field '{field}' is not a string"))
}

fn required_dimension(obj: &Map<String, Value>, field: &str) -> Result<u32, String> {
    let value = required(obj, field)?;

    let raw = match value.as_u64() {
        Some(n) => n,
        None => match value.as_f64() {
            Some(f) if f.fract() == 0.0 && f >= 0.0 && f <= u32::MAX as f64 => f as u64,
            _ => return Err(format!("field '{field}' is not a non-negative integer: {value}")),
        },
    };

    match u32::try_from(raw) {
        Ok(0) => Err(format!("field '{field}' must be positive")),
        Ok(n) => Ok(n),
        Err(_) => Err(format!("field '{field}' value {raw} does not fit in u32")),
    }
}

fn parse_shape(value: &Value) -> Result<RawShape, String> {
    let obj = value
        .as_object()
        .ok_or_else(|| "shape is not a JSON object".to_string())?;

    let label = RawLabel::from_json(
        obj.get("label")
            .ok_or_else(|| "missing field 'label'".to_string())?,
    );

    let points = required(obj, "points")?
        .as_array()
        .ok_or_else(|| "field 'points' is not a list".to_string())?;

    if points.len() < 2 {
        return Err(format!(
            "expected two corner points, found {}",
            points.len()
        ));
    }
    if points.len() > 2 {
        log::debug!(
            "shape labelled '{}' has {} points; using the first two as corners",
            label,
            points.len()
        );
    }

    let shape_type = obj
        .get("shape_type")
        .and_then(Value::as_str)
        .map(str::to_string);

    Ok(RawShape {
        label,
        points: [parse_point(&points[0])?, parse_point(&points[1])?],
        shape_type,
    })
}

fn parse_point(value: &Value) -> Result<Coord, String> {
    match value.as_array().map(Vec::as_slice) {
        Some([x, y]) => Ok(Coord::new(coordinate(x)?, coordinate(y)?)),
        _ => Err(format!("point {value} is not an [x, y] pair")),
    }
}

/// Coerces a coordinate to `f64`. Numeric strings are accepted.
fn coordinate(value: &Value) -> Result<f64, String> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| format!("coordinate {value} is not a number"))
}

use std::path::PathBuf;
use thiserror::Error;

use crate::validation::ValidationReport;

/// The main error type for labelcoco operations.
#[derive(Debug, Error)]
pub enum LabelcocoError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cannot discover input files under {path}: {message}")]
    Discovery { path: PathBuf, message: String },

    #[error("Skipping label file {path}: {reason}")]
    RecordParse { path: PathBuf, reason: String },

    #[error("Failed to write image {path}: {reason}")]
    Materialize { path: PathBuf, reason: String },

    #[error("All {capacity} synthetic category ids are in use; cannot allocate one for label '{label}'")]
    SyntheticIdsExhausted { label: String, capacity: usize },

    #[error("Failed to write manifest to {path}: {source}")]
    ManifestWrite {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to parse manifest from {path}: {source}")]
    ManifestParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid category whitelist: {message}")]
    InvalidCategories { message: String },

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Validation failed with {error_count} error(s) and {warning_count} warning(s)")]
    ValidationFailed {
        error_count: usize,
        warning_count: usize,
        report: ValidationReport,
    },
}

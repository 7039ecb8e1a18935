//! Input file discovery.
//!
//! Label files sit at a fixed nesting depth below the root: depth 0 means
//! `root/*.json`, depth 1 means `root/*/*.json`, and so on. Every directory
//! on the way down is descended.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use walkdir::WalkDir;

use crate::error::LabelcocoError;

/// Extension of labeling-tool files (compared ASCII case-insensitively).
pub const LABEL_FILE_EXTENSION: &str = "json";

/// Collects label files exactly `depth` directory levels below `root`.
///
/// Hidden files (leading `.`) and files at other depths are ignored. The
/// result is sorted by path. Subdirectories that cannot be read are logged
/// and skipped.
///
/// # Errors
/// Returns [`LabelcocoError::Discovery`] if `root` does not exist, is not a
/// directory, or cannot be listed.
pub fn discover(root: &Path, depth: usize) -> Result<Vec<PathBuf>, LabelcocoError> {
    let discovery_error = |message: String| LabelcocoError::Discovery {
        path: root.to_path_buf(),
        message,
    };

    let metadata = fs::metadata(root).map_err(|source| discovery_error(source.to_string()))?;
    if !metadata.is_dir() {
        return Err(discovery_error("not a directory".to_string()));
    }
    fs::read_dir(root).map_err(|source| discovery_error(source.to_string()))?;

    let mut files = Vec::new();
    let walker = WalkDir::new(root)
        .follow_links(true)
        .min_depth(depth + 1)
        .max_depth(depth + 1);

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(source) => {
                warn!(
                    "skipping unreadable entry while scanning {}: {source}",
                    root.display()
                );
                continue;
            }
        };

        if entry.file_type().is_file() && is_label_file(entry.path()) {
            files.push(entry.into_path());
        }
    }

    files.sort();
    debug!(
        "discovered {} label file(s) under {} at depth {}",
        files.len(),
        root.display(),
        depth
    );
    Ok(files)
}

fn is_label_file(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
        return false;
    };
    if name.starts_with('.') {
        return false;
    }

    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(LABEL_FILE_EXTENSION))
}

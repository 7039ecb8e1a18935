//! Manifest assembly: label files in, one COCO manifest out.
//!
//! A run walks the discovered label files in order. Each file is parsed, its
//! image is written to the output directory, and its shapes become
//! annotations. A file that fails parsing or image decoding is skipped as a
//! whole and recorded in the [`ConversionReport`]. It never aborts the run.
//!
//! All run state (category table, id counters, the growing manifest) lives
//! in a [`ConversionRun`], so independent runs never share anything.

pub mod report;

pub use report::{
    ConversionCounts, ConversionIssue, ConversionIssueCode, ConversionReport, ConversionSeverity,
    SkipStage, SkippedFile,
};

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::category::{self, CategoryTable, CategoryWhitelist, Resolution};
use crate::discovery::discover;
use crate::error::LabelcocoError;
use crate::ir::io_coco_json::write_coco_json;
use crate::ir::io_labelme_json::read_labelme_json;
use crate::ir::{Annotation, AnnotationId, BBoxXYXY, CategoryId, Dataset, Image, ImageId};
use crate::materialize::{image_destination, materialize};
use crate::validation::{validate_manifest, ValidationReport};

/// File name used when the input root has no usable final segment.
pub const FALLBACK_MANIFEST_STEM: &str = "dataset";

/// Options for assembling a manifest from an already discovered file list.
#[derive(Clone, Debug, Default)]
pub struct AssembleOptions {
    /// Directory decoded images are written to.
    pub output_dir: PathBuf,
    /// Category names that take precedence and are always emitted.
    pub whitelist: CategoryWhitelist,
    /// Seed for synthetic category ids; `None` draws from OS entropy.
    pub seed: Option<u64>,
}

/// Options for a full conversion run.
#[derive(Clone, Debug, Default)]
pub struct ConvertOptions {
    /// Root directory of the label files.
    pub root: PathBuf,
    /// Directory for decoded images and the manifest.
    pub output_dir: PathBuf,
    /// Directory levels between `root` and the label files.
    pub depth: usize,
    pub whitelist: CategoryWhitelist,
    pub seed: Option<u64>,
}

/// Result of processing one label file.
#[derive(Clone, Debug, PartialEq)]
pub enum FileOutcome {
    /// The file contributed one image and `annotations` boxes.
    Converted {
        image_id: ImageId,
        annotations: usize,
    },
    /// The file contributed nothing.
    Skipped(SkippedFile),
}

/// A finished manifest together with its run report.
#[derive(Clone, Debug)]
pub struct Assembly {
    pub dataset: Dataset,
    pub report: ConversionReport,
}

/// Everything a completed conversion produced.
#[derive(Clone, Debug)]
pub struct Conversion {
    pub manifest_path: PathBuf,
    pub dataset: Dataset,
    pub report: ConversionReport,
    pub validation: ValidationReport,
}

/// Mutable state of one conversion run.
pub struct ConversionRun<'a> {
    options: &'a AssembleOptions,
    table: CategoryTable,
    numeric_ids: BTreeSet<CategoryId>,
    next_image_id: ImageId,
    next_annotation_id: AnnotationId,
    dataset: Dataset,
    report: ConversionReport,
}

impl<'a> ConversionRun<'a> {
    /// Starts an empty run.
    pub fn new(options: &'a AssembleOptions) -> Self {
        let table = match options.seed {
            Some(seed) => CategoryTable::with_seed(seed),
            None => CategoryTable::new(),
        };

        Self {
            options,
            table,
            numeric_ids: BTreeSet::new(),
            next_image_id: ImageId::default(),
            next_annotation_id: AnnotationId::default(),
            dataset: Dataset::default(),
            report: ConversionReport::default(),
        }
    }

    /// Converts one label file, or records why it was skipped.
    ///
    /// # Errors
    /// Only run-fatal conditions are returned as errors (running out of
    /// synthetic category ids). Per-file problems come back as
    /// [`FileOutcome::Skipped`].
    pub fn process_file(&mut self, path: &Path) -> Result<FileOutcome, LabelcocoError> {
        self.report.discovered += 1;

        let record = match read_labelme_json(path) {
            Ok(record) => record,
            Err(err) => return Ok(self.skip(path, SkipStage::Parse, err)),
        };

        let destination = match image_destination(&self.options.output_dir, &record.image_path) {
            Ok(destination) => destination,
            Err(reason) => {
                let err = LabelcocoError::RecordParse {
                    path: path.to_path_buf(),
                    reason,
                };
                return Ok(self.skip(path, SkipStage::Parse, err));
            }
        };

        let image_id = self.next_image_id;
        let written = match materialize(&record.image_data, &destination) {
            Ok(written) => written,
            Err(err) => return Ok(self.skip(path, SkipStage::Materialize, err)),
        };

        if let Some((width, height)) = written.header_dimensions {
            if (width, height) != (record.image_width, record.image_height) {
                self.report.add(ConversionIssue::warning(
                    ConversionIssueCode::ImageSizeMismatch,
                    format!(
                        "{}: image header is {}x{} but the label file says {}x{}",
                        path.display(),
                        width,
                        height,
                        record.image_width,
                        record.image_height
                    ),
                ));
            }
        }

        for shape in &record.shapes {
            let resolution = self.table.resolve(&shape.label)?;
            match resolution {
                Resolution::Numeric(id) => {
                    self.numeric_ids.insert(id);
                }
                Resolution::Allocated(id) => {
                    self.report.add(ConversionIssue::info(
                        ConversionIssueCode::SyntheticCategoryId,
                        format!("label '{}' assigned synthetic category id {}", shape.label, id),
                    ));
                }
                Resolution::Existing(_) => {}
            }

            let [p0, p1] = shape.points;
            let bbox = BBoxXYXY::from_corners(p0, p1, record.image_width, record.image_height);

            self.dataset.annotations.push(Annotation::new(
                self.next_annotation_id,
                image_id,
                resolution.id(),
                bbox,
            ));
            self.next_annotation_id = self.next_annotation_id.next();
        }

        self.dataset.images.push(Image::new(
            image_id,
            destination.to_string_lossy(),
            record.image_width,
            record.image_height,
        ));
        self.next_image_id = image_id.next();

        debug!(
            "{} -> image {} with {} annotation(s)",
            path.display(),
            image_id,
            record.shapes.len()
        );
        Ok(FileOutcome::Converted {
            image_id,
            annotations: record.shapes.len(),
        })
    }

    fn skip(&mut self, path: &Path, stage: SkipStage, err: LabelcocoError) -> FileOutcome {
        let reason = match err {
            LabelcocoError::RecordParse { reason, .. } => reason,
            LabelcocoError::Materialize { path: image, reason } => {
                format!("{}: {}", image.display(), reason)
            }
            other => other.to_string(),
        };
        warn!("skipping {} ({} stage): {}", path.display(), stage, reason);
        let skipped = SkippedFile::new(path, stage, reason);
        self.report.skip(skipped.clone());
        FileOutcome::Skipped(skipped)
    }

    /// Reconciles categories and returns the finished manifest.
    pub fn finish(mut self) -> Assembly {
        let reconciled =
            category::reconcile(&self.numeric_ids, &self.table, &self.options.whitelist);

        for id in &reconciled.not_whitelisted {
            warn!("category id {id} appears in the label files but not in the category whitelist; it is still added to the manifest");
            self.report.add(ConversionIssue::warning(
                ConversionIssueCode::CategoryNotWhitelisted,
                format!("category {id} is not in the whitelist but is used by annotations"),
            ));
        }
        for (label, id) in &reconciled.collisions {
            warn!("synthetic id {id} for label '{label}' equals an integer label in the data");
            self.report.add(ConversionIssue::warning(
                ConversionIssueCode::CategoryIdCollision,
                format!(
                    "synthetic id {id} for label '{label}' collides with integer label {id}; rerun with a different --seed"
                ),
            ));
        }

        self.dataset.categories = reconciled.categories;
        self.report.output = ConversionCounts {
            images: self.dataset.images.len(),
            categories: self.dataset.categories.len(),
            annotations: self.dataset.annotations.len(),
        };

        Assembly {
            dataset: self.dataset,
            report: self.report,
        }
    }
}

/// Processes `files` in order and assembles one manifest.
///
/// # Errors
/// Fails only when a run-fatal condition occurs (see
/// [`ConversionRun::process_file`]). Unreadable or malformed files are
/// skipped and listed in the report.
pub fn assemble(files: &[PathBuf], options: &AssembleOptions) -> Result<Assembly, LabelcocoError> {
    let mut run = ConversionRun::new(options);
    for path in files {
        run.process_file(path)?;
    }
    Ok(run.finish())
}

/// Manifest location: `<output_dir>/<root name>.json`.
pub fn manifest_path(root: &Path, output_dir: &Path) -> PathBuf {
    let stem = root
        .file_name()
        .map(|name| name.to_os_string())
        .or_else(|| {
            fs::canonicalize(root)
                .ok()
                .and_then(|abs| abs.file_name().map(|name| name.to_os_string()))
        })
        .unwrap_or_else(|| FALLBACK_MANIFEST_STEM.into());

    let mut file_name = stem;
    file_name.push(".json");
    output_dir.join(file_name)
}

/// Runs a full conversion: discover, assemble, validate, write.
///
/// # Errors
/// Fails if the root cannot be scanned, the output directory cannot be
/// created, synthetic ids run out, or the manifest cannot be written.
pub fn convert(options: &ConvertOptions) -> Result<Conversion, LabelcocoError> {
    let files = discover(&options.root, options.depth)?;
    info!(
        "found {} label file(s) under {}",
        files.len(),
        options.root.display()
    );

    fs::create_dir_all(&options.output_dir)?;

    let assemble_options = AssembleOptions {
        output_dir: options.output_dir.clone(),
        whitelist: options.whitelist.clone(),
        seed: options.seed,
    };
    let Assembly {
        dataset,
        mut report,
    } = assemble(&files, &assemble_options)?;
    report.root = options.root.display().to_string();

    let validation = validate_manifest(&dataset);
    for issue in &validation.issues {
        warn!("{issue}");
    }

    let manifest_path = manifest_path(&options.root, &options.output_dir);
    write_coco_json(&manifest_path, &dataset)?;
    report.manifest = Some(manifest_path.display().to_string());

    info!(
        "wrote {} image(s) and manifest {} ({} skipped)",
        dataset.images.len(),
        manifest_path.display(),
        report.skipped.len()
    );

    Ok(Conversion {
        manifest_path,
        dataset,
        report,
        validation,
    })
}

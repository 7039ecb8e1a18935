//! Labelcoco: labeling-tool JSON files to a COCO detection manifest.
//!
//! Annotation tools in the LabelMe/LabelImg family write one JSON file per
//! image, with the image embedded as base64 and each box stored as two
//! corner points. Labelcoco decodes every embedded image into an output
//! directory and gathers all boxes into a single COCO-style manifest.
//!
//! # Modules
//!
//! - [`discovery`]: finding label files at a fixed depth under a root
//! - [`ir`]: input records, manifest types and their JSON readers/writers
//! - [`category`]: label to category-id resolution and whitelist handling
//! - [`materialize`]: base64 payload decoding
//! - [`conversion`]: the per-file pipeline and manifest assembly
//! - [`validation`]: consistency checks on the assembled manifest
//! - [`error`]: Error types for labelcoco operations

pub mod category;
pub mod conversion;
pub mod discovery;
pub mod error;
pub mod ir;
pub mod materialize;
pub mod validation;

use std::path::PathBuf;

use clap::Parser;
use log::warn;

pub use category::CategoryWhitelist;
pub use error::LabelcocoError;

/// The only label geometry understood: two opposite box corners.
pub const POINTS_LABEL_TYPE: &str = "points";

/// The labelcoco CLI application.
#[derive(Parser)]
#[command(name = "labelcoco")]
#[command(version, about)]
struct Cli {
    /// Root directory of the label files.
    #[arg(long, env = "LABELCOCO_ROOT_PATH", default_value = ".")]
    root_path: PathBuf,

    /// Directory for decoded images and the manifest.
    #[arg(long, env = "LABELCOCO_OUTPUT_PATH", default_value = "output")]
    output_path: PathBuf,

    /// Directory levels between the root and the label files (0 = directly under root).
    #[arg(long, default_value_t = 0)]
    recursive_depth: usize,

    /// Shape geometry of the labels. Only 'points' is supported.
    #[arg(long, default_value = POINTS_LABEL_TYPE)]
    label_type: String,

    /// Category whitelist as ID=NAME pairs, e.g. '1111=meter,0=dog'. May be repeated.
    #[arg(long, value_parser = parse_whitelist)]
    categories: Vec<CategoryWhitelist>,

    /// Seed for synthetic category ids, for reproducible runs.
    #[arg(long)]
    seed: Option<u64>,

    /// Exit non-zero if the manifest has validation warnings.
    #[arg(long)]
    strict: bool,

    /// Output format for the run summary ('text' or 'json').
    #[arg(long, default_value = "text")]
    report: String,
}

fn parse_whitelist(value: &str) -> Result<CategoryWhitelist, String> {
    value
        .parse::<CategoryWhitelist>()
        .map_err(|err| err.to_string())
}

/// Run the labelcoco CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), LabelcocoError> {
    let cli = Cli::parse();

    if !matches!(cli.report.as_str(), "text" | "json") {
        return Err(LabelcocoError::UnsupportedFormat(format!(
            "'{}' (supported report formats: text, json)",
            cli.report
        )));
    }

    let mut whitelist = CategoryWhitelist::new();
    for entries in cli.categories {
        whitelist.extend(entries);
    }

    let options = conversion::ConvertOptions {
        root: cli.root_path,
        output_dir: cli.output_path,
        depth: cli.recursive_depth,
        whitelist,
        seed: cli.seed,
    };

    let label_type_note = (cli.label_type != POINTS_LABEL_TYPE).then(|| {
        format!(
            "label type '{}' is not supported; shapes were read as two corner points",
            cli.label_type
        )
    });
    if let Some(note) = &label_type_note {
        warn!("{note}");
    }

    let mut outcome = conversion::convert(&options)?;
    if let Some(note) = label_type_note {
        outcome.report.add(conversion::ConversionIssue::info(
            conversion::ConversionIssueCode::UnsupportedLabelType,
            note,
        ));
    }

    match cli.report.as_str() {
        "json" => {
            let summary = serde_json::json!({
                "conversion": &outcome.report,
                "validation": &outcome.validation,
            });
            let text = serde_json::to_string_pretty(&summary).map_err(|source| {
                LabelcocoError::ManifestWrite {
                    path: PathBuf::from("<stdout>"),
                    source,
                }
            })?;
            println!("{}", text);
        }
        _ => {
            print!("{}", outcome.report);
            if !outcome.validation.is_clean() {
                println!();
                print!("{}", outcome.validation);
            }
        }
    }

    let validation = outcome.validation;
    let has_errors = validation.error_count() > 0;
    let has_warnings = validation.warning_count() > 0;

    if has_errors || (cli.strict && has_warnings) {
        Err(LabelcocoError::ValidationFailed {
            error_count: validation.error_count(),
            warning_count: validation.warning_count(),
            report: validation,
        })
    } else {
        Ok(())
    }
}

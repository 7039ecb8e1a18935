//! Conversion report types.
//!
//! The report is the per-run accounting of what happened: how many label
//! files were found and converted, which ones were skipped and why, and
//! which category decisions deserve a second look.

use serde::Serialize;
use std::fmt;
use std::path::Path;

/// A report generated by one conversion run.
#[derive(Clone, Debug, Default, Serialize)]
pub struct ConversionReport {
    /// Input root the label files were discovered under.
    pub root: String,
    /// Manifest path, once written.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manifest: Option<String>,
    /// Number of label files discovered.
    pub discovered: usize,
    /// Counts in the emitted manifest.
    pub output: ConversionCounts,
    /// Files that contributed nothing to the manifest.
    pub skipped: Vec<SkippedFile>,
    /// Warnings and notes raised during the run.
    pub issues: Vec<ConversionIssue>,
}

impl ConversionReport {
    /// Create a new empty report for a run over `root`.
    pub fn new(root: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            ..Default::default()
        }
    }

    /// Add an issue to the report.
    pub fn add(&mut self, issue: ConversionIssue) {
        self.issues.push(issue);
    }

    /// Record a skipped file.
    pub fn skip(&mut self, skipped: SkippedFile) {
        self.skipped.push(skipped);
    }

    /// Number of files that made it into the manifest.
    pub fn converted(&self) -> usize {
        self.output.images
    }

    /// Count of warning-level issues.
    pub fn warning_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == ConversionSeverity::Warning)
            .count()
    }

    /// Count of info-level issues.
    pub fn info_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == ConversionSeverity::Info)
            .count()
    }

    /// Issues carrying the given code.
    pub fn issues_with_code(
        &self,
        code: ConversionIssueCode,
    ) -> impl Iterator<Item = &ConversionIssue> {
        self.issues.iter().filter(move |i| i.code == code)
    }
}

impl fmt::Display for ConversionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Converted {} of {} label file(s) under {}",
            self.converted(),
            self.discovered,
            self.root
        )?;
        writeln!(
            f,
            "  {} images, {} categories, {} annotations",
            self.output.images, self.output.categories, self.output.annotations
        )?;
        if let Some(manifest) = &self.manifest {
            writeln!(f, "  manifest: {}", manifest)?;
        }

        if !self.skipped.is_empty() {
            writeln!(f)?;
            writeln!(f, "Skipped ({}):", self.skipped.len())?;
            for skipped in &self.skipped {
                writeln!(f, "  - {}", skipped)?;
            }
        }

        let warnings = self.warning_count();
        if warnings > 0 {
            writeln!(f)?;
            writeln!(f, "Warnings ({}):", warnings)?;
            for issue in self
                .issues
                .iter()
                .filter(|i| i.severity == ConversionSeverity::Warning)
            {
                writeln!(f, "  - {}", issue.message)?;
            }
        }

        let infos = self.info_count();
        if infos > 0 {
            writeln!(f)?;
            writeln!(f, "Notes ({}):", infos)?;
            for issue in self
                .issues
                .iter()
                .filter(|i| i.severity == ConversionSeverity::Info)
            {
                writeln!(f, "  - {}", issue.message)?;
            }
        }

        Ok(())
    }
}

/// Counts of manifest elements.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ConversionCounts {
    pub images: usize,
    pub categories: usize,
    pub annotations: usize,
}

/// Stage at which a label file was rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipStage {
    /// The file could not be read or lacked a required field.
    Parse,
    /// The embedded image could not be decoded or written.
    Materialize,
}

impl fmt::Display for SkipStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipStage::Parse => write!(f, "parse"),
            SkipStage::Materialize => write!(f, "image"),
        }
    }
}

/// A label file that contributed nothing to the manifest.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SkippedFile {
    pub path: String,
    pub stage: SkipStage,
    pub reason: String,
}

impl SkippedFile {
    pub fn new(path: &Path, stage: SkipStage, reason: impl Into<String>) -> Self {
        Self {
            path: path.display().to_string(),
            stage,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for SkippedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]: {}", self.path, self.stage, self.reason)
    }
}

/// A single issue raised during conversion.
#[derive(Clone, Debug, Serialize)]
pub struct ConversionIssue {
    pub severity: ConversionSeverity,
    pub code: ConversionIssueCode,
    pub message: String,
}

impl ConversionIssue {
    /// Create a warning-level issue.
    pub fn warning(code: ConversionIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: ConversionSeverity::Warning,
            code,
            message: message.into(),
        }
    }

    /// Create an info-level issue.
    pub fn info(code: ConversionIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: ConversionSeverity::Info,
            code,
            message: message.into(),
        }
    }
}

/// Severity level for conversion issues.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionSeverity {
    /// Something in the output likely needs attention.
    Warning,
    /// A policy decision worth knowing about.
    Info,
}

/// Stable issue codes for programmatic consumption.
///
/// These codes are part of the JSON report schema and should remain stable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionIssueCode {
    /// A text label was given a synthetic category id.
    SyntheticCategoryId,
    /// An observed category is missing from a non-empty whitelist.
    CategoryNotWhitelisted,
    /// A synthetic id equals an integer label seen in the data.
    CategoryIdCollision,
    /// The decoded image header disagrees with imageWidth/imageHeight.
    ImageSizeMismatch,
    /// The requested label type is not supported; points were assumed.
    UnsupportedLabelType,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_report_has_no_issues() {
        let report = ConversionReport::new("data");
        assert_eq!(report.warning_count(), 0);
        assert_eq!(report.info_count(), 0);
        assert_eq!(report.converted(), 0);
    }

    #[test]
    fn display_lists_skipped_files_and_warnings() {
        let mut report = ConversionReport::new("data");
        report.discovered = 2;
        report.output.images = 1;
        report.skip(SkippedFile::new(
            Path::new("data/b.json"),
            SkipStage::Parse,
            "missing field 'imageData'",
        ));
        report.add(ConversionIssue::warning(
            ConversionIssueCode::CategoryNotWhitelisted,
            "category 7 is not in the whitelist",
        ));

        let text = report.to_string();
        assert!(text.contains("Converted 1 of 2 label file(s)"));
        assert!(text.contains("data/b.json [parse]: missing field 'imageData'"));
        assert!(text.contains("Warnings (1):"));
        assert!(!text.contains("Notes"));
    }

    #[test]
    fn report_serializes_to_json() {
        let mut report = ConversionReport::new("data");
        report.skip(SkippedFile::new(
            Path::new("x.json"),
            SkipStage::Materialize,
            "not valid base64",
        ));
        report.add(ConversionIssue::info(
            ConversionIssueCode::SyntheticCategoryId,
            "label 'meter' -> 93211",
        ));

        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"stage\":\"materialize\""));
        assert!(json.contains("\"severity\":\"info\""));
        assert!(json.contains("\"code\":\"synthetic_category_id\""));
        assert!(!json.contains("\"manifest\""));
    }
}

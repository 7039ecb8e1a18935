//! Findings of a manifest check.

use serde::Serialize;
use std::fmt;

/// Everything [`validate_manifest`](super::validate_manifest) found, in
/// discovery order.
#[derive(Clone, Debug, Default, Serialize)]
pub struct ValidationReport {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, issue: ValidationIssue) {
        self.issues.push(issue);
    }

    fn with_severity(&self, severity: Severity) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(move |i| i.severity == severity)
    }

    pub fn error_count(&self) -> usize {
        self.with_severity(Severity::Error).count()
    }

    pub fn warning_count(&self) -> usize {
        self.with_severity(Severity::Warning).count()
    }

    /// No errors. Warnings are allowed.
    pub fn is_ok(&self) -> bool {
        self.error_count() == 0
    }

    /// Neither errors nor warnings.
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    /// Returns true if any issue carries `code`.
    pub fn has(&self, code: IssueCode) -> bool {
        self.issues.iter().any(|i| i.code == code)
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_clean() {
            return writeln!(f, "Manifest check passed");
        }

        writeln!(
            f,
            "Manifest check found {} error(s) and {} warning(s)",
            self.error_count(),
            self.warning_count()
        )?;
        for severity in [Severity::Error, Severity::Warning] {
            for issue in self.with_severity(severity) {
                writeln!(f, "  {issue}")?;
            }
        }
        Ok(())
    }
}

/// One finding, tied to the manifest entry it concerns.
#[derive(Clone, Debug, Serialize)]
pub struct ValidationIssue {
    pub severity: Severity,
    pub code: IssueCode,
    pub message: String,
    pub context: IssueContext,
}

impl ValidationIssue {
    pub fn error(code: IssueCode, message: impl Into<String>, context: IssueContext) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
            context,
        }
    }

    pub fn warning(code: IssueCode, message: impl Into<String>, context: IssueContext) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
            context,
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}: {} [{}]",
            self.severity,
            self.context,
            self.message,
            self.code.as_str()
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Representable in COCO, but probably not what the annotator meant.
    Warning,
    /// The manifest contradicts itself.
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// Stable, machine-readable finding codes. The JSON report uses the same
/// strings as [`IssueCode::as_str`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCode {
    DuplicateImageId,
    DuplicateAnnotationId,
    /// Two category entries share an id (whitelist or synthetic clash).
    DuplicateCategoryId,
    /// Image or annotation ids do not run 0, 1, 2, ... in order.
    IdOutOfSequence,
    MissingImageRef,
    MissingCategoryRef,
    #[serde(rename = "bbox_not_finite")]
    BBoxNotFinite,
    /// Zero or negative width or height after clamping.
    #[serde(rename = "degenerate_bbox")]
    DegenerateBBox,
}

impl IssueCode {
    pub fn as_str(self) -> &'static str {
        match self {
            IssueCode::DuplicateImageId => "duplicate_image_id",
            IssueCode::DuplicateAnnotationId => "duplicate_annotation_id",
            IssueCode::DuplicateCategoryId => "duplicate_category_id",
            IssueCode::IdOutOfSequence => "id_out_of_sequence",
            IssueCode::MissingImageRef => "missing_image_ref",
            IssueCode::MissingCategoryRef => "missing_category_ref",
            IssueCode::BBoxNotFinite => "bbox_not_finite",
            IssueCode::DegenerateBBox => "degenerate_bbox",
        }
    }
}

/// The manifest entry an issue is about.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IssueContext {
    Image { id: u64 },
    Annotation { id: u64 },
    Category { id: i64 },
}

impl fmt::Display for IssueContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueContext::Image { id } => write!(f, "image {id}"),
            IssueContext::Annotation { id } => write!(f, "annotation {id}"),
            IssueContext::Category { id } => write!(f, "category {id}"),
        }
    }
}

//! Consistency checks on an assembled manifest.
//!
//! Checks:
//! - image and annotation ids are unique and sequential from 0
//! - every annotation points at an existing image and category
//! - category ids are unique (a whitelist/synthetic-id clash shows up here)
//! - boxes are finite and have positive extent after clamping

mod report;

pub use report::{IssueCode, IssueContext, Severity, ValidationIssue, ValidationReport};

use std::collections::{HashMap, HashSet};

use crate::ir::{CategoryId, Dataset, ImageId};

/// Validates a manifest and returns a report of all issues found.
pub fn validate_manifest(dataset: &Dataset) -> ValidationReport {
    let mut report = ValidationReport::new();

    check_dense_ids(
        dataset.images.iter().map(|i| i.id.as_u64()),
        IssueCode::DuplicateImageId,
        "image",
        |id| IssueContext::Image { id },
        &mut report,
    );
    check_dense_ids(
        dataset.annotations.iter().map(|a| a.id.as_u64()),
        IssueCode::DuplicateAnnotationId,
        "annotation",
        |id| IssueContext::Annotation { id },
        &mut report,
    );
    check_category_ids(dataset, &mut report);
    check_annotations(dataset, &mut report);

    report
}

/// Ids must be unique and equal to their position.
fn check_dense_ids(
    ids: impl Iterator<Item = u64>,
    duplicate: IssueCode,
    kind: &str,
    context: impl Fn(u64) -> IssueContext,
    report: &mut ValidationReport,
) {
    let mut first_seen: HashMap<u64, usize> = HashMap::new();

    for (idx, id) in ids.enumerate() {
        if let Some(&first) = first_seen.get(&id) {
            report.add(ValidationIssue::error(
                duplicate,
                format!("{kind} id {id} is also used at position {first}"),
                context(id),
            ));
        } else {
            first_seen.insert(id, idx);
        }
        if id != idx as u64 {
            report.add(ValidationIssue::error(
                IssueCode::IdOutOfSequence,
                format!("{kind} at position {idx} has id {id}"),
                context(id),
            ));
        }
    }
}

fn check_category_ids(dataset: &Dataset, report: &mut ValidationReport) {
    let mut names: HashMap<CategoryId, &str> = HashMap::new();

    for category in &dataset.categories {
        // The manifest stays loadable; COCO tools just keep one of the names.
        match names.get(&category.id) {
            Some(first) => report.add(ValidationIssue::warning(
                IssueCode::DuplicateCategoryId,
                format!(
                    "id {} names both '{}' and '{}'",
                    category.id, first, category.name
                ),
                IssueContext::Category {
                    id: category.id.as_i64(),
                },
            )),
            None => {
                names.insert(category.id, &category.name);
            }
        }
    }
}

fn check_annotations(dataset: &Dataset, report: &mut ValidationReport) {
    let image_ids: HashSet<ImageId> = dataset.images.iter().map(|i| i.id).collect();
    let category_ids: HashSet<CategoryId> = dataset.categories.iter().map(|c| c.id).collect();

    for ann in &dataset.annotations {
        let context = || IssueContext::Annotation {
            id: ann.id.as_u64(),
        };

        if !image_ids.contains(&ann.image_id) {
            report.add(ValidationIssue::error(
                IssueCode::MissingImageRef,
                format!("references non-existent image {}", ann.image_id),
                context(),
            ));
        }
        if !category_ids.contains(&ann.category_id) {
            report.add(ValidationIssue::error(
                IssueCode::MissingCategoryRef,
                format!("references non-existent category {}", ann.category_id),
                context(),
            ));
        }

        let bbox = &ann.bbox;
        if !bbox.is_finite() {
            report.add(ValidationIssue::error(
                IssueCode::BBoxNotFinite,
                format!("box {bbox:?} has non-finite coordinates"),
                context(),
            ));
        } else if bbox.is_degenerate() {
            report.add(ValidationIssue::warning(
                IssueCode::DegenerateBBox,
                format!(
                    "box has width {:.2} and height {:.2} after clamping",
                    bbox.width(),
                    bbox.height()
                ),
                context(),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Annotation, BBoxXYXY, Category, Dataset, Image};

    fn valid_dataset() -> Dataset {
        Dataset {
            images: vec![Image::new(0u64, "out/image.jpg", 640, 480)],
            categories: vec![Category::new(1i64, "1")],
            annotations: vec![Annotation::new(
                0u64,
                0u64,
                1i64,
                BBoxXYXY::from_xyxy(10.0, 20.0, 100.0, 200.0),
            )],
        }
    }

    #[test]
    fn test_valid_manifest() {
        let report = validate_manifest(&valid_dataset());
        assert!(
            report.is_clean(),
            "Expected no issues, got: {:?}",
            report.issues
        );
    }

    #[test]
    fn test_duplicate_image_id() {
        let mut dataset = valid_dataset();
        dataset
            .images
            .push(Image::new(0u64, "out/duplicate.jpg", 640, 480));

        let report = validate_manifest(&dataset);
        assert!(report.has(IssueCode::DuplicateImageId));
        assert!(report.has(IssueCode::IdOutOfSequence));
    }

    #[test]
    fn test_annotation_ids_must_be_sequential() {
        let mut dataset = valid_dataset();
        dataset.annotations.push(Annotation::new(
            5u64,
            0u64,
            1i64,
            BBoxXYXY::from_xyxy(1.0, 1.0, 2.0, 2.0),
        ));

        let report = validate_manifest(&dataset);
        assert_eq!(report.error_count(), 1);
        assert!(report.has(IssueCode::IdOutOfSequence));
    }

    #[test]
    fn test_missing_refs() {
        let mut dataset = valid_dataset();
        dataset.annotations.push(Annotation::new(
            1u64,
            999u64,
            42i64,
            BBoxXYXY::from_xyxy(10.0, 10.0, 50.0, 50.0),
        ));

        let report = validate_manifest(&dataset);
        assert_eq!(report.error_count(), 2);
        assert!(report.has(IssueCode::MissingImageRef));
        assert!(report.has(IssueCode::MissingCategoryRef));
    }

    #[test]
    fn test_duplicate_category_id_is_a_warning() {
        let mut dataset = valid_dataset();
        dataset.categories.push(Category::new(1i64, "gauge"));

        let report = validate_manifest(&dataset);
        assert!(report.is_ok());
        assert_eq!(report.warning_count(), 1);
        assert!(report.has(IssueCode::DuplicateCategoryId));
    }

    #[test]
    fn test_degenerate_bbox_is_a_warning() {
        let mut dataset = valid_dataset();
        dataset.annotations[0].bbox = BBoxXYXY::from_xyxy(200.0, 20.0, 99.0, 200.0);

        let report = validate_manifest(&dataset);
        assert!(report.is_ok());
        assert!(report.has(IssueCode::DegenerateBBox));
    }

    #[test]
    fn test_bbox_not_finite() {
        let mut dataset = valid_dataset();
        dataset.annotations[0].bbox = BBoxXYXY::from_xyxy(f64::NAN, 20.0, 100.0, 200.0);

        let report = validate_manifest(&dataset);
        assert!(report.has(IssueCode::BBoxNotFinite));
        assert!(!report.has(IssueCode::DegenerateBBox));
    }
}

//! Validation of YOLO label text.
//!
//! Validation is the strict, diagnostic counterpart of decoding. Where the
//! decoder stops at the first problem on a line and silently clamps boxes
//! into the image, the validator checks:
//! - Field count
//! - Numeric parse of every field
//! - Per-field ranges, including that the class id is an integer
//! - Whether the unclamped box leaves the image
//!
//! and reports every violation on every line in one pass.

mod report;

pub use report::{IssueKind, ValidationIssue, ValidationReport};

use crate::ir::{BBoxCXCYWH, Normalized};
use crate::yolo::codec::{parse_number, split_fields};
use crate::yolo::{LabelField, FIELD_COUNT, MAX_CLASS_ID};

/// Validates a YOLO label blob and returns a report of all issues found.
///
/// Empty or whitespace-only input is a valid, empty label set. Blank lines
/// are skipped; line numbers in the report count every line of `text`.
pub fn validate_yolo_text(text: &str) -> ValidationReport {
    let mut report = ValidationReport::new();

    for (idx, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        report.lines_checked += 1;
        validate_line(line, idx + 1, &mut report);
    }

    report
}

/// Checks one non-blank line, adding every violation to the report.
fn validate_line(line: &str, line_num: usize, report: &mut ValidationReport) {
    let tokens = match split_fields(line) {
        Ok(tokens) => tokens,
        Err(err) => {
            // Without five fields there is nothing to line the values up with.
            report.add(ValidationIssue::new(
                line_num,
                IssueKind::MalformedLine,
                err.to_string(),
            ));
            return;
        }
    };

    let mut values: [Option<f64>; FIELD_COUNT] = [None; FIELD_COUNT];
    for ((slot, field), raw) in values.iter_mut().zip(LabelField::ALL).zip(tokens) {
        *slot = parse_number(raw);
        if slot.is_none() {
            report.add(ValidationIssue::for_field(
                line_num,
                IssueKind::NonNumericField,
                field,
                format!("invalid {field} '{raw}'; expected a number"),
            ));
        }
    }

    for (field, value) in LabelField::ALL.into_iter().zip(values) {
        let Some(value) = value else {
            continue;
        };
        if let Some(message) = range_violation(field, value) {
            report.add(ValidationIssue::for_field(
                line_num,
                IssueKind::OutOfRange,
                field,
                message,
            ));
        }
    }

    if let [_, Some(cx), Some(cy), Some(width), Some(height)] = values {
        // Unclamped, so boxes that decoding would silently fix are reported.
        let corner = BBoxCXCYWH::<Normalized>::from_cxcywh(cx, cy, width, height).to_xywh();
        if !corner.is_within_unit() {
            report.add(ValidationIssue::new(
                line_num,
                IssueKind::GeometryOverflow,
                format!(
                    "box ({:.6}, {:.6}, {:.6}, {:.6}) extends outside image bounds (0, 0, 1, 1)",
                    corner.x(),
                    corner.y(),
                    corner.right(),
                    corner.bottom()
                ),
            ));
        }
    }
}

/// Returns a message if `value` is outside the strict domain of `field`.
fn range_violation(field: LabelField, value: f64) -> Option<String> {
    match field {
        LabelField::ClassId => {
            let is_index = field.accepts(value) && value.fract() == 0.0;
            (!is_index).then(|| {
                format!("{field} {value} must be an integer between 0 and {MAX_CLASS_ID}")
            })
        }
        _ => (!field.accepts(value))
            .then(|| format!("{field} {value} is out of range; expected {}", field.domain())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::AnnotationId;
    use crate::yolo::decode_line;

    #[test]
    fn test_empty_input_is_valid() {
        for text in ["", "   ", "\n\n", " \t \n "] {
            let report = validate_yolo_text(text);
            assert!(report.is_valid(), "{text:?} should be valid");
            assert!(report.issues.is_empty());
            assert_eq!(report.lines_checked, 0);
        }
    }

    #[test]
    fn test_valid_lines() {
        let report = validate_yolo_text(
            "0 0.5 0.5 0.2 0.2\n1 0.500000 0.500000 1.000000 1.000000\n3 0.1 0.9 0.2 0.2\n",
        );
        assert!(report.is_valid(), "unexpected issues: {:?}", report.issues);
        assert_eq!(report.lines_checked, 3);
    }

    #[test]
    fn test_malformed_line_stops_field_checks() {
        let report = validate_yolo_text("0 abc 0.5");
        assert_eq!(report.issue_count(), 1);
        assert_eq!(report.issues[0].kind, IssueKind::MalformedLine);
        assert_eq!(report.issues[0].line, 1);
        assert_eq!(report.issues[0].field, None);
    }

    #[test]
    fn test_multiple_errors_on_one_line() {
        let report = validate_yolo_text("1.5 1.2 0.5 0.2 0.2");
        let kinds: Vec<(IssueKind, Option<LabelField>)> =
            report.issues.iter().map(|i| (i.kind, i.field)).collect();
        assert_eq!(
            kinds,
            vec![
                (IssueKind::OutOfRange, Some(LabelField::ClassId)),
                (IssueKind::OutOfRange, Some(LabelField::CenterX)),
                (IssueKind::GeometryOverflow, None),
            ]
        );
        assert_eq!(report.line_count(), 1);
    }

    #[test]
    fn test_every_non_numeric_field_is_reported() {
        let report = validate_yolo_text("x 0.5 0.5 abc 0.2");
        assert_eq!(report.count_of(IssueKind::NonNumericField), 2);
        // Geometry cannot be checked without a width.
        assert_eq!(report.count_of(IssueKind::GeometryOverflow), 0);
        assert_eq!(report.issues[0].field, Some(LabelField::ClassId));
        assert_eq!(report.issues[1].field, Some(LabelField::Width));
    }

    #[test]
    fn test_negative_class_id() {
        let report = validate_yolo_text("-1 0.5 0.5 0.2 0.2");
        assert_eq!(report.issue_count(), 1);
        assert_eq!(report.issues[0].kind, IssueKind::OutOfRange);
        assert_eq!(report.issues[0].field, Some(LabelField::ClassId));
    }

    #[test]
    fn test_huge_class_id() {
        let report = validate_yolo_text("1e18 0.5 0.5 0.2 0.2\n9007199254740991 0.5 0.5 0.2 0.2");
        assert_eq!(report.issue_count(), 1);
        assert_eq!(report.issues[0].line, 1);
        assert_eq!(report.issues[0].kind, IssueKind::OutOfRange);
        assert_eq!(report.issues[0].field, Some(LabelField::ClassId));
        assert!(decode_line("1e18 0.5 0.5 0.2 0.2", AnnotationId(1)).is_err());
    }

    #[test]
    fn test_extent_bounds() {
        let report = validate_yolo_text("0 0.5 0.5 0 0.2\n0 0.5 0.5 0.2 1.5");
        assert_eq!(report.issues_on_line(1).count(), 1);
        assert!(report
            .issues_on_line(2)
            .any(|i| i.kind == IssueKind::OutOfRange && i.field == Some(LabelField::Height)));
        assert!(report
            .issues_on_line(2)
            .any(|i| i.kind == IssueKind::GeometryOverflow));
    }

    #[test]
    fn test_line_numbers_count_blank_lines() {
        let report = validate_yolo_text("\n0 0.5 0.5 0.2 0.2\n\nbroken\n");
        assert_eq!(report.lines_checked, 2);
        assert_eq!(report.issue_count(), 1);
        assert_eq!(report.issues[0].line, 4);
    }

    #[test]
    fn test_center_out_of_range_fails_validation_and_decode() {
        let report = validate_yolo_text("0 1.5 0.5 0.2 0.2");
        assert!(report
            .issues
            .iter()
            .any(|i| i.kind == IssueKind::OutOfRange && i.field == Some(LabelField::CenterX)));
        assert!(!report.is_valid());

        assert!(decode_line("0 1.5 0.5 0.2 0.2", AnnotationId(1)).is_err());
    }

    #[test]
    fn test_overflow_is_flagged_but_decodes_clamped() {
        let line = "0 0.95 0.5 0.2 0.2";
        let report = validate_yolo_text(line);
        assert_eq!(report.issue_count(), 1);
        assert_eq!(report.issues[0].kind, IssueKind::GeometryOverflow);

        let decoded = decode_line(line, AnnotationId(1)).expect("lenient decode");
        assert!(decoded.bbox.right() <= 1.0 + 1e-12);
    }

    #[test]
    fn test_display_and_json() {
        let report = validate_yolo_text("0 0.5 0.5 0.2 0.2\n0 1.5 0.5 0.2 0.2");
        let text = format!("{}", report);
        assert!(text.contains("Validation failed with 2 issue(s) on 1 line(s)"));
        assert!(text.contains("[OutOfRange] line 2 (center_x)"));

        let json = serde_json::to_value(&report).expect("serialize");
        assert_eq!(json["valid"], false);
        assert_eq!(json["errors"][0]["line"], 2);
        assert_eq!(json["errors"][0]["kind"], "OutOfRange");
        assert_eq!(json["errors"][0]["field"], "center_x");

        let clean = validate_yolo_text("");
        assert!(format!("{}", clean).contains("Validation passed"));
        assert_eq!(serde_json::to_value(&clean).expect("serialize")["valid"], true);
    }
}

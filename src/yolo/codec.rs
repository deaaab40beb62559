//! YOLO label line encoding and decoding.
//!
//! A label line is five whitespace-separated fields:
//!
//! ```text
//! <class_id> <center_x> <center_y> <width> <height>
//! ```
//!
//! with the four geometric fields normalized to the image size. Encoding
//! writes them with exactly six fractional digits. Decoding is lenient about
//! geometry: a box that would leave the image is clamped back into it.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

use crate::ir::{Annotation, AnnotationId, BBoxCXCYWH, CategoryId, Normalized};

/// Number of fields on a detection label line.
pub const FIELD_COUNT: usize = 5;

/// Largest class id a label line may carry. Every integer up to here is
/// exactly representable as `f64`, so the conversion to `u64` is lossless.
pub const MAX_CLASS_ID: u64 = (1 << 53) - 1;

/// Names one of the five fields of a label line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelField {
    ClassId,
    CenterX,
    CenterY,
    Width,
    Height,
}

impl LabelField {
    /// All fields in line order.
    pub const ALL: [LabelField; FIELD_COUNT] = [
        LabelField::ClassId,
        LabelField::CenterX,
        LabelField::CenterY,
        LabelField::Width,
        LabelField::Height,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LabelField::ClassId => "class_id",
            LabelField::CenterX => "center_x",
            LabelField::CenterY => "center_y",
            LabelField::Width => "width",
            LabelField::Height => "height",
        }
    }

    /// Returns true if `value` lies in this field's declared domain.
    ///
    /// Class ids only need to be non-negative and at most [`MAX_CLASS_ID`]
    /// here; integrality is a validation concern.
    pub fn accepts(&self, value: f64) -> bool {
        match self {
            LabelField::ClassId => (0.0..=MAX_CLASS_ID as f64).contains(&value),
            LabelField::CenterX | LabelField::CenterY => (0.0..=1.0).contains(&value),
            LabelField::Width | LabelField::Height => value > 0.0 && value <= 1.0,
        }
    }

    /// Human-readable domain, used in error messages.
    pub fn domain(&self) -> &'static str {
        match self {
            LabelField::ClassId => "a non-negative number below 2^53",
            LabelField::CenterX | LabelField::CenterY => "within [0, 1]",
            LabelField::Width | LabelField::Height => "within (0, 1]",
        }
    }
}

impl fmt::Display for LabelField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a single label line could not be decoded.
#[derive(Clone, Debug, PartialEq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DecodeError {
    #[error("expected {} fields, found {found}", FIELD_COUNT)]
    MalformedLine { found: usize },

    #[error("invalid {field} '{raw}'; expected a number")]
    NonNumericField { field: LabelField, raw: String },

    #[error("{field} {value} is out of range; expected {}", .field.domain())]
    OutOfRange { field: LabelField, value: f64 },
}

/// A decode failure tied to its 1-based line number.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LineError {
    pub line: usize,
    pub error: DecodeError,
}

impl fmt::Display for LineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.error)
    }
}

/// Result of decoding a whole label blob: the lines that decoded, and the
/// lines that did not.
#[derive(Clone, Debug, Default, Serialize)]
pub struct DecodeOutcome {
    pub annotations: Vec<Annotation>,
    pub errors: Vec<LineError>,
}

impl DecodeOutcome {
    /// Returns true if every non-blank line decoded.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Encodes one annotation as a label line, without a line terminator.
///
/// The corner-form box is converted to center form exactly; nothing is
/// clamped on the way out.
///
/// ```
/// use yolo_annotator::ir::{Annotation, BBoxXYWH};
/// use yolo_annotator::yolo::encode_line;
///
/// let ann = Annotation::new(1u64, 1u64, BBoxXYWH::from_xywh(0.4, 0.4, 0.2, 0.2));
/// assert_eq!(encode_line(&ann), "1 0.500000 0.500000 0.200000 0.200000");
/// ```
pub fn encode_line(annotation: &Annotation) -> String {
    let center = annotation.bbox.to_cxcywh();
    format!(
        "{} {} {} {} {}",
        annotation.category_id,
        fixed6(center.cx()),
        fixed6(center.cy()),
        fixed6(center.width),
        fixed6(center.height)
    )
}

/// Encodes a list of annotations, one line each, joined by `\n`.
///
/// There is no trailing newline, and an empty list encodes to an empty
/// string.
pub fn encode_lines(annotations: &[Annotation]) -> String {
    annotations
        .iter()
        .map(encode_line)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Decodes one label line into an annotation with the given id.
///
/// Fails with [`DecodeError::MalformedLine`] unless the line has exactly five
/// fields, [`DecodeError::NonNumericField`] if a field is not a number, and
/// [`DecodeError::OutOfRange`] if a field is outside its domain. The first
/// failing check wins. On success the box is clamped into the unit square.
///
/// A fractional class id is truncated; see
/// [`validate_yolo_text`](crate::validation::validate_yolo_text) for the
/// strict check.
pub fn decode_line(line: &str, id: AnnotationId) -> Result<Annotation, DecodeError> {
    let tokens = split_fields(line)?;

    let mut values = [0.0f64; FIELD_COUNT];
    for ((slot, field), raw) in values.iter_mut().zip(LabelField::ALL).zip(tokens) {
        *slot = parse_number(raw).ok_or_else(|| DecodeError::NonNumericField {
            field,
            raw: raw.to_string(),
        })?;
    }

    for (field, value) in LabelField::ALL.into_iter().zip(values) {
        if !field.accepts(value) {
            return Err(DecodeError::OutOfRange { field, value });
        }
    }

    let [class_id, cx, cy, width, height] = values;
    let bbox = BBoxCXCYWH::<Normalized>::from_cxcywh(cx, cy, width, height).to_xywh_clamped();

    Ok(Annotation::new(
        id,
        CategoryId::new(class_id.trunc() as u64),
        bbox,
    ))
}

/// Decodes every non-blank line of a label blob.
///
/// A bad line is recorded in [`DecodeOutcome::errors`] and does not stop the
/// remaining lines from decoding. Decoded annotations get sequential ids
/// starting at 1, in line order.
pub fn decode_lines(text: &str) -> DecodeOutcome {
    let mut outcome = DecodeOutcome::default();
    let mut next_id = AnnotationId::new(1);

    for (idx, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }

        match decode_line(line, next_id) {
            Ok(annotation) => {
                outcome.annotations.push(annotation);
                next_id = next_id.next();
            }
            Err(error) => outcome.errors.push(LineError {
                line: idx + 1,
                error,
            }),
        }
    }

    if !outcome.errors.is_empty() {
        log::debug!(
            "decoded {} annotation(s), skipped {} bad line(s)",
            outcome.annotations.len(),
            outcome.errors.len()
        );
    }

    outcome
}

/// Fuzz-only entrypoint for single-line decoding.
#[cfg(feature = "fuzzing")]
pub fn fuzz_decode_line(input: &str) -> Result<(), DecodeError> {
    decode_line(input, AnnotationId::new(1)).map(|_| ())
}

/// Splits a line into exactly [`FIELD_COUNT`] whitespace-separated tokens.
pub(crate) fn split_fields(line: &str) -> Result<[&str; FIELD_COUNT], DecodeError> {
    // Count first so pathological lines are never collected.
    let found = line.split_whitespace().count();
    if found != FIELD_COUNT {
        return Err(DecodeError::MalformedLine { found });
    }

    let mut tokens = [""; FIELD_COUNT];
    for (slot, token) in tokens.iter_mut().zip(line.split_whitespace()) {
        *slot = token;
    }
    Ok(tokens)
}

/// Parses a numeric field. `NaN` is rejected as non-numeric; infinities parse
/// and are left for the range check.
pub(crate) fn parse_number(raw: &str) -> Option<f64> {
    raw.parse::<f64>().ok().filter(|value| !value.is_nan())
}

/// Formats with six fractional digits. Exact decimal ties round away from
/// zero rather than to even.
fn fixed6(value: f64) -> String {
    if is_sixth_digit_tie(value) {
        // One ulp further from zero is past the tie but nowhere near the
        // next rounding boundary.
        let nudged = f64::from_bits(value.to_bits() + 1);
        return format!("{:.6}", nudged);
    }
    format!("{:.6}", value)
}

/// True if `value * 10^6` has a fractional part of exactly one half.
fn is_sixth_digit_tie(value: f64) -> bool {
    if !value.is_finite() || value == 0.0 {
        return false;
    }

    let bits = value.to_bits();
    let exp_bits = ((bits >> 52) & 0x7ff) as i64;
    let fraction = bits & ((1u64 << 52) - 1);
    let (mantissa, exponent) = if exp_bits == 0 {
        (fraction, -1074)
    } else {
        (fraction | (1u64 << 52), exp_bits - 1075)
    };

    // 2 * 10^6 * value = mantissa * 5^6 * 2^(exponent + 7); a tie means this
    // is an odd integer.
    let shift = exponent + 7;
    if shift > 0 {
        return false;
    }
    let shift = (-shift) as u32;
    shift < 64 && mantissa.trailing_zeros() == shift
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::BBoxXYWH;

    fn ann(category: u64, x: f64, y: f64, w: f64, h: f64) -> Annotation {
        Annotation::new(1u64, category, BBoxXYWH::from_xywh(x, y, w, h))
    }

    #[test]
    fn encode_line_matches_expected_format() {
        assert_eq!(
            encode_line(&ann(1, 0.4, 0.4, 0.2, 0.2)),
            "1 0.500000 0.500000 0.200000 0.200000"
        );
    }

    #[test]
    fn encode_line_does_not_clamp() {
        assert_eq!(
            encode_line(&ann(0, 0.9, 0.0, 0.2, 0.1)),
            "0 1.000000 0.050000 0.200000 0.100000"
        );
    }

    #[test]
    fn encode_lines_joins_without_trailing_newline() {
        let text = encode_lines(&[ann(0, 0.0, 0.0, 0.5, 0.5), ann(2, 0.5, 0.5, 0.5, 0.5)]);
        assert_eq!(
            text,
            "0 0.250000 0.250000 0.500000 0.500000\n2 0.750000 0.750000 0.500000 0.500000"
        );
    }

    #[test]
    fn encode_lines_of_nothing_is_empty() {
        assert_eq!(encode_lines(&[]), "");
    }

    #[test]
    fn fixed6_rounds_ties_away_from_zero() {
        assert_eq!(fixed6(0.0078125), "0.007813");
        assert_eq!(fixed6(0.2578125), "0.257813");
        assert_eq!(fixed6(0.5), "0.500000");
        assert_eq!(fixed6(1.0), "1.000000");
        assert_eq!(fixed6(0.1234564), "0.123456");
    }

    #[test]
    fn decode_line_accepts_valid_rows() {
        let decoded = decode_line("2 0.5 0.25 0.5 0.25", AnnotationId(9)).expect("decode");
        assert_eq!(decoded.id, AnnotationId(9));
        assert_eq!(decoded.category_id, CategoryId(2));
        assert_eq!(decoded.bbox, BBoxXYWH::from_xywh(0.25, 0.125, 0.5, 0.25));
    }

    #[test]
    fn decode_line_tolerates_irregular_whitespace() {
        let decoded = decode_line("  0\t0.5   0.5 0.5\t0.5  ", AnnotationId(1)).expect("decode");
        assert_eq!(decoded.bbox, BBoxXYWH::from_xywh(0.25, 0.25, 0.5, 0.5));
    }

    #[test]
    fn decode_line_rejects_wrong_field_count() {
        assert_eq!(
            decode_line("0 0.1 0.2", AnnotationId(1)),
            Err(DecodeError::MalformedLine { found: 3 })
        );
        assert_eq!(
            decode_line("0 0.1 0.2 0.3 0.4 0.5", AnnotationId(1)),
            Err(DecodeError::MalformedLine { found: 6 })
        );
    }

    #[test]
    fn decode_line_rejects_non_numeric_fields() {
        let err = decode_line("0 0.5 abc 0.2 0.2", AnnotationId(1)).unwrap_err();
        assert_eq!(
            err,
            DecodeError::NonNumericField {
                field: LabelField::CenterY,
                raw: "abc".into(),
            }
        );

        let err = decode_line("0 NaN 0.5 0.2 0.2", AnnotationId(1)).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::NonNumericField {
                field: LabelField::CenterX,
                ..
            }
        ));
    }

    #[test]
    fn decode_line_rejects_out_of_range_fields() {
        let cases = [
            ("-1 0.5 0.5 0.2 0.2", LabelField::ClassId),
            ("0 1.5 0.5 0.2 0.2", LabelField::CenterX),
            ("0 0.5 -0.1 0.2 0.2", LabelField::CenterY),
            ("0 0.5 0.5 0 0.2", LabelField::Width),
            ("0 0.5 0.5 0.2 1.01", LabelField::Height),
            ("0 0.5 0.5 inf 0.2", LabelField::Width),
        ];
        for (line, expected) in cases {
            match decode_line(line, AnnotationId(1)) {
                Err(DecodeError::OutOfRange { field, .. }) => {
                    assert_eq!(field, expected, "line {line:?}")
                }
                other => panic!("expected out-of-range for {line:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn decode_line_rejects_class_ids_beyond_u64_precision() {
        for line in [
            "1e300 0.5 0.5 0.2 0.2",
            "1e18 0.5 0.5 0.2 0.2",
            "9007199254740992 0.5 0.5 0.2 0.2",
        ] {
            match decode_line(line, AnnotationId(1)) {
                Err(DecodeError::OutOfRange { field, .. }) => {
                    assert_eq!(field, LabelField::ClassId, "line {line:?}")
                }
                other => panic!("expected out-of-range for {line:?}, got {other:?}"),
            }
        }

        let largest = decode_line("9007199254740991 0.5 0.5 0.2 0.2", AnnotationId(1))
            .expect("largest class id decodes");
        assert_eq!(largest.category_id, CategoryId(MAX_CLASS_ID));
    }

    #[test]
    fn decode_line_clamps_overflowing_boxes() {
        let decoded = decode_line("0 0.95 0.5 0.2 0.2", AnnotationId(1)).expect("decode");
        assert!((decoded.bbox.x() - 0.85).abs() < 1e-12);
        assert!((decoded.bbox.width - 0.15).abs() < 1e-12);
        assert!(decoded.bbox.right() <= 1.0 + 1e-12);
    }

    #[test]
    fn decode_line_truncates_fractional_class_ids() {
        let decoded = decode_line("1.7 0.5 0.5 0.2 0.2", AnnotationId(1)).expect("decode");
        assert_eq!(decoded.category_id, CategoryId(1));
    }

    #[test]
    fn decode_lines_isolates_bad_lines() {
        let text = "0 0.5 0.5 0.2 0.2\n\nnot a label\n1 0.25 0.25 0.5 0.5\n0 2 0.5 0.2 0.2\n";
        let outcome = decode_lines(text);

        assert_eq!(outcome.annotations.len(), 2);
        assert_eq!(outcome.annotations[0].id, AnnotationId(1));
        assert_eq!(outcome.annotations[1].id, AnnotationId(2));
        assert_eq!(outcome.annotations[1].category_id, CategoryId(1));

        assert_eq!(outcome.errors.len(), 2);
        assert_eq!(outcome.errors[0].line, 3);
        assert_eq!(outcome.errors[0].error, DecodeError::MalformedLine { found: 3 });
        assert_eq!(outcome.errors[1].line, 5);
        assert!(matches!(
            outcome.errors[1].error,
            DecodeError::OutOfRange {
                field: LabelField::CenterX,
                ..
            }
        ));
        assert!(!outcome.is_clean());
    }

    #[test]
    fn decode_lines_of_blank_text_is_empty_and_clean() {
        let outcome = decode_lines("  \n\n");
        assert!(outcome.annotations.is_empty());
        assert!(outcome.is_clean());
    }

    #[test]
    fn encode_then_decode_preserves_in_bounds_boxes() {
        let original = ann(3, 0.125, 0.3, 0.25, 0.4);
        let decoded = decode_line(&encode_line(&original), AnnotationId(1)).expect("decode");
        assert_eq!(decoded.category_id, original.category_id);
        assert!((decoded.bbox.x() - 0.125).abs() < 1e-6);
        assert!((decoded.bbox.y() - 0.3).abs() < 1e-6);
        assert!((decoded.bbox.width - 0.25).abs() < 1e-6);
        assert!((decoded.bbox.height - 0.4).abs() < 1e-6);
    }

    #[test]
    fn decode_error_messages_name_the_field() {
        let err = decode_line("0 0.5 0.5 0.2 7", AnnotationId(1)).unwrap_err();
        assert_eq!(err.to_string(), "height 7 is out of range; expected within (0, 1]");
    }
}

//! Validation report types for structured error reporting.
//!
//! A report lists every problem found in a YOLO label blob, each tied to the
//! line it came from. It can be printed for an operator, serialized as JSON,
//! or inspected programmatically.

use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

use crate::yolo::LabelField;

/// The result of validating a YOLO label blob.
#[derive(Clone, Debug, Default)]
pub struct ValidationReport {
    /// All issues found, in line order.
    pub issues: Vec<ValidationIssue>,

    /// Number of non-blank lines that were checked.
    pub lines_checked: usize,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, issue: ValidationIssue) {
        self.issues.push(issue);
    }

    /// Returns true if no issues were found.
    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn issue_count(&self) -> usize {
        self.issues.len()
    }

    /// Number of distinct lines with at least one issue.
    pub fn line_count(&self) -> usize {
        self.issues
            .iter()
            .map(|issue| issue.line)
            .collect::<BTreeSet<_>>()
            .len()
    }

    /// Number of issues of the given kind.
    pub fn count_of(&self, kind: IssueKind) -> usize {
        self.issues.iter().filter(|i| i.kind == kind).count()
    }

    /// Issues reported for one line.
    pub fn issues_on_line(&self, line: usize) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(move |i| i.line == line)
    }
}

// Serialized as `{valid, lines_checked, errors}`, the shape the editor reads.
impl Serialize for ValidationReport {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("ValidationReport", 3)?;
        state.serialize_field("valid", &self.is_valid())?;
        state.serialize_field("lines_checked", &self.lines_checked)?;
        state.serialize_field("errors", &self.issues)?;
        state.end()
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.issues.is_empty() {
            return writeln!(
                f,
                "Validation passed: {} line(s) checked, no issues found",
                self.lines_checked
            );
        }

        writeln!(
            f,
            "Validation failed with {} issue(s) on {} line(s):",
            self.issue_count(),
            self.line_count()
        )?;
        writeln!(f)?;

        for issue in &self.issues {
            writeln!(f, "  {}", issue)?;
        }

        Ok(())
    }
}

/// A single problem on a single line.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ValidationIssue {
    /// 1-based line number in the validated text.
    pub line: usize,

    pub kind: IssueKind,

    /// The offending field, when the issue concerns one field.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<LabelField>,

    pub message: String,
}

impl ValidationIssue {
    pub fn new(line: usize, kind: IssueKind, message: impl Into<String>) -> Self {
        Self {
            line,
            kind,
            field: None,
            message: message.into(),
        }
    }

    /// Creates an issue about one field of the line.
    pub fn for_field(
        line: usize,
        kind: IssueKind,
        field: LabelField,
        message: impl Into<String>,
    ) -> Self {
        Self {
            line,
            kind,
            field: Some(field),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.field {
            Some(field) => write!(
                f,
                "[{:?}] line {} ({}): {}",
                self.kind, self.line, field, self.message
            ),
            None => write!(f, "[{:?}] line {}: {}", self.kind, self.line, self.message),
        }
    }
}

/// A stable code identifying the type of validation issue.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum IssueKind {
    /// The line does not have exactly five fields.
    MalformedLine,
    /// A field is not a number.
    NonNumericField,
    /// A field is outside its domain (class id not an integer in `[0, 2^53)`,
    /// center outside `[0, 1]`, extent outside `(0, 1]`).
    OutOfRange,
    /// The box described by the line extends past the image edges.
    GeometryOverflow,
}

use std::path::PathBuf;
use thiserror::Error;

use crate::validation::ValidationReport;

/// The main error type for yolo-annotator operations.
///
/// Per-line decode and validation problems are not errors at this level;
/// they are collected into [`DecodeOutcome`](crate::yolo::DecodeOutcome) and
/// [`ValidationReport`] instead.
#[derive(Debug, Error)]
pub enum AnnotatorError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse project JSON from {path}: {source}")]
    ProjectJsonParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write project JSON to {path}: {source}")]
    ProjectJsonWrite {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to parse YOLO data.yaml at {path}: {source}")]
    DataYamlParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid YOLO classes.txt at {path}: {message}")]
    ClassesTxtInvalid { path: PathBuf, message: String },

    #[error("Invalid YOLO layout at {path}: {message}")]
    YoloLayoutInvalid { path: PathBuf, message: String },

    #[error("Failed to read image dimensions from {path}: {source}")]
    ImageDimensionRead {
        path: PathBuf,
        #[source]
        source: imagesize::ImageError,
    },

    #[error("{first} and {second} both map to export artifact '{path}'")]
    ArtifactPathCollision {
        path: String,
        first: String,
        second: String,
    },

    #[error("Refusing to write artifact '{path}': {message}")]
    UnsafeArtifactPath { path: String, message: String },

    #[error("Validation failed with {issue_count} issue(s) on {line_count} line(s)")]
    ValidationFailed {
        issue_count: usize,
        line_count: usize,
        report: ValidationReport,
    },

    #[error("Failed to serialize report as JSON: {0}")]
    ReportJson(#[source] serde_json::Error),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

//! JSON serialization of project snapshots.
//!
//! The snapshot file is what the CLI consumes for `stats` and `export` and
//! produces from `import`. It has the same shape as [`Project`]: an ordered
//! image list, an image-id keyed annotation map and the category list.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use super::model::Project;
use crate::error::AnnotatorError;

/// Reads a project snapshot from a JSON file.
///
/// # Errors
/// Returns an error if the file cannot be opened or is not a valid snapshot.
pub fn read_project_json(path: &Path) -> Result<Project, AnnotatorError> {
    let file = File::open(path).map_err(AnnotatorError::Io)?;
    let reader = BufReader::new(file);

    let project: Project =
        serde_json::from_reader(reader).map_err(|source| AnnotatorError::ProjectJsonParse {
            path: path.to_path_buf(),
            source,
        })?;

    log::debug!(
        "read project {}: {} image(s), {} categor(ies)",
        path.display(),
        project.images.len(),
        project.categories.len()
    );
    Ok(project)
}

/// Writes a project snapshot as pretty-printed JSON.
///
/// # Errors
/// Returns an error if the file cannot be created or written.
pub fn write_project_json(path: &Path, project: &Project) -> Result<(), AnnotatorError> {
    let file = File::create(path).map_err(AnnotatorError::Io)?;
    let writer = BufWriter::new(file);

    serde_json::to_writer_pretty(writer, project).map_err(|source| {
        AnnotatorError::ProjectJsonWrite {
            path: path.to_path_buf(),
            source,
        }
    })
}

/// Parses a project snapshot from a JSON string.
pub fn from_json_str(json: &str) -> Result<Project, serde_json::Error> {
    serde_json::from_str(json)
}

/// Renders a project snapshot as a pretty-printed JSON string.
pub fn to_json_string(project: &Project) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(project)
}

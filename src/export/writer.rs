//! Destinations for an assembled label package.

use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::error::AnnotatorError;

/// Receives the artifacts of an [`ExportBundle`](super::ExportBundle).
///
/// Paths are relative, `/`-separated, and never contain `..`.
pub trait PackageWriter {
    /// Stores one artifact.
    fn write_artifact(&mut self, path: &str, contents: &str) -> Result<(), AnnotatorError>;

    /// Called once after the last artifact.
    fn finish(&mut self) -> Result<(), AnnotatorError> {
        Ok(())
    }
}

/// Writes artifacts as files under a root directory, creating parent
/// directories as needed. Existing files are overwritten.
#[derive(Debug)]
pub struct DirectoryWriter {
    root: PathBuf,
    written: usize,
}

impl DirectoryWriter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            written: 0,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Number of files written so far.
    pub fn written(&self) -> usize {
        self.written
    }

    fn resolve(&self, rel: &str) -> Result<PathBuf, AnnotatorError> {
        let rel_path = Path::new(rel);
        if rel.is_empty() {
            return Err(AnnotatorError::UnsafeArtifactPath {
                path: rel.to_string(),
                message: "path is empty".to_string(),
            });
        }

        for component in rel_path.components() {
            match component {
                Component::Normal(_) | Component::CurDir => {}
                _ => {
                    return Err(AnnotatorError::UnsafeArtifactPath {
                        path: rel.to_string(),
                        message: "path must stay inside the output directory".to_string(),
                    })
                }
            }
        }

        Ok(self.root.join(rel_path))
    }
}

impl PackageWriter for DirectoryWriter {
    fn write_artifact(&mut self, path: &str, contents: &str) -> Result<(), AnnotatorError> {
        let target = self.resolve(path)?;
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(AnnotatorError::Io)?;
        }
        fs::write(&target, contents).map_err(AnnotatorError::Io)?;

        log::debug!("wrote {}", target.display());
        self.written += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), AnnotatorError> {
        // Make sure an export with nothing in it still leaves its directory.
        fs::create_dir_all(&self.root).map_err(AnnotatorError::Io)
    }
}

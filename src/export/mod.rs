//! Batch export of a project as a YOLO label package.
//!
//! [`assemble_export`] turns images, their annotations and the category list
//! into a map from relative path to file contents. It performs no I/O; hand
//! the resulting [`ExportBundle`] to a [`PackageWriter`] to put it somewhere.
//!
//! Images without annotations get no label file. Their ids are listed in
//! [`ExportBundle::skipped_images`] so callers can tell them apart from
//! images that were never part of the export.

pub mod writer;

pub use writer::{DirectoryWriter, PackageWriter};

use std::collections::BTreeMap;

use crate::error::AnnotatorError;
use crate::ir::{Annotation, Category, Image, ImageId};
use crate::yolo::encode_lines;

/// Path of the category list artifact.
pub const CLASSES_FILE: &str = "classes.txt";
/// Path of the optional human-readable manifest.
pub const MANIFEST_FILE: &str = "README.txt";
/// Path of the optional training config.
pub const DATA_YAML_FILE: &str = "data.yaml";

const LABEL_EXTENSION: &str = "txt";

/// Options for [`assemble_export`].
#[derive(Clone, Debug, Default)]
pub struct ExportOptions {
    /// Directory that label files are placed under, relative to the package
    /// root. `None` puts them at the root.
    pub labels_dir: Option<String>,
    /// Emit a `README.txt` describing the package.
    pub include_manifest: bool,
    /// Emit a `data.yaml` training config.
    pub config: Option<DatasetConfig>,
}

/// Split paths written to `data.yaml`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DatasetConfig {
    pub train: String,
    pub val: String,
    pub test: String,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            train: "./train".to_string(),
            val: "./valid".to_string(),
            test: "./test".to_string(),
        }
    }
}

/// An assembled, not yet written, label package.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExportBundle {
    /// Relative path to UTF-8 file contents, in path order.
    pub artifacts: BTreeMap<String, String>,
    /// Images that had no annotations and therefore no label file.
    pub skipped_images: Vec<ImageId>,
}

impl ExportBundle {
    pub fn get(&self, path: &str) -> Option<&str> {
        self.artifacts.get(path).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }

    /// Hands every artifact to `writer`, in path order, then finishes it.
    ///
    /// Returns the number of artifacts written.
    pub fn write_to<W: PackageWriter>(&self, writer: &mut W) -> Result<usize, AnnotatorError> {
        for (path, contents) in &self.artifacts {
            writer.write_artifact(path, contents)?;
        }
        writer.finish()?;

        log::info!(
            "wrote {} artifact(s); {} image(s) had no annotations",
            self.artifacts.len(),
            self.skipped_images.len()
        );
        Ok(self.artifacts.len())
    }
}

/// Assembles a label package.
///
/// `images` is the ordered list of images with their annotations, as
/// returned by [`Project::labeled_images`](crate::ir::Project::labeled_images).
/// Each image with at least one annotation produces a label file named after
/// the image (see [`label_file_name`]). `classes.txt` lists category names in
/// ascending id order.
///
/// Fails with [`AnnotatorError::ArtifactPathCollision`] if two images, or an
/// image and a package file, map to the same path.
pub fn assemble_export(
    images: &[(&Image, &[Annotation])],
    categories: &[Category],
    options: &ExportOptions,
) -> Result<ExportBundle, AnnotatorError> {
    let mut bundle = ExportBundle::default();
    let mut owners: BTreeMap<String, String> = BTreeMap::new();
    let mut annotation_total = 0usize;

    for (image, annotations) in images {
        if annotations.is_empty() {
            bundle.skipped_images.push(image.id);
            continue;
        }

        let (file_name, contents) = label_artifact(image, annotations);
        let path = match &options.labels_dir {
            Some(dir) => format!("{}/{}", dir.trim_end_matches('/'), file_name),
            None => file_name,
        };
        insert_artifact(&mut bundle, &mut owners, path, &image.name, contents)?;
        annotation_total += annotations.len();
    }

    let mut sorted: Vec<&Category> = categories.iter().collect();
    sorted.sort_by_key(|cat| cat.id);

    let classes = sorted
        .iter()
        .map(|cat| cat.name.as_str())
        .collect::<Vec<_>>()
        .join("\n");
    insert_artifact(
        &mut bundle,
        &mut owners,
        CLASSES_FILE.to_string(),
        "the class list",
        classes,
    )?;

    if options.include_manifest {
        let manifest = render_manifest(&sorted, images.len(), annotation_total, options);
        insert_artifact(
            &mut bundle,
            &mut owners,
            MANIFEST_FILE.to_string(),
            "the manifest",
            manifest,
        )?;
    }

    if let Some(config) = &options.config {
        insert_artifact(
            &mut bundle,
            &mut owners,
            DATA_YAML_FILE.to_string(),
            "the dataset config",
            render_data_yaml(config, &sorted),
        )?;
    }

    if !bundle.skipped_images.is_empty() {
        log::debug!(
            "skipped {} image(s) without annotations",
            bundle.skipped_images.len()
        );
    }

    Ok(bundle)
}

/// Builds the label file for one image: `(file name, contents)`.
///
/// This is the single-image counterpart of [`assemble_export`]. An image
/// with no annotations yields an empty file.
pub fn label_artifact(image: &Image, annotations: &[Annotation]) -> (String, String) {
    (label_file_name(&image.name), encode_lines(annotations))
}

/// Derives a label file name from an image name by replacing the extension
/// of its last path component with `.txt`, or appending `.txt` if it has
/// none.
///
/// ```
/// use yolo_annotator::export::label_file_name;
///
/// assert_eq!(label_file_name("cat.jpg"), "cat.txt");
/// assert_eq!(label_file_name("train/dog.v2.png"), "train/dog.v2.txt");
/// assert_eq!(label_file_name("frame_001"), "frame_001.txt");
/// ```
pub fn label_file_name(image_name: &str) -> String {
    let start = image_name.rfind('/').map_or(0, |idx| idx + 1);
    let file = &image_name[start..];

    match file.rfind('.') {
        Some(dot) if dot + 1 < file.len() => {
            format!("{}.{}", &image_name[..start + dot], LABEL_EXTENSION)
        }
        _ => format!("{}.{}", image_name, LABEL_EXTENSION),
    }
}

fn insert_artifact(
    bundle: &mut ExportBundle,
    owners: &mut BTreeMap<String, String>,
    path: String,
    owner: &str,
    contents: String,
) -> Result<(), AnnotatorError> {
    if let Some(first) = owners.get(&path) {
        return Err(AnnotatorError::ArtifactPathCollision {
            path,
            first: first.clone(),
            second: owner.to_string(),
        });
    }

    owners.insert(path.clone(), owner.to_string());
    bundle.artifacts.insert(path, contents);
    Ok(())
}

fn render_manifest(
    categories: &[&Category],
    image_count: usize,
    annotation_count: usize,
    options: &ExportOptions,
) -> String {
    let labels_location = options.labels_dir.as_deref().unwrap_or(".");

    let mut out = String::new();
    out.push_str("YOLO label export\n");
    out.push_str("=================\n\n");
    out.push_str("Each label file holds one line per box:\n");
    out.push_str("  <class_id> <center_x> <center_y> <width> <height>\n");
    out.push_str("Coordinates are normalized to the image size, six decimal places.\n");
    out.push_str("Images without annotations have no label file.\n\n");
    out.push_str(&format!("Label files: {}\n", labels_location));
    out.push_str(&format!("Images: {}\n", image_count));
    out.push_str(&format!("Annotations: {}\n\n", annotation_count));
    out.push_str("Classes:\n");
    if categories.is_empty() {
        out.push_str("  (none)\n");
    }
    for cat in categories {
        out.push_str(&format!("  {}: {}\n", cat.id, cat.name));
    }
    out
}

fn render_data_yaml(config: &DatasetConfig, categories: &[&Category]) -> String {
    let names = categories
        .iter()
        .map(|cat| yaml_single_quoted(&cat.name))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "train: {}\nval: {}\ntest: {}\nnc: {}\nnames: [{}]\n",
        yaml_single_quoted(&config.train),
        yaml_single_quoted(&config.val),
        yaml_single_quoted(&config.test),
        categories.len(),
        names
    )
}

fn yaml_single_quoted(raw: &str) -> String {
    format!("'{}'", raw.replace('\'', "''"))
}

//! Reader for YOLO label directories.
//!
//! Handles `labels/` trees with an optional sibling `images/` tree, the
//! layout that [`crate::export`] produces and that most training tools
//! expect. Label lines are decoded with [`crate::yolo::decode_lines`], so a
//! bad line is logged and skipped rather than failing the import.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use walkdir::WalkDir;

use super::model::{Annotation, Category, Image, Project};
use super::ImageId;
use crate::error::AnnotatorError;
use crate::yolo::decode_lines;

const IMAGE_EXTENSIONS: [&str; 5] = ["jpg", "png", "jpeg", "bmp", "webp"];
const LABEL_EXTENSION: &str = "txt";

/// Upper bound on the number of classes a generated class map may hold.
const MAX_DENSE_CLASSES: u64 = 65_536;

/// Read a YOLO label directory into a project snapshot.
///
/// `path` may be the dataset root containing `labels/`, or the `labels/`
/// directory itself. Every image under `images/` becomes an [`Image`], with
/// its pixel size read from the file header. A label file with no matching
/// image still becomes an image, named after the label's stem, with zero
/// dimensions.
///
/// Class names come from `data.yaml`, then `classes.txt`, and are otherwise
/// inferred as `class_<n>` from the ids in use. Category ids equal class
/// indices. A generated class map larger than 65536 entries fails with
/// [`AnnotatorError::YoloLayoutInvalid`].
pub fn read_yolo_dir(path: &Path) -> Result<Project, AnnotatorError> {
    let layout = discover_layout(path)?;

    let mut entries: BTreeMap<String, Entry> = BTreeMap::new();

    if layout.images_dir.is_dir() {
        for image_path in collect_files_with_extensions(&layout.images_dir, &IMAGE_EXTENSIONS)? {
            let rel = rel_string(&layout.images_dir, &image_path);
            entries.entry(rel).or_default().image_path = Some(image_path);
        }
    } else {
        log::debug!(
            "no images/ directory next to {}; image sizes will be 0",
            layout.labels_dir.display()
        );
    }

    for label_path in collect_files_with_extensions(&layout.labels_dir, &[LABEL_EXTENSION])? {
        let label_rel = label_path.strip_prefix(&layout.labels_dir).map_err(|_| {
            AnnotatorError::YoloLayoutInvalid {
                path: label_path.clone(),
                message: format!(
                    "label path '{}' is outside labels dir '{}'",
                    label_path.display(),
                    layout.labels_dir.display()
                ),
            }
        })?;

        let key = match find_image_for_label(&layout.images_dir, label_rel) {
            Some(image_path) => rel_string(&layout.images_dir, &image_path),
            None => rel_string(&layout.labels_dir, &label_path.with_extension("")),
        };
        entries.entry(key).or_default().label_path = Some(label_path);
    }

    let mut images = Vec::with_capacity(entries.len());
    let mut annotations: BTreeMap<ImageId, Vec<Annotation>> = BTreeMap::new();
    let mut skipped_lines = 0usize;

    for (index, (name, entry)) in entries.into_iter().enumerate() {
        let image_id = ImageId::new((index + 1) as u64);

        let (width, height) = match &entry.image_path {
            Some(image_path) => read_image_dimensions(image_path)?,
            None => (0, 0),
        };
        images.push(Image::new(image_id, name, width, height));

        let Some(label_path) = entry.label_path else {
            continue;
        };

        let content = fs::read_to_string(&label_path).map_err(AnnotatorError::Io)?;
        let outcome = decode_lines(&content);
        for err in &outcome.errors {
            log::warn!("{}: skipping {}", label_path.display(), err);
        }
        skipped_lines += outcome.errors.len();

        annotations.insert(image_id, outcome.annotations);
    }

    let categories = read_class_map(&layout, &annotations)?
        .into_iter()
        .enumerate()
        .map(|(index, name)| Category::new(index as u64, name))
        .collect::<Vec<_>>();

    let project = Project {
        images,
        annotations,
        categories,
    };

    log::info!(
        "read {} image(s), {} annotation(s), {} class(es) from {}",
        project.images.len(),
        project.annotation_count(),
        project.categories.len(),
        layout.root.display()
    );
    if skipped_lines > 0 {
        log::warn!("skipped {} malformed label line(s)", skipped_lines);
    }

    Ok(project)
}

#[derive(Debug, Default)]
struct Entry {
    image_path: Option<PathBuf>,
    label_path: Option<PathBuf>,
}

#[derive(Clone, Debug)]
struct YoloLayout {
    root: PathBuf,
    images_dir: PathBuf,
    labels_dir: PathBuf,
    class_map_source: ClassMapSource,
}

#[derive(Clone, Debug, PartialEq)]
enum ClassMapSource {
    DataYaml(PathBuf),
    ClassesTxt(PathBuf),
    Inferred,
}

fn discover_layout(input: &Path) -> Result<YoloLayout, AnnotatorError> {
    if !input.is_dir() {
        return Err(AnnotatorError::YoloLayoutInvalid {
            path: input.to_path_buf(),
            message: "input must be a directory".to_string(),
        });
    }

    let (root, labels_dir) = if input.join("labels").is_dir() {
        (input.to_path_buf(), input.join("labels"))
    } else if is_dir_named(input, "labels") {
        let root = input
            .parent()
            .ok_or_else(|| AnnotatorError::YoloLayoutInvalid {
                path: input.to_path_buf(),
                message: "labels directory has no parent directory".to_string(),
            })?
            .to_path_buf();
        (root, input.to_path_buf())
    } else {
        return Err(AnnotatorError::YoloLayoutInvalid {
            path: input.to_path_buf(),
            message:
                "expected a YOLO dataset root containing labels/ or a labels/ directory itself"
                    .to_string(),
        });
    };

    let images_dir = root.join("images");

    let data_yaml = root.join("data.yaml");
    let classes_txt = root.join("classes.txt");
    let class_map_source = if data_yaml.is_file() {
        ClassMapSource::DataYaml(data_yaml)
    } else if classes_txt.is_file() {
        ClassMapSource::ClassesTxt(classes_txt)
    } else {
        ClassMapSource::Inferred
    };

    Ok(YoloLayout {
        root,
        images_dir,
        labels_dir,
        class_map_source,
    })
}

fn read_class_map(
    layout: &YoloLayout,
    annotations: &BTreeMap<ImageId, Vec<Annotation>>,
) -> Result<Vec<String>, AnnotatorError> {
    match &layout.class_map_source {
        ClassMapSource::DataYaml(path) => read_data_yaml_names(path),
        ClassMapSource::ClassesTxt(path) => read_classes_txt(path),
        ClassMapSource::Inferred => infer_class_map(&layout.labels_dir, annotations),
    }
}

#[derive(Debug, Deserialize)]
struct DataYaml {
    names: DataYamlNames,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DataYamlNames {
    Sequence(Vec<String>),
    Mapping(BTreeMap<usize, String>),
}

fn read_data_yaml_names(path: &Path) -> Result<Vec<String>, AnnotatorError> {
    let data = fs::read_to_string(path).map_err(AnnotatorError::Io)?;
    let parsed: DataYaml =
        serde_yaml::from_str(&data).map_err(|source| AnnotatorError::DataYamlParse {
            path: path.to_path_buf(),
            source,
        })?;

    let names = match parsed.names {
        DataYamlNames::Sequence(names) => names,
        DataYamlNames::Mapping(mapping) => {
            let Some(&max_index) = mapping.keys().max() else {
                return Ok(Vec::new());
            };
            check_class_count(path, max_index as u64, "data.yaml names key")?;
            let mut names = vec![String::new(); max_index + 1];
            for (index, name) in mapping {
                names[index] = name;
            }
            for (index, name) in names.iter_mut().enumerate() {
                if name.trim().is_empty() {
                    *name = format!("class_{}", index);
                }
            }
            names
        }
    };

    Ok(names)
}

fn read_classes_txt(path: &Path) -> Result<Vec<String>, AnnotatorError> {
    let data = fs::read_to_string(path).map_err(AnnotatorError::Io)?;
    let mut names = Vec::new();

    for (line_idx, line) in data.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Err(AnnotatorError::ClassesTxtInvalid {
                path: path.to_path_buf(),
                message: format!("line {} is empty", line_idx + 1),
            });
        }
        names.push(trimmed.to_string());
    }

    Ok(names)
}

fn infer_class_map(
    labels_dir: &Path,
    annotations: &BTreeMap<ImageId, Vec<Annotation>>,
) -> Result<Vec<String>, AnnotatorError> {
    let max_class_id = annotations
        .values()
        .flatten()
        .map(|ann| ann.category_id.as_u64())
        .max();

    let Some(max_id) = max_class_id else {
        return Ok(Vec::new());
    };
    check_class_count(labels_dir, max_id, "class id")?;

    Ok((0..=max_id).map(|id| format!("class_{}", id)).collect())
}

/// Class maps are dense, so the largest index sizes the whole list.
fn check_class_count(path: &Path, max_index: u64, what: &str) -> Result<(), AnnotatorError> {
    if max_index < MAX_DENSE_CLASSES {
        return Ok(());
    }
    Err(AnnotatorError::YoloLayoutInvalid {
        path: path.to_path_buf(),
        message: format!(
            "{what} {max_index} would need {} class names (limit {MAX_DENSE_CLASSES}); \
             provide classes.txt or data.yaml with explicit names",
            max_index as u128 + 1
        ),
    })
}

/// Files under `root` with one of `extensions`, sorted by relative path.
fn collect_files_with_extensions(
    root: &Path,
    extensions: &[&str],
) -> Result<Vec<PathBuf>, AnnotatorError> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root).follow_links(true) {
        let entry = entry.map_err(|source| AnnotatorError::YoloLayoutInvalid {
            path: root.to_path_buf(),
            message: format!("failed while traversing directory: {source}"),
        })?;

        if entry.file_type().is_file() && has_extension(entry.path(), extensions) {
            files.push(entry.path().to_path_buf());
        }
    }

    files.sort_by_cached_key(|path| rel_string(root, path));
    Ok(files)
}

fn has_extension(path: &Path, allowed: &[&str]) -> bool {
    let Some(ext) = path.extension().and_then(|ext| ext.to_str()) else {
        return false;
    };

    allowed
        .iter()
        .any(|allowed_ext| ext.eq_ignore_ascii_case(allowed_ext))
}

fn read_image_dimensions(path: &Path) -> Result<(u32, u32), AnnotatorError> {
    let size = imagesize::size(path).map_err(|source| AnnotatorError::ImageDimensionRead {
        path: path.to_path_buf(),
        source,
    })?;

    let width: u32 = size
        .width
        .try_into()
        .map_err(|_| AnnotatorError::YoloLayoutInvalid {
            path: path.to_path_buf(),
            message: format!("image width {} does not fit in u32", size.width),
        })?;

    let height: u32 = size
        .height
        .try_into()
        .map_err(|_| AnnotatorError::YoloLayoutInvalid {
            path: path.to_path_buf(),
            message: format!("image height {} does not fit in u32", size.height),
        })?;

    Ok((width, height))
}

fn find_image_for_label(images_dir: &Path, label_rel_path: &Path) -> Option<PathBuf> {
    let stem_rel_path = label_rel_path.with_extension("");
    IMAGE_EXTENSIONS
        .iter()
        .map(|ext| images_dir.join(&stem_rel_path).with_extension(ext))
        .find(|candidate| candidate.is_file())
}

fn is_dir_named(path: &Path, dir_name: &str) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.eq_ignore_ascii_case(dir_name))
        .unwrap_or(false)
}

fn rel_string(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.to_string_lossy().replace('\\', "/")
}

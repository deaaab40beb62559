//! Editor-side data model: images, categories, annotations and the project
//! snapshot that ties them together.
//!
//! All core operations borrow these values; none of them mutate. The editor
//! owns the snapshot and merges results back into its own state.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::bbox::BBoxXYWH;
use super::ids::{AnnotationId, CategoryId, ImageId};
use super::space::{Normalized, Pixel};

/// A snapshot of everything the editor holds for one labeling session.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Project {
    /// Image descriptors in display order.
    pub images: Vec<Image>,

    /// Current annotation list per image. Images without an entry have no
    /// annotations.
    #[serde(default)]
    pub annotations: BTreeMap<ImageId, Vec<Annotation>>,

    /// Category definitions.
    pub categories: Vec<Category>,
}

impl Project {
    /// Annotations for one image; empty if the image has none.
    pub fn annotations_for(&self, image_id: ImageId) -> &[Annotation] {
        self.annotations
            .get(&image_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Pairs every image, in order, with its annotation list.
    pub fn labeled_images(&self) -> Vec<(&Image, &[Annotation])> {
        self.images
            .iter()
            .map(|image| (image, self.annotations_for(image.id)))
            .collect()
    }

    /// All annotations across all images, in image order. Annotations keyed
    /// by an image id that is not in `images` are not included.
    pub fn all_annotations(&self) -> Vec<Annotation> {
        self.images
            .iter()
            .flat_map(|image| self.annotations_for(image.id).iter().cloned())
            .collect()
    }

    /// Total number of annotations across the listed images.
    pub fn annotation_count(&self) -> usize {
        self.images
            .iter()
            .map(|image| self.annotations_for(image.id).len())
            .sum()
    }
}

/// An image descriptor. Pixel data never reaches the core.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Image {
    pub id: ImageId,

    /// File name; the label artifact is named after it.
    pub name: String,

    /// Width in pixels. Only needed to convert pixel-space boxes.
    pub width: u32,

    /// Height in pixels.
    pub height: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl Image {
    pub fn new(id: impl Into<ImageId>, name: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            width,
            height,
            created_at: None,
        }
    }

    pub fn with_created_at(mut self, created_at: impl Into<String>) -> Self {
        self.created_at = Some(created_at.into());
        self
    }
}

/// A named label type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Category {
    /// Class index, written as the first field of each label line.
    pub id: CategoryId,

    pub name: String,

    /// Display color, e.g. `#FF6B6B`. Carries no meaning for export.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl Category {
    pub fn new(id: impl Into<CategoryId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            color: None,
        }
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }
}

/// One box drawn by the editor, in normalized corner form.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub id: AnnotationId,

    /// May reference a category that does not exist; that is tolerated
    /// everywhere in the core.
    pub category_id: CategoryId,

    pub bbox: BBoxXYWH<Normalized>,
}

impl Annotation {
    pub fn new(
        id: impl Into<AnnotationId>,
        category_id: impl Into<CategoryId>,
        bbox: BBoxXYWH<Normalized>,
    ) -> Self {
        Self {
            id: id.into(),
            category_id: category_id.into(),
            bbox,
        }
    }

    /// Builds an annotation from a box drawn in the pixel space of `image`.
    ///
    /// Returns `None` when the image has a zero width or height, as images
    /// imported without a picture do.
    pub fn from_pixel(
        id: impl Into<AnnotationId>,
        category_id: impl Into<CategoryId>,
        bbox: BBoxXYWH<Pixel>,
        image: &Image,
    ) -> Option<Self> {
        if image.width == 0 || image.height == 0 {
            return None;
        }
        Some(Self::new(
            id,
            category_id,
            bbox.to_normalized(image.width as f64, image.height as f64),
        ))
    }

    /// The box in the pixel space of `image`.
    pub fn pixel_bbox(&self, image: &Image) -> BBoxXYWH<Pixel> {
        self.bbox.to_pixel(image.width as f64, image.height as f64)
    }
}

//! Annotation coordinate model.
//!
//! This module holds the editor-facing types (images, categories,
//! annotations, the project snapshot) and the geometry used to move boxes
//! between the editor's corner form and YOLO's center form.
//!
//! # Design Principles
//!
//! 1. **Type Safety**: Pixel and normalized coordinates are distinct types,
//!    so a pixel-space box cannot reach the YOLO codec by accident.
//!
//! 2. **Canonical Form**: Annotations are stored as normalized corner-form
//!    boxes, which is what the editor draws.
//!
//! 3. **Permissive Construction**: Out-of-range boxes are representable;
//!    the validator reports them instead of the constructors refusing them.
//!
//! # Example
//!
//! ```
//! use yolo_annotator::ir::{Annotation, BBoxXYWH, Normalized};
//!
//! let ann = Annotation::new(
//!     1u64,
//!     1u64,
//!     BBoxXYWH::<Normalized>::from_xywh(0.4, 0.4, 0.2, 0.2),
//! );
//! let center = ann.bbox.to_cxcywh();
//! assert!((center.cx() - 0.5).abs() < 1e-12);
//! ```

mod bbox;
mod coord;
mod ids;
pub mod io_json;
pub mod io_yolo_dir;
mod model;
mod space;

pub use bbox::{BBoxCXCYWH, BBoxXYWH};
pub use coord::Coord;
pub use ids::{AnnotationId, CategoryId, ImageId};
pub use model::{Annotation, Category, Image, Project};
pub use space::{CoordSpace, Normalized, Pixel};

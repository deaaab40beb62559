//! Coordinate space markers.
//!
//! Editor boxes may be drawn in pixels or in fractions of the image size.
//! The YOLO codec only ever works in the normalized space, so the two are
//! kept apart in the type system.

/// Implemented by the coordinate space marker types.
pub trait CoordSpace {
    /// Short name used in debug output.
    const NAME: &'static str;
}

/// Absolute pixel positions, origin at the top-left corner of the image.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pixel {}

/// Positions expressed as fractions of the image width/height, `[0, 1]`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum Normalized {}

impl CoordSpace for Pixel {
    const NAME: &'static str = "px";
}

impl CoordSpace for Normalized {
    const NAME: &'static str = "norm";
}

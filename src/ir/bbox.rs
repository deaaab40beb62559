//! Corner-form and center-form bounding boxes, and the conversions between
//! them.
//!
//! The editor draws boxes as a top-left corner plus extent ([`BBoxXYWH`]).
//! YOLO stores a center point plus extent ([`BBoxCXCYWH`]). Going from
//! corner to center form is plain arithmetic. Going back from center form in
//! the normalized space clamps the result into the unit square, so a decoded
//! box can never leave the image.

use serde::{Deserialize, Serialize};

use super::coord::Coord;
use super::space::{CoordSpace, Normalized, Pixel};

/// An axis-aligned box given by its top-left corner and its extent.
///
/// The constructor does not check anything: negative extents or corners
/// outside the image are representable so that validation can report them.
#[derive(Clone, Copy, PartialEq)]
pub struct BBoxXYWH<TSpace> {
    pub origin: Coord<TSpace>,
    pub width: f64,
    pub height: f64,
}

impl<TSpace> BBoxXYWH<TSpace> {
    #[inline]
    pub fn new(origin: Coord<TSpace>, width: f64, height: f64) -> Self {
        Self {
            origin,
            width,
            height,
        }
    }

    #[inline]
    pub fn from_xywh(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::new(Coord::new(x, y), width, height)
    }

    /// Left edge.
    #[inline]
    pub fn x(&self) -> f64 {
        self.origin.x
    }

    /// Top edge.
    #[inline]
    pub fn y(&self) -> f64 {
        self.origin.y
    }

    /// Right edge, `x + width`.
    #[inline]
    pub fn right(&self) -> f64 {
        self.origin.x + self.width
    }

    /// Bottom edge, `y + height`.
    #[inline]
    pub fn bottom(&self) -> f64 {
        self.origin.y + self.height
    }

    #[inline]
    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// The larger of the two extents. Drives the small/medium/large buckets
    /// in the statistics report.
    #[inline]
    pub fn max_side(&self) -> f64 {
        self.width.max(self.height)
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.origin.is_finite() && self.width.is_finite() && self.height.is_finite()
    }

    /// Converts to center form.
    ///
    /// `cx = x + width / 2`, `cy = y + height / 2`. No validation and no
    /// clamping; non-finite input propagates as-is.
    #[inline]
    pub fn to_cxcywh(&self) -> BBoxCXCYWH<TSpace> {
        BBoxCXCYWH::new(
            self.origin.offset(self.width / 2.0, self.height / 2.0),
            self.width,
            self.height,
        )
    }
}

impl BBoxXYWH<Normalized> {
    /// Returns true if the box lies inside the unit square.
    pub fn is_within_unit(&self) -> bool {
        self.x() >= 0.0 && self.y() >= 0.0 && self.right() <= 1.0 && self.bottom() <= 1.0
    }

    /// Scales the box to pixel coordinates of an image of the given size.
    pub fn to_pixel(&self, image_width: f64, image_height: f64) -> BBoxXYWH<Pixel> {
        BBoxXYWH::new(
            self.origin.scaled(image_width, image_height),
            self.width * image_width,
            self.height * image_height,
        )
    }
}

impl BBoxXYWH<Pixel> {
    /// Scales the box to fractions of an image of the given size.
    pub fn to_normalized(&self, image_width: f64, image_height: f64) -> BBoxXYWH<Normalized> {
        BBoxXYWH::new(
            self.origin.scaled(1.0 / image_width, 1.0 / image_height),
            self.width / image_width,
            self.height / image_height,
        )
    }
}

impl<TSpace: CoordSpace> std::fmt::Debug for BBoxXYWH<TSpace> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BBoxXYWH")
            .field("space", &TSpace::NAME)
            .field("x", &self.origin.x)
            .field("y", &self.origin.y)
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

impl<TSpace> Default for BBoxXYWH<TSpace> {
    fn default() -> Self {
        Self::from_xywh(0.0, 0.0, 0.0, 0.0)
    }
}

// Flat `{x, y, width, height}` on the wire, matching the editor's own shape.
impl<TSpace> Serialize for BBoxXYWH<TSpace> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("BBoxXYWH", 4)?;
        state.serialize_field("x", &self.origin.x)?;
        state.serialize_field("y", &self.origin.y)?;
        state.serialize_field("width", &self.width)?;
        state.serialize_field("height", &self.height)?;
        state.end()
    }
}

impl<'de, TSpace> Deserialize<'de> for BBoxXYWH<TSpace> {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct CornerBox {
            x: f64,
            y: f64,
            width: f64,
            height: f64,
        }
        let data = CornerBox::deserialize(deserializer)?;
        Ok(BBoxXYWH::from_xywh(data.x, data.y, data.width, data.height))
    }
}

/// An axis-aligned box given by its center point and its extent. This is the
/// geometry carried by a YOLO label line.
#[derive(Clone, Copy, PartialEq)]
pub struct BBoxCXCYWH<TSpace> {
    pub center: Coord<TSpace>,
    pub width: f64,
    pub height: f64,
}

impl<TSpace> BBoxCXCYWH<TSpace> {
    #[inline]
    pub fn new(center: Coord<TSpace>, width: f64, height: f64) -> Self {
        Self {
            center,
            width,
            height,
        }
    }

    #[inline]
    pub fn from_cxcywh(cx: f64, cy: f64, width: f64, height: f64) -> Self {
        Self::new(Coord::new(cx, cy), width, height)
    }

    #[inline]
    pub fn cx(&self) -> f64 {
        self.center.x
    }

    #[inline]
    pub fn cy(&self) -> f64 {
        self.center.y
    }

    /// Converts to corner form without any clamping.
    ///
    /// The result may extend past the image; the validator relies on this to
    /// flag boxes that decoding would silently truncate.
    #[inline]
    pub fn to_xywh(&self) -> BBoxXYWH<TSpace> {
        BBoxXYWH::new(
            self.center.offset(-self.width / 2.0, -self.height / 2.0),
            self.width,
            self.height,
        )
    }
}

impl BBoxCXCYWH<Normalized> {
    /// Converts to corner form, clamped into the unit square.
    ///
    /// `x = max(0, cx - w/2)`, then `w' = min(w, 1 - x)`; likewise for `y`
    /// and `h`. A box overflowing the right or bottom edge is truncated,
    /// never shifted. Applying the conversion to its own output (through
    /// [`BBoxXYWH::to_cxcywh`]) changes nothing.
    pub fn to_xywh_clamped(&self) -> BBoxXYWH<Normalized> {
        let x = (self.center.x - self.width / 2.0).max(0.0);
        let y = (self.center.y - self.height / 2.0).max(0.0);
        let width = self.width.min(1.0 - x);
        let height = self.height.min(1.0 - y);
        BBoxXYWH::from_xywh(x, y, width, height)
    }
}

impl<TSpace: CoordSpace> std::fmt::Debug for BBoxCXCYWH<TSpace> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BBoxCXCYWH")
            .field("space", &TSpace::NAME)
            .field("cx", &self.center.x)
            .field("cy", &self.center.y)
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

impl<TSpace> Serialize for BBoxCXCYWH<TSpace> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("BBoxCXCYWH", 4)?;
        state.serialize_field("cx", &self.center.x)?;
        state.serialize_field("cy", &self.center.y)?;
        state.serialize_field("width", &self.width)?;
        state.serialize_field("height", &self.height)?;
        state.end()
    }
}

impl<'de, TSpace> Deserialize<'de> for BBoxCXCYWH<TSpace> {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct CenterBox {
            cx: f64,
            cy: f64,
            width: f64,
            height: f64,
        }
        let data = CenterBox::deserialize(deserializer)?;
        Ok(BBoxCXCYWH::from_cxcywh(
            data.cx,
            data.cy,
            data.width,
            data.height,
        ))
    }
}

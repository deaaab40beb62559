//! Typed 2D points.

use serde::{Deserialize, Serialize};
use std::marker::PhantomData;

use super::space::CoordSpace;

/// A point tagged with the coordinate space it lives in.
///
/// Used as the top-left corner of a [`BBoxXYWH`](super::BBoxXYWH) and as the
/// center of a [`BBoxCXCYWH`](super::BBoxCXCYWH).
#[derive(Clone, Copy, PartialEq)]
pub struct Coord<TSpace> {
    pub x: f64,
    pub y: f64,
    _space: PhantomData<TSpace>,
}

impl<TSpace> Coord<TSpace> {
    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            _space: PhantomData,
        }
    }

    /// Returns true if both components are finite.
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Moves the point by `(dx, dy)`.
    #[inline]
    pub fn offset(&self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Scales each component independently. Used for pixel/normalized
    /// conversion, so the result is usually re-tagged by the caller.
    #[inline]
    pub(crate) fn scaled<TOut>(&self, sx: f64, sy: f64) -> Coord<TOut> {
        Coord::new(self.x * sx, self.y * sy)
    }
}

impl<TSpace: CoordSpace> std::fmt::Debug for Coord<TSpace> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Coord<{}>({}, {})", TSpace::NAME, self.x, self.y)
    }
}

impl<TSpace> Default for Coord<TSpace> {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

// Hand-written so TSpace does not need to implement serde traits.
impl<TSpace> Serialize for Coord<TSpace> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("Coord", 2)?;
        state.serialize_field("x", &self.x)?;
        state.serialize_field("y", &self.y)?;
        state.end()
    }
}

impl<'de, TSpace> Deserialize<'de> for Coord<TSpace> {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Point {
            x: f64,
            y: f64,
        }
        let point = Point::deserialize(deserializer)?;
        Ok(Coord::new(point.x, point.y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Normalized, Pixel};

    #[test]
    fn test_coord_offset() {
        let c: Coord<Normalized> = Coord::new(0.25, 0.5);
        let moved = c.offset(0.25, -0.25);
        assert_eq!(moved.x, 0.5);
        assert_eq!(moved.y, 0.25);
    }

    #[test]
    fn test_coord_is_finite() {
        assert!(Coord::<Pixel>::new(1.0, 2.0).is_finite());
        assert!(!Coord::<Pixel>::new(f64::NAN, 2.0).is_finite());
        assert!(!Coord::<Pixel>::new(1.0, f64::NEG_INFINITY).is_finite());
    }

    #[test]
    fn test_coord_debug_names_space() {
        let c: Coord<Pixel> = Coord::new(3.0, 4.0);
        assert_eq!(format!("{:?}", c), "Coord<px>(3, 4)");
    }
}

use crate::geometry::Point;

/// A pointer sample tagged with the kind of device that produced it.
///
/// Coordinates are read according to the tag; a coordinate of `0.0` is an
/// ordinary position, never a "missing" marker.
#[derive(Clone, Debug, PartialEq)]
pub enum PointerInput {
    Mouse { position: Point },
    Touch { touches: Vec<Point> },
}

impl PointerInput {
    pub fn mouse(x: f32, y: f32) -> Self {
        Self::Mouse {
            position: Point::new(x, y),
        }
    }

    pub fn touch(touches: impl Into<Vec<Point>>) -> Self {
        Self::Touch {
            touches: touches.into(),
        }
    }

    /// Position of the primary pointer, `None` for a touch event that carries
    /// no touch points (e.g. the last finger was lifted).
    pub fn position(&self) -> Option<Point> {
        match self {
            Self::Mouse { position } => Some(*position),
            Self::Touch { touches } => touches.first().copied(),
        }
    }
}

impl From<Point> for PointerInput {
    fn from(position: Point) -> Self {
        Self::Mouse { position }
    }
}

//! Points and sizes in render-surface and device coordinate spaces.

use serde::{Deserialize, Serialize};

/// A point in either view-local or normalized device coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal component.
    pub x: f64,
    /// Vertical component.
    pub y: f64,
}

impl Point {
    /// Creates a point.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Size of a render surface in view-local units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    /// Width in view units.
    pub width: f64,
    /// Height in view units.
    pub height: f64,
}

impl Size {
    /// Creates a size.
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Returns true if either dimension is zero, negative or not finite.
    pub fn is_degenerate(&self) -> bool {
        !(self.width.is_finite() && self.height.is_finite())
            || self.width <= 0.0
            || self.height <= 0.0
    }
}

/// Converts a touch location on the preview into a device point of interest.
///
/// The sensor is mounted in a fixed portrait orientation, so the mapping is
/// rotated by 90 degrees: `x = touch.y / height`, `y = 1 - touch.x / width`.
/// Returns `None` for a degenerate view size.
pub fn touch_to_point_of_interest(touch: Point, view: Size) -> Option<Point> {
    if view.is_degenerate() {
        return None;
    }

    Some(Point {
        x: touch.y / view.height,
        y: 1.0 - touch.x / view.width,
    })
}

//! Grid snapping and the grid/guide toggles for move sessions.

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Grid spacing in centimeters (matches the drawn grid).
pub const GRID_SPACING_CM: f64 = 1.0;

/// Which move-assistance is enabled. Grid snap wins when both are on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapSettings {
    pub grid: bool,
    /// Smart alignment guides.
    pub guides: bool,
}

impl Default for SnapSettings {
    fn default() -> Self {
        Self {
            grid: false,
            guides: true,
        }
    }
}

impl SnapSettings {
    /// Guides only run when the grid is off.
    pub fn uses_guides(self) -> bool {
        self.guides && !self.grid
    }
}

/// Round an object's top-left to the nearest grid intersection, in device
/// units. A non-positive or non-finite spacing leaves it where it is.
pub fn snap_to_grid(position: Point, spacing: f64) -> Point {
    if !(spacing.is_finite() && spacing > 0.0) {
        return position;
    }
    Point::new(
        (position.x / spacing).round() * spacing,
        (position.y / spacing).round() * spacing,
    )
}

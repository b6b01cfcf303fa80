//! Control handles on a selected object: layout, hit-testing and cursor mapping.
//!
//! Handles live in the object's un-rotated local frame, origin at the top-left
//! corner. Scene points are mapped into that frame with [`scene_to_local`].

use crate::geometry::rotate_point;
use crate::object::Transform;
use kurbo::{Point, Rect, Size};
use serde::{Deserialize, Serialize};

/// Visual radius of a handle in device units.
pub const HANDLE_RADIUS: f64 = 12.0;
/// Distance from the top edge to the rotation handle in device units.
pub const ROTATION_HANDLE_DISTANCE: f64 = 40.0;

/// Corner positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Corner {
    NorthWest,
    NorthEast,
    SouthWest,
    SouthEast,
}

/// Edge midpoint positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Edge {
    North,
    South,
    West,
    East,
}

/// Kind of control handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HandleKind {
    Corner(Corner),
    Edge(Edge),
    Rotate,
}

impl HandleKind {
    pub const NW: HandleKind = HandleKind::Corner(Corner::NorthWest);
    pub const NE: HandleKind = HandleKind::Corner(Corner::NorthEast);
    pub const SW: HandleKind = HandleKind::Corner(Corner::SouthWest);
    pub const SE: HandleKind = HandleKind::Corner(Corner::SouthEast);
    pub const N: HandleKind = HandleKind::Edge(Edge::North);
    pub const S: HandleKind = HandleKind::Edge(Edge::South);
    pub const W: HandleKind = HandleKind::Edge(Edge::West);
    pub const E: HandleKind = HandleKind::Edge(Edge::East);

    /// Direction of growth per axis: -1 for the west/north side, +1 for
    /// east/south, 0 when the handle does not resize that axis.
    pub fn resize_signs(self) -> (f64, f64) {
        match self {
            HandleKind::Corner(Corner::NorthWest) => (-1.0, -1.0),
            HandleKind::Corner(Corner::NorthEast) => (1.0, -1.0),
            HandleKind::Corner(Corner::SouthWest) => (-1.0, 1.0),
            HandleKind::Corner(Corner::SouthEast) => (1.0, 1.0),
            HandleKind::Edge(Edge::North) => (0.0, -1.0),
            HandleKind::Edge(Edge::South) => (0.0, 1.0),
            HandleKind::Edge(Edge::West) => (-1.0, 0.0),
            HandleKind::Edge(Edge::East) => (1.0, 0.0),
            HandleKind::Rotate => (0.0, 0.0),
        }
    }

    pub fn is_corner(self) -> bool {
        matches!(self, HandleKind::Corner(_))
    }

    /// Cursor shown while hovering or dragging this handle.
    pub fn cursor(self) -> CursorIcon {
        match self {
            HandleKind::Corner(Corner::NorthWest | Corner::SouthEast) => {
                CursorIcon::DiagonalResizeNwSe
            }
            HandleKind::Corner(Corner::NorthEast | Corner::SouthWest) => {
                CursorIcon::DiagonalResizeNeSw
            }
            HandleKind::Edge(Edge::North | Edge::South) => CursorIcon::VerticalResize,
            HandleKind::Edge(Edge::West | Edge::East) => CursorIcon::HorizontalResize,
            HandleKind::Rotate => CursorIcon::Crosshair,
        }
    }
}

/// Pointer affordance requested from the host toolkit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CursorIcon {
    Default,
    Move,
    /// `\` diagonal.
    DiagonalResizeNwSe,
    /// `/` diagonal.
    DiagonalResizeNeSw,
    VerticalResize,
    HorizontalResize,
    Crosshair,
}

/// A handle anchor in local coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Handle {
    pub kind: HandleKind,
    pub position: Point,
}

impl Handle {
    pub fn new(kind: HandleKind, position: Point) -> Self {
        Self { kind, position }
    }

    /// Check if a local point lies within `radius` of the anchor.
    pub fn hit_test(&self, point: Point, radius: f64) -> bool {
        let dx = point.x - self.position.x;
        let dy = point.y - self.position.y;
        dx * dx + dy * dy <= radius * radius
    }
}

/// The nine handles of one object plus the stem joining the rotation handle
/// to the top edge.
#[derive(Debug, Clone, PartialEq)]
pub struct HandleLayout {
    /// Rotation handle first, then corners, then edges (hit-test priority).
    pub handles: Vec<Handle>,
    /// Segment from the top edge midpoint up to the rotation handle.
    pub rotation_stem: (Point, Point),
    pub hit_radius: f64,
}

impl HandleLayout {
    /// Lay out handles for an un-rotated local rectangle of `size`.
    pub fn new(size: Size, hit_radius: f64, rotation_distance: f64) -> Self {
        let rect = Rect::from_origin_size(Point::ZERO, size);
        let mid_x = rect.center().x;
        let mid_y = rect.center().y;
        let rotate_anchor = Point::new(mid_x, rect.y0 - rotation_distance);

        let handles = vec![
            Handle::new(HandleKind::Rotate, rotate_anchor),
            Handle::new(HandleKind::NW, Point::new(rect.x0, rect.y0)),
            Handle::new(HandleKind::NE, Point::new(rect.x1, rect.y0)),
            Handle::new(HandleKind::SW, Point::new(rect.x0, rect.y1)),
            Handle::new(HandleKind::SE, Point::new(rect.x1, rect.y1)),
            Handle::new(HandleKind::N, Point::new(mid_x, rect.y0)),
            Handle::new(HandleKind::S, Point::new(mid_x, rect.y1)),
            Handle::new(HandleKind::W, Point::new(rect.x0, mid_y)),
            Handle::new(HandleKind::E, Point::new(rect.x1, mid_y)),
        ];

        Self {
            handles,
            rotation_stem: (Point::new(mid_x, rect.y0), rotate_anchor),
            hit_radius,
        }
    }

    /// Layout with the default radius and rotation distance.
    pub fn for_size(size: Size) -> Self {
        Self::new(size, HANDLE_RADIUS, ROTATION_HANDLE_DISTANCE)
    }

    /// First handle hit by a local point. `None` means the gesture is a move.
    pub fn hit_test(&self, local_point: Point) -> Option<HandleKind> {
        self.handles
            .iter()
            .find(|h| h.hit_test(local_point, self.hit_radius))
            .map(|h| h.kind)
    }

    /// Cursor for a local point. Locked objects only ever show the default cursor.
    pub fn cursor_at(&self, local_point: Point, locked: bool) -> CursorIcon {
        if locked {
            return CursorIcon::Default;
        }
        match self.hit_test(local_point) {
            Some(kind) => kind.cursor(),
            None => CursorIcon::Move,
        }
    }

    /// Handle anchors mapped into scene space for drawing.
    pub fn scene_handles(&self, transform: &Transform) -> Vec<Handle> {
        self.handles
            .iter()
            .map(|h| Handle::new(h.kind, local_to_scene(h.position, transform)))
            .collect()
    }
}

/// Map a scene point into the object's un-rotated local frame.
pub fn scene_to_local(point: Point, transform: &Transform) -> Point {
    let unrotated = rotate_point(point, transform.center(), -transform.rotation);
    Point::new(
        unrotated.x - transform.position.x,
        unrotated.y - transform.position.y,
    )
}

/// Map a local point back into scene space.
pub fn local_to_scene(point: Point, transform: &Transform) -> Point {
    let unrotated = Point::new(
        point.x + transform.position.x,
        point.y + transform.position.y,
    );
    rotate_point(unrotated, transform.center(), transform.rotation)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nine_handles() {
        let layout = HandleLayout::for_size(Size::new(200.0, 100.0));
        assert_eq!(layout.handles.len(), 9);
        assert_eq!(layout.handles[0].kind, HandleKind::Rotate);
        assert_eq!(layout.handles[0].position, Point::new(100.0, -40.0));
        assert_eq!(layout.rotation_stem, (Point::new(100.0, 0.0), Point::new(100.0, -40.0)));
    }

    #[test]
    fn test_hit_corners_and_edges() {
        let layout = HandleLayout::for_size(Size::new(200.0, 100.0));
        assert_eq!(layout.hit_test(Point::new(2.0, 3.0)), Some(HandleKind::NW));
        assert_eq!(layout.hit_test(Point::new(198.0, 99.0)), Some(HandleKind::SE));
        assert_eq!(layout.hit_test(Point::new(200.0, 0.0)), Some(HandleKind::NE));
        assert_eq!(layout.hit_test(Point::new(0.0, 100.0)), Some(HandleKind::SW));
        assert_eq!(layout.hit_test(Point::new(100.0, 5.0)), Some(HandleKind::N));
        assert_eq!(layout.hit_test(Point::new(100.0, 95.0)), Some(HandleKind::S));
        assert_eq!(layout.hit_test(Point::new(0.0, 50.0)), Some(HandleKind::W));
        assert_eq!(layout.hit_test(Point::new(200.0, 50.0)), Some(HandleKind::E));
        assert_eq!(layout.hit_test(Point::new(100.0, -40.0)), Some(HandleKind::Rotate));
    }

    #[test]
    fn test_body_is_move() {
        let layout = HandleLayout::for_size(Size::new(200.0, 100.0));
        assert_eq!(layout.hit_test(Point::new(60.0, 50.0)), None);
        assert_eq!(layout.cursor_at(Point::new(60.0, 50.0), false), CursorIcon::Move);
        assert_eq!(layout.cursor_at(Point::new(60.0, 50.0), true), CursorIcon::Default);
    }

    #[test]
    fn test_rotation_has_priority_on_small_objects() {
        // Object so short that the rotation anchor overlaps the north handle's radius
        let layout = HandleLayout::new(Size::new(20.0, 4.0), 12.0, 8.0);
        // (10, -4) is within 12 of both the rotation anchor (10, -8) and N (10, 0)
        assert_eq!(layout.hit_test(Point::new(10.0, -4.0)), Some(HandleKind::Rotate));
    }

    #[test]
    fn test_cursor_mapping() {
        assert_eq!(HandleKind::NW.cursor(), CursorIcon::DiagonalResizeNwSe);
        assert_eq!(HandleKind::SE.cursor(), CursorIcon::DiagonalResizeNwSe);
        assert_eq!(HandleKind::NE.cursor(), CursorIcon::DiagonalResizeNeSw);
        assert_eq!(HandleKind::SW.cursor(), CursorIcon::DiagonalResizeNeSw);
        assert_eq!(HandleKind::N.cursor(), CursorIcon::VerticalResize);
        assert_eq!(HandleKind::E.cursor(), CursorIcon::HorizontalResize);
        assert_eq!(HandleKind::Rotate.cursor(), CursorIcon::Crosshair);
    }

    #[test]
    fn test_scene_local_round_trip() {
        let transform = Transform::new(Point::new(50.0, 80.0), Size::new(100.0, 40.0), 30.0);
        let scene = Point::new(123.0, 77.0);
        let back = local_to_scene(scene_to_local(scene, &transform), &transform);
        assert!((back.x - scene.x).abs() < 1e-9);
        assert!((back.y - scene.y).abs() < 1e-9);
    }

    #[test]
    fn test_rotated_handle_hit() {
        // Rotated a half turn: the rotation handle now sits below the object
        let transform = Transform::new(Point::new(0.0, 0.0), Size::new(100.0, 50.0), 180.0);
        let layout = HandleLayout::for_size(transform.size);
        let local = scene_to_local(Point::new(50.0, 90.0), &transform);
        assert_eq!(layout.hit_test(local), Some(HandleKind::Rotate));
    }
}

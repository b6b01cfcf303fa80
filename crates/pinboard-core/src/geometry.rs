//! Trigonometry helpers shared by the handle, session and guide code.

use kurbo::{Point, Rect};

/// Angle snap increment in degrees.
pub const ANGLE_SNAP_INCREMENT: f64 = 15.0;

/// Map any angle into `[0, 360)`. Non-finite input maps to 0.
pub fn normalize_degrees(angle: f64) -> f64 {
    if !angle.is_finite() {
        return 0.0;
    }
    let wrapped = angle.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Rotate `point` about `center` by `angle_degrees` (clockwise on a y-down canvas).
pub fn rotate_point(point: Point, center: Point, angle_degrees: f64) -> Point {
    let (sin_r, cos_r) = angle_degrees.to_radians().sin_cos();
    let dx = point.x - center.x;
    let dy = point.y - center.y;
    Point::new(
        center.x + dx * cos_r - dy * sin_r,
        center.y + dx * sin_r + dy * cos_r,
    )
}

/// Angle from `center` to `point` in degrees.
///
/// Offset by +90° so a point straight above the center reads 0°, matching the
/// rotation handle sitting above an unrotated object.
pub fn angle_between(center: Point, point: Point) -> f64 {
    let dx = point.x - center.x;
    let dy = point.y - center.y;
    if dx.abs() < f64::EPSILON && dy.abs() < f64::EPSILON {
        return 0.0;
    }
    normalize_degrees(dy.atan2(dx).to_degrees() + 90.0)
}

/// Snap an angle to the nearest multiple of 15° if it lies within `threshold_degrees`.
/// Returns the angle in `[0, 360)`.
pub fn snap_angle(angle_degrees: f64, threshold_degrees: f64) -> f64 {
    let angle = normalize_degrees(angle_degrees);
    let snapped = (angle / ANGLE_SNAP_INCREMENT).round() * ANGLE_SNAP_INCREMENT;
    if (snapped - angle).abs() <= threshold_degrees {
        normalize_degrees(snapped)
    } else {
        angle
    }
}

/// Axis-aligned bounds of a `width` x `height` rectangle at `origin` rotated about its center.
pub fn rotated_bounds(origin: Point, width: f64, height: f64, rotation_degrees: f64) -> Rect {
    let rect = Rect::new(origin.x, origin.y, origin.x + width, origin.y + height);
    if normalize_degrees(rotation_degrees).abs() < 1e-9 {
        return rect;
    }
    let center = rect.center();
    let corners = [
        Point::new(rect.x0, rect.y0),
        Point::new(rect.x1, rect.y0),
        Point::new(rect.x1, rect.y1),
        Point::new(rect.x0, rect.y1),
    ];
    let rotated = corners.map(|p| rotate_point(p, center, rotation_degrees));

    let min_x = rotated.iter().map(|p| p.x).fold(f64::INFINITY, f64::min);
    let max_x = rotated.iter().map(|p| p.x).fold(f64::NEG_INFINITY, f64::max);
    let min_y = rotated.iter().map(|p| p.y).fold(f64::INFINITY, f64::min);
    let max_y = rotated.iter().map(|p| p.y).fold(f64::NEG_INFINITY, f64::max);

    Rect::new(min_x, min_y, max_x, max_y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_degrees() {
        assert!((normalize_degrees(370.0) - 10.0).abs() < 1e-9);
        assert!((normalize_degrees(-90.0) - 270.0).abs() < 1e-9);
        assert_eq!(normalize_degrees(360.0), 0.0);
        assert_eq!(normalize_degrees(f64::NAN), 0.0);
        assert_eq!(normalize_degrees(f64::INFINITY), 0.0);
    }

    #[test]
    fn test_rotate_point_quarter_turn() {
        let rotated = rotate_point(Point::new(10.0, 0.0), Point::ZERO, 90.0);
        assert!(rotated.x.abs() < 1e-9);
        assert!((rotated.y - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_rotate_point_round_trip() {
        let center = Point::new(5.0, 7.0);
        let p = Point::new(12.0, -3.0);
        let back = rotate_point(rotate_point(p, center, 33.0), center, -33.0);
        assert!((back.x - p.x).abs() < 1e-9);
        assert!((back.y - p.y).abs() < 1e-9);
    }

    #[test]
    fn test_angle_between_up_is_zero() {
        let center = Point::new(100.0, 100.0);
        assert!(angle_between(center, Point::new(100.0, 50.0)).abs() < 1e-9);
        assert!((angle_between(center, Point::new(150.0, 100.0)) - 90.0).abs() < 1e-9);
        assert!((angle_between(center, Point::new(100.0, 150.0)) - 180.0).abs() < 1e-9);
        assert!((angle_between(center, Point::new(50.0, 100.0)) - 270.0).abs() < 1e-9);
    }

    #[test]
    fn test_angle_between_same_point() {
        let p = Point::new(3.0, 3.0);
        assert_eq!(angle_between(p, p), 0.0);
    }

    #[test]
    fn test_snap_angle() {
        assert!((snap_angle(7.0, 7.5) - 0.0).abs() < 0.01);
        assert!((snap_angle(8.0, 7.5) - 15.0).abs() < 0.01);
        assert!((snap_angle(22.0, 7.5) - 15.0).abs() < 0.01);
        assert!((snap_angle(23.0, 7.5) - 30.0).abs() < 0.01);
        assert!((snap_angle(359.0, 7.5) - 0.0).abs() < 0.01);
    }

    #[test]
    fn test_snap_angle_outside_threshold() {
        assert!((snap_angle(22.0, 3.0) - 22.0).abs() < 1e-9);
        assert!((snap_angle(44.0, 3.0) - 45.0).abs() < 1e-9);
    }

    #[test]
    fn test_rotated_bounds_quarter_turn() {
        let bounds = rotated_bounds(Point::new(0.0, 0.0), 100.0, 50.0, 90.0);
        assert!((bounds.width() - 50.0).abs() < 1e-9);
        assert!((bounds.height() - 100.0).abs() < 1e-9);
        assert!((bounds.center().x - 50.0).abs() < 1e-9);
        assert!((bounds.center().y - 25.0).abs() < 1e-9);
    }
}

//! Smart alignment guides for move sessions.
//!
//! On every pointer move the candidate bounds of the dragged object are
//! compared against the canvas frame and every other visible object. Each axis
//! is resolved independently and at most one guide is produced per axis.

use crate::object::ObjectId;
use crate::scene::Scene;
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// Default alignment distance in device units.
pub const GUIDE_SNAP_THRESHOLD: f64 = 5.0;

/// Direction of a guide line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GuideOrientation {
    /// Constant x, drawn top to bottom.
    Vertical,
    /// Constant y, drawn left to right.
    Horizontal,
}

/// A transient alignment line spanning the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GuideLine {
    pub orientation: GuideOrientation,
    /// x for vertical guides, y for horizontal ones.
    pub coordinate: f64,
    /// Extent along the other axis.
    pub start: f64,
    pub end: f64,
}

impl GuideLine {
    /// Endpoints in scene space.
    pub fn endpoints(&self) -> (Point, Point) {
        match self.orientation {
            GuideOrientation::Vertical => (
                Point::new(self.coordinate, self.start),
                Point::new(self.coordinate, self.end),
            ),
            GuideOrientation::Horizontal => (
                Point::new(self.start, self.coordinate),
                Point::new(self.end, self.coordinate),
            ),
        }
    }
}

/// Kind of alignment, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AlignmentKind {
    CenterToCenter,
    EdgeToEdge,
    CenterToEdge,
}

/// Winning alignment on one axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisMatch {
    pub kind: AlignmentKind,
    /// Aligned coordinate on the target (where the guide is drawn).
    pub coordinate: f64,
    /// Shift to apply to the moving bounds on this axis.
    pub offset: f64,
}

/// Outcome of one detection pass.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GuideResult {
    pub x: Option<AxisMatch>,
    pub y: Option<AxisMatch>,
    pub guides: Vec<GuideLine>,
}

impl GuideResult {
    /// Total shift to apply to the candidate position.
    pub fn offset(&self) -> Vec2 {
        Vec2::new(
            self.x.map_or(0.0, |m| m.offset),
            self.y.map_or(0.0, |m| m.offset),
        )
    }

    pub fn is_snapped(&self) -> bool {
        self.x.is_some() || self.y.is_some()
    }
}

/// min / max / center along one axis.
#[derive(Debug, Clone, Copy)]
struct AxisExtents {
    min: f64,
    max: f64,
    center: f64,
}

impl AxisExtents {
    fn horizontal(rect: Rect) -> Self {
        Self {
            min: rect.x0,
            max: rect.x1,
            center: (rect.x0 + rect.x1) / 2.0,
        }
    }

    fn vertical(rect: Rect) -> Self {
        Self {
            min: rect.y0,
            max: rect.y1,
            center: (rect.y0 + rect.y1) / 2.0,
        }
    }

    /// Candidate pairs (moving value, target value) in priority order.
    fn pairs(&self, target: &AxisExtents) -> [(AlignmentKind, f64, f64); 7] {
        [
            (AlignmentKind::CenterToCenter, self.center, target.center),
            (AlignmentKind::EdgeToEdge, self.min, target.min),
            (AlignmentKind::EdgeToEdge, self.max, target.max),
            (AlignmentKind::CenterToEdge, self.center, target.min),
            (AlignmentKind::CenterToEdge, self.center, target.max),
            (AlignmentKind::CenterToEdge, self.min, target.center),
            (AlignmentKind::CenterToEdge, self.max, target.center),
        ]
    }
}

/// Read-only alignment search over a scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GuideDetector {
    /// Matches require `|difference| < threshold`.
    pub threshold: f64,
}

impl Default for GuideDetector {
    fn default() -> Self {
        Self {
            threshold: GUIDE_SNAP_THRESHOLD,
        }
    }
}

impl GuideDetector {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    /// Find alignments for `moving` (device-space bounds) against the canvas
    /// and every visible object except `moving_id`.
    ///
    /// Per axis the highest-priority kind wins, then the smallest distance,
    /// then the first target scanned (canvas first, then scene order).
    pub fn detect(&self, moving: Rect, moving_id: Option<ObjectId>, scene: &Scene) -> GuideResult {
        let canvas = scene.frame.device_rect();
        let dpi = scene.dpi();

        let mut targets = Vec::with_capacity(scene.len() + 1);
        targets.push(canvas);
        targets.extend(
            scene
                .objects()
                .iter()
                .filter(|o| o.visible && Some(o.id()) != moving_id)
                .map(|o| o.device_bounds(dpi)),
        );

        let x = self.best_match(
            AxisExtents::horizontal(moving),
            targets.iter().map(|r| AxisExtents::horizontal(*r)),
        );
        let y = self.best_match(
            AxisExtents::vertical(moving),
            targets.iter().map(|r| AxisExtents::vertical(*r)),
        );

        let mut guides = Vec::with_capacity(2);
        if let Some(m) = x {
            guides.push(GuideLine {
                orientation: GuideOrientation::Vertical,
                coordinate: m.coordinate,
                start: canvas.y0,
                end: canvas.y1,
            });
        }
        if let Some(m) = y {
            guides.push(GuideLine {
                orientation: GuideOrientation::Horizontal,
                coordinate: m.coordinate,
                start: canvas.x0,
                end: canvas.x1,
            });
        }

        GuideResult { x, y, guides }
    }

    fn best_match(
        &self,
        moving: AxisExtents,
        targets: impl Iterator<Item = AxisExtents>,
    ) -> Option<AxisMatch> {
        let mut best: Option<(AxisMatch, f64)> = None;

        for target in targets {
            for (kind, moving_value, target_value) in moving.pairs(&target) {
                let offset = target_value - moving_value;
                let distance = offset.abs();
                if distance.is_nan() || distance >= self.threshold {
                    continue;
                }
                let better = match &best {
                    None => true,
                    Some((current, current_distance)) => {
                        kind < current.kind
                            || (kind == current.kind && distance < *current_distance)
                    }
                };
                if better {
                    best = Some((
                        AxisMatch {
                            kind,
                            coordinate: target_value,
                            offset,
                        },
                        distance,
                    ));
                }
            }
        }

        best.map(|(m, _)| m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::SceneObject;
    use crate::scene::CanvasFrame;
    use crate::units::cm_to_device;
    use kurbo::Size;

    /// 1 inch = 96 device units at 96 DPI, which keeps the numbers readable.
    fn scene_with(objects: &[(f64, f64, f64, f64)]) -> (Scene, Vec<ObjectId>) {
        let mut scene = Scene::new(CanvasFrame::new(2.54 * 10.0, 2.54 * 10.0, 96.0));
        let ids = objects
            .iter()
            .map(|&(x, y, w, h)| {
                scene.add(SceneObject::shape(
                    Point::new(x * 2.54 / 96.0, y * 2.54 / 96.0),
                    Size::new(w * 2.54 / 96.0, h * 2.54 / 96.0),
                ))
            })
            .collect();
        (scene, ids)
    }

    #[test]
    fn test_center_alignment_snaps_exactly() {
        let (scene, _) = scene_with(&[(200.0, 100.0, 100.0, 100.0)]);
        let moving = Rect::new(203.0, 500.0, 303.0, 580.0);
        let result = GuideDetector::default().detect(moving, None, &scene);

        let x = result.x.unwrap();
        assert_eq!(x.kind, AlignmentKind::CenterToCenter);
        assert!((x.coordinate - 250.0).abs() < 1e-9);
        assert!((moving.center().x + x.offset - 250.0).abs() < 1e-9);
        assert!(result.y.is_none());
        assert_eq!(result.guides.len(), 1);
        assert_eq!(result.guides[0].orientation, GuideOrientation::Vertical);
        assert!((result.guides[0].coordinate - 250.0).abs() < 1e-9);
    }

    #[test]
    fn test_guide_spans_canvas() {
        let (scene, _) = scene_with(&[(200.0, 100.0, 100.0, 100.0)]);
        let moving = Rect::new(203.0, 500.0, 303.0, 580.0);
        let result = GuideDetector::default().detect(moving, None, &scene);
        let (start, end) = result.guides[0].endpoints();
        assert_eq!(start.y, 0.0);
        assert!((end.y - 960.0).abs() < 1e-9);
    }

    #[test]
    fn test_edge_alignment() {
        // Different widths so the centers do not line up, left edges within 4
        let (scene, _) = scene_with(&[(200.0, 100.0, 300.0, 100.0)]);
        let moving = Rect::new(204.0, 600.0, 254.0, 650.0);
        let result = GuideDetector::default().detect(moving, None, &scene);
        let x = result.x.unwrap();
        assert_eq!(x.kind, AlignmentKind::EdgeToEdge);
        assert!((x.offset + 4.0).abs() < 1e-9);
        assert!((x.coordinate - 200.0).abs() < 1e-9);
    }

    #[test]
    fn test_center_to_edge_alignment() {
        let (scene, _) = scene_with(&[(400.0, 100.0, 100.0, 100.0)]);
        // Moving center at 402 sits next to the target's left edge (400)
        let moving = Rect::new(372.0, 600.0, 432.0, 640.0);
        let result = GuideDetector::default().detect(moving, None, &scene);
        let x = result.x.unwrap();
        assert_eq!(x.kind, AlignmentKind::CenterToEdge);
        assert!((x.coordinate - 400.0).abs() < 1e-9);
    }

    #[test]
    fn test_priority_beats_distance() {
        // A: centers 4 apart. B: left edges 1 apart. Center match wins.
        let (scene, _) = scene_with(&[(196.0, 100.0, 100.0, 100.0), (201.0, 300.0, 300.0, 100.0)]);
        let moving = Rect::new(200.0, 600.0, 300.0, 650.0);
        let result = GuideDetector::default().detect(moving, None, &scene);
        let x = result.x.unwrap();
        assert_eq!(x.kind, AlignmentKind::CenterToCenter);
        assert!((x.coordinate - 246.0).abs() < 1e-9);
    }

    #[test]
    fn test_nearest_wins_within_class() {
        let (scene, _) = scene_with(&[(104.0, 100.0, 100.0, 100.0), (98.0, 300.0, 100.0, 100.0)]);
        let moving = Rect::new(100.0, 600.0, 200.0, 650.0);
        let result = GuideDetector::default().detect(moving, None, &scene);
        let x = result.x.unwrap();
        assert!((x.coordinate - 148.0).abs() < 1e-9);
    }

    #[test]
    fn test_axes_are_independent() {
        let (scene, _) = scene_with(&[(200.0, 300.0, 100.0, 100.0)]);
        let moving = Rect::new(600.0, 302.0, 700.0, 402.0);
        let result = GuideDetector::default().detect(moving, None, &scene);
        assert!(result.x.is_none());
        let y = result.y.unwrap();
        assert!((y.offset + 2.0).abs() < 1e-9);
        assert_eq!(result.guides.len(), 1);
        assert_eq!(result.guides[0].orientation, GuideOrientation::Horizontal);
    }

    #[test]
    fn test_canvas_center() {
        let (scene, _) = scene_with(&[]);
        // Canvas is 960 wide, center 480
        let moving = Rect::new(428.0, 600.0, 528.0, 650.0);
        let result = GuideDetector::default().detect(moving, None, &scene);
        let x = result.x.unwrap();
        assert!((x.coordinate - 480.0).abs() < 1e-9);
        assert!((x.offset - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_ignores_self_and_hidden() {
        let (mut scene, ids) =
            scene_with(&[(200.0, 100.0, 100.0, 100.0), (600.0, 100.0, 100.0, 100.0)]);
        scene.get_mut(ids[1]).unwrap().visible = false;
        let detector = GuideDetector::default();

        let result = detector.detect(Rect::new(201.0, 500.0, 301.0, 560.0), Some(ids[0]), &scene);
        assert!(result.x.is_none());

        let result = detector.detect(Rect::new(602.0, 500.0, 702.0, 560.0), None, &scene);
        assert!(result.x.is_none());
    }

    #[test]
    fn test_threshold_is_exclusive() {
        let (scene, _) = scene_with(&[(200.0, 100.0, 100.0, 100.0)]);
        let detector = GuideDetector::new(5.0);
        let result = detector.detect(Rect::new(205.0, 500.0, 305.0, 560.0), None, &scene);
        assert!(result.x.is_none());
        let result = detector.detect(Rect::new(204.5, 500.0, 304.5, 560.0), None, &scene);
        assert!(result.x.is_some());
    }

    #[test]
    fn test_device_units_follow_dpi() {
        let mut scene = Scene::new(CanvasFrame::new(21.0, 29.7, 300.0));
        scene.add(SceneObject::shape(Point::new(5.0, 5.0), Size::new(2.0, 2.0)));
        let left = cm_to_device(5.0, 300.0);
        let moving = Rect::new(left + 1.0, 4000.0, left + 101.0, 4050.0);
        let result = GuideDetector::default().detect(moving, None, &scene);
        assert!((result.x.unwrap().coordinate - left).abs() < 1e-9);
    }
}

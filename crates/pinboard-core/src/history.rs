//! Snapshot-based undo/redo over the whole scene.

use crate::assets::AssetResolver;
use crate::object::{ObjectId, SceneObject};
use crate::scene::{CanvasFrame, Scene};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Maximum number of snapshots to keep.
pub const MAX_UNDO_HISTORY: usize = 50;

/// History errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HistoryError {
    #[error("Malformed snapshot: {0}")]
    Malformed(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type for history operations.
pub type HistoryResult<T> = Result<T, HistoryError>;

/// Full value copy of the scene at one point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistorySnapshot {
    pub frame: CanvasFrame,
    pub objects: Vec<SceneObject>,
}

impl HistorySnapshot {
    /// Copy the current scene.
    pub fn capture(scene: &Scene) -> Self {
        Self {
            frame: scene.frame,
            objects: scene.objects().to_vec(),
        }
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> HistoryResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| HistoryError::Serialization(e.to_string()))
    }

    /// Parse and validate a snapshot.
    pub fn from_json(json: &str) -> HistoryResult<Self> {
        let snapshot: Self =
            serde_json::from_str(json).map_err(|e| HistoryError::Malformed(e.to_string()))?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Reject snapshots that would put the scene in an invalid state.
    pub fn validate(&self) -> HistoryResult<()> {
        let frame = &self.frame;
        if !(is_positive(frame.width_cm) && is_positive(frame.height_cm)) {
            return Err(HistoryError::Malformed("canvas size must be positive".into()));
        }
        if !is_positive(frame.dpi) {
            return Err(HistoryError::Malformed(format!("invalid DPI {}", frame.dpi)));
        }

        let mut seen = HashSet::with_capacity(self.objects.len());
        for object in &self.objects {
            let id = object.id();
            if !seen.insert(id) {
                return Err(malformed(id, "duplicate id"));
            }
            if ![object.x, object.y, object.rotation].iter().all(|v| v.is_finite()) {
                return Err(malformed(id, "non-finite position or rotation"));
            }
            if !(is_positive(object.width) && is_positive(object.height)) {
                return Err(malformed(id, "size must be positive"));
            }
            if !(0.0..=1.0).contains(&object.opacity) {
                return Err(malformed(id, "opacity outside [0, 1]"));
            }
            if !is_positive(object.original_aspect_ratio) {
                return Err(malformed(id, "aspect ratio must be positive"));
            }
        }
        Ok(())
    }
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

fn malformed(id: ObjectId, reason: &str) -> HistoryError {
    HistoryError::Malformed(format!("object {id}: {reason}"))
}

/// An object left out of a restore.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoreFailure {
    pub object: ObjectId,
    /// Asset reference that failed, empty when none was recorded.
    pub reference: String,
    pub reason: String,
}

/// Outcome of a restore.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestoreReport {
    pub restored: usize,
    pub failures: Vec<RestoreFailure>,
}

impl RestoreReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Linear undo history: snapshots plus a cursor.
///
/// `index` always points at the snapshot matching the live scene. Capturing
/// while not at the tail drops the redo branch.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryManager {
    snapshots: Vec<HistorySnapshot>,
    index: usize,
    capacity: usize,
}

impl Default for HistoryManager {
    fn default() -> Self {
        Self::with_capacity(MAX_UNDO_HISTORY)
    }
}

impl HistoryManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// History holding at most `capacity` snapshots (at least one).
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            snapshots: Vec::new(),
            index: 0,
            capacity: capacity.max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Cursor position, `None` when nothing was captured.
    pub fn index(&self) -> Option<usize> {
        (!self.snapshots.is_empty()).then_some(self.index)
    }

    /// Snapshot under the cursor.
    pub fn current(&self) -> Option<&HistorySnapshot> {
        self.index().and_then(|i| self.snapshots.get(i))
    }

    pub fn can_undo(&self) -> bool {
        !self.snapshots.is_empty() && self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        !self.snapshots.is_empty() && self.index + 1 < self.snapshots.len()
    }

    /// Record the current scene.
    pub fn capture(&mut self, scene: &Scene) {
        if !self.snapshots.is_empty() {
            self.snapshots.truncate(self.index + 1);
        }
        self.snapshots.push(HistorySnapshot::capture(scene));
        if self.snapshots.len() > self.capacity {
            self.snapshots.remove(0);
        }
        self.index = self.snapshots.len() - 1;
        log::debug!("History captured ({}/{})", self.index + 1, self.snapshots.len());
    }

    /// Step back one snapshot. `Ok(None)` when there is nothing to undo.
    pub fn undo<R: AssetResolver + ?Sized>(
        &mut self,
        scene: &mut Scene,
        resolver: &R,
    ) -> HistoryResult<Option<RestoreReport>> {
        if !self.can_undo() {
            return Ok(None);
        }
        self.step_to(self.index - 1, scene, resolver).map(Some)
    }

    /// Step forward one snapshot. `Ok(None)` when there is nothing to redo.
    pub fn redo<R: AssetResolver + ?Sized>(
        &mut self,
        scene: &mut Scene,
        resolver: &R,
    ) -> HistoryResult<Option<RestoreReport>> {
        if !self.can_redo() {
            return Ok(None);
        }
        self.step_to(self.index + 1, scene, resolver).map(Some)
    }

    fn step_to<R: AssetResolver + ?Sized>(
        &mut self,
        target: usize,
        scene: &mut Scene,
        resolver: &R,
    ) -> HistoryResult<RestoreReport> {
        let snapshot = &self.snapshots[target];
        let report = restore(scene, snapshot, resolver)?;
        self.index = target;
        Ok(report)
    }

    /// Parse an externally stored snapshot and restore it. History is untouched.
    pub fn restore_json<R: AssetResolver + ?Sized>(
        &self,
        scene: &mut Scene,
        json: &str,
        resolver: &R,
    ) -> HistoryResult<RestoreReport> {
        let snapshot = HistorySnapshot::from_json(json)?;
        restore(scene, &snapshot, resolver)
    }

    pub fn clear(&mut self) {
        self.snapshots.clear();
        self.index = 0;
    }
}

/// Replace the live scene with `snapshot`.
///
/// The snapshot is validated first; a malformed one leaves the scene untouched.
/// Objects whose asset cannot be resolved are skipped and reported. Rotations
/// are brought back into `[0, 360)`.
pub fn restore<R: AssetResolver + ?Sized>(
    scene: &mut Scene,
    snapshot: &HistorySnapshot,
    resolver: &R,
) -> HistoryResult<RestoreReport> {
    snapshot.validate()?;

    let mut report = RestoreReport::default();
    let mut objects = Vec::with_capacity(snapshot.objects.len());

    for object in &snapshot.objects {
        let checked = match object.asset.as_deref() {
            Some(reference) => resolver
                .resolve(reference)
                .map_err(|e| (reference.to_string(), e.to_string())),
            None if object.capabilities().requires_asset => {
                Err((String::new(), "no asset reference".to_string()))
            }
            None => Ok(()),
        };

        match checked {
            Ok(()) => {
                let mut object = object.clone();
                object.set_rotation(object.rotation);
                objects.push(object);
            }
            Err((reference, reason)) => {
                log::warn!("Skipping object {} on restore: {reason}", object.id());
                report.failures.push(RestoreFailure {
                    object: object.id(),
                    reference,
                    reason,
                });
            }
        }
    }

    report.restored = objects.len();
    scene.replace_all(snapshot.frame, objects);
    log::info!(
        "Restored {} objects ({} skipped)",
        report.restored,
        report.failures.len()
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::MemoryAssets;
    use kurbo::{Point, Size};

    fn scene() -> Scene {
        let mut scene = Scene::default();
        scene.add(SceneObject::shape(Point::new(1.0, 1.0), Size::new(2.0, 2.0)));
        scene
    }

    #[test]
    fn test_capture_is_idempotent() {
        let scene = scene();
        let mut history = HistoryManager::new();
        history.capture(&scene);
        history.capture(&scene);
        assert_eq!(history.len(), 2);
        assert_eq!(history.snapshots[0], history.snapshots[1]);
    }

    #[test]
    fn test_snapshot_is_a_value_copy() {
        let mut scene = scene();
        let mut history = HistoryManager::new();
        history.capture(&scene);
        let id = scene.objects()[0].id();
        scene.get_mut(id).unwrap().x = 9.0;
        assert_eq!(history.current().unwrap().objects[0].x, 1.0);
    }

    #[test]
    fn test_undo_redo_round_trip() {
        let assets = MemoryAssets::new();
        let mut scene = scene();
        let mut history = HistoryManager::new();
        history.capture(&scene);
        let before = scene.clone();

        let id = scene.objects()[0].id();
        scene.get_mut(id).unwrap().x = 5.0;
        history.capture(&scene);
        let after = scene.clone();

        assert!(history.undo(&mut scene, &assets).unwrap().is_some());
        assert_eq!(scene, before);
        assert!(history.redo(&mut scene, &assets).unwrap().is_some());
        assert_eq!(scene, after);
        assert!(history.redo(&mut scene, &assets).unwrap().is_none());
    }

    #[test]
    fn test_undo_at_start_is_noop() {
        let assets = MemoryAssets::new();
        let mut scene = scene();
        let mut history = HistoryManager::new();
        assert!(history.undo(&mut scene, &assets).unwrap().is_none());
        history.capture(&scene);
        assert!(!history.can_undo());
        assert!(history.undo(&mut scene, &assets).unwrap().is_none());
    }

    #[test]
    fn test_capture_prunes_redo_branch() {
        let assets = MemoryAssets::new();
        let mut scene = scene();
        let mut history = HistoryManager::new();
        history.capture(&scene);
        scene.clear();
        history.capture(&scene);
        history.undo(&mut scene, &assets).unwrap();
        assert!(history.can_redo());

        history.capture(&scene);
        assert!(!history.can_redo());
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn test_bounded_history() {
        let assets = MemoryAssets::new();
        let mut scene = Scene::default();
        let mut history = HistoryManager::new();
        for i in 0..60 {
            scene.clear();
            scene.add(SceneObject::shape(Point::new(i as f64, 0.0), Size::new(1.0, 1.0)));
            history.capture(&scene);
        }
        assert_eq!(history.len(), MAX_UNDO_HISTORY);
        while history.undo(&mut scene, &assets).unwrap().is_some() {}
        // Oldest reachable state is capture #10
        assert_eq!(scene.objects()[0].x, 10.0);
    }

    #[test]
    fn test_restore_skips_missing_assets() {
        let mut scene = Scene::default();
        scene.add(SceneObject::image("here.png", Point::ZERO, Size::new(1.0, 1.0)));
        scene.add(SceneObject::image("gone.png", Point::ZERO, Size::new(1.0, 1.0)));
        scene.add(SceneObject::shape(Point::ZERO, Size::new(1.0, 1.0)));
        let snapshot = HistorySnapshot::capture(&scene);

        let assets: MemoryAssets = ["here.png"].into_iter().collect();
        let mut target = Scene::default();
        let report = restore(&mut target, &snapshot, &assets).unwrap();
        assert_eq!(report.restored, 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].reference, "gone.png");
        assert_eq!(target.len(), 2);
    }

    #[test]
    fn test_malformed_snapshot_leaves_scene() {
        let mut scene = scene();
        let before = scene.clone();
        let mut snapshot = HistorySnapshot::capture(&scene);
        snapshot.objects[0].width = -1.0;
        let result = restore(&mut scene, &snapshot, &MemoryAssets::new());
        assert!(matches!(result, Err(HistoryError::Malformed(_))));
        assert_eq!(scene, before);

        let mut snapshot = HistorySnapshot::capture(&scene);
        snapshot.objects[0].opacity = 1.5;
        assert!(snapshot.validate().is_err());

        let mut snapshot = HistorySnapshot::capture(&scene);
        snapshot.frame.dpi = 0.0;
        assert!(snapshot.validate().is_err());
    }

    #[test]
    fn test_restore_normalizes_rotation() {
        let scene = scene();
        let mut snapshot = HistorySnapshot::capture(&scene);
        snapshot.objects[0].rotation = 725.0;
        let json = snapshot.to_json().unwrap();

        let mut target = Scene::default();
        HistoryManager::new()
            .restore_json(&mut target, &json, &MemoryAssets::new())
            .unwrap();
        assert!((target.objects()[0].rotation - 5.0).abs() < 1e-9);

        snapshot.objects[0].rotation = -90.0;
        restore(&mut target, &snapshot, &MemoryAssets::new()).unwrap();
        assert!((target.objects()[0].rotation - 270.0).abs() < 1e-9);
    }

    #[test]
    fn test_json_round_trip_and_parse_error() {
        let scene = scene();
        let snapshot = HistorySnapshot::capture(&scene);
        let json = snapshot.to_json().unwrap();
        assert!(json.contains("\"original_aspect_ratio\""));
        assert_eq!(HistorySnapshot::from_json(&json).unwrap(), snapshot);

        let history = HistoryManager::new();
        let mut target = scene.clone();
        let result = history.restore_json(&mut target, "{ not json", &MemoryAssets::new());
        assert!(matches!(result, Err(HistoryError::Malformed(_))));
        assert_eq!(target, scene);
    }
}

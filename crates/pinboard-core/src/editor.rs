//! Event-driven editor facade.
//!
//! The editor owns the scene, the active drag session, the history and the
//! selection. Pointer coordinates are scene-space device units; object
//! geometry passed to the property setters is in centimeters.

use crate::assets::{AssetError, AssetResolver, MemoryAssets};
use crate::config::{ConfigError, EditorConfig};
use crate::guides::{GuideDetector, GuideLine};
use crate::handles::{CursorIcon, HandleKind, HandleLayout, scene_to_local};
use crate::history::{HistoryError, HistoryManager, RestoreReport};
use crate::object::{ObjectId, ObjectKind, SceneObject};
use crate::scene::Scene;
use crate::scratch::{ScratchError, ScratchSpace};
use crate::session::{Modifiers, SessionContext, SessionKind, TransformSession};
use crate::snap::SnapSettings;
use crate::units::{cm_to_device, device_to_cm};
use kurbo::{Point, Size};
use std::path::Path;
use thiserror::Error;

/// Editor errors.
#[derive(Debug, Error)]
pub enum EditorError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    History(#[from] HistoryError),
    #[error(transparent)]
    Asset(#[from] AssetError),
    #[error(transparent)]
    Scratch(#[from] ScratchError),
    #[error("Object not found: {0}")]
    ObjectNotFound(ObjectId),
    #[error("Object is locked: {0}")]
    Locked(ObjectId),
    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: &'static str, value: f64 },
}

/// Result type for editor operations.
pub type EditorResult<T> = Result<T, EditorError>;

/// Mirror axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlipAxis {
    Horizontal,
    Vertical,
}

/// Writes a mirrored copy of an image asset. Pixel work lives outside the core.
pub trait ImageFlipper {
    fn flip(&mut self, source: &str, axis: FlipAxis, destination: &Path) -> std::io::Result<()>;
}

/// Interactive composition editor.
pub struct Editor {
    config: EditorConfig,
    scene: Scene,
    session: TransformSession,
    history: HistoryManager,
    resolver: Box<dyn AssetResolver>,
    snap: SnapSettings,
    guides: Vec<GuideLine>,
    selection: Vec<ObjectId>,
    clipboard: Vec<SceneObject>,
}

impl Default for Editor {
    fn default() -> Self {
        Self::from_valid_config(EditorConfig::default())
    }
}

impl std::fmt::Debug for Editor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Editor")
            .field("scene", &self.scene)
            .field("session", &self.session)
            .field("history_len", &self.history.len())
            .field("selection", &self.selection)
            .finish_non_exhaustive()
    }
}

impl Editor {
    /// Create an editor with an empty canvas. The empty state is the first
    /// history entry.
    pub fn new(config: EditorConfig) -> EditorResult<Self> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    fn from_valid_config(config: EditorConfig) -> Self {
        let scene = Scene::new(config.canvas_frame());
        let mut history = HistoryManager::with_capacity(config.history_capacity);
        history.capture(&scene);
        Self {
            snap: config.snap,
            config,
            scene,
            session: TransformSession::new(),
            history,
            resolver: Box::new(MemoryAssets::new()),
            guides: Vec::new(),
            selection: Vec::new(),
            clipboard: Vec::new(),
        }
    }

    /// Replace the asset resolver used by image creation, paste and restore.
    pub fn with_resolver(mut self, resolver: impl AssetResolver + 'static) -> Self {
        self.resolver = Box::new(resolver);
        self
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn object(&self, id: ObjectId) -> Option<&SceneObject> {
        self.scene.get(id)
    }

    pub fn history(&self) -> &HistoryManager {
        &self.history
    }

    pub fn session(&self) -> &TransformSession {
        &self.session
    }

    /// Guides produced by the last move update.
    pub fn guides(&self) -> &[GuideLine] {
        &self.guides
    }

    pub fn snap_settings(&self) -> SnapSettings {
        self.snap
    }

    fn commit(&mut self) {
        self.history.capture(&self.scene);
    }

    fn next_z_index(&self) -> i64 {
        self.scene.len() as i64
    }

    fn dpi(&self) -> f64 {
        self.scene.dpi()
    }

    // --- Objects ---

    /// Place an image. The asset must resolve.
    pub fn add_image(
        &mut self,
        asset: &str,
        position: Point,
        size: Size,
    ) -> EditorResult<ObjectId> {
        self.resolver.resolve(asset)?;
        let object = SceneObject::image(asset, position, size).with_z_index(self.next_z_index());
        Ok(self.insert(object))
    }

    pub fn add_shape(&mut self, position: Point, size: Size) -> ObjectId {
        let object = SceneObject::shape(position, size).with_z_index(self.next_z_index());
        self.insert(object)
    }

    pub fn add_text(&mut self, position: Point, size: Size) -> ObjectId {
        let object = SceneObject::text(position, size).with_z_index(self.next_z_index());
        self.insert(object)
    }

    fn insert(&mut self, object: SceneObject) -> ObjectId {
        let id = self.scene.add(object);
        log::debug!("Added object {id}");
        self.commit();
        id
    }

    // --- Selection ---

    pub fn selection(&self) -> &[ObjectId] {
        &self.selection
    }

    pub fn is_selected(&self, id: ObjectId) -> bool {
        self.selection.contains(&id)
    }

    /// Select only `id`.
    pub fn select(&mut self, id: ObjectId) -> bool {
        if !self.scene.contains(id) {
            return false;
        }
        self.selection.clear();
        self.selection.push(id);
        true
    }

    pub fn add_to_selection(&mut self, id: ObjectId) -> bool {
        if !self.scene.contains(id) {
            return false;
        }
        if !self.selection.contains(&id) {
            self.selection.push(id);
        }
        true
    }

    pub fn select_all(&mut self) {
        self.selection = self.scene.objects().iter().map(|o| o.id()).collect();
    }

    pub fn deselect_all(&mut self) {
        self.selection.clear();
    }

    fn prune_selection(&mut self) {
        let scene = &self.scene;
        self.selection.retain(|id| scene.contains(*id));
    }

    /// Remove selected objects. Locked ones stay (and stay selected).
    pub fn delete_selected(&mut self) -> usize {
        let mut removed = 0;
        for id in std::mem::take(&mut self.selection) {
            match self.scene.get(id).map(|o| o.locked) {
                Some(true) => self.selection.push(id),
                Some(false) => {
                    self.scene.remove(id);
                    removed += 1;
                }
                None => {}
            }
        }
        if removed > 0 {
            self.commit();
        }
        removed
    }

    /// Copy selected objects, shifted by the paste offset. The copies become the selection.
    pub fn duplicate_selected(&mut self) -> Vec<ObjectId> {
        let originals: Vec<SceneObject> = self
            .selection
            .iter()
            .filter_map(|id| self.scene.get(*id).cloned())
            .collect();
        let ids = self.place_copies(&originals);
        if !ids.is_empty() {
            self.selection = ids.clone();
            self.commit();
        }
        ids
    }

    /// Store value copies of the selection. Returns how many were copied.
    pub fn copy_selected(&mut self) -> usize {
        let copied: Vec<SceneObject> = self
            .selection
            .iter()
            .filter_map(|id| self.scene.get(*id).cloned())
            .collect();
        if !copied.is_empty() {
            self.clipboard = copied;
        }
        self.clipboard.len()
    }

    /// Paste the clipboard with the paste offset. Objects whose asset no
    /// longer resolves are skipped.
    pub fn paste(&mut self) -> Vec<ObjectId> {
        let resolver = &self.resolver;
        let pastable: Vec<SceneObject> = self
            .clipboard
            .iter()
            .filter(|o| match o.asset.as_deref() {
                Some(reference) => match resolver.resolve(reference) {
                    Ok(()) => true,
                    Err(e) => {
                        log::warn!("Skipping paste of {}: {e}", o.id());
                        false
                    }
                },
                None => true,
            })
            .cloned()
            .collect();
        let ids = self.place_copies(&pastable);
        if !ids.is_empty() {
            self.selection = ids.clone();
            self.commit();
        }
        ids
    }

    fn place_copies(&mut self, originals: &[SceneObject]) -> Vec<ObjectId> {
        let offset = self.config.paste_offset_cm;
        let mut ids = Vec::with_capacity(originals.len());
        for original in originals {
            let copy = original.duplicate(offset).with_z_index(self.next_z_index());
            ids.push(self.scene.add(copy));
        }
        ids
    }

    pub fn bring_selected_to_front(&mut self) -> usize {
        self.reorder_selected(Scene::bring_to_front)
    }

    pub fn send_selected_to_back(&mut self) -> usize {
        self.reorder_selected(Scene::send_to_back)
    }

    fn reorder_selected(&mut self, op: fn(&mut Scene, ObjectId) -> bool) -> usize {
        let changed = self
            .selection
            .iter()
            .filter(|id| op(&mut self.scene, **id))
            .count();
        if changed > 0 {
            self.commit();
        }
        changed
    }

    /// Flip the lock flag of every selected object.
    pub fn toggle_lock_selected(&mut self) -> usize {
        let mut changed = 0;
        for id in &self.selection {
            if let Some(object) = self.scene.get_mut(*id) {
                object.locked = !object.locked;
                changed += 1;
            }
        }
        if changed > 0 {
            if self
                .session
                .target()
                .is_some_and(|t| self.selection.contains(&t))
            {
                self.cancel_session();
            }
            self.commit();
        }
        changed
    }

    /// Mirror the selection. Images get a mirrored copy written into `scratch`
    /// and point at it; other kinds only toggle their flag. Failed flips are
    /// logged and skipped.
    pub fn flip_selected(
        &mut self,
        axis: FlipAxis,
        flipper: &mut dyn ImageFlipper,
        scratch: &mut ScratchSpace,
    ) -> EditorResult<usize> {
        let mut flipped = 0;
        for id in self.selection.clone() {
            let Some(object) = self.scene.get(id) else {
                continue;
            };
            let new_asset = match (object.kind, object.asset.clone()) {
                (ObjectKind::Image, Some(source)) => {
                    let destination = scratch.allocate("flipped", "png")?;
                    if let Err(e) = flipper.flip(&source, axis, &destination) {
                        log::warn!("Flip of {source} failed: {e}");
                        continue;
                    }
                    Some(destination.to_string_lossy().into_owned())
                }
                _ => None,
            };

            if let Some(object) = self.scene.get_mut(id) {
                match axis {
                    FlipAxis::Horizontal => object.flipped_horizontal = !object.flipped_horizontal,
                    FlipAxis::Vertical => object.flipped_vertical = !object.flipped_vertical,
                }
                if new_asset.is_some() {
                    object.asset = new_asset;
                }
                flipped += 1;
            }
        }
        if flipped > 0 {
            self.commit();
        }
        Ok(flipped)
    }

    // --- Property edits ---

    fn editable_mut(&mut self, id: ObjectId) -> EditorResult<&mut SceneObject> {
        let object = self.scene.get_mut(id).ok_or(EditorError::ObjectNotFound(id))?;
        if object.locked {
            return Err(EditorError::Locked(id));
        }
        Ok(object)
    }

    fn object_mut(&mut self, id: ObjectId) -> EditorResult<&mut SceneObject> {
        self.scene.get_mut(id).ok_or(EditorError::ObjectNotFound(id))
    }

    /// Move the top-left corner (centimeters).
    pub fn set_position(&mut self, id: ObjectId, position: Point) -> EditorResult<()> {
        for (field, value) in [("x", position.x), ("y", position.y)] {
            if !value.is_finite() {
                return Err(EditorError::InvalidValue { field, value });
            }
        }
        let object = self.editable_mut(id)?;
        object.x = position.x;
        object.y = position.y;
        self.commit();
        Ok(())
    }

    /// Resize (centimeters). With `keep_aspect` the height follows the width
    /// through the original aspect ratio.
    pub fn set_size(&mut self, id: ObjectId, size: Size, keep_aspect: bool) -> EditorResult<()> {
        for (field, value) in [("width", size.width), ("height", size.height)] {
            if !(value.is_finite() && value > 0.0) {
                return Err(EditorError::InvalidValue { field, value });
            }
        }
        let min = device_to_cm(self.config.min_object_size, self.dpi());
        let object = self.editable_mut(id)?;
        let ratio = object.original_aspect_ratio();
        let mut width = size.width.max(min);
        let mut height = if keep_aspect { width * ratio } else { size.height.max(min) };
        if height < min {
            height = min;
            if keep_aspect {
                width = height / ratio;
            }
        }
        object.width = width;
        object.height = height;
        self.commit();
        Ok(())
    }

    /// Absolute rotation in degrees.
    pub fn set_rotation(&mut self, id: ObjectId, degrees: f64) -> EditorResult<()> {
        if !degrees.is_finite() {
            return Err(EditorError::InvalidValue {
                field: "rotation",
                value: degrees,
            });
        }
        self.editable_mut(id)?.set_rotation(degrees);
        self.commit();
        Ok(())
    }

    /// Rotate by `delta` degrees relative to the current angle.
    pub fn rotate_by(&mut self, id: ObjectId, delta: f64) -> EditorResult<()> {
        let current = self.scene.get(id).ok_or(EditorError::ObjectNotFound(id))?.rotation;
        self.set_rotation(id, current + delta)
    }

    /// Set opacity, clamped into `[0, 1]`.
    pub fn set_opacity(&mut self, id: ObjectId, opacity: f64) -> EditorResult<()> {
        self.object_mut(id)?.set_opacity(opacity);
        self.commit();
        Ok(())
    }

    pub fn set_visible(&mut self, id: ObjectId, visible: bool) -> EditorResult<()> {
        self.object_mut(id)?.visible = visible;
        self.commit();
        Ok(())
    }

    // --- Canvas and toggles ---

    /// Resize the canvas. Objects keep their centimeter geometry.
    pub fn set_canvas_size(&mut self, width_cm: f64, height_cm: f64) -> EditorResult<()> {
        for (field, value) in [("canvas_width_cm", width_cm), ("canvas_height_cm", height_cm)] {
            if !(value.is_finite() && value > 0.0) {
                return Err(EditorError::InvalidValue { field, value });
            }
        }
        self.scene.frame.width_cm = width_cm;
        self.scene.frame.height_cm = height_cm;
        self.commit();
        Ok(())
    }

    pub fn set_dpi(&mut self, dpi: f64) -> EditorResult<()> {
        if !(dpi.is_finite() && dpi > 0.0) {
            return Err(EditorError::InvalidValue { field: "dpi", value: dpi });
        }
        self.cancel_session();
        self.scene.frame.dpi = dpi;
        self.commit();
        Ok(())
    }

    pub fn set_grid_snap(&mut self, enabled: bool) {
        self.snap.grid = enabled;
    }

    /// Toggle smart guides. Turning them off clears any visible guide.
    pub fn set_guides(&mut self, enabled: bool) {
        self.snap.guides = enabled;
        if !enabled {
            self.guides.clear();
        }
    }

    // --- Pointer events ---

    /// First handle under `point` among selected objects, topmost first.
    fn handle_at(&self, point: Point) -> Option<(ObjectId, HandleKind)> {
        let dpi = self.dpi();
        self.scene
            .ordered()
            .into_iter()
            .rev()
            .filter(|o| o.visible && self.selection.contains(&o.id()))
            .find_map(|o| {
                let transform = o.device_transform(dpi);
                let layout = HandleLayout::new(
                    transform.size,
                    self.config.handle_radius,
                    self.config.rotation_handle_distance,
                );
                layout
                    .hit_test(scene_to_local(point, &transform))
                    .map(|kind| (o.id(), kind))
            })
    }

    /// Cursor for a hover position.
    pub fn cursor_at(&self, point: Point) -> CursorIcon {
        if let Some((id, kind)) = self.handle_at(point) {
            let locked = self.scene.get(id).is_some_and(|o| o.locked);
            return if locked { CursorIcon::Default } else { kind.cursor() };
        }
        match self.scene.object_at(point).and_then(|id| self.scene.get(id)) {
            Some(object) if !object.locked => CursorIcon::Move,
            _ => CursorIcon::Default,
        }
    }

    /// Press at `point`. Handles of selected objects win over bodies; a body
    /// hit selects the object. Returns the kind of session opened, if any.
    pub fn pointer_down(&mut self, point: Point) -> Option<SessionKind> {
        if self.session.is_active() {
            self.cancel_session();
        }

        let (target, handle) = match self.handle_at(point) {
            Some((id, kind)) => (id, Some(kind)),
            None => match self.scene.object_at(point) {
                Some(id) => (id, None),
                None => {
                    self.deselect_all();
                    return None;
                }
            },
        };
        // A session drives one object; the selection follows it.
        self.select(target);

        if self.session.start(&self.scene, target, handle, point) {
            self.session.kind()
        } else {
            None
        }
    }

    /// Drag to `point`. Returns true when the target was updated.
    pub fn pointer_move(&mut self, point: Point, modifiers: Modifiers) -> bool {
        let ctx = SessionContext {
            scene: &self.scene,
            snap: self.snap,
            grid_size: cm_to_device(self.config.grid_spacing_cm, self.scene.dpi()),
            detector: GuideDetector::new(self.config.guide_threshold),
            min_size: self.config.min_object_size,
        };
        let Some(update) = self.session.update(point, modifiers, &ctx) else {
            self.guides.clear();
            return false;
        };

        let dpi = self.dpi();
        if let Some(object) = self.scene.get_mut(update.intent.target) {
            object.apply_device_transform(&update.intent.transform, dpi);
        }
        self.guides = update.guides;
        true
    }

    /// Release. Commits the final transform and records history when the
    /// scene changed. Returns true when a history entry was added.
    pub fn pointer_up(&mut self) -> bool {
        self.guides.clear();
        let Some(intent) = self.session.end(&self.scene) else {
            return false;
        };

        let dpi = self.dpi();
        if let Some(object) = self.scene.get_mut(intent.target) {
            if object.device_transform(dpi) != intent.transform {
                object.apply_device_transform(&intent.transform, dpi);
            }
        }

        let scene = &self.scene;
        let unchanged = self
            .history
            .current()
            .is_some_and(|s| s.objects.as_slice() == scene.objects() && s.frame == scene.frame);
        if unchanged {
            return false;
        }
        self.commit();
        true
    }

    /// Drop the active drag. Whatever was last applied stays.
    pub fn cancel_session(&mut self) {
        if self.session.cancel() {
            log::debug!("Session cancelled");
        }
        self.guides.clear();
    }

    // --- History ---

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn undo(&mut self) -> EditorResult<Option<RestoreReport>> {
        self.cancel_session();
        let report = self.history.undo(&mut self.scene, self.resolver.as_ref())?;
        self.prune_selection();
        Ok(report)
    }

    pub fn redo(&mut self) -> EditorResult<Option<RestoreReport>> {
        self.cancel_session();
        let report = self.history.redo(&mut self.scene, self.resolver.as_ref())?;
        self.prune_selection();
        Ok(report)
    }

    /// Load a persisted snapshot as a new history entry.
    pub fn load_snapshot_json(&mut self, json: &str) -> EditorResult<RestoreReport> {
        self.cancel_session();
        let report = self
            .history
            .restore_json(&mut self.scene, json, self.resolver.as_ref())?;
        self.prune_selection();
        self.commit();
        Ok(report)
    }

    /// Current scene as snapshot JSON.
    pub fn snapshot_json(&self) -> EditorResult<String> {
        Ok(crate::history::HistorySnapshot::capture(&self.scene).to_json()?)
    }
}

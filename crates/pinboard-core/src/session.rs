//! Drag sessions: move, resize and rotate of a single object.
//!
//! A session never touches the scene. Each update returns a [`TransformIntent`]
//! in device units and the editor applies it.

use crate::geometry::{angle_between, rotate_point, rotated_bounds, snap_angle};
use crate::guides::{GuideDetector, GuideLine};
use crate::handles::HandleKind;
use crate::object::{ObjectId, Transform};
use crate::scene::Scene;
use crate::snap::{SnapSettings, snap_to_grid};
use kurbo::{Point, Size, Vec2};

/// Smallest width or height a resize may produce, in device units.
pub const MIN_OBJECT_SIZE: f64 = 20.0;
/// Constrained rotation snaps whenever the angle is this close to a 15° step.
pub const ANGLE_SNAP_THRESHOLD: f64 = 7.5;

/// Keyboard modifiers sampled on every pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    /// Keep the aspect ratio on corner resize, snap the angle on rotate.
    pub constrain: bool,
    /// Resize symmetrically about the center.
    pub anchor_at_center: bool,
}

/// What the drag does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionKind {
    Move,
    Resize(HandleKind),
    Rotate,
}

impl SessionKind {
    /// Map a hit-test result to a session kind. No handle means move.
    pub fn from_handle(handle: Option<HandleKind>) -> Self {
        match handle {
            None => SessionKind::Move,
            Some(HandleKind::Rotate) => SessionKind::Rotate,
            Some(kind) => SessionKind::Resize(kind),
        }
    }
}

/// New device-unit transform for the target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformIntent {
    pub target: ObjectId,
    pub transform: Transform,
}

/// Result of one pointer move.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionUpdate {
    pub intent: TransformIntent,
    /// Alignment guides to draw. Always empty for resize and rotate.
    pub guides: Vec<GuideLine>,
}

/// Read-only inputs a session needs on update.
#[derive(Debug, Clone, Copy)]
pub struct SessionContext<'a> {
    pub scene: &'a Scene,
    pub snap: SnapSettings,
    /// Grid spacing in device units.
    pub grid_size: f64,
    pub detector: GuideDetector,
    pub min_size: f64,
}

impl<'a> SessionContext<'a> {
    /// Context with default detector and minimum size.
    pub fn new(scene: &'a Scene, snap: SnapSettings, grid_size: f64) -> Self {
        Self {
            scene,
            snap,
            grid_size,
            detector: GuideDetector::default(),
            min_size: MIN_OBJECT_SIZE,
        }
    }
}

/// State captured on pointer-down.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveSession {
    pub target: ObjectId,
    pub kind: SessionKind,
    /// Pointer position at drag start (device units).
    pub anchor: Point,
    /// Object transform at drag start (device units).
    pub start: Transform,
    /// Height / width used for proportional resize.
    pub aspect_ratio: f64,
    /// Corners keep the ratio even without the constrain modifier.
    pub locks_aspect_by_default: bool,
    /// Edge handles may stretch one side alone.
    pub free_rescale: bool,
    /// Most recent intent produced by `update`.
    pub last: Transform,
}

/// `Idle -> Active(kind) -> Idle` state machine for one drag.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransformSession {
    active: Option<ActiveSession>,
}

impl TransformSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn active(&self) -> Option<&ActiveSession> {
        self.active.as_ref()
    }

    pub fn target(&self) -> Option<ObjectId> {
        self.active.as_ref().map(|s| s.target)
    }

    pub fn kind(&self) -> Option<SessionKind> {
        self.active.as_ref().map(|s| s.kind)
    }

    /// Begin a drag on `target`. Returns false (and stays idle) when the
    /// object is missing or locked.
    pub fn start(
        &mut self,
        scene: &Scene,
        target: ObjectId,
        handle: Option<HandleKind>,
        pointer: Point,
    ) -> bool {
        let Some(object) = scene.get(target) else {
            log::warn!("Refusing session on missing object {target}");
            return false;
        };
        if !object.is_editable() {
            log::debug!("Refusing session on locked object {target}");
            return false;
        }

        let start = object.device_transform(scene.dpi());
        let kind = SessionKind::from_handle(handle);
        let capabilities = object.capabilities();
        log::debug!("Session {kind:?} started on {target}");

        self.active = Some(ActiveSession {
            target,
            kind,
            anchor: pointer,
            start,
            aspect_ratio: object.original_aspect_ratio(),
            locks_aspect_by_default: capabilities.locks_aspect_by_default,
            free_rescale: capabilities.supports_free_rescale,
            last: start,
        });
        true
    }

    /// Feed a pointer move. `None` when idle or when the target is gone or locked.
    pub fn update(
        &mut self,
        pointer: Point,
        modifiers: Modifiers,
        ctx: &SessionContext<'_>,
    ) -> Option<SessionUpdate> {
        let session = self.active.as_mut()?;
        if !target_is_editable(ctx.scene, session.target) {
            log::warn!("Ignoring update: target {} is locked or removed", session.target);
            return None;
        }

        let delta = pointer - session.anchor;
        let (transform, guides) = match session.kind {
            SessionKind::Move => apply_move(session, delta, ctx),
            SessionKind::Resize(handle) => {
                let transform = apply_resize(
                    &session.start,
                    handle,
                    delta,
                    ResizeOptions {
                        lock_aspect: modifiers.constrain || session.locks_aspect_by_default,
                        free_rescale: session.free_rescale,
                        anchor_at_center: modifiers.anchor_at_center,
                        aspect_ratio: session.aspect_ratio,
                        min_size: ctx.min_size,
                    },
                );
                (transform, Vec::new())
            }
            SessionKind::Rotate => (
                apply_rotation(&session.start, pointer, modifiers.constrain),
                Vec::new(),
            ),
        };

        session.last = transform;
        Some(SessionUpdate {
            intent: TransformIntent {
                target: session.target,
                transform,
            },
            guides,
        })
    }

    /// Close the session and return the last intent so the caller can commit
    /// it. `None` when idle or when the target is gone or locked.
    pub fn end(&mut self, scene: &Scene) -> Option<TransformIntent> {
        let session = self.active.take()?;
        log::debug!("Session {:?} ended on {}", session.kind, session.target);
        if !target_is_editable(scene, session.target) {
            log::warn!("Dropping session: target {} is locked or removed", session.target);
            return None;
        }
        Some(TransformIntent {
            target: session.target,
            transform: session.last,
        })
    }

    /// Discard the session without producing an intent. Whatever the last
    /// update applied stays applied.
    pub fn cancel(&mut self) -> bool {
        self.active.take().is_some()
    }
}

fn target_is_editable(scene: &Scene, target: ObjectId) -> bool {
    scene.get(target).is_some_and(|o| o.is_editable())
}

fn apply_move(
    session: &ActiveSession,
    delta: Vec2,
    ctx: &SessionContext<'_>,
) -> (Transform, Vec<GuideLine>) {
    let start = &session.start;
    let mut position = start.position + delta;
    let mut guides = Vec::new();

    if ctx.snap.grid {
        position = snap_to_grid(position, ctx.grid_size);
    } else if ctx.snap.uses_guides() {
        let bounds = rotated_bounds(position, start.size.width, start.size.height, start.rotation);
        let result = ctx.detector.detect(bounds, Some(session.target), ctx.scene);
        if result.is_snapped() {
            log::debug!("Guide snap {:?} on {}", result.offset(), session.target);
        }
        position += result.offset();
        guides = result.guides;
    }

    (Transform::new(position, start.size, start.rotation), guides)
}

/// Knobs for [`apply_resize`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeOptions {
    /// Corner handles keep `aspect_ratio`. Ignored for edge handles.
    pub lock_aspect: bool,
    /// When false, edge handles scale both sides and keep `aspect_ratio`.
    pub free_rescale: bool,
    pub anchor_at_center: bool,
    /// Height / width.
    pub aspect_ratio: f64,
    pub min_size: f64,
}

/// Resize `start` by dragging `handle` by `delta` (scene space).
///
/// The delta is rotated into the object's local frame so rotated objects
/// resize along their own axes. The opposite corner or edge stays fixed in
/// scene space, or the center when `anchor_at_center` is set.
pub fn apply_resize(
    start: &Transform,
    handle: HandleKind,
    delta: Vec2,
    options: ResizeOptions,
) -> Transform {
    let (sx, sy) = handle.resize_signs();
    let lock_aspect = if handle.is_corner() {
        options.lock_aspect
    } else {
        !options.free_rescale
    };
    let local = rotate_point(delta.to_point(), Point::ZERO, -start.rotation);
    let spread = if options.anchor_at_center { 2.0 } else { 1.0 };

    let old = start.size;
    let mut width = old.width + sx * local.x * spread;
    let mut height = old.height + sy * local.y * spread;

    let ratio = if options.aspect_ratio.is_finite() && options.aspect_ratio > 0.0 {
        options.aspect_ratio
    } else {
        old.height / old.width
    };

    if lock_aspect {
        let dw = width - old.width;
        let dh = height - old.height;
        if dw.abs() >= dh.abs() {
            height = width * ratio;
        } else {
            width = height / ratio;
        }
    }

    if !width.is_finite() || !height.is_finite() {
        width = old.width;
        height = old.height;
    }

    let min_size = options.min_size.max(0.0);
    if lock_aspect {
        let scale = 1.0_f64.max(min_size / width).max(min_size / height);
        // A negative width or height gives a negative scale; fall back to the floor.
        if scale.is_finite() && width > 0.0 && height > 0.0 {
            width *= scale;
            height *= scale;
        } else {
            let side = min_size.max(f64::EPSILON);
            width = side.max(side / ratio);
            height = width * ratio;
        }
    } else {
        width = width.max(min_size);
        height = height.max(min_size);
    }

    let shift = if options.anchor_at_center {
        Vec2::ZERO
    } else {
        Vec2::new(sx * (width - old.width) / 2.0, sy * (height - old.height) / 2.0)
    };
    let center =
        start.center() + rotate_point(shift.to_point(), Point::ZERO, start.rotation).to_vec2();
    let size = Size::new(width, height);

    Transform::new(
        Point::new(center.x - width / 2.0, center.y - height / 2.0),
        size,
        start.rotation,
    )
}

/// Absolute rotation so the rotation handle follows the pointer. With
/// `constrain` the angle lands on a multiple of 15°.
pub fn apply_rotation(start: &Transform, pointer: Point, constrain: bool) -> Transform {
    let mut angle = angle_between(start.center(), pointer);
    if constrain {
        angle = snap_angle(angle, ANGLE_SNAP_THRESHOLD);
    }
    Transform::new(start.position, start.size, angle)
}

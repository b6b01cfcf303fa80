//! Placeable scene objects.

use crate::geometry::{normalize_degrees, rotated_bounds};
use crate::units::{cm_to_device, device_to_cm};
use kurbo::{Point, Rect, Size};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for scene objects.
pub type ObjectId = Uuid;

/// What an object shows. Transform behavior differs only through [`Capabilities`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    Image,
    Shape,
    Text,
}

/// Per-kind behavior table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// Corner handles keep the original aspect ratio without the constrain modifier.
    pub locks_aspect_by_default: bool,
    /// Rendered content may be stretched non-uniformly by edge handles.
    pub supports_free_rescale: bool,
    /// The object is meaningless without an external asset (restore skips it if missing).
    pub requires_asset: bool,
}

impl ObjectKind {
    /// Capability table for this kind.
    pub fn capabilities(self) -> Capabilities {
        match self {
            ObjectKind::Image => Capabilities {
                locks_aspect_by_default: true,
                supports_free_rescale: true,
                requires_asset: true,
            },
            ObjectKind::Shape => Capabilities {
                locks_aspect_by_default: false,
                supports_free_rescale: true,
                requires_asset: false,
            },
            ObjectKind::Text => Capabilities {
                locks_aspect_by_default: true,
                supports_free_rescale: false,
                requires_asset: false,
            },
        }
    }
}

/// Position, size and rotation of an object in one unit system.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// Top-left of the un-rotated rectangle.
    pub position: Point,
    pub size: Size,
    /// Degrees in `[0, 360)`, about the rectangle center.
    pub rotation: f64,
}

impl Transform {
    pub fn new(position: Point, size: Size, rotation: f64) -> Self {
        Self {
            position,
            size,
            rotation: normalize_degrees(rotation),
        }
    }

    /// Center of the rectangle (rotation does not move it).
    pub fn center(&self) -> Point {
        Point::new(
            self.position.x + self.size.width / 2.0,
            self.position.y + self.size.height / 2.0,
        )
    }

    /// Un-rotated rectangle.
    pub fn rect(&self) -> Rect {
        Rect::from_origin_size(self.position, self.size)
    }

    /// Axis-aligned bounds after rotation.
    pub fn bounds(&self) -> Rect {
        rotated_bounds(self.position, self.size.width, self.size.height, self.rotation)
    }
}

/// One placed element of the composition. Geometry is in centimeters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneObject {
    pub(crate) id: ObjectId,
    pub kind: ObjectKind,
    /// Opaque reference to an external asset (an image path, for instance).
    pub asset: Option<String>,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub rotation: f64,
    pub z_index: i64,
    pub opacity: f64,
    pub locked: bool,
    pub visible: bool,
    #[serde(default)]
    pub flipped_horizontal: bool,
    #[serde(default)]
    pub flipped_vertical: bool,
    pub(crate) original_aspect_ratio: f64,
}

impl SceneObject {
    /// Create an object. The aspect ratio (height / width) is fixed from the initial size.
    pub fn new(kind: ObjectKind, position: Point, size: Size) -> Self {
        let width = sanitize_length(size.width);
        let height = sanitize_length(size.height);
        Self {
            id: Uuid::new_v4(),
            kind,
            asset: None,
            x: position.x,
            y: position.y,
            width,
            height,
            rotation: 0.0,
            z_index: 0,
            opacity: 1.0,
            locked: false,
            visible: true,
            flipped_horizontal: false,
            flipped_vertical: false,
            original_aspect_ratio: height / width,
        }
    }

    /// Create an image object referencing `asset`.
    pub fn image(asset: impl Into<String>, position: Point, size: Size) -> Self {
        let mut object = Self::new(ObjectKind::Image, position, size);
        object.asset = Some(asset.into());
        object
    }

    pub fn shape(position: Point, size: Size) -> Self {
        Self::new(ObjectKind::Shape, position, size)
    }

    pub fn text(position: Point, size: Size) -> Self {
        Self::new(ObjectKind::Text, position, size)
    }

    pub fn with_z_index(mut self, z_index: i64) -> Self {
        self.z_index = z_index;
        self
    }

    pub fn with_rotation(mut self, rotation: f64) -> Self {
        self.rotation = normalize_degrees(rotation);
        self
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Height / width at creation.
    pub fn original_aspect_ratio(&self) -> f64 {
        self.original_aspect_ratio
    }

    pub fn capabilities(&self) -> Capabilities {
        self.kind.capabilities()
    }

    /// Whether pointer sessions may move or resize the object.
    pub fn is_editable(&self) -> bool {
        !self.locked
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn set_opacity(&mut self, opacity: f64) {
        self.opacity = if opacity.is_finite() { opacity.clamp(0.0, 1.0) } else { 1.0 };
    }

    pub fn set_rotation(&mut self, rotation: f64) {
        self.rotation = normalize_degrees(rotation);
    }

    /// Transform in centimeters.
    pub fn transform(&self) -> Transform {
        Transform::new(self.position(), self.size(), self.rotation)
    }

    /// Transform converted to device units.
    pub fn device_transform(&self, dpi: f64) -> Transform {
        Transform::new(
            Point::new(cm_to_device(self.x, dpi), cm_to_device(self.y, dpi)),
            Size::new(cm_to_device(self.width, dpi), cm_to_device(self.height, dpi)),
            self.rotation,
        )
    }

    /// Axis-aligned device-space bounds including rotation.
    pub fn device_bounds(&self, dpi: f64) -> Rect {
        self.device_transform(dpi).bounds()
    }

    /// Apply a device-unit transform, converting back to centimeters.
    pub fn apply_device_transform(&mut self, transform: &Transform, dpi: f64) {
        self.x = device_to_cm(transform.position.x, dpi);
        self.y = device_to_cm(transform.position.y, dpi);
        self.width = sanitize_length(device_to_cm(transform.size.width, dpi));
        self.height = sanitize_length(device_to_cm(transform.size.height, dpi));
        self.rotation = normalize_degrees(transform.rotation);
    }

    /// Copy of this object under a fresh id, shifted by `offset` centimeters.
    pub fn duplicate(&self, offset: f64) -> Self {
        let mut copy = self.clone();
        copy.id = Uuid::new_v4();
        copy.x += offset;
        copy.y += offset;
        copy.locked = false;
        copy
    }
}

/// Replace non-finite or non-positive lengths with a tiny positive value.
fn sanitize_length(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 { value } else { f64::EPSILON }
}

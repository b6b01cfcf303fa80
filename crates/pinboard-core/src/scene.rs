//! The composition: a fixed-size canvas frame and the objects placed on it.

use crate::geometry::rotate_point;
use crate::object::{ObjectId, SceneObject};
use crate::units::{DEFAULT_DPI, cm_to_device};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Physical canvas dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasFrame {
    pub width_cm: f64,
    pub height_cm: f64,
    pub dpi: f64,
}

impl Default for CanvasFrame {
    fn default() -> Self {
        // A4 portrait
        Self {
            width_cm: 21.0,
            height_cm: 29.7,
            dpi: DEFAULT_DPI,
        }
    }
}

impl CanvasFrame {
    pub fn new(width_cm: f64, height_cm: f64, dpi: f64) -> Self {
        Self {
            width_cm,
            height_cm,
            dpi,
        }
    }

    /// Canvas rectangle in device units, origin at (0, 0).
    pub fn device_rect(&self) -> Rect {
        Rect::new(
            0.0,
            0.0,
            cm_to_device(self.width_cm, self.dpi),
            cm_to_device(self.height_cm, self.dpi),
        )
    }
}

/// Live scene state. Only the editor mutates it; sessions and the guide
/// detector borrow it read-only.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Scene {
    pub frame: CanvasFrame,
    objects: Vec<SceneObject>,
}

impl Scene {
    pub fn new(frame: CanvasFrame) -> Self {
        Self {
            frame,
            objects: Vec::new(),
        }
    }

    pub fn dpi(&self) -> f64 {
        self.frame.dpi
    }

    /// Add an object and return its id.
    pub fn add(&mut self, object: SceneObject) -> ObjectId {
        let id = object.id();
        self.objects.push(object);
        id
    }

    pub fn remove(&mut self, id: ObjectId) -> Option<SceneObject> {
        let index = self.objects.iter().position(|o| o.id() == id)?;
        Some(self.objects.remove(index))
    }

    pub fn get(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.iter().find(|o| o.id() == id)
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut SceneObject> {
        self.objects.iter_mut().find(|o| o.id() == id)
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.get(id).is_some()
    }

    /// Objects in insertion order.
    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    /// Objects back to front. Equal z-indices keep insertion order.
    pub fn ordered(&self) -> Vec<&SceneObject> {
        let mut ordered: Vec<&SceneObject> = self.objects.iter().collect();
        ordered.sort_by_key(|o| o.z_index);
        ordered
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn max_z(&self) -> Option<i64> {
        self.objects.iter().map(|o| o.z_index).max()
    }

    pub fn min_z(&self) -> Option<i64> {
        self.objects.iter().map(|o| o.z_index).min()
    }

    /// Put the object above every other one. Returns false if it does not exist.
    pub fn bring_to_front(&mut self, id: ObjectId) -> bool {
        let top = self.max_z().unwrap_or(0);
        match self.get_mut(id) {
            Some(object) => {
                object.z_index = top + 1;
                true
            }
            None => false,
        }
    }

    /// Put the object below every other one. Returns false if it does not exist.
    pub fn send_to_back(&mut self, id: ObjectId) -> bool {
        let bottom = self.min_z().unwrap_or(0);
        match self.get_mut(id) {
            Some(object) => {
                object.z_index = bottom - 1;
                true
            }
            None => false,
        }
    }

    /// Find the topmost visible object whose rotated rectangle contains a
    /// device-space point.
    pub fn object_at(&self, point: Point) -> Option<ObjectId> {
        let dpi = self.dpi();
        self.ordered()
            .into_iter()
            .rev()
            .filter(|o| o.visible)
            .find(|o| {
                let transform = o.device_transform(dpi);
                let local = rotate_point(point, transform.center(), -transform.rotation);
                transform.rect().contains(local)
            })
            .map(|o| o.id())
    }

    /// Replace every object at once.
    pub(crate) fn replace_all(&mut self, frame: CanvasFrame, objects: Vec<SceneObject>) {
        self.frame = frame;
        self.objects = objects;
    }

    pub fn clear(&mut self) {
        self.objects.clear();
    }
}

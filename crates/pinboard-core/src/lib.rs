//! Pinboard Core Library
//!
//! Platform-agnostic core of the Pinboard composition editor: objects on a
//! fixed-size canvas measured in centimeters, interactive move/resize/rotate,
//! smart alignment guides and snapshot undo/redo.

pub mod assets;
pub mod config;
pub mod editor;
pub mod geometry;
pub mod guides;
pub mod handles;
pub mod history;
pub mod object;
pub mod scene;
pub mod scratch;
pub mod session;
pub mod snap;
pub mod units;

pub use assets::{AssetError, AssetResolver, AssetResult, FileAssets, MemoryAssets};
pub use config::{ConfigError, EditorConfig};
pub use editor::{Editor, EditorError, EditorResult, FlipAxis, ImageFlipper};
pub use guides::{
    AlignmentKind, GUIDE_SNAP_THRESHOLD, GuideDetector, GuideLine, GuideOrientation, GuideResult,
};
pub use handles::{Corner, CursorIcon, Edge, Handle, HandleKind, HandleLayout};
pub use history::{
    HistoryError, HistoryManager, HistoryResult, HistorySnapshot, RestoreFailure, RestoreReport,
};
pub use object::{Capabilities, ObjectId, ObjectKind, SceneObject, Transform};
pub use scene::{CanvasFrame, Scene};
pub use scratch::{ScratchError, ScratchSpace};
pub use session::{
    MIN_OBJECT_SIZE, Modifiers, SessionKind, SessionUpdate, TransformIntent, TransformSession,
};
pub use snap::{SnapSettings, snap_to_grid};
pub use units::{cm_to_device, device_to_cm};

//! Editor configuration.

use crate::guides::GUIDE_SNAP_THRESHOLD;
use crate::handles::{HANDLE_RADIUS, ROTATION_HANDLE_DISTANCE};
use crate::history::MAX_UNDO_HISTORY;
use crate::scene::CanvasFrame;
use crate::session::MIN_OBJECT_SIZE;
use crate::snap::{GRID_SPACING_CM, SnapSettings};
use crate::units::DEFAULT_DPI;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Tunables for an [`Editor`](crate::Editor). Missing JSON fields take defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub canvas_width_cm: f64,
    pub canvas_height_cm: f64,
    pub dpi: f64,
    pub grid_spacing_cm: f64,
    /// Device units.
    pub guide_threshold: f64,
    pub history_capacity: usize,
    /// Device units.
    pub handle_radius: f64,
    /// Device units.
    pub rotation_handle_distance: f64,
    /// Device units.
    pub min_object_size: f64,
    /// Shift applied to duplicated and pasted objects, in centimeters.
    pub paste_offset_cm: f64,
    pub snap: SnapSettings,
}

impl Default for EditorConfig {
    fn default() -> Self {
        let frame = CanvasFrame::default();
        Self {
            canvas_width_cm: frame.width_cm,
            canvas_height_cm: frame.height_cm,
            dpi: DEFAULT_DPI,
            grid_spacing_cm: GRID_SPACING_CM,
            guide_threshold: GUIDE_SNAP_THRESHOLD,
            history_capacity: MAX_UNDO_HISTORY,
            handle_radius: HANDLE_RADIUS,
            rotation_handle_distance: ROTATION_HANDLE_DISTANCE,
            min_object_size: MIN_OBJECT_SIZE,
            paste_offset_cm: 1.0,
            snap: SnapSettings::default(),
        }
    }
}

impl EditorConfig {
    /// Parse and validate JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        log::debug!("Loading editor config from {}", path.display());
        Self::from_json(&fs::read_to_string(path)?)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("canvas_width_cm", self.canvas_width_cm),
            ("canvas_height_cm", self.canvas_height_cm),
            ("dpi", self.dpi),
            ("grid_spacing_cm", self.grid_spacing_cm),
            ("handle_radius", self.handle_radius),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("{value} is not positive"),
                });
            }
        }

        let non_negative = [
            ("guide_threshold", self.guide_threshold),
            ("rotation_handle_distance", self.rotation_handle_distance),
            ("min_object_size", self.min_object_size),
            ("paste_offset_cm", self.paste_offset_cm),
        ];
        for (field, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("{value} is negative or not finite"),
                });
            }
        }

        if self.history_capacity == 0 {
            return Err(ConfigError::Invalid {
                field: "history_capacity",
                reason: "must keep at least one snapshot".to_string(),
            });
        }
        Ok(())
    }

    pub fn canvas_frame(&self) -> CanvasFrame {
        CanvasFrame::new(self.canvas_width_cm, self.canvas_height_cm, self.dpi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EditorConfig::default();
        assert_eq!(config.canvas_width_cm, 21.0);
        assert_eq!(config.canvas_height_cm, 29.7);
        assert_eq!(config.dpi, 96.0);
        assert_eq!(config.history_capacity, 50);
        assert_eq!(config.guide_threshold, 5.0);
        assert!(config.snap.guides);
        assert!(!config.snap.grid);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{ "dpi": 300.0, "snap": { "grid": true, "guides": false } }"#;
        let config = EditorConfig::from_json(json).unwrap();
        assert_eq!(config.dpi, 300.0);
        assert!(config.snap.grid);
        assert_eq!(config.history_capacity, 50);
    }

    #[test]
    fn test_invalid_values() {
        let err = EditorConfig::from_json(r#"{ "dpi": 0.0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "dpi", .. }));
        let err = EditorConfig::from_json(r#"{ "history_capacity": 0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "history_capacity", .. }));
        assert!(matches!(EditorConfig::from_json("nope"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("editor.json");
        let mut config = EditorConfig::default();
        config.grid_spacing_cm = 0.5;
        fs::write(&path, config.to_json().unwrap()).unwrap();
        assert_eq!(EditorConfig::load(&path).unwrap(), config);
        assert!(matches!(
            EditorConfig::load(dir.path().join("missing.json")),
            Err(ConfigError::Io(_))
        ));
    }
}

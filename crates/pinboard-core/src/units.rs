//! Conversion between real-world lengths and device units.
//!
//! The scene stores centimeters; transform math runs in device units
//! (`cm / 2.54 * dpi`).

/// Centimeters per inch.
pub const CM_PER_INCH: f64 = 2.54;

/// Default canvas resolution.
pub const DEFAULT_DPI: f64 = 96.0;

pub fn cm_to_device(cm: f64, dpi: f64) -> f64 {
    cm / CM_PER_INCH * dpi
}

pub fn device_to_cm(device: f64, dpi: f64) -> f64 {
    if dpi <= 0.0 {
        return 0.0;
    }
    device / dpi * CM_PER_INCH
}

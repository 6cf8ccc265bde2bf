use ibl_core::Real;
use serde::{Deserialize, Serialize};

/// Closed interval of accepted values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: Real,
    pub max: Real,
}

impl ValueRange {
    pub const fn new(min: Real, max: Real) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: Real) -> bool {
        value.is_finite() && value >= self.min && value <= self.max
    }

    pub fn clamp(&self, value: Real) -> Real {
        value.clamp(self.min, self.max)
    }
}

/// Limits applied to calibration edits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    // ─────────────────────────────────────────────────────────────────────────
    // Accepted ranges
    // ─────────────────────────────────────────────────────────────────────────
    /// Camera height above the ground (scene units).
    pub camera_height: ValueRange,

    /// Width of the calibration rectangle (edge `v0 → v1`).
    pub plane_width: ValueRange,

    /// Height of the calibration rectangle (edge `v1 → v2`).
    pub plane_height: ValueRange,

    // ─────────────────────────────────────────────────────────────────────────
    // Derived values
    // ─────────────────────────────────────────────────────────────────────────
    /// Clamp a camera height derived from a plane dimension into range
    /// instead of rejecting the edit.
    pub clamp_derived_height: bool,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            camera_height: ValueRange::new(0.01, 50.0),
            plane_width: ValueRange::new(0.01, 100.0),
            plane_height: ValueRange::new(0.01, 100.0),
            clamp_derived_height: true,
        }
    }
}

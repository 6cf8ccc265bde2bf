//! Calibration record and its update rules.
//!
//! [`CalibrationState`] holds the solved orientation, the authoritative
//! [`GroundReference`] and the derived quantities. Every user edit goes
//! through [`CalibrationState::apply`], which recomputes the dependent values
//! in one pass.

mod config;
mod state;
mod update;

pub use config::{CalibrationConfig, ValueRange};
pub use state::{CalibrationState, GroundReference, PlaneDimension};
pub use update::{
    camera_height_for_dimension, ground_vertices, plane_dimensions, DerivedQuantities, Edit,
    UpdateError, UpdateOutcome,
};

//! Calibration state and reconstruction pipeline for IBL panoramas.
//!
//! The pipeline wraps the closed-form solvers of `ibl-linear` with the
//! mutable calibration record a host application keeps between user actions:
//!
//! - [`calibration`]: orientation, ground reference, the four calibration
//!   vertices and the single-pass update rules that keep camera height and
//!   plane dimensions consistent,
//! - [`reconstruction`]: ground shapes from marker selections,
//! - [`scene`]: panorama camera pose and environment UV mapping,
//! - [`feedback`]: UV polylines for drawing calibration feedback on the
//!   panorama,
//! - [`run`]: one-shot calibration from a marker file.

pub mod calibration;
pub mod feedback;
pub mod reconstruction;
pub mod run;
pub mod scene;

pub use calibration::*;
pub use reconstruction::{reconstruct, Shape, ShapeKind};
pub use run::{run_calibration, CalibrationInput, CalibrationReport, ShapeMarkers};

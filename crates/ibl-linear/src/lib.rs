//! Closed-form solvers on top of `ibl-core`.
//!
//! - [`OrientationSolver`]: recovers the panorama orientation from four
//!   corners of a ground rectangle picked on the sphere.
//! - Shape solvers: square, rectangle, circle and polygon reconstruction from
//!   ground-plane points.

mod orientation;
mod shapes;

pub use orientation::*;
pub use shapes::*;

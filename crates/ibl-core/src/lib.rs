//! Core math and geometry primitives for spherical panorama calibration.
//!
//! This crate contains:
//! - linear algebra type aliases (`Real`, `Vec3`, `Pt3`, `Dir3`, `Rot3`, ...)
//!   and the relative-tolerance helpers every degeneracy check goes through,
//! - the projection chain between the three coordinate spaces of a panorama,
//! - line/point primitives and convex-hull ordering on the ground plane,
//! - deterministic synthetic panoramas for tests.
//!
//! Projection chain:
//! `uv (equirectangular) ⇄ direction (unit sphere) ⇄ point (ground plane z = 0)`
//!
//! The camera sits at `(0, 0, height)` above the ground, and an orientation
//! rotates native panorama directions into the world frame before the ray is
//! intersected with the ground.

/// Line intersection, point-line distance and convex hull ordering.
pub mod geometry;
/// Linear algebra type aliases and tolerance helpers.
pub mod math;
/// Equirectangular, sphere and ground-plane conversions.
pub mod projection;
/// Deterministic synthetic panoramas for tests and examples.
pub mod synthetic;

pub use geometry::*;
pub use math::*;
pub use projection::*;

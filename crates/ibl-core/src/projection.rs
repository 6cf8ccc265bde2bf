//! Conversions between equirectangular UV, sphere directions and the ground
//! plane.
//!
//! Equirectangular coordinates use `(0, 0)` at the bottom-left of the image
//! and `(1, 1)` at the top-right. Azimuth decreases from `+π` to `-π` across
//! the image and elevation increases from `-π/2` to `+π/2` upwards, so the
//! image centre looks along `+X`.
//!
//! Ground-plane conversions place the camera at `(0, 0, height)` and the
//! ground at `z = 0`. The orientation rotates native panorama directions into
//! the world frame.

use std::f64::consts::PI;

use thiserror::Error;

use crate::{is_negligible, try_normalize_rel, Dir3, Pt2, Pt3, Real, Rot3, Vec3, DEFAULT_REL_TOL};

/// Failure modes of the ground-plane projections.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ProjectionError {
    #[error("camera height must be positive and finite, got {0}")]
    NonPositiveHeight(Real),
    #[error("direction is parallel to the ground plane (point at infinity)")]
    ParallelToGround,
    #[error("direction points above the horizon and never meets the ground")]
    AboveHorizon,
    #[error("direction has zero length or coincides with the camera")]
    DegenerateDirection,
}

/// Camera centre for a given height above the ground plane.
#[inline]
pub fn camera_position(height: Real) -> Pt3 {
    Pt3::new(0.0, 0.0, height)
}

/// Map an equirectangular coordinate to a unit direction.
///
/// `phi = (0.5 - u) · 2π`, `theta = (v - 0.5) · π` and the direction is
/// `(cos θ cos φ, cos θ sin φ, sin θ)`.
pub fn equirect_to_sphere(uv: &Pt2) -> Dir3 {
    let phi = (0.5 - uv.x) * 2.0 * PI;
    let theta = (uv.y - 0.5) * PI;
    let r = theta.cos();

    Dir3::new_unchecked(Vec3::new(phi.cos() * r, phi.sin() * r, theta.sin()))
}

/// Map a unit direction back to its equirectangular coordinate.
///
/// Exact inverse of [`equirect_to_sphere`] away from the poles. At `|z| = 1`
/// the azimuth is undefined and `u = 0.5` is returned.
pub fn sphere_to_equirect(dir: &Dir3) -> Pt2 {
    let theta = dir.z.clamp(-1.0, 1.0).asin();
    let phi = dir.y.atan2(dir.x);

    let u = 0.5 * (1.0 - phi / PI);
    let v = 0.5 * (2.0 * theta / PI + 1.0);
    Pt2::new(u, v)
}

fn check_height(height: Real) -> Result<(), ProjectionError> {
    if height.is_finite() && height > 0.0 {
        Ok(())
    } else {
        Err(ProjectionError::NonPositiveHeight(height))
    }
}

/// Project a sphere direction onto the ground plane.
///
/// The direction is rotated by `orientation`, scaled by `height` and offset by
/// the camera position; the ray `camera + t · (point - camera)` is then
/// intersected with `z = 0`, giving `t = -height / (point.z - height)`.
///
/// `dir` does not need to be unit length: the intersection only depends on its
/// direction.
///
/// # Errors
///
/// - [`ProjectionError::NonPositiveHeight`] for `height <= 0`
/// - [`ProjectionError::ParallelToGround`] when the rotated direction is
///   horizontal within tolerance
/// - [`ProjectionError::AboveHorizon`] when the ray points upwards
pub fn sphere_to_ground(
    dir: &Vec3,
    orientation: &Rot3,
    height: Real,
) -> Result<Pt3, ProjectionError> {
    check_height(height)?;

    let rotated = orientation * dir;
    let len = rotated.norm();
    if !len.is_finite() || len == 0.0 {
        return Err(ProjectionError::DegenerateDirection);
    }
    if is_negligible(rotated.z, len, DEFAULT_REL_TOL) {
        return Err(ProjectionError::ParallelToGround);
    }
    if rotated.z > 0.0 {
        return Err(ProjectionError::AboveHorizon);
    }

    let camera = camera_position(height);
    let point = camera + rotated * height;
    let t = -height / (point.z - height);

    Ok(camera + (point - camera) * t)
}

/// Inverse of [`sphere_to_ground`]: recover the native direction that lands on
/// `point`.
///
/// Translates by `-camera`, divides by `height` and applies the inverse
/// (transpose) of `orientation`. The caller must pass the height used for the
/// forward projection.
pub fn ground_to_sphere(
    point: &Pt3,
    orientation: &Rot3,
    height: Real,
) -> Result<Dir3, ProjectionError> {
    check_height(height)?;

    let scaled = (point - camera_position(height)) / height;
    let native = orientation.inverse() * scaled;

    let scale = point.coords.norm().max(height) / height;
    try_normalize_rel(&native, scale, DEFAULT_REL_TOL).ok_or(ProjectionError::DegenerateDirection)
}

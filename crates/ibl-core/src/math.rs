//! Mathematical utilities and type definitions.
//!
//! This module provides the fundamental types used throughout the workspace
//! and the relative-tolerance predicates used for degeneracy checks.

use nalgebra::{Isometry3, Matrix3, Point2, Point3, Rotation3, Unit, Vector2, Vector3};

/// Scalar type used throughout the library (currently `f64`).
pub type Real = f64;

/// 2D vector with [`Real`] components.
pub type Vec2 = Vector2<Real>;
/// 3D vector with [`Real`] components.
pub type Vec3 = Vector3<Real>;
/// 2D point with [`Real`] coordinates (equirectangular UV, ground XY).
pub type Pt2 = Point2<Real>;
/// 3D point with [`Real`] coordinates.
pub type Pt3 = Point3<Real>;
/// Unit direction on the sphere.
pub type Dir3 = Unit<Vector3<Real>>;
/// 3D rotation (orthonormal, determinant +1).
pub type Rot3 = Rotation3<Real>;
/// 3D rigid transform (SE(3)) using [`Real`].
pub type Iso3 = Isometry3<Real>;

/// Default relative tolerance for parallel/collinear/degenerate checks.
pub const DEFAULT_REL_TOL: Real = 1e-9;

/// Tolerance for accepting a stored or user-supplied matrix as a rotation.
///
/// Looser than [`DEFAULT_REL_TOL`] so that hand-written JSON with a few
/// significant digits still loads.
pub const ROTATION_TOL: Real = 1e-6;

/// Returns `true` when `value` is negligible compared to `scale`.
///
/// The check is `|value| <= tol * |scale|`. A zero `scale` makes only an exact
/// zero negligible, so callers should pass the magnitude of the operands that
/// produced `value`.
#[inline]
pub fn is_negligible(value: Real, scale: Real, tol: Real) -> bool {
    value.abs() <= tol * scale.abs()
}

/// Returns `true` when `a` and `b` are parallel (or one of them vanishes).
///
/// Uses `|a × b| <= tol · |a| · |b|`, i.e. the sine of the enclosed angle.
pub fn is_parallel(a: &Vec3, b: &Vec3, tol: Real) -> bool {
    let scale = a.norm() * b.norm();
    if scale == 0.0 {
        return true;
    }
    is_negligible(a.cross(b).norm(), scale, tol)
}

/// Normalise `v`, failing when its norm is negligible relative to `scale`.
///
/// `scale` is the magnitude of whatever produced `v` (for a cross product of
/// unit vectors this is `1.0`).
pub fn try_normalize_rel(v: &Vec3, scale: Real, tol: Real) -> Option<Dir3> {
    let n = v.norm();
    if !n.is_finite() || is_negligible(n, scale, tol) || n == 0.0 {
        return None;
    }
    Some(Dir3::new_unchecked(v / n))
}

/// Returns `true` when `rot` is orthonormal with determinant `+1`.
///
/// Checks `‖RᵀR − I‖ <= tol` (Frobenius) and `|det R − 1| <= tol`. Rotations
/// read through serde are taken as given, so they must pass this before use.
pub fn is_rotation(rot: &Rot3, tol: Real) -> bool {
    let m = rot.matrix();
    let orthogonality = (m.transpose() * m - Matrix3::identity()).norm();
    orthogonality <= tol && (m.determinant() - 1.0).abs() <= tol
}

/// Build a rotation from an XYZ Euler triple (`R = Rz(z) · Ry(y) · Rx(x)`).
pub fn rotation_from_euler_xyz(euler: [Real; 3]) -> Rot3 {
    Rot3::from_euler_angles(euler[0], euler[1], euler[2])
}

/// Decompose a rotation into an XYZ Euler triple (inverse of
/// [`rotation_from_euler_xyz`]).
pub fn euler_xyz_from_rotation(rot: &Rot3) -> [Real; 3] {
    let (x, y, z) = rot.euler_angles();
    [x, y, z]
}

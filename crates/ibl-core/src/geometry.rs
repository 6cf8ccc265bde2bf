//! Geometric primitives used by the shape solvers.
//!
//! All degeneracy checks go through the relative tolerance helpers in
//! [`crate::math`], so results do not depend on the absolute scale of the
//! scene.

use std::cmp::Ordering;

use crate::{is_negligible, is_parallel, Pt2, Pt3, Real, Vec3, DEFAULT_REL_TOL};

/// Intersect the lines `p0 + s·v0` and `p1 + t·v1`.
///
/// Both lines must be coplanar and non-parallel. Returns `None` when the
/// direction vectors are parallel (within relative tolerance) or when the
/// lines are skew.
///
/// # Algorithm
///
/// With `n = v0 × v1`, the parameter on the first line is
/// `s = ((p1 - p0) × v1) · n / |n|²`.
pub fn intersect_lines(p0: &Pt3, v0: &Vec3, p1: &Pt3, v1: &Vec3) -> Option<Pt3> {
    if is_parallel(v0, v1, DEFAULT_REL_TOL) {
        return None;
    }
    let n = v0.cross(v1);
    let n_norm2 = n.norm_squared();

    let w = p1 - p0;
    let scale = w.norm().max(p0.coords.norm()).max(p1.coords.norm());
    // Coplanarity: the offset between the lines must lie in their common plane.
    if !is_negligible(w.dot(&n) / n_norm2.sqrt(), scale, DEFAULT_REL_TOL.sqrt()) {
        return None;
    }

    let s = w.cross(v1).dot(&n) / n_norm2;
    Some(p0 + v0 * s)
}

/// Distance from `point` to the infinite line through `line_p0` and `line_p1`.
///
/// Falls back to the point-to-point distance when the two line points
/// coincide.
pub fn point_to_line_distance(point: &Pt3, line_p0: &Pt3, line_p1: &Pt3) -> Real {
    let dir = line_p1 - line_p0;
    let len = dir.norm();
    if len == 0.0 {
        return (point - line_p0).norm();
    }
    dir.cross(&(line_p0 - point)).norm() / len
}

/// Signed angle about `+Z` from the XY projection of `from` to that of `to`,
/// in `(-π, π]`.
///
/// The magnitude equals the unsigned angle between the two vectors when both
/// lie in the XY plane.
pub fn signed_angle_z(from: &Vec3, to: &Vec3) -> Real {
    let cross = from.x * to.y - from.y * to.x;
    let dot = from.x * to.x + from.y * to.y;
    cross.atan2(dot)
}

fn cross_2d(o: &Pt2, a: &Pt2, b: &Pt2) -> Real {
    (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
}

/// Indices of the convex hull of `points`, counter-clockwise.
///
/// Andrew's monotone chain, `O(n log n)`. Points strictly inside the hull and
/// points on hull edges are dropped; duplicates contribute a single index.
/// Returns an empty vector when fewer than three non-collinear points exist.
pub fn convex_hull_order(points: &[Pt2]) -> Vec<usize> {
    let mut idx: Vec<usize> = (0..points.len())
        .filter(|&i| points[i].x.is_finite() && points[i].y.is_finite())
        .collect();
    idx.sort_by(|&a, &b| {
        let (pa, pb) = (&points[a], &points[b]);
        pa.x.partial_cmp(&pb.x)
            .unwrap_or(Ordering::Equal)
            .then(pa.y.partial_cmp(&pb.y).unwrap_or(Ordering::Equal))
    });
    idx.dedup_by(|a, b| points[*a] == points[*b]);
    if idx.len() < 3 {
        return Vec::new();
    }

    let extent = idx
        .iter()
        .map(|&i| points[i].coords.norm())
        .fold(0.0, Real::max)
        .max(Real::MIN_POSITIVE);
    // Turns smaller than this are treated as straight (collinear).
    let is_left_turn = |o: usize, a: usize, b: usize| {
        let c = cross_2d(&points[o], &points[a], &points[b]);
        c > 0.0 && !is_negligible(c, extent * extent, DEFAULT_REL_TOL)
    };

    let mut hull: Vec<usize> = Vec::with_capacity(2 * idx.len());
    for &i in &idx {
        while hull.len() >= 2 && !is_left_turn(hull[hull.len() - 2], hull[hull.len() - 1], i) {
            hull.pop();
        }
        hull.push(i);
    }
    let lower_len = hull.len() + 1;
    for &i in idx.iter().rev().skip(1) {
        while hull.len() >= lower_len
            && !is_left_turn(hull[hull.len() - 2], hull[hull.len() - 1], i)
        {
            hull.pop();
        }
        hull.push(i);
    }
    hull.pop();

    if hull.len() < 3 {
        return Vec::new();
    }
    hull
}

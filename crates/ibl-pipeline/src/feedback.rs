//! UV polylines for drawing calibration feedback over the panorama.
//!
//! Straight lines on the ground and the horizon are great circles on the
//! sphere, so every curve here is sampled along a great circle and mapped to
//! equirectangular coordinates. Use [`split_at_seam`] before drawing, since a
//! curve crossing the `u = 0 / u = 1` seam would otherwise be joined across
//! the whole image.

use anyhow::{Context, Result};
use ibl_core::{
    ground_to_sphere, is_negligible, sphere_to_equirect, Dir3, Pt2, Real, Rot3, Vec3,
    DEFAULT_REL_TOL,
};
use nalgebra::Unit;
use serde::{Deserialize, Serialize};

use crate::CalibrationState;

/// World axis of the solved frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    fn index(self) -> usize {
        match self {
            Self::X => 0,
            Self::Y => 1,
            Self::Z => 2,
        }
    }
}

/// Great-circle arc from `v0` to `v1`, sampled at `samples` points including
/// both ends.
///
/// Returns `None` when the endpoints coincide or are antipodal, since the
/// great circle through them is then not unique.
pub fn great_circle_arc(v0: &Dir3, v1: &Dir3, samples: usize) -> Option<Vec<Pt2>> {
    let samples = samples.max(2);
    let (start, end) = (v0.into_inner(), v1.into_inner());
    let axis = start.cross(&end);
    if is_negligible(axis.norm(), 1.0, DEFAULT_REL_TOL) {
        return None;
    }
    let axis = Unit::new_normalize(axis);
    let angle = start.dot(&end).clamp(-1.0, 1.0).acos();

    let arc = (0..samples)
        .map(|i| {
            let t = i as Real / (samples - 1) as Real;
            let dir = Rot3::from_axis_angle(&axis, angle * t) * start;
            sphere_to_equirect(&Dir3::new_normalize(dir))
        })
        .collect();
    Some(arc)
}

/// Closed great circle of directions perpendicular to the world `axis`.
///
/// [`Axis::Z`] gives the horizon. The circle has `samples + 1` points; the
/// last repeats the first.
pub fn axis_circle(orientation: &Rot3, axis: Axis, samples: usize) -> Vec<Pt2> {
    let samples = samples.max(3);
    let m = orientation.matrix();
    // Native directions of the two world axes spanning the circle.
    let k = axis.index();
    let a: Vec3 = m.row((k + 1) % 3).transpose();
    let b: Vec3 = m.row((k + 2) % 3).transpose();

    (0..=samples)
        .map(|i| {
            let t = std::f64::consts::TAU * (i % samples) as Real / samples as Real;
            sphere_to_equirect(&Dir3::new_normalize(a * t.cos() + b * t.sin()))
        })
        .collect()
}

/// Edges of the calibrated floor quad projected back onto the panorama, one
/// polyline per edge `v0 → v1 → v2 → v3 → v0`.
pub fn reprojected_floor_quad(
    state: &CalibrationState,
    samples_per_edge: usize,
) -> Result<Vec<Vec<Pt2>>> {
    let quad = state.floor_quad().context("floor quad is not on the ground")?;
    let mut dirs = Vec::with_capacity(4);
    for (i, p) in quad.iter().enumerate() {
        let dir = ground_to_sphere(p, state.orientation(), state.camera_height())
            .with_context(|| format!("floor corner {i} has no panorama direction"))?;
        dirs.push(dir);
    }

    (0..4)
        .map(|i| {
            let j = (i + 1) % 4;
            great_circle_arc(&dirs[i], &dirs[j], samples_per_edge)
                .with_context(|| format!("floor edge {i}-{j} is degenerate"))
        })
        .collect()
}

/// Split a polyline wherever consecutive points jump across the horizontal
/// wrap-around of the image.
pub fn split_at_seam(polyline: &[Pt2]) -> Vec<Vec<Pt2>> {
    let mut parts: Vec<Vec<Pt2>> = Vec::new();
    let mut current: Vec<Pt2> = Vec::new();
    for p in polyline {
        if let Some(last) = current.last() {
            if (p.x - last.x).abs() > 0.5 {
                parts.push(std::mem::take(&mut current));
            }
        }
        current.push(*p);
    }
    if !current.is_empty() {
        parts.push(current);
    }
    parts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CalibrationConfig, Edit};
    use ibl_core::equirect_to_sphere;

    fn dir(x: Real, y: Real, z: Real) -> Dir3 {
        Dir3::new_normalize(Vec3::new(x, y, z))
    }

    #[test]
    fn arc_endpoints_and_plane() {
        let v0 = dir(1.0, 0.2, -0.5);
        let v1 = dir(0.3, 1.0, -0.8);
        let arc = great_circle_arc(&v0, &v1, 16).unwrap();
        assert_eq!(arc.len(), 16);
        assert!((arc[0] - sphere_to_equirect(&v0)).norm() < 1e-12);
        assert!((arc[15] - sphere_to_equirect(&v1)).norm() < 1e-9);

        let normal = v0.into_inner().cross(&v1.into_inner()).normalize();
        for uv in &arc {
            assert!(equirect_to_sphere(uv).dot(&normal).abs() < 1e-9);
        }
    }

    #[test]
    fn degenerate_arc_is_none() {
        let v = dir(1.0, 0.0, 0.0);
        assert!(great_circle_arc(&v, &v, 8).is_none());
        assert!(great_circle_arc(&v, &dir(-1.0, 0.0, 0.0), 8).is_none());
    }

    #[test]
    fn level_horizon_is_image_midline() {
        let horizon = axis_circle(&Rot3::identity(), Axis::Z, 64);
        assert_eq!(horizon.len(), 65);
        assert_eq!(horizon[0], horizon[64]);
        for uv in &horizon {
            assert!((uv.y - 0.5).abs() < 1e-12);
        }
    }

    #[test]
    fn tilted_horizon_is_perpendicular_to_up() {
        let rot = Rot3::from_euler_angles(0.2, -0.1, 0.5);
        let up_native = rot.inverse() * Vec3::z();
        for uv in axis_circle(&rot, Axis::Z, 32) {
            assert!(equirect_to_sphere(&uv).dot(&up_native).abs() < 1e-9);
        }
    }

    #[test]
    fn floor_quad_edges_follow_ground_lines() {
        let mut state = CalibrationState::default();
        let config = CalibrationConfig::default();
        state
            .apply(Edit::Orientation(Rot3::from_euler_angles(0.05, 0.1, 0.2)), &config)
            .unwrap();

        let edges = reprojected_floor_quad(&state, 9).unwrap();
        assert_eq!(edges.len(), 4);

        let quad = state.floor_quad().unwrap();
        let (a, b) = (quad[0], quad[1]);
        for uv in &edges[0] {
            let d = equirect_to_sphere(uv).into_inner();
            let g = ibl_core::sphere_to_ground(&d, state.orientation(), state.camera_height())
                .unwrap();
            // Every sample lies on the segment a-b.
            let along = (g - a).norm() + (b - g).norm();
            assert!((along - (b - a).norm()).abs() < 1e-9);
            assert!(g.z.abs() < 1e-9);
        }
    }

    #[test]
    fn seam_crossing_is_split() {
        let line = [
            Pt2::new(0.9, 0.4),
            Pt2::new(0.98, 0.4),
            Pt2::new(0.02, 0.4),
            Pt2::new(0.1, 0.4),
        ];
        let parts = split_at_seam(&line);
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].len(), 2);
        assert_eq!(parts[1].len(), 2);
        assert!(split_at_seam(&[]).is_empty());
    }
}

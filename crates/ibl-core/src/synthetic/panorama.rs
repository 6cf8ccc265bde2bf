//! Synthetic panoramas looking at ground-plane geometry.

use serde::{Deserialize, Serialize};

use crate::{ground_to_sphere, sphere_to_equirect, Dir3, Pt2, Pt3, Real, Rot3, Vec3};

/// Build a ground rectangle (`z = 0`) in boundary order.
///
/// Corners are returned counter-clockwise seen from above, starting at the
/// corner where the `width` edge begins: `v0 → v1` spans `width` along the
/// direction `yaw` (radians about +Z), `v1 → v2` spans `height`.
pub fn ground_rectangle(center: Pt2, width: Real, height: Real, yaw: Real) -> [Pt3; 4] {
    let ex = Vec3::new(yaw.cos(), yaw.sin(), 0.0) * (0.5 * width);
    let ey = Vec3::new(-yaw.sin(), yaw.cos(), 0.0) * (0.5 * height);
    let c = Pt3::new(center.x, center.y, 0.0);
    [c - ex - ey, c + ex - ey, c + ex + ey, c - ex + ey]
}

/// A panorama captured at `camera_height` whose native frame relates to the
/// world through `orientation` (native → world).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SyntheticPanorama {
    pub orientation: Rot3,
    pub camera_height: Real,
}

impl SyntheticPanorama {
    pub fn new(orientation: Rot3, camera_height: Real) -> Self {
        Self {
            orientation,
            camera_height,
        }
    }

    /// Native sphere direction of a ground point, `None` for the camera foot
    /// point degenerate case.
    pub fn direction(&self, ground: &Pt3) -> Option<Dir3> {
        ground_to_sphere(ground, &self.orientation, self.camera_height).ok()
    }

    /// Native sphere directions of several ground points.
    pub fn directions(&self, ground: &[Pt3]) -> Option<Vec<Dir3>> {
        ground.iter().map(|p| self.direction(p)).collect()
    }

    /// Equirectangular marker of a ground point.
    pub fn marker(&self, ground: &Pt3) -> Option<Pt2> {
        self.direction(ground).map(|d| sphere_to_equirect(&d))
    }

    /// Equirectangular markers of several ground points, in input order.
    pub fn markers(&self, ground: &[Pt3]) -> Option<Vec<Pt2>> {
        ground.iter().map(|p| self.marker(p)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{equirect_to_sphere, sphere_to_ground};

    #[test]
    fn rectangle_has_requested_sides() {
        let q = ground_rectangle(Pt2::new(1.0, -2.0), 3.0, 1.5, 0.7);
        assert!(((q[1] - q[0]).norm() - 3.0).abs() < 1e-12);
        assert!(((q[2] - q[1]).norm() - 1.5).abs() < 1e-12);
        assert!((q[2] - q[1]).dot(&(q[1] - q[0])).abs() < 1e-12);
        // Counter-clockwise seen from above.
        assert!((q[1] - q[0]).cross(&(q[2] - q[1])).z > 0.0);
    }

    #[test]
    fn markers_project_back_to_ground() {
        let pano = SyntheticPanorama::new(Rot3::from_euler_angles(0.3, -0.1, 1.0), 1.8);
        let quad = ground_rectangle(Pt2::new(2.0, 1.0), 1.0, 2.0, -0.4);
        let markers = pano.markers(&quad).unwrap();

        for (m, p) in markers.iter().zip(quad.iter()) {
            let dir = equirect_to_sphere(m);
            let back = sphere_to_ground(&dir, &pano.orientation, pano.camera_height).unwrap();
            assert!((back - p).norm() < 1e-9);
        }
    }
}

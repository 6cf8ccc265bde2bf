//! Scene quantities derived from a calibration: the panorama camera pose and
//! environment texture coordinates for world points.

use std::f64::consts::FRAC_PI_2;

use ibl_core::{ground_to_sphere, sphere_to_equirect, Iso3, ProjectionError, Pt2, Pt3, Rot3};
use nalgebra::{Translation3, UnitQuaternion};

use crate::CalibrationState;

/// Rotation turning a camera looking down its local `-Z` with `+Y` up into
/// one looking along `+X` with `+Z` up.
fn camera_base_rotation() -> Rot3 {
    Rot3::from_euler_angles(FRAC_PI_2, 0.0, -FRAC_PI_2)
}

/// World pose of the panorama camera: centre at `(0, 0, camera_height)`,
/// rotation `orientation · base`.
pub fn panorama_camera_pose(state: &CalibrationState) -> Iso3 {
    let rotation = state.orientation() * camera_base_rotation();
    Iso3::from_parts(
        Translation3::from(state.camera_position().coords),
        UnitQuaternion::from_rotation_matrix(&rotation),
    )
}

/// Equirectangular coordinate of a world point as seen from the calibrated
/// camera.
pub fn environment_uv(state: &CalibrationState, point: &Pt3) -> Result<Pt2, ProjectionError> {
    let dir = ground_to_sphere(point, state.orientation(), state.camera_height())?;
    Ok(sphere_to_equirect(&dir))
}

/// [`environment_uv`] for several points, e.g. the vertices of a mesh.
pub fn environment_uvs(
    state: &CalibrationState,
    points: &[Pt3],
) -> Result<Vec<Pt2>, ProjectionError> {
    points.iter().map(|p| environment_uv(state, p)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CalibrationConfig, Edit};
    use ibl_core::{equirect_to_sphere, Dir3, Vec3};

    #[test]
    fn default_camera_looks_forward() {
        let pose = panorama_camera_pose(&CalibrationState::default());
        assert!((pose.translation.vector - Vec3::new(0.0, 0.0, 1.0)).norm() < 1e-12);

        let view = pose.rotation * -Vec3::z();
        let up = pose.rotation * Vec3::y();
        assert!((view - Vec3::x()).norm() < 1e-12);
        assert!((up - Vec3::z()).norm() < 1e-12);
    }

    #[test]
    fn pose_follows_orientation_and_height() {
        let mut state = CalibrationState::default();
        let config = CalibrationConfig::default();
        let rot = Rot3::from_euler_angles(0.05, -0.1, 0.8);
        state.apply(Edit::Orientation(rot), &config).unwrap();
        state.apply(Edit::CameraHeight(2.2), &config).unwrap();

        let pose = panorama_camera_pose(&state);
        assert!((pose.translation.vector.z - 2.2).abs() < 1e-12);
        let view = pose.rotation * -Vec3::z();
        assert!((view - rot * Vec3::x()).norm() < 1e-9);
    }

    #[test]
    fn floor_quad_maps_back_to_vertices() {
        let mut state = CalibrationState::default();
        let config = CalibrationConfig::default();
        state
            .apply(Edit::Orientation(Rot3::from_euler_angles(0.1, 0.05, -0.3)), &config)
            .unwrap();

        let quad = state.floor_quad().unwrap();
        let uvs = environment_uvs(&state, &quad).unwrap();
        for (uv, v) in uvs.iter().zip(state.vertices()) {
            let expected = Dir3::new_normalize(*v);
            assert!((equirect_to_sphere(uv).into_inner() - expected.into_inner()).norm() < 1e-9);
        }
    }

    #[test]
    fn points_above_camera_have_uv() {
        let state = CalibrationState::default();
        let uv = environment_uv(&state, &Pt3::new(0.0, 0.0, 5.0)).unwrap();
        assert!((uv.y - 1.0).abs() < 1e-12);
    }
}

//! Persistent calibration record.

use ibl_core::{euler_xyz_from_rotation, Pt3, Real, Rot3, Vec3};
use serde::{Deserialize, Serialize};

/// Which quantity is authoritative when the orientation changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroundReference {
    /// Camera height is fixed; plane dimensions follow.
    #[default]
    Camera,
    /// A plane dimension is fixed; camera height follows.
    Object,
}

/// Edge of the calibration rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaneDimension {
    /// Edge `v0 → v1`.
    #[default]
    Width,
    /// Edge `v1 → v2`.
    Height,
}

impl PlaneDimension {
    /// Vertex indices spanning this edge.
    pub fn edge(self) -> (usize, usize) {
        match self {
            Self::Width => (0, 1),
            Self::Height => (1, 2),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Width => "plane_width",
            Self::Height => "plane_height",
        }
    }
}

/// Calibration record kept between user actions.
///
/// Fields are only mutated through [`CalibrationState::apply`] and
/// [`CalibrationState::calibrate`] so that camera height and plane dimensions
/// stay consistent with the stored vertices and orientation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationState {
    // ─────────────────────────────────────────────────────────────────────────
    // Solved geometry
    // ─────────────────────────────────────────────────────────────────────────
    /// Rotation from native panorama directions to the world frame.
    pub(crate) orientation: Rot3,

    /// Native directions of the calibration rectangle, `v0 → v3`.
    pub(crate) vertices: [Vec3; 4],

    // ─────────────────────────────────────────────────────────────────────────
    // Scale
    // ─────────────────────────────────────────────────────────────────────────
    pub(crate) reference: GroundReference,

    /// Plane dimension held fixed in [`GroundReference::Object`] mode: the
    /// one edited last.
    #[serde(default)]
    pub(crate) object_anchor: PlaneDimension,

    pub(crate) camera_height: Real,
    pub(crate) plane_width: Real,
    pub(crate) plane_height: Real,
}

impl Default for CalibrationState {
    fn default() -> Self {
        Self {
            orientation: Rot3::identity(),
            vertices: [
                Vec3::new(1.0, 1.0, -1.0),
                Vec3::new(2.0, 1.0, -1.0),
                Vec3::new(2.0, 2.0, -1.0),
                Vec3::new(1.0, 2.0, -1.0),
            ],
            reference: GroundReference::Camera,
            object_anchor: PlaneDimension::Width,
            camera_height: 1.0,
            plane_width: 1.0,
            plane_height: 1.0,
        }
    }
}

impl CalibrationState {
    pub fn orientation(&self) -> &Rot3 {
        &self.orientation
    }

    /// Orientation as XYZ Euler angles in radians.
    pub fn orientation_euler(&self) -> [Real; 3] {
        euler_xyz_from_rotation(&self.orientation)
    }

    pub fn vertices(&self) -> &[Vec3; 4] {
        &self.vertices
    }

    pub fn reference(&self) -> GroundReference {
        self.reference
    }

    pub fn object_anchor(&self) -> PlaneDimension {
        self.object_anchor
    }

    pub fn camera_height(&self) -> Real {
        self.camera_height
    }

    pub fn plane_width(&self) -> Real {
        self.plane_width
    }

    pub fn plane_height(&self) -> Real {
        self.plane_height
    }

    pub fn plane_dimension(&self, dim: PlaneDimension) -> Real {
        match dim {
            PlaneDimension::Width => self.plane_width,
            PlaneDimension::Height => self.plane_height,
        }
    }

    /// Camera centre in world coordinates.
    pub fn camera_position(&self) -> Pt3 {
        ibl_core::camera_position(self.camera_height)
    }
}

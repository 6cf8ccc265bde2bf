//! Single-pass update rules for the calibration record.
//!
//! Ground distances between projected vertices scale linearly with camera
//! height, so any plane dimension fixes the camera height and vice versa.
//! Each [`Edit`] recomputes the dependent quantities once from the
//! authoritative value; nothing feeds back into the edit that started it.

use ibl_core::{
    is_negligible, is_rotation, sphere_to_ground, ProjectionError, Pt3, Real, Rot3, Vec3,
    DEFAULT_REL_TOL, ROTATION_TOL,
};
use ibl_linear::{OrderedQuad, OrientationError, OrientationSolver};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{CalibrationConfig, CalibrationState, GroundReference, PlaneDimension, ValueRange};

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum UpdateError {
    #[error("{field} = {value} is outside [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: Real,
        min: Real,
        max: Real,
    },
    #[error("calibration vertex {index} does not reach the ground: {source}")]
    Projection {
        index: usize,
        #[source]
        source: ProjectionError,
    },
    #[error("calibration edge {0}-{1} has zero length on the ground")]
    DegenerateEdge(usize, usize),
    #[error("orientation is not a proper rotation (det = {determinant})")]
    InvalidOrientation { determinant: Real },
    #[error(transparent)]
    Orientation(#[from] OrientationError),
}

/// A user edit of one calibration field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum Edit {
    Orientation(Rot3),
    Reference(GroundReference),
    CameraHeight(Real),
    PlaneWidth(Real),
    PlaneHeight(Real),
}

/// Scale quantities after an update.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DerivedQuantities {
    pub camera_height: Real,
    pub plane_width: Real,
    pub plane_height: Real,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UpdateOutcome {
    pub derived: DerivedQuantities,
    /// The derived camera height fell outside its range and was clamped.
    pub clamped: bool,
}

fn check_orientation(orientation: &Rot3) -> Result<(), UpdateError> {
    if is_rotation(orientation, ROTATION_TOL) {
        Ok(())
    } else {
        Err(UpdateError::InvalidOrientation {
            determinant: orientation.matrix().determinant(),
        })
    }
}

/// Ground points of the calibration vertices for a given orientation and
/// camera height.
///
/// Fails with [`UpdateError::InvalidOrientation`] when `orientation` is not a
/// proper rotation, e.g. a matrix read through serde.
pub fn ground_vertices(
    vertices: &[Vec3; 4],
    orientation: &Rot3,
    camera_height: Real,
) -> Result<[Pt3; 4], UpdateError> {
    check_orientation(orientation)?;
    let mut out = [Pt3::origin(); 4];
    for (index, v) in vertices.iter().enumerate() {
        out[index] = sphere_to_ground(v, orientation, camera_height)
            .map_err(|source| UpdateError::Projection { index, source })?;
    }
    Ok(out)
}

/// Plane width `|g0 - g1|` and height `|g1 - g2|` at `camera_height`.
pub fn plane_dimensions(
    vertices: &[Vec3; 4],
    orientation: &Rot3,
    camera_height: Real,
) -> Result<(Real, Real), UpdateError> {
    let g = ground_vertices(vertices, orientation, camera_height)?;
    Ok(((g[0] - g[1]).norm(), (g[1] - g[2]).norm()))
}

/// Camera height at which the edge of `dim` measures `target`.
///
/// Measures the edge at `reference_height` and rescales it, since ground
/// distances are proportional to height.
pub fn camera_height_for_dimension(
    vertices: &[Vec3; 4],
    orientation: &Rot3,
    dim: PlaneDimension,
    target: Real,
    reference_height: Real,
) -> Result<Real, UpdateError> {
    let (a, b) = dim.edge();
    let g = ground_vertices(vertices, orientation, reference_height)?;
    let current = (g[a] - g[b]).norm();
    let scale = g[a].coords.norm().max(g[b].coords.norm()).max(reference_height);
    if is_negligible(current, scale, DEFAULT_REL_TOL) {
        return Err(UpdateError::DegenerateEdge(a, b));
    }
    Ok(reference_height * target / current)
}

fn check_range(field: &'static str, value: Real, range: &ValueRange) -> Result<(), UpdateError> {
    if range.contains(value) {
        Ok(())
    } else {
        Err(UpdateError::OutOfRange {
            field,
            value,
            min: range.min,
            max: range.max,
        })
    }
}

impl CalibrationState {
    /// Apply an edit and recompute the dependent quantities.
    ///
    /// | edit                   | authoritative value                        |
    /// |------------------------|--------------------------------------------|
    /// | `CameraHeight`         | the new height                             |
    /// | `PlaneWidth/Height`    | the edited dimension (becomes the anchor)  |
    /// | `Orientation/Reference`| camera height, or the anchor in object mode|
    ///
    /// On error the state is left unchanged.
    pub fn apply(
        &mut self,
        edit: Edit,
        config: &CalibrationConfig,
    ) -> Result<UpdateOutcome, UpdateError> {
        debug!("calibration edit {edit:?}");
        let mut next = self.clone();
        let clamped = match edit {
            Edit::Orientation(rot) => {
                next.orientation = rot;
                next.resolve(config)?
            }
            Edit::Reference(reference) => {
                next.reference = reference;
                next.resolve(config)?
            }
            Edit::CameraHeight(h) => {
                check_range("camera_height", h, &config.camera_height)?;
                next.camera_height = h;
                next.derive_from_camera()?;
                false
            }
            Edit::PlaneWidth(w) => {
                check_range(PlaneDimension::Width.name(), w, &config.plane_width)?;
                next.object_anchor = PlaneDimension::Width;
                next.derive_from_dimension(PlaneDimension::Width, w, config)?
            }
            Edit::PlaneHeight(h) => {
                check_range(PlaneDimension::Height.name(), h, &config.plane_height)?;
                next.object_anchor = PlaneDimension::Height;
                next.derive_from_dimension(PlaneDimension::Height, h, config)?
            }
        };
        *self = next;
        Ok(self.outcome(clamped))
    }

    /// Solve the orientation from a marked rectangle and store its corners as
    /// the new calibration vertices.
    pub fn calibrate(
        &mut self,
        quad: &OrderedQuad,
        config: &CalibrationConfig,
    ) -> Result<UpdateOutcome, UpdateError> {
        let orientation = OrientationSolver::solve(quad)?;
        let mut next = self.clone();
        next.orientation = orientation;
        next.vertices = quad.to_vectors();
        let clamped = next.resolve(config)?;
        *self = next;
        Ok(self.outcome(clamped))
    }

    /// Recompute derived quantities from the authoritative one, e.g. after
    /// loading a record from disk.
    ///
    /// A stored camera height outside `config.camera_height` is rejected in
    /// camera mode; in object mode it is re-derived anyway.
    pub fn refresh(&mut self, config: &CalibrationConfig) -> Result<UpdateOutcome, UpdateError> {
        if self.reference == GroundReference::Camera {
            check_range("camera_height", self.camera_height, &config.camera_height)?;
        }
        let mut next = self.clone();
        let clamped = next.resolve(config)?;
        *self = next;
        Ok(self.outcome(clamped))
    }

    /// Current scale quantities.
    pub fn derived(&self) -> DerivedQuantities {
        DerivedQuantities {
            camera_height: self.camera_height,
            plane_width: self.plane_width,
            plane_height: self.plane_height,
        }
    }

    /// Ground points of the calibration vertices.
    pub fn floor_quad(&self) -> Result<[Pt3; 4], UpdateError> {
        ground_vertices(&self.vertices, &self.orientation, self.camera_height)
    }

    fn outcome(&self, clamped: bool) -> UpdateOutcome {
        UpdateOutcome {
            derived: self.derived(),
            clamped,
        }
    }

    fn resolve(&mut self, config: &CalibrationConfig) -> Result<bool, UpdateError> {
        match self.reference {
            GroundReference::Camera => {
                self.derive_from_camera()?;
                Ok(false)
            }
            GroundReference::Object => {
                let dim = self.object_anchor;
                self.derive_from_dimension(dim, self.plane_dimension(dim), config)
            }
        }
    }

    fn derive_from_camera(&mut self) -> Result<(), UpdateError> {
        let (w, h) = plane_dimensions(&self.vertices, &self.orientation, self.camera_height)?;
        self.plane_width = w;
        self.plane_height = h;
        Ok(())
    }

    fn derive_from_dimension(
        &mut self,
        dim: PlaneDimension,
        target: Real,
        config: &CalibrationConfig,
    ) -> Result<bool, UpdateError> {
        let height = camera_height_for_dimension(
            &self.vertices,
            &self.orientation,
            dim,
            target,
            self.camera_height,
        )?;

        let range = &config.camera_height;
        let clamped = !range.contains(height);
        if clamped {
            if !config.clamp_derived_height || !height.is_finite() {
                return Err(UpdateError::OutOfRange {
                    field: "camera_height",
                    value: height,
                    min: range.min,
                    max: range.max,
                });
            }
            warn!(
                "derived camera height {height:.4} outside [{}, {}], clamping; \
                 {} will not match {target}",
                range.min,
                range.max,
                dim.name()
            );
        }

        self.camera_height = range.clamp(height);
        self.derive_from_camera()?;
        Ok(clamped)
    }
}

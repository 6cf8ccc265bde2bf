//! One-shot calibration from a marker file: solve the orientation, apply the
//! scale edits and reconstruct the requested shapes.

use anyhow::{Context, Result};
use ibl_core::{Iso3, Pt2, Pt3, Real, Rot3};
use ibl_linear::OrderedQuad;
use log::info;
use serde::{Deserialize, Serialize};

use crate::{
    reconstruct, scene::panorama_camera_pose, CalibrationConfig, CalibrationState, Edit,
    GroundReference, Shape, ShapeKind,
};

/// Markers selecting one shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShapeMarkers {
    pub kind: ShapeKind,
    pub markers: Vec<Pt2>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalibrationInput {
    /// Corners of a ground rectangle in boundary order (equirectangular UV).
    pub markers: Vec<Pt2>,

    /// Edits applied in order after the orientation is solved, e.g. a known
    /// camera height or plane width.
    #[serde(default)]
    pub edits: Vec<Edit>,

    #[serde(default)]
    pub shapes: Vec<ShapeMarkers>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalibrationReport {
    pub orientation: Rot3,
    /// XYZ Euler angles of `orientation`, radians.
    pub orientation_euler: [Real; 3],
    pub reference: GroundReference,
    pub camera_height: Real,
    pub plane_width: Real,
    pub plane_height: Real,
    /// Some edit produced a camera height outside its range.
    pub clamped: bool,
    pub floor_quad: [Pt3; 4],
    pub camera_pose: Iso3,
    pub shapes: Vec<Shape>,
}

/// Run the full calibration on `input`.
pub fn run_calibration(
    input: &CalibrationInput,
    config: &CalibrationConfig,
) -> Result<CalibrationReport> {
    let quad =
        OrderedQuad::try_from_markers(&input.markers).context("invalid calibration markers")?;

    let mut state = CalibrationState::default();
    let mut clamped = state
        .calibrate(&quad, config)
        .context("failed to solve orientation")?
        .clamped;

    for (i, edit) in input.edits.iter().enumerate() {
        let out = state
            .apply(*edit, config)
            .with_context(|| format!("edit {i} ({edit:?}) failed"))?;
        clamped |= out.clamped;
    }
    info!(
        "calibrated: camera height {:.4}, plane {:.4} x {:.4}",
        state.camera_height(),
        state.plane_width(),
        state.plane_height()
    );

    let shapes = input
        .shapes
        .iter()
        .enumerate()
        .map(|(i, s)| reconstruct(s.kind, &state, &s.markers).with_context(|| format!("shape {i}")))
        .collect::<Result<Vec<_>>>()?;

    Ok(CalibrationReport {
        orientation: *state.orientation(),
        orientation_euler: state.orientation_euler(),
        reference: state.reference(),
        camera_height: state.camera_height(),
        plane_width: state.plane_width(),
        plane_height: state.plane_height(),
        clamped,
        floor_quad: state.floor_quad()?,
        camera_pose: panorama_camera_pose(&state),
        shapes,
    })
}

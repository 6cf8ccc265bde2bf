//! Ground shapes from marker selections.
//!
//! Markers are equirectangular coordinates picked on the panorama. They are
//! projected onto the ground with the current calibration and handed to the
//! closed-form shape solvers.

use anyhow::{ensure, Context, Result};
use ibl_core::{equirect_to_sphere, sphere_to_ground, Pt2, Pt3};
use ibl_linear::{
    circle_through_points, polygon_from_points, rectangle_from_base_and_height,
    square_from_diagonal, CircleShape, PolygonShape, RectangleShape, SquareShape,
};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::CalibrationState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    /// Two markers on opposite corners.
    Square,
    /// Two markers on one side, a third anywhere on the opposite side.
    Rectangle,
    /// Three markers on the rim.
    Circle,
    /// Three or more markers; their convex hull.
    Polygon,
}

impl ShapeKind {
    /// Minimum number of markers.
    pub fn min_markers(self) -> usize {
        match self {
            Self::Square => 2,
            Self::Rectangle | Self::Circle | Self::Polygon => 3,
        }
    }

    /// Maximum number of markers, `None` if unbounded.
    pub fn max_markers(self) -> Option<usize> {
        match self {
            Self::Square => Some(2),
            Self::Rectangle | Self::Circle => Some(3),
            Self::Polygon => None,
        }
    }
}

/// A reconstructed ground shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Shape {
    Square(SquareShape),
    Rectangle(RectangleShape),
    Circle(CircleShape),
    Polygon(PolygonShape),
}

impl Shape {
    pub fn kind(&self) -> ShapeKind {
        match self {
            Self::Square(_) => ShapeKind::Square,
            Self::Rectangle(_) => ShapeKind::Rectangle,
            Self::Circle(_) => ShapeKind::Circle,
            Self::Polygon(_) => ShapeKind::Polygon,
        }
    }

    /// Outline vertices on the ground. Circles report their centre only.
    pub fn outline(&self) -> Vec<Pt3> {
        match self {
            Self::Square(s) => s.corners().to_vec(),
            Self::Rectangle(r) => r.corners().to_vec(),
            Self::Circle(c) => vec![c.center],
            Self::Polygon(p) => p.vertices.clone(),
        }
    }
}

/// Project markers onto the ground plane of `state`.
pub fn markers_to_ground(state: &CalibrationState, markers: &[Pt2]) -> Result<Vec<Pt3>> {
    markers
        .iter()
        .enumerate()
        .map(|(i, uv)| {
            let dir = equirect_to_sphere(uv);
            sphere_to_ground(&dir.into_inner(), state.orientation(), state.camera_height())
                .with_context(|| {
                    format!("marker {i} at ({:.4}, {:.4}) does not hit the ground", uv.x, uv.y)
                })
        })
        .collect()
}

/// Reconstruct a shape of `kind` from `markers`.
pub fn reconstruct(kind: ShapeKind, state: &CalibrationState, markers: &[Pt2]) -> Result<Shape> {
    let n = markers.len();
    ensure!(
        n >= kind.min_markers(),
        "{kind:?} needs at least {} markers, got {n}",
        kind.min_markers()
    );
    if let Some(max) = kind.max_markers() {
        ensure!(n <= max, "{kind:?} takes at most {max} markers, got {n}");
    }

    let p = markers_to_ground(state, markers)?;
    debug!("reconstructing {kind:?} from {n} ground points");

    let shape = match kind {
        ShapeKind::Square => Shape::Square(
            square_from_diagonal(&p[0], &p[1]).context("failed to build square")?,
        ),
        ShapeKind::Rectangle => Shape::Rectangle(
            rectangle_from_base_and_height(&p[0], &p[1], &p[2])
                .context("failed to build rectangle")?,
        ),
        ShapeKind::Circle => Shape::Circle(
            circle_through_points(&p[0], &p[1], &p[2]).context("failed to build circle")?,
        ),
        ShapeKind::Polygon => {
            Shape::Polygon(polygon_from_points(&p).context("failed to build polygon")?)
        }
    };
    Ok(shape)
}

//! Panorama orientation from a ground rectangle.
//!
//! The four corners of a rectangle lying on the ground are picked on the
//! panorama in boundary order. Each edge is a great circle on the sphere; the
//! two great circles of opposite edges meet at the edges' vanishing direction.
//! The vanishing directions of both edge pairs span the ground plane and their
//! cross product is the vertical.

use ibl_core::{
    equirect_to_sphere, try_normalize_rel, Dir3, Pt2, Real, Rot3, Vec3, DEFAULT_REL_TOL,
};
use log::debug;
use nalgebra::Matrix3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum OrientationError {
    #[error("need exactly 4 calibration markers, got {0}")]
    WrongMarkerCount(usize),
    #[error("calibration corner {0} has zero length")]
    DegenerateCorner(usize),
    #[error("corners {0} and {1} coincide or are antipodal")]
    DegenerateEdge(usize, usize),
    #[error("opposite edges {0} lie on the same great circle")]
    CoincidentEdges(&'static str),
    #[error("vanishing directions are parallel; corners do not span a rectangle")]
    DegenerateBasis,
}

/// Four sphere directions of a ground rectangle, traversed consecutively
/// around its boundary (`v0 → v1 → v2 → v3`).
///
/// The ordering is part of the contract: `v0 → v1` and `v3 → v2` are one pair
/// of opposite edges, `v1 → v2` and `v0 → v3` the other. Feeding corners in
/// any other order (for example a diagonal as the first edge) makes the solver
/// intersect the wrong great circles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "QuadRecord", into = "QuadRecord")]
pub struct OrderedQuad {
    corners: [Dir3; 4],
}

/// Serialized form of [`OrderedQuad`]. Corners are re-normalised on load.
#[derive(Serialize, Deserialize)]
struct QuadRecord {
    corners: [Vec3; 4],
}

impl TryFrom<QuadRecord> for OrderedQuad {
    type Error = OrientationError;

    fn try_from(record: QuadRecord) -> Result<Self, Self::Error> {
        Self::new(record.corners)
    }
}

impl From<OrderedQuad> for QuadRecord {
    fn from(quad: OrderedQuad) -> Self {
        Self {
            corners: quad.to_vectors(),
        }
    }
}

impl OrderedQuad {
    /// Build from (not necessarily unit) direction vectors.
    pub fn new(corners: [Vec3; 4]) -> Result<Self, OrientationError> {
        let mut dirs = [Dir3::new_unchecked(Vec3::x()); 4];
        for (i, c) in corners.iter().enumerate() {
            dirs[i] = try_normalize_rel(c, c.amax(), DEFAULT_REL_TOL)
                .ok_or(OrientationError::DegenerateCorner(i))?;
        }
        Ok(Self { corners: dirs })
    }

    /// Build from unit directions.
    pub fn from_directions(corners: [Dir3; 4]) -> Self {
        Self { corners }
    }

    /// Build from equirectangular markers.
    pub fn from_equirect(markers: [Pt2; 4]) -> Self {
        Self {
            corners: markers.map(|m| equirect_to_sphere(&m)),
        }
    }

    /// Build from a marker selection, which must hold exactly four markers.
    pub fn try_from_markers(markers: &[Pt2]) -> Result<Self, OrientationError> {
        let markers: [Pt2; 4] = markers
            .try_into()
            .map_err(|_| OrientationError::WrongMarkerCount(markers.len()))?;
        Ok(Self::from_equirect(markers))
    }

    pub fn corners(&self) -> &[Dir3; 4] {
        &self.corners
    }

    /// Corners as plain vectors.
    pub fn to_vectors(&self) -> [Vec3; 4] {
        self.corners.map(|c| c.into_inner())
    }
}

/// Closed-form orientation estimate from an [`OrderedQuad`].
#[derive(Debug, Clone, Copy)]
pub struct OrientationSolver;

/// Estimate the orientation whose rows are the rectangle's edge directions
/// and the vertical. See [`OrientationSolver::solve`].
pub fn estimate_orientation(quad: &OrderedQuad) -> Result<Rot3, OrientationError> {
    OrientationSolver::solve(quad)
}

impl OrientationSolver {
    /// Solve for the rotation mapping native panorama directions to the world.
    ///
    /// # Algorithm
    ///
    /// ```text
    /// pole_ab = normalize(va × vb)          for edges 01, 32, 03, 12
    /// axis_x  = normalize(pole_01 × pole_32)
    /// axis_y' = normalize(pole_12 × pole_03)
    /// axis_z  = normalize(axis_x × axis_y')
    /// axis_y  = normalize(axis_z × axis_x)
    /// ```
    ///
    /// The result has rows `(axis_x, axis_y, axis_z)`. If the rectangle ends
    /// up above the solved horizon, `axis_y` and `axis_z` are both negated so
    /// the ground lies below the camera and the matrix stays a proper
    /// rotation.
    ///
    /// # Errors
    ///
    /// Any cross product whose magnitude vanishes relative to its unit inputs
    /// is reported instead of producing NaNs.
    pub fn solve(quad: &OrderedQuad) -> Result<Rot3, OrientationError> {
        let v = quad.to_vectors();
        let unit = |w: Vec3, err: OrientationError| {
            try_normalize_rel(&w, 1.0, DEFAULT_REL_TOL)
                .map(|d| d.into_inner())
                .ok_or(err)
        };
        let pole =
            |a: usize, b: usize| unit(v[a].cross(&v[b]), OrientationError::DegenerateEdge(a, b));

        let pole_01 = pole(0, 1)?;
        let pole_32 = pole(3, 2)?;
        let pole_03 = pole(0, 3)?;
        let pole_12 = pole(1, 2)?;

        let axis_x = unit(pole_01.cross(&pole_32), OrientationError::CoincidentEdges("01/32"))?;
        let axis_y0 = unit(pole_12.cross(&pole_03), OrientationError::CoincidentEdges("12/03"))?;
        let axis_z = unit(axis_x.cross(&axis_y0), OrientationError::DegenerateBasis)?;
        let axis_y = unit(axis_z.cross(&axis_x), OrientationError::DegenerateBasis)?;

        let skew: Real = axis_x.dot(&axis_y0).clamp(-1.0, 1.0).asin();
        debug!(
            "orientation axes x={:?} y={:?} z={:?}, skew {:.4} deg",
            axis_x.as_slice(),
            axis_y.as_slice(),
            axis_z.as_slice(),
            skew.to_degrees()
        );

        let (axis_y, axis_z) = if axis_z.dot(&v[0]) > 0.0 {
            debug!("rectangle above the solved horizon, flipping vertical");
            (-axis_y, -axis_z)
        } else {
            (axis_y, axis_z)
        };

        let m = Matrix3::from_rows(&[
            axis_x.transpose(),
            axis_y.transpose(),
            axis_z.transpose(),
        ]);
        Ok(Rot3::from_matrix_unchecked(m))
    }
}

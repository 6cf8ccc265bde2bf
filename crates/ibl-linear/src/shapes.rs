//! Closed-form reconstruction of simple ground shapes.
//!
//! Inputs are ground-plane points (typically markers projected with
//! [`ibl_core::sphere_to_ground`]) in selection order. Rotations are signed
//! angles about `+Z`; the unit primitives the host instantiates are centred at
//! the origin with corners at `(±0.5, ±0.5, 0)`.

use ibl_core::{
    convex_hull_order, intersect_lines, is_negligible, point_to_line_distance, signed_angle_z, Pt2,
    Pt3, Real, Rot3, Vec3, DEFAULT_REL_TOL,
};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ShapeError {
    #[error("need at least {min} points, got {got}")]
    NotEnoughPoints { min: usize, got: usize },
    #[error("points {0} and {1} coincide")]
    CoincidentPoints(usize, usize),
    #[error("points are collinear")]
    CollinearPoints,
}

const UNIT_QUAD: [(Real, Real); 4] = [(0.5, 0.5), (-0.5, 0.5), (-0.5, -0.5), (0.5, -0.5)];

fn place_unit_quad(center: &Pt3, sx: Real, sy: Real, rotation: Real) -> [Pt3; 4] {
    let rot = Rot3::from_axis_angle(&Vector3::z_axis(), rotation);
    UNIT_QUAD.map(|(x, y)| center + rot * Vec3::new(x * sx, y * sy, 0.0))
}

fn check_distinct(points: &[Pt3], a: usize, b: usize) -> Result<(), ShapeError> {
    let d = (points[b] - points[a]).norm();
    let scale = points[a].coords.norm().max(points[b].coords.norm());
    if d == 0.0 || is_negligible(d, scale, DEFAULT_REL_TOL) {
        Err(ShapeError::CoincidentPoints(a, b))
    } else {
        Ok(())
    }
}

/// Counter-clockwise perpendicular of `p0 → p1` in the XY plane.
fn xy_perpendicular(p0: &Pt3, p1: &Pt3) -> Vec3 {
    Vec3::new(p0.y - p1.y, p1.x - p0.x, 0.0)
}

/// Square defined by one of its diagonals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SquareShape {
    pub center: Pt3,
    /// Side length (scale of the unit square).
    pub scale: Real,
    /// Rotation about `+Z`, radians.
    pub rotation: Real,
}

impl SquareShape {
    /// Corners of the placed unit square; the diagonal endpoints are corners
    /// 2 and 0.
    pub fn corners(&self) -> [Pt3; 4] {
        place_unit_quad(&self.center, self.scale, self.scale, self.rotation)
    }
}

/// Square whose opposite corners are `p0` and `p1`.
///
/// `center` is the diagonal midpoint, `scale = |diagonal| / √2` and
/// `rotation` is the signed angle from `(1, 1, 0)` to the diagonal.
pub fn square_from_diagonal(p0: &Pt3, p1: &Pt3) -> Result<SquareShape, ShapeError> {
    check_distinct(&[*p0, *p1], 0, 1)?;

    let diagonal = p1 - p0;
    Ok(SquareShape {
        center: p0 + diagonal * 0.5,
        scale: diagonal.norm() / Real::sqrt(2.0),
        rotation: signed_angle_z(&Vec3::new(1.0, 1.0, 0.0), &diagonal),
    })
}

/// Rectangle built on a base edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RectangleShape {
    pub center: Pt3,
    /// Length of the base edge.
    pub width: Real,
    /// Extent perpendicular to the base edge.
    pub height: Real,
    /// Rotation about `+Z` of the base edge, radians.
    pub rotation: Real,
}

impl RectangleShape {
    pub fn corners(&self) -> [Pt3; 4] {
        place_unit_quad(&self.center, self.width, self.height, self.rotation)
    }
}

/// Rectangle with base corners `p0`, `p1` and the opposite edge passing
/// through `p2`.
///
/// `width = |p1 - p0|`, `height` is the distance of `p2` from the base line,
/// and the centre is the base midpoint moved `height / 2` along the base's
/// perpendicular on the side of `p2`.
pub fn rectangle_from_base_and_height(
    p0: &Pt3,
    p1: &Pt3,
    p2: &Pt3,
) -> Result<RectangleShape, ShapeError> {
    check_distinct(&[*p0, *p1], 0, 1)?;

    let side = p1 - p0;
    let width = side.norm();
    let height = point_to_line_distance(p2, p0, p1);
    let scale = p0.coords.norm().max(p1.coords.norm()).max(p2.coords.norm());
    if is_negligible(height, scale.max(width), DEFAULT_REL_TOL) {
        return Err(ShapeError::CollinearPoints);
    }

    let mut normal = xy_perpendicular(p0, p1).normalize();
    if normal.dot(&(p2 - p0)) < 0.0 {
        normal = -normal;
    }
    let mid = p0 + side * 0.5;

    Ok(RectangleShape {
        center: mid + normal * (height * 0.5),
        width,
        height,
        rotation: signed_angle_z(&Vec3::x(), &side),
    })
}

/// Circle in the ground plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CircleShape {
    pub center: Pt3,
    pub radius: Real,
}

/// Circle through three points on its circumference.
///
/// The centre is the intersection of the perpendicular bisectors of
/// `(p0, p1)` and `(p1, p2)`.
///
/// # Errors
///
/// [`ShapeError::CollinearPoints`] when the bisectors are parallel, i.e. no
/// finite circle passes through the points.
pub fn circle_through_points(p0: &Pt3, p1: &Pt3, p2: &Pt3) -> Result<CircleShape, ShapeError> {
    let pts = [*p0, *p1, *p2];
    check_distinct(&pts, 0, 1)?;
    check_distinct(&pts, 1, 2)?;
    check_distinct(&pts, 0, 2)?;

    let m0 = p0 + (p1 - p0) * 0.5;
    let b0 = xy_perpendicular(p0, p1);
    let m1 = p1 + (p2 - p1) * 0.5;
    let b1 = xy_perpendicular(p1, p2);

    let center = intersect_lines(&m0, &b0, &m1, &b1).ok_or(ShapeError::CollinearPoints)?;
    Ok(CircleShape {
        center,
        radius: (p0 - center).norm(),
    })
}

/// Convex polygon on the ground.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolygonShape {
    /// Vertices in counter-clockwise hull order.
    pub vertices: Vec<Pt3>,
    /// Index of each vertex in the input selection.
    pub source_indices: Vec<usize>,
}

impl PolygonShape {
    /// Enclosed area (shoelace formula over XY).
    pub fn area(&self) -> Real {
        let n = self.vertices.len();
        let twice: Real = (0..n)
            .map(|i| {
                let a = &self.vertices[i];
                let b = &self.vertices[(i + 1) % n];
                a.x * b.y - b.x * a.y
            })
            .sum();
        0.5 * twice.abs()
    }
}

/// Polygon spanned by `points`, ordered along their convex hull.
///
/// Points inside the hull are left out.
pub fn polygon_from_points(points: &[Pt3]) -> Result<PolygonShape, ShapeError> {
    if points.len() < 3 {
        return Err(ShapeError::NotEnoughPoints {
            min: 3,
            got: points.len(),
        });
    }

    let xy: Vec<Pt2> = points.iter().map(|p| Pt2::new(p.x, p.y)).collect();
    let order = convex_hull_order(&xy);
    if order.len() < 3 {
        return Err(ShapeError::CollinearPoints);
    }

    Ok(PolygonShape {
        vertices: order.iter().map(|&i| points[i]).collect(),
        source_indices: order,
    })
}

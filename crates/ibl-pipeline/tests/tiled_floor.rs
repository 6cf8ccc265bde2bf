use ibl_core::{equirect_to_sphere, Real};
use ibl_linear::OrderedQuad;
use ibl_pipeline::{
    feedback::{axis_circle, reprojected_floor_quad, split_at_seam, Axis},
    run_calibration,
    scene::environment_uvs,
    CalibrationConfig, CalibrationInput, CalibrationState, Edit, GroundReference, Shape,
};
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct Expected {
    camera_height: Real,
    plane_width: Real,
    plane_height: Real,
    square_side: Real,
    rectangle_width: Real,
    rectangle_height: Real,
    circle_radius: Real,
    polygon_vertices: usize,
    polygon_area: Real,
}

#[derive(Debug, Deserialize)]
struct TiledFloor {
    input: CalibrationInput,
    expected: Expected,
}

fn load_data() -> TiledFloor {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join("tiled_floor.json");
    let contents = fs::read_to_string(&path).expect("read tiled_floor.json");
    serde_json::from_str(&contents).expect("parse tiled_floor.json")
}

const TOL: Real = 1e-7;

#[test]
fn report_matches_measured_floor() {
    let data = load_data();
    let report = run_calibration(&data.input, &CalibrationConfig::default()).unwrap();
    let e = &data.expected;

    assert!((report.camera_height - e.camera_height).abs() < TOL);
    assert!((report.plane_width - e.plane_width).abs() < TOL);
    assert!((report.plane_height - e.plane_height).abs() < TOL);

    // Solved frame: up is +Z and the floor quad is on the ground.
    let m = report.orientation.matrix();
    assert!((m.determinant() - 1.0).abs() < 1e-9);
    for p in &report.floor_quad {
        assert!(p.z.abs() < TOL);
    }
    assert!((report.camera_pose.translation.vector.z - e.camera_height).abs() < TOL);

    assert_eq!(report.shapes.len(), 4);
    for shape in &report.shapes {
        match shape {
            Shape::Square(s) => assert!((s.scale - e.square_side).abs() < TOL, "{s:?}"),
            Shape::Rectangle(r) => {
                assert!((r.width - e.rectangle_width).abs() < TOL, "{r:?}");
                assert!((r.height - e.rectangle_height).abs() < TOL, "{r:?}");
            }
            Shape::Circle(c) => assert!((c.radius - e.circle_radius).abs() < TOL, "{c:?}"),
            Shape::Polygon(p) => {
                assert_eq!(p.vertices.len(), e.polygon_vertices);
                assert!(!p.source_indices.contains(&3));
                assert!((p.area() - e.polygon_area).abs() < TOL);
            }
        }
    }
}

#[test]
fn interactive_session_stays_consistent() {
    let data = load_data();
    let config = CalibrationConfig::default();
    let quad = OrderedQuad::try_from_markers(&data.input.markers).unwrap();

    let mut state = CalibrationState::default();
    state.calibrate(&quad, &config).unwrap();

    // Known tile width pins the scale.
    state.apply(Edit::Reference(GroundReference::Object), &config).unwrap();
    state.apply(Edit::PlaneWidth(1.8), &config).unwrap();
    assert!((state.camera_height() - data.expected.camera_height).abs() < TOL);
    assert!((state.plane_height() - data.expected.plane_height).abs() < TOL);

    // Small re-orientation in object mode keeps the tile width.
    let nudged = *state.orientation() * ibl_core::Rot3::from_euler_angles(0.01, 0.0, 0.0);
    state.apply(Edit::Orientation(nudged), &config).unwrap();
    assert!((state.plane_width() - 1.8).abs() < TOL);

    // Back to camera mode: an explicit height now drives both dimensions.
    state.apply(Edit::Reference(GroundReference::Camera), &config).unwrap();
    let before = state.derived();
    state.apply(Edit::CameraHeight(2.0 * before.camera_height), &config).unwrap();
    assert!((state.plane_width() - 2.0 * before.plane_width).abs() < TOL);
    assert!((state.plane_height() - 2.0 * before.plane_height).abs() < TOL);
}

#[test]
fn feedback_curves_land_on_markers() {
    let data = load_data();
    let config = CalibrationConfig::default();
    let quad = OrderedQuad::try_from_markers(&data.input.markers).unwrap();
    let mut state = CalibrationState::default();
    state.calibrate(&quad, &config).unwrap();

    let edges = reprojected_floor_quad(&state, 12).unwrap();
    for (edge, marker) in edges.iter().zip(&data.input.markers) {
        let start = equirect_to_sphere(&edge[0]).into_inner();
        let want = equirect_to_sphere(marker).into_inner();
        assert!((start - want).norm() < TOL);
    }

    let uvs = environment_uvs(&state, &state.floor_quad().unwrap()).unwrap();
    for (uv, marker) in uvs.iter().zip(&data.input.markers) {
        let got = equirect_to_sphere(uv).into_inner();
        let want = equirect_to_sphere(marker).into_inner();
        assert!((got - want).norm() < TOL);
    }

    // The horizon is a closed curve; split parts cover every sample once.
    let horizon = axis_circle(state.orientation(), Axis::Z, 90);
    let parts = split_at_seam(&horizon);
    assert!(parts.len() <= 2);
    assert_eq!(parts.iter().map(Vec::len).sum::<usize>(), horizon.len());
}

use ibl_core::{
    sphere_to_ground,
    synthetic::{ground_rectangle, SyntheticPanorama, UniformUvNoise},
    Pt2, Pt3, Real, Rot3, Vec3,
};
use ibl_linear::{
    circle_through_points, estimate_orientation, rectangle_from_base_and_height, OrderedQuad,
};
use rand::{rngs::StdRng, Rng, SeedableRng};

fn tilt_angle(rot: &Rot3, truth: &Rot3) -> Real {
    // Angle between the solved up axis and the true one, both in the native frame.
    let up = rot.inverse() * Vec3::z();
    let up_true = truth.inverse() * Vec3::z();
    up.cross(&up_true).norm().atan2(up.dot(&up_true))
}

fn ground_points(quad: &OrderedQuad, rot: &Rot3, h: Real) -> Vec<Pt3> {
    quad.to_vectors()
        .iter()
        .map(|v| sphere_to_ground(v, rot, h).unwrap())
        .collect()
}

#[test]
fn exact_markers_recover_up_for_random_scenes() {
    let mut rng = StdRng::seed_from_u64(11);
    for _ in 0..100 {
        let truth = Rot3::from_euler_angles(
            rng.random_range(-0.3..0.3),
            rng.random_range(-0.3..0.3),
            rng.random_range(-3.0..3.0),
        );
        let h = rng.random_range(0.5..3.0);
        let center = Pt2::new(rng.random_range(1.5..4.0), rng.random_range(-1.0..1.0));
        let (w, d) = (rng.random_range(0.5..2.0), rng.random_range(0.5..2.0));
        let ground = ground_rectangle(center, w, d, rng.random_range(-1.0..1.0));

        let markers = SyntheticPanorama::new(truth, h).markers(&ground).unwrap();
        let quad = OrderedQuad::try_from_markers(&markers).unwrap();
        let rot = estimate_orientation(&quad).unwrap();

        assert!(tilt_angle(&rot, &truth) < 1e-8);
        let g = ground_points(&quad, &rot, h);
        assert!(((g[1] - g[0]).norm() - w).abs() < 1e-8);
        assert!(((g[2] - g[1]).norm() - d).abs() < 1e-8);
    }
}

#[test]
fn marker_noise_degrades_gracefully() {
    let truth = Rot3::from_euler_angles(0.08, -0.12, 0.4);
    let h = 1.6;
    let ground = ground_rectangle(Pt2::new(2.5, 0.3), 1.5, 1.5, 0.2);
    let clean = SyntheticPanorama::new(truth, h).markers(&ground).unwrap();

    for seed in 0..20 {
        // About one pixel on a 4k-wide panorama.
        let noise = UniformUvNoise {
            seed,
            max_abs: 2.5e-4,
        };
        let quad = OrderedQuad::try_from_markers(&noise.apply(&clean)).unwrap();
        let rot = estimate_orientation(&quad).unwrap();

        assert!(tilt_angle(&rot, &truth).to_degrees() < 1.0, "seed {seed}");
        let g = ground_points(&quad, &rot, h);
        let width = (g[1] - g[0]).norm();
        assert!((width - 1.5).abs() < 0.1, "seed {seed}: width {width}");
    }
}

#[test]
fn shapes_from_projected_markers() {
    let truth = Rot3::from_euler_angles(-0.05, 0.1, -0.7);
    let h = 1.2;
    let pano = SyntheticPanorama::new(truth, h);
    let ground = ground_rectangle(Pt2::new(2.0, 0.0), 1.0, 2.0, 0.0);
    let quad = OrderedQuad::try_from_markers(&pano.markers(&ground).unwrap()).unwrap();
    let rot = estimate_orientation(&quad).unwrap();

    let rim = [
        Pt3::new(1.0, 2.0, 0.0),
        Pt3::new(0.0, 3.0, 0.0),
        Pt3::new(-1.0, 2.0, 0.0),
    ];
    let dirs = pano.directions(&rim).unwrap();
    let p: Vec<Pt3> = dirs
        .iter()
        .map(|d| sphere_to_ground(&d.into_inner(), &rot, h).unwrap())
        .collect();
    let circle = circle_through_points(&p[0], &p[1], &p[2]).unwrap();
    assert!((circle.radius - 1.0).abs() < 1e-8);

    let rect = rectangle_from_base_and_height(&p[0], &p[2], &p[1]).unwrap();
    assert!((rect.width - 2.0).abs() < 1e-8);
    assert!((rect.height - 1.0).abs() < 1e-8);
}

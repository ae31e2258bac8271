use georef_core::{
    test_utils::{grid_real_points, max_abs_diff, SyntheticAffine},
    ImagePt, RealPt, ReferenceSet,
};
use georef_linear::{point_residuals, solve_affine, AffineError, ResidualSummary};
use rand::{rngs::StdRng, Rng, SeedableRng};

const TOL: f64 = 1e-6;

fn random_triangle(rng: &mut StdRng) -> [RealPt; 3] {
    loop {
        let pts: [RealPt; 3] = std::array::from_fn(|_| {
            RealPt::new(rng.random_range(-180.0..180.0), rng.random_range(-90.0..90.0))
        });
        let area = (pts[1].x - pts[0].x) * (pts[2].y - pts[0].y)
            - (pts[2].x - pts[0].x) * (pts[1].y - pts[0].y);
        if area.abs() > 10.0 {
            return pts;
        }
    }
}

fn random_affine(rng: &mut StdRng) -> SyntheticAffine {
    SyntheticAffine::new(
        rng.random_range(-3.0..3.0),
        rng.random_range(0.5..20.0),
        rng.random_range(0.5..20.0),
        rng.random_range(-500.0..2000.0),
        rng.random_range(-500.0..2000.0),
    )
}

#[test]
fn defining_points_round_trip() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..200 {
        let gt = random_affine(&mut rng);
        let set = gt.reference_set(&random_triangle(&mut rng));
        let t = solve_affine(&set).expect("non-collinear triple must solve");

        for p in set.iter() {
            let real = t.image_to_real(p.image);
            let image = t.real_to_image(p.real);
            assert!(
                max_abs_diff(real.to_pt2(), p.real.to_pt2()) < TOL,
                "image_to_real({}) = {}, expected {}",
                p.image,
                real,
                p.real
            );
            assert!(max_abs_diff(image.to_pt2(), p.image.to_pt2()) < TOL);
        }
    }
}

#[test]
fn forward_and_inverse_are_consistent() {
    let mut rng = StdRng::seed_from_u64(1_234_567);
    for _ in 0..100 {
        let gt = random_affine(&mut rng);
        let set = gt.reference_set(&random_triangle(&mut rng));
        let t = solve_affine(&set).unwrap();

        for _ in 0..20 {
            let q = RealPt::new(rng.random_range(-200.0..200.0), rng.random_range(-100.0..100.0));
            let back = t.image_to_real(t.real_to_image(q));
            assert!(max_abs_diff(back.to_pt2(), q.to_pt2()) < TOL);

            let qi = ImagePt::new(rng.random_range(0.0..4000.0), rng.random_range(0.0..3000.0));
            let back = t.real_to_image(t.image_to_real(qi));
            assert!(max_abs_diff(back.to_pt2(), qi.to_pt2()) < TOL);
        }
    }
}

#[test]
fn recovers_ground_truth_for_every_grid_point() {
    let gt = SyntheticAffine::new(0.3, 12.0, 9.0, 400.0, 250.0);
    let reals = grid_real_points(5, 4, 2.5, RealPt::new(-5.0, 10.0));
    let set = gt.reference_set(&reals);
    let t = solve_affine(&set).unwrap();

    let summary = ResidualSummary::from_residuals(&point_residuals(&t, set.as_slice()));
    assert_eq!(summary.count, 20);
    assert!(summary.max_image < TOL, "max image residual {}", summary.max_image);
    assert!(summary.max_real < TOL);
}

#[test]
fn collinear_never_yields_non_finite_coefficients() {
    let mut rng = StdRng::seed_from_u64(99);
    for _ in 0..100 {
        let origin = ImagePt::new(rng.random_range(0.0..1000.0), rng.random_range(0.0..1000.0));
        let dir = (rng.random_range(-1.0..1.0), rng.random_range(-1.0..1.0));
        let mut set = ReferenceSet::new();
        for (k, real) in [(0.0, (0.0, 0.0)), (3.0, (10.0, 0.0)), (7.0, (0.0, 10.0))] {
            let image = ImagePt::new(origin.x + k * dir.0, origin.y + k * dir.1);
            set.add(image, RealPt::from(real)).unwrap();
        }
        match solve_affine(&set) {
            Err(AffineError::Degenerate { .. }) => {}
            other => panic!("expected degenerate configuration, got {other:?}"),
        }
    }
}

#[test]
fn small_sets_are_unavailable() {
    let gt = SyntheticAffine::new(0.0, 1.0, 1.0, 0.0, 0.0);
    let reals = [RealPt::new(0.0, 0.0), RealPt::new(1.0, 0.0)];
    for n in 0..=2 {
        let set = gt.reference_set(&reals[..n]);
        assert_eq!(
            solve_affine(&set).unwrap_err(),
            AffineError::Unavailable { have: n }
        );
    }
}

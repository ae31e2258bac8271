//! Affine georeferencing from three reference points.
//!
//! The first three points of a [`ReferenceSet`] define two exact-fit affine
//! maps:
//!
//! - **forward** (real → image): `image = A_f · [real.x, real.y, 1]`
//! - **inverse** (image → real): `real = A_i · [image.x, image.y, 1]`
//!
//! Each map is two independent 3×3 linear systems sharing one design matrix
//! (rows `[u, v, 1]` of the source points), one right-hand side per output
//! axis. The design matrix is built from Hartley-normalized source points so
//! that the singularity threshold does not depend on coordinate magnitude;
//! the solved coefficients are mapped back to the original units.
//!
//! Points beyond the third do not influence the fit.

use crate::math::{affine_design_matrix, normalize_points_2d};
use georef_core::{
    ImagePt, Mat3, Pt2, Real, RealPt, ReferencePoint, ReferenceSet, Vec3, MIN_REFERENCE_POINTS,
};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Plane whose points act as the source of a fitted map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceSpace {
    Image,
    Real,
}

impl fmt::Display for SourceSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceSpace::Image => write!(f, "image"),
            SourceSpace::Real => write!(f, "real-world"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AffineError {
    /// Not enough reference points yet. Expected while calibrating.
    #[error("need at least 3 reference points, got {have}")]
    Unavailable { have: usize },
    /// The first three points are (nearly) collinear in `space`.
    #[error("degenerate configuration: first three {space} points are collinear (conditioned det {det:e})")]
    Degenerate { space: SourceSpace, det: Real },
}

impl AffineError {
    /// `true` for the "no transform yet" state.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, AffineError::Unavailable { .. })
    }
}

/// `out = a·u + b·v + c`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AffineCoefficients {
    pub a: Real,
    pub b: Real,
    pub c: Real,
}

impl AffineCoefficients {
    pub const fn new(a: Real, b: Real, c: Real) -> Self {
        Self { a, b, c }
    }

    pub fn apply(&self, u: Real, v: Real) -> Real {
        self.a * u + self.b * v + self.c
    }

    pub fn is_finite(&self) -> bool {
        self.a.is_finite() && self.b.is_finite() && self.c.is_finite()
    }

    fn from_vec3(v: &Vec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

/// Forward and inverse affine maps between image and real-world planes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AffineTransform {
    /// Real → image, x output.
    pub forward_x: AffineCoefficients,
    /// Real → image, y output.
    pub forward_y: AffineCoefficients,
    /// Image → real, x output.
    pub inverse_x: AffineCoefficients,
    /// Image → real, y output.
    pub inverse_y: AffineCoefficients,
}

impl AffineTransform {
    /// Map a real-world point to image pixels.
    pub fn real_to_image(&self, p: RealPt) -> ImagePt {
        ImagePt::new(
            self.forward_x.apply(p.x, p.y),
            self.forward_y.apply(p.x, p.y),
        )
    }

    /// Map an image pixel to real-world coordinates.
    pub fn image_to_real(&self, p: ImagePt) -> RealPt {
        RealPt::new(
            self.inverse_x.apply(p.x, p.y),
            self.inverse_y.apply(p.x, p.y),
        )
    }

    /// Homogeneous 3×3 form of the real → image map.
    pub fn forward_matrix(&self) -> Mat3 {
        homogeneous(&self.forward_x, &self.forward_y)
    }

    /// Homogeneous 3×3 form of the image → real map.
    pub fn inverse_matrix(&self) -> Mat3 {
        homogeneous(&self.inverse_x, &self.inverse_y)
    }
}

fn homogeneous(x: &AffineCoefficients, y: &AffineCoefficients) -> Mat3 {
    Mat3::new(x.a, x.b, x.c, y.a, y.b, y.c, 0.0, 0.0, 1.0)
}

/// Solver options.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AffineSolveOptions {
    /// Smallest accepted `|det|` of the conditioned design matrix.
    ///
    /// With Hartley normalization a well-spread triangle has `|det|` of
    /// order one; the value shrinks towards zero as the triangle flattens.
    pub min_conditioned_det: Real,
}

impl Default for AffineSolveOptions {
    fn default() -> Self {
        Self {
            min_conditioned_det: 1e-6,
        }
    }
}

/// High-level entry point for affine estimation.
#[derive(Debug, Clone, Copy)]
pub struct AffineSolver;

/// Solve the affine transform from the first three points of `set` using
/// default options.
pub fn solve_affine(set: &ReferenceSet) -> Result<AffineTransform, AffineError> {
    AffineSolver::solve(set.as_slice(), &AffineSolveOptions::default())
}

/// Real → image mapping with a solved transform.
pub fn map_real_to_image(transform: &AffineTransform, real: RealPt) -> ImagePt {
    transform.real_to_image(real)
}

/// Image → real mapping with a solved transform.
pub fn map_image_to_real(transform: &AffineTransform, image: ImagePt) -> RealPt {
    transform.image_to_real(image)
}

impl AffineSolver {
    /// Fit forward and inverse maps from `points[0..3]`.
    ///
    /// # Errors
    ///
    /// - [`AffineError::Unavailable`] when fewer than three points exist.
    /// - [`AffineError::Degenerate`] when the three points are collinear in
    ///   either plane.
    pub fn solve(
        points: &[ReferencePoint],
        opts: &AffineSolveOptions,
    ) -> Result<AffineTransform, AffineError> {
        if points.len() < MIN_REFERENCE_POINTS {
            debug!(
                "affine transform unavailable: {} of {} reference points",
                points.len(),
                MIN_REFERENCE_POINTS
            );
            return Err(AffineError::Unavailable { have: points.len() });
        }

        let basis = &points[..MIN_REFERENCE_POINTS];
        let image: [Pt2; 3] = std::array::from_fn(|i| basis[i].image.to_pt2());
        let real: [Pt2; 3] = std::array::from_fn(|i| basis[i].real.to_pt2());

        let (forward_x, forward_y) = Self::fit_axes(&real, &image, SourceSpace::Real, opts)?;
        let (inverse_x, inverse_y) = Self::fit_axes(&image, &real, SourceSpace::Image, opts)?;

        Ok(AffineTransform {
            forward_x,
            forward_y,
            inverse_x,
            inverse_y,
        })
    }

    /// Solve `M · c = dst_axis` for both output axes, where `M` has rows
    /// `[src.x, src.y, 1]`.
    fn fit_axes(
        src: &[Pt2; 3],
        dst: &[Pt2; 3],
        space: SourceSpace,
        opts: &AffineSolveOptions,
    ) -> Result<(AffineCoefficients, AffineCoefficients), AffineError> {
        let degenerate = |det: Real| {
            warn!("{space} reference points are collinear (conditioned det {det:e})");
            AffineError::Degenerate { space, det }
        };

        let (norm, t) = normalize_points_2d(src).ok_or_else(|| degenerate(0.0))?;
        let norm: [Pt2; 3] = [norm[0], norm[1], norm[2]];

        let m = affine_design_matrix(&norm);
        let det = m.determinant();
        if !det.is_finite() || det.abs() < opts.min_conditioned_det {
            return Err(degenerate(det));
        }
        let m_inv = m.try_inverse().ok_or_else(|| degenerate(det))?;

        // Normalized rows are (T p)^T, so coefficients in source units are T^T c_n.
        let t_tr = t.transpose();
        let cx = t_tr * (m_inv * Vec3::new(dst[0].x, dst[1].x, dst[2].x));
        let cy = t_tr * (m_inv * Vec3::new(dst[0].y, dst[1].y, dst[2].y));

        let cx = AffineCoefficients::from_vec3(&cx);
        let cy = AffineCoefficients::from_vec3(&cy);
        if !cx.is_finite() || !cy.is_finite() {
            return Err(degenerate(det));
        }
        Ok((cx, cy))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use georef_core::test_utils::SyntheticAffine;

    fn scenario() -> ReferenceSet {
        let mut set = ReferenceSet::new();
        set.add(ImagePt::new(10.0, 10.0), RealPt::new(0.0, 0.0))
            .unwrap();
        set.add(ImagePt::new(110.0, 10.0), RealPt::new(100.0, 0.0))
            .unwrap();
        set.add(ImagePt::new(10.0, 110.0), RealPt::new(0.0, 100.0))
            .unwrap();
        set
    }

    #[test]
    fn scenario_maps_both_ways() {
        let t = solve_affine(&scenario()).unwrap();

        let real = map_image_to_real(&t, ImagePt::new(60.0, 60.0));
        assert!((real.x - 50.0).abs() < 1e-9);
        assert!((real.y - 50.0).abs() < 1e-9);

        let img = map_real_to_image(&t, RealPt::new(50.0, 50.0));
        assert!((img.x - 60.0).abs() < 1e-9);
        assert!((img.y - 60.0).abs() < 1e-9);

        assert!((t.forward_x.a - 1.0).abs() < 1e-12);
        assert!((t.forward_x.c - 10.0).abs() < 1e-9);
        assert!((t.inverse_y.c + 10.0).abs() < 1e-9);
    }

    #[test]
    fn unavailable_below_three_points() {
        let full = scenario();
        for n in 0..3 {
            let err = AffineSolver::solve(&full.as_slice()[..n], &AffineSolveOptions::default())
                .unwrap_err();
            assert_eq!(err, AffineError::Unavailable { have: n });
            assert!(err.is_unavailable());
        }
    }

    #[test]
    fn collinear_image_points_are_degenerate() {
        let mut set = ReferenceSet::new();
        set.add(ImagePt::new(0.0, 0.0), RealPt::new(0.0, 0.0))
            .unwrap();
        set.add(ImagePt::new(1.0, 1.0), RealPt::new(10.0, 0.0))
            .unwrap();
        set.add(ImagePt::new(2.0, 2.0), RealPt::new(0.0, 10.0))
            .unwrap();
        let err = solve_affine(&set).unwrap_err();
        assert!(matches!(
            err,
            AffineError::Degenerate {
                space: SourceSpace::Image,
                ..
            }
        ));
        assert!(!err.is_unavailable());
    }

    #[test]
    fn collinear_real_points_are_degenerate() {
        let mut set = ReferenceSet::new();
        set.add(ImagePt::new(0.0, 0.0), RealPt::new(5.0, 5.0))
            .unwrap();
        set.add(ImagePt::new(10.0, 0.0), RealPt::new(6.0, 7.0))
            .unwrap();
        set.add(ImagePt::new(0.0, 10.0), RealPt::new(7.0, 9.0))
            .unwrap();
        assert!(matches!(
            solve_affine(&set),
            Err(AffineError::Degenerate {
                space: SourceSpace::Real,
                ..
            })
        ));
    }

    #[test]
    fn nearly_collinear_is_rejected() {
        let mut set = ReferenceSet::new();
        set.add(ImagePt::new(0.0, 0.0), RealPt::new(0.0, 0.0))
            .unwrap();
        set.add(ImagePt::new(1000.0, 0.0), RealPt::new(1.0, 0.0))
            .unwrap();
        set.add(ImagePt::new(500.0, 1e-10), RealPt::new(0.5, 1.0))
            .unwrap();
        assert!(solve_affine(&set).is_err());
    }

    #[test]
    fn sliver_triangle_rejected_by_default_threshold() {
        let pts: Vec<ReferencePoint> = {
            let mut set = ReferenceSet::new();
            set.add(ImagePt::new(0.0, 0.0), RealPt::new(0.0, 0.0))
                .unwrap();
            set.add(ImagePt::new(1000.0, 0.0), RealPt::new(1.0, 0.0))
                .unwrap();
            set.add(ImagePt::new(500.0, 1e-5), RealPt::new(0.5, 1.0))
                .unwrap();
            set.as_slice().to_vec()
        };
        let err = AffineSolver::solve(&pts, &AffineSolveOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            AffineError::Degenerate {
                space: SourceSpace::Image,
                ..
            }
        ));

        let loose = AffineSolveOptions {
            min_conditioned_det: 1e-9,
        };
        assert!(AffineSolver::solve(&pts, &loose).is_ok());
    }

    #[test]
    fn coincident_points_are_degenerate() {
        let mut set = ReferenceSet::new();
        for r in [(0.0, 0.0), (1.0, 0.0), (0.0, 1.0)] {
            set.add(ImagePt::new(5.0, 5.0), RealPt::from(r)).unwrap();
        }
        assert!(matches!(
            solve_affine(&set),
            Err(AffineError::Degenerate { det, .. }) if det == 0.0
        ));
    }

    #[test]
    fn large_offsets_do_not_trip_threshold() {
        // Projected metres: 100 m triangle far from the origin.
        let mut set = ReferenceSet::new();
        set.add(ImagePt::new(0.0, 0.0), RealPt::new(500_000.0, 4_000_000.0))
            .unwrap();
        set.add(ImagePt::new(1000.0, 0.0), RealPt::new(500_100.0, 4_000_000.0))
            .unwrap();
        set.add(ImagePt::new(0.0, 1000.0), RealPt::new(500_000.0, 3_999_900.0))
            .unwrap();
        let t = solve_affine(&set).unwrap();
        let r = t.image_to_real(ImagePt::new(500.0, 500.0));
        assert!((r.x - 500_050.0).abs() < 1e-6);
        assert!((r.y - 3_999_950.0).abs() < 1e-6);
    }

    #[test]
    fn only_first_three_points_are_used() {
        let mut set = scenario();
        set.add(ImagePt::new(999.0, 999.0), RealPt::new(-5.0, 7.0))
            .unwrap();
        let t_all = solve_affine(&set).unwrap();
        let t_three = solve_affine(&scenario()).unwrap();
        assert_eq!(t_all, t_three);
    }

    #[test]
    fn matrices_are_mutual_inverses() {
        let gt = SyntheticAffine::new(0.4, 3.0, 2.0, 120.0, -40.0);
        let set = gt.reference_set(&[
            RealPt::new(0.0, 0.0),
            RealPt::new(10.0, 1.0),
            RealPt::new(-2.0, 8.0),
        ]);
        let t = solve_affine(&set).unwrap();
        let prod = t.forward_matrix() * t.inverse_matrix();
        assert!((prod - Mat3::identity()).abs().max() < 1e-9);
        assert!((t.forward_matrix() - gt.real_to_image).abs().max() < 1e-9);
    }

    #[test]
    fn options_deserialize_with_defaults() {
        let opts: AffineSolveOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(opts, AffineSolveOptions::default());
    }
}

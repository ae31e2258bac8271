//! Utilities and common types for testing georeferencing algorithms.
//!
//! This module is public to allow use across workspace test suites,
//! but is not intended for production use.

use crate::{to_homogeneous, ImagePt, Mat3, Pt2, RealPt, ReferenceSet, Real};

/// Known real→image affine map used to synthesize reference points.
///
/// Stored as a homogeneous 3×3 matrix whose last row is `[0, 0, 1]`.
#[derive(Debug, Clone, Copy)]
pub struct SyntheticAffine {
    pub real_to_image: Mat3,
}

impl SyntheticAffine {
    /// Rotation by `angle` (radians), anisotropic scale, then translation.
    pub fn new(angle: Real, scale_x: Real, scale_y: Real, tx: Real, ty: Real) -> Self {
        let (s, c) = angle.sin_cos();
        let real_to_image = Mat3::new(
            c * scale_x,
            -s * scale_y,
            tx,
            s * scale_x,
            c * scale_y,
            ty,
            0.0,
            0.0,
            1.0,
        );
        Self { real_to_image }
    }

    /// Image location of a real-world point under this map.
    pub fn project(&self, real: RealPt) -> ImagePt {
        let v = self.real_to_image * to_homogeneous(&real.to_pt2());
        ImagePt::new(v.x, v.y)
    }

    /// Reference set with one pair per real-world point.
    pub fn reference_set(&self, reals: &[RealPt]) -> ReferenceSet {
        let mut set = ReferenceSet::new();
        let report = set.bulk_load(reals.iter().map(|r| (self.project(*r), *r)));
        debug_assert!(report.skipped.is_empty());
        set
    }
}

/// Regular grid of real-world points, row-major.
pub fn grid_real_points(cols: usize, rows: usize, spacing: Real, origin: RealPt) -> Vec<RealPt> {
    let mut pts = Vec::with_capacity(cols * rows);
    for j in 0..rows {
        for i in 0..cols {
            pts.push(RealPt::new(
                origin.x + i as Real * spacing,
                origin.y + j as Real * spacing,
            ));
        }
    }
    pts
}

/// Maximum absolute component difference between two untagged points.
pub fn max_abs_diff(a: Pt2, b: Pt2) -> Real {
    (a.x - b.x).abs().max((a.y - b.y).abs())
}

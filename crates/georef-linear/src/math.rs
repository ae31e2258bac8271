//! Numerical conditioning helpers for the linear solvers.
//!
//! # Hartley Normalization
//!
//! Normalizing points before building a design matrix centers the data and
//! scales it to a fixed mean distance. Real-world coordinates are often large
//! offsets with small spreads (projected metres around 5e5, or degrees with
//! sub-degree extents); conditioning makes determinant thresholds meaningful
//! regardless of the units involved.
//!
//! # Example
//!
//! ```
//! use georef_linear::math::normalize_points_2d;
//! use georef_core::Pt2;
//!
//! let points = vec![
//!     Pt2::new(100.0, 200.0),
//!     Pt2::new(150.0, 250.0),
//!     Pt2::new(120.0, 220.0),
//! ];
//!
//! let (normalized, transform) = normalize_points_2d(&points).unwrap();
//! // normalized points have mean at origin, mean distance = sqrt(2)
//! ```

use georef_core::{Mat3, Pt2, Real};

/// Hartley normalization for 2D points.
///
/// Centers points at the origin and scales so that the mean distance from
/// the origin is `√2`.
///
/// # Returns
///
/// * `Some((normalized_points, transform_matrix))` - Normalized points and
///   the 3x3 transformation matrix `T` such that `p_norm = T * p_homogeneous`
/// * `None` - If input is empty, contains non-finite values, or all points
///   coincide (zero mean distance)
///
/// # References
///
/// Hartley & Zisserman, "Multiple View Geometry in Computer Vision", 2nd ed.,
/// Algorithm 4.2 (Normalized DLT)
pub fn normalize_points_2d(points: &[Pt2]) -> Option<(Vec<Pt2>, Mat3)> {
    if points.is_empty() {
        return None;
    }

    let n = points.len() as Real;
    let mut cx = 0.0;
    let mut cy = 0.0;
    for p in points {
        cx += p.x;
        cy += p.y;
    }
    cx /= n;
    cy /= n;

    let mut mean_dist = 0.0;
    for p in points {
        let dx = p.x - cx;
        let dy = p.y - cy;
        mean_dist += (dx * dx + dy * dy).sqrt();
    }
    mean_dist /= n;

    if !mean_dist.is_finite() || mean_dist <= Real::EPSILON * (cx.abs() + cy.abs()).max(1.0) {
        return None;
    }

    let scale = (2.0_f64).sqrt() / mean_dist;
    let t = Mat3::new(
        scale,
        0.0,
        -scale * cx,
        0.0,
        scale,
        -scale * cy,
        0.0,
        0.0,
        1.0,
    );

    let norm = points
        .iter()
        .map(|p| Pt2::new((p.x - cx) * scale, (p.y - cy) * scale))
        .collect();

    Some((norm, t))
}

/// Design matrix with rows `[x, y, 1]` for three points.
pub fn affine_design_matrix(points: &[Pt2; 3]) -> Mat3 {
    Mat3::new(
        points[0].x,
        points[0].y,
        1.0,
        points[1].x,
        points[1].y,
        1.0,
        points[2].x,
        points[2].y,
        1.0,
    )
}

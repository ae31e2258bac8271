//! Mathematical utilities and type definitions.
//!
//! This module provides the scalar and matrix types used throughout the
//! workspace and the homogeneous lift used by the affine design matrix.

use nalgebra::{Matrix3, Point2, Vector3};

/// Scalar type used throughout the library (currently `f64`).
pub type Real = f64;

/// 3D vector with [`Real`] components.
pub type Vec3 = Vector3<Real>;
/// Untagged 2D point with [`Real`] coordinates.
///
/// Prefer [`ImagePt`](crate::ImagePt) / [`RealPt`](crate::RealPt) at API
/// boundaries; `Pt2` is for plane-agnostic numeric helpers.
pub type Pt2 = Point2<Real>;
/// 3×3 matrix with [`Real`] entries.
pub type Mat3 = Matrix3<Real>;

/// Convert a 2D point in Euclidean coordinates into homogeneous coordinates.
///
/// Given a point `p = (x, y)`, returns the homogeneous vector `(x, y, 1)`.
pub fn to_homogeneous(p: &Pt2) -> Vec3 {
    Vec3::new(p.x, p.y, 1.0)
}

//! Core types for `georef-rs`.
//!
//! This crate contains:
//! - linear algebra type aliases (`Real`, `Pt2`, `Mat3`, ...),
//! - tagged coordinates for the two planes involved in georeferencing
//!   ([`ImagePt`] in pixels and [`RealPt`] in world units),
//! - the ordered calibration store ([`ReferenceSet`]) with stable
//!   [`PointId`] handles,
//! - image metadata and display scaling helpers ([`ImageInfo`], [`ViewScale`]).
//!
//! Mapping pipeline:
//! `real = inverse(image)`, `image = forward(real)`, both affine and derived
//! from the first three reference points (see `georef-linear`).

/// Linear algebra type aliases and helpers.
pub mod math;
/// Shared helpers for tests across the workspace.
pub mod test_utils;
/// Coordinates, reference points and the reference set.
pub mod types;
/// Image metadata and viewport scaling.
pub mod view;

pub use math::*;
pub use types::*;
pub use view::*;

//! Tagged 2D coordinates.
//!
//! Image pixels and real-world positions are both pairs of reals, but they
//! live on different planes with unrelated units. Keeping them in distinct
//! types means a pixel can never be passed where a world coordinate is
//! expected.

use crate::{Pt2, Real};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A location on the image plane, in pixels.
///
/// Origin is the top-left corner of the full-resolution image; `x` grows to
/// the right (column) and `y` grows downwards (row). Independent of any
/// display scaling applied by the host.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ImagePt {
    pub x: Real,
    pub y: Real,
}

/// A location in the real-world coordinate system (e.g. longitude/latitude
/// in decimal degrees, or projected metres).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RealPt {
    pub x: Real,
    pub y: Real,
}

macro_rules! tagged_point {
    ($ty:ident, $label:literal) => {
        impl $ty {
            pub const fn new(x: Real, y: Real) -> Self {
                Self { x, y }
            }

            /// Drop the tag for plane-agnostic numeric work.
            pub fn to_pt2(self) -> Pt2 {
                Pt2::new(self.x, self.y)
            }

            /// Re-tag an untagged point.
            pub fn from_pt2(p: Pt2) -> Self {
                Self::new(p.x, p.y)
            }

            /// Both components are finite numbers.
            pub fn is_finite(&self) -> bool {
                self.x.is_finite() && self.y.is_finite()
            }

            /// Euclidean distance to another point on the same plane.
            pub fn distance(&self, other: &Self) -> Real {
                (self.x - other.x).hypot(self.y - other.y)
            }
        }

        impl From<(Real, Real)> for $ty {
            fn from((x, y): (Real, Real)) -> Self {
                Self::new(x, y)
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($label, "({}, {})"), self.x, self.y)
            }
        }
    };
}

tagged_point!(ImagePt, "image");
tagged_point!(RealPt, "real");

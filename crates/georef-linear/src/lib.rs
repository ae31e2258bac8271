//! Closed-form solvers for `georef-rs`.
//!
//! - [`AffineSolver`]: exact-fit forward/inverse affine maps from the first
//!   three reference points.
//! - [`point_residuals`]: agreement of every stored point with a solved map.
//! - [`math`]: conditioning helpers shared by the solvers.

mod affine;
pub mod math;
mod residual;

pub use affine::*;
pub use residual::*;

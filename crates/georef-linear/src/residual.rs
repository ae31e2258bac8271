//! Per-point agreement with a solved transform.
//!
//! The three defining points fit exactly; residuals of later points show how
//! far the user's extra calibration data disagrees with that fit.

use crate::AffineTransform;
use georef_core::{PointId, Real, ReferencePoint};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointResidual {
    pub id: PointId,
    /// Distance in pixels between the stored image point and the forward
    /// projection of its real-world point.
    pub image_error: Real,
    /// Distance in real-world units between the stored real point and the
    /// inverse projection of its image point.
    pub real_error: Real,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ResidualSummary {
    pub count: usize,
    pub rms_image: Real,
    pub max_image: Real,
    pub rms_real: Real,
    pub max_real: Real,
}

/// Residuals for every point, in input order.
pub fn point_residuals(transform: &AffineTransform, points: &[ReferencePoint]) -> Vec<PointResidual> {
    points
        .iter()
        .map(|p| PointResidual {
            id: p.id,
            image_error: transform.real_to_image(p.real).distance(&p.image),
            real_error: transform.image_to_real(p.image).distance(&p.real),
        })
        .collect()
}

impl ResidualSummary {
    pub fn from_residuals(residuals: &[PointResidual]) -> Self {
        if residuals.is_empty() {
            return Self::default();
        }
        let n = residuals.len() as Real;
        let mut sum_img = 0.0;
        let mut sum_real = 0.0;
        let mut max_image: Real = 0.0;
        let mut max_real: Real = 0.0;
        for r in residuals {
            sum_img += r.image_error * r.image_error;
            sum_real += r.real_error * r.real_error;
            max_image = max_image.max(r.image_error);
            max_real = max_real.max(r.real_error);
        }
        Self {
            count: residuals.len(),
            rms_image: (sum_img / n).sqrt(),
            max_image,
            rms_real: (sum_real / n).sqrt(),
            max_real,
        }
    }
}

//! Image metadata and display scaling.

use crate::{ImagePt, Real};
use serde::{Deserialize, Serialize};

/// Dimensions of the loaded raster, in pixels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    /// Where the image came from (file name, URL), if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl ImageInfo {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            source: None,
        }
    }

    pub fn with_source(width: u32, height: u32, source: impl Into<String>) -> Self {
        Self {
            width,
            height,
            source: Some(source.into()),
        }
    }

    /// Whether `p` lies on the image (`0 <= x < width`, `0 <= y < height`).
    pub fn contains(&self, p: &ImagePt) -> bool {
        p.x >= 0.0 && p.y >= 0.0 && p.x < Real::from(self.width) && p.y < Real::from(self.height)
    }
}

/// Uniform scale between image pixels and display pixels.
///
/// Hosts draw the image shrunk (or enlarged) to fit a viewport; pointer
/// positions arrive in display pixels and must be divided by the scale
/// before they are stored as [`ImagePt`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewScale {
    pub scale: Real,
}

impl Default for ViewScale {
    fn default() -> Self {
        Self { scale: 1.0 }
    }
}

impl ViewScale {
    /// Largest uniform scale that fits `image` into `max_width × max_height`.
    ///
    /// Returns `None` for empty images or non-positive viewports.
    pub fn fit(image: &ImageInfo, max_width: Real, max_height: Real) -> Option<Self> {
        if image.width == 0 || image.height == 0 || max_width <= 0.0 || max_height <= 0.0 {
            return None;
        }
        let scale = (max_width / Real::from(image.width)).min(max_height / Real::from(image.height));
        Some(Self { scale })
    }

    /// Size of the scaled image on the display.
    pub fn display_size(&self, image: &ImageInfo) -> (Real, Real) {
        (
            Real::from(image.width) * self.scale,
            Real::from(image.height) * self.scale,
        )
    }

    /// Convert a display position (relative to the drawn image's top-left)
    /// to image pixels.
    pub fn to_image(&self, display_x: Real, display_y: Real) -> ImagePt {
        ImagePt::new(display_x / self.scale, display_y / self.scale)
    }

    /// Convert image pixels to a display position.
    pub fn to_display(&self, p: &ImagePt) -> (Real, Real) {
        (p.x * self.scale, p.y * self.scale)
    }
}

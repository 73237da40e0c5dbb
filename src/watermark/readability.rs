//! Base dimension selection and readability limits.
//!
//! Both functions depend only on the image dimensions. They supply the
//! defaults that keep a watermark legible on a thumbnail and unobtrusive on
//! a poster-sized image.

use serde::{Deserialize, Serialize};

use super::config::BaseOn;
use super::position::ImageDimensions;
use crate::config::defaults;

/// Font size bounds derived from image area.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReadabilityLimits {
    pub min_size: f64,
    pub max_size: f64,
}

impl ReadabilityLimits {
    /// Clamp a font size into the limits.
    ///
    /// The floor is applied first and the ceiling last, so when the limits
    /// cross (`min_size > max_size`, as on very small images) the ceiling wins.
    /// `f64::clamp` would panic in that case.
    pub fn apply(&self, size: f64) -> f64 {
        size.max(self.min_size).min(self.max_size)
    }
}

/// Pick the scaling baseline from the aspect ratio.
///
/// Ultra-wide images (> 1.8) scale from the height and ultra-tall images
/// (< 0.6) from the width; anything in between uses the shorter edge.
pub fn choose_base_dimension(dimensions: &ImageDimensions) -> BaseOn {
    let aspect_ratio = dimensions.aspect_ratio();

    if aspect_ratio > defaults::WIDE_ASPECT_RATIO {
        BaseOn::Height
    } else if aspect_ratio < defaults::TALL_ASPECT_RATIO {
        BaseOn::Width
    } else {
        BaseOn::ShorterEdge
    }
}

/// Length in pixels of the chosen baseline.
pub fn base_dimension(dimensions: &ImageDimensions, base_on: BaseOn) -> f64 {
    match base_on {
        BaseOn::Width => f64::from(dimensions.width),
        BaseOn::Height => f64::from(dimensions.height),
        BaseOn::ShorterEdge => f64::from(dimensions.width.min(dimensions.height)),
    }
}

/// Default font size bounds for an image.
///
/// `scale = sqrt(area) / 1000`, `min = max(12, round(scale * 8))`,
/// `max = min(200, round(scale * 60))`.
pub fn readability_limits(dimensions: &ImageDimensions) -> ReadabilityLimits {
    let scale_factor = (dimensions.area() as f64).sqrt() / defaults::READABILITY_NORMALIZER;

    ReadabilityLimits {
        min_size: defaults::READABILITY_MIN_FLOOR
            .max((scale_factor * defaults::READABILITY_MIN_FACTOR).round()),
        max_size: defaults::READABILITY_MAX_CEILING
            .min((scale_factor * defaults::READABILITY_MAX_FACTOR).round()),
    }
}

//! Adaptive watermark sizing.
//!
//! [`calculate_adaptive_watermark_size`] turns a watermark config and the
//! dimensions of one image into concrete pixel sizes and margins.
//!
//! # Scale modes
//!
//! - **percentage** / **adaptive**: size follows a base dimension of the
//!   image (`base * scale_ratio`), bounded by readability limits for text
//! - **fixed**: size comes straight from the style, identical on every image
//!
//! Full-screen watermarks are sized by the tiling calculator instead.
//!
//! # Example
//!
//! ```
//! use markscale::watermark::scaling::calculate_adaptive_watermark_size;
//! use markscale::watermark::{ImageDimensions, WatermarkConfig};
//!
//! let config = WatermarkConfig::text("© 2024");
//! let result = calculate_adaptive_watermark_size(&config, &ImageDimensions::new(1920, 1080), None).unwrap();
//! assert_eq!(result.font_size, Some(54.0));
//! ```

use serde::{Deserialize, Serialize};

use super::config::{
    estimated_text_length, AdaptiveConfig, ImageStyle, ScaleMode, TextStyle, WatermarkConfig,
    WatermarkKind,
};
use super::position::{ImageDimensions, WatermarkSize};
use super::readability::{base_dimension, choose_base_dimension, readability_limits};
use super::WatermarkError;
use crate::config::defaults;

/// Computed size of a watermark on one image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScalingResult {
    /// Set for text watermarks only
    pub font_size: Option<f64>,
    pub width: f64,
    pub height: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    pub margin_x: f64,
    pub margin_y: f64,
}

impl ScalingResult {
    pub fn size(&self) -> WatermarkSize {
        WatermarkSize::new(self.width, self.height)
    }
}

/// Calculate the watermark size for one image.
///
/// `original_size` is the intrinsic size of an image watermark. It is
/// required in percentage mode and optional in fixed mode, where it only
/// feeds the reported scale factors.
///
/// # Errors
///
/// - [`WatermarkError::InvalidDimensions`] if the image has a zero side
/// - [`WatermarkError::MissingOriginalSize`] for a percentage-mode image
///   watermark without `original_size`
/// - [`WatermarkError::UnsupportedKind`] for full-screen watermarks
pub fn calculate_adaptive_watermark_size(
    config: &WatermarkConfig,
    image: &ImageDimensions,
    original_size: Option<&WatermarkSize>,
) -> Result<ScalingResult, WatermarkError> {
    image.validate()?;

    match config.scale_mode {
        ScaleMode::Percentage | ScaleMode::Adaptive => {
            percentage_scaling(config, image, original_size)
        }
        ScaleMode::Fixed => fixed_scaling(config, image, original_size),
    }
}

fn percentage_scaling(
    config: &WatermarkConfig,
    image: &ImageDimensions,
    original_size: Option<&WatermarkSize>,
) -> Result<ScalingResult, WatermarkError> {
    let adaptive = &config.adaptive;
    let base_on = adaptive
        .base_on
        .unwrap_or_else(|| choose_base_dimension(image));
    let base = base_dimension(image, base_on);
    let margin_ratio = adaptive.margin_ratio.unwrap_or(defaults::MARGIN_RATIO);
    let margin_x = (f64::from(image.width) * margin_ratio).round();
    let margin_y = (f64::from(image.height) * margin_ratio).round();

    match &config.kind {
        WatermarkKind::Text(style) => {
            let font_size = readable_font_size(adaptive, image, base);
            let length = style.estimated_length() as f64;

            Ok(ScalingResult {
                font_size: Some(font_size),
                width: (font_size * length * defaults::TEXT_WIDTH_FACTOR).round(),
                height: font_size,
                scale_x: 1.0,
                scale_y: 1.0,
                margin_x,
                margin_y,
            })
        }
        WatermarkKind::Image(_) => {
            let original = original_size.ok_or(WatermarkError::MissingOriginalSize {
                kind: "image",
            })?;
            validate_original_size(original)?;

            let target_width = base * adaptive.scale_ratio;
            let scale = target_width / original.width;

            Ok(ScalingResult {
                font_size: None,
                width: (original.width * scale).round(),
                height: (original.height * scale).round(),
                scale_x: scale,
                scale_y: scale,
                margin_x,
                margin_y,
            })
        }
        WatermarkKind::Fullscreen(_) => Err(unsupported_fullscreen()),
    }
}

fn fixed_scaling(
    config: &WatermarkConfig,
    image: &ImageDimensions,
    original_size: Option<&WatermarkSize>,
) -> Result<ScalingResult, WatermarkError> {
    let (margin_x, margin_y) = fixed_margins(&config.adaptive, image);

    match &config.kind {
        WatermarkKind::Text(TextStyle {
            content, font_size, ..
        }) => {
            let length = estimated_text_length(content) as f64;

            Ok(ScalingResult {
                font_size: Some(*font_size),
                width: font_size * length * defaults::TEXT_WIDTH_FACTOR,
                height: *font_size,
                scale_x: 1.0,
                scale_y: 1.0,
                margin_x,
                margin_y,
            })
        }
        WatermarkKind::Image(ImageStyle { width, height, .. }) => {
            let (scale_x, scale_y) = match original_size {
                Some(original) => {
                    validate_original_size(original)?;
                    (width / original.width, height / original.height)
                }
                None => (1.0, 1.0),
            };

            Ok(ScalingResult {
                font_size: None,
                width: *width,
                height: *height,
                scale_x,
                scale_y,
                margin_x,
                margin_y,
            })
        }
        WatermarkKind::Fullscreen(_) => Err(unsupported_fullscreen()),
    }
}

/// Font size for percentage mode: `round(base * scale_ratio)` bounded by the
/// explicit limits, or the readability defaults where none are set.
fn readable_font_size(adaptive: &AdaptiveConfig, image: &ImageDimensions, base: f64) -> f64 {
    let mut limits = readability_limits(image);
    if let Some(min) = adaptive.explicit_min_size() {
        limits.min_size = min;
    }
    if let Some(max) = adaptive.explicit_max_size() {
        limits.max_size = max;
    }

    limits.apply((base * adaptive.scale_ratio).round())
}

fn fixed_margins(adaptive: &AdaptiveConfig, image: &ImageDimensions) -> (f64, f64) {
    match adaptive.margin_ratio.filter(|r| *r > 0.0) {
        Some(ratio) => (
            (f64::from(image.width) * ratio).round(),
            (f64::from(image.height) * ratio).round(),
        ),
        None => (defaults::FIXED_MARGIN_PX, defaults::FIXED_MARGIN_PX),
    }
}

/// The intrinsic size divides target sizes, so it must be positive and finite.
pub(crate) fn validate_original_size(original: &WatermarkSize) -> Result<(), WatermarkError> {
    let positive = |v: f64| v > 0.0 && v.is_finite();
    if !(positive(original.width) && positive(original.height)) {
        return Err(WatermarkError::config(format!(
            "original watermark size must be positive, got {}x{}",
            original.width, original.height
        )));
    }
    Ok(())
}

fn unsupported_fullscreen() -> WatermarkError {
    WatermarkError::UnsupportedKind {
        kind: "fullscreen",
        operation: "adaptive sizing",
    }
}

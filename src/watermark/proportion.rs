//! Resolution-independent placement.
//!
//! A [`ProportionData`] stores watermark size and offset as fractions of the
//! canvas, so one value can be applied to images of any resolution and land
//! in the same relative spot.
//!
//! Unit convention: [`PositionConfig`] offsets are percentages of the canvas
//! (`5.0` = 5%), proportion offsets are fractions (`0.05`), and
//! [`PixelData`] offsets are pixels.

use serde::{Deserialize, Serialize};

use super::config::{PositionConfig, PositionMode, WatermarkPosition};
use super::position::{
    calculate_anchor_position, get_origin_from_position, AnchorPosition, ImageDimensions,
    OriginAlignment, WatermarkSize,
};
use super::scaling::validate_original_size;
use super::WatermarkError;
use crate::config::defaults;

/// Watermark size and offset relative to the canvas.
///
/// Scales are in `(0, 1]`, offsets in `[-1, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProportionData {
    pub scale_x_percent: f64,
    pub scale_y_percent: f64,
    #[serde(default)]
    pub offset_x_percent: f64,
    #[serde(default)]
    pub offset_y_percent: f64,
}

impl Default for ProportionData {
    /// 20% of the canvas width, 10% of its height, no offset.
    fn default() -> Self {
        Self {
            scale_x_percent: defaults::PROPORTION_SCALE_X,
            scale_y_percent: defaults::PROPORTION_SCALE_Y,
            offset_x_percent: 0.0,
            offset_y_percent: 0.0,
        }
    }
}

/// Proportions re-derived as pixels for one canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelData {
    /// Always 0; the anchor calculation places the watermark
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub font_size: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

/// A grid position paired with proportions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProportionConfig {
    pub position: WatermarkPosition,
    pub proportions: ProportionData,
}

/// Placement of a proportion-mode watermark on a concrete canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProportionPlacement {
    pub anchor: AnchorPosition,
    pub origin: OriginAlignment,
    pub pixels: PixelData,
}

/// A point as fractions of the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RelativePosition {
    pub x_percent: f64,
    pub y_percent: f64,
}

/// Derive proportions from a pixel-mode placement on a reference canvas.
pub fn calculate_proportions(
    position: &PositionConfig,
    canvas: &ImageDimensions,
    watermark: &WatermarkSize,
) -> Result<ProportionData, WatermarkError> {
    canvas.validate()?;
    let width = f64::from(canvas.width);
    let height = f64::from(canvas.height);

    Ok(ProportionData {
        scale_x_percent: watermark.width / width,
        scale_y_percent: watermark.height / height,
        offset_x_percent: position.offset_x / 100.0,
        offset_y_percent: position.offset_y / 100.0,
    })
}

/// Map proportions onto a canvas.
///
/// The derived font size is `round(height * scale_y * 0.8)`, 0.8 being the
/// usual ratio of glyph height to line box.
pub fn apply_proportions(
    proportions: &ProportionData,
    canvas: &ImageDimensions,
) -> Result<PixelData, WatermarkError> {
    canvas.validate()?;
    let width = f64::from(canvas.width);
    let height = f64::from(canvas.height);

    Ok(PixelData {
        x: 0.0,
        y: 0.0,
        width: (width * proportions.scale_x_percent).round(),
        height: (height * proportions.scale_y_percent).round(),
        font_size: (height * proportions.scale_y_percent * defaults::PROPORTION_FONT_FACTOR)
            .round(),
        offset_x: (width * proportions.offset_x_percent).round(),
        offset_y: (height * proportions.offset_y_percent).round(),
    })
}

/// Check proportions before they are applied.
pub fn validate_proportions(proportions: &ProportionData) -> Result<(), WatermarkError> {
    let scale_ok = |v: f64| v > 0.0 && v <= 1.0;
    let offset_ok = |v: f64| v.abs() <= 1.0;

    if !scale_ok(proportions.scale_x_percent) || !scale_ok(proportions.scale_y_percent) {
        return Err(WatermarkError::InvalidProportions(format!(
            "scales must be in (0, 1], got {}x{}",
            proportions.scale_x_percent, proportions.scale_y_percent
        )));
    }
    if !offset_ok(proportions.offset_x_percent) || !offset_ok(proportions.offset_y_percent) {
        return Err(WatermarkError::InvalidProportions(format!(
            "offsets must be in [-1, 1], got ({}, {})",
            proportions.offset_x_percent, proportions.offset_y_percent
        )));
    }
    Ok(())
}

pub fn convert_pixel_to_proportion(
    position: &PositionConfig,
    reference: &ImageDimensions,
    watermark: &WatermarkSize,
) -> Result<ProportionConfig, WatermarkError> {
    Ok(ProportionConfig {
        position: position.position,
        proportions: calculate_proportions(position, reference, watermark)?,
    })
}

/// Turn a proportion placement back into a pixel-mode [`PositionConfig`] for
/// `target`. Margins reset to their defaults.
pub fn convert_proportion_to_pixel(
    config: &ProportionConfig,
    target: &ImageDimensions,
) -> Result<PositionConfig, WatermarkError> {
    let pixels = apply_proportions(&config.proportions, target)?;

    Ok(PositionConfig {
        mode: PositionMode::Pixel,
        position: config.position,
        x: pixels.x,
        y: pixels.y,
        margin_x: defaults::ANCHOR_MARGIN_PX,
        margin_y: defaults::ANCHOR_MARGIN_PX,
        margin_percent: defaults::MARGIN_PERCENT,
        offset_x: config.proportions.offset_x_percent * 100.0,
        offset_y: config.proportions.offset_y_percent * 100.0,
        proportions: None,
    })
}

/// Anchor, origin and pixel sizes for a proportion-mode watermark.
pub fn calculate_proportion_position(
    config: &ProportionConfig,
    canvas: &ImageDimensions,
    margin: f64,
) -> Result<ProportionPlacement, WatermarkError> {
    let pixels = apply_proportions(&config.proportions, canvas)?;
    let anchor = calculate_anchor_position(
        canvas,
        config.position,
        margin,
        config.proportions.offset_x_percent * 100.0,
        config.proportions.offset_y_percent * 100.0,
    );

    Ok(ProportionPlacement {
        anchor,
        origin: get_origin_from_position(config.position),
        pixels,
    })
}

/// Largest uniform scale that fits `source` inside `target`.
///
/// # Errors
///
/// [`WatermarkError::Config`] if `source` has a zero, negative or infinite side.
pub fn calculate_unified_scale(
    source: &WatermarkSize,
    target: &WatermarkSize,
) -> Result<f64, WatermarkError> {
    validate_original_size(source)?;
    let scale_x = target.width / source.width;
    let scale_y = target.height / source.height;
    Ok(scale_x.min(scale_y))
}

/// Scale a font size with the canvas height.
pub fn calculate_proportional_font_size(
    base_height: f64,
    target_height: f64,
    base_font_size: f64,
) -> f64 {
    (base_font_size * target_height / base_height).round()
}

pub fn calculate_relative_position(
    x: f64,
    y: f64,
    canvas: &ImageDimensions,
) -> Result<RelativePosition, WatermarkError> {
    canvas.validate()?;
    Ok(RelativePosition {
        x_percent: x / f64::from(canvas.width),
        y_percent: y / f64::from(canvas.height),
    })
}

pub fn calculate_absolute_position(
    relative: &RelativePosition,
    canvas: &ImageDimensions,
) -> (f64, f64) {
    (
        (relative.x_percent * f64::from(canvas.width)).round(),
        (relative.y_percent * f64::from(canvas.height)).round(),
    )
}

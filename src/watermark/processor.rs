//! Watermark render planning.
//!
//! This module ties the geometry together: for one image it sizes the
//! watermark, places it and describes the draw call as a [`RenderPlan`].
//! For a batch it runs the batch optimizer once, then adjusts and plans
//! each image.
//!
//! # Pipeline
//!
//! - text and image watermarks: sizing, then anchor/origin (proportion
//!   mode goes through the proportion converter)
//! - full-screen watermarks: tile layout over the whole canvas
//!
//! # Example
//!
//! ```
//! use markscale::watermark::processor::render_watermark;
//! use markscale::watermark::surface::RecordingSurface;
//! use markscale::watermark::{ImageDimensions, WatermarkConfig};
//!
//! let mut surface = RecordingSurface::new();
//! let config = WatermarkConfig::text("© 2024");
//! render_watermark(&config, &ImageDimensions::new(1920, 1080), None, &mut surface).unwrap();
//! assert_eq!(surface.len(), 1);
//! ```

use rayon::prelude::*;

use super::batch::{
    adjust_watermark_for_image, optimize_batch_configuration_with, BatchImage,
    BatchScalingContext, ScalingStrategy,
};
use super::config::{
    estimated_text_length, FullscreenStyle, ImageStyle, PositionMode, TextStyle, TileMode,
    WatermarkConfig, WatermarkKind,
};
use super::position::{
    calculate_edge_aligned_anchor_position, get_origin_from_position, resolve_anchor,
    top_left_from_anchor, AnchorPosition, ImageDimensions, OriginAlignment, WatermarkSize,
};
use super::proportion::{
    calculate_proportion_position, calculate_unified_scale, validate_proportions,
    ProportionConfig, ProportionPlacement,
};
use super::scaling::calculate_adaptive_watermark_size;
use super::stroke::{calculate_stroke_settings, StrokeRenderMode};
use super::surface::{ImageDraw, RenderPlan, RenderSurface, TextDraw, TileContent, TilePattern};
use super::tiling::calculate_tile_layout;
use super::{WatermarkError, WatermarkPosition};
use crate::config::{defaults, BatchConfig};

/// Plan for one image of a batch.
#[derive(Debug, Clone, PartialEq)]
pub struct ImagePlan {
    pub image_id: String,
    pub image_name: String,
    /// `None` when the watermark is disabled
    pub result: Result<Option<RenderPlan>, WatermarkError>,
}

/// Plans for every image of a batch.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchPlan {
    pub strategy: ScalingStrategy,
    pub reason: String,
    pub context: Option<BatchScalingContext>,
    pub plans: Vec<ImagePlan>,
}

impl BatchPlan {
    pub fn failures(&self) -> impl Iterator<Item = &ImagePlan> {
        self.plans.iter().filter(|p| p.result.is_err())
    }

    pub fn failure_count(&self) -> usize {
        self.failures().count()
    }
}

/// Plan a watermark for one image.
///
/// `original_size` is the intrinsic size of an image watermark; text and
/// full-screen watermarks ignore it. Returns `Ok(None)` for a disabled
/// watermark.
///
/// The config is validated first, so a config built in code gets the same
/// checks as one loaded from a preset file.
pub fn plan_watermark(
    config: &WatermarkConfig,
    image: &ImageDimensions,
    original_size: Option<&WatermarkSize>,
) -> Result<Option<RenderPlan>, WatermarkError> {
    image.validate()?;
    if !config.enabled {
        return Ok(None);
    }
    config.validate()?;

    let plan = match &config.kind {
        WatermarkKind::Text(style) => RenderPlan::Text(plan_text(config, style, image)?),
        WatermarkKind::Image(style) => {
            RenderPlan::Image(plan_image(config, style, image, original_size)?)
        }
        WatermarkKind::Fullscreen(style) => RenderPlan::Tiled(plan_tiles(style, image)?),
    };

    Ok(Some(plan))
}

/// Plan a watermark and draw it on `surface`.
///
/// Returns whether anything was drawn.
pub fn render_watermark<S: RenderSurface + ?Sized>(
    config: &WatermarkConfig,
    image: &ImageDimensions,
    original_size: Option<&WatermarkSize>,
    surface: &mut S,
) -> Result<bool, WatermarkError> {
    match plan_watermark(config, image, original_size)? {
        Some(plan) => {
            plan.draw_onto(surface)?;
            Ok(true)
        }
        None => Ok(false),
    }
}

/// Plan a watermark for every image of a batch.
///
/// The strategy is chosen once for the whole batch. A failing image is
/// reported in its [`ImagePlan`] and never stops the others.
///
/// # Errors
///
/// Only batch-wide failures are returned: an invalid config, an empty batch
/// or an image with a zero side (which makes the area ratio meaningless).
pub fn plan_batch(
    config: &WatermarkConfig,
    images: &[BatchImage],
    original_size: Option<&WatermarkSize>,
    batch: &BatchConfig,
) -> Result<BatchPlan, WatermarkError> {
    if config.enabled {
        config.validate()?;
    }
    let optimization = optimize_batch_configuration_with(config, images, batch)?;
    let scaled = &optimization.optimized_config;

    let plan_one = |image: &BatchImage| {
        let adjusted = adjust_watermark_for_image(scaled, image);
        let result = plan_watermark(&adjusted, &image.dimensions, original_size);
        if let Err(e) = &result {
            tracing::warn!(
                image = %image.name,
                error = %e,
                per_image = e.is_per_image(),
                "Failed to plan watermark for image"
            );
        }
        ImagePlan {
            image_id: image.id.clone(),
            image_name: image.name.clone(),
            result,
        }
    };

    let plans: Vec<ImagePlan> = if batch.parallel {
        images.par_iter().map(plan_one).collect()
    } else {
        images.iter().map(plan_one).collect()
    };

    let plan = BatchPlan {
        strategy: optimization.strategy,
        reason: optimization.reason,
        context: scaled.context.clone(),
        plans,
    };

    tracing::info!(
        images = images.len(),
        failed = plan.failure_count(),
        strategy = %plan.strategy,
        "Planned batch watermarks"
    );

    Ok(plan)
}

/// Proportion-mode placement, if the config asks for it.
fn proportion_placement(
    config: &WatermarkConfig,
    image: &ImageDimensions,
    margin: f64,
) -> Result<Option<ProportionPlacement>, WatermarkError> {
    let position = &config.position;
    let proportions = match (position.mode, &position.proportions) {
        (PositionMode::Proportion, Some(proportions)) => proportions,
        _ => return Ok(None),
    };
    validate_proportions(proportions)?;

    let placement = calculate_proportion_position(
        &ProportionConfig {
            position: position.position,
            proportions: *proportions,
        },
        image,
        margin,
    )?;
    Ok(Some(placement))
}

fn plan_text(
    config: &WatermarkConfig,
    style: &TextStyle,
    image: &ImageDimensions,
) -> Result<TextDraw, WatermarkError> {
    let scaling = calculate_adaptive_watermark_size(config, image, None)?;

    let (font_size, anchor, origin) = match proportion_placement(config, image, scaling.margin_x)? {
        Some(placement) => (placement.pixels.font_size, placement.anchor, placement.origin),
        None => (
            scaling.font_size.unwrap_or(style.font_size),
            resolve_anchor(image, &config.position, scaling.margin_x, scaling.margin_y),
            get_origin_from_position(config.position.position),
        ),
    };

    let length = style.estimated_length() as f64;
    let stroke = style.stroke.as_ref().map(|stroke| {
        calculate_stroke_settings(
            stroke,
            1.0,
            StrokeRenderMode::Canvas,
            Some(font_size),
            Some(style.font_size),
        )
    });

    Ok(TextDraw {
        content: style.content.clone(),
        font_family: style.font_family.clone(),
        font_size,
        font_weight: style.font_weight.clone(),
        color: style.color.clone(),
        opacity: style.opacity,
        rotation: style.rotation,
        anchor,
        origin,
        size: WatermarkSize::new(
            (font_size * length * defaults::TEXT_WIDTH_FACTOR).round(),
            font_size,
        ),
        stroke,
        shadow: style.shadow.clone(),
    })
}

fn plan_image(
    config: &WatermarkConfig,
    style: &ImageStyle,
    image: &ImageDimensions,
    original_size: Option<&WatermarkSize>,
) -> Result<ImageDraw, WatermarkError> {
    let position = &config.position;

    let (size, offset_x, offset_y) = match proportion_placement(config, image, 0.0)? {
        Some(placement) => {
            let target = WatermarkSize::new(placement.pixels.width, placement.pixels.height);
            let size = match original_size {
                Some(original) if style.maintain_aspect_ratio => {
                    let scale = calculate_unified_scale(original, &target)?;
                    WatermarkSize::new(original.width * scale, original.height * scale)
                }
                _ => target,
            };
            let proportions = position.proportions.unwrap_or_default();
            (
                size,
                proportions.offset_x_percent * 100.0,
                proportions.offset_y_percent * 100.0,
            )
        }
        None => {
            let scaling = calculate_adaptive_watermark_size(config, image, original_size)?;
            (
                WatermarkSize::new(scaling.width * style.scale, scaling.height * style.scale),
                position.offset_x,
                position.offset_y,
            )
        }
    };

    let (left, top) = if position.position.is_custom() {
        let anchor = AnchorPosition {
            anchor_x: position.x,
            anchor_y: position.y,
        };
        top_left_from_anchor(&anchor, OriginAlignment::TOP_LEFT, &size)
    } else {
        let anchor = calculate_edge_aligned_anchor_position(
            image,
            position.position,
            0.0,
            offset_x,
            offset_y,
        );
        top_left_from_anchor(&anchor, get_origin_from_position(position.position), &size)
    };

    Ok(ImageDraw {
        image_url: style.image_url.clone(),
        left,
        top,
        width: size.width,
        height: size.height,
        opacity: style.opacity,
        rotation: style.rotation,
        blend_mode: style.blend_mode,
    })
}

fn plan_tiles(style: &FullscreenStyle, image: &ImageDimensions) -> Result<TilePattern, WatermarkError> {
    let layout = calculate_tile_layout(style, image)?;
    let origin =
        calculate_edge_aligned_anchor_position(image, WatermarkPosition::TopLeft, 0.0, 0.0, 0.0);

    let content = match (style.mode, &style.image_url) {
        (TileMode::Image, Some(image_url)) => TileContent::Image {
            image_url: image_url.clone(),
            scale: style.image_scale,
        },
        (TileMode::Image, None) => {
            return Err(WatermarkError::config(
                "Fullscreen image watermark requires 'image_url'",
            ))
        }
        (TileMode::Text, _) => TileContent::Text {
            content: style.content.clone(),
            font_family: style.font_family.clone(),
            font_size: style.font_size,
            color: style.color.clone(),
        },
    };

    tracing::trace!(
        rows = layout.rows,
        cols = layout.cols,
        text_length = estimated_text_length(&style.content),
        "Planned tile layout"
    );

    Ok(TilePattern {
        left: origin.anchor_x,
        top: origin.anchor_y,
        width: f64::from(image.width),
        height: f64::from(image.height),
        layout,
        content,
        opacity: style.opacity,
        rotation: style.rotation,
    })
}

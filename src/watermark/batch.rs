//! Batch scaling strategy and consistency checks.
//!
//! Before a batch renders, [`optimize_batch_configuration`] looks at how far
//! apart the image sizes are and picks one strategy for the whole batch:
//!
//! | max area / min area | strategy       | effect                                  |
//! |---------------------|----------------|-----------------------------------------|
//! | > 10                | `adaptive`     | every image scales independently        |
//! | > 3                 | `proportional` | one set of proportions for every image  |
//! | otherwise           | `fixed`        | identical pixel size on every image     |
//!
//! The thresholds come from [`BatchConfig`]. The resulting
//! [`BatchScalingContext`] is read-only for the rest of the batch, and
//! [`adjust_watermark_for_image`] derives each image's config from it.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::config::{PositionMode, ScaleMode, WatermarkConfig, WatermarkKind};
use super::position::{ImageDimensions, WatermarkSize};
use super::proportion::{calculate_proportions, validate_proportions, ProportionData};
use super::scaling::calculate_adaptive_watermark_size;
use super::tiling::calculate_tile_size;
use super::WatermarkError;
use crate::config::BatchConfig;

/// Batch-wide scaling strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalingStrategy {
    Adaptive,
    Proportional,
    Fixed,
}

impl ScalingStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Adaptive => "adaptive",
            Self::Proportional => "proportional",
            Self::Fixed => "fixed",
        }
    }
}

impl fmt::Display for ScalingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An image taking part in a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchImage {
    pub id: String,
    pub name: String,
    #[serde(flatten)]
    pub dimensions: ImageDimensions,
}

impl BatchImage {
    pub fn new(id: impl Into<String>, name: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            dimensions: ImageDimensions::new(width, height),
        }
    }

    pub fn area(&self) -> u64 {
        self.dimensions.area()
    }
}

/// Shared scaling state computed once per batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchScalingContext {
    pub reference_image: BatchImage,
    pub reference_dimensions: ImageDimensions,
    /// Set for the proportional strategy
    pub base_proportions: Option<ProportionData>,
    pub scaling_mode: ScalingStrategy,
}

/// A watermark config prepared for a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScaledWatermarkConfig {
    /// The config as the user wrote it
    pub config: WatermarkConfig,
    pub context: Option<BatchScalingContext>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchOptimization {
    pub optimized_config: ScaledWatermarkConfig,
    pub strategy: ScalingStrategy,
    pub reason: String,
}

/// A reason a batch may not render uniformly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConsistencyIssue {
    CountMismatch { configs: usize, images: usize },
    MixedScaleModes,
    MixedPositionModes,
    MixedTypes,
    ProportionDrift { tolerance: f64 },
}

impl fmt::Display for ConsistencyIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CountMismatch { configs, images } => write!(
                f,
                "config count ({}) does not match image count ({})",
                configs, images
            ),
            Self::MixedScaleModes => f.write_str("images use different scale modes"),
            Self::MixedPositionModes => f.write_str("images use different position modes"),
            Self::MixedTypes => f.write_str("images use different watermark types"),
            Self::ProportionDrift { tolerance } => write!(
                f,
                "proportion-mode scales differ by {} or more",
                tolerance
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsistencyReport {
    pub is_consistent: bool,
    pub issues: Vec<ConsistencyIssue>,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub summary: String,
    pub reference_image: String,
    pub scaling_mode: ScalingStrategy,
    pub total_images: usize,
    /// Smallest and largest image, e.g. `800x600 to 4000x3000`
    pub size_range: String,
    pub consistency: ConsistencyReport,
}

/// Ratio of the largest to the smallest image area.
pub fn area_ratio(images: &[BatchImage]) -> Result<f64, WatermarkError> {
    let mut min_area = u64::MAX;
    let mut max_area = 0;

    for image in images {
        image.dimensions.validate()?;
        min_area = min_area.min(image.area());
        max_area = max_area.max(image.area());
    }

    if images.is_empty() {
        return Err(WatermarkError::EmptyBatch);
    }

    Ok(max_area as f64 / min_area as f64)
}

/// Map an area ratio onto a strategy and a human readable reason.
pub fn select_strategy(area_ratio: f64, thresholds: &BatchConfig) -> (ScalingStrategy, &'static str) {
    if area_ratio > thresholds.adaptive_area_ratio {
        (
            ScalingStrategy::Adaptive,
            "image sizes differ widely; each image scales independently",
        )
    } else if area_ratio > thresholds.proportional_area_ratio {
        (
            ScalingStrategy::Proportional,
            "image sizes differ moderately; shared proportions keep the relative size",
        )
    } else {
        (
            ScalingStrategy::Fixed,
            "image sizes are close; a fixed pixel size keeps watermarks identical",
        )
    }
}

/// Median image by area, so neither the smallest nor the largest image
/// skews the shared proportions.
pub fn select_reference_image(images: &[BatchImage]) -> Result<&BatchImage, WatermarkError> {
    let mut by_area: Vec<&BatchImage> = images.iter().collect();
    by_area.sort_by_key(|image| image.area());

    by_area
        .get(by_area.len() / 2)
        .copied()
        .ok_or(WatermarkError::EmptyBatch)
}

/// Size of the watermark as drawn on `image`.
///
/// Image watermarks use their configured size as the intrinsic size, and
/// full-screen watermarks use one tile cell.
pub fn reference_watermark_size(
    config: &WatermarkConfig,
    image: &ImageDimensions,
) -> Result<WatermarkSize, WatermarkError> {
    match &config.kind {
        WatermarkKind::Fullscreen(style) => {
            image.validate()?;
            let tile = calculate_tile_size(style);
            Ok(WatermarkSize::new(tile.width, tile.height))
        }
        WatermarkKind::Image(style) => {
            let original = WatermarkSize::new(style.width, style.height);
            Ok(calculate_adaptive_watermark_size(config, image, Some(&original))?.size())
        }
        WatermarkKind::Text(_) => Ok(calculate_adaptive_watermark_size(config, image, None)?.size()),
    }
}

/// Attach a batch context for `strategy` to `config`.
///
/// An empty batch gets no context, so the config passes through unchanged.
pub fn prepare_batch_watermark_config(
    config: &WatermarkConfig,
    images: &[BatchImage],
    strategy: ScalingStrategy,
) -> Result<ScaledWatermarkConfig, WatermarkError> {
    if images.is_empty() {
        return Ok(ScaledWatermarkConfig {
            config: config.clone(),
            context: None,
        });
    }

    let reference_image = select_reference_image(images)?;
    let reference_dimensions = reference_image.dimensions;

    let base_proportions = match strategy {
        ScalingStrategy::Proportional => {
            let size = reference_watermark_size(config, &reference_dimensions)?;
            Some(calculate_proportions(
                &config.position,
                &reference_dimensions,
                &size,
            )?)
        }
        ScalingStrategy::Adaptive | ScalingStrategy::Fixed => None,
    };

    Ok(ScaledWatermarkConfig {
        config: config.clone(),
        context: Some(BatchScalingContext {
            reference_image: reference_image.clone(),
            reference_dimensions,
            base_proportions,
            scaling_mode: strategy,
        }),
    })
}

/// Pick a strategy for the batch with the default thresholds.
pub fn optimize_batch_configuration(
    config: &WatermarkConfig,
    images: &[BatchImage],
) -> Result<BatchOptimization, WatermarkError> {
    optimize_batch_configuration_with(config, images, &BatchConfig::default())
}

/// Pick a strategy for the batch.
///
/// # Errors
///
/// [`WatermarkError::EmptyBatch`] for no images, and
/// [`WatermarkError::InvalidDimensions`] if any image has a zero side.
pub fn optimize_batch_configuration_with(
    config: &WatermarkConfig,
    images: &[BatchImage],
    thresholds: &BatchConfig,
) -> Result<BatchOptimization, WatermarkError> {
    let ratio = area_ratio(images)?;
    let (strategy, reason) = select_strategy(ratio, thresholds);

    let optimized_config = prepare_batch_watermark_config(config, images, strategy)?;

    // Proportions outside (0, 1] cannot be applied to other images.
    if let Some(proportions) = optimized_config
        .context
        .as_ref()
        .and_then(|c| c.base_proportions.as_ref())
    {
        if let Err(e) = validate_proportions(proportions) {
            tracing::warn!(
                error = %e,
                area_ratio = ratio,
                "Reference proportions out of range, falling back to adaptive scaling"
            );
            return Ok(BatchOptimization {
                optimized_config: prepare_batch_watermark_config(
                    config,
                    images,
                    ScalingStrategy::Adaptive,
                )?,
                strategy: ScalingStrategy::Adaptive,
                reason: format!("{}; reference proportions out of range", reason),
            });
        }
    }

    tracing::info!(
        images = images.len(),
        area_ratio = ratio,
        strategy = %strategy,
        reference = optimized_config
            .context
            .as_ref()
            .map(|c| c.reference_image.name.as_str())
            .unwrap_or_default(),
        "Selected batch scaling strategy"
    );

    Ok(BatchOptimization {
        optimized_config,
        strategy,
        reason: reason.to_string(),
    })
}

/// Per-image config for a prepared batch.
///
/// - `proportional`: switch to proportion mode with the shared proportions
/// - `fixed`: force the fixed scale mode
/// - `adaptive`: the original config, recomputed per image
pub fn adjust_watermark_for_image(
    scaled: &ScaledWatermarkConfig,
    target: &BatchImage,
) -> WatermarkConfig {
    let mut adjusted = scaled.config.clone();
    let Some(context) = &scaled.context else {
        return adjusted;
    };

    tracing::debug!(
        image = %target.name,
        width = target.dimensions.width,
        height = target.dimensions.height,
        strategy = %context.scaling_mode,
        "Adjusting watermark for image"
    );

    match context.scaling_mode {
        ScalingStrategy::Proportional => {
            adjusted.position.mode = PositionMode::Proportion;
            adjusted.position.proportions = context.base_proportions;
        }
        ScalingStrategy::Fixed => {
            adjusted.scale_mode = ScaleMode::Fixed;
        }
        ScalingStrategy::Adaptive => {}
    }

    adjusted
}

/// Check per-image configs for settings that break cross-image uniformity
/// with the default tolerance.
pub fn validate_batch_consistency(
    configs: &[WatermarkConfig],
    images: &[BatchImage],
) -> ConsistencyReport {
    validate_batch_consistency_with(configs, images, &BatchConfig::default())
}

/// Check per-image configs for settings that break cross-image uniformity.
///
/// Findings are warnings; a batch with issues still renders.
pub fn validate_batch_consistency_with(
    configs: &[WatermarkConfig],
    images: &[BatchImage],
    thresholds: &BatchConfig,
) -> ConsistencyReport {
    let mut issues = Vec::new();
    let mut recommendations = Vec::new();

    if configs.len() != images.len() {
        issues.push(ConsistencyIssue::CountMismatch {
            configs: configs.len(),
            images: images.len(),
        });
        return finish_report(issues, recommendations);
    }

    let scale_modes: HashSet<_> = configs.iter().map(|c| c.scale_mode).collect();
    if scale_modes.len() > 1 {
        issues.push(ConsistencyIssue::MixedScaleModes);
        recommendations.push("use the same scale mode for every image".to_string());
    }

    let position_modes: HashSet<_> = configs.iter().map(|c| c.position.mode).collect();
    if position_modes.len() > 1 {
        issues.push(ConsistencyIssue::MixedPositionModes);
        recommendations.push("use the same position mode for every image".to_string());
    }

    let types: HashSet<_> = configs.iter().map(|c| c.watermark_type()).collect();
    if types.len() > 1 {
        issues.push(ConsistencyIssue::MixedTypes);
        recommendations.push("use the same watermark type for every image".to_string());
    }

    let proportions: Vec<&ProportionData> = configs
        .iter()
        .filter(|c| c.position.mode == PositionMode::Proportion)
        .filter_map(|c| c.position.proportions.as_ref())
        .collect();
    if let Some(first) = proportions.first() {
        let tolerance = thresholds.proportion_tolerance;
        let drift = proportions.iter().any(|p| {
            (p.scale_x_percent - first.scale_x_percent).abs() >= tolerance
                || (p.scale_y_percent - first.scale_y_percent).abs() >= tolerance
        });
        if drift {
            issues.push(ConsistencyIssue::ProportionDrift { tolerance });
            recommendations.push("share one set of proportions across the batch".to_string());
        }
    }

    if let Ok(ratio) = area_ratio(images) {
        if ratio > thresholds.adaptive_area_ratio {
            recommendations
                .push("image sizes differ widely; consider adaptive scaling".to_string());
        }
    }

    finish_report(issues, recommendations)
}

fn finish_report(issues: Vec<ConsistencyIssue>, recommendations: Vec<String>) -> ConsistencyReport {
    for issue in &issues {
        tracing::warn!(issue = %issue, "Batch consistency issue");
    }

    ConsistencyReport {
        is_consistent: issues.is_empty(),
        issues,
        recommendations,
    }
}

/// Summarize a batch run.
pub fn generate_batch_report(
    configs: &[WatermarkConfig],
    images: &[BatchImage],
    context: &BatchScalingContext,
) -> BatchReport {
    let consistency = validate_batch_consistency(configs, images);

    let smallest = images.iter().min_by_key(|image| image.area());
    let largest = images.iter().max_by_key(|image| image.area());
    let size_range = match (smallest, largest) {
        (Some(min), Some(max)) => format!(
            "{}x{} to {}x{}",
            min.dimensions.width, min.dimensions.height, max.dimensions.width, max.dimensions.height
        ),
        _ => "n/a".to_string(),
    };

    let status = if consistency.is_consistent {
        "Configuration is consistent.".to_string()
    } else {
        format!("Found {} consistency issue(s).", consistency.issues.len())
    };
    let summary = format!(
        "Processed {} image(s) with {} scaling. {}",
        images.len(),
        context.scaling_mode,
        status
    );

    BatchReport {
        summary,
        reference_image: context.reference_image.name.clone(),
        scaling_mode: context.scaling_mode,
        total_images: images.len(),
        size_range,
        consistency,
    }
}

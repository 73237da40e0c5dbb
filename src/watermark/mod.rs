//! Adaptive watermark geometry.
//!
//! This module computes how big a watermark should be and where it goes on
//! images of any resolution. It never touches pixels: output is a
//! [`RenderPlan`] for an external [`RenderSurface`].
//!
//! # Features
//!
//! - **Text, image and full-screen (tiled) watermarks**
//! - **Scale modes**: percentage/adaptive (tracks image size) and fixed
//!   (identical pixels on every image)
//! - **10 placements**: 9-grid plus custom, with percentage offsets
//! - **Proportion mode** for resolution-independent placement
//! - **Rotation-aware tiling** with diagonal (brick) layouts
//! - **Batch strategy selection** keeping a batch visually consistent
//!
//! # Configuration Example
//!
//! ```yaml
//! type: text
//! content: "© 2024"
//! font_size: 24
//! color: "#FFFFFF"
//! opacity: 0.5
//! scale_mode: percentage
//! position:
//!   mode: pixel
//!   position: bottom-right
//!   offset_x: -1.5
//! adaptive:
//!   scale_ratio: 0.05
//!   margin_ratio: 0.03
//!   base_on: shorter-edge
//! ```
//!
//! # Control Flow
//!
//! Text and image watermarks go through [`readability`] and [`scaling`],
//! full-screen watermarks through [`tiling`]. Both consult [`position`] for
//! placement and [`proportion`] in proportion mode. [`batch`] runs once per
//! batch before any of them.

pub mod batch;
pub mod config;
pub mod error;
pub mod position;
pub mod processor;
pub mod proportion;
pub mod readability;
pub mod scaling;
pub mod stroke;
pub mod surface;
pub mod tiling;

// Re-export main types for convenience
pub use batch::{
    adjust_watermark_for_image, generate_batch_report, optimize_batch_configuration,
    optimize_batch_configuration_with, prepare_batch_watermark_config, select_reference_image,
    validate_batch_consistency, BatchImage, BatchOptimization, BatchReport, BatchScalingContext,
    ConsistencyIssue, ConsistencyReport, ScaledWatermarkConfig, ScalingStrategy,
};
pub use config::{
    is_valid_grid_position, AdaptiveConfig, BaseOn, BlendMode, FullscreenStyle, ImageStyle,
    PositionConfig, PositionMode, ScaleMode, ShadowConfig, StrokeConfig, TextStyle, TileMode,
    WatermarkConfig, WatermarkKind, WatermarkPosition, WatermarkType,
};
pub use error::WatermarkError;
pub use position::{
    calculate_anchor_position, calculate_edge_aligned_anchor_position,
    calculate_grid_position_info, get_origin_from_position, is_edge_position, resolve_anchor,
    top_left_from_anchor, AnchorPosition, GridPositionInfo, ImageDimensions, OriginAlignment,
    OriginX, OriginY, PlacementPosition, WatermarkSize,
};
pub use processor::{plan_batch, plan_watermark, render_watermark, BatchPlan, ImagePlan};
pub use proportion::{
    apply_proportions, calculate_proportions, validate_proportions, PixelData, ProportionConfig,
    ProportionData,
};
pub use readability::{choose_base_dimension, readability_limits, ReadabilityLimits};
pub use scaling::{calculate_adaptive_watermark_size, ScalingResult};
pub use stroke::{calculate_stroke_settings, StrokeRenderMode, StrokeSettings};
pub use surface::{RecordingSurface, RenderPlan, RenderSurface};
pub use tiling::{
    calculate_diagonal_offset, calculate_tile_layout, calculate_tile_positions,
    calculate_tile_size, TileLayout, TileSize,
};

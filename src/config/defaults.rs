//! Defaults table.
//!
//! Every default used by the geometry engine lives here. Serde default
//! functions in the configuration types read from these constants, so a
//! deserialized config is fully populated before any geometry runs.

// Adaptive sizing
pub const SCALE_RATIO: f64 = 0.05;
pub const MARGIN_RATIO: f64 = 0.03;
pub const FIXED_MARGIN_PX: f64 = 20.0;

/// Estimated glyph advance as a fraction of the font size.
pub const TEXT_WIDTH_FACTOR: f64 = 0.6;
/// Estimated line box height as a multiple of the font size.
pub const LINE_HEIGHT_FACTOR: f64 = 1.2;
/// Character count assumed for empty text content.
pub const EMPTY_TEXT_LENGTH: usize = 4;

// Base selection and readability
pub const WIDE_ASPECT_RATIO: f64 = 1.8;
pub const TALL_ASPECT_RATIO: f64 = 0.6;
pub const READABILITY_NORMALIZER: f64 = 1000.0;
pub const READABILITY_MIN_FLOOR: f64 = 12.0;
pub const READABILITY_MIN_FACTOR: f64 = 8.0;
pub const READABILITY_MAX_CEILING: f64 = 200.0;
pub const READABILITY_MAX_FACTOR: f64 = 60.0;

// Positioning
pub const ANCHOR_MARGIN_PX: f64 = 20.0;
pub const MARGIN_PERCENT: f64 = 5.0;

// Proportions
/// Text height to box height ratio used when deriving a font size.
pub const PROPORTION_FONT_FACTOR: f64 = 0.8;
pub const PROPORTION_SCALE_X: f64 = 0.2;
pub const PROPORTION_SCALE_Y: f64 = 0.1;

// Full-screen tiling
pub const TILE_SPACING: f64 = 200.0;
pub const TILE_DENSITY: f64 = 0.5;
pub const TILE_FONT_SIZE: f64 = 16.0;
pub const TILE_IMAGE_SIZE: f64 = 100.0;
pub const TILE_IMAGE_SCALE: f64 = 1.0;
/// Extra spacing granted to rotated tiles, as a fraction of the spacing.
pub const ROTATED_TILE_EXTRA: f64 = 0.5;
/// Upper bound on tiles in one full-screen layout.
pub const MAX_TILES: u32 = 100_000;

// Styles
pub const FONT_FAMILY: &str = "Arial";
pub const FONT_SIZE: f64 = 24.0;
pub const FONT_WEIGHT: &str = "normal";
pub const COLOR: &str = "#FFFFFF";
pub const OPACITY: f64 = 0.5;
pub const IMAGE_SCALE: f64 = 1.0;
/// Target size of an image watermark when none is configured.
pub const IMAGE_SIZE: f64 = 100.0;

// Batch strategy selection
pub const ADAPTIVE_AREA_RATIO: f64 = 10.0;
pub const PROPORTIONAL_AREA_RATIO: f64 = 3.0;
pub const PROPORTION_TOLERANCE: f64 = 0.01;

// Logging
pub const LOG_LEVEL: &str = "info";

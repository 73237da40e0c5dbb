//! Watermark configuration types.
//!
//! This module defines the per-render watermark configuration:
//! - Text, image and full-screen (tiled) watermark styles as a tagged union
//! - Scale modes (percentage, fixed, adaptive)
//! - Position modes (pixel, proportion) with 9-grid and custom placement
//! - Adaptive sizing parameters
//!
//! Only the style matching `type` exists on a config, so there is no way to
//! read text fields from an image watermark.
//!
//! ```yaml
//! type: text
//! content: "© 2024"
//! scale_mode: percentage
//! position:
//!   position: bottom-right
//! adaptive:
//!   scale_ratio: 0.05
//!   base_on: shorter-edge
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::proportion::{validate_proportions, ProportionData};
use super::WatermarkError;
use crate::config::defaults;

// Default values
fn default_true() -> bool {
    true
}

fn default_scale_ratio() -> f64 {
    defaults::SCALE_RATIO
}

fn default_anchor_margin() -> f64 {
    defaults::ANCHOR_MARGIN_PX
}

fn default_margin_percent() -> f64 {
    defaults::MARGIN_PERCENT
}

fn default_position() -> WatermarkPosition {
    WatermarkPosition::BottomRight
}

fn default_font_family() -> String {
    defaults::FONT_FAMILY.to_string()
}

fn default_font_size() -> f64 {
    defaults::FONT_SIZE
}

fn default_font_weight() -> String {
    defaults::FONT_WEIGHT.to_string()
}

fn default_color() -> String {
    defaults::COLOR.to_string()
}

fn default_opacity() -> f64 {
    defaults::OPACITY
}

fn default_image_scale() -> f64 {
    defaults::IMAGE_SCALE
}

fn default_image_size() -> f64 {
    defaults::IMAGE_SIZE
}

fn default_tile_font_size() -> f64 {
    defaults::TILE_FONT_SIZE
}

fn default_tile_image_scale() -> f64 {
    defaults::TILE_IMAGE_SCALE
}

fn default_tile_image_size() -> f64 {
    defaults::TILE_IMAGE_SIZE
}

fn default_tile_spacing() -> f64 {
    defaults::TILE_SPACING
}

fn default_tile_density() -> f64 {
    defaults::TILE_DENSITY
}

/// How watermark size relates to image dimensions.
///
/// `Percentage` and `Adaptive` share one algorithm. Unknown names fall back to
/// `Percentage` instead of failing the whole config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "&'static str")]
pub enum ScaleMode {
    #[default]
    Percentage,
    Fixed,
    Adaptive,
}

impl ScaleMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Percentage => "percentage",
            Self::Fixed => "fixed",
            Self::Adaptive => "adaptive",
        }
    }
}

impl From<String> for ScaleMode {
    fn from(value: String) -> Self {
        match value.to_lowercase().as_str() {
            "percentage" => Self::Percentage,
            "fixed" => Self::Fixed,
            "adaptive" => Self::Adaptive,
            other => {
                tracing::warn!(
                    scale_mode = other,
                    "Unknown scale mode, falling back to percentage"
                );
                Self::Percentage
            }
        }
    }
}

impl From<ScaleMode> for &'static str {
    fn from(mode: ScaleMode) -> Self {
        mode.as_str()
    }
}

impl fmt::Display for ScaleMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether placement is stored in pixels or as canvas proportions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionMode {
    #[default]
    Pixel,
    Proportion,
}

impl PositionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pixel => "pixel",
            Self::Proportion => "proportion",
        }
    }
}

/// Image dimension used as the scaling baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BaseOn {
    Width,
    Height,
    ShorterEdge,
}

/// Column of the 9-grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Left,
    Center,
    Right,
}

/// Row of the 9-grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Row {
    Top,
    Middle,
    Bottom,
}

/// Watermark position on the image.
///
/// Nine grid positions plus `Custom`, which places the watermark at the raw
/// `x`/`y` of its [`PositionConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WatermarkPosition {
    TopLeft,
    TopCenter,
    TopRight,
    MiddleLeft,
    MiddleCenter,
    MiddleRight,
    BottomLeft,
    BottomCenter,
    BottomRight,
    Custom,
}

impl WatermarkPosition {
    /// The nine grid positions in row-major order.
    pub const GRID: [WatermarkPosition; 9] = [
        Self::TopLeft,
        Self::TopCenter,
        Self::TopRight,
        Self::MiddleLeft,
        Self::MiddleCenter,
        Self::MiddleRight,
        Self::BottomLeft,
        Self::BottomCenter,
        Self::BottomRight,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TopLeft => "top-left",
            Self::TopCenter => "top-center",
            Self::TopRight => "top-right",
            Self::MiddleLeft => "middle-left",
            Self::MiddleCenter => "middle-center",
            Self::MiddleRight => "middle-right",
            Self::BottomLeft => "bottom-left",
            Self::BottomCenter => "bottom-center",
            Self::BottomRight => "bottom-right",
            Self::Custom => "custom",
        }
    }

    /// Grid column, or `None` for custom placement.
    pub fn column(&self) -> Option<Column> {
        match self {
            Self::TopLeft | Self::MiddleLeft | Self::BottomLeft => Some(Column::Left),
            Self::TopCenter | Self::MiddleCenter | Self::BottomCenter => Some(Column::Center),
            Self::TopRight | Self::MiddleRight | Self::BottomRight => Some(Column::Right),
            Self::Custom => None,
        }
    }

    /// Grid row, or `None` for custom placement.
    pub fn row(&self) -> Option<Row> {
        match self {
            Self::TopLeft | Self::TopCenter | Self::TopRight => Some(Row::Top),
            Self::MiddleLeft | Self::MiddleCenter | Self::MiddleRight => Some(Row::Middle),
            Self::BottomLeft | Self::BottomCenter | Self::BottomRight => Some(Row::Bottom),
            Self::Custom => None,
        }
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, Self::Custom)
    }
}

impl fmt::Display for WatermarkPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WatermarkPosition {
    type Err = WatermarkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::GRID
            .iter()
            .copied()
            .chain(std::iter::once(Self::Custom))
            .find(|p| p.as_str() == s)
            .ok_or_else(|| WatermarkError::config(format!("unknown position '{}'", s)))
    }
}

/// Returns true for the nine grid positions and `custom`.
pub fn is_valid_grid_position(position: &str) -> bool {
    position.parse::<WatermarkPosition>().is_ok()
}

/// Placement of a watermark.
///
/// `offset_x`/`offset_y` are percentages of the canvas width/height, so the
/// same value shifts the watermark by the same relative amount on any image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionConfig {
    #[serde(default)]
    pub mode: PositionMode,

    #[serde(default = "default_position")]
    pub position: WatermarkPosition,

    /// Raw anchor for `custom` placement, in pixels
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,

    #[serde(default = "default_anchor_margin")]
    pub margin_x: f64,
    #[serde(default = "default_anchor_margin")]
    pub margin_y: f64,
    #[serde(default = "default_margin_percent")]
    pub margin_percent: f64,

    #[serde(default)]
    pub offset_x: f64,
    #[serde(default)]
    pub offset_y: f64,

    /// Resolution-independent placement, used when `mode` is `proportion`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proportions: Option<ProportionData>,
}

impl Default for PositionConfig {
    fn default() -> Self {
        Self {
            mode: PositionMode::Pixel,
            position: default_position(),
            x: 0.0,
            y: 0.0,
            margin_x: default_anchor_margin(),
            margin_y: default_anchor_margin(),
            margin_percent: default_margin_percent(),
            offset_x: 0.0,
            offset_y: 0.0,
            proportions: None,
        }
    }
}

impl PositionConfig {
    /// Pixel-mode placement at a grid position.
    pub fn named(position: WatermarkPosition) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    /// Pixel-mode placement at a raw anchor.
    pub fn custom(x: f64, y: f64) -> Self {
        Self {
            position: WatermarkPosition::Custom,
            x,
            y,
            ..Self::default()
        }
    }

    /// Set the percentage offsets.
    pub fn with_offset(mut self, offset_x: f64, offset_y: f64) -> Self {
        self.offset_x = offset_x;
        self.offset_y = offset_y;
        self
    }

    /// Switch to proportion mode with the given proportions.
    pub fn with_proportions(mut self, proportions: ProportionData) -> Self {
        self.mode = PositionMode::Proportion;
        self.proportions = Some(proportions);
        self
    }
}

/// Adaptive sizing parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdaptiveConfig {
    /// UI toggle; sizing itself is governed by `scale_mode`
    #[serde(default = "default_true")]
    pub enable_auto_scale: bool,

    /// Font size floor. Unset or <= 0 uses the readability default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_size: Option<f64>,

    /// Font size ceiling. Unset or <= 0 uses the readability default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_size: Option<f64>,

    /// Watermark size as a fraction of the base dimension (default: 0.05)
    #[serde(default = "default_scale_ratio")]
    pub scale_ratio: f64,

    /// Margin as a fraction of each image axis. Percentage mode defaults to
    /// 0.03; fixed mode falls back to a constant 20px margin.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub margin_ratio: Option<f64>,

    /// Scaling baseline. Chosen from the aspect ratio when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_on: Option<BaseOn>,
}

impl Default for AdaptiveConfig {
    fn default() -> Self {
        Self {
            enable_auto_scale: true,
            min_size: None,
            max_size: None,
            scale_ratio: default_scale_ratio(),
            margin_ratio: None,
            base_on: None,
        }
    }
}

impl AdaptiveConfig {
    pub fn explicit_min_size(&self) -> Option<f64> {
        self.min_size.filter(|v| *v > 0.0)
    }

    pub fn explicit_max_size(&self) -> Option<f64> {
        self.max_size.filter(|v| *v > 0.0)
    }
}

/// Text outline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrokeConfig {
    pub color: String,
    /// Baseline width in pixels
    pub width: f64,
    /// Width relative to the font size (e.g. 0.05 = 5%)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width_ratio: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShadowConfig {
    pub color: String,
    #[serde(default)]
    pub blur: f64,
    #[serde(default)]
    pub offset_x: f64,
    #[serde(default)]
    pub offset_y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlendMode {
    #[default]
    Normal,
    Multiply,
    Screen,
    Overlay,
    SoftLight,
    HardLight,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    #[serde(default)]
    pub content: String,

    #[serde(default = "default_font_family")]
    pub font_family: String,

    /// Font size in pixels; used as-is in fixed mode (default: 24)
    #[serde(default = "default_font_size")]
    pub font_size: f64,

    #[serde(default = "default_font_weight")]
    pub font_weight: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default = "default_opacity")]
    pub opacity: f64,

    /// Rotation in degrees
    #[serde(default)]
    pub rotation: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke: Option<StrokeConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shadow: Option<ShadowConfig>,
}

impl TextStyle {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            font_family: default_font_family(),
            font_size: default_font_size(),
            font_weight: default_font_weight(),
            color: default_color(),
            opacity: default_opacity(),
            rotation: 0.0,
            stroke: None,
            shadow: None,
        }
    }

    /// Character count used for width estimation; empty text counts as 4.
    pub fn estimated_length(&self) -> usize {
        estimated_text_length(&self.content)
    }
}

pub(crate) fn estimated_text_length(content: &str) -> usize {
    match content.chars().count() {
        0 => defaults::EMPTY_TEXT_LENGTH,
        n => n,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageStyle {
    #[serde(default)]
    pub image_url: String,

    /// Target width in pixels for fixed mode
    #[serde(default = "default_image_size")]
    pub width: f64,

    /// Target height in pixels for fixed mode
    #[serde(default = "default_image_size")]
    pub height: f64,

    #[serde(default = "default_image_scale")]
    pub scale: f64,

    #[serde(default = "default_opacity")]
    pub opacity: f64,

    #[serde(default)]
    pub rotation: f64,

    #[serde(default)]
    pub blend_mode: BlendMode,

    #[serde(default = "default_true")]
    pub maintain_aspect_ratio: bool,
}

impl ImageStyle {
    pub fn new(image_url: impl Into<String>, width: f64, height: f64) -> Self {
        Self {
            image_url: image_url.into(),
            width,
            height,
            scale: default_image_scale(),
            opacity: default_opacity(),
            rotation: 0.0,
            blend_mode: BlendMode::Normal,
            maintain_aspect_ratio: true,
        }
    }
}

/// What a full-screen tile contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TileMode {
    #[default]
    Text,
    Image,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FullscreenStyle {
    #[serde(default)]
    pub mode: TileMode,

    // Text tiles
    #[serde(default)]
    pub content: String,
    #[serde(default = "default_font_family")]
    pub font_family: String,
    #[serde(default = "default_tile_font_size")]
    pub font_size: f64,
    #[serde(default = "default_color")]
    pub color: String,

    // Image tiles
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default = "default_tile_image_scale")]
    pub image_scale: f64,
    #[serde(default = "default_tile_image_size")]
    pub image_original_width: f64,
    #[serde(default = "default_tile_image_size")]
    pub image_original_height: f64,

    #[serde(default = "default_opacity")]
    pub opacity: f64,

    /// Rotation in degrees
    #[serde(default)]
    pub rotation: f64,

    /// Gap between tiles in pixels (default: 200)
    #[serde(default = "default_tile_spacing")]
    pub tile_spacing: f64,

    /// Minimum cell size as a fraction of the spacing (default: 0.5)
    #[serde(default = "default_tile_density")]
    pub tile_density: f64,

    /// Shift every other row by half a tile
    #[serde(default)]
    pub diagonal_mode: bool,
}

impl FullscreenStyle {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            mode: TileMode::Text,
            content: content.into(),
            font_family: default_font_family(),
            font_size: default_tile_font_size(),
            color: default_color(),
            image_url: None,
            image_scale: default_tile_image_scale(),
            image_original_width: default_tile_image_size(),
            image_original_height: default_tile_image_size(),
            opacity: default_opacity(),
            rotation: 0.0,
            tile_spacing: default_tile_spacing(),
            tile_density: default_tile_density(),
            diagonal_mode: false,
        }
    }

    pub fn image(image_url: impl Into<String>, original_width: f64, original_height: f64) -> Self {
        Self {
            mode: TileMode::Image,
            image_url: Some(image_url.into()),
            image_original_width: original_width,
            image_original_height: original_height,
            ..Self::text("")
        }
    }
}

/// Discriminant of [`WatermarkKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WatermarkType {
    Text,
    Image,
    Fullscreen,
}

impl WatermarkType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Image => "image",
            Self::Fullscreen => "fullscreen",
        }
    }
}

/// Watermark style, keyed by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum WatermarkKind {
    Text(TextStyle),
    Image(ImageStyle),
    Fullscreen(FullscreenStyle),
}

impl WatermarkKind {
    pub fn watermark_type(&self) -> WatermarkType {
        match self {
            Self::Text(_) => WatermarkType::Text,
            Self::Image(_) => WatermarkType::Image,
            Self::Fullscreen(_) => WatermarkType::Fullscreen,
        }
    }
}

/// A complete watermark configuration. Immutable for the duration of a
/// render call; batch adjustments produce new values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatermarkConfig {
    #[serde(default)]
    pub id: String,

    #[serde(flatten)]
    pub kind: WatermarkKind,

    #[serde(default)]
    pub scale_mode: ScaleMode,

    #[serde(default)]
    pub position: PositionConfig,

    #[serde(default)]
    pub adaptive: AdaptiveConfig,

    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl WatermarkConfig {
    pub fn new(kind: WatermarkKind) -> Self {
        Self {
            id: String::new(),
            kind,
            scale_mode: ScaleMode::default(),
            position: PositionConfig::default(),
            adaptive: AdaptiveConfig::default(),
            enabled: true,
        }
    }

    pub fn text(content: impl Into<String>) -> Self {
        Self::new(WatermarkKind::Text(TextStyle::new(content)))
    }

    pub fn image(image_url: impl Into<String>, width: f64, height: f64) -> Self {
        Self::new(WatermarkKind::Image(ImageStyle::new(image_url, width, height)))
    }

    pub fn fullscreen(style: FullscreenStyle) -> Self {
        Self::new(WatermarkKind::Fullscreen(style))
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_scale_mode(mut self, scale_mode: ScaleMode) -> Self {
        self.scale_mode = scale_mode;
        self
    }

    pub fn with_position(mut self, position: PositionConfig) -> Self {
        self.position = position;
        self
    }

    pub fn with_adaptive(mut self, adaptive: AdaptiveConfig) -> Self {
        self.adaptive = adaptive;
        self
    }

    pub fn watermark_type(&self) -> WatermarkType {
        self.kind.watermark_type()
    }

    /// Validate the watermark configuration.
    pub fn validate(&self) -> Result<(), WatermarkError> {
        match &self.kind {
            WatermarkKind::Text(style) => {
                validate_opacity("Text watermark", style.opacity)?;
                validate_hex_color("Text watermark", &style.color)?;
                validate_positive("Text watermark font_size", style.font_size)?;
                if let Some(stroke) = &style.stroke {
                    validate_non_negative("Text watermark stroke width", stroke.width)?;
                }
            }
            WatermarkKind::Image(style) => {
                if style.image_url.is_empty() {
                    return Err(WatermarkError::config(
                        "Image watermark 'image_url' field cannot be empty",
                    ));
                }
                validate_opacity("Image watermark", style.opacity)?;
                validate_positive("Image watermark width", style.width)?;
                validate_positive("Image watermark height", style.height)?;
                validate_positive("Image watermark scale", style.scale)?;
            }
            WatermarkKind::Fullscreen(style) => {
                validate_opacity("Fullscreen watermark", style.opacity)?;
                validate_non_negative("Fullscreen watermark tile_spacing", style.tile_spacing)?;
                validate_non_negative("Fullscreen watermark tile_density", style.tile_density)?;
                match style.mode {
                    TileMode::Text => {
                        validate_hex_color("Fullscreen watermark", &style.color)?;
                        validate_positive("Fullscreen watermark font_size", style.font_size)?;
                    }
                    TileMode::Image => {
                        if style.image_url.as_deref().map_or(true, str::is_empty) {
                            return Err(WatermarkError::config(
                                "Fullscreen image watermark requires 'image_url'",
                            ));
                        }
                        validate_positive("Fullscreen watermark image_scale", style.image_scale)?;
                        validate_positive(
                            "Fullscreen watermark image_original_width",
                            style.image_original_width,
                        )?;
                        validate_positive(
                            "Fullscreen watermark image_original_height",
                            style.image_original_height,
                        )?;
                    }
                }
            }
        }

        validate_positive("Adaptive scale_ratio", self.adaptive.scale_ratio)?;
        if let Some(ratio) = self.adaptive.margin_ratio {
            validate_non_negative("Adaptive margin_ratio", ratio)?;
        }

        if self.position.mode == PositionMode::Proportion {
            if let Some(proportions) = &self.position.proportions {
                validate_proportions(proportions)?;
            }
        }

        Ok(())
    }
}

fn validate_opacity(label: &str, opacity: f64) -> Result<(), WatermarkError> {
    // Check for NaN/Infinity and valid range
    if !opacity.is_finite() || !(0.0..=1.0).contains(&opacity) {
        return Err(WatermarkError::config(format!(
            "{} opacity must be a finite value between 0.0 and 1.0, got {}",
            label, opacity
        )));
    }
    Ok(())
}

fn validate_positive(label: &str, value: f64) -> Result<(), WatermarkError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(WatermarkError::config(format!(
            "{} must be a finite value greater than 0, got {}",
            label, value
        )));
    }
    Ok(())
}

fn validate_non_negative(label: &str, value: f64) -> Result<(), WatermarkError> {
    if !value.is_finite() || value < 0.0 {
        return Err(WatermarkError::config(format!(
            "{} must be a finite value >= 0, got {}",
            label, value
        )));
    }
    Ok(())
}

fn validate_hex_color(label: &str, color: &str) -> Result<(), WatermarkError> {
    // #RGB, #RRGGBB or #RRGGBBAA
    let Some(hex_part) = color.strip_prefix('#') else {
        return Err(WatermarkError::config(format!(
            "{} color must be a hex string starting with '#', got '{}'",
            label, color
        )));
    };
    let len = hex_part.len();
    if !matches!(len, 3 | 6 | 8) || !hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(WatermarkError::config(format!(
            "{} color must be in #RGB, #RRGGBB or #RRGGBBAA format, got '{}'",
            label, color
        )));
    }
    Ok(())
}

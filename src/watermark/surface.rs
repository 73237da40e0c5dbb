//! Render surface seam.
//!
//! The geometry engine never touches pixels. It produces a [`RenderPlan`]
//! and replays it on any [`RenderSurface`], which owns fonts, image
//! decoding and the pixel buffer.

use serde::{Deserialize, Serialize};

use super::config::{BlendMode, ShadowConfig};
use super::position::{AnchorPosition, OriginAlignment, WatermarkSize};
use super::stroke::StrokeSettings;
use super::tiling::TileLayout;
use super::WatermarkError;

/// Draw text with its origin on an anchor point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextDraw {
    pub content: String,
    pub font_family: String,
    pub font_size: f64,
    pub font_weight: String,
    pub color: String,
    pub opacity: f64,
    pub rotation: f64,
    pub anchor: AnchorPosition,
    pub origin: OriginAlignment,
    /// Estimated text box, used for placement only
    pub size: WatermarkSize,
    pub stroke: Option<StrokeSettings>,
    pub shadow: Option<ShadowConfig>,
}

/// Draw an image into a rectangle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageDraw {
    pub image_url: String,
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    pub opacity: f64,
    pub rotation: f64,
    pub blend_mode: BlendMode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum TileContent {
    Text {
        content: String,
        font_family: String,
        font_size: f64,
        color: String,
    },
    Image {
        image_url: String,
        scale: f64,
    },
}

/// Repeat a tile cell over a rectangle. The content is centered in each
/// cell and rotated around the cell center.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TilePattern {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    pub layout: TileLayout,
    pub content: TileContent,
    pub opacity: f64,
    pub rotation: f64,
}

/// Everything needed to draw one watermark on one image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum RenderPlan {
    Text(TextDraw),
    Image(ImageDraw),
    Tiled(TilePattern),
}

impl RenderPlan {
    /// Replay the plan on a surface.
    pub fn draw_onto<S: RenderSurface + ?Sized>(&self, surface: &mut S) -> Result<(), WatermarkError> {
        match self {
            RenderPlan::Text(text) => surface.draw_text(text),
            RenderPlan::Image(image) => surface.draw_image(image),
            RenderPlan::Tiled(pattern) => surface.tile_pattern(pattern),
        }
    }
}

/// A 2D drawing context bound to a pixel buffer.
pub trait RenderSurface {
    fn draw_text(&mut self, text: &TextDraw) -> Result<(), WatermarkError>;

    fn draw_image(&mut self, image: &ImageDraw) -> Result<(), WatermarkError>;

    fn tile_pattern(&mut self, pattern: &TilePattern) -> Result<(), WatermarkError>;
}

/// Surface that records draw calls instead of rasterizing them.
///
/// Useful for previews that hand the plan to another renderer, and for
/// asserting on output in tests.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    pub commands: Vec<RenderPlan>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl RenderSurface for RecordingSurface {
    fn draw_text(&mut self, text: &TextDraw) -> Result<(), WatermarkError> {
        self.commands.push(RenderPlan::Text(text.clone()));
        Ok(())
    }

    fn draw_image(&mut self, image: &ImageDraw) -> Result<(), WatermarkError> {
        self.commands.push(RenderPlan::Image(image.clone()));
        Ok(())
    }

    fn tile_pattern(&mut self, pattern: &TilePattern) -> Result<(), WatermarkError> {
        self.commands.push(RenderPlan::Tiled(pattern.clone()));
        Ok(())
    }
}

//! Text stroke (outline) settings.
//!
//! Stroke width follows the font size so an outline looks the same in a
//! scaled preview and in the full-resolution export.

use serde::{Deserialize, Serialize};

use super::config::StrokeConfig;

/// How the renderer draws an outside stroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrokeRenderMode {
    /// Immediate-mode canvas: stroke is centered on the glyph edge, so it is
    /// drawn at double width under the fill.
    #[default]
    Canvas,
    /// Retained object model: stroke painted before the fill.
    Object,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrokeSettings {
    pub line_width: f64,
    pub color: String,
    pub paint_stroke_first: bool,
}

/// Resolve the stroke line width.
///
/// Width sources, first match wins:
/// 1. `stroke.width` relative to `base_font_size`, applied to `scaled_font_size`
/// 2. `stroke.width_ratio * scaled_font_size`
/// 3. `stroke.width * display_scale`
pub fn calculate_stroke_settings(
    stroke: &StrokeConfig,
    display_scale: f64,
    mode: StrokeRenderMode,
    scaled_font_size: Option<f64>,
    base_font_size: Option<f64>,
) -> StrokeSettings {
    let scaled = scaled_font_size.filter(|s| *s > 0.0);

    let tracked = match (scaled, base_font_size.filter(|b| *b > 0.0)) {
        (Some(scaled), Some(base)) => Some(stroke.width / base * scaled),
        _ => None,
    }
    .filter(|w| *w != 0.0);

    let ratio = || match (stroke.width_ratio.filter(|r| *r > 0.0), scaled) {
        (Some(ratio), Some(scaled)) => Some(ratio * scaled),
        _ => None,
    };

    let base = tracked
        .or_else(ratio)
        .unwrap_or(stroke.width * display_scale);

    match mode {
        StrokeRenderMode::Canvas => StrokeSettings {
            line_width: base * 2.0,
            color: stroke.color.clone(),
            paint_stroke_first: false,
        },
        StrokeRenderMode::Object => StrokeSettings {
            line_width: base,
            color: stroke.color.clone(),
            paint_stroke_first: true,
        },
    }
}

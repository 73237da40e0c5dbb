//! Anchor and origin calculation for watermark placement.
//!
//! A placement is described by two parts:
//!
//! - an **anchor**: the canvas point the watermark is pinned to
//! - an **origin**: which part of the watermark's box sits on the anchor
//!
//! For the 9-grid, the origin mirrors the position, so a `bottom-right`
//! watermark hangs up and to the left of an anchor near the bottom-right
//! corner. Offsets are percentages of the canvas dimension, so the same
//! offset shifts a watermark by the same relative amount on any image.
//!
//! # Example
//!
//! ```
//! use markscale::watermark::position::{calculate_anchor_position, ImageDimensions};
//! use markscale::watermark::WatermarkPosition;
//!
//! let canvas = ImageDimensions::new(800, 600);
//! let anchor = calculate_anchor_position(&canvas, WatermarkPosition::BottomRight, 20.0, 0.0, 0.0);
//! assert_eq!((anchor.anchor_x, anchor.anchor_y), (780.0, 580.0));
//! ```

use serde::{Deserialize, Serialize};

use super::config::{Column, PositionConfig, Row};
use super::{WatermarkError, WatermarkPosition};

/// Dimensions of the target image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageDimensions {
    pub width: u32,
    pub height: u32,
}

impl ImageDimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Reject images with a zero side before any geometry runs on them.
    pub fn validate(&self) -> Result<(), WatermarkError> {
        if self.width == 0 || self.height == 0 {
            return Err(WatermarkError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }

    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    pub fn aspect_ratio(&self) -> f64 {
        f64::from(self.width) / f64::from(self.height)
    }
}

/// Size of a watermark in pixels, either intrinsic or computed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WatermarkSize {
    pub width: f64,
    pub height: f64,
}

impl WatermarkSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// A single point where a watermark (or tile) is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlacementPosition {
    pub x: f64,
    pub y: f64,
}

impl PlacementPosition {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OriginX {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OriginY {
    Top,
    Center,
    Bottom,
}

/// Which point of the watermark's bounding box coincides with the anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OriginAlignment {
    pub origin_x: OriginX,
    pub origin_y: OriginY,
}

impl OriginAlignment {
    pub const TOP_LEFT: OriginAlignment = OriginAlignment {
        origin_x: OriginX::Left,
        origin_y: OriginY::Top,
    };
}

/// Canvas point a watermark's origin is placed on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnchorPosition {
    pub anchor_x: f64,
    pub anchor_y: f64,
}

/// Anchor, origin and the inputs that produced them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridPositionInfo {
    pub anchor: AnchorPosition,
    pub origin: OriginAlignment,
    pub position: WatermarkPosition,
    pub margin: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

/// Origin lookup for a position. `custom` uses the top-left corner.
pub fn get_origin_from_position(position: WatermarkPosition) -> OriginAlignment {
    let origin_x = match position.column() {
        Some(Column::Left) | None => OriginX::Left,
        Some(Column::Center) => OriginX::Center,
        Some(Column::Right) => OriginX::Right,
    };
    let origin_y = match position.row() {
        Some(Row::Top) | None => OriginY::Top,
        Some(Row::Middle) => OriginY::Center,
        Some(Row::Bottom) => OriginY::Bottom,
    };

    OriginAlignment { origin_x, origin_y }
}

/// Calculate the anchor for a grid position.
///
/// Left/top anchors sit `margin` inside the edge, centers on the midline and
/// right/bottom anchors `margin` inside the far edge. `offset_x_percent` and
/// `offset_y_percent` are percentages of the canvas width/height and may be
/// negative.
///
/// `custom` has no grid slot; its anchor is the canvas origin plus the offset.
/// Use [`resolve_anchor`] to honor a config's raw `x`/`y`.
pub fn calculate_anchor_position(
    canvas: &ImageDimensions,
    position: WatermarkPosition,
    margin: f64,
    offset_x_percent: f64,
    offset_y_percent: f64,
) -> AnchorPosition {
    anchor_with_margins(
        canvas,
        position,
        margin,
        margin,
        offset_x_percent,
        offset_y_percent,
    )
}

/// Same as [`calculate_anchor_position`] with separate horizontal and
/// vertical margins.
pub(crate) fn anchor_with_margins(
    canvas: &ImageDimensions,
    position: WatermarkPosition,
    margin_x: f64,
    margin_y: f64,
    offset_x_percent: f64,
    offset_y_percent: f64,
) -> AnchorPosition {
    let width = f64::from(canvas.width);
    let height = f64::from(canvas.height);
    let pixel_offset_x = offset_x_percent / 100.0 * width;
    let pixel_offset_y = offset_y_percent / 100.0 * height;

    let base_x = match position.column() {
        Some(Column::Left) => margin_x,
        Some(Column::Center) => width / 2.0,
        Some(Column::Right) => width - margin_x,
        None => 0.0,
    };
    let base_y = match position.row() {
        Some(Row::Top) => margin_y,
        Some(Row::Middle) => height / 2.0,
        Some(Row::Bottom) => height - margin_y,
        None => 0.0,
    };

    AnchorPosition {
        anchor_x: base_x + pixel_offset_x,
        anchor_y: base_y + pixel_offset_y,
    }
}

/// Every named position is flush with the canvas edge; only `custom` is not.
///
/// Spacing from the edge for flush placements comes from the offsets.
pub fn is_edge_position(position: WatermarkPosition) -> bool {
    !position.is_custom()
}

/// Anchor with the margin forced to 0 for edge positions.
///
/// Used for image and full-screen watermarks, where any margin drift between
/// preview and export is visible.
pub fn calculate_edge_aligned_anchor_position(
    canvas: &ImageDimensions,
    position: WatermarkPosition,
    margin: f64,
    offset_x_percent: f64,
    offset_y_percent: f64,
) -> AnchorPosition {
    let effective_margin = if is_edge_position(position) {
        0.0
    } else {
        margin
    };

    calculate_anchor_position(
        canvas,
        position,
        effective_margin,
        offset_x_percent,
        offset_y_percent,
    )
}

/// Anchor and origin for a grid position in one call.
pub fn calculate_grid_position_info(
    canvas: &ImageDimensions,
    position: WatermarkPosition,
    margin: f64,
    offset_x_percent: f64,
    offset_y_percent: f64,
) -> GridPositionInfo {
    GridPositionInfo {
        anchor: calculate_anchor_position(
            canvas,
            position,
            margin,
            offset_x_percent,
            offset_y_percent,
        ),
        origin: get_origin_from_position(position),
        position,
        margin,
        offset_x: offset_x_percent,
        offset_y: offset_y_percent,
    }
}

/// Anchor for a pixel-mode [`PositionConfig`].
///
/// `custom` returns the raw `x`/`y` of the config untouched. Grid positions
/// use the given margins and the config's percentage offsets.
pub fn resolve_anchor(
    canvas: &ImageDimensions,
    position: &PositionConfig,
    margin_x: f64,
    margin_y: f64,
) -> AnchorPosition {
    if position.position.is_custom() {
        return AnchorPosition {
            anchor_x: position.x,
            anchor_y: position.y,
        };
    }

    anchor_with_margins(
        canvas,
        position.position,
        margin_x,
        margin_y,
        position.offset_x,
        position.offset_y,
    )
}

/// Top-left corner of a drawable of `size` placed at `anchor` with `origin`.
pub fn top_left_from_anchor(
    anchor: &AnchorPosition,
    origin: OriginAlignment,
    size: &WatermarkSize,
) -> (f64, f64) {
    let left = match origin.origin_x {
        OriginX::Left => anchor.anchor_x,
        OriginX::Center => anchor.anchor_x - size.width / 2.0,
        OriginX::Right => anchor.anchor_x - size.width,
    };
    let top = match origin.origin_y {
        OriginY::Top => anchor.anchor_y,
        OriginY::Center => anchor.anchor_y - size.height / 2.0,
        OriginY::Bottom => anchor.anchor_y - size.height,
    };

    (left, top)
}

//! Full-screen tiling geometry.
//!
//! A full-screen watermark repeats one tile cell across the canvas. The cell
//! holds the watermark's rotation-expanded bounding box plus spacing, and the
//! grid gets one extra row and column so no edge is left uncovered. In
//! diagonal mode every other row shifts by half a cell.

use serde::{Deserialize, Serialize};

use super::config::{estimated_text_length, FullscreenStyle, TileMode};
use super::position::{ImageDimensions, PlacementPosition, WatermarkSize};
use super::WatermarkError;
use crate::config::defaults;

/// Size of one tile cell in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TileSize {
    pub width: f64,
    pub height: f64,
}

/// Per-row shift of the tile grid.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DiagonalOffset {
    pub offset_x: f64,
    pub offset_y: f64,
}

/// How tiles cover a canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TileLayout {
    pub tile: TileSize,
    pub rows: u32,
    pub cols: u32,
    /// Horizontal step between tile origins
    pub spacing_x: f64,
    /// Vertical step between tile origins
    pub spacing_y: f64,
    pub offset: DiagonalOffset,
    pub total_tiles: u32,
}

/// Axis-aligned bounding box of a `width` x `height` box rotated by
/// `rotation` degrees.
pub fn calculate_rotated_bounds(width: f64, height: f64, rotation: f64) -> WatermarkSize {
    let radians = rotation.to_radians();
    let cos = radians.cos().abs();
    let sin = radians.sin().abs();

    WatermarkSize {
        width: width * cos + height * sin,
        height: width * sin + height * cos,
    }
}

/// Unrotated size of the tile content.
fn content_size(style: &FullscreenStyle) -> WatermarkSize {
    match style.mode {
        TileMode::Image => WatermarkSize {
            width: style.image_original_width * style.image_scale,
            height: style.image_original_height * style.image_scale,
        },
        TileMode::Text => {
            let length = estimated_text_length(&style.content) as f64;
            WatermarkSize {
                width: style.font_size * length * defaults::TEXT_WIDTH_FACTOR,
                height: style.font_size * defaults::LINE_HEIGHT_FACTOR,
            }
        }
    }
}

/// Calculate the tile cell for a full-screen watermark.
///
/// The cell never shrinks below `spacing * density` wide and half that high.
/// Rotated content gets an extra half-spacing on both axes.
pub fn calculate_tile_size(style: &FullscreenStyle) -> TileSize {
    let content = content_size(style);
    let base = if style.rotation != 0.0 {
        calculate_rotated_bounds(content.width, content.height, style.rotation)
    } else {
        content
    };

    let spacing = style.tile_spacing;
    let density = style.tile_density;
    let extra = if style.rotation != 0.0 {
        spacing * defaults::ROTATED_TILE_EXTRA
    } else {
        0.0
    };

    TileSize {
        width: (base.width + spacing + extra).max(spacing * density),
        height: (base.height + spacing * 0.5 + extra).max(spacing * density * 0.5),
    }
}

/// Half a tile width for diagonal (brick) layouts, zero otherwise.
pub fn calculate_diagonal_offset(tile: &TileSize, diagonal_mode: bool) -> DiagonalOffset {
    if !diagonal_mode {
        return DiagonalOffset::default();
    }

    DiagonalOffset {
        offset_x: tile.width / 2.0,
        offset_y: 0.0,
    }
}

/// Rows and columns needed to cover `canvas`.
///
/// # Errors
///
/// - [`WatermarkError::DegenerateTile`] if the cell has no area, which
///   happens when spacing, density and content are all zero
/// - [`WatermarkError::TooManyTiles`] if covering the canvas takes more than
///   `MAX_TILES` cells, as with a near-zero image scale and no spacing
pub fn calculate_tile_layout(
    style: &FullscreenStyle,
    canvas: &ImageDimensions,
) -> Result<TileLayout, WatermarkError> {
    canvas.validate()?;

    let tile = calculate_tile_size(style);
    if !(tile.width > 0.0 && tile.height > 0.0) || !tile.width.is_finite() || !tile.height.is_finite() {
        return Err(WatermarkError::DegenerateTile {
            width: tile.width,
            height: tile.height,
        });
    }

    // Counted in f64 first; a tiny cell would overflow u32
    let cols = (f64::from(canvas.width) / tile.width).ceil() + 1.0;
    let rows = (f64::from(canvas.height) / tile.height).ceil() + 1.0;
    let too_many = || WatermarkError::TooManyTiles {
        rows,
        cols,
        max: defaults::MAX_TILES,
    };

    if rows * cols > f64::from(defaults::MAX_TILES) {
        return Err(too_many());
    }
    let (rows, cols) = (rows as u32, cols as u32);
    let total_tiles = rows.checked_mul(cols).ok_or_else(too_many)?;

    Ok(TileLayout {
        tile,
        rows,
        cols,
        spacing_x: tile.width,
        spacing_y: tile.height,
        offset: calculate_diagonal_offset(&tile, style.diagonal_mode),
        total_tiles,
    })
}

/// Top-left corner of every tile in a layout, row by row.
///
/// Odd rows shift left by the diagonal offset, so the shifted rows still
/// start at or before the canvas edge.
pub fn calculate_tile_positions(layout: &TileLayout) -> Vec<PlacementPosition> {
    let capacity = layout.total_tiles.min(defaults::MAX_TILES) as usize;
    let mut positions = Vec::with_capacity(capacity);

    for row in 0..layout.rows {
        let shift = if row % 2 == 1 {
            layout.offset.offset_x
        } else {
            0.0
        };
        let y = f64::from(row) * layout.spacing_y + layout.offset.offset_y;

        for col in 0..layout.cols {
            let x = f64::from(col) * layout.spacing_x - shift;
            positions.push(PlacementPosition::new(x, y));
        }
    }

    positions
}

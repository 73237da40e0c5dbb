//! Watermark geometry error types.
//!
//! Every fallible geometry operation returns [`WatermarkError`]. Errors are
//! local to a single image's computation; batch planning collects them per
//! image instead of aborting.

use thiserror::Error;

/// Errors that can occur while computing watermark geometry.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WatermarkError {
    /// Image or canvas has a zero dimension.
    #[error("Invalid image dimensions: {width}x{height} (both must be > 0)")]
    InvalidDimensions { width: u32, height: u32 },

    /// Invalid configuration value
    #[error("Watermark configuration error: {0}")]
    Config(String),

    /// Proportion data outside the accepted ranges
    #[error("Invalid proportions: {0}")]
    InvalidProportions(String),

    /// The watermark's intrinsic size is required but was not supplied.
    #[error("Missing original size for {kind} watermark")]
    MissingOriginalSize { kind: &'static str },

    /// The watermark kind is not handled by the requested operation.
    #[error("{kind} watermarks are not supported by {operation}")]
    UnsupportedKind {
        kind: &'static str,
        operation: &'static str,
    },

    /// A tile cell collapsed to zero area and cannot cover a canvas.
    #[error("Degenerate tile size: {width}x{height}")]
    DegenerateTile { width: f64, height: f64 },

    /// Covering the canvas would take more tiles than the layout allows.
    #[error("Tile layout needs {rows}x{cols} tiles, more than the limit of {max}")]
    TooManyTiles { rows: f64, cols: f64, max: u32 },

    /// Batch operations need at least one image.
    #[error("Batch contains no images")]
    EmptyBatch,

    /// The render surface rejected a draw call.
    #[error("Render surface error: {0}")]
    Surface(String),
}

impl WatermarkError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Whether the error stems from the inputs of one image rather than the
    /// shared batch configuration.
    pub fn is_per_image(&self) -> bool {
        matches!(
            self,
            Self::InvalidDimensions { .. }
                | Self::MissingOriginalSize { .. }
                | Self::TooManyTiles { .. }
        )
    }
}

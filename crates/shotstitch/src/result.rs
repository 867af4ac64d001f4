//! Result and error types for shotstitch.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for shotstitch operations
pub type ShotResult<T> = Result<T, ShotError>;

/// Errors that can occur while stitching or verifying screenshots
#[derive(Debug, Error)]
pub enum ShotError {
    /// Metadata document is malformed or a descriptor is missing a field
    #[error("Metadata error: {message}")]
    Metadata {
        /// Error message
        message: String,
    },

    /// An expected tile file does not exist
    #[error("Missing tile: {}", path.display())]
    MissingTile {
        /// Path the tile was expected at
        path: PathBuf,
    },

    /// A tile does not fit the geometry derived from the edge tiles
    #[error(
        "Tile {} is {actual_width}x{actual_height}, expected {expected_width}x{expected_height}",
        path.display()
    )]
    TileGeometry {
        /// Offending tile
        path: PathBuf,
        /// Width derived from row 0
        expected_width: u32,
        /// Height derived from column 0
        expected_height: u32,
        /// Actual tile width
        actual_width: u32,
        /// Actual tile height
        actual_height: u32,
    },

    /// Tile grid has a zero dimension
    #[error("Invalid tile grid for {name}: {width}x{height}")]
    InvalidGrid {
        /// Screenshot name
        name: String,
        /// Grid columns
        width: u32,
        /// Grid rows
        height: u32,
    },

    /// Summed tile sizes do not fit a `u32` canvas
    #[error("Composite for {name} is too large")]
    CompositeTooLarge {
        /// Screenshot name
        name: String,
    },

    /// The baseline directory to be replaced contains the tile directory
    #[error(
        "Refusing to replace {}: it contains the tile directory {}",
        output.display(),
        input.display()
    )]
    OutputContainsInput {
        /// Directory that would have been removed
        output: PathBuf,
        /// Tile directory inside it
        input: PathBuf,
    },

    /// An image could not be opened or decoded
    #[error("Failed to load image {}: {message}", path.display())]
    ImageLoad {
        /// Image path
        path: PathBuf,
        /// Error message
        message: String,
    },

    /// A composite could not be encoded or written
    #[error("Failed to write image {}: {message}", path.display())]
    ImageEncode {
        /// Output path
        path: PathBuf,
        /// Error message
        message: String,
    },

    /// One or more screenshots did not match the baseline
    #[error("{message}")]
    Verify {
        /// Newline-joined failure messages
        message: String,
        /// Number of failing screenshots
        failures: usize,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ShotError {
    /// Create a metadata error
    #[must_use]
    pub fn metadata(message: impl Into<String>) -> Self {
        Self::Metadata {
            message: message.into(),
        }
    }

    /// Create an image load error
    #[must_use]
    pub fn image_load(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::ImageLoad {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// Check if this is the aggregate verification failure
    #[must_use]
    pub const fn is_verify(&self) -> bool {
        matches!(self, Self::Verify { .. })
    }
}

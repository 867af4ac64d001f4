//! Session configuration

use crate::naming::{NamingScheme, TileNaming};
use crate::stitch::TileStitcher;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// What a verify run does when a screenshot cannot be stitched or loaded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IoFailureMode {
    /// Abort the whole run on the first I/O error
    #[default]
    Abort,
    /// Record the screenshot as a failed case and continue
    RecordAsFailure,
}

/// Settings shared by record and verify sessions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Tile naming convention
    pub naming: NamingScheme,
    /// Tile file extension (without the dot)
    pub tile_extension: String,
    /// Validate every tile against the edge-tile geometry
    pub check_geometry: bool,
    /// Handling of per-screenshot I/O errors during verify
    pub io_failure_mode: IoFailureMode,
    /// Parent directory for verify scratch space (system temp dir if unset)
    pub scratch_root: Option<PathBuf>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            naming: NamingScheme::Grid,
            tile_extension: "png".to_string(),
            check_geometry: false,
            io_failure_mode: IoFailureMode::Abort,
            scratch_root: None,
        }
    }
}

impl SessionConfig {
    /// Create new default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the naming scheme
    #[must_use]
    pub const fn with_naming(mut self, naming: NamingScheme) -> Self {
        self.naming = naming;
        self
    }

    /// Set the tile extension
    #[must_use]
    pub fn with_tile_extension(mut self, extension: impl Into<String>) -> Self {
        self.tile_extension = extension.into();
        self
    }

    /// Enable the tile geometry check
    #[must_use]
    pub const fn with_geometry_check(mut self, check: bool) -> Self {
        self.check_geometry = check;
        self
    }

    /// Set the I/O failure mode
    #[must_use]
    pub const fn with_io_failure_mode(mut self, mode: IoFailureMode) -> Self {
        self.io_failure_mode = mode;
        self
    }

    /// Set the scratch root
    #[must_use]
    pub fn with_scratch_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.scratch_root = Some(root.into());
        self
    }

    /// Build the stitcher described by this configuration
    #[must_use]
    pub fn stitcher(&self) -> TileStitcher<Box<dyn TileNaming>> {
        TileStitcher::new(self.naming.naming(&self.tile_extension))
            .with_geometry_check(self.check_geometry)
    }
}

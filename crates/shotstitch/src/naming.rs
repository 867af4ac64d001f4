//! Tile file naming conventions.

use serde::{Deserialize, Serialize};

/// Maps a grid coordinate of a screenshot to the file name of its tile
pub trait TileNaming {
    /// File name (relative to the tile directory) of tile `(col, row)`
    fn tile_file_name(&self, name: &str, col: u32, row: u32) -> String;
}

/// `<name>_<col>_<row>.<ext>` for every tile
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridTileNaming {
    extension: String,
}

impl GridTileNaming {
    /// Use a custom file extension (without the dot)
    #[must_use]
    pub fn with_extension(extension: impl Into<String>) -> Self {
        Self {
            extension: extension.into(),
        }
    }
}

impl Default for GridTileNaming {
    fn default() -> Self {
        Self::with_extension("png")
    }
}

impl TileNaming for GridTileNaming {
    fn tile_file_name(&self, name: &str, col: u32, row: u32) -> String {
        format!("{name}_{col}_{row}.{}", self.extension)
    }
}

/// Layout written by the on-device capture library: the origin tile keeps
/// the bare screenshot name, every other tile gets the `_<col>_<row>` suffix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OriginUnsuffixedNaming {
    extension: String,
}

impl OriginUnsuffixedNaming {
    /// Use a custom file extension (without the dot)
    #[must_use]
    pub fn with_extension(extension: impl Into<String>) -> Self {
        Self {
            extension: extension.into(),
        }
    }
}

impl Default for OriginUnsuffixedNaming {
    fn default() -> Self {
        Self::with_extension("png")
    }
}

impl TileNaming for OriginUnsuffixedNaming {
    fn tile_file_name(&self, name: &str, col: u32, row: u32) -> String {
        if col == 0 && row == 0 {
            format!("{name}.{}", self.extension)
        } else {
            format!("{name}_{col}_{row}.{}", self.extension)
        }
    }
}

/// Serializable choice between the built-in naming conventions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NamingScheme {
    /// [`GridTileNaming`]
    #[default]
    Grid,
    /// [`OriginUnsuffixedNaming`]
    OriginUnsuffixed,
}

impl NamingScheme {
    /// Build the naming for this scheme with the given extension
    #[must_use]
    pub fn naming(self, extension: &str) -> Box<dyn TileNaming> {
        match self {
            Self::Grid => Box::new(GridTileNaming::with_extension(extension)),
            Self::OriginUnsuffixed => Box::new(OriginUnsuffixedNaming::with_extension(extension)),
        }
    }
}

impl<T: TileNaming + ?Sized> TileNaming for Box<T> {
    fn tile_file_name(&self, name: &str, col: u32, row: u32) -> String {
        (**self).tile_file_name(name, col, row)
    }
}

impl<T: TileNaming + ?Sized> TileNaming for &T {
    fn tile_file_name(&self, name: &str, col: u32, row: u32) -> String {
        (**self).tile_file_name(name, col, row)
    }
}

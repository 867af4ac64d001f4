//! Tile reassembly.
//!
//! A screenshot taller or wider than the device viewport is captured as a
//! grid of tiles. The composite is rebuilt by measuring the edge tiles and
//! pasting every tile at a uniform offset:
//!
//! ```text
//!   col 0      col 1      col 2
//! ┌──────────┬──────────┬──────┐
//! │ (0,0)    │ (1,0)    │(2,0) │  row 0   canvas width  = Σ width(i, 0)
//! ├──────────┼──────────┼──────┤
//! │ (0,1)    │ (1,1)    │(2,1) │  row 1   canvas height = Σ height(0, j)
//! └──────────┴──────────┴──────┘
//!   offset(i, j) = (i * width(0,0), j * height(0,0))
//! ```
//!
//! Only the edge tiles are measured. Interior tiles are trusted to agree
//! unless the geometry check is enabled.

use crate::naming::{GridTileNaming, TileNaming};
use crate::result::{ShotError, ShotResult};
use image::{ImageFormat, RgbaImage};
use std::path::{Path, PathBuf};
use tracing::debug;

/// A reassembled screenshot
pub type CompositeImage = RgbaImage;

/// Rebuilds composites from tile grids
#[derive(Debug, Clone)]
pub struct TileStitcher<N = GridTileNaming> {
    naming: N,
    check_geometry: bool,
}

impl TileStitcher<GridTileNaming> {
    /// Stitcher for `<name>_<col>_<row>.png` tiles
    #[must_use]
    pub fn grid() -> Self {
        Self::new(GridTileNaming::default())
    }
}

impl Default for TileStitcher<GridTileNaming> {
    fn default() -> Self {
        Self::grid()
    }
}

impl<N: TileNaming> TileStitcher<N> {
    /// Create a stitcher with the given tile naming
    #[must_use]
    pub const fn new(naming: N) -> Self {
        Self {
            naming,
            check_geometry: false,
        }
    }

    /// Validate every tile against the edge-tile geometry before pasting
    #[must_use]
    pub const fn with_geometry_check(mut self, check: bool) -> Self {
        self.check_geometry = check;
        self
    }

    /// Path of tile `(col, row)` of `name` inside `input_dir`
    #[must_use]
    pub fn tile_path(&self, input_dir: &Path, name: &str, col: u32, row: u32) -> PathBuf {
        input_dir.join(self.naming.tile_file_name(name, col, row))
    }

    /// Reassemble `name` from a `grid_width` x `grid_height` tile grid
    ///
    /// # Errors
    ///
    /// Returns [`ShotError::MissingTile`] if a tile file does not exist,
    /// [`ShotError::ImageLoad`] if one cannot be decoded, and
    /// [`ShotError::TileGeometry`] if the geometry check is on and fails
    pub fn stitch(
        &self,
        input_dir: &Path,
        name: &str,
        grid_width: u32,
        grid_height: u32,
    ) -> ShotResult<CompositeImage> {
        if grid_width == 0 || grid_height == 0 {
            return Err(ShotError::InvalidGrid {
                name: name.to_string(),
                width: grid_width,
                height: grid_height,
            });
        }

        let (tile_width, tile_height) = self.tile_dimensions(input_dir, name, 0, 0)?;

        let column_widths = (0..grid_width)
            .map(|col| Ok(self.tile_dimensions(input_dir, name, col, 0)?.0))
            .collect::<ShotResult<Vec<u32>>>()?;
        let row_heights = (0..grid_height)
            .map(|row| Ok(self.tile_dimensions(input_dir, name, 0, row)?.1))
            .collect::<ShotResult<Vec<u32>>>()?;

        let canvas_width = canvas_extent(name, &column_widths)?;
        let canvas_height = canvas_extent(name, &row_heights)?;

        if self.check_geometry {
            self.validate_geometry(
                input_dir,
                name,
                (tile_width, tile_height),
                &column_widths,
                &row_heights,
            )?;
        }

        let mut canvas = RgbaImage::new(canvas_width, canvas_height);

        for col in 0..grid_width {
            for row in 0..grid_height {
                let path = self.existing_tile(input_dir, name, col, row)?;
                let tile = image::open(&path)
                    .map_err(|e| ShotError::image_load(&path, e))?
                    .into_rgba8();
                image::imageops::replace(
                    &mut canvas,
                    &tile,
                    i64::from(col) * i64::from(tile_width),
                    i64::from(row) * i64::from(tile_height),
                );
            }
        }

        debug!(
            screenshot = name,
            grid = %format!("{grid_width}x{grid_height}"),
            width = canvas_width,
            height = canvas_height,
            "stitched composite"
        );

        Ok(canvas)
    }

    /// Reassemble `name` and write it to `<output_dir>/<name>.png`
    ///
    /// # Errors
    ///
    /// Propagates [`TileStitcher::stitch`] errors, and returns
    /// [`ShotError::ImageEncode`] if the composite cannot be written
    pub fn stitch_to(
        &self,
        input_dir: &Path,
        output_dir: &Path,
        name: &str,
        grid_width: u32,
        grid_height: u32,
    ) -> ShotResult<PathBuf> {
        let canvas = self.stitch(input_dir, name, grid_width, grid_height)?;
        let output = output_dir.join(format!("{name}.png"));
        write_png(&canvas, &output)?;
        Ok(output)
    }

    fn existing_tile(&self, input_dir: &Path, name: &str, col: u32, row: u32) -> ShotResult<PathBuf> {
        let path = self.tile_path(input_dir, name, col, row);
        if path.is_file() {
            Ok(path)
        } else {
            Err(ShotError::MissingTile { path })
        }
    }

    fn tile_dimensions(
        &self,
        input_dir: &Path,
        name: &str,
        col: u32,
        row: u32,
    ) -> ShotResult<(u32, u32)> {
        let path = self.existing_tile(input_dir, name, col, row)?;
        image::image_dimensions(&path).map_err(|e| ShotError::image_load(&path, e))
    }

    fn validate_geometry(
        &self,
        input_dir: &Path,
        name: &str,
        (tile_width, tile_height): (u32, u32),
        column_widths: &[u32],
        row_heights: &[u32],
    ) -> ShotResult<()> {
        let last_col = column_widths.len() - 1;
        let last_row = row_heights.len() - 1;

        for (col, &width) in column_widths.iter().enumerate() {
            for (row, &height) in row_heights.iter().enumerate() {
                let (actual_width, actual_height) =
                    self.tile_dimensions(input_dir, name, col as u32, row as u32)?;

                // Offsets are uniform, so only the trailing column and row may be short.
                let expected_width = if col < last_col { tile_width } else { width };
                let expected_height = if row < last_row { tile_height } else { height };

                if actual_width != expected_width || actual_height != expected_height {
                    return Err(ShotError::TileGeometry {
                        path: self.tile_path(input_dir, name, col as u32, row as u32),
                        expected_width,
                        expected_height,
                        actual_width,
                        actual_height,
                    });
                }
            }
        }
        Ok(())
    }
}

/// Sum edge-tile sizes into one canvas dimension
fn canvas_extent(name: &str, sizes: &[u32]) -> ShotResult<u32> {
    sizes
        .iter()
        .try_fold(0u32, |total, &size| total.checked_add(size))
        .ok_or_else(|| ShotError::CompositeTooLarge {
            name: name.to_string(),
        })
}

/// Encode a composite as PNG
///
/// # Errors
///
/// Returns [`ShotError::ImageEncode`] if the file cannot be written
pub fn write_png(image: &CompositeImage, path: &Path) -> ShotResult<()> {
    image
        .save_with_format(path, ImageFormat::Png)
        .map_err(|e| ShotError::ImageEncode {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
}

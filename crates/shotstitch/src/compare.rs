//! Exact image comparison.
//!
//! Two composites are equal only if every channel of every pixel, alpha
//! included, is identical. There is no tolerance.

use crate::result::{ShotError, ShotResult};
use image::RgbaImage;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Bounding box of the pixels that differ between two images
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffRegion {
    /// X coordinate of top-left corner
    pub x: u32,
    /// Y coordinate of top-left corner
    pub y: u32,
    /// Width of region
    pub width: u32,
    /// Height of region
    pub height: u32,
}

impl DiffRegion {
    /// Create a new region
    #[must_use]
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Check if a point is within this region
    #[must_use]
    pub const fn contains(&self, px: u32, py: u32) -> bool {
        px >= self.x && px < self.x + self.width && py >= self.y && py < self.y + self.height
    }

    fn include(self, px: u32, py: u32) -> Self {
        let left = self.x.min(px);
        let top = self.y.min(py);
        let right = (self.x + self.width).max(px + 1);
        let bottom = (self.y + self.height).max(py + 1);
        Self::new(left, top, right - left, bottom - top)
    }
}

/// Outcome of comparing two images
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageDiff {
    /// Whether both images have the same dimensions
    pub dimensions_match: bool,
    /// Number of pixels with at least one differing channel
    pub diff_pixel_count: usize,
    /// Bounding box of the differing pixels, `None` when identical
    pub bounding_box: Option<DiffRegion>,
}

impl ImageDiff {
    /// Check if images are identical
    #[must_use]
    pub const fn is_identical(&self) -> bool {
        self.dimensions_match && self.bounding_box.is_none()
    }
}

/// Compares composites on disk or in memory
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageComparator;

impl ImageComparator {
    /// Create a comparator
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Check whether the images at `a` and `b` are pixel-identical
    ///
    /// # Errors
    ///
    /// Returns [`ShotError::ImageLoad`] if either image cannot be opened
    pub fn are_equal(&self, a: &Path, b: &Path) -> ShotResult<bool> {
        Ok(self.diff(a, b)?.is_identical())
    }

    /// Compare the images at `a` and `b`
    ///
    /// # Errors
    ///
    /// Returns [`ShotError::ImageLoad`] if either image cannot be opened
    pub fn diff(&self, a: &Path, b: &Path) -> ShotResult<ImageDiff> {
        let first = load_rgba(a)?;
        let second = load_rgba(b)?;
        Ok(self.diff_images(&first, &second))
    }

    /// Compare two in-memory images
    #[must_use]
    pub fn diff_images(&self, a: &RgbaImage, b: &RgbaImage) -> ImageDiff {
        if a.dimensions() != b.dimensions() {
            let (width, height) = (a.width().max(b.width()), a.height().max(b.height()));
            return ImageDiff {
                dimensions_match: false,
                diff_pixel_count: 0,
                bounding_box: (width > 0 && height > 0)
                    .then(|| DiffRegion::new(0, 0, width, height)),
            };
        }

        let mut diff_pixel_count = 0usize;
        let mut bounding_box: Option<DiffRegion> = None;

        for ((x, y, pa), pb) in a.enumerate_pixels().zip(b.pixels()) {
            if pa != pb {
                diff_pixel_count += 1;
                bounding_box = Some(match bounding_box {
                    Some(region) => region.include(x, y),
                    None => DiffRegion::new(x, y, 1, 1),
                });
            }
        }

        ImageDiff {
            dimensions_match: true,
            diff_pixel_count,
            bounding_box,
        }
    }
}

fn load_rgba(path: &Path) -> ShotResult<RgbaImage> {
    Ok(image::open(path)
        .map_err(|e| ShotError::image_load(path, e))?
        .into_rgba8())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use image::Rgba;
    use tempfile::TempDir;

    fn solid(width: u32, height: u32, color: [u8; 4]) -> RgbaImage {
        RgbaImage::from_pixel(width, height, Rgba(color))
    }

    mod region_tests {
        use super::*;

        #[test]
        fn test_contains() {
            let region = DiffRegion::new(2, 3, 4, 5);
            assert!(region.contains(2, 3));
            assert!(region.contains(5, 7));
            assert!(!region.contains(6, 3));
            assert!(!region.contains(2, 8));
        }

        #[test]
        fn test_include_grows() {
            let region = DiffRegion::new(5, 5, 1, 1).include(2, 8);
            assert_eq!(region, DiffRegion::new(2, 5, 4, 4));
        }
    }

    mod diff_tests {
        use super::*;

        #[test]
        fn test_identical() {
            let img = solid(4, 4, [10, 20, 30, 255]);
            let diff = ImageComparator::new().diff_images(&img, &img.clone());
            assert!(diff.is_identical());
            assert_eq!(diff.diff_pixel_count, 0);
            assert!(diff.bounding_box.is_none());
        }

        #[test]
        fn test_single_channel_off_by_one() {
            let a = solid(4, 4, [10, 20, 30, 255]);
            let mut b = a.clone();
            b.put_pixel(1, 2, Rgba([10, 21, 30, 255]));

            let diff = ImageComparator::new().diff_images(&a, &b);
            assert!(!diff.is_identical());
            assert_eq!(diff.diff_pixel_count, 1);
            assert_eq!(diff.bounding_box, Some(DiffRegion::new(1, 2, 1, 1)));
        }

        #[test]
        fn test_alpha_counts() {
            let a = solid(2, 2, [0, 0, 0, 255]);
            let mut b = a.clone();
            b.put_pixel(0, 0, Rgba([0, 0, 0, 254]));
            assert!(!ImageComparator::new().diff_images(&a, &b).is_identical());
        }

        #[test]
        fn test_bounding_box_spans_all_differences() {
            let a = solid(10, 10, [0, 0, 0, 255]);
            let mut b = a.clone();
            b.put_pixel(2, 7, Rgba([1, 0, 0, 255]));
            b.put_pixel(8, 1, Rgba([1, 0, 0, 255]));

            let diff = ImageComparator::new().diff_images(&a, &b);
            assert_eq!(diff.diff_pixel_count, 2);
            assert_eq!(diff.bounding_box, Some(DiffRegion::new(2, 1, 7, 7)));
        }

        #[test]
        fn test_dimension_mismatch_is_not_equal() {
            let a = solid(2, 2, [0, 0, 0, 255]);
            let b = solid(3, 2, [0, 0, 0, 255]);
            let diff = ImageComparator::new().diff_images(&a, &b);
            assert!(!diff.dimensions_match);
            assert!(!diff.is_identical());
            assert_eq!(diff.bounding_box, Some(DiffRegion::new(0, 0, 3, 2)));
        }
    }

    mod file_tests {
        use super::*;

        #[test]
        fn test_are_equal_on_disk() {
            let dir = TempDir::new().unwrap();
            let a = dir.path().join("a.png");
            let b = dir.path().join("b.png");
            let c = dir.path().join("c.png");
            solid(3, 3, [1, 2, 3, 255]).save(&a).unwrap();
            solid(3, 3, [1, 2, 3, 255]).save(&b).unwrap();
            solid(3, 3, [1, 2, 4, 255]).save(&c).unwrap();

            let comparator = ImageComparator::new();
            assert!(comparator.are_equal(&a, &b).unwrap());
            assert!(!comparator.are_equal(&a, &c).unwrap());
        }

        #[test]
        fn test_missing_file() {
            let dir = TempDir::new().unwrap();
            let a = dir.path().join("a.png");
            solid(1, 1, [0, 0, 0, 255]).save(&a).unwrap();

            let err = ImageComparator::new()
                .are_equal(&a, &dir.path().join("missing.png"))
                .unwrap_err();
            match err {
                ShotError::ImageLoad { path, .. } => assert!(path.ends_with("missing.png")),
                other => panic!("unexpected error: {other}"),
            }
        }

        #[test]
        fn test_undecodable_file() {
            let dir = TempDir::new().unwrap();
            let a = dir.path().join("a.png");
            std::fs::write(&a, b"garbage").unwrap();
            assert!(ImageComparator::new().are_equal(&a, &a).is_err());
        }
    }
}

//! Screenshot metadata catalog.
//!
//! The capture side writes one `<screenshot>` entry per screenshot into a
//! `metadata.xml` document next to the tiles:
//!
//! ```text
//! <screenshots>
//!   <screenshot>
//!     <name>home</name>
//!     <test_class>com.example.HomeTest</test_class>
//!     <test_name>testHome</test_name>
//!     <tile_width>2</tile_width>
//!     <tile_height>1</tile_height>
//!   </screenshot>
//! </screenshots>
//! ```
//!
//! Entries are yielded in document order. Both sessions and the report use
//! that order.

use crate::result::{ShotError, ShotResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};

/// File name of the metadata document inside the tile directory
pub const METADATA_FILE_NAME: &str = "metadata.xml";

/// One screenshot as described by the capture metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenshotDescriptor {
    /// Screenshot name, unique within a run
    pub name: String,
    /// Number of tile columns
    pub tile_grid_width: u32,
    /// Number of tile rows
    pub tile_grid_height: u32,
    /// Owning test class
    pub test_class: String,
    /// Owning test method
    pub test_name: String,
    /// Free-form description, if the capture recorded one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ScreenshotDescriptor {
    /// Create a descriptor
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        tile_grid_width: u32,
        tile_grid_height: u32,
        test_class: impl Into<String>,
        test_name: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            tile_grid_width,
            tile_grid_height,
            test_class: test_class.into(),
            test_name: test_name.into(),
            description: None,
        }
    }

    /// Attach a description
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// File name of the stitched composite
    #[must_use]
    pub fn composite_file_name(&self) -> String {
        format!("{}.png", self.name)
    }

    /// Total number of tiles in the grid
    #[must_use]
    pub const fn tile_count(&self) -> u64 {
        self.tile_grid_width as u64 * self.tile_grid_height as u64
    }
}

/// Anything that can produce screenshot descriptors in a stable order
pub trait MetadataSource {
    /// Read every descriptor, in source order
    ///
    /// # Errors
    ///
    /// Returns [`ShotError::Metadata`] if the source is malformed or an
    /// entry is missing a required field
    fn descriptors(&self) -> ShotResult<Vec<ScreenshotDescriptor>>;
}

/// Metadata parsed from a `metadata.xml` document
#[derive(Debug, Clone)]
pub struct XmlMetadata {
    text: String,
    origin: Option<PathBuf>,
}

impl XmlMetadata {
    /// Read the document at `path`
    ///
    /// # Errors
    ///
    /// Returns [`ShotError::Metadata`] if the file cannot be read
    pub fn open(path: impl AsRef<Path>) -> ShotResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            ShotError::metadata(format!("cannot read {}: {e}", path.display()))
        })?;
        Ok(Self {
            text,
            origin: Some(path.to_path_buf()),
        })
    }

    /// Read `metadata.xml` from a tile directory
    ///
    /// # Errors
    ///
    /// Returns [`ShotError::Metadata`] if the file cannot be read
    pub fn in_dir(dir: impl AsRef<Path>) -> ShotResult<Self> {
        Self::open(dir.as_ref().join(METADATA_FILE_NAME))
    }

    /// Wrap an in-memory document
    #[must_use]
    pub fn from_xml(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            origin: None,
        }
    }

    fn location(&self) -> String {
        self.origin.as_ref().map_or_else(
            || "<inline metadata>".to_string(),
            |p| p.display().to_string(),
        )
    }
}

impl MetadataSource for XmlMetadata {
    fn descriptors(&self) -> ShotResult<Vec<ScreenshotDescriptor>> {
        let doc = roxmltree::Document::parse(&self.text)
            .map_err(|e| ShotError::metadata(format!("{}: {e}", self.location())))?;

        let descriptors = doc
            .root_element()
            .descendants()
            .filter(|n| n.has_tag_name("screenshot"))
            .enumerate()
            .map(|(index, node)| parse_screenshot(node, index))
            .collect::<ShotResult<Vec<_>>>()?;

        validate_names(&descriptors)?;
        Ok(descriptors)
    }
}

fn child_text<'a>(node: roxmltree::Node<'a, '_>, tag: &str) -> Option<&'a str> {
    node.children()
        .find(|c| c.has_tag_name(tag))
        .and_then(|c| c.text())
        .map(str::trim)
}

fn required_text(node: roxmltree::Node<'_, '_>, tag: &str, index: usize) -> ShotResult<String> {
    match child_text(node, tag) {
        Some(text) if !text.is_empty() => Ok(text.to_string()),
        _ => Err(ShotError::metadata(format!(
            "screenshot #{index} is missing <{tag}>"
        ))),
    }
}

fn required_grid_size(node: roxmltree::Node<'_, '_>, tag: &str, index: usize) -> ShotResult<u32> {
    let text = required_text(node, tag, index)?;
    match text.parse::<u32>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(ShotError::metadata(format!(
            "screenshot #{index} has invalid <{tag}>: {text:?}"
        ))),
    }
}

fn parse_screenshot(node: roxmltree::Node<'_, '_>, index: usize) -> ShotResult<ScreenshotDescriptor> {
    Ok(ScreenshotDescriptor {
        name: required_text(node, "name", index)?,
        tile_grid_width: required_grid_size(node, "tile_width", index)?,
        tile_grid_height: required_grid_size(node, "tile_height", index)?,
        test_class: required_text(node, "test_class", index)?,
        test_name: required_text(node, "test_name", index)?,
        description: child_text(node, "description")
            .filter(|d| !d.is_empty())
            .map(str::to_string),
    })
}

fn validate_names(descriptors: &[ScreenshotDescriptor]) -> ShotResult<()> {
    let mut seen = HashSet::new();
    for d in descriptors {
        if !is_plain_file_name(&d.name) {
            return Err(ShotError::metadata(format!(
                "screenshot name must be a plain file name: {:?}",
                d.name
            )));
        }
        if !seen.insert(d.name.as_str()) {
            return Err(ShotError::metadata(format!(
                "duplicate screenshot name: {}",
                d.name
            )));
        }
    }
    Ok(())
}

/// Names become file names inside the tile, baseline and scratch directories.
fn is_plain_file_name(name: &str) -> bool {
    if name.contains(['/', '\\']) {
        return false;
    }
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(part)), None) if part == OsStr::new(name)
    )
}

/// Metadata held in memory
#[derive(Debug, Clone, Default)]
pub struct StaticMetadata {
    descriptors: Vec<ScreenshotDescriptor>,
}

impl StaticMetadata {
    /// Create from a list of descriptors
    #[must_use]
    pub fn new(descriptors: Vec<ScreenshotDescriptor>) -> Self {
        Self { descriptors }
    }

    /// Append a descriptor
    #[must_use]
    pub fn with(mut self, descriptor: ScreenshotDescriptor) -> Self {
        self.descriptors.push(descriptor);
        self
    }
}

impl MetadataSource for StaticMetadata {
    fn descriptors(&self) -> ShotResult<Vec<ScreenshotDescriptor>> {
        for d in &self.descriptors {
            if d.name.is_empty() {
                return Err(ShotError::metadata("screenshot with empty name"));
            }
            if d.tile_grid_width == 0 || d.tile_grid_height == 0 {
                return Err(ShotError::metadata(format!(
                    "screenshot {} has an empty tile grid",
                    d.name
                )));
            }
        }
        validate_names(&self.descriptors)?;
        Ok(self.descriptors.clone())
    }
}

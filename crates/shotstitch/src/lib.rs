//! shotstitch: tiled screenshot reassembly and baseline verification
//!
//! Instrumented UI tests capture each screenshot as a grid of tiles plus a
//! `metadata.xml` catalog. This crate rebuilds the full-resolution
//! composites and either records them as the accepted baseline or verifies
//! a fresh capture against that baseline, pixel for pixel.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌────────────────┐   ┌────────────┐
//! │ XmlMetadata  │──►│ TileStitcher │──►│ImageComparator │──►│ ReportSink │
//! │ (descriptors)│   │ (composites) │   │ (exact diff)   │   │ (JUnit)    │
//! └──────────────┘   └──────────────┘   └────────────────┘   └────────────┘
//!         RecordSession ──┘                  VerificationSession
//! ```
//!
//! # Example
//!
//! ```no_run
//! use shotstitch::{JunitReport, RecordSession, VerificationSession, XmlMetadata};
//! use std::path::Path;
//!
//! # fn main() -> shotstitch::ShotResult<()> {
//! let input = Path::new("build/screenshots");
//! let baseline = Path::new("screenshots");
//! let metadata = XmlMetadata::in_dir(input)?;
//!
//! RecordSession::grid().record(input, baseline, &metadata)?;
//!
//! let mut junit = JunitReport::new("build/reports");
//! VerificationSession::grid().verify(input, baseline, &metadata, Some(&mut junit))?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod catalog;
mod compare;
mod config;
mod naming;
mod report;
mod result;
mod session;
mod stitch;

pub use catalog::{
    MetadataSource, ScreenshotDescriptor, StaticMetadata, XmlMetadata, METADATA_FILE_NAME,
};
pub use compare::{DiffRegion, ImageComparator, ImageDiff};
pub use config::{IoFailureMode, SessionConfig};
pub use naming::{GridTileNaming, NamingScheme, OriginUnsuffixedNaming, TileNaming};
pub use report::{
    render_junit, JsonReport, JunitReport, ReportSink, TestCaseReport, ELAPSED_PLACEHOLDER,
    MISMATCH_DETAIL, SUITE_NAME,
};
pub use result::{ShotError, ShotResult};
pub use session::{ComparisonResult, RecordSession, VerificationReport, VerificationSession};
pub use stitch::{write_png, CompositeImage, TileStitcher};

//! Record and verify sessions.
//!
//! # Architecture
//!
//! ```text
//!                     ┌────────────────┐
//!  metadata.xml ─────►│ MetadataSource │
//!                     └───────┬────────┘
//!               ┌─────────────┴─────────────┐
//!               ▼                           ▼
//!      ┌────────────────┐         ┌────────────────────┐
//!      │ RecordSession  │         │ VerificationSession│
//!      │ wipe baseline, │         │ stitch to scratch, │──► ReportSink
//!      │ stitch into it │         │ compare, report    │
//!      └───────┬────────┘         └─────────┬──────────┘
//!              └──────────► TileStitcher ◄──┘
//! ```
//!
//! Verification is exhaustive: content mismatches are collected and raised
//! together after the report has been emitted. I/O errors abort the run
//! unless [`IoFailureMode::RecordAsFailure`] is configured.

use crate::catalog::{MetadataSource, ScreenshotDescriptor};
use crate::compare::ImageComparator;
use crate::config::{IoFailureMode, SessionConfig};
use crate::naming::{GridTileNaming, TileNaming};
use crate::report::{ReportSink, TestCaseReport, MISMATCH_DETAIL, SUITE_NAME};
use crate::result::{ShotError, ShotResult};
use crate::stitch::TileStitcher;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, info, warn};

/// Outcome of verifying one screenshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonResult {
    /// Screenshot name
    pub screenshot_name: String,
    /// Whether the screenshot matched its baseline
    pub matched: bool,
    /// Human-readable failure message
    pub failure_message: Option<String>,
}

impl ComparisonResult {
    /// Create a matching result
    #[must_use]
    pub fn matched(name: impl Into<String>) -> Self {
        Self {
            screenshot_name: name.into(),
            matched: true,
            failure_message: None,
        }
    }

    /// Create a failing result
    #[must_use]
    pub fn failed(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            screenshot_name: name.into(),
            matched: false,
            failure_message: Some(message.into()),
        }
    }
}

/// Results of one verify run, in catalog order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationReport {
    /// Per-screenshot results
    pub results: Vec<ComparisonResult>,
}

impl VerificationReport {
    /// Check if every screenshot matched
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.results.iter().all(|r| r.matched)
    }

    /// Get failing results
    #[must_use]
    pub fn failures(&self) -> Vec<&ComparisonResult> {
        self.results.iter().filter(|r| !r.matched).collect()
    }

    /// Get number of matching screenshots
    #[must_use]
    pub fn passed_count(&self) -> usize {
        self.results.iter().filter(|r| r.matched).count()
    }

    /// Get total screenshot count
    #[must_use]
    pub fn total_count(&self) -> usize {
        self.results.len()
    }

    /// Generate summary string
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "{SUITE_NAME}: {}/{} matched",
            self.passed_count(),
            self.total_count()
        )
    }

    /// Newline-joined failure messages
    #[must_use]
    pub fn failure_message(&self) -> String {
        self.results
            .iter()
            .filter_map(|r| r.failure_message.as_deref())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Turn a report with failures into [`ShotError::Verify`]
    ///
    /// # Errors
    ///
    /// Returns [`ShotError::Verify`] if any screenshot failed
    pub fn into_result(self) -> ShotResult<Self> {
        let failures = self.failures().len();
        if failures == 0 {
            Ok(self)
        } else {
            Err(ShotError::Verify {
                message: self.failure_message(),
                failures,
            })
        }
    }
}

/// Re-establishes the accepted baseline
#[derive(Debug, Clone)]
pub struct RecordSession<N = GridTileNaming> {
    stitcher: TileStitcher<N>,
}

impl RecordSession<GridTileNaming> {
    /// Session using `<name>_<col>_<row>.png` tiles
    #[must_use]
    pub fn grid() -> Self {
        Self::new(TileStitcher::grid())
    }
}

impl RecordSession<Box<dyn TileNaming>> {
    /// Build a session from configuration
    #[must_use]
    pub fn from_config(config: &SessionConfig) -> Self {
        Self::new(config.stitcher())
    }
}

impl<N: TileNaming> RecordSession<N> {
    /// Create a session around a stitcher
    #[must_use]
    pub const fn new(stitcher: TileStitcher<N>) -> Self {
        Self { stitcher }
    }

    /// Replace `output_dir` with freshly stitched composites
    ///
    /// Metadata is read before `output_dir` is touched, so a broken
    /// catalog leaves the previous baseline in place.
    ///
    /// # Errors
    ///
    /// Returns [`ShotError::OutputContainsInput`] if `output_dir` is, or
    /// contains, `input_dir`. Metadata, tile and I/O errors abort the run.
    pub fn record(
        &self,
        input_dir: &Path,
        output_dir: &Path,
        metadata: &dyn MetadataSource,
    ) -> ShotResult<Vec<PathBuf>> {
        let descriptors = metadata.descriptors()?;

        if output_dir.exists() {
            ensure_output_excludes_input(input_dir, output_dir)?;
            std::fs::remove_dir_all(output_dir)?;
        }
        std::fs::create_dir_all(output_dir)?;

        let written = descriptors
            .iter()
            .map(|d| {
                self.stitcher.stitch_to(
                    input_dir,
                    output_dir,
                    &d.name,
                    d.tile_grid_width,
                    d.tile_grid_height,
                )
            })
            .collect::<ShotResult<Vec<_>>>()?;

        info!(
            screenshots = written.len(),
            output = %output_dir.display(),
            "recorded baseline"
        );
        Ok(written)
    }
}

/// Refuse to wipe a directory that holds the tiles being recorded
fn ensure_output_excludes_input(input_dir: &Path, output_dir: &Path) -> ShotResult<()> {
    let output = output_dir.canonicalize()?;
    // A missing input has nothing to lose; stitching reports it.
    let Ok(input) = input_dir.canonicalize() else {
        return Ok(());
    };
    if input.starts_with(&output) {
        return Err(ShotError::OutputContainsInput { output, input });
    }
    Ok(())
}

/// Checks a fresh capture against the accepted baseline
#[derive(Debug, Clone)]
pub struct VerificationSession<N = GridTileNaming> {
    stitcher: TileStitcher<N>,
    comparator: ImageComparator,
    io_failure_mode: IoFailureMode,
    scratch_root: Option<PathBuf>,
}

impl VerificationSession<GridTileNaming> {
    /// Session using `<name>_<col>_<row>.png` tiles
    #[must_use]
    pub fn grid() -> Self {
        Self::new(TileStitcher::grid())
    }
}

impl VerificationSession<Box<dyn TileNaming>> {
    /// Build a session from configuration
    #[must_use]
    pub fn from_config(config: &SessionConfig) -> Self {
        let session = Self::new(config.stitcher()).with_io_failure_mode(config.io_failure_mode);
        match &config.scratch_root {
            Some(root) => session.with_scratch_root(root),
            None => session,
        }
    }
}

impl<N: TileNaming> VerificationSession<N> {
    /// Create a session around a stitcher
    #[must_use]
    pub const fn new(stitcher: TileStitcher<N>) -> Self {
        Self {
            stitcher,
            comparator: ImageComparator::new(),
            io_failure_mode: IoFailureMode::Abort,
            scratch_root: None,
        }
    }

    /// Set the I/O failure mode
    #[must_use]
    pub const fn with_io_failure_mode(mut self, mode: IoFailureMode) -> Self {
        self.io_failure_mode = mode;
        self
    }

    /// Create scratch directories under `root`
    #[must_use]
    pub fn with_scratch_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.scratch_root = Some(root.into());
        self
    }

    /// Verify every screenshot and fail if any of them mismatched
    ///
    /// # Errors
    ///
    /// Returns [`ShotError::Verify`] listing every mismatch after the report
    /// has been emitted, or the first metadata/tile/I/O error
    pub fn verify(
        &self,
        input_dir: &Path,
        baseline_dir: &Path,
        metadata: &dyn MetadataSource,
        sink: Option<&mut dyn ReportSink>,
    ) -> ShotResult<VerificationReport> {
        self.run(input_dir, baseline_dir, metadata, sink)?
            .into_result()
    }

    /// Verify every screenshot and return the report, mismatches included
    ///
    /// # Errors
    ///
    /// Returns the first metadata/tile/I/O error, or a report sink error
    pub fn run(
        &self,
        input_dir: &Path,
        baseline_dir: &Path,
        metadata: &dyn MetadataSource,
        sink: Option<&mut dyn ReportSink>,
    ) -> ShotResult<VerificationReport> {
        let descriptors = metadata.descriptors()?;
        let scratch = self.scratch_dir()?;

        info!(
            screenshots = descriptors.len(),
            scratch = %scratch.path().display(),
            "verifying against {}",
            baseline_dir.display()
        );

        let mut report = VerificationReport::default();
        let mut cases = Vec::with_capacity(descriptors.len());

        for descriptor in &descriptors {
            let (result, detail) =
                match self.check(input_dir, baseline_dir, scratch.path(), descriptor) {
                    Ok(result) => (result, MISMATCH_DETAIL.to_string()),
                    Err(e) if self.io_failure_mode == IoFailureMode::RecordAsFailure => {
                        warn!(screenshot = %descriptor.name, error = %e, "recorded as failure");
                        let message = format!("{}: {e}", descriptor.name);
                        (
                            ComparisonResult::failed(&descriptor.name, message),
                            e.to_string(),
                        )
                    }
                    Err(e) => return Err(e),
                };

            cases.push(if result.matched {
                TestCaseReport::passed(&descriptor.test_class, &descriptor.test_name)
            } else {
                TestCaseReport::failed(&descriptor.test_class, &descriptor.test_name, detail)
            });
            report.results.push(result);
        }

        scratch.close()?;

        if let Some(sink) = sink {
            debug!(cases = cases.len(), "emitting report");
            sink.emit(SUITE_NAME, &cases)?;
        }

        info!("{}", report.summary());
        Ok(report)
    }

    fn scratch_dir(&self) -> ShotResult<TempDir> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("shotstitch-");
        let dir = match &self.scratch_root {
            Some(root) => {
                std::fs::create_dir_all(root)?;
                builder.tempdir_in(root)?
            }
            None => builder.tempdir()?,
        };
        Ok(dir)
    }

    fn check(
        &self,
        input_dir: &Path,
        baseline_dir: &Path,
        scratch: &Path,
        descriptor: &ScreenshotDescriptor,
    ) -> ShotResult<ComparisonResult> {
        let actual = self.stitcher.stitch_to(
            input_dir,
            scratch,
            &descriptor.name,
            descriptor.tile_grid_width,
            descriptor.tile_grid_height,
        )?;
        let expected = baseline_dir.join(descriptor.composite_file_name());

        if self.comparator.are_equal(&expected, &actual)? {
            debug!(screenshot = %descriptor.name, "matched");
            Ok(ComparisonResult::matched(&descriptor.name))
        } else {
            warn!(screenshot = %descriptor.name, "does not match baseline");
            Ok(ComparisonResult::failed(
                &descriptor.name,
                format!(
                    "Image {} is not same as {}",
                    actual.display(),
                    expected.display()
                ),
            ))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::catalog::StaticMetadata;
    use image::{Rgba, RgbaImage};

    fn write_tile(dir: &Path, file: &str, color: [u8; 4]) {
        RgbaImage::from_pixel(4, 4, Rgba(color))
            .save(dir.join(file))
            .unwrap();
    }

    fn one_screenshot(name: &str) -> StaticMetadata {
        StaticMetadata::default().with(ScreenshotDescriptor::new(name, 1, 1, "T", name))
    }

    mod report_tests {
        use super::*;

        #[test]
        fn test_empty_report_is_success() {
            let report = VerificationReport::default();
            assert!(report.is_success());
            assert!(report.into_result().is_ok());
        }

        #[test]
        fn test_failure_message_joins_lines() {
            let report = VerificationReport {
                results: vec![
                    ComparisonResult::failed("a", "first"),
                    ComparisonResult::matched("b"),
                    ComparisonResult::failed("c", "second"),
                ],
            };
            assert!(!report.is_success());
            assert_eq!(report.passed_count(), 1);
            assert_eq!(report.summary(), "Screenshot Tests: 1/3 matched");
            match report.into_result().unwrap_err() {
                ShotError::Verify { message, failures } => {
                    assert_eq!(message, "first\nsecond");
                    assert_eq!(failures, 2);
                }
                other => panic!("unexpected error: {other}"),
            }
        }
    }

    mod record_tests {
        use super::*;
        use tempfile::TempDir;

        #[test]
        fn test_record_replaces_output() {
            let input = TempDir::new().unwrap();
            let root = TempDir::new().unwrap();
            let output = root.path().join("baseline");
            std::fs::create_dir_all(&output).unwrap();
            std::fs::write(output.join("stale.png"), b"old").unwrap();
            write_tile(input.path(), "home_0_0.png", [1, 1, 1, 255]);

            let written = RecordSession::grid()
                .record(input.path(), &output, &one_screenshot("home"))
                .unwrap();

            assert_eq!(written, vec![output.join("home.png")]);
            assert!(output.join("home.png").is_file());
            assert!(!output.join("stale.png").exists());
        }

        #[test]
        fn test_record_refuses_output_aliasing_input() {
            let root = TempDir::new().unwrap();
            let input = root.path().join("tiles");
            std::fs::create_dir_all(&input).unwrap();
            write_tile(&input, "home_0_0.png", [1, 1, 1, 255]);
            let meta = one_screenshot("home");

            for output in [input.join("..").join("tiles"), root.path().to_path_buf()] {
                let err = RecordSession::grid()
                    .record(&input, &output, &meta)
                    .unwrap_err();
                assert!(matches!(err, ShotError::OutputContainsInput { .. }));
                assert!(input.join("home_0_0.png").is_file());
            }
        }

        #[test]
        fn test_record_into_sibling_directory() {
            let root = TempDir::new().unwrap();
            let input = root.path().join("tiles");
            std::fs::create_dir_all(&input).unwrap();
            std::fs::create_dir_all(root.path().join("baseline")).unwrap();
            write_tile(&input, "home_0_0.png", [1, 1, 1, 255]);

            let written = RecordSession::grid()
                .record(&input, &input.join("..").join("baseline"), &one_screenshot("home"))
                .unwrap();

            assert_eq!(written.len(), 1);
            assert!(input.join("home_0_0.png").is_file());
        }

        #[test]
        fn test_record_metadata_error_keeps_baseline() {
            let input = TempDir::new().unwrap();
            let output = TempDir::new().unwrap();
            std::fs::write(output.path().join("keep.png"), b"x").unwrap();
            let broken = crate::catalog::XmlMetadata::from_xml("<screenshots>");

            assert!(RecordSession::grid()
                .record(input.path(), output.path(), &broken)
                .is_err());
            assert!(output.path().join("keep.png").exists());
        }
    }

    mod verify_tests {
        use super::*;
        use tempfile::TempDir;

        #[test]
        fn test_missing_baseline_aborts_by_default() {
            let input = TempDir::new().unwrap();
            let baseline = TempDir::new().unwrap();
            let scratch_root = TempDir::new().unwrap();
            write_tile(input.path(), "home_0_0.png", [1, 1, 1, 255]);

            let mut sink: Vec<TestCaseReport> = Vec::new();
            let err = VerificationSession::grid()
                .with_scratch_root(scratch_root.path())
                .verify(
                    input.path(),
                    baseline.path(),
                    &one_screenshot("home"),
                    Some(&mut sink),
                )
                .unwrap_err();

            assert!(matches!(err, ShotError::ImageLoad { .. }));
            assert!(sink.is_empty());
            assert_eq!(std::fs::read_dir(scratch_root.path()).unwrap().count(), 0);
        }

        #[test]
        fn test_missing_tile_recorded_as_failure() {
            let input = TempDir::new().unwrap();
            let baseline = TempDir::new().unwrap();
            let meta = StaticMetadata::default()
                .with(ScreenshotDescriptor::new("gone", 1, 1, "T", "gone"))
                .with(ScreenshotDescriptor::new("ok", 1, 1, "T", "ok"));
            write_tile(input.path(), "ok_0_0.png", [9, 9, 9, 255]);
            RecordSession::grid()
                .record(input.path(), baseline.path(), &one_screenshot("ok"))
                .unwrap();

            let mut sink: Vec<TestCaseReport> = Vec::new();
            let report = VerificationSession::grid()
                .with_io_failure_mode(IoFailureMode::RecordAsFailure)
                .run(input.path(), baseline.path(), &meta, Some(&mut sink))
                .unwrap();

            assert_eq!(report.total_count(), 2);
            assert!(!report.results[0].matched);
            assert!(report.results[0]
                .failure_message
                .as_deref()
                .unwrap()
                .contains("Missing tile"));
            assert!(report.results[1].matched);
            assert_eq!(sink.len(), 2);
            assert!(!sink[0].passed);
            assert!(sink[1].passed);
        }

        #[test]
        fn test_mismatch_message_names_both_paths() {
            let input = TempDir::new().unwrap();
            let baseline = TempDir::new().unwrap();
            write_tile(input.path(), "home_0_0.png", [1, 1, 1, 255]);
            RecordSession::grid()
                .record(input.path(), baseline.path(), &one_screenshot("home"))
                .unwrap();
            write_tile(input.path(), "home_0_0.png", [1, 1, 2, 255]);

            let report = VerificationSession::grid()
                .run(input.path(), baseline.path(), &one_screenshot("home"), None)
                .unwrap();
            let message = report.results[0].failure_message.clone().unwrap();
            assert!(message.starts_with("Image "));
            assert!(message.contains(" is not same as "));
            assert!(message.ends_with(&baseline.path().join("home.png").display().to_string()));
        }
    }
}

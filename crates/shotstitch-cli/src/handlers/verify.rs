//! Verify command handler

use crate::config::CliConfig;
use crate::error::CliResult;
use crate::output::ProgressReporter;
use crate::{ReportFormat, VerifyArgs};
use shotstitch::{
    JsonReport, JunitReport, ReportSink, VerificationReport, VerificationSession, XmlMetadata,
};
use std::path::Path;
use std::time::Instant;
use tracing::debug;

/// Build the report sink for `--report-dir`/`--report-format`
#[must_use]
pub fn report_sink(dir: &Path, format: &ReportFormat) -> Box<dyn ReportSink> {
    match format {
        ReportFormat::Junit => Box::new(JunitReport::new(dir)),
        ReportFormat::Json => Box::new(JsonReport::new(dir)),
    }
}

/// Execute the verify command
///
/// Every screenshot is listed before the run fails, so a single invocation
/// shows all mismatches.
pub fn execute_verify(config: &CliConfig, args: &VerifyArgs) -> CliResult<VerificationReport> {
    super::validate_tile_args(&args.tiles)?;
    let metadata_path = args.tiles.metadata_path();
    debug!(metadata = %metadata_path.display(), "loading metadata");
    let metadata = XmlMetadata::open(&metadata_path)?;

    let session = VerificationSession::from_config(&args.session_config());
    let mut sink = args
        .report_dir
        .as_deref()
        .map(|dir| report_sink(dir, &args.report_format));

    let mut reporter =
        ProgressReporter::new(config.color.should_color(), config.verbosity.is_quiet());
    let started = Instant::now();
    reporter.start_spinner("Verifying screenshots");
    let result = session.run(
        &args.tiles.input,
        &args.baseline,
        &metadata,
        sink.as_deref_mut().map(|s| s as &mut dyn ReportSink),
    );
    reporter.finish();
    let report = result?;

    for outcome in &report.results {
        if outcome.matched {
            reporter.success(&outcome.screenshot_name);
        } else {
            reporter.failure(
                outcome
                    .failure_message
                    .as_deref()
                    .unwrap_or(&outcome.screenshot_name),
            );
        }
    }
    reporter.summary(
        report.passed_count(),
        report.total_count() - report.passed_count(),
        started.elapsed(),
    );

    Ok(report.into_result()?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::config::Verbosity;
    use crate::{ColorChoice, IoErrorArg, NamingArg, TileArgs};
    use image::{Rgba, RgbaImage};
    use shotstitch::ShotError;
    use std::fs;
    use tempfile::TempDir;

    const METADATA: &str = "<screenshots>\
        <screenshot><name>home</name><tile_width>1</tile_width><tile_height>1</tile_height>\
        <test_class>com.example.Home</test_class><test_name>test_home</test_name></screenshot>\
        <screenshot><name>settings</name><tile_width>1</tile_width><tile_height>1</tile_height>\
        <test_class>com.example.Settings</test_class><test_name>test_settings</test_name></screenshot>\
        </screenshots>";

    struct Fixture {
        dir: TempDir,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = TempDir::new().unwrap();
            for sub in ["tiles", "baseline"] {
                fs::create_dir_all(dir.path().join(sub)).unwrap();
            }
            fs::write(dir.path().join("tiles").join("metadata.xml"), METADATA).unwrap();
            for name in ["home", "settings"] {
                let image = RgbaImage::from_pixel(5, 4, Rgba([10, 20, 30, 255]));
                image
                    .save(dir.path().join("tiles").join(format!("{name}_0_0.png")))
                    .unwrap();
                image
                    .save(dir.path().join("baseline").join(format!("{name}.png")))
                    .unwrap();
            }
            Self { dir }
        }

        fn args(&self, report_format: ReportFormat) -> VerifyArgs {
            VerifyArgs {
                tiles: TileArgs {
                    input: self.dir.path().join("tiles"),
                    metadata: None,
                    naming: NamingArg::Grid,
                    extension: "png".to_string(),
                    check_geometry: false,
                },
                baseline: self.dir.path().join("baseline"),
                report_dir: Some(self.dir.path().join("reports")),
                report_format,
                on_io_error: IoErrorArg::Abort,
                scratch_dir: Some(self.dir.path().to_path_buf()),
            }
        }
    }

    fn quiet() -> CliConfig {
        CliConfig::new()
            .with_verbosity(Verbosity::Quiet)
            .with_color(ColorChoice::Never)
    }

    #[test]
    fn test_report_sink_formats() {
        let dir = TempDir::new().unwrap();
        report_sink(dir.path(), &ReportFormat::Junit)
            .emit("Screenshot Tests", &[])
            .unwrap();
        report_sink(dir.path(), &ReportFormat::Json)
            .emit("Screenshot Tests", &[])
            .unwrap();
        assert!(dir.path().join("screenshot.xml").exists());
        assert!(dir.path().join("screenshot.json").exists());
    }

    #[test]
    fn test_verify_success_writes_junit() {
        let fixture = Fixture::new();
        let report = execute_verify(&quiet(), &fixture.args(ReportFormat::Junit)).unwrap();

        assert!(report.is_success());
        assert_eq!(report.total_count(), 2);
        let xml =
            fs::read_to_string(fixture.dir.path().join("reports").join("screenshot.xml")).unwrap();
        assert!(xml.contains("test_home"));
        assert!(xml.contains("test_settings"));
    }

    #[test]
    fn test_verify_mismatch_fails_after_json_report() {
        let fixture = Fixture::new();
        RgbaImage::from_pixel(5, 4, Rgba([10, 20, 31, 255]))
            .save(fixture.dir.path().join("baseline").join("settings.png"))
            .unwrap();

        let err = execute_verify(&quiet(), &fixture.args(ReportFormat::Json)).unwrap_err();

        let crate::CliError::Shot(ShotError::Verify { failures, .. }) = &err else {
            panic!("expected verify failure, got {err}");
        };
        assert_eq!(*failures, 1);
        assert!(err.to_string().contains("settings.png"));
        let json =
            fs::read_to_string(fixture.dir.path().join("reports").join("screenshot.json")).unwrap();
        assert!(json.contains("\"failures\": 1"));
    }
}

//! Record command handler

use crate::config::CliConfig;
use crate::error::CliResult;
use crate::output::ProgressReporter;
use crate::RecordArgs;
use shotstitch::{RecordSession, XmlMetadata};
use std::path::PathBuf;
use tracing::debug;

/// Execute the record command
///
/// Returns the composites written into the output directory.
pub fn execute_record(config: &CliConfig, args: &RecordArgs) -> CliResult<Vec<PathBuf>> {
    super::validate_tile_args(&args.tiles)?;

    let metadata_path = args.tiles.metadata_path();
    debug!(metadata = %metadata_path.display(), "loading metadata");
    let metadata = XmlMetadata::open(&metadata_path)?;

    let session = RecordSession::from_config(&args.tiles.session_config());

    let mut reporter =
        ProgressReporter::new(config.color.should_color(), config.verbosity.is_quiet());
    reporter.start_spinner("Recording baseline");
    let result = session.record(&args.tiles.input, &args.output, &metadata);
    reporter.finish();
    let written = result?;

    if config.verbosity.is_verbose() {
        for path in &written {
            reporter.success(&path.display().to_string());
        }
    }
    reporter.info(&format!(
        "Recorded {} screenshots into {}",
        written.len(),
        args.output.display()
    ));

    Ok(written)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::{config::Verbosity, TileArgs};
    use crate::{ColorChoice, NamingArg};
    use image::{Rgba, RgbaImage};
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    const HOME_METADATA: &str = "<screenshots><screenshot><name>home</name>\
        <tile_width>1</tile_width><tile_height>1</tile_height>\
        <test_class>A</test_class><test_name>b</test_name>\
        </screenshot></screenshots>";

    fn tile_args(input: &Path) -> TileArgs {
        TileArgs {
            input: input.to_path_buf(),
            metadata: None,
            naming: NamingArg::Grid,
            extension: "png".to_string(),
            check_geometry: false,
        }
    }

    fn quiet() -> CliConfig {
        CliConfig::new()
            .with_verbosity(Verbosity::Quiet)
            .with_color(ColorChoice::Never)
    }

    #[test]
    fn test_record_writes_composites() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("tiles");
        fs::create_dir_all(&input).unwrap();
        RgbaImage::from_pixel(4, 3, Rgba([1, 2, 3, 255]))
            .save(input.join("home_0_0.png"))
            .unwrap();
        fs::write(input.join("metadata.xml"), HOME_METADATA).unwrap();

        let args = RecordArgs {
            tiles: tile_args(&input),
            output: dir.path().join("baseline"),
        };
        let written = execute_record(&quiet(), &args).unwrap();

        assert_eq!(written, vec![dir.path().join("baseline").join("home.png")]);
        assert!(written[0].exists());
    }

    #[test]
    fn test_record_refuses_to_wipe_input() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("tiles");
        fs::create_dir_all(&input).unwrap();
        fs::write(input.join("metadata.xml"), HOME_METADATA).unwrap();
        RgbaImage::from_pixel(4, 3, Rgba([1, 2, 3, 255]))
            .save(input.join("home_0_0.png"))
            .unwrap();

        for output in [
            input.clone(),
            input.join("..").join("tiles"),
            dir.path().to_path_buf(),
        ] {
            let args = RecordArgs {
                tiles: tile_args(&input),
                output,
            };
            let err = execute_record(&quiet(), &args).unwrap_err();
            assert!(err.to_string().contains("Refusing to replace"));
            assert!(input.join("home_0_0.png").exists());
            assert!(input.join("metadata.xml").exists());
        }
    }

    #[test]
    fn test_record_missing_metadata() {
        let dir = TempDir::new().unwrap();
        let args = RecordArgs {
            tiles: tile_args(dir.path()),
            output: dir.path().join("baseline"),
        };
        let err = execute_record(&quiet(), &args).unwrap_err();
        assert!(err.to_string().contains("metadata.xml"));
        assert!(!dir.path().join("baseline").exists());
    }
}

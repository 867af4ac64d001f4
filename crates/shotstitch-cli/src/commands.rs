//! CLI command definitions using clap

use clap::{Args, Parser, Subcommand, ValueEnum};
use shotstitch::{IoFailureMode, NamingScheme, SessionConfig, METADATA_FILE_NAME};
use std::path::PathBuf;

/// shotstitch: rebuild tiled screenshots and check them against a baseline
#[derive(Parser, Debug)]
#[command(name = "shotstitch")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Stitch tiles into a fresh baseline, replacing the old one
    Record(RecordArgs),

    /// Stitch tiles and compare them against the baseline
    Verify(VerifyArgs),
}

/// Options shared by both subcommands
#[derive(Args, Debug, Clone)]
pub struct TileArgs {
    /// Directory holding the captured tiles
    #[arg(short, long)]
    pub input: PathBuf,

    /// Metadata document (defaults to <input>/metadata.xml)
    #[arg(short, long)]
    pub metadata: Option<PathBuf>,

    /// Tile naming convention
    #[arg(long, default_value = "grid")]
    pub naming: NamingArg,

    /// Tile file extension
    #[arg(long, default_value = "png")]
    pub extension: String,

    /// Check every tile against the edge-tile geometry
    #[arg(long)]
    pub check_geometry: bool,
}

impl TileArgs {
    /// Metadata path, explicit or defaulted
    #[must_use]
    pub fn metadata_path(&self) -> PathBuf {
        self.metadata
            .clone()
            .unwrap_or_else(|| self.input.join(METADATA_FILE_NAME))
    }

    /// Session configuration for these options
    #[must_use]
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig::new()
            .with_naming(self.naming.clone().into())
            .with_tile_extension(self.extension.trim_start_matches('.'))
            .with_geometry_check(self.check_geometry)
    }
}

/// Arguments for the record command
#[derive(Args, Debug)]
pub struct RecordArgs {
    /// Tile options
    #[command(flatten)]
    pub tiles: TileArgs,

    /// Baseline directory to (re)create
    #[arg(short, long)]
    pub output: PathBuf,
}

/// Arguments for the verify command
#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Tile options
    #[command(flatten)]
    pub tiles: TileArgs,

    /// Accepted baseline directory
    #[arg(short, long)]
    pub baseline: PathBuf,

    /// Directory to write the test report into
    #[arg(short, long)]
    pub report_dir: Option<PathBuf>,

    /// Report format
    #[arg(long, default_value = "junit")]
    pub report_format: ReportFormat,

    /// What to do when a screenshot cannot be stitched or loaded
    #[arg(long, default_value = "abort")]
    pub on_io_error: IoErrorArg,

    /// Parent directory for scratch space (defaults to the system temp dir)
    #[arg(long)]
    pub scratch_dir: Option<PathBuf>,
}

impl VerifyArgs {
    /// Session configuration for these options
    #[must_use]
    pub fn session_config(&self) -> SessionConfig {
        let config = self
            .tiles
            .session_config()
            .with_io_failure_mode(self.on_io_error.clone().into());
        match &self.scratch_dir {
            Some(dir) => config.with_scratch_root(dir),
            None => config,
        }
    }
}

/// Report file format
#[derive(ValueEnum, Clone, Debug, Default, PartialEq, Eq)]
pub enum ReportFormat {
    /// `JUnit` XML (screenshot.xml)
    #[default]
    Junit,
    /// JSON (screenshot.json)
    Json,
}

/// Tile naming argument
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum NamingArg {
    /// <name>_<col>_<row>.<ext> for every tile
    #[default]
    Grid,
    /// <name>.<ext> for the origin tile, suffixed names for the rest
    OriginUnsuffixed,
}

impl From<NamingArg> for NamingScheme {
    fn from(arg: NamingArg) -> Self {
        match arg {
            NamingArg::Grid => Self::Grid,
            NamingArg::OriginUnsuffixed => Self::OriginUnsuffixed,
        }
    }
}

/// I/O error handling argument
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum IoErrorArg {
    /// Abort the run on the first unreadable tile or baseline
    #[default]
    Abort,
    /// Report the screenshot as failed and continue
    RecordFailure,
}

impl From<IoErrorArg> for IoFailureMode {
    fn from(arg: IoErrorArg) -> Self {
        match arg {
            IoErrorArg::Abort => Self::Abort,
            IoErrorArg::RecordFailure => Self::RecordAsFailure,
        }
    }
}

/// Color argument for CLI
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum ColorArg {
    /// Automatic color detection
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for crate::config::ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}

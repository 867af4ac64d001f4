//! shotstitch CLI library
//!
//! Argument parsing, logging setup and the record/verify handlers behind the
//! `shotstitch` binary.

#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

mod commands;
mod config;
mod error;
pub mod handlers;
mod logging;
mod output;

pub use commands::{
    Cli, ColorArg, Commands, IoErrorArg, NamingArg, RecordArgs, ReportFormat, TileArgs,
    VerifyArgs,
};
pub use config::{CliConfig, ColorChoice, Verbosity};
pub use error::{CliError, CliResult};
pub use logging::init_logging;
pub use output::ProgressReporter;

/// Build the CLI configuration from global flags
#[must_use]
pub fn build_config(cli: &Cli) -> CliConfig {
    CliConfig::new()
        .with_verbosity(Verbosity::from_flags(cli.quiet, cli.verbose))
        .with_color(cli.color.clone().into())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_build_config_from_flags() {
        let cli = Cli::parse_from([
            "shotstitch", "-v", "--color", "always", "record", "-i", "a", "-o", "b",
        ]);
        let config = build_config(&cli);
        assert_eq!(config.verbosity, Verbosity::Verbose);
        assert_eq!(config.color, ColorChoice::Always);
    }

    #[test]
    fn test_quiet_overrides_verbose() {
        let cli = Cli::parse_from(["shotstitch", "-q", "-vv", "verify", "-i", "a", "-b", "b"]);
        assert_eq!(build_config(&cli).verbosity, Verbosity::Quiet);
    }
}

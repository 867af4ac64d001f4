//! shotstitch: stitch tiled screenshots and verify them against a baseline
//!
//! ## Usage
//!
//! ```bash
//! shotstitch record -i captured/ -o baseline/          # Accept a new baseline
//! shotstitch verify -i captured/ -b baseline/ -r out/  # Compare, write out/screenshot.xml
//! ```

use clap::Parser;
use shotstitch_cli::{
    build_config, handlers, init_logging, Cli, CliConfig, CliResult, Commands, RecordArgs,
    VerifyArgs,
};
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();

    let config = build_config(&cli);
    init_logging(&config)?;

    match cli.command {
        Commands::Record(args) => run_record(&config, &args),
        Commands::Verify(args) => run_verify(&config, &args),
    }
}

fn run_record(config: &CliConfig, args: &RecordArgs) -> CliResult<()> {
    handlers::execute_record(config, args).map(|_| ())
}

fn run_verify(config: &CliConfig, args: &VerifyArgs) -> CliResult<()> {
    handlers::execute_verify(config, args).map(|_| ())
}

//! Command handlers
//!
//! Each handler turns parsed arguments into a library session, runs it and
//! reports the outcome through [`ProgressReporter`](crate::ProgressReporter).

pub mod record;
pub mod verify;

pub use record::execute_record;
pub use verify::{execute_verify, report_sink};

use crate::error::{CliError, CliResult};
use crate::TileArgs;

/// Reject tile options that cannot name any file
pub fn validate_tile_args(args: &TileArgs) -> CliResult<()> {
    if args.extension.trim_start_matches('.').is_empty() {
        return Err(CliError::invalid_argument("--extension must not be empty"));
    }
    Ok(())
}

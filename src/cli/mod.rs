//! Command line interface for automatic_releases.
//!
//! Parses inputs from flags and the CI environment, runs the release and
//! exports the outputs back to the runner.

mod args;
pub mod commands;
mod output;

pub use args::{Args, RuntimeConfig};
pub use commands::execute_command;
pub use output::OutputManager;

use crate::error::Result;

/// Main CLI entry point
pub async fn run() -> Result<i32> {
    let args = Args::parse_args();
    execute_command(args).await
}

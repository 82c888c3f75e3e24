//! GSD CLI - `gsd-tools`
//!
//! Thin shell around `gsd_core`:
//! - Parses the command line ([`cli::command`])
//! - Validates `--cwd` and reads planning documents from disk
//! - Runs one core operation and writes mutated documents back atomically
//! - Returns the JSON payload the binary prints on stdout
//!
//! Logs go to stderr, filtered by `GSD_LOG` (default `warn`).

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod cli;
pub mod commands;
pub mod error;
pub mod input;
pub mod project;

pub use error::CliError;
pub use project::{FsPhaseSource, Project};

use anyhow::Result;
use clap::ArgMatches;
use serde_json::Value;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter
pub const LOG_ENV: &str = "GSD_LOG";

/// Install the stderr log subscriber
///
/// Safe to call more than once; later calls are ignored.
pub fn init_logging() {
    let default_level = "warn";
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

/// Open the project named by `--cwd` and run the selected command
///
/// # Errors
/// [`CliError::InvalidCwd`] for a bad `--cwd`, plus anything
/// [`commands::run`] reports
pub fn execute(matches: &ArgMatches) -> Result<Value> {
    let cwd = matches.get_one::<PathBuf>("cwd");
    let project = Project::open(cwd.map(PathBuf::as_path))?;
    commands::run(matches, &project, chrono::Utc::now())
}

/// Parse `args` (program name first) and run the command
///
/// # Errors
/// Argument errors from clap, plus anything [`execute`] reports
pub fn execute_args<I, T>(args: I) -> Result<Value>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let matches = cli::command().try_get_matches_from(args)?;
    execute(&matches)
}

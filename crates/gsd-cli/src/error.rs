//! Invocation errors
//!
//! Failures that abort the command instead of being reported inside the JSON
//! payload.

use std::io;
use std::path::PathBuf;

/// Errors raised while routing a command
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// `--cwd` does not name a directory
    #[error("Invalid --cwd: {}", .0.display())]
    InvalidCwd(PathBuf),

    /// `state patch` flag without a value
    #[error("missing value for --{0}")]
    MissingPatchValue(String),

    /// `state patch` argument that is not a `--Field` flag
    #[error("expected --<Field> <value> pairs, found '{0}'")]
    UnexpectedPatchArgument(String),

    /// `.planning/phases/` exists but cannot be listed
    #[error("cannot list phase directories in {}", .dir.display())]
    PhaseListing {
        /// Directory being listed
        dir: PathBuf,
        /// Underlying failure
        #[source]
        source: io::Error,
    },

    /// Command line names no known command
    #[error("unknown command: {0}")]
    UnknownCommand(String),
}

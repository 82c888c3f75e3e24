//! Payload inputs
//!
//! Every text payload can be given inline (`--text "..."`) or as a file
//! (`--text-file notes.txt`). The file form exists because shells mangle
//! characters such as `$` in inline arguments; both forms yield the same
//! text for the same content.

use crate::project::Project;
use anyhow::{Context, Result};
use clap::ArgMatches;
use std::fs;
use std::path::PathBuf;

/// Where a payload comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextSource {
    /// Given on the command line
    Inline(String),
    /// Read verbatim from a file
    File(PathBuf),
}

impl TextSource {
    /// Pick the inline or file variant of an argument pair
    #[must_use]
    pub fn from_matches(matches: &ArgMatches, inline: &str, file: &str) -> Option<Self> {
        if let Some(text) = matches.get_one::<String>(inline) {
            return Some(Self::Inline(text.clone()));
        }
        matches
            .get_one::<PathBuf>(file)
            .map(|path| Self::File(path.clone()))
    }

    /// Load the payload text
    ///
    /// # Errors
    /// Fails when the file cannot be read
    pub fn load(&self, project: &Project) -> Result<String> {
        match self {
            Self::Inline(text) => Ok(text.clone()),
            Self::File(path) => {
                let path = project.resolve(path);
                fs::read_to_string(&path)
                    .with_context(|| format!("failed to read payload file {}", path.display()))
            }
        }
    }
}

//! File-system side of a planning project
//!
//! Reads planning documents (absent file = `None`), lists phase directories,
//! and writes documents back through an atomic replace.

use crate::error::CliError;
use anyhow::{Context, Result};
use gsd_core::{PhaseDirectory, PhaseSource, PlanningFile};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// A project root holding a `.planning/` directory
#[derive(Debug, Clone)]
pub struct Project {
    root: PathBuf,
}

impl Project {
    /// Open the project at `cwd`, or at the process working directory
    ///
    /// # Errors
    /// Returns [`CliError::InvalidCwd`] when `cwd` is not a directory
    pub fn open(cwd: Option<&Path>) -> Result<Self> {
        let root = match cwd {
            Some(dir) if dir.is_dir() => dir.to_path_buf(),
            Some(dir) => return Err(CliError::InvalidCwd(dir.to_path_buf()).into()),
            None => std::env::current_dir().context("cannot determine working directory")?,
        };
        tracing::debug!(root = %root.display(), "opened project");
        Ok(Self { root })
    }

    /// Project root
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `.planning/`
    #[must_use]
    pub fn planning_dir(&self) -> PathBuf {
        self.root.join(PlanningFile::PLANNING_DIR)
    }

    /// Absolute path of a planning document
    #[must_use]
    pub fn path(&self, file: PlanningFile) -> PathBuf {
        self.planning_dir().join(file.file_name())
    }

    /// Resolve a user-supplied path against the project root
    #[must_use]
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    /// Read a planning document; `None` when it does not exist
    ///
    /// # Errors
    /// Any I/O failure other than "not found"
    pub fn read(&self, file: PlanningFile) -> Result<Option<String>> {
        let path = self.path(file);
        match fs::read_to_string(&path) {
            Ok(text) => Ok(Some(text)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err).with_context(|| format!("failed to read {}", path.display())),
        }
    }

    /// Replace a planning document atomically
    ///
    /// The text goes to a temporary file in the same directory which is then
    /// renamed over the target, so readers never see a partial write.
    ///
    /// # Errors
    /// Any I/O failure creating, writing or renaming the temporary file
    pub fn write(&self, file: PlanningFile, contents: &str) -> Result<()> {
        let dir = self.planning_dir();
        fs::create_dir_all(&dir).with_context(|| format!("failed to create {}", dir.display()))?;

        let target = self.path(file);
        let mut tmp = NamedTempFile::new_in(&dir)
            .with_context(|| format!("failed to create temporary file in {}", dir.display()))?;
        tmp.write_all(contents.as_bytes())
            .and_then(|()| tmp.as_file().sync_all())
            .with_context(|| format!("failed to write {}", target.display()))?;
        tmp.persist(&target)
            .map_err(|err| err.error)
            .with_context(|| format!("failed to replace {}", target.display()))?;

        tracing::info!(file = file.file_name(), bytes = contents.len(), "wrote planning document");
        Ok(())
    }

    /// Phase directories under `.planning/phases/`
    ///
    /// A missing `phases/` directory lists as empty.
    ///
    /// # Errors
    /// [`CliError::PhaseListing`] for any other I/O failure
    pub fn phases(&self) -> Result<FsPhaseSource> {
        let dir = self.planning_dir().join(PlanningFile::PHASES_DIR);
        let dirs = match list_phase_dirs(&dir) {
            Ok(dirs) => dirs,
            Err(err) if err.kind() == io::ErrorKind::NotFound => Vec::new(),
            Err(source) => return Err(CliError::PhaseListing { dir, source }.into()),
        };
        tracing::debug!(count = dirs.len(), "listed phase directories");
        Ok(FsPhaseSource { dirs })
    }
}

/// [`PhaseSource`] over one listing of `.planning/phases/`
#[derive(Debug, Clone)]
pub struct FsPhaseSource {
    dirs: Vec<PhaseDirectory>,
}

fn file_names(dir: &Path) -> io::Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            if let Ok(name) = entry.file_name().into_string() {
                names.push(name);
            }
        }
    }
    names.sort();
    Ok(names)
}

fn list_phase_dirs(phases: &Path) -> io::Result<Vec<PhaseDirectory>> {
    let mut dirs = Vec::new();
    for entry in fs::read_dir(phases)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let Ok(name) = entry.file_name().into_string() else {
            continue;
        };
        let dir = PhaseDirectory::new(name, file_names(&entry.path())?);
        if dir.number().is_some() {
            dirs.push(dir);
        }
    }
    dirs.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(dirs)
}

impl PhaseSource for FsPhaseSource {
    fn phase_directories(&self) -> Vec<PhaseDirectory> {
        self.dirs.clone()
    }
}

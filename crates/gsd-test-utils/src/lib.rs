//! Testing utilities for GSD workspace
//!
//! Temporary projects with a `.planning/` tree, plus sample documents.

#![allow(missing_docs)]

use gsd_core::PlanningFile;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// STATE.md with the usual header fields and placeholder sections
pub const SAMPLE_STATE: &str = "# Project State

**Current Phase:** 03
**Current Phase Name:** API Layer
**Total Phases:** 6
**Current Plan:** 03-02
**Total Plans in Phase:** 3
**Status:** In progress
**Progress:** 45%
**Last Activity:** 2024-01-15

## Decisions
No decisions yet.

## Blockers
None
";

/// Three phases; only the first two have directories in [`sample_project`]
pub const SAMPLE_ROADMAP: &str = "# Roadmap

### Phase 1: Foundation
**Goal:** Set up project infrastructure
**Requirements**: [CP-01, CP-02]

### Phase 2: API
**Goal:** Build REST API
**Depends on:** Phase 1

### Phase 3: Frontend
**Goal:** Build UI
**Requirements**: TBD
";

/// A project root in a temporary directory, removed on drop
pub struct TempProject {
    dir: TempDir,
}

impl TempProject {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join(".planning").join("phases")).unwrap();
        Self { dir }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn root_str(&self) -> &str {
        self.root().to_str().unwrap()
    }

    pub fn planning_path(&self, file: PlanningFile) -> PathBuf {
        self.root().join(PlanningFile::PLANNING_DIR).join(file.file_name())
    }

    /// Write a file relative to the root, creating parent directories
    pub fn write_file(&self, relative: &str, contents: &str) -> PathBuf {
        let path = self.root().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, contents).unwrap();
        path
    }

    pub fn write_state(&self, contents: &str) {
        fs::write(self.planning_path(PlanningFile::State), contents).unwrap();
    }

    pub fn write_roadmap(&self, contents: &str) {
        fs::write(self.planning_path(PlanningFile::Roadmap), contents).unwrap();
    }

    pub fn write_config(&self, contents: &str) {
        fs::write(self.planning_path(PlanningFile::Config), contents).unwrap();
    }

    /// Create `.planning/phases/<name>/` holding empty-ish files
    pub fn add_phase(&self, name: &str, files: &[&str]) -> PathBuf {
        let dir = self
            .root()
            .join(PlanningFile::PLANNING_DIR)
            .join(PlanningFile::PHASES_DIR)
            .join(name);
        fs::create_dir_all(&dir).unwrap();
        for file in files {
            fs::write(dir.join(file), format!("# {file}\n")).unwrap();
        }
        dir
    }

    pub fn read_state(&self) -> String {
        fs::read_to_string(self.planning_path(PlanningFile::State)).unwrap()
    }
}

impl Default for TempProject {
    fn default() -> Self {
        Self::new()
    }
}

/// Project with [`SAMPLE_ROADMAP`]: phase 1 complete, phase 2 planned,
/// phase 3 without a directory
pub fn sample_project() -> TempProject {
    let project = TempProject::new();
    project.write_roadmap(SAMPLE_ROADMAP);
    project.add_phase("01-foundation", &["01-01-PLAN.md", "01-01-SUMMARY.md"]);
    project.add_phase("02-api", &["02-01-PLAN.md"]);
    project
}

/// Count lines equal to `line`
pub fn count_lines(text: &str, line: &str) -> usize {
    text.lines().filter(|l| *l == line).count()
}

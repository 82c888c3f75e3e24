//! Core types for GSD
//!
//! Defines the fundamental types shared by the analyzers and mutators:
//! - Phase numbers (integer or decimal)
//! - Planning files and the "not found" outcome
//! - Decisions
//! - Phase directories as seen on disk, and the trait that supplies them

use crate::error::{CoreError, CoreResult};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

static PHASE_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+)((?:\.\d+)*)$").expect("phase number regex"));

/// Phase number as written (`3`, `03`, `2.1`)
///
/// Two numbers are equal when their integer parts are numerically equal and
/// their decimal parts are identical, so `03` == `3` but `2.1` != `2`.
#[derive(Debug, Clone, Eq, Serialize)]
#[serde(transparent)]
pub struct PhaseNumber(String);

impl PhaseNumber {
    /// Parse a phase number
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidPhaseNumber`] for anything but `N` or `N.M`
    pub fn parse(text: &str) -> CoreResult<Self> {
        let trimmed = text.trim();
        if PHASE_NUMBER.is_match(trimmed) {
            Ok(Self(trimmed.to_string()))
        } else {
            Err(CoreError::InvalidPhaseNumber(text.to_string()))
        }
    }

    /// Number as written
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn key(&self) -> (&str, &str) {
        let (int, rest) = self.0.split_at(self.0.find('.').unwrap_or(self.0.len()));
        let int = int.trim_start_matches('0');
        (if int.is_empty() { "0" } else { int }, rest)
    }

    /// Whether `text` denotes the same phase
    #[must_use]
    pub fn matches(&self, text: &str) -> bool {
        Self::parse(text).is_ok_and(|other| other == *self)
    }

    /// Zero-padded form used for directory names (`3` → `03`, `2.1` → `02.1`)
    #[must_use]
    pub fn padded(&self) -> String {
        let (int, rest) = self.key();
        format!("{int:0>2}{rest}")
    }
}

impl PartialEq for PhaseNumber {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl std::hash::Hash for PhaseNumber {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl FromStr for PhaseNumber {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for PhaseNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Planning documents the core knows by name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlanningFile {
    /// `STATE.md`
    State,
    /// `ROADMAP.md`
    Roadmap,
    /// `REQUIREMENTS.md`
    Requirements,
    /// `PROJECT.md`
    Project,
    /// `config.json`
    Config,
}

impl PlanningFile {
    /// Directory holding every planning document, relative to the project root
    pub const PLANNING_DIR: &'static str = ".planning";

    /// Directory holding phase directories, relative to the planning directory
    pub const PHASES_DIR: &'static str = "phases";

    /// File name inside the planning directory
    #[must_use]
    pub fn file_name(self) -> &'static str {
        match self {
            Self::State => "STATE.md",
            Self::Roadmap => "ROADMAP.md",
            Self::Requirements => "REQUIREMENTS.md",
            Self::Project => "PROJECT.md",
            Self::Config => "config.json",
        }
    }

    /// Path relative to the project root, `/`-separated
    #[must_use]
    pub fn relative_path(self) -> String {
        format!("{}/{}", Self::PLANNING_DIR, self.file_name())
    }

    /// Stable message reported when the file does not exist
    #[must_use]
    pub fn not_found_message(self) -> String {
        format!("{} not found", self.file_name())
    }
}

/// Result of a read command over a document that may be absent
///
/// Serializes as the inner value, or as `{"error": "<FILE> not found"}`.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    /// Document was present
    Ready(T),
    /// Document does not exist
    Missing(PlanningFile),
}

impl<T> Outcome<T> {
    /// Inner value if the document was present
    #[must_use]
    pub fn ready(self) -> Option<T> {
        match self {
            Self::Ready(value) => Some(value),
            Self::Missing(_) => None,
        }
    }
}

impl<T: Serialize> Serialize for Outcome<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;
        match self {
            Self::Ready(value) => value.serialize(serializer),
            Self::Missing(file) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("error", &file.not_found_message())?;
                map.end()
            }
        }
    }
}

/// A recorded decision
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Decision {
    /// Phase the decision belongs to (free text, e.g. `11-01`)
    pub phase: String,
    /// What was decided
    pub summary: String,
    /// Why (empty when not given)
    pub rationale: String,
}

impl Decision {
    /// Create decision
    #[must_use]
    pub fn new(
        phase: impl Into<String>,
        summary: impl Into<String>,
        rationale: impl Into<String>,
    ) -> Self {
        Self {
            phase: phase.into(),
            summary: summary.into(),
            rationale: rationale.into(),
        }
    }
}

/// Completion state of a phase inferred from its directory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiskStatus {
    /// No directory for the phase
    NoDirectory,
    /// Directory exists but holds no plan
    Empty,
    /// At least one plan lacks a summary
    Planned,
    /// Every plan has a summary
    Complete,
}

/// Contents of one phase directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseDirectory {
    /// Directory name (e.g. `01-foundation`)
    pub name: String,
    /// File names inside the directory
    pub files: Vec<String>,
}

const PLAN_SUFFIX: &str = "PLAN.md";
const SUMMARY_SUFFIX: &str = "SUMMARY.md";

fn doc_id<'a>(file: &'a str, suffix: &str) -> Option<&'a str> {
    let stem = file.strip_suffix(suffix)?;
    if stem.is_empty() {
        Some("")
    } else {
        stem.strip_suffix('-')
    }
}

impl PhaseDirectory {
    /// Create from name and file list
    #[must_use]
    pub fn new(name: impl Into<String>, files: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            name: name.into(),
            files: files.into_iter().map(Into::into).collect(),
        }
    }

    /// Phase number prefix of the directory name
    #[must_use]
    pub fn number(&self) -> Option<PhaseNumber> {
        let prefix = self.name.split('-').next()?;
        PhaseNumber::parse(prefix).ok()
    }

    /// Slug after the number prefix, with dashes turned into spaces
    #[must_use]
    pub fn display_name(&self) -> Option<String> {
        let (_, slug) = self.name.split_once('-')?;
        (!slug.is_empty()).then(|| slug.replace('-', " "))
    }

    /// Ids of plan files (`01-02-PLAN.md` → `01-02`, `PLAN.md` → ``)
    #[must_use]
    pub fn plan_ids(&self) -> Vec<&str> {
        self.files.iter().filter_map(|f| doc_id(f, PLAN_SUFFIX)).collect()
    }

    /// Number of plan files
    #[must_use]
    pub fn plan_count(&self) -> usize {
        self.plan_ids().len()
    }

    /// Number of summaries that belong to an existing plan
    #[must_use]
    pub fn summary_count(&self) -> usize {
        let plans = self.plan_ids();
        self.files
            .iter()
            .filter_map(|f| doc_id(f, SUMMARY_SUFFIX))
            .filter(|id| plans.contains(id))
            .count()
    }

    /// Plan ids without a matching summary, in file order
    #[must_use]
    pub fn incomplete_plan_ids(&self) -> Vec<&str> {
        let summaries: Vec<&str> = self
            .files
            .iter()
            .filter_map(|f| doc_id(f, SUMMARY_SUFFIX))
            .collect();
        self.plan_ids()
            .into_iter()
            .filter(|id| !summaries.contains(id))
            .collect()
    }

    /// Completion state of this directory
    #[must_use]
    pub fn disk_status(&self) -> DiskStatus {
        let plans = self.plan_count();
        if plans == 0 {
            DiskStatus::Empty
        } else if self.summary_count() >= plans {
            DiskStatus::Complete
        } else {
            DiskStatus::Planned
        }
    }

    /// File of a given kind (`CONTEXT` → `03-CONTEXT.md` or `CONTEXT.md`)
    #[must_use]
    pub fn find_document(&self, kind: &str) -> Option<&str> {
        let suffix = format!("{kind}.md");
        self.files
            .iter()
            .find(|f| doc_id(f, &suffix).is_some())
            .map(String::as_str)
    }
}

/// Supplier of phase directories (the file system, or a fixture in tests)
pub trait PhaseSource {
    /// Every phase directory, sorted by name
    fn phase_directories(&self) -> Vec<PhaseDirectory>;

    /// Directory of a given phase
    fn find_phase(&self, number: &PhaseNumber) -> Option<PhaseDirectory> {
        self.phase_directories()
            .into_iter()
            .find(|dir| dir.number().as_ref() == Some(number))
    }
}

impl PhaseSource for [PhaseDirectory] {
    fn phase_directories(&self) -> Vec<PhaseDirectory> {
        let mut dirs = self.to_vec();
        dirs.sort_by(|a, b| a.name.cmp(&b.name));
        dirs
    }
}

impl PhaseSource for Vec<PhaseDirectory> {
    fn phase_directories(&self) -> Vec<PhaseDirectory> {
        self.as_slice().phase_directories()
    }
}

/// Status of a phase directory that may not exist
#[must_use]
pub fn disk_status_of(dir: Option<&PhaseDirectory>) -> DiskStatus {
    dir.map_or(DiskStatus::NoDirectory, PhaseDirectory::disk_status)
}

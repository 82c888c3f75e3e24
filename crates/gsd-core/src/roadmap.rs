//! Roadmap analyzer
//!
//! Reads phase detail sections (`## Phase 2: API` / `### Phase 2.1: Hotfix`)
//! out of ROADMAP.md and joins them with what the phase directories on disk
//! say about progress.
//!
//! A roadmap may also carry a checklist summary (`- [ ] **Phase 1: ...**`).
//! A phase that only appears there has no detail section to read, which is
//! reported as a malformed roadmap rather than a plain miss.

use crate::types::{disk_status_of, DiskStatus, Outcome, PhaseNumber, PhaseSource, PlanningFile};
use gsd_markdown::{find_sections, line_spans, scan_fields, FieldMap, Section};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

static PHASE_TITLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^Phase\s+(\d+(?:\.\d+)*)\s*:\s*(.*?)\s*$").expect("phase title regex")
});

static CHECKLIST_ENTRY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^[ \t]*[-*+][ \t]+\[[ x]\][ \t]+(?:\*\*)?Phase[ \t]+(\d+(?:\.\d+)*)")
        .expect("checklist entry regex")
});

/// Error code reported for a roadmap without detail sections
pub const MALFORMED_ROADMAP: &str = "malformed_roadmap";

const GOAL: &[&str] = &["Goal"];
const DEPENDS_ON: &[&str] = &["Depends on", "Depends On"];
const REQUIREMENTS: &[&str] = &["Requirements"];

/// Split a heading title into phase number and name
fn phase_title(title: &str) -> Option<(&str, &str)> {
    let caps = PHASE_TITLE.captures(title)?;
    Some((caps.get(1)?.as_str(), caps.get(2)?.as_str()))
}

fn is_phase_title(title: &str) -> bool {
    PHASE_TITLE.is_match(title)
}

/// Phase numbers listed in checklist bullets, in document order
#[must_use]
pub fn checklist_phases(roadmap: &str) -> Vec<String> {
    line_spans(roadmap)
        .filter_map(|line| CHECKLIST_ENTRY.captures(line.text))
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
        .collect()
}

/// Normalize a `**Requirements**:` value
///
/// Surrounding brackets are stripped; an empty value or the `TBD`
/// placeholder means there are no requirement ids yet.
#[must_use]
pub fn requirement_ids(raw: Option<&str>) -> Option<String> {
    let trimmed = raw?.trim();
    let inner = trimmed
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .unwrap_or(trimmed)
        .trim();
    if inner.is_empty() || inner.eq_ignore_ascii_case("TBD") {
        None
    } else {
        Some(inner.to_string())
    }
}

fn field(fields: &FieldMap, labels: &[&str]) -> Option<String> {
    fields
        .get_any(labels)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// A phase detail section read from the roadmap
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhaseDetail {
    /// Phase number as written in the heading
    pub phase_number: String,
    /// Name after the colon
    pub phase_name: String,
    /// `**Goal:**`
    pub goal: Option<String>,
    /// `**Depends on:**`
    pub depends_on: Option<String>,
    /// `**Requirements**:` with brackets stripped
    pub phase_req_ids: Option<String>,
    /// Heading plus body
    pub section: String,
}

impl PhaseDetail {
    fn from_section(section: &Section<'_>) -> Option<Self> {
        let (number, name) = phase_title(section.heading_text)?;
        let section = section.clone().until(&is_phase_title);
        let fields = scan_fields(section.body);
        Some(Self {
            phase_number: number.to_string(),
            phase_name: name.to_string(),
            goal: field(&fields, GOAL),
            depends_on: field(&fields, DEPENDS_ON),
            phase_req_ids: requirement_ids(fields.get_any(REQUIREMENTS)),
            section: section.full_text().trim_end().to_string(),
        })
    }
}

/// Every phase detail section of `roadmap`, in document order
#[must_use]
pub fn phase_details(roadmap: &str) -> Vec<PhaseDetail> {
    find_sections(roadmap, &is_phase_title)
        .iter()
        .filter_map(PhaseDetail::from_section)
        .collect()
}

/// Result of `roadmap get-phase`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhaseLookup {
    /// Detail section found
    Found(PhaseDetail),
    /// The roadmap does not mention the phase
    NotFound,
    /// ROADMAP.md does not exist
    MissingRoadmap,
    /// The phase is listed in the checklist but has no detail section
    Malformed {
        /// Human-readable explanation
        message: String,
    },
}

impl PhaseLookup {
    /// Whether the phase was found
    #[inline]
    #[must_use]
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }
}

impl Serialize for PhaseLookup {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Found(detail) => {
                let mut map = serializer.serialize_map(Some(7))?;
                map.serialize_entry("found", &true)?;
                map.serialize_entry("phase_number", &detail.phase_number)?;
                map.serialize_entry("phase_name", &detail.phase_name)?;
                map.serialize_entry("goal", &detail.goal)?;
                map.serialize_entry("depends_on", &detail.depends_on)?;
                map.serialize_entry("phase_req_ids", &detail.phase_req_ids)?;
                map.serialize_entry("section", &detail.section)?;
                map.end()
            }
            Self::NotFound => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("found", &false)?;
                map.end()
            }
            Self::MissingRoadmap => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("found", &false)?;
                map.serialize_entry("error", &PlanningFile::Roadmap.not_found_message())?;
                map.end()
            }
            Self::Malformed { message } => {
                let mut map = serializer.serialize_map(Some(3))?;
                map.serialize_entry("found", &false)?;
                map.serialize_entry("error", MALFORMED_ROADMAP)?;
                map.serialize_entry("message", message)?;
                map.end()
            }
        }
    }
}

/// Look up one phase's detail section
#[must_use]
pub fn get_phase(roadmap: Option<&str>, number: &PhaseNumber) -> PhaseLookup {
    let Some(doc) = roadmap else {
        return PhaseLookup::MissingRoadmap;
    };

    let matcher = |title: &str| phase_title(title).is_some_and(|(n, _)| number.matches(n));
    if let Some(detail) = find_sections(doc, &matcher)
        .first()
        .and_then(PhaseDetail::from_section)
    {
        return PhaseLookup::Found(detail);
    }

    if checklist_phases(doc).iter().any(|n| number.matches(n)) {
        tracing::warn!(phase = %number, "phase listed in roadmap checklist has no detail section");
        return PhaseLookup::Malformed {
            message: format!(
                "Phase {number} exists in the summary list but its detail section is missing \
                 (expected a \"### Phase {number}: <name>\" heading in ROADMAP.md)"
            ),
        };
    }

    PhaseLookup::NotFound
}

/// One roadmap phase joined with its directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhaseRecord {
    /// Phase number as written in the heading
    pub number: String,
    /// Name after the colon
    pub name: String,
    /// `**Goal:**`
    pub goal: Option<String>,
    /// `**Depends on:**`
    pub depends_on: Option<String>,
    /// `**Requirements**:` with brackets stripped
    pub requirement_ids: Option<String>,
    /// Completion inferred from plan and summary files
    pub disk_status: DiskStatus,
    /// Plan files in the directory
    pub plan_count: usize,
    /// Summaries matching a plan
    pub summary_count: usize,
    /// Directory name, when one exists
    pub directory: Option<String>,
}

/// Aggregate progress over every roadmap phase
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoadmapReport {
    /// Phases in document order
    pub phases: Vec<PhaseRecord>,
    /// Number of phase detail sections
    pub phase_count: usize,
    /// Phases whose disk status is `complete`
    pub completed_phases: usize,
    /// Plans across every phase
    pub total_plans: usize,
    /// Summaries across every phase
    pub total_summaries: usize,
    /// Share of plans with a summary, rounded
    pub progress_percent: usize,
    /// First phase not yet complete (the last phase when all are)
    pub current_phase: Option<String>,
    /// Checklist phases without a detail section
    pub missing_phase_details: Vec<String>,
}

/// `round(100 * part / whole)`, 0 when `whole` is 0
fn percent(part: usize, whole: usize) -> usize {
    if whole == 0 {
        0
    } else {
        (part * 200 + whole) / (whole * 2)
    }
}

/// Analyze every phase of the roadmap against the phase directories
#[must_use]
pub fn analyze(roadmap: Option<&str>, source: &dyn PhaseSource) -> Outcome<RoadmapReport> {
    let Some(doc) = roadmap else {
        return Outcome::Missing(PlanningFile::Roadmap);
    };

    let directories = source.phase_directories();
    let details = phase_details(doc);

    let phases: Vec<PhaseRecord> = details
        .into_iter()
        .map(|detail| {
            let dir = PhaseNumber::parse(&detail.phase_number).ok().and_then(|n| {
                directories
                    .iter()
                    .find(|d| d.number().as_ref() == Some(&n))
            });
            PhaseRecord {
                disk_status: disk_status_of(dir),
                plan_count: dir.map_or(0, |d| d.plan_count()),
                summary_count: dir.map_or(0, |d| d.summary_count()),
                directory: dir.map(|d| d.name.clone()),
                number: detail.phase_number,
                name: detail.phase_name,
                goal: detail.goal,
                depends_on: detail.depends_on,
                requirement_ids: detail.phase_req_ids,
            }
        })
        .collect();

    let missing_phase_details: Vec<String> = checklist_phases(doc)
        .into_iter()
        .filter(|n| {
            PhaseNumber::parse(n).is_ok_and(|num| !phases.iter().any(|p| num.matches(&p.number)))
        })
        .collect();

    let completed_phases = phases
        .iter()
        .filter(|p| p.disk_status == DiskStatus::Complete)
        .count();
    let total_plans: usize = phases.iter().map(|p| p.plan_count).sum();
    let total_summaries: usize = phases.iter().map(|p| p.summary_count).sum();
    let current_phase = phases
        .iter()
        .find(|p| p.disk_status != DiskStatus::Complete)
        .or_else(|| phases.last())
        .map(|p| p.number.clone());

    tracing::debug!(
        phases = phases.len(),
        completed_phases,
        missing = missing_phase_details.len(),
        "analyzed roadmap"
    );

    Outcome::Ready(RoadmapReport {
        phase_count: phases.len(),
        completed_phases,
        total_plans,
        total_summaries,
        progress_percent: percent(total_summaries, total_plans),
        current_phase,
        missing_phase_details,
        phases,
    })
}

//! State document reader
//!
//! Extracts the snapshot of STATE.md that agents work from:
//! - Position fields (`**Current Phase:**`, `**Status:**`, ...)
//! - Decisions, from a table and/or `- [Phase X]: summary — rationale` bullets
//! - Blockers, from a bullet list
//! - Session continuity fields
//!
//! Only the body is read; the frontmatter block is a cache of it.

use crate::status::{normalize, Status};
use crate::types::{Decision, Outcome, PlanningFile};
use gsd_markdown::{
    find_section, parse_list, parse_table, scan_fields, split_frontmatter, FieldMap, TableRow,
    TitleEq, TitleMatcher, TitlePrefix,
};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

static DECISION_BULLET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\[Phase\s+([^\]]*)\]:\s*(.*)$").expect("decision bullet regex"));

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^[ \t]*(?:[-*+][ \t]+)?(?:none|none yet|none\.|no decisions yet\.?|no blockers yet\.?|no blockers\.?|n/a|\(none\))[ \t]*$",
    )
    .expect("placeholder regex")
});

/// Separator between a decision's summary and rationale
pub const RATIONALE_SEPARATOR: &str = " — ";

/// Whether a line is an empty-list placeholder (`None`, `No decisions yet.`)
#[must_use]
pub fn is_placeholder(line: &str) -> bool {
    PLACEHOLDER.is_match(line)
}

/// Headings that hold the decision log
#[derive(Debug, Clone, Copy, Default)]
pub struct DecisionsTitle;

impl TitleMatcher for DecisionsTitle {
    fn matches(&self, title: &str) -> bool {
        TitlePrefix::new("Decisions").matches(title) || TitleEq::new("Key Decisions").matches(title)
    }
}

/// Headings that hold the blocker list
#[derive(Debug, Clone, Copy, Default)]
pub struct BlockersTitle;

impl TitleMatcher for BlockersTitle {
    fn matches(&self, title: &str) -> bool {
        TitlePrefix::new("Blockers").matches(title)
    }
}

/// Parse one decision bullet (without its `- ` marker)
///
/// The rationale follows the first ` — ` and may be absent.
#[must_use]
pub fn parse_decision_bullet(text: &str) -> Option<Decision> {
    let caps = DECISION_BULLET.captures(text)?;
    let phase = caps.get(1)?.as_str().trim();
    let rest = caps.get(2)?.as_str();
    let (summary, rationale) = rest
        .split_once(RATIONALE_SEPARATOR)
        .unwrap_or((rest, ""));
    Some(Decision::new(phase, summary.trim(), rationale.trim()))
}

fn cell<'r>(row: &'r TableRow, names: &[&str]) -> Option<&'r str> {
    row.iter()
        .find(|(header, _)| names.iter().any(|n| header.eq_ignore_ascii_case(n)))
        .map(|(_, value)| value.as_str())
}

fn decision_from_row(row: &TableRow) -> Option<Decision> {
    let summary = cell(row, &["Decision", "Summary"])?;
    if summary.is_empty() {
        return None;
    }
    Some(Decision::new(
        cell(row, &["Phase"]).unwrap_or_default(),
        summary,
        cell(row, &["Rationale", "Why"]).unwrap_or_default(),
    ))
}

/// Decisions recorded in a state body, table rows first, then bullets
#[must_use]
pub fn decisions(body: &str) -> Vec<Decision> {
    let Some(section) = find_section(body, &DecisionsTitle) else {
        return Vec::new();
    };
    let mut out: Vec<Decision> = parse_table(section.body)
        .iter()
        .filter_map(decision_from_row)
        .collect();
    out.extend(
        parse_list(section.body)
            .iter()
            .filter(|text| !is_placeholder(text))
            .map(|text| parse_decision_bullet(text).unwrap_or_else(|| Decision::new("", text.as_str(), ""))),
    );
    out
}

/// Blockers recorded in a state body, placeholders excluded
#[must_use]
pub fn blockers(body: &str) -> Vec<String> {
    find_section(body, &BlockersTitle).map_or_else(Vec::new, |section| {
        parse_list(section.body)
            .into_iter()
            .filter(|text| !is_placeholder(text))
            .collect()
    })
}

fn text(fields: &FieldMap, labels: &[&str]) -> Option<String> {
    fields.get_any(labels).map(str::to_string)
}

fn int(fields: &FieldMap, labels: &[&str]) -> Option<i64> {
    labels.iter().find_map(|label| fields.get_int(label))
}

/// Session continuity fields
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Session {
    /// `**Last Date:**`
    pub last_date: Option<String>,
    /// `**Stopped At:**`
    pub stopped_at: Option<String>,
    /// `**Resume File:**`
    pub resume_file: Option<String>,
}

impl Session {
    fn from_fields(fields: &FieldMap) -> Self {
        Self {
            last_date: text(fields, &["Last Date", "Last date", "Last session"]),
            stopped_at: text(fields, &["Stopped At", "Stopped at"]),
            resume_file: text(fields, &["Resume File", "Resume file"]),
        }
    }
}

/// Everything `state-snapshot` reports
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StateSnapshot {
    /// `**Current Phase:**` as written
    pub current_phase: Option<String>,
    /// `**Current Phase Name:**`
    pub current_phase_name: Option<String>,
    /// `**Total Phases:**`
    pub total_phases: Option<i64>,
    /// `**Current Plan:**`
    pub current_plan: Option<String>,
    /// `**Total Plans in Phase:**`
    pub total_plans_in_phase: Option<i64>,
    /// `**Status:**` as written
    pub status: Option<String>,
    /// `**Status:**` normalized
    pub status_normalized: Option<Status>,
    /// `**Progress:**` without the `%`
    pub progress_percent: Option<i64>,
    /// `**Last Activity:**`
    pub last_activity: Option<String>,
    /// `**Last Activity Description:**`
    pub last_activity_desc: Option<String>,
    /// `**Paused At:**`
    pub paused_at: Option<String>,
    /// Decision log
    pub decisions: Vec<Decision>,
    /// Open blockers
    pub blockers: Vec<String>,
    /// Session continuity
    pub session: Session,
}

impl StateSnapshot {
    /// Read a snapshot from the body of a state document
    #[must_use]
    pub fn from_body(body: &str) -> Self {
        let fields = scan_fields(body);
        let session = find_section(body, &TitlePrefix::new("Session"))
            .map_or_else(|| Session::from_fields(&fields), |s| Session::from_fields(&scan_fields(s.body)));
        let status = text(&fields, &["Status"]);

        Self {
            current_phase: text(&fields, &["Current Phase"]),
            current_phase_name: text(&fields, &["Current Phase Name"]),
            total_phases: int(&fields, &["Total Phases"]),
            current_plan: text(&fields, &["Current Plan"]),
            total_plans_in_phase: int(&fields, &["Total Plans in Phase"]),
            status_normalized: status.as_deref().map(normalize),
            status,
            progress_percent: int(&fields, &["Progress"]),
            last_activity: text(&fields, &["Last Activity"]),
            last_activity_desc: text(&fields, &["Last Activity Description"]),
            paused_at: text(&fields, &["Paused At", "Paused at"]),
            decisions: decisions(body),
            blockers: blockers(body),
            session,
        }
    }
}

/// `state-snapshot` over a state document that may not exist
#[must_use]
pub fn snapshot(document: Option<&str>) -> Outcome<StateSnapshot> {
    match document {
        Some(doc) => Outcome::Ready(StateSnapshot::from_body(split_frontmatter(doc).1)),
        None => Outcome::Missing(PlanningFile::State),
    }
}

/// Result of `state get`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateValue {
    /// Whole document
    Content(String),
    /// A field or section, by the name it was asked for
    Named {
        /// Requested name
        name: String,
        /// Field value or section body
        value: String,
    },
    /// Neither a field nor a section has that name
    NotFound(String),
}

impl Serialize for StateValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        match self {
            Self::Content(content) => map.serialize_entry("content", content)?,
            Self::Named { name, value } => map.serialize_entry(name, value)?,
            Self::NotFound(name) => {
                map.serialize_entry("error", &format!("Section or field \"{name}\" not found"))?;
            }
        }
        map.end()
    }
}

/// `state get [name]`: a field value, else a section body, else not found
#[must_use]
pub fn get(document: Option<&str>, name: Option<&str>) -> Outcome<StateValue> {
    let Some(doc) = document else {
        return Outcome::Missing(PlanningFile::State);
    };
    let Some(name) = name else {
        return Outcome::Ready(StateValue::Content(doc.to_string()));
    };

    let (_, body) = split_frontmatter(doc);
    let fields = scan_fields(body);
    let value = fields
        .get(name)
        .or_else(|| {
            fields
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(name))
                .map(|(_, value)| value)
        })
        .map(str::to_string)
        .or_else(|| find_section(body, &TitleEq::new(name)).map(|s| s.body.trim().to_string()));

    Outcome::Ready(value.map_or_else(
        || StateValue::NotFound(name.to_string()),
        |value| StateValue::Named {
            name: name.to_string(),
            value,
        },
    ))
}

//! Frontmatter synchronizer for the state document
//!
//! The frontmatter block is a machine-readable cache of selected body fields.
//! It is never edited in place: every sync regenerates it from the body, so
//! stale keys cannot survive and a second block can never appear.

use crate::status::{normalize, Status};
use chrono::{DateTime, SecondsFormat, Utc};
use gsd_markdown::{
    newline_style, parse_block, render_block, scan_fields, split_frontmatter, with_frontmatter,
    FieldMap, FrontmatterValue,
};
use serde::{Deserialize, Serialize};

/// Version stamped into every generated block
pub const STATE_VERSION: &str = "1.0";

/// Body label(s) → frontmatter key, in output order
///
/// Part of the file-format contract; keep stable.
pub const LABEL_KEYS: &[(&str, &[&str])] = &[
    ("current_phase", &["Current Phase"]),
    ("current_phase_name", &["Current Phase Name"]),
    ("current_plan", &["Current Plan"]),
    ("status", &["Status"]),
    ("stopped_at", &["Stopped At", "Stopped at"]),
    ("paused_at", &["Paused At", "Paused at"]),
    ("last_activity", &["Last Activity"]),
    ("total_phases", &["Total Phases"]),
    ("total_plans", &["Total Plans in Phase"]),
    ("percent", &["Progress"]),
];

fn labels_for(key: &str) -> &'static [&'static str] {
    LABEL_KEYS
        .iter()
        .find(|(k, _)| *k == key)
        .map_or(&[], |(_, labels)| labels)
}

fn body_text(fields: &FieldMap, key: &str) -> Option<String> {
    fields
        .get_any(labels_for(key))
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn body_int(fields: &FieldMap, key: &str) -> Option<i64> {
    labels_for(key)
        .iter()
        .find_map(|label| fields.get_int(label))
}

/// Numeric progress mirrored from the body
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressBlock {
    /// `**Total Phases:**`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_phases: Option<i64>,
    /// `**Total Plans in Phase:**`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_plans: Option<i64>,
    /// `**Progress:**` without the `%`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percent: Option<i64>,
}

impl ProgressBlock {
    fn is_empty(&self) -> bool {
        self.total_phases.is_none() && self.total_plans.is_none() && self.percent.is_none()
    }
}

/// Decoded or generated state frontmatter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StateFrontmatter {
    /// Format version
    pub gsd_state_version: String,
    /// Current phase number, as written
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_phase: Option<String>,
    /// Current phase name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_phase_name: Option<String>,
    /// Current plan id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_plan: Option<String>,
    /// Canonical status
    pub status: Status,
    /// Where work stopped
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stopped_at: Option<String>,
    /// Where work was paused
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paused_at: Option<String>,
    /// Time of the last regeneration (RFC 3339)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
    /// Date of the last recorded activity
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_activity: Option<String>,
    /// Numeric progress
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<ProgressBlock>,
}

impl Default for StateFrontmatter {
    fn default() -> Self {
        Self {
            gsd_state_version: STATE_VERSION.to_string(),
            current_phase: None,
            current_phase_name: None,
            current_plan: None,
            status: Status::FALLBACK,
            stopped_at: None,
            paused_at: None,
            last_updated: None,
            last_activity: None,
            progress: None,
        }
    }
}

/// Format a timestamp the way `last_updated` is written
#[must_use]
pub fn timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Secs, true)
}

impl StateFrontmatter {
    /// Build from body fields
    #[must_use]
    pub fn from_fields(fields: &FieldMap, now: DateTime<Utc>) -> Self {
        let progress = ProgressBlock {
            total_phases: body_int(fields, "total_phases"),
            total_plans: body_int(fields, "total_plans"),
            percent: body_int(fields, "percent"),
        };
        Self {
            gsd_state_version: STATE_VERSION.to_string(),
            current_phase: body_text(fields, "current_phase"),
            current_phase_name: body_text(fields, "current_phase_name"),
            current_plan: body_text(fields, "current_plan"),
            status: body_text(fields, "status").map_or(Status::FALLBACK, |s| normalize(&s)),
            stopped_at: body_text(fields, "stopped_at"),
            paused_at: body_text(fields, "paused_at"),
            last_updated: Some(timestamp(now)),
            last_activity: body_text(fields, "last_activity"),
            progress: (!progress.is_empty()).then_some(progress),
        }
    }

    /// Ordered entries for rendering
    #[must_use]
    pub fn entries(&self) -> Vec<(String, FrontmatterValue)> {
        fn text(out: &mut Vec<(String, FrontmatterValue)>, key: &str, value: Option<&String>) {
            if let Some(value) = value {
                out.push((key.to_string(), FrontmatterValue::from(value.as_str())));
            }
        }

        let mut out = vec![(
            "gsd_state_version".to_string(),
            FrontmatterValue::from(self.gsd_state_version.as_str()),
        )];
        text(&mut out, "current_phase", self.current_phase.as_ref());
        text(&mut out, "current_phase_name", self.current_phase_name.as_ref());
        text(&mut out, "current_plan", self.current_plan.as_ref());
        out.push(("status".to_string(), FrontmatterValue::from(self.status.as_str())));
        text(&mut out, "stopped_at", self.stopped_at.as_ref());
        text(&mut out, "paused_at", self.paused_at.as_ref());
        text(&mut out, "last_updated", self.last_updated.as_ref());
        text(&mut out, "last_activity", self.last_activity.as_ref());

        if let Some(progress) = self.progress.as_ref().filter(|p| !p.is_empty()) {
            let nested: Vec<_> = [
                ("total_phases", progress.total_phases),
                ("total_plans", progress.total_plans),
                ("percent", progress.percent),
            ]
            .into_iter()
            .filter_map(|(k, v)| v.map(|n| (k.to_string(), FrontmatterValue::Int(n))))
            .collect();
            out.push(("progress".to_string(), FrontmatterValue::Map(nested)));
        }
        out
    }

    /// Render as a complete `---` block
    #[must_use]
    pub fn render(&self, nl: &str) -> String {
        render_block(&self.entries(), nl)
    }
}

/// Regenerate the frontmatter of `document` from its body fields
///
/// Prepends a block when none exists, otherwise replaces it wholesale. The
/// body is left untouched, so applying this twice only changes `last_updated`.
#[must_use]
pub fn sync(document: &str, now: DateTime<Utc>) -> String {
    let (_, body) = split_frontmatter(document);
    sync_with(document, &scan_fields(body), now)
}

/// [`sync`] with an already scanned body field map
#[must_use]
pub fn sync_with(document: &str, fields: &FieldMap, now: DateTime<Utc>) -> String {
    let frontmatter = StateFrontmatter::from_fields(fields, now);
    tracing::debug!(status = %frontmatter.status, "regenerating state frontmatter");
    with_frontmatter(document, &frontmatter.render(newline_style(document)))
}

/// Frontmatter of `document`: decoded from its block when present and valid,
/// otherwise built on the fly from body fields
#[must_use]
pub fn read(document: &str, now: DateTime<Utc>) -> StateFrontmatter {
    let (block, body) = split_frontmatter(document);
    if let Some(block) = block {
        match parse_block::<StateFrontmatter>(block.raw) {
            Ok(frontmatter) => return frontmatter,
            Err(err) => {
                tracing::warn!(error = %err, "ignoring unreadable STATE.md frontmatter; rebuilding from body");
            }
        }
    }
    StateFrontmatter::from_fields(&scan_fields(body), now)
}

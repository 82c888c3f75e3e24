//! Status normalizer
//!
//! Maps the free-text `**Status:**` of a state document onto the five
//! canonical workflow states. Rules are tried in order and the first match
//! wins; phrases overlap ("Phase complete — ready for verification" contains
//! both "complete" and "ready"), so the order is part of the contract.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Canonical workflow status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Planning the next phase (also the fallback for unrecognised text)
    #[default]
    Planning,
    /// Executing plans
    Executing,
    /// Work paused mid-phase
    Paused,
    /// Phase work done, awaiting verification
    Verifying,
    /// Milestone complete
    Completed,
}

impl Status {
    /// Status used when no rule matches
    pub const FALLBACK: Status = Status::Planning;

    /// Canonical lowercase name
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Planning => "planning",
            Self::Executing => "executing",
            Self::Paused => "paused",
            Self::Verifying => "verifying",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Status {
    /// Accepts any text and normalizes it, so a hand-edited frontmatter value
    /// never surfaces un-normalized
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(normalize(&raw))
    }
}

/// One ordered normalization rule
#[derive(Clone, Copy)]
pub struct StatusRule {
    /// Status produced when the rule matches
    pub status: Status,
    /// Test over the lowercased input
    pub test: fn(&str) -> bool,
}

impl fmt::Debug for StatusRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatusRule").field("status", &self.status).finish()
    }
}

fn is_paused(s: &str) -> bool {
    s.contains("paused") || s.contains("stopped")
}

fn is_executing(s: &str) -> bool {
    s.contains("in progress") || s.contains("ready to execute") || s.contains("executing")
}

fn is_planning(s: &str) -> bool {
    s.contains("ready to plan") || s.contains("planning")
}

fn is_verifying(s: &str) -> bool {
    s.contains("verifying")
        || (s.contains("complete") && (s.contains("verif") || s.contains("phase complete")))
}

fn is_completed(s: &str) -> bool {
    s.contains("milestone complete")
        || s.contains("all phases complete")
        || s.contains("completed")
        || s.contains("shipped")
}

/// Normalization rules in priority order
pub const RULES: &[StatusRule] = &[
    StatusRule { status: Status::Paused, test: is_paused },
    StatusRule { status: Status::Executing, test: is_executing },
    StatusRule { status: Status::Planning, test: is_planning },
    StatusRule { status: Status::Verifying, test: is_verifying },
    StatusRule { status: Status::Completed, test: is_completed },
];

/// Normalize free-text status into a canonical [`Status`]
#[must_use]
pub fn normalize(text: &str) -> Status {
    let lowered = text.to_lowercase();
    let status = RULES
        .iter()
        .find(|rule| (rule.test)(&lowered))
        .map_or(Status::FALLBACK, |rule| rule.status);
    tracing::debug!(input = text, %status, "normalized status");
    status
}

//! Planning configuration (`.planning/config.json`)

use crate::error::CoreResult;
use serde::{Deserialize, Serialize};

/// Workflow toggles nested under `"workflow"`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct WorkflowSection {
    research: Option<bool>,
    verifier: Option<bool>,
}

/// On-disk shape: toggles may sit at the top level or under `"workflow"`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct RawConfig {
    model_profile: Option<String>,
    commit_docs: Option<bool>,
    parallelization: Option<bool>,
    research: Option<bool>,
    verifier: Option<bool>,
    workflow: WorkflowSection,
}

/// Settings surfaced to workflows
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanningConfig {
    /// Model profile name
    pub model_profile: String,
    /// Whether planning docs are committed
    pub commit_docs: bool,
    /// Whether plans may run in parallel
    pub parallelization: bool,
    /// Whether the research step runs
    pub research: bool,
    /// Whether the verifier runs
    pub verifier: bool,
}

impl Default for PlanningConfig {
    fn default() -> Self {
        Self {
            model_profile: "balanced".to_string(),
            commit_docs: true,
            parallelization: true,
            research: true,
            verifier: true,
        }
    }
}

impl From<RawConfig> for PlanningConfig {
    fn from(raw: RawConfig) -> Self {
        let defaults = Self::default();
        Self {
            model_profile: raw.model_profile.unwrap_or(defaults.model_profile),
            commit_docs: raw.commit_docs.unwrap_or(defaults.commit_docs),
            parallelization: raw.parallelization.unwrap_or(defaults.parallelization),
            research: raw
                .workflow
                .research
                .or(raw.research)
                .unwrap_or(defaults.research),
            verifier: raw
                .workflow
                .verifier
                .or(raw.verifier)
                .unwrap_or(defaults.verifier),
        }
    }
}

impl PlanningConfig {
    /// Parse config.json text; unknown keys are ignored
    ///
    /// # Errors
    /// Returns [`crate::CoreError::Config`] when the text is not valid JSON
    /// of the expected shape
    pub fn parse(text: &str) -> CoreResult<Self> {
        let raw: RawConfig = serde_json::from_str(text)?;
        Ok(raw.into())
    }

    /// Config from a file that may be absent or broken, falling back to defaults
    #[must_use]
    pub fn load(text: Option<&str>) -> Self {
        let Some(text) = text else {
            return Self::default();
        };
        Self::parse(text).unwrap_or_else(|err| {
            tracing::warn!(error = %err, "ignoring unreadable config.json; using defaults");
            Self::default()
        })
    }
}

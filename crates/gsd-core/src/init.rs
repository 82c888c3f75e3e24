//! Workflow bootstrap payloads (`init ...`)
//!
//! Tells a workflow where every planning document lives and what is known
//! about the phase it is about to work on. Paths are relative to the project
//! root and always `/`-separated; optional phase documents are only listed
//! when they exist.

use crate::config::PlanningConfig;
use crate::roadmap::{analyze, get_phase, PhaseLookup};
use crate::types::{PhaseDirectory, PhaseNumber, PhaseSource, PlanningFile};
use serde::Serialize;

/// Which workflow is being bootstrapped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitWorkflow {
    /// `init execute-phase <N>`
    ExecutePhase(PhaseNumber),
    /// `init plan-phase <N>`
    PlanPhase(PhaseNumber),
    /// `init phase-op <N>`
    PhaseOp(PhaseNumber),
    /// `init progress`
    Progress,
}

impl InitWorkflow {
    /// Subcommand name
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::ExecutePhase(_) => "execute-phase",
            Self::PlanPhase(_) => "plan-phase",
            Self::PhaseOp(_) => "phase-op",
            Self::Progress => "progress",
        }
    }

    /// Target phase, for the phase workflows
    #[must_use]
    pub fn phase(&self) -> Option<&PhaseNumber> {
        match self {
            Self::ExecutePhase(n) | Self::PlanPhase(n) | Self::PhaseOp(n) => Some(n),
            Self::Progress => None,
        }
    }
}

/// Documents an init payload is built from
#[derive(Clone, Copy)]
pub struct InitInputs<'a> {
    /// ROADMAP.md text, if present
    pub roadmap: Option<&'a str>,
    /// config.json text, if present
    pub config: Option<&'a str>,
    /// Phase directories
    pub phases: &'a dyn PhaseSource,
}

/// What is known about the target phase
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PhaseFacts {
    /// Whether a directory exists for the phase
    pub phase_found: bool,
    /// Directory path, relative to the project root
    pub phase_dir: Option<String>,
    /// Phase number (directory prefix when found, otherwise as requested)
    pub phase_number: String,
    /// Roadmap name, falling back to the directory slug
    pub phase_name: Option<String>,
    /// Plan files in the directory
    pub plan_count: usize,
    /// Summaries matching a plan
    pub summary_count: usize,
    /// Requirement ids from the roadmap
    pub phase_req_ids: Option<String>,
    /// Plan ids still lacking a summary (execute-phase only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub incomplete_plans: Option<Vec<String>>,
    /// `*-CONTEXT.md`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_path: Option<String>,
    /// `*-RESEARCH.md`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub research_path: Option<String>,
    /// `*-VERIFICATION.md`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification_path: Option<String>,
    /// `*-UAT.md`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uat_path: Option<String>,
}

/// Roadmap progress, for `init progress`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProgressFacts {
    /// Whether ROADMAP.md exists
    pub roadmap_exists: bool,
    /// Number of phase detail sections
    pub phase_count: usize,
    /// Phases complete on disk
    pub completed_phases: usize,
    /// Share of plans with a summary
    pub progress_percent: usize,
    /// First phase not yet complete
    pub current_phase: Option<String>,
}

/// Payload of every `init` subcommand
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InitReport {
    /// Subcommand name
    pub workflow: &'static str,
    /// `.planning/STATE.md`
    pub state_path: String,
    /// `.planning/ROADMAP.md`
    pub roadmap_path: String,
    /// `.planning/config.json`
    pub config_path: String,
    /// `.planning/REQUIREMENTS.md`
    pub requirements_path: String,
    /// `.planning/PROJECT.md`
    pub project_path: String,
    /// Target phase facts
    #[serde(flatten)]
    pub phase: Option<PhaseFacts>,
    /// Roadmap progress
    #[serde(flatten)]
    pub progress: Option<ProgressFacts>,
    /// Selected config values
    #[serde(flatten)]
    pub config: PlanningConfig,
}

fn phase_dir_path(dir: &PhaseDirectory) -> String {
    format!(
        "{}/{}/{}",
        PlanningFile::PLANNING_DIR,
        PlanningFile::PHASES_DIR,
        dir.name
    )
}

fn phase_facts(workflow: &InitWorkflow, number: &PhaseNumber, inputs: InitInputs<'_>) -> PhaseFacts {
    let dir = inputs.phases.find_phase(number);
    let detail = match get_phase(inputs.roadmap, number) {
        PhaseLookup::Found(detail) => Some(detail),
        PhaseLookup::NotFound | PhaseLookup::MissingRoadmap | PhaseLookup::Malformed { .. } => None,
    };

    let mut facts = PhaseFacts {
        phase_found: dir.is_some(),
        phase_number: number.as_str().to_string(),
        phase_name: detail.as_ref().map(|d| d.phase_name.clone()),
        phase_req_ids: detail.and_then(|d| d.phase_req_ids),
        ..PhaseFacts::default()
    };

    let Some(dir) = dir else {
        tracing::debug!(phase = %number, "no directory for phase");
        return facts;
    };

    let base = phase_dir_path(&dir);
    if let Some(prefix) = dir.name.split('-').next() {
        facts.phase_number = prefix.to_string();
    }
    if facts.phase_name.is_none() {
        facts.phase_name = dir.display_name();
    }
    facts.plan_count = dir.plan_count();
    facts.summary_count = dir.summary_count();
    if matches!(workflow, InitWorkflow::ExecutePhase(_)) {
        facts.incomplete_plans = Some(
            dir.incomplete_plan_ids()
                .into_iter()
                .map(str::to_string)
                .collect(),
        );
    }
    let document = |kind: &str| dir.find_document(kind).map(|file| format!("{base}/{file}"));
    facts.context_path = document("CONTEXT");
    facts.research_path = document("RESEARCH");
    facts.verification_path = document("VERIFICATION");
    facts.uat_path = document("UAT");
    facts.phase_dir = Some(base);
    facts
}

fn progress_facts(inputs: InitInputs<'_>) -> ProgressFacts {
    analyze(inputs.roadmap, inputs.phases)
        .ready()
        .map_or_else(ProgressFacts::default, |report| ProgressFacts {
            roadmap_exists: true,
            phase_count: report.phase_count,
            completed_phases: report.completed_phases,
            progress_percent: report.progress_percent,
            current_phase: report.current_phase,
        })
}

/// Build the payload for `workflow`
#[must_use]
pub fn init(workflow: &InitWorkflow, inputs: InitInputs<'_>) -> InitReport {
    let (phase, progress) = match workflow.phase() {
        Some(number) => (Some(phase_facts(workflow, number, inputs)), None),
        None => (None, Some(progress_facts(inputs))),
    };

    InitReport {
        workflow: workflow.name(),
        state_path: PlanningFile::State.relative_path(),
        roadmap_path: PlanningFile::Roadmap.relative_path(),
        config_path: PlanningFile::Config.relative_path(),
        requirements_path: PlanningFile::Requirements.relative_path(),
        project_path: PlanningFile::Project.relative_path(),
        phase,
        progress,
        config: PlanningConfig::load(inputs.config),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::Value;

    fn n(text: &str) -> PhaseNumber {
        PhaseNumber::parse(text).unwrap()
    }

    fn run(workflow: &InitWorkflow, roadmap: Option<&str>, dirs: &[PhaseDirectory]) -> Value {
        let inputs = InitInputs {
            roadmap,
            config: None,
            phases: &dirs.to_vec(),
        };
        serde_json::to_value(init(workflow, inputs)).unwrap()
    }

    fn api_dir(files: &[&str]) -> PhaseDirectory {
        PhaseDirectory::new("03-api", files.iter().copied())
    }

    #[test]
    fn core_paths_are_always_present() {
        let out = run(&InitWorkflow::Progress, None, &[]);
        assert_eq!(out["state_path"], ".planning/STATE.md");
        assert_eq!(out["roadmap_path"], ".planning/ROADMAP.md");
        assert_eq!(out["project_path"], ".planning/PROJECT.md");
        assert_eq!(out["config_path"], ".planning/config.json");
        assert_eq!(out["requirements_path"], ".planning/REQUIREMENTS.md");
        assert_eq!(out["roadmap_exists"], false);
        assert_eq!(out["model_profile"], "balanced");
    }

    #[test]
    fn optional_docs_listed_when_present() {
        let dir = api_dir(&["03-CONTEXT.md", "03-RESEARCH.md", "03-VERIFICATION.md", "03-UAT.md"]);
        let out = run(&InitWorkflow::PlanPhase(n("03")), None, &[dir]);
        assert_eq!(out["context_path"], ".planning/phases/03-api/03-CONTEXT.md");
        assert_eq!(out["research_path"], ".planning/phases/03-api/03-RESEARCH.md");
        assert_eq!(out["verification_path"], ".planning/phases/03-api/03-VERIFICATION.md");
        assert_eq!(out["uat_path"], ".planning/phases/03-api/03-UAT.md");
        assert_eq!(out["phase_dir"], ".planning/phases/03-api");
        assert_eq!(out["phase_found"], true);
    }

    #[test]
    fn optional_docs_omitted_when_missing() {
        let out = run(&InitWorkflow::PlanPhase(n("03")), None, &[api_dir(&[])]);
        assert!(out.get("context_path").is_none());
        assert!(out.get("research_path").is_none());
        assert_eq!(out["phase_req_ids"], Value::Null);
        assert!(out.get("incomplete_plans").is_none());
    }

    #[test]
    fn req_ids_and_name_from_roadmap() {
        let roadmap = "# Roadmap\n\n### Phase 3: API\n**Goal:** Build API\n**Requirements**: [CP-01, CP-02]\n";
        let out = run(&InitWorkflow::PlanPhase(n("3")), Some(roadmap), &[api_dir(&[])]);
        assert_eq!(out["phase_req_ids"], "CP-01, CP-02");
        assert_eq!(out["phase_name"], "API");
        assert_eq!(out["phase_number"], "03");
    }

    #[test]
    fn tbd_requirements_are_null() {
        let roadmap = "### Phase 3: API\n**Requirements**: TBD\n";
        let out = run(&InitWorkflow::PhaseOp(n("3")), Some(roadmap), &[]);
        assert_eq!(out["phase_req_ids"], Value::Null);
        assert_eq!(out["phase_found"], false);
        assert_eq!(out["phase_number"], "3");
    }

    #[test]
    fn execute_phase_lists_incomplete_plans() {
        let dir = api_dir(&["03-01-PLAN.md", "03-01-SUMMARY.md", "03-02-PLAN.md"]);
        let out = run(&InitWorkflow::ExecutePhase(n("3")), None, &[dir]);
        assert_eq!(out["plan_count"], 2);
        assert_eq!(out["summary_count"], 1);
        assert_eq!(out["incomplete_plans"], serde_json::json!(["03-02"]));
        assert_eq!(out["phase_name"], "api");
    }

    #[test]
    fn progress_reads_roadmap() {
        let roadmap = "### Phase 1: A\n### Phase 2: B\n";
        let dirs = [PhaseDirectory::new("01-a", ["PLAN.md", "SUMMARY.md"])];
        let out = run(&InitWorkflow::Progress, Some(roadmap), &dirs);
        assert_eq!(out["roadmap_exists"], true);
        assert_eq!(out["phase_count"], 2);
        assert_eq!(out["current_phase"], "2");
        assert!(out.get("phase_found").is_none());
    }
}

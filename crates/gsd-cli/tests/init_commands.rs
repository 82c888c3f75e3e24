//! `init` payloads driven through the command layer

mod common;

use common::run_ok;
use gsd_test_utils::{sample_project, TempProject};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

const API_ROADMAP: &str = "# Roadmap\n\n### Phase 3: API\n**Goal:** Build API\n";

fn api_project(roadmap_tail: Option<&str>, files: &[&str]) -> TempProject {
    let project = TempProject::new();
    project.add_phase("03-api", files);
    if let Some(tail) = roadmap_tail {
        project.write_roadmap(&format!("{API_ROADMAP}{tail}"));
    }
    project
}

const OPTIONAL_DOCS: &[&str] = &["03-CONTEXT.md", "03-RESEARCH.md", "03-VERIFICATION.md", "03-UAT.md"];

#[test]
fn test_execute_phase_core_paths() {
    let project = api_project(None, &["03-01-PLAN.md"]);
    let out = run_ok(&project, &["init", "execute-phase", "03"]);
    assert_eq!(out["workflow"], "execute-phase");
    assert_eq!(out["state_path"], ".planning/STATE.md");
    assert_eq!(out["roadmap_path"], ".planning/ROADMAP.md");
    assert_eq!(out["config_path"], ".planning/config.json");
    assert_eq!(out["phase_found"], true);
    assert_eq!(out["phase_dir"], ".planning/phases/03-api");
    assert_eq!(out["plan_count"], 1);
    assert_eq!(out["incomplete_plans"], json!(["03-01"]));
}

#[test]
fn test_plan_and_phase_op_list_optional_docs() {
    let project = api_project(None, OPTIONAL_DOCS);
    for workflow in ["plan-phase", "phase-op"] {
        let out = run_ok(&project, &["init", workflow, "03"]);
        assert_eq!(out["requirements_path"], ".planning/REQUIREMENTS.md");
        assert_eq!(out["context_path"], ".planning/phases/03-api/03-CONTEXT.md");
        assert_eq!(out["research_path"], ".planning/phases/03-api/03-RESEARCH.md");
        assert_eq!(out["verification_path"], ".planning/phases/03-api/03-VERIFICATION.md");
        assert_eq!(out["uat_path"], ".planning/phases/03-api/03-UAT.md");
        assert!(out.get("incomplete_plans").is_none());
    }
}

#[test]
fn test_plan_phase_omits_missing_docs() {
    let project = api_project(None, &[]);
    let out = run_ok(&project, &["init", "plan-phase", "03"]);
    assert!(out.get("context_path").is_none());
    assert!(out.get("research_path").is_none());
    assert_eq!(out["phase_name"], "api");
}

#[test]
fn test_progress_paths_and_report() {
    let project = sample_project();
    let out = run_ok(&project, &["init", "progress"]);
    assert_eq!(out["project_path"], ".planning/PROJECT.md");
    assert_eq!(out["config_path"], ".planning/config.json");
    assert_eq!(out["roadmap_exists"], true);
    assert_eq!(out["phase_count"], 3);
    assert_eq!(out["progress_percent"], 50);
    assert_eq!(out["current_phase"], "2");
}

#[test]
fn test_progress_without_roadmap() {
    let project = TempProject::new();
    let out = run_ok(&project, &["init", "progress"]);
    assert_eq!(out["state_path"], ".planning/STATE.md");
    assert_eq!(out["roadmap_exists"], false);
}

#[test]
fn test_phase_req_ids_variants() {
    let cases: [(Option<&str>, Value); 5] = [
        (Some("**Requirements**: CP-01, CP-02, CP-03\n**Plans:** 0 plans\n"), json!("CP-01, CP-02, CP-03")),
        (Some("**Requirements**: [CP-01, CP-02]\n**Plans:** 0 plans\n"), json!("CP-01, CP-02")),
        (Some("**Plans:** 0 plans\n"), Value::Null),
        (Some("**Requirements**: TBD\n**Plans:** 0 plans\n"), Value::Null),
        (None, Value::Null),
    ];
    for (tail, expected) in cases {
        let project = api_project(tail, &[]);
        let out = run_ok(&project, &["init", "plan-phase", "3"]);
        assert_eq!(out["phase_req_ids"], expected, "roadmap tail {tail:?}");
    }
}

#[test]
fn test_execute_phase_req_ids() {
    let project = api_project(Some("**Requirements**: EX-01, EX-02\n"), &["03-01-PLAN.md"]);
    let out = run_ok(&project, &["init", "execute-phase", "3"]);
    assert_eq!(out["phase_req_ids"], "EX-01, EX-02");
    assert_eq!(out["phase_name"], "API");
    assert_eq!(out["phase_number"], "03");

    let bare = api_project(Some("**Plans:** 1 plans\n"), &["03-01-PLAN.md"]);
    let out = run_ok(&bare, &["init", "execute-phase", "3"]);
    assert_eq!(out["phase_req_ids"], Value::Null);
}

#[test]
fn test_unknown_phase_directory() {
    let project = TempProject::new();
    let out = run_ok(&project, &["init", "plan-phase", "7"]);
    assert_eq!(out["phase_found"], false);
    assert_eq!(out["phase_dir"], Value::Null);
    assert_eq!(out["phase_number"], "7");
    assert_eq!(out["plan_count"], 0);
}

#[test]
fn test_config_values_surface() {
    let project = api_project(None, &[]);
    project.write_config(r#"{ "model_profile": "quality", "commit_docs": false, "workflow": { "research": false } }"#);
    let out = run_ok(&project, &["init", "plan-phase", "3"]);
    assert_eq!(out["model_profile"], "quality");
    assert_eq!(out["commit_docs"], false);
    assert_eq!(out["research"], false);
    assert_eq!(out["verifier"], true);
}

#[test]
fn test_broken_config_falls_back_to_defaults() {
    let project = api_project(None, &[]);
    project.write_config("{ not json");
    let out = run_ok(&project, &["init", "plan-phase", "3"]);
    assert_eq!(out["model_profile"], "balanced");
    assert_eq!(out["commit_docs"], true);
}

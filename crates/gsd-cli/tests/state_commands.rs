//! STATE.md commands driven through the command layer

mod common;

use common::{run, run_ok};
use gsd_core::{PlanningFile, StateMutator};
use gsd_test_utils::{count_lines, TempProject, SAMPLE_STATE};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use serde_json::json;

const EMPTY_SECTIONS: &str = "# Project State

## Decisions
No decisions yet.

## Blockers
None
";

// ── state-snapshot ──────────────────────────────────────────────────────────

#[test]
fn test_snapshot_missing_state() {
    let project = TempProject::new();
    let out = run_ok(&project, &["state-snapshot"]);
    assert_eq!(out, json!({ "error": "STATE.md not found" }));
}

#[test]
fn test_snapshot_basic_fields() {
    let project = TempProject::new();
    project.write_state(
        "# Project State

**Current Phase:** 03
**Current Phase Name:** API Layer
**Total Phases:** 6
**Current Plan:** 03-02
**Total Plans in Phase:** 3
**Status:** In progress
**Progress:** 45%
**Last Activity:** 2024-01-15
**Last Activity Description:** Completed 03-01-PLAN.md
",
    );

    let out = run_ok(&project, &["state-snapshot"]);
    assert_eq!(out["current_phase"], "03");
    assert_eq!(out["current_phase_name"], "API Layer");
    assert_eq!(out["total_phases"], 6);
    assert_eq!(out["current_plan"], "03-02");
    assert_eq!(out["total_plans_in_phase"], 3);
    assert_eq!(out["status"], "In progress");
    assert_eq!(out["status_normalized"], "executing");
    assert_eq!(out["progress_percent"], 45);
    assert_eq!(out["last_activity"], "2024-01-15");
    assert_eq!(out["last_activity_desc"], "Completed 03-01-PLAN.md");
    assert_eq!(out["paused_at"], serde_json::Value::Null);
}

#[test]
fn test_snapshot_decisions_table() {
    let project = TempProject::new();
    project.write_state(
        "# Project State

**Current Phase:** 01

## Decisions Made

| Phase | Decision | Rationale |
|-------|----------|-----------|
| 01 | Use Prisma | Better DX than raw SQL |
| 02 | JWT auth | Stateless authentication |
",
    );

    let out = run_ok(&project, &["state-snapshot"]);
    assert_eq!(out["decisions"].as_array().map(Vec::len), Some(2));
    assert_eq!(
        out["decisions"][0],
        json!({ "phase": "01", "summary": "Use Prisma", "rationale": "Better DX than raw SQL" })
    );
}

#[test]
fn test_snapshot_blockers_list() {
    let project = TempProject::new();
    project.write_state(
        "# Project State

**Current Phase:** 03

## Blockers

- Waiting for API credentials
- Need design review for dashboard
",
    );

    let out = run_ok(&project, &["state-snapshot"]);
    assert_eq!(
        out["blockers"],
        json!(["Waiting for API credentials", "Need design review for dashboard"])
    );
}

#[test]
fn test_snapshot_session_and_paused_at() {
    let project = TempProject::new();
    project.write_state(
        "# Project State

**Current Phase:** 03
**Paused At:** Phase 3, Plan 1, Task 2 - mid-implementation

## Session

**Last Date:** 2024-01-15
**Stopped At:** Phase 3, Plan 2, Task 1
**Resume File:** .planning/phases/03-api/03-02-PLAN.md
",
    );

    let out = run_ok(&project, &["state-snapshot"]);
    assert_eq!(out["paused_at"], "Phase 3, Plan 1, Task 2 - mid-implementation");
    assert_eq!(
        out["session"],
        json!({
            "last_date": "2024-01-15",
            "stopped_at": "Phase 3, Plan 2, Task 1",
            "resume_file": ".planning/phases/03-api/03-02-PLAN.md",
        })
    );
}

#[test]
fn test_cwd_override_reads_other_project() {
    let project = TempProject::new();
    project.write_state("# Session State\n\n**Current Phase:** 03\n**Status:** Ready to plan\n");
    let outside = TempProject::new();

    let out = gsd_cli::execute_args([
        "gsd-tools",
        "state-snapshot",
        "--cwd",
        project.root_str(),
    ])
    .unwrap();
    assert_eq!(out["current_phase"], "03");
    assert_eq!(out["status"], "Ready to plan");
    assert!(!outside.root().join(".planning/STATE.md").exists());
}

#[test]
fn test_invalid_cwd_fails_invocation() {
    let project = TempProject::new();
    let missing = project.root().join("does-not-exist");
    let err = gsd_cli::execute_args([
        "gsd-tools",
        "--cwd",
        missing.to_str().unwrap(),
        "state-snapshot",
    ])
    .unwrap_err();
    assert!(err.to_string().contains("Invalid --cwd"));
}

// ── mutations ───────────────────────────────────────────────────────────────

#[test]
fn test_add_decision_preserves_dollar_amounts() {
    let project = TempProject::new();
    project.write_state(EMPTY_SECTIONS);

    let out = run_ok(
        &project,
        &[
            "state",
            "add-decision",
            "--phase",
            "11-01",
            "--summary",
            "Benchmark prices moved from $0.50 to $2.00 to $5.00",
            "--rationale",
            "track cost growth",
        ],
    );
    assert_eq!(out["added"], true);
    assert_eq!(out["decision"]["phase"], "11-01");

    let state = project.read_state();
    assert!(state.contains(
        "- [Phase 11-01]: Benchmark prices moved from $0.50 to $2.00 to $5.00 — track cost growth"
    ));
    assert_eq!(count_lines(&state, "## Decisions"), 1);
    assert!(!state.contains("No decisions yet."));
}

#[test]
fn test_add_blocker_preserves_dollar_amounts() {
    let project = TempProject::new();
    project.write_state(EMPTY_SECTIONS);

    let out = run_ok(
        &project,
        &["state", "add-blocker", "--text", "Waiting on vendor quote $1.00 before approval"],
    );
    assert_eq!(
        out,
        json!({ "added": true, "blocker": "Waiting on vendor quote $1.00 before approval" })
    );

    let state = project.read_state();
    assert!(state.contains("- Waiting on vendor quote $1.00 before approval"));
    assert_eq!(count_lines(&state, "## Blockers"), 1);

    let snap = run_ok(&project, &["state-snapshot"]);
    assert_eq!(snap["blockers"], json!(["Waiting on vendor quote $1.00 before approval"]));
}

#[test]
fn test_add_decision_from_files() {
    let project = TempProject::new();
    project.write_state(EMPTY_SECTIONS);
    let summary = project.write_file("decision-summary.txt", "Price tiers: $0.50, $2.00, else $5.00\n");
    let rationale = project.write_file(
        "decision-rationale.txt",
        "Keep exact currency literals for budgeting\n",
    );

    run_ok(
        &project,
        &[
            "state",
            "add-decision",
            "--phase",
            "11-02",
            "--summary-file",
            summary.to_str().unwrap(),
            "--rationale-file",
            rationale.to_str().unwrap(),
        ],
    );

    let state = project.read_state();
    assert!(state.contains(
        "- [Phase 11-02]: Price tiers: $0.50, $2.00, else $5.00 — Keep exact currency literals for budgeting"
    ));
}

#[test]
fn test_add_blocker_from_relative_file() {
    let project = TempProject::new();
    project.write_state(EMPTY_SECTIONS);
    project.write_file(
        "blocker.txt",
        "Vendor quote updated from $1.00 to $2.00 pending approval\n",
    );

    run_ok(&project, &["state", "add-blocker", "--text-file", "blocker.txt"]);
    assert!(project
        .read_state()
        .contains("- Vendor quote updated from $1.00 to $2.00 pending approval"));
}

#[test]
fn test_decision_count_grows_by_one_per_add() {
    let project = TempProject::new();
    project.write_state(SAMPLE_STATE);

    for (i, summary) in ["Use Postgres", "Use Axum", "Ship weekly"].iter().enumerate() {
        run_ok(
            &project,
            &["state", "add-decision", "--phase", "03", "--summary", summary],
        );
        let snap = run_ok(&project, &["state-snapshot"]);
        assert_eq!(snap["decisions"].as_array().map(Vec::len), Some(i + 1));
    }
}

#[test]
fn test_resolve_blocker_restores_placeholder() {
    let project = TempProject::new();
    project.write_state(SAMPLE_STATE);
    run_ok(&project, &["state", "add-blocker", "--text", "Vendor A late"]);

    let out = run_ok(&project, &["state", "resolve-blocker", "--text", "vendor a"]);
    assert_eq!(out, json!({ "resolved": true, "removed": 1 }));

    let state = project.read_state();
    assert!(state.contains("## Blockers\nNone\n"));
    assert!(!state.contains("Vendor A late"));
    assert_eq!(run_ok(&project, &["state-snapshot"])["blockers"], json!([]));
}

#[test]
fn test_resolve_blocker_without_match() {
    let project = TempProject::new();
    project.write_state(SAMPLE_STATE);
    let out = run_ok(&project, &["state", "resolve-blocker", "--text", "nothing like this"]);
    assert_eq!(out, json!({ "resolved": false, "removed": 0 }));
}

#[test]
fn test_mutation_on_missing_state_reports_error() {
    let project = TempProject::new();
    let out = run_ok(&project, &["state", "add-blocker", "--text", "x"]);
    assert_eq!(out, json!({ "error": "STATE.md not found" }));
    assert!(!project.planning_path(PlanningFile::State).exists());
}

#[test]
fn test_decision_rationale_with_separator_round_trips() {
    let project = TempProject::new();
    project.write_state(EMPTY_SECTIONS);

    run_ok(
        &project,
        &["state", "add-decision", "--phase", "3", "--summary", "Use A", "--rationale", "fast — cheap"],
    );
    let snap = run_ok(&project, &["state-snapshot"]);
    assert_eq!(
        snap["decisions"],
        json!([{ "phase": "3", "summary": "Use A", "rationale": "fast — cheap" }])
    );
}

#[test]
fn test_decision_summary_with_separator_is_rejected() {
    let project = TempProject::new();
    project.write_state(EMPTY_SECTIONS);
    let err = run(
        &project,
        &["state", "add-decision", "--phase", "3", "--summary", "Use A — fast"],
    )
    .unwrap_err();
    assert!(err.to_string().contains("must not contain"));
    assert_eq!(project.read_state(), EMPTY_SECTIONS);
}

#[test]
fn test_multiline_file_payload_folds_to_one_line() {
    let project = TempProject::new();
    project.write_state(EMPTY_SECTIONS);
    project.write_file(
        "blocker.txt",
        "  Waiting on vendor\r\n   quote of $1.00\n\n\nfor the   staging cluster\n",
    );

    let out = run_ok(&project, &["state", "add-blocker", "--text-file", "blocker.txt"]);
    assert_eq!(out["blocker"], "Waiting on vendor quote of $1.00 for the   staging cluster");

    let state = project.read_state();
    assert!(state.contains("\n- Waiting on vendor quote of $1.00 for the   staging cluster\n"));
    assert_eq!(
        run_ok(&project, &["state-snapshot"])["blockers"],
        json!(["Waiting on vendor quote of $1.00 for the   staging cluster"])
    );
}

#[test]
fn test_blank_payload_is_rejected() {
    let project = TempProject::new();
    project.write_state(SAMPLE_STATE);
    let err = run(&project, &["state", "add-blocker", "--text", "   "]).unwrap_err();
    assert!(err.to_string().contains("must not be empty"));
    assert_eq!(project.read_state(), SAMPLE_STATE);
}

// ── state get ───────────────────────────────────────────────────────────────

#[test]
fn test_get_whole_field_and_section() {
    let project = TempProject::new();
    project.write_state(SAMPLE_STATE);

    assert_eq!(run_ok(&project, &["state", "get"]), json!({ "content": SAMPLE_STATE }));
    assert_eq!(
        run_ok(&project, &["state", "get", "Current Plan"]),
        json!({ "Current Plan": "03-02" })
    );
    assert_eq!(run_ok(&project, &["state", "get", "Blockers"]), json!({ "Blockers": "None" }));
    assert_eq!(
        run_ok(&project, &["state", "get", "Velocity"]),
        json!({ "error": "Section or field \"Velocity\" not found" })
    );
}

// ── state json ──────────────────────────────────────────────────────────────

#[test]
fn test_state_json_missing() {
    let project = TempProject::new();
    assert_eq!(run_ok(&project, &["state", "json"]), json!({ "error": "STATE.md not found" }));
}

#[test]
fn test_state_json_built_from_body() {
    let project = TempProject::new();
    project.write_state(
        "# Project State

**Current Phase:** 05
**Current Phase Name:** Deployment
**Total Phases:** 8
**Current Plan:** 05-03
**Total Plans in Phase:** 4
**Status:** In progress
**Progress:** 60%
**Last Activity:** 2026-01-20
",
    );

    let out = run_ok(&project, &["state", "json"]);
    assert_eq!(out["gsd_state_version"], "1.0");
    assert_eq!(out["current_phase"], "05");
    assert_eq!(out["current_phase_name"], "Deployment");
    assert_eq!(out["current_plan"], "05-03");
    assert_eq!(out["status"], "executing");
    assert!(out["last_updated"].is_string());
    assert_eq!(out["last_activity"], "2026-01-20");
    assert_eq!(out["progress"], json!({ "total_phases": 8, "total_plans": 4, "percent": 60 }));
}

#[test]
fn test_state_json_reads_existing_block() {
    let project = TempProject::new();
    project.write_state(
        "---
gsd_state_version: 1.0
current_phase: 03
status: paused
stopped_at: Plan 2 of Phase 3
---

# Project State

**Current Phase:** 03
**Status:** Paused
",
    );

    let out = run_ok(&project, &["state", "json"]);
    assert_eq!(out["gsd_state_version"], "1.0");
    assert_eq!(out["current_phase"], "03");
    assert_eq!(out["status"], "paused");
    assert_eq!(out["stopped_at"], "Plan 2 of Phase 3");
}

#[test]
fn test_state_json_normalizes_status() {
    let cases = [
        ("In progress", "executing"),
        ("Ready to execute", "executing"),
        ("Paused at Plan 3", "paused"),
        ("Ready to plan", "planning"),
        ("Phase complete — ready for verification", "verifying"),
        ("Milestone complete", "completed"),
        ("Something unusual", "planning"),
    ];
    let project = TempProject::new();
    for (input, expected) in cases {
        project.write_state(&format!("# State\n\n**Current Phase:** 01\n**Status:** {input}\n"));
        let out = run_ok(&project, &["state", "json"]);
        assert_eq!(out["status"], expected, "status {input:?}");
    }
}

// ── frontmatter sync on write ───────────────────────────────────────────────

#[test]
fn test_update_adds_frontmatter() {
    let project = TempProject::new();
    project.write_state("# Project State\n\n**Current Phase:** 02\n**Status:** Ready to execute\n");

    let out = run_ok(&project, &["state", "update", "Status", "Executing Plan 1"]);
    assert_eq!(out, json!({ "updated": ["Status"], "added": [] }));

    let content = project.read_state();
    assert!(content.starts_with("---\n"));
    assert!(content.contains("gsd_state_version: 1.0"));
    assert!(content.contains("current_phase: 02"));
    assert!(content.contains("**Current Phase:** 02"));
    assert!(content.contains("**Status:** Executing Plan 1"));
}

#[test]
fn test_patch_sets_several_fields() {
    let project = TempProject::new();
    project.write_state(
        "# Project State\n\n**Current Phase:** 04\n**Status:** Planning\n**Current Plan:** 04-01\n",
    );

    let out = run_ok(
        &project,
        &["state", "patch", "--Status", "In progress", "--Current Plan", "04-02", "--Stopped At=Task 3"],
    );
    assert_eq!(
        out,
        json!({ "updated": ["Status", "Current Plan"], "added": ["Stopped At"] })
    );

    let content = project.read_state();
    assert!(content.starts_with("---\n"));
    assert!(content.contains("**Current Plan:** 04-02\n**Stopped At:** Task 3\n"));
    let fm = run_ok(&project, &["state", "json"]);
    assert_eq!(fm["status"], "executing");
    assert_eq!(fm["stopped_at"], "Task 3");
}

#[test]
fn test_patch_rejects_dangling_flag() {
    let project = TempProject::new();
    project.write_state(SAMPLE_STATE);
    let err = run(&project, &["state", "patch", "--Status"]).unwrap_err();
    assert!(err.to_string().contains("missing value for --Status"));
}

#[test]
fn test_frontmatter_single_block_after_repeated_writes() {
    let project = TempProject::new();
    project.write_state("# Project State\n\n**Current Phase:** 01\n**Status:** Ready to execute\n");

    run_ok(&project, &["state", "update", "Status", "In progress"]);
    run_ok(&project, &["state", "update", "Status", "Paused"]);

    let content = project.read_state();
    assert_eq!(count_lines(&content, "---"), 2);
    assert!(content.contains("status: paused"));
}

#[test]
fn test_write_then_read_round_trip() {
    let project = TempProject::new();
    project.write_state(
        "# Project State

**Current Phase:** 07
**Current Phase Name:** Production
**Total Phases:** 10
**Status:** In progress
**Current Plan:** 07-05
**Progress:** 70%
",
    );

    run_ok(&project, &["state", "update", "Status", "Executing Plan 5"]);
    let out = run_ok(&project, &["state", "json"]);
    assert_eq!(out["current_phase"], "07");
    assert_eq!(out["current_phase_name"], "Production");
    assert_eq!(out["status"], "executing");
    assert!(out["last_updated"].is_string());
}

// ── single-writer limitation ────────────────────────────────────────────────

/// Two writers that both start from the same text: the later rename wins and
/// the earlier blocker is lost. Accepted; only torn writes are ruled out.
#[test]
fn test_concurrent_writers_last_rename_wins() {
    let project = TempProject::new();
    project.write_state(SAMPLE_STATE);
    let cli_project = gsd_cli::Project::open(Some(project.root())).unwrap();
    let mutator = StateMutator::new(chrono::Utc::now());

    let first = mutator.add_blocker(SAMPLE_STATE, "First writer").unwrap();
    let second = mutator.add_blocker(SAMPLE_STATE, "Second writer").unwrap();
    cli_project.write(PlanningFile::State, &first.document).unwrap();
    cli_project.write(PlanningFile::State, &second.document).unwrap();

    let state = project.read_state();
    assert!(state.contains("- Second writer"));
    assert!(!state.contains("- First writer"));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn test_inline_and_file_payloads_read_back_identical(
        text in "[0-9][A-Za-z0-9 $%|.,]{0,40}[A-Za-z0-9$%|]"
    ) {
        let inline = TempProject::new();
        inline.write_state(SAMPLE_STATE);
        run_ok(&inline, &["state", "add-blocker", "--text", &text]);

        let from_file = TempProject::new();
        from_file.write_state(SAMPLE_STATE);
        from_file.write_file("payload.txt", &text);
        run_ok(&from_file, &["state", "add-blocker", "--text-file", "payload.txt"]);

        let a = run_ok(&inline, &["state-snapshot"]);
        let b = run_ok(&from_file, &["state-snapshot"]);
        prop_assert_eq!(&a["blockers"], &json!([text]));
        prop_assert_eq!(&a["blockers"], &b["blockers"]);
    }
}

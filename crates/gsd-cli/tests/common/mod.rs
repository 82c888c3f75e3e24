//! Shared helpers for command-layer tests

#![allow(dead_code)]

use gsd_test_utils::TempProject;
use serde_json::Value;

/// Run `gsd-tools --cwd <root> <args...>` in process
pub fn run(project: &TempProject, args: &[&str]) -> anyhow::Result<Value> {
    let mut argv = vec!["gsd-tools", "--cwd", project.root_str()];
    argv.extend_from_slice(args);
    gsd_cli::execute_args(argv)
}

/// Like [`run`], failing the test on an invocation error
pub fn run_ok(project: &TempProject, args: &[&str]) -> Value {
    run(project, args).unwrap_or_else(|err| panic!("gsd-tools {args:?} failed: {err:#}"))
}

//! Command dispatch
//!
//! Maps parsed arguments onto `gsd_core` operations and turns each result
//! into the JSON value printed on stdout. Mutating commands read STATE.md,
//! apply one mutation and write the new text back through
//! [`Project::write`].

use crate::error::CliError;
use crate::input::TextSource;
use crate::project::Project;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::ArgMatches;
use gsd_core::{
    analyze, frontmatter, get_phase, init, snapshot, state, CoreResult, InitInputs, InitWorkflow,
    Mutation, Outcome, PhaseNumber, PlanningFile, StateMutator,
};
use serde::Serialize;
use serde_json::Value;

fn to_json<T: Serialize>(value: &T) -> Result<Value> {
    serde_json::to_value(value).context("failed to serialize command output")
}

fn phase(matches: &ArgMatches) -> Result<PhaseNumber> {
    matches
        .get_one::<PhaseNumber>("phase")
        .cloned()
        .context("missing phase argument")
}

fn text(matches: &ArgMatches, inline: &str, file: &str, project: &Project) -> Result<Option<String>> {
    TextSource::from_matches(matches, inline, file)
        .map(|source| source.load(project))
        .transpose()
}

/// Split raw `state patch` arguments into `(field, value)` pairs
///
/// Accepts `--Field value` and `--Field=value`.
///
/// # Errors
/// [`CliError::MissingPatchValue`] for a trailing flag,
/// [`CliError::UnexpectedPatchArgument`] for a token that is not a flag
pub fn patch_pairs<S: AsRef<str>>(raw: &[S]) -> Result<Vec<(String, String)>, CliError> {
    let mut pairs = Vec::new();
    let mut tokens = raw.iter().map(|s| s.as_ref());
    while let Some(token) = tokens.next() {
        let Some(flag) = token.strip_prefix("--") else {
            return Err(CliError::UnexpectedPatchArgument(token.to_string()));
        };
        if let Some((key, value)) = flag.split_once('=') {
            pairs.push((key.to_string(), value.to_string()));
            continue;
        }
        let value = tokens
            .next()
            .ok_or_else(|| CliError::MissingPatchValue(flag.to_string()))?;
        pairs.push((flag.to_string(), value.to_string()));
    }
    Ok(pairs)
}

/// Read STATE.md, apply `apply`, write the result back
fn mutate<R, F>(project: &Project, apply: F) -> Result<Value>
where
    R: Serialize,
    F: FnOnce(&str) -> CoreResult<Mutation<R>>,
{
    let Some(document) = project.read(PlanningFile::State)? else {
        return to_json(&Outcome::<()>::Missing(PlanningFile::State));
    };
    let Mutation { document, report } = apply(&document)?;
    project.write(PlanningFile::State, &document)?;
    to_json(&report)
}

fn run_state(matches: &ArgMatches, project: &Project, now: DateTime<Utc>) -> Result<Value> {
    let mutator = StateMutator::new(now);
    match matches.subcommand() {
        Some(("json", _)) => {
            let outcome = match project.read(PlanningFile::State)? {
                Some(doc) => Outcome::Ready(frontmatter::read(&doc, now)),
                None => Outcome::Missing(PlanningFile::State),
            };
            to_json(&outcome)
        }
        Some(("get", sub)) => {
            let document = project.read(PlanningFile::State)?;
            let name = sub.get_one::<String>("name").map(String::as_str);
            to_json(&state::get(document.as_deref(), name))
        }
        Some(("update", sub)) => {
            let field = sub.get_one::<String>("field").map_or("", String::as_str);
            let value = sub.get_one::<String>("value").map_or("", String::as_str);
            mutate(project, |doc| mutator.patch_fields(doc, &[(field, value)]))
        }
        Some(("patch", sub)) => {
            let raw: Vec<&String> = sub
                .get_many::<String>("fields")
                .map(Iterator::collect)
                .unwrap_or_default();
            let pairs = patch_pairs(&raw)?;
            mutate(project, |doc| mutator.patch_fields(doc, &pairs))
        }
        Some(("add-decision", sub)) => {
            let phase = sub.get_one::<String>("phase").map_or("", String::as_str);
            let summary = text(sub, "summary", "summary-file", project)?.unwrap_or_default();
            let rationale = text(sub, "rationale", "rationale-file", project)?;
            mutate(project, |doc| {
                mutator.add_decision(doc, phase, &summary, rationale.as_deref())
            })
        }
        Some(("add-blocker", sub)) => {
            let blocker = text(sub, "text", "text-file", project)?.unwrap_or_default();
            mutate(project, |doc| mutator.add_blocker(doc, &blocker))
        }
        Some(("resolve-blocker", sub)) => {
            let needle = text(sub, "text", "text-file", project)?.unwrap_or_default();
            mutate(project, |doc| mutator.resolve_blocker(doc, &needle))
        }
        Some((other, _)) => Err(CliError::UnknownCommand(format!("state {other}")).into()),
        None => Err(CliError::UnknownCommand("state".to_string()).into()),
    }
}

fn run_roadmap(matches: &ArgMatches, project: &Project) -> Result<Value> {
    let roadmap = project.read(PlanningFile::Roadmap)?;
    match matches.subcommand() {
        Some(("get-phase", sub)) => to_json(&get_phase(roadmap.as_deref(), &phase(sub)?)),
        Some(("analyze", _)) => to_json(&analyze(roadmap.as_deref(), &project.phases()?)),
        Some((other, _)) => Err(CliError::UnknownCommand(format!("roadmap {other}")).into()),
        None => Err(CliError::UnknownCommand("roadmap".to_string()).into()),
    }
}

fn run_init(matches: &ArgMatches, project: &Project) -> Result<Value> {
    let workflow = match matches.subcommand() {
        Some(("execute-phase", sub)) => InitWorkflow::ExecutePhase(phase(sub)?),
        Some(("plan-phase", sub)) => InitWorkflow::PlanPhase(phase(sub)?),
        Some(("phase-op", sub)) => InitWorkflow::PhaseOp(phase(sub)?),
        Some(("progress", _)) => InitWorkflow::Progress,
        Some((other, _)) => return Err(CliError::UnknownCommand(format!("init {other}")).into()),
        None => return Err(CliError::UnknownCommand("init".to_string()).into()),
    };
    let roadmap = project.read(PlanningFile::Roadmap)?;
    let config = project.read(PlanningFile::Config)?;
    let phases = project.phases()?;
    let report = init(
        &workflow,
        InitInputs {
            roadmap: roadmap.as_deref(),
            config: config.as_deref(),
            phases: &phases,
        },
    );
    tracing::debug!(workflow = workflow.name(), "built init payload");
    to_json(&report)
}

/// Run the command selected by `matches` against `project`
///
/// # Errors
/// Invalid requests (empty payloads, malformed patch arguments) and I/O
/// failures. Missing documents are reported inside the returned JSON.
pub fn run(matches: &ArgMatches, project: &Project, now: DateTime<Utc>) -> Result<Value> {
    match matches.subcommand() {
        Some(("state-snapshot", _)) => {
            let document = project.read(PlanningFile::State)?;
            to_json(&snapshot(document.as_deref()))
        }
        Some(("state", sub)) => run_state(sub, project, now),
        Some(("roadmap", sub)) => run_roadmap(sub, project),
        Some(("init", sub)) => run_init(sub, project),
        Some((other, _)) => Err(CliError::UnknownCommand(other.to_string()).into()),
        None => Err(CliError::UnknownCommand(String::new()).into()),
    }
}

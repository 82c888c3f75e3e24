//! Command-line grammar

use clap::{value_parser, Arg, ArgAction, ArgGroup, Command};
use gsd_core::PhaseNumber;
use std::path::PathBuf;

fn phase_arg() -> Arg {
    Arg::new("phase")
        .required(true)
        .value_parser(PhaseNumber::parse)
        .help("Phase number (e.g. 3, 03, 2.1)")
}

/// `--<name>` / `--<name>-file` pair, at most one of which may be given
fn text_pair(
    cmd: Command,
    [name, file, group]: [&'static str; 3],
    required: bool,
    help: &'static str,
) -> Command {
    cmd.arg(Arg::new(name).long(name).help(help))
        .arg(
            Arg::new(file)
                .long(file)
                .value_parser(value_parser!(PathBuf))
                .help("Read the value verbatim from a file"),
        )
        .group(ArgGroup::new(group).args([name, file]).required(required))
}

fn state_command() -> Command {
    let add_decision = Command::new("add-decision")
        .about("Append a decision to the decision log")
        .arg(Arg::new("phase").long("phase").required(true).help("Phase the decision belongs to"));
    let add_decision = text_pair(add_decision, ["summary", "summary-file", "summary-input"], true, "What was decided");
    let add_decision = text_pair(add_decision, ["rationale", "rationale-file", "rationale-input"], false, "Why");

    Command::new("state")
        .about("Read or mutate .planning/STATE.md")
        .subcommand_required(true)
        .subcommand(Command::new("json").about("Frontmatter as JSON (built from the body if absent)"))
        .subcommand(
            Command::new("get")
                .about("Whole document, or one field or section")
                .arg(Arg::new("name").help("Field or section name")),
        )
        .subcommand(
            Command::new("update")
                .about("Set one field")
                .arg(Arg::new("field").required(true))
                .arg(Arg::new("value").required(true).allow_hyphen_values(true)),
        )
        .subcommand(
            Command::new("patch")
                .about("Set several fields: --<Field> <value> ...")
                .allow_hyphen_values(true)
                .arg(
                    Arg::new("fields")
                        .num_args(1..)
                        .required(true)
                        .trailing_var_arg(true)
                        .allow_hyphen_values(true),
                ),
        )
        .subcommand(add_decision)
        .subcommand(text_pair(
            Command::new("add-blocker").about("Append a blocker"),
            ["text", "text-file", "text-input"],
            true,
            "Blocker text",
        ))
        .subcommand(text_pair(
            Command::new("resolve-blocker").about("Remove blockers containing the text"),
            ["text", "text-file", "text-input"],
            true,
            "Text to match (case-insensitive)",
        ))
}

fn roadmap_command() -> Command {
    Command::new("roadmap")
        .about("Read .planning/ROADMAP.md")
        .subcommand_required(true)
        .subcommand(
            Command::new("get-phase")
                .about("One phase's detail section")
                .arg(phase_arg()),
        )
        .subcommand(Command::new("analyze").about("Progress across every phase"))
}

fn init_command() -> Command {
    Command::new("init")
        .about("Bootstrap payload for a workflow")
        .subcommand_required(true)
        .subcommand(Command::new("execute-phase").arg(phase_arg()))
        .subcommand(Command::new("plan-phase").arg(phase_arg()))
        .subcommand(Command::new("phase-op").arg(phase_arg()))
        .subcommand(Command::new("progress"))
}

/// Full `gsd-tools` command tree
#[must_use]
pub fn command() -> Command {
    Command::new("gsd-tools")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Read and update GSD planning documents")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("cwd")
                .long("cwd")
                .global(true)
                .action(ArgAction::Set)
                .value_parser(value_parser!(PathBuf))
                .help("Project root to use instead of the working directory"),
        )
        .subcommand(Command::new("state-snapshot").about("Structured snapshot of STATE.md"))
        .subcommand(state_command())
        .subcommand(roadmap_command())
        .subcommand(init_command())
}

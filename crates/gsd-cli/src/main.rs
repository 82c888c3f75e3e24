//! `gsd-tools` binary: prints the command payload as pretty JSON

use std::process::ExitCode;

fn main() -> ExitCode {
    gsd_cli::init_logging();
    let matches = gsd_cli::cli::command().get_matches();

    match gsd_cli::execute(&matches).and_then(|value| Ok(serde_json::to_string_pretty(&value)?)) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

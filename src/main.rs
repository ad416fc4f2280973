//! Outline CLI - project plan import and task outlines

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = outline_cli::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

//! Lockwright CLI.
//!
//! Parses arguments, installs logging, dispatches to the command handler, and
//! maps errors to exit codes.

mod cli;
mod commands;

use cli::Cli;
use lockwright::exit_codes;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse_args();

    if let Err(err) = cli::init_tracing(cli.verbose) {
        eprintln!("Error: {:#}", err);
        return ExitCode::from(exit_codes::USER_ERROR as u8);
    }

    match commands::dispatch(cli.command) {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitCode::from(err.exit_code() as u8)
        }
    }
}

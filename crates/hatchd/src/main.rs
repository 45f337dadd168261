//! Demonstration host for the Hatch console.
//!
//! Loads configuration, initialises telemetry and serves a small command tree
//! until a termination signal arrives or an operator runs `shutdown`.

mod demo;

use std::process::ExitCode;

#[expect(
    clippy::print_stderr,
    reason = "fatal errors are reported on stderr"
)]
fn main() -> ExitCode {
    match demo::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("hatchd: {error}");
            ExitCode::FAILURE
        }
    }
}

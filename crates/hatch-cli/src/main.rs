//! CLI entrypoint for the Hatch attach client.
//!
//! Delegates to [`hatch_cli::run`] with the process arguments and standard
//! streams.

use std::io;
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut stdin = io::stdin().lock();
    let mut stdout = io::stdout();
    let mut stderr = io::stderr().lock();
    hatch_cli::run(std::env::args_os(), &mut stdin, &mut stdout, &mut stderr)
}

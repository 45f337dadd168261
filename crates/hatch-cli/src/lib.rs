//! Attach client for the Hatch remote command console.
//!
//! The runtime peels configuration flags off the argument list, lets clap
//! handle `--help` and `--version`, dials the configured console endpoint and
//! then runs the interactive attach loop. IO streams and the configuration
//! loader are injectable so tests can drive the whole flow in-process.

use std::ffi::OsString;
use std::io::{BufRead, Write};
use std::process::ExitCode;

use clap::Parser;

mod attach;
mod cli;
mod config;
mod errors;
mod transport;

use attach::attach;
use cli::Cli;
use config::{cli_arguments, split_config_arguments};
pub(crate) use config::{ConfigLoader, OrthoConfigLoader};
pub(crate) use errors::AppError;
use transport::connect;

/// Bundles the IO streams provided to the client runtime.
pub(crate) struct IoStreams<'a, R, W, E> {
    pub(crate) stdin: &'a mut R,
    pub(crate) stdout: &'a mut W,
    pub(crate) stderr: &'a mut E,
}

impl<'a, R, W, E> IoStreams<'a, R, W, E> {
    pub(crate) const fn new(stdin: &'a mut R, stdout: &'a mut W, stderr: &'a mut E) -> Self {
        Self {
            stdin,
            stdout,
            stderr,
        }
    }
}

/// Runs the client using the provided arguments and IO handles.
///
/// Returns success when the operator leaves with `exit` or closes input, and
/// failure when the console is busy, unreachable, or the arguments are
/// invalid.
#[must_use]
pub fn run<I, R, W, E>(args: I, stdin: &mut R, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    R: BufRead,
    W: Write + Send,
    E: Write,
{
    let mut io = IoStreams::new(stdin, stdout, stderr);
    run_with_loader(args, &mut io, &OrthoConfigLoader)
}

pub(crate) fn run_with_loader<I, R, W, E, L>(
    args: I,
    io: &mut IoStreams<'_, R, W, E>,
    loader: &L,
) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    R: BufRead,
    W: Write + Send,
    E: Write,
    L: ConfigLoader,
{
    let args: Vec<OsString> = args.into_iter().collect();
    let split = split_config_arguments(&args);

    let result = Cli::try_parse_from(cli_arguments(&args, &split))
        .map_err(AppError::CliUsage)
        .and_then(|_: Cli| loader.load(&split.config_arguments))
        .and_then(|config| {
            let stream = connect(config.console_endpoint())?;
            attach(stream, &mut *io.stdin, &mut *io.stdout)
        });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(AppError::CliUsage(error)) if !error.use_stderr() => {
            let rendered = error.render();
            write!(io.stdout, "{rendered}").map_or(ExitCode::FAILURE, |()| ExitCode::SUCCESS)
        }
        Err(error) => {
            // The exit status still reports the failure when stderr is gone.
            let _ = writeln!(io.stderr, "{error}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests;

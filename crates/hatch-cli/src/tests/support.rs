//! Test support for driving the client in-process.
//!
//! Supplies a scripted console that greets one client and records the lines
//! it forwards, plus a runner that captures the client's output streams.

use std::ffi::OsString;
use std::io::{self, BufRead, BufReader, Cursor, Write};
use std::net::{TcpListener, TcpStream};
use std::process::ExitCode;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, anyhow};
use hatch_config::{Config, ConsoleEndpoint};

use crate::{AppError, ConfigLoader, IoStreams, run_with_loader};

/// A console stand-in that accepts a single connection.
pub(super) struct FakeConsole {
    port: u16,
    handle: Option<thread::JoinHandle<Result<Vec<String>>>>,
}

impl FakeConsole {
    /// Spawns a console on an ephemeral loopback port that writes `greeting`
    /// to the first client and then records its lines until it disconnects.
    pub(super) fn spawn(greeting: &'static str) -> Result<Self> {
        let listener = TcpListener::bind(("127.0.0.1", 0)).context("bind fake console")?;
        listener
            .set_nonblocking(true)
            .context("fake console nonblocking")?;
        let port = listener.local_addr().context("local addr")?.port();
        let handle = thread::spawn(move || {
            let Some(stream) = accept_with_deadline(&listener)? else {
                return Ok(Vec::new());
            };
            serve_client(stream, greeting)
        });
        Ok(Self {
            port,
            handle: Some(handle),
        })
    }

    pub(super) const fn port(&self) -> u16 {
        self.port
    }

    /// Waits for the client to leave and returns the lines it sent.
    pub(super) fn take_lines(&mut self) -> Result<Vec<String>> {
        let handle = self
            .handle
            .take()
            .ok_or_else(|| anyhow!("fake console already joined"))?;
        handle
            .join()
            .map_err(|_| anyhow!("fake console thread panicked"))?
    }
}

fn accept_with_deadline(listener: &TcpListener) -> Result<Option<TcpStream>> {
    let deadline = Instant::now() + Duration::from_secs(2);
    loop {
        match listener.accept() {
            Ok((stream, _)) => return Ok(Some(stream)),
            Err(ref error)
                if error.kind() == io::ErrorKind::WouldBlock && Instant::now() < deadline =>
            {
                thread::sleep(Duration::from_millis(10));
            }
            // The client gave up before dialling; nothing to record.
            Err(ref error) if error.kind() == io::ErrorKind::WouldBlock => return Ok(None),
            Err(error) => return Err(error).context("accept connection"),
        }
    }
}

fn serve_client(mut stream: TcpStream, greeting: &str) -> Result<Vec<String>> {
    stream
        .set_nonblocking(false)
        .context("blocking client stream")?;
    stream
        .write_all(greeting.as_bytes())
        .context("write greeting")?;
    let mut lines = Vec::new();
    for line in BufReader::new(stream).lines() {
        match line {
            Ok(line) => lines.push(line),
            Err(_) => break,
        }
    }
    Ok(lines)
}

/// Returns a configuration pointing at `port` on loopback.
pub(super) fn config_for_port(port: u16) -> Config {
    Config {
        console_endpoint: ConsoleEndpoint::new("127.0.0.1", port),
        ..Config::default()
    }
}

/// Returns a loopback port with nothing listening on it.
pub(super) fn unused_port() -> Result<u16> {
    let listener = TcpListener::bind(("127.0.0.1", 0)).context("reserve port")?;
    Ok(listener.local_addr().context("reserved address")?.port())
}

pub(super) struct StaticConfigLoader {
    config: Config,
}

impl StaticConfigLoader {
    pub(super) const fn new(config: Config) -> Self {
        Self { config }
    }
}

impl ConfigLoader for StaticConfigLoader {
    fn load(&self, _args: &[OsString]) -> Result<Config, AppError> {
        Ok(self.config.clone())
    }
}

/// Captured result of one in-process client run.
pub(super) struct RunOutput {
    pub(super) exit: ExitCode,
    pub(super) stdout: String,
    pub(super) stderr: String,
}

pub(super) fn run_client(args: &[&str], input: &str, config: Config) -> RunOutput {
    let mut stdin = Cursor::new(input.to_owned());
    let mut stdout: Vec<u8> = Vec::new();
    let mut stderr: Vec<u8> = Vec::new();
    let exit = {
        let mut io = IoStreams::new(&mut stdin, &mut stdout, &mut stderr);
        run_with_loader(
            args.iter().map(OsString::from),
            &mut io,
            &StaticConfigLoader::new(config),
        )
    };
    RunOutput {
        exit,
        stdout: String::from_utf8(stdout).expect("stdout utf-8"),
        stderr: String::from_utf8(stderr).expect("stderr utf-8"),
    }
}

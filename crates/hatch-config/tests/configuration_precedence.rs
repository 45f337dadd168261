//! Layering tests for [`hatch_config::Config`].
//!
//! Exercises the built-in defaults, configuration files passed through
//! `--config-path`, and command-line overrides.

use std::ffi::OsString;
use std::fs;
use std::sync::Mutex;

use once_cell::sync::Lazy;
use rstest::{fixture, rstest};
use tempfile::TempDir;

use hatch_config::{
    Config, ConsoleEndpoint, LogFormat, default_console_endpoint, default_log_filter,
    default_log_format,
};

// Loading reads the process environment, so tests touching the same
// variables must not interleave.
static ENV_MUTEX: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

struct Harness {
    temp_dir: TempDir,
    args: Vec<OsString>,
}

impl Harness {
    fn write_config(&mut self, contents: &str) {
        let path = self.temp_dir.path().join("hatch.toml");
        fs::write(&path, contents).expect("write configuration");
        self.args.push(OsString::from("--config-path"));
        self.args.push(path.into_os_string());
    }

    fn push_arg(&mut self, arg: &str) {
        self.args.push(OsString::from(arg));
    }

    fn load(&self) -> Config {
        let _guard = ENV_MUTEX.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        Config::load_from_iter(self.args.clone()).expect("configuration should load")
    }
}

#[fixture]
fn harness() -> Harness {
    Harness {
        temp_dir: TempDir::new().expect("create temp dir"),
        args: vec![OsString::from("hatch")],
    }
}

#[rstest]
fn applies_built_in_defaults(harness: Harness) {
    let config = harness.load();

    assert_eq!(config.console_endpoint(), &default_console_endpoint());
    assert_eq!(config.log_filter(), default_log_filter());
    assert_eq!(config.log_format(), default_log_format());
}

#[rstest]
fn reads_endpoint_table_from_file(mut harness: Harness) {
    harness.write_config(
        "console_endpoint = { host = \"127.0.0.1\", port = 4100 }\nlog_format = \"compact\"\n",
    );

    let config = harness.load();

    assert_eq!(
        config.console_endpoint(),
        &ConsoleEndpoint::new("127.0.0.1", 4100)
    );
    assert_eq!(config.log_format(), LogFormat::Compact);
}

#[rstest]
fn command_line_overrides_file(mut harness: Harness) {
    harness.write_config("console_endpoint = \"tcp://127.0.0.1:4100\"\n");
    harness.push_arg("--console-endpoint");
    harness.push_arg("tcp://127.0.0.1:4200");

    let config = harness.load();

    assert_eq!(config.console_endpoint().port(), 4200);
}

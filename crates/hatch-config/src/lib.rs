//! Shared configuration for the Hatch console and its attach client.
//!
//! Both binaries resolve the same [`Config`] through `ortho_config`, which
//! layers built-in defaults, an optional TOML file (`--config-path`),
//! `HATCH_*` environment variables and command-line flags, in that order of
//! increasing precedence.

mod defaults;
mod endpoint;
mod logging;

use std::ffi::OsString;

use ortho_config::{OrthoConfig, OrthoResult};
use serde::{Deserialize, Serialize};

pub use defaults::{
    DEFAULT_CONSOLE_HOST, DEFAULT_CONSOLE_PORT, DEFAULT_LOG_FILTER, default_console_endpoint,
    default_log_filter, default_log_filter_string, default_log_format,
};
pub use endpoint::{ConsoleEndpoint, EndpointParseError};
pub use logging::{LogFormat, LogFormatParseError};

/// Resolved configuration shared by `hatchd` and `hatch`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "HATCH")]
pub struct Config {
    /// Loopback TCP endpoint the console listens on and the client dials.
    #[ortho_config(default = default_console_endpoint())]
    pub console_endpoint: ConsoleEndpoint,
    /// `tracing` filter expression applied by the telemetry subscriber.
    #[ortho_config(default = default_log_filter_string())]
    pub log_filter: String,
    /// Output format for structured logs.
    #[ortho_config(default = default_log_format())]
    pub log_format: LogFormat,
}

impl Config {
    /// Loads configuration from the process arguments and environment.
    ///
    /// # Errors
    ///
    /// Returns an [`ortho_config::OrthoError`] when a layer cannot be read or
    /// merged.
    pub fn load() -> OrthoResult<Self> {
        <Self as OrthoConfig>::load()
    }

    /// Loads configuration using `args` in place of the process arguments.
    ///
    /// # Errors
    ///
    /// Returns an [`ortho_config::OrthoError`] when a layer cannot be read or
    /// merged.
    pub fn load_from_iter<I, T>(args: I) -> OrthoResult<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        <Self as OrthoConfig>::load_from_iter(args)
    }

    /// Endpoint the console binds to.
    #[must_use]
    pub const fn console_endpoint(&self) -> &ConsoleEndpoint {
        &self.console_endpoint
    }

    /// Log filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Log output format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            console_endpoint: default_console_endpoint(),
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
        }
    }
}

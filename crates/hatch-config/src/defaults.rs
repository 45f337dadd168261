use crate::endpoint::ConsoleEndpoint;

/// Loopback host the console binds to unless configured otherwise.
pub const DEFAULT_CONSOLE_HOST: &str = "127.0.0.1";

/// Default TCP port for the console.
pub const DEFAULT_CONSOLE_PORT: u16 = 9779;

/// Default log filter expression used by the binaries.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Default log filter expression used by the binaries.
#[must_use]
pub const fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
#[must_use]
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format for the binaries.
#[must_use]
pub const fn default_log_format() -> crate::logging::LogFormat {
    crate::logging::LogFormat::Json
}

/// Endpoint used when no configuration layer supplies one.
#[must_use]
pub fn default_console_endpoint() -> ConsoleEndpoint {
    ConsoleEndpoint::new(DEFAULT_CONSOLE_HOST, DEFAULT_CONSOLE_PORT)
}

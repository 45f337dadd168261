//! Error types for the attach client.

use std::io;
use std::sync::Arc;

use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("failed to load configuration: {0}")]
    LoadConfiguration(Arc<ortho_config::OrthoError>),
    #[error("{0}")]
    CliUsage(clap::Error),
    #[error("failed to resolve console address {endpoint}: {source}")]
    Resolve { endpoint: String, source: io::Error },
    #[error("failed to connect to console at {endpoint}: {source}")]
    Connect { endpoint: String, source: io::Error },
    #[error("failed to read the console handshake: {0}")]
    Handshake(io::Error),
    #[error("the console closed the connection before admitting this client")]
    Disconnected,
    #[error("another client is attached; connection closed")]
    Busy,
    #[error("failed to read local input: {0}")]
    ReadInput(io::Error),
    #[error("failed to write to the terminal: {0}")]
    WriteOutput(io::Error),
    #[error("failed to prepare the connection: {0}")]
    CloneStream(io::Error),
}

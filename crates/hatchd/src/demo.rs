//! Sample command tree served by the `hatchd` binary.

use std::sync::Arc;
use std::time::Instant;

use hatch_config::Config;
use hatchd::{
    CommandNode, Console, ConsoleError, HandlerSet, JsonOutput, OsSignals, Session,
    ShutdownError, ShutdownSignal, TelemetryError, TreeShape, fire_on_signal, telemetry,
};
use ortho_config::OrthoError;
use serde_json::json;
use thiserror::Error;
use tracing::info;

const DEMO_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::demo");

/// Failures that stop the demo host.
#[derive(Debug, Error)]
pub(crate) enum DemoError {
    #[error("failed to load configuration: {0}")]
    LoadConfiguration(Arc<OrthoError>),
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
    #[error(transparent)]
    Signals(#[from] ShutdownError),
    #[error(transparent)]
    Console(#[from] ConsoleError),
}

pub(crate) fn run() -> Result<(), DemoError> {
    let config = Config::load().map_err(DemoError::LoadConfiguration)?;
    telemetry::initialise(&config)?;

    let shutdown = ShutdownSignal::new();
    let _signal_thread = fire_on_signal(OsSignals::install()?, shutdown.clone());

    let session = Arc::new(Session::new());
    let handlers = handlers(&config, &session, &shutdown);
    let console = Console::launch(
        config.console_endpoint(),
        &shape(),
        handlers,
        session,
        shutdown,
    )?;
    info!(
        target: DEMO_TARGET,
        addr = %console.local_addr(),
        "attach with `hatch`"
    );
    console.join()?;
    Ok(())
}

pub(crate) fn shape() -> TreeShape {
    TreeShape::new()
        .node(CommandNode::new("Status").describe("report uptime and session state"))
        .node(CommandNode::new("Echo").describe("repeat the arguments back"))
        .node(
            CommandNode::new("Config")
                .describe("inspect the loaded configuration")
                .child(CommandNode::new("Show").describe("print the configuration as JSON"))
                .child(CommandNode::new("Filter").describe("print the active log filter")),
        )
        .node(
            CommandNode::new("Session")
                .describe("inspect this session")
                .child(CommandNode::new("Info").describe("print peer address and permission")),
        )
        .node(CommandNode::new("Shutdown").describe("stop the console"))
}

pub(crate) fn handlers(
    config: &Config,
    session: &Arc<Session>,
    shutdown: &ShutdownSignal,
) -> HandlerSet {
    let started = Instant::now();
    let status_session = Arc::clone(session);
    let info_session = Arc::clone(session);
    let show_config = config.clone();
    let filter_config = config.clone();
    let stopper = shutdown.clone();

    HandlerSet::new()
        .nullary("Status", move |out| {
            out.write_pretty_json(&json!({
                "uptime_secs": started.elapsed().as_secs(),
                "session_active": status_session.is_active(),
            }));
        })
        .with_args("Echo", |out, args| out.write_line(&args.join(" ")))
        .nullary("Config", |out| out.write_line("usage: config show|filter"))
        .nullary("ConfigShow", move |out| out.write_pretty_json(&show_config))
        .nullary("ConfigFilter", move |out| {
            out.write_line(filter_config.log_filter());
        })
        .nullary("SessionInfo", move |out| {
            out.write_json(&json!({
                "peer": info_session.peer_addr().map(|addr| addr.to_string()),
                "permission": info_session.permission().value(),
            }));
        })
        .nullary("Shutdown", move |out| {
            out.write_line("shutting down");
            stopper.fire();
        })
}

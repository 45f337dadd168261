//! The running console: listener, session and shutdown watcher.
//!
//! [`Console::start`] binds the endpoint, spawns the accept loop and a watcher
//! that waits on the [`ShutdownSignal`]. When the signal fires, an attached
//! client receives [`FAREWELL_LINE`] before its connection is closed, and the
//! accept loop exits.

mod connection;

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::thread;

use hatch_config::ConsoleEndpoint;
use thiserror::Error;
use tracing::{Dispatch, info};

use crate::dispatch::{Dispatcher, HandlerSet};
use crate::session::Session;
use crate::shutdown::ShutdownSignal;
use crate::transport::{ConsoleListener, ListenerError, ListenerHandle};
use crate::tree::{TreeError, TreeShape};

use self::connection::ConsoleConnectionHandler;

const CONSOLE_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::console");

/// Line written to an attached client when the console shuts down.
pub const FAREWELL_LINE: &str = "I'm closed,see you next time.";

/// Errors raised while starting or stopping the console.
#[derive(Debug, Error)]
pub enum ConsoleError {
    /// The command tree failed validation.
    #[error(transparent)]
    Tree(#[from] TreeError),
    /// The listener could not be bound or started.
    #[error(transparent)]
    Listener(#[from] ListenerError),
    /// The shutdown watcher thread could not be started.
    #[error("failed to spawn shutdown watcher: {source}")]
    Spawn {
        /// Underlying thread-spawn error.
        #[source]
        source: io::Error,
    },
    /// The shutdown watcher thread panicked.
    #[error("console watcher thread panicked")]
    ThreadPanic,
}

/// A console serving one session on a loopback endpoint.
#[derive(Debug)]
pub struct Console {
    local_addr: SocketAddr,
    session: Arc<Session>,
    shutdown: ShutdownSignal,
    listener: ListenerHandle,
    watcher: thread::JoinHandle<()>,
}

impl Console {
    /// Validates the tree, then starts serving it.
    ///
    /// Nothing is bound when validation fails.
    ///
    /// # Errors
    ///
    /// Returns [`ConsoleError::Tree`] for an invalid tree, or any error from
    /// [`Console::start`].
    pub fn launch(
        endpoint: &ConsoleEndpoint,
        shape: &TreeShape,
        handlers: HandlerSet,
        session: Arc<Session>,
        shutdown: ShutdownSignal,
    ) -> Result<Self, ConsoleError> {
        let dispatcher = Dispatcher::build(shape, handlers)?;
        Self::start(endpoint, dispatcher, session, shutdown)
    }

    /// Binds `endpoint` and starts serving `dispatcher` through `session`.
    ///
    /// The session is passed in so handlers registered before start can
    /// capture it.
    ///
    /// # Errors
    ///
    /// Returns [`ConsoleError::Listener`] when the endpoint cannot be bound or
    /// is not a loopback address, and [`ConsoleError::Spawn`] when a thread
    /// cannot be started. In the latter case `shutdown` has been fired.
    pub fn start(
        endpoint: &ConsoleEndpoint,
        dispatcher: Dispatcher,
        session: Arc<Session>,
        shutdown: ShutdownSignal,
    ) -> Result<Self, ConsoleError> {
        let listener = ConsoleListener::bind(endpoint)?;
        let local_addr = listener.local_addr()?;
        let handler = Arc::new(ConsoleConnectionHandler::new(
            dispatcher,
            Arc::clone(&session),
            shutdown.clone(),
        ));
        let listener = listener.start(handler, shutdown.clone())?;
        let watcher = spawn_watcher(Arc::clone(&session), shutdown.clone())
            .map_err(|source| ConsoleError::Spawn { source })?;

        info!(
            target: CONSOLE_TARGET,
            %local_addr,
            "console started"
        );
        Ok(Self {
            local_addr,
            session,
            shutdown,
            listener,
            watcher,
        })
    }

    /// Address the console is listening on.
    #[must_use]
    pub const fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// The console's session.
    #[must_use]
    pub const fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Fires the shutdown signal.
    pub fn shutdown(&self) {
        self.shutdown.fire();
    }

    /// Blocks until the console has stopped.
    ///
    /// Returns once the shutdown signal has fired and both background
    /// threads have exited.
    ///
    /// # Errors
    ///
    /// Returns an error when either background thread panicked.
    pub fn join(self) -> Result<(), ConsoleError> {
        let Self {
            listener, watcher, ..
        } = self;
        let listener_result = listener.join();
        watcher.join().map_err(|_| ConsoleError::ThreadPanic)?;
        listener_result?;
        info!(target: CONSOLE_TARGET, "console stopped");
        Ok(())
    }
}

fn spawn_watcher(
    session: Arc<Session>,
    shutdown: ShutdownSignal,
) -> io::Result<thread::JoinHandle<()>> {
    let dispatch = tracing::dispatcher::get_default(Dispatch::clone);
    thread::Builder::new()
        .name("hatch-shutdown".to_owned())
        .spawn(move || {
            shutdown.wait();
            tracing::dispatcher::with_default(&dispatch, || {
                if session.close_with_farewell(FAREWELL_LINE) {
                    info!(target: CONSOLE_TARGET, "closed active session on shutdown");
                }
            });
        })
}

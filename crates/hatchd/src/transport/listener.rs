//! Listener implementation for the console endpoint.

use std::io;
use std::net::{SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use hatch_config::ConsoleEndpoint;
use tracing::dispatcher::{self, Dispatch};
use tracing::{debug, info, warn};

use crate::shutdown::ShutdownSignal;

use super::{ConnectionHandler, LISTENER_TARGET, ListenerError};

const ACCEPT_BACKOFF: Duration = Duration::from_millis(25);
const ERROR_BACKOFF: Duration = Duration::from_millis(150);

/// Listener bound to a loopback console endpoint.
#[derive(Debug)]
pub(crate) struct ConsoleListener {
    endpoint: ConsoleEndpoint,
    listener: TcpListener,
}

impl ConsoleListener {
    /// Resolves and binds `endpoint`, refusing non-loopback addresses.
    pub(crate) fn bind(endpoint: &ConsoleEndpoint) -> Result<Self, ListenerError> {
        let listener = bind_tcp(endpoint.host(), endpoint.port())?;
        Ok(Self {
            endpoint: endpoint.clone(),
            listener,
        })
    }

    pub(crate) fn local_addr(&self) -> Result<SocketAddr, ListenerError> {
        self.listener
            .local_addr()
            .map_err(|source| ListenerError::LocalAddr { source })
    }

    /// Starts the accept loop on a background thread.
    ///
    /// The thread logs through the caller's current dispatcher. The loop exits
    /// once `shutdown` fires.
    pub(crate) fn start(
        self,
        handler: Arc<dyn ConnectionHandler>,
        shutdown: ShutdownSignal,
    ) -> Result<ListenerHandle, ListenerError> {
        self.listener
            .set_nonblocking(true)
            .map_err(|source| ListenerError::NonBlocking { source })?;
        let loop_shutdown = shutdown.clone();
        let dispatch = dispatcher::get_default(Dispatch::clone);
        let handle = thread::Builder::new()
            .name("hatch-accept".to_owned())
            .spawn(move || {
                dispatcher::with_default(&dispatch, || {
                    run_accept_loop(&self, &loop_shutdown, handler.as_ref());
                });
            })
            .map_err(|source| ListenerError::Spawn { source })?;
        Ok(ListenerHandle {
            shutdown,
            handle: Some(handle),
        })
    }
}

/// Handle to the background accept thread.
#[derive(Debug)]
pub(crate) struct ListenerHandle {
    shutdown: ShutdownSignal,
    handle: Option<thread::JoinHandle<()>>,
}

impl ListenerHandle {
    pub(crate) fn join(mut self) -> Result<(), ListenerError> {
        if let Some(handle) = self.handle.take() {
            handle.join().map_err(|_| ListenerError::ThreadPanic)
        } else {
            Ok(())
        }
    }
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        self.shutdown.fire();
    }
}

fn run_accept_loop(
    listener: &ConsoleListener,
    shutdown: &ShutdownSignal,
    handler: &dyn ConnectionHandler,
) {
    info!(
        target: LISTENER_TARGET,
        endpoint = %listener.endpoint,
        "console listener active"
    );
    let mut last_error = None::<io::ErrorKind>;
    while !shutdown.is_fired() {
        match accept_connection(&listener.listener) {
            Ok(Some(stream)) => {
                last_error = None;
                handler.handle(stream);
            }
            Ok(None) => {
                if shutdown.wait_timeout(ACCEPT_BACKOFF) {
                    break;
                }
            }
            Err(_) if shutdown.is_fired() => break,
            Err(error) => {
                let kind = error.kind();
                if last_error != Some(kind) {
                    warn!(
                        target: LISTENER_TARGET,
                        error = %error,
                        "console accept error"
                    );
                }
                last_error = Some(kind);
                if shutdown.wait_timeout(ERROR_BACKOFF) {
                    break;
                }
            }
        }
    }
    info!(
        target: LISTENER_TARGET,
        endpoint = %listener.endpoint,
        "console listener stopped"
    );
}

fn accept_connection(listener: &TcpListener) -> io::Result<Option<TcpStream>> {
    match listener.accept() {
        Ok((stream, peer)) => {
            stream.set_nonblocking(false)?;
            debug!(target: LISTENER_TARGET, %peer, "accepted connection");
            Ok(Some(stream))
        }
        Err(error) if error.kind() == io::ErrorKind::WouldBlock => Ok(None),
        Err(error) => Err(error),
    }
}

fn bind_tcp(host: &str, port: u16) -> Result<TcpListener, ListenerError> {
    let addrs: Vec<SocketAddr> = (host, port)
        .to_socket_addrs()
        .map_err(|source| ListenerError::Resolve {
            host: host.to_owned(),
            port,
            source,
        })?
        .collect();
    let first = addrs
        .first()
        .copied()
        .ok_or_else(|| ListenerError::ResolveEmpty {
            host: host.to_owned(),
            port,
        })?;
    let addr = addrs
        .into_iter()
        .find(|addr| addr.ip().is_loopback())
        .ok_or(ListenerError::NotLoopback { addr: first })?;
    TcpListener::bind(addr).map_err(|source| ListenerError::BindTcp { addr, source })
}

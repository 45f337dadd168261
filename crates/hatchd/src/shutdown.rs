//! Shutdown notification for the console.
//!
//! [`ShutdownSignal`] is a broadcast-once, level-triggered flag: every clone
//! observes the same state, and once fired it stays fired. The accept loop
//! polls it between accepts while the session watcher blocks on it.
//!
//! [`OsSignals`] bridges process termination signals onto a
//! [`ShutdownSignal`] via [`fire_on_signal`].

use std::io;
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use signal_hook::consts::signal::{SIGHUP, SIGINT, SIGQUIT, SIGTERM};
use signal_hook::iterator::Signals;
use thiserror::Error;
use tracing::info;

const SHUTDOWN_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::shutdown");

/// Shared, fire-once shutdown flag.
#[derive(Debug, Clone, Default)]
pub struct ShutdownSignal {
    inner: Arc<SignalState>,
}

#[derive(Debug, Default)]
struct SignalState {
    fired: Mutex<bool>,
    changed: Condvar,
}

impl ShutdownSignal {
    /// Creates an unfired signal.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fires the signal, waking every waiter. Further calls have no effect.
    pub fn fire(&self) {
        let mut fired = self.lock();
        if !*fired {
            *fired = true;
            info!(target: SHUTDOWN_TARGET, "shutdown requested");
        }
        self.inner.changed.notify_all();
    }

    /// Returns true once the signal has fired.
    #[must_use]
    pub fn is_fired(&self) -> bool {
        *self.lock()
    }

    /// Blocks until the signal fires.
    pub fn wait(&self) {
        let mut fired = self.lock();
        while !*fired {
            fired = self
                .inner
                .changed
                .wait(fired)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Blocks until the signal fires or `timeout` elapses.
    ///
    /// Returns true when the signal has fired.
    #[must_use]
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut fired = self.lock();
        while !*fired {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            fired = self
                .inner
                .changed
                .wait_timeout(fired, remaining)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
        *fired
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, bool> {
        self.inner
            .fired
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Source of process-level termination requests.
pub trait SignalSource: Send + 'static {
    /// Blocks until a termination request arrives.
    ///
    /// Returns the signal number, or `None` when the source closed without
    /// one.
    fn wait(&mut self) -> Option<i32>;
}

/// Errors reported while installing signal handlers.
#[derive(Debug, Error)]
pub enum ShutdownError {
    /// Installing signal handlers failed.
    #[error("failed to install signal handlers: {source}")]
    Install {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
}

/// Termination signals delivered to the process.
///
/// Listens for `SIGTERM`, `SIGINT`, `SIGQUIT` and `SIGHUP`.
pub struct OsSignals {
    signals: Signals,
}

impl OsSignals {
    /// Installs the signal handlers.
    ///
    /// # Errors
    ///
    /// Returns [`ShutdownError::Install`] when registration fails.
    pub fn install() -> Result<Self, ShutdownError> {
        let signals = Signals::new([SIGTERM, SIGINT, SIGQUIT, SIGHUP])
            .map_err(|source| ShutdownError::Install { source })?;
        Ok(Self { signals })
    }
}

impl SignalSource for OsSignals {
    fn wait(&mut self) -> Option<i32> {
        self.signals.forever().next()
    }
}

/// Spawns a thread that fires `shutdown` once `source` delivers a signal.
pub fn fire_on_signal<S: SignalSource>(
    mut source: S,
    shutdown: ShutdownSignal,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        if let Some(signal) = source.wait() {
            info!(target: SHUTDOWN_TARGET, signal, "termination signal received");
            shutdown.fire();
        }
    })
}

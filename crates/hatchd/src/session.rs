//! The single console session.
//!
//! A console owns exactly one [`Session`] for its whole lifetime. The session
//! is idle until a connection is admitted, active while that connection is
//! served, and idle again once it closes. Every transition and every write
//! happens under one mutex, so the busy check and the attach are atomic and
//! lines written by concurrent handlers never interleave.

use std::io::{self, Write};
use std::net::{Shutdown, SocketAddr, TcpStream};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, warn};

use crate::output::OutputSink;
use crate::shutdown::ShutdownSignal;

const SESSION_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::session");

/// Handshake line written to an admitted client.
pub(crate) const ADMITTED_LINE: &[u8] = b"ok\n";

/// Handshake line written to a rejected client.
pub(crate) const BUSY_LINE: &[u8] = b"busy\n";

/// Access level attached to a session.
///
/// Levels are recorded but not enforced by the console. A negative level
/// marks a session for revocation through
/// [`Session::revoke_if_unauthorised`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct PermissionLevel(i32);

impl PermissionLevel {
    /// No access; the level every session starts with.
    pub const NONE: Self = Self(0);
    /// Read-only access.
    pub const READ: Self = Self(1);
    /// Read-write access.
    pub const READ_WRITE: Self = Self(2);

    /// Wraps a raw level.
    #[must_use]
    pub const fn new(level: i32) -> Self {
        Self(level)
    }

    /// Raw level.
    #[must_use]
    pub const fn value(self) -> i32 {
        self.0
    }

    /// Returns true for levels that should close the session.
    #[must_use]
    pub const fn is_revoked(self) -> bool {
        self.0 < 0
    }
}

#[derive(Debug, Default)]
struct SessionState {
    stream: Option<TcpStream>,
    peer: Option<SocketAddr>,
    permission: PermissionLevel,
    generation: u64,
}

impl SessionState {
    fn detach(&mut self) -> bool {
        let Some(stream) = self.stream.take() else {
            return false;
        };
        if let Err(error) = stream.shutdown(Shutdown::Both)
            && error.kind() != io::ErrorKind::NotConnected
        {
            debug!(target: SESSION_TARGET, %error, "socket shutdown failed");
        }
        info!(
            target: SESSION_TARGET,
            peer = ?self.peer,
            generation = self.generation,
            "session closed"
        );
        self.peer = None;
        self.permission = PermissionLevel::NONE;
        true
    }
}

/// Result of offering a connection to the session.
#[derive(Debug)]
pub(crate) enum Admission {
    /// The connection is now the active session and has been sent `ok`.
    Admitted {
        /// Identifies this admission when it is later released.
        generation: u64,
        /// Read half of the admitted connection.
        reader: TcpStream,
    },
    /// Another connection is active; the stream is handed back untouched.
    Busy(TcpStream),
    /// Shutdown has fired; the stream is handed back untouched.
    Closed(TcpStream),
}

/// Mutex-guarded session cell shared by the listener, the read loop and the
/// shutdown watcher.
#[derive(Debug, Default)]
pub struct Session {
    state: Mutex<SessionState>,
}

impl Session {
    /// Creates an idle session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns true while a client is attached.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.lock().stream.is_some()
    }

    /// Address of the attached client.
    #[must_use]
    pub fn peer_addr(&self) -> Option<SocketAddr> {
        self.lock().peer
    }

    /// Current permission level.
    #[must_use]
    pub fn permission(&self) -> PermissionLevel {
        self.lock().permission
    }

    /// Sets the permission level of the attached client.
    ///
    /// Has no effect while idle.
    pub fn set_permission(&self, level: PermissionLevel) {
        let mut state = self.lock();
        if state.stream.is_some() {
            state.permission = level;
        }
    }

    /// Attaches `stream` when idle and `shutdown` has not fired.
    ///
    /// The shutdown check, the busy check, the `ok` handshake and the attach
    /// all happen under the session lock. The shutdown watcher fires before
    /// it takes that lock, so a connection is either refused here or closed
    /// by the watcher.
    pub(crate) fn admit(
        &self,
        stream: TcpStream,
        shutdown: &ShutdownSignal,
    ) -> io::Result<Admission> {
        let mut state = self.lock();
        if shutdown.is_fired() {
            return Ok(Admission::Closed(stream));
        }
        if state.stream.is_some() {
            return Ok(Admission::Busy(stream));
        }

        let reader = stream.try_clone()?;
        (&stream).write_all(ADMITTED_LINE)?;
        state.peer = stream.peer_addr().ok();
        state.permission = PermissionLevel::NONE;
        state.generation += 1;
        state.stream = Some(stream);
        info!(
            target: SESSION_TARGET,
            peer = ?state.peer,
            generation = state.generation,
            "session opened"
        );
        Ok(Admission::Admitted {
            generation: state.generation,
            reader,
        })
    }

    /// Closes the session if it is still the admission numbered `generation`.
    ///
    /// Returns true when this call closed it.
    pub(crate) fn release(&self, generation: u64) -> bool {
        let mut state = self.lock();
        if state.generation != generation {
            return false;
        }
        state.detach()
    }

    /// Closes the attached connection, if any.
    ///
    /// Returns true when a connection was closed.
    pub fn close(&self) -> bool {
        self.lock().detach()
    }

    /// Writes `line` and a newline to the attached client, then closes it.
    ///
    /// Returns true when a connection was closed.
    pub fn close_with_farewell(&self, line: &str) -> bool {
        let mut state = self.lock();
        let Some(stream) = state.stream.as_ref() else {
            return false;
        };
        let mut farewell = String::with_capacity(line.len() + 1);
        farewell.push_str(line);
        farewell.push('\n');
        if let Err(error) = write_all(stream, farewell.as_bytes()) {
            warn!(target: SESSION_TARGET, %error, "failed to write farewell");
        }
        state.detach()
    }

    /// Closes the session when its permission level has been revoked.
    ///
    /// The console never calls this itself; embedding applications invoke it
    /// after adjusting the level with [`Session::set_permission`].
    pub fn revoke_if_unauthorised(&self) -> bool {
        let mut state = self.lock();
        if !state.permission.is_revoked() {
            return false;
        }
        warn!(
            target: SESSION_TARGET,
            level = state.permission.value(),
            "closing unauthorised session"
        );
        state.detach()
    }
}

impl OutputSink for Session {
    fn write_bytes(&self, bytes: &[u8]) {
        let state = self.lock();
        let Some(stream) = state.stream.as_ref() else {
            debug!(
                target: SESSION_TARGET,
                bytes = bytes.len(),
                "dropping output with no client attached"
            );
            return;
        };
        if let Err(error) = write_all(stream, bytes) {
            warn!(target: SESSION_TARGET, %error, "failed to write to client");
        }
    }
}

fn write_all(mut stream: &TcpStream, bytes: &[u8]) -> io::Result<()> {
    stream.write_all(bytes)?;
    stream.flush()
}

//! Loopback TCP listener for the console.
//!
//! The listener binds the configured endpoint, accepts connections on a
//! background thread and hands each one to a [`ConnectionHandler`]. The
//! accept loop polls a [`ShutdownSignal`] between accepts and exits once it
//! fires.
//!
//! [`ShutdownSignal`]: crate::ShutdownSignal

mod errors;
mod handler;
mod listener;
#[cfg(test)]
mod test_utils;

pub use self::errors::ListenerError;
#[cfg(test)]
pub(crate) use self::handler::MAX_LINE_BYTES;
pub(crate) use self::handler::{ConnectionHandler, read_line_bounded};
pub(crate) use self::listener::{ConsoleListener, ListenerHandle};
#[cfg(test)]
pub(crate) use self::test_utils::CountingHandler;

const LISTENER_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::transport");

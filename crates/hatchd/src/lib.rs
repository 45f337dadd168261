//! Embeddable remote command console.
//!
//! A host process declares a tree of named groups and leaf commands, binds a
//! handler to every leaf, and serves the tree over a single loopback TCP
//! connection. An operator attaches with the `hatch` client and types
//! whitespace-separated commands such as `config show`.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use hatch_config::ConsoleEndpoint;
//! use hatchd::{CommandNode, Console, HandlerSet, Session, ShutdownSignal, TreeShape};
//!
//! # fn main() -> Result<(), hatchd::ConsoleError> {
//! let shape = TreeShape::new()
//!     .node(CommandNode::new("Status").describe("report liveness"))
//!     .node(CommandNode::new("Echo").describe("repeat the arguments"));
//! let handlers = HandlerSet::new()
//!     .nullary("Status", |out| out.write_line("ok"))
//!     .with_args("Echo", |out, args| out.write_line(&args.join(" ")));
//!
//! let console = Console::launch(
//!     &ConsoleEndpoint::new("127.0.0.1", 9779),
//!     &shape,
//!     handlers,
//!     Arc::new(Session::new()),
//!     ShutdownSignal::new(),
//! )?;
//! console.join()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Protocol
//!
//! The server's first write is `ok\n` when the connection becomes the
//! session, or `busy\n` followed by a close when another client is attached.
//! Each processed line is followed by the prompt `➜ `, except `exit`, which
//! closes the session. A bare `help` lists every command. When the
//! [`ShutdownSignal`] fires, an attached client receives
//! `I'm closed,see you next time.` before the connection closes.
//!
//! Only one client is served at a time, and only loopback addresses can be
//! bound.

mod console;
pub mod dispatch;
mod output;
mod session;
pub mod shutdown;
pub mod telemetry;
mod transport;
pub mod tree;

pub use console::{Console, ConsoleError, FAREWELL_LINE};
pub use dispatch::{
    Dispatcher, Handler, HandlerSet, LineOutcome, PROMPT, RouteOutcome, UNSUPPORTED_MESSAGE,
    handle_line, tokenize,
};
pub use output::{BufferSink, JsonOutput, OutputSink};
pub use session::{PermissionLevel, Session};
pub use shutdown::{OsSignals, ShutdownError, ShutdownSignal, SignalSource, fire_on_signal};
pub use telemetry::{TelemetryError, TelemetryHandle};
pub use transport::ListenerError;
pub use tree::{CommandNode, TreeError, TreeShape, routable_name};

#[cfg(test)]
mod tests;

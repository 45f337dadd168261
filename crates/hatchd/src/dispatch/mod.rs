//! Command dispatch for console sessions.
//!
//! A [`Dispatcher`] is built once from a declared [`TreeShape`] and a
//! [`HandlerSet`]. Building validates the whole tree, so a console that starts
//! can reach every leaf it advertises.
//!
//! ## Routing
//!
//! Each input line is split on whitespace. Starting at the root, one token is
//! consumed per level and matched against the children of the current node
//! after normalising it to `Firstupper` form. Routing stops at a leaf or when
//! the tokens run out, and the handler bound to the concatenated path of that
//! node is invoked with whatever tokens remain:
//!
//! ```text
//! config show extra  ->  ConfigShow(["extra"])
//! ```
//!
//! When a deeper match fails, the enclosing group's handler (if bound) runs
//! with that level's full token slice instead.
//!
//! ## Reserved tokens
//!
//! `exit` as the first token ends the session and a bare `help` prints the
//! tree; neither reaches the router.
//!
//! [`TreeShape`]: crate::tree::TreeShape

mod handler;
mod line;
mod router;
mod validate;

pub use self::handler::{Handler, HandlerSet, NullaryFn, WithArgsFn};
pub use self::line::{LineOutcome, PROMPT, UNSUPPORTED_MESSAGE, handle_line, tokenize};
pub use self::router::{Dispatcher, RouteOutcome};

#[cfg(test)]
mod tests;

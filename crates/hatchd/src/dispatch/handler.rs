//! Handler bindings for command paths.

use std::fmt;

use crate::output::OutputSink;

/// Handler that ignores the remaining tokens.
pub type NullaryFn = dyn Fn(&dyn OutputSink) + Send + Sync;

/// Handler that receives the remaining tokens of the command line.
pub type WithArgsFn = dyn Fn(&dyn OutputSink, &[String]) + Send + Sync;

/// A callable bound to a command path.
///
/// The two variants are the only permitted signatures: no arguments, or the
/// ordered sequence of tokens left over once routing stopped.
pub enum Handler {
    /// Invoked without arguments.
    Nullary(Box<NullaryFn>),
    /// Invoked with the remaining tokens.
    WithArgs(Box<WithArgsFn>),
}

impl Handler {
    /// Number of declared arguments (0 or 1).
    #[must_use]
    pub const fn arity(&self) -> usize {
        match self {
            Self::Nullary(_) => 0,
            Self::WithArgs(_) => 1,
        }
    }

    pub(crate) fn invoke(&self, out: &dyn OutputSink, args: &[String]) {
        match self {
            Self::Nullary(handler) => handler(out),
            Self::WithArgs(handler) => handler(out, args),
        }
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nullary(_) => formatter.write_str("Handler::Nullary"),
            Self::WithArgs(_) => formatter.write_str("Handler::WithArgs"),
        }
    }
}

/// Handlers keyed by the concatenated PascalCase path they serve.
///
/// A path such as `config show` binds to the name `ConfigShow`. Names are
/// case-sensitive.
#[derive(Debug, Default)]
pub struct HandlerSet {
    bindings: Vec<(String, Handler)>,
}

impl HandlerSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds a handler that takes no arguments.
    #[must_use]
    pub fn nullary<F>(self, name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&dyn OutputSink) + Send + Sync + 'static,
    {
        self.bind(name, Handler::Nullary(Box::new(handler)))
    }

    /// Binds a handler that receives the remaining tokens.
    #[must_use]
    pub fn with_args<F>(self, name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&dyn OutputSink, &[String]) + Send + Sync + 'static,
    {
        self.bind(name, Handler::WithArgs(Box::new(handler)))
    }

    /// Binds an already boxed handler.
    #[must_use]
    pub fn bind(mut self, name: impl Into<String>, handler: Handler) -> Self {
        self.bindings.push((name.into(), handler));
        self
    }

    pub(crate) fn into_bindings(self) -> Vec<(String, Handler)> {
        self.bindings
    }
}

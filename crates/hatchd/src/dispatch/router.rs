//! Token routing over a validated command tree.

use tracing::debug;

use crate::output::OutputSink;
use crate::tree::{TreeError, TreeShape, routable_name};

use super::handler::HandlerSet;
use super::validate::{CommandTree, NodeId, ROOT, build_tree};

/// Tracing target for dispatch operations.
pub(crate) const DISPATCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::dispatch");

/// Whether a handler ran for a token sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteOutcome {
    /// A handler was invoked.
    Executed,
    /// No handler matched.
    NotExecuted,
}

/// Routes tokenised command lines to the handlers bound in a command tree.
///
/// A dispatcher can only be obtained through [`Dispatcher::build`], so every
/// leaf it serves is guaranteed to have a handler.
#[derive(Debug)]
pub struct Dispatcher {
    tree: CommandTree,
}

impl Dispatcher {
    /// Validates `shape` against `handlers` and builds the router.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError`] describing every problem found when the tree is
    /// empty, a name is malformed or ambiguous, a leaf lacks a handler, or a
    /// handler is duplicated or unbound.
    pub fn build(shape: &TreeShape, handlers: HandlerSet) -> Result<Self, TreeError> {
        let tree = build_tree(shape, handlers)?;
        debug!(
            target: DISPATCH_TARGET,
            commands = tree.command_count(),
            "command tree registered"
        );
        Ok(Self { tree })
    }

    /// Routes `tokens` from the root and invokes at most one handler.
    ///
    /// Group names are matched case-insensitively. When a deeper match fails,
    /// the handler of the enclosing group (if any) receives that level's
    /// tokens instead.
    pub fn dispatch(&self, tokens: &[String], out: &dyn OutputSink) -> RouteOutcome {
        if tokens.is_empty() {
            return RouteOutcome::NotExecuted;
        }
        let outcome = self.route(ROOT, tokens, out);
        debug!(target: DISPATCH_TARGET, ?outcome, tokens = tokens.len(), "routed command");
        outcome
    }

    fn route(&self, id: NodeId, tokens: &[String], out: &dyn OutputSink) -> RouteOutcome {
        let Some(node) = self.tree.node(id) else {
            return RouteOutcome::NotExecuted;
        };

        let Some((first, rest)) = tokens.split_first().filter(|_| !node.children.is_empty())
        else {
            return self.invoke(id, tokens, out);
        };

        let Some(&child) = node.index.get(&routable_name(first)) else {
            return RouteOutcome::NotExecuted;
        };

        match self.route(child, rest, out) {
            RouteOutcome::Executed => RouteOutcome::Executed,
            RouteOutcome::NotExecuted => self.invoke(id, tokens, out),
        }
    }

    fn invoke(&self, id: NodeId, args: &[String], out: &dyn OutputSink) -> RouteOutcome {
        let Some((node, handler)) = self
            .tree
            .node(id)
            .and_then(|node| node.handler.as_ref().map(|handler| (node, handler)))
        else {
            return RouteOutcome::NotExecuted;
        };
        debug!(
            target: DISPATCH_TARGET,
            handler = %node.path,
            arity = handler.arity(),
            "invoking handler"
        );
        handler.invoke(out, args);
        RouteOutcome::Executed
    }

    /// Writes one line per command, in declaration order, depth first.
    ///
    /// Each line is the lower-case path followed by a space, a tab and the
    /// command's description.
    pub fn write_help(&self, out: &dyn OutputSink) {
        let mut pending: Vec<NodeId> = self
            .tree
            .node(ROOT)
            .map(|root| root.children.iter().rev().copied().collect())
            .unwrap_or_default();

        while let Some(id) = pending.pop() {
            let Some(node) = self.tree.node(id) else {
                continue;
            };
            let description = node.description.as_deref().unwrap_or_default();
            out.write_line(&format!("{} \t{description}", node.help_path));
            pending.extend(node.children.iter().rev().copied());
        }
    }
}

//! Declarative description of a command tree.
//!
//! A tree is declared once by the embedding application, either with the
//! builder methods on [`TreeShape`] and [`CommandNode`] or by deserialising
//! any serde format shaped like:
//!
//! ```json
//! {
//!   "Status": null,
//!   "Echo": "repeat the arguments back",
//!   "Config": { "Show": null, "Filter": {} }
//! }
//! ```
//!
//! `null` or an empty map declares a leaf, a string declares a leaf with a
//! description, and a non-empty map declares a group. Declaration order is
//! preserved and drives the help listing.
//!
//! The shape is only a description. [`Dispatcher::build`] validates it
//! against the registered handlers before anything is served.
//!
//! [`Dispatcher::build`]: crate::Dispatcher::build

mod de;
mod errors;

pub use errors::TreeError;

/// One declared node: a leaf command or a group of further nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandNode {
    name: String,
    description: Option<String>,
    children: Vec<CommandNode>,
}

impl CommandNode {
    /// Declares a node with no children yet.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            children: Vec::new(),
        }
    }

    /// Attaches a description shown by `help`.
    #[must_use]
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Appends a child node, turning this node into a group.
    #[must_use]
    pub fn child(mut self, child: Self) -> Self {
        self.children.push(child);
        self
    }

    /// Appends a child leaf by name.
    #[must_use]
    pub fn leaf(self, name: impl Into<String>) -> Self {
        self.child(Self::new(name))
    }

    /// Declared name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Optional help description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Child nodes in declaration order.
    #[must_use]
    pub fn children(&self) -> &[Self] {
        &self.children
    }

    /// Returns true when the node has no children.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// The top level of a declared tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeShape {
    nodes: Vec<CommandNode>,
}

impl TreeShape {
    /// Creates an empty shape.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a top-level node.
    #[must_use]
    pub fn node(mut self, node: CommandNode) -> Self {
        self.nodes.push(node);
        self
    }

    /// Appends a top-level leaf by name.
    #[must_use]
    pub fn leaf(self, name: impl Into<String>) -> Self {
        self.node(CommandNode::new(name))
    }

    /// Top-level nodes in declaration order.
    #[must_use]
    pub fn nodes(&self) -> &[CommandNode] {
        &self.nodes
    }
}

/// Normalises a token the way the router matches it: first character upper
/// case, the rest lower case.
#[must_use]
pub fn routable_name(token: &str) -> String {
    let mut chars = token.chars();
    let Some(first) = chars.next() else {
        return String::new();
    };
    let mut name: String = first.to_uppercase().collect();
    name.extend(chars.flat_map(char::to_lowercase));
    name
}

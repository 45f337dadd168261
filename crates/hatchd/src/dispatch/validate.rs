//! Registration-time validation and arena construction.
//!
//! The declared [`TreeShape`] is walked once. Each node is checked, copied
//! into an index-addressed arena, and every registered handler is attached to
//! the node whose concatenated path matches its name. All problems are
//! collected before failing so the embedding application sees the whole list
//! at once.

use std::collections::{HashMap, HashSet};

use crate::tree::{CommandNode, TreeError, TreeShape, routable_name};

use super::handler::{Handler, HandlerSet};

pub(crate) type NodeId = usize;

/// Arena slot of the implicit root.
pub(crate) const ROOT: NodeId = 0;

/// Top-level names swallowed by the console before routing.
const RESERVED_TOP_LEVEL: &[&str] = &["Exit"];

#[derive(Debug)]
pub(crate) struct TreeNode {
    /// Concatenated PascalCase path; the handler name.
    pub(crate) path: String,
    /// Lower-case, space-separated path as typed by users.
    pub(crate) help_path: String,
    pub(crate) description: Option<String>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) index: HashMap<String, NodeId>,
    pub(crate) handler: Option<Handler>,
}

impl TreeNode {
    fn root() -> Self {
        Self {
            path: String::new(),
            help_path: String::new(),
            description: None,
            children: Vec::new(),
            index: HashMap::new(),
            handler: None,
        }
    }
}

/// Validated, immutable command tree.
#[derive(Debug)]
pub(crate) struct CommandTree {
    nodes: Vec<TreeNode>,
}

impl CommandTree {
    pub(crate) fn node(&self, id: NodeId) -> Option<&TreeNode> {
        self.nodes.get(id)
    }

    /// Number of declared commands, excluding the root.
    pub(crate) fn command_count(&self) -> usize {
        self.nodes.len().saturating_sub(1)
    }
}

/// Validates `shape` against `handlers` and builds the routing arena.
pub(crate) fn build_tree(shape: &TreeShape, handlers: HandlerSet) -> Result<CommandTree, TreeError> {
    if shape.nodes().is_empty() {
        return Err(TreeError::EmptyTree);
    }

    let mut builder = TreeBuilder::new();
    builder.declare_children(ROOT, shape.nodes());
    builder.bind_handlers(handlers);
    builder.check_leaves();
    builder.finish()
}

struct TreeBuilder {
    nodes: Vec<TreeNode>,
    paths: HashMap<String, NodeId>,
    problems: Vec<TreeError>,
}

impl TreeBuilder {
    fn new() -> Self {
        Self {
            nodes: vec![TreeNode::root()],
            paths: HashMap::new(),
            problems: Vec::new(),
        }
    }

    fn declare_children(&mut self, parent: NodeId, declared: &[CommandNode]) {
        for node in declared {
            if let Some(id) = self.declare(parent, node) {
                self.declare_children(id, node.children());
            }
        }
    }

    fn declare(&mut self, parent: NodeId, node: &CommandNode) -> Option<NodeId> {
        let (parent_path, parent_help) = self
            .nodes
            .get(parent)
            .map(|parent| (parent.path.clone(), parent.help_path.clone()))?;
        let name = node.name();

        if name.is_empty() || name.chars().any(char::is_whitespace) {
            self.problems.push(TreeError::InvalidName {
                parent: display_parent(&parent_path),
                name: name.to_owned(),
            });
            return None;
        }

        let path = format!("{parent_path}{name}");
        let routable = routable_name(name);
        if routable != name {
            self.problems.push(TreeError::UnroutableName {
                path,
                suggestion: format!("{parent_path}{routable}"),
            });
            return None;
        }

        if parent == ROOT && RESERVED_TOP_LEVEL.contains(&name) {
            self.problems.push(TreeError::ReservedName {
                name: name.to_owned(),
            });
            return None;
        }

        if self
            .nodes
            .get(parent)
            .is_some_and(|parent| parent.index.contains_key(name))
        {
            self.problems.push(TreeError::DuplicateNode {
                parent: display_parent(&parent_path),
                name: name.to_owned(),
            });
            return None;
        }

        if self.paths.contains_key(&path) {
            self.problems.push(TreeError::AmbiguousPath { path });
            return None;
        }

        let help_path = if parent_help.is_empty() {
            name.to_lowercase()
        } else {
            format!("{parent_help} {}", name.to_lowercase())
        };
        let id = self.nodes.len();
        self.nodes.push(TreeNode {
            path: path.clone(),
            help_path,
            description: node.description().map(str::to_owned),
            children: Vec::new(),
            index: HashMap::new(),
            handler: None,
        });
        self.paths.insert(path, id);
        if let Some(parent) = self.nodes.get_mut(parent) {
            parent.children.push(id);
            parent.index.insert(name.to_owned(), id);
        }
        Some(id)
    }

    fn bind_handlers(&mut self, handlers: HandlerSet) {
        let mut seen = HashSet::new();
        for (name, handler) in handlers.into_bindings() {
            if !seen.insert(name.clone()) {
                self.problems.push(TreeError::DuplicateHandler { name });
                continue;
            }
            match self
                .paths
                .get(&name)
                .and_then(|id| self.nodes.get_mut(*id))
            {
                Some(node) => node.handler = Some(handler),
                None => self.problems.push(TreeError::UnboundHandler { name }),
            }
        }
    }

    fn check_leaves(&mut self) {
        let missing = self
            .nodes
            .iter()
            .skip(1)
            .filter(|node| node.children.is_empty() && node.handler.is_none())
            .map(|node| TreeError::MissingHandler {
                path: node.path.clone(),
            });
        self.problems.extend(missing);
    }

    fn finish(self) -> Result<CommandTree, TreeError> {
        match TreeError::from_problems(self.problems) {
            Some(error) => Err(error),
            None => Ok(CommandTree { nodes: self.nodes }),
        }
    }
}

fn display_parent(path: &str) -> String {
    if path.is_empty() {
        "<root>".to_owned()
    } else {
        path.to_owned()
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn noop() -> HandlerSet {
        HandlerSet::new()
    }

    fn problems(shape: &TreeShape, handlers: HandlerSet) -> Vec<TreeError> {
        let error = build_tree(shape, handlers).expect_err("tree should be rejected");
        error.problems().cloned().collect()
    }

    #[test]
    fn empty_shape_is_rejected() {
        let error = build_tree(&TreeShape::new(), noop()).expect_err("empty tree");
        assert_eq!(error, TreeError::EmptyTree);
    }

    #[test]
    fn leaf_without_handler_names_full_path() {
        let shape = TreeShape::new().node(CommandNode::new("Config").leaf("Show"));
        let error = build_tree(&shape, noop()).expect_err("missing handler");
        assert_eq!(
            error,
            TreeError::MissingHandler {
                path: "ConfigShow".to_owned()
            }
        );
        assert_eq!(error.to_string(), "ConfigShow handler not implemented");
    }

    #[test]
    fn group_handlers_are_optional() {
        let shape = TreeShape::new().node(CommandNode::new("Config").leaf("Show"));
        let handlers = HandlerSet::new().nullary("ConfigShow", |_| {});
        let tree = build_tree(&shape, handlers).expect("valid tree");
        assert_eq!(tree.command_count(), 2);
    }

    #[rstest]
    #[case::camel_case("getUser", "Getuser")]
    #[case::lower_case("status", "Status")]
    fn unroutable_names_suggest_routable_spelling(#[case] name: &str, #[case] suggestion: &str) {
        let shape = TreeShape::new().leaf(name);
        let handlers = HandlerSet::new().nullary(suggestion, |_| {});
        let found = problems(&shape, handlers);
        assert_eq!(
            found.first(),
            Some(&TreeError::UnroutableName {
                path: name.to_owned(),
                suggestion: suggestion.to_owned(),
            })
        );
    }

    #[rstest]
    #[case::empty("")]
    #[case::spaced("Two words")]
    fn rejects_invalid_names(#[case] name: &str) {
        let shape = TreeShape::new().leaf(name);
        let found = problems(&shape, noop());
        assert_eq!(
            found,
            [TreeError::InvalidName {
                parent: "<root>".to_owned(),
                name: name.to_owned(),
            }]
        );
    }

    #[test]
    fn rejects_reserved_exit_at_top_level_only() {
        let shape = TreeShape::new()
            .leaf("Exit")
            .node(CommandNode::new("Session").leaf("Exit"));
        let handlers = HandlerSet::new().nullary("SessionExit", |_| {});
        let found = problems(&shape, handlers);
        assert_eq!(
            found,
            [TreeError::ReservedName {
                name: "Exit".to_owned()
            }]
        );
    }

    #[test]
    fn rejects_duplicate_siblings() {
        let shape = TreeShape::new().leaf("Status").leaf("Status");
        let handlers = HandlerSet::new().nullary("Status", |_| {});
        let found = problems(&shape, handlers);
        assert_eq!(
            found,
            [TreeError::DuplicateNode {
                parent: "<root>".to_owned(),
                name: "Status".to_owned(),
            }]
        );
    }

    #[test]
    fn rejects_paths_that_concatenate_identically() {
        let shape = TreeShape::new()
            .node(CommandNode::new("1").leaf("2"))
            .leaf("12");
        let handlers = HandlerSet::new().nullary("12", |_| {});
        let found = problems(&shape, handlers);
        assert_eq!(
            found,
            [TreeError::AmbiguousPath {
                path: "12".to_owned()
            }]
        );
    }

    #[test]
    fn rejects_duplicate_and_unbound_handlers() {
        let shape = TreeShape::new().leaf("Status");
        let handlers = HandlerSet::new()
            .nullary("Status", |_| {})
            .with_args("Status", |_, _| {})
            .nullary("Stats", |_| {});
        let found = problems(&shape, handlers);
        assert_eq!(
            found,
            [
                TreeError::DuplicateHandler {
                    name: "Status".to_owned()
                },
                TreeError::UnboundHandler {
                    name: "Stats".to_owned()
                },
            ]
        );
    }

    #[test]
    fn handler_names_are_case_sensitive() {
        let shape = TreeShape::new().leaf("Status");
        let handlers = HandlerSet::new().nullary("STATUS", |_| {});
        let found = problems(&shape, handlers);
        assert_eq!(
            found,
            [
                TreeError::UnboundHandler {
                    name: "STATUS".to_owned()
                },
                TreeError::MissingHandler {
                    path: "Status".to_owned()
                },
            ]
        );
    }
}

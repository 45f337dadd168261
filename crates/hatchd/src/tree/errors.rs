//! Registration-time errors for command trees.

use std::fmt;

use thiserror::Error;

/// Problems found while validating a declared tree against its handlers.
///
/// Every variant names the offending path using the concatenated PascalCase
/// form that handlers are bound by.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TreeError {
    /// The tree declares no commands at all.
    #[error("command tree is empty")]
    EmptyTree,

    /// A node name is empty or contains whitespace.
    #[error("invalid command name {name:?} under '{parent}'")]
    InvalidName {
        /// Path of the enclosing group, or `<root>`.
        parent: String,
        /// The rejected name.
        name: String,
    },

    /// A node name would never match a normalised input token.
    #[error("command '{path}' is not routable, rename it to '{suggestion}'")]
    UnroutableName {
        /// Path of the offending node.
        path: String,
        /// The routable spelling of the name.
        suggestion: String,
    },

    /// A reserved console keyword is declared as a top-level command.
    #[error("'{name}' is reserved by the console and cannot be declared at the top level")]
    ReservedName {
        /// The reserved name.
        name: String,
    },

    /// Two siblings share a name.
    #[error("duplicate command '{name}' under '{parent}'")]
    DuplicateNode {
        /// Path of the enclosing group, or `<root>`.
        parent: String,
        /// The repeated name.
        name: String,
    },

    /// Two different nodes concatenate to the same handler path.
    #[error("ambiguous command path '{path}' is declared more than once")]
    AmbiguousPath {
        /// The shared handler path.
        path: String,
    },

    /// A leaf has no handler bound to its path.
    #[error("{path} handler not implemented")]
    MissingHandler {
        /// Handler path of the unbound leaf.
        path: String,
    },

    /// A handler name was registered twice.
    #[error("handler '{name}' is registered more than once")]
    DuplicateHandler {
        /// The repeated handler name.
        name: String,
    },

    /// A handler name matches no declared node.
    #[error("handler '{name}' does not match any command in the tree")]
    UnboundHandler {
        /// The handler name with no matching command.
        name: String,
    },

    /// Several problems, in discovery order.
    #[error("invalid command tree:\n{}", Listing(.0))]
    Aggregate(Vec<TreeError>),
}

impl TreeError {
    /// Collapses a list of problems into a single error.
    ///
    /// Returns `None` when the list is empty.
    #[must_use]
    pub fn from_problems(mut problems: Vec<Self>) -> Option<Self> {
        match problems.len() {
            0 => None,
            1 => problems.pop(),
            _ => Some(Self::Aggregate(problems)),
        }
    }

    /// Iterates over the individual problems.
    pub fn problems(&self) -> impl Iterator<Item = &Self> {
        let problems: &[Self] = match self {
            Self::Aggregate(problems) => problems,
            single => std::slice::from_ref(single),
        };
        problems.iter()
    }
}

struct Listing<'a>(&'a [TreeError]);

impl fmt::Display for Listing<'_> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, problem) in self.0.iter().enumerate() {
            if index > 0 {
                formatter.write_str("\n")?;
            }
            write!(formatter, "  - {problem}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_problem_is_not_wrapped() {
        let error = TreeError::from_problems(vec![TreeError::EmptyTree]);
        assert_eq!(error, Some(TreeError::EmptyTree));
    }

    #[test]
    fn no_problems_means_no_error() {
        assert_eq!(TreeError::from_problems(Vec::new()), None);
    }

    #[test]
    fn aggregate_lists_every_problem() {
        let error = TreeError::from_problems(vec![
            TreeError::MissingHandler {
                path: "ConfigShow".to_owned(),
            },
            TreeError::UnboundHandler {
                name: "Stats".to_owned(),
            },
        ])
        .expect("two problems");

        assert_eq!(error.problems().count(), 2);
        assert_eq!(
            error.to_string(),
            "invalid command tree:\n  - ConfigShow handler not implemented\n  - handler 'Stats' does not match any command in the tree"
        );
    }
}

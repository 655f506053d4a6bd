// SPDX-License-Identifier: AGPL-3.0-or-later
//! Error type, handler output and the text-format collaborator traits

use crate::ast::NestedNode;
use thiserror::Error;

/// Errors raised while converting between tree models or text formats
#[derive(Debug, Error)]
pub enum ConversionError {
    /// No handler is registered for a node type (strict mode only)
    #[error("no handler registered for node type \"{kind}\"")]
    UnregisteredNode { kind: String },

    /// No handler is registered for a mark type (strict mode only)
    #[error("no handler registered for mark type \"{kind}\"")]
    UnregisteredMark { kind: String },

    /// The conversion did not yield exactly one document root
    #[error("expected exactly one root node, conversion produced {count}")]
    MalformedRoot { count: usize },

    /// The input tree is nested deeper than the configured limit
    #[error("tree nesting exceeds the depth limit of {limit}")]
    DepthLimitExceeded { limit: usize },

    /// A handler refused to convert its node
    #[error("handler for \"{kind}\" failed: {message}")]
    Handler { kind: String, message: String },

    /// A node lacks an attribute its handler requires
    #[error("node \"{kind}\" is missing attribute \"{name}\"")]
    MissingAttribute { kind: String, name: String },

    #[error("Parse error: {message}")]
    ParseError { message: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ConversionError {
    pub fn handler(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Handler {
            kind: kind.into(),
            message: message.into(),
        }
    }

    pub fn missing_attribute(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self::MissingAttribute {
            kind: kind.into(),
            name: name.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ConversionError>;

/// What a handler produced for one input node
///
/// Most handlers emit a single node, some elide their input and a few need to
/// split it into several siblings.
#[derive(Debug, Clone, PartialEq)]
pub enum Output<N> {
    Nothing,
    One(N),
    Many(Vec<N>),
}

impl<N> Output<N> {
    pub fn into_vec(self) -> Vec<N> {
        match self {
            Output::Nothing => Vec::new(),
            Output::One(node) => vec![node],
            Output::Many(nodes) => nodes,
        }
    }
}

impl<N> From<N> for Output<N> {
    fn from(node: N) -> Self {
        Output::One(node)
    }
}

impl<N> From<Vec<N>> for Output<N> {
    fn from(nodes: Vec<N>) -> Self {
        Output::Many(nodes)
    }
}

impl<N> From<Option<N>> for Output<N> {
    fn from(node: Option<N>) -> Self {
        node.map_or(Output::Nothing, Output::One)
    }
}

/// Turns source text into a nested-annotation tree
pub trait Parser {
    /// Name of the text format, e.g. "markdown"
    fn format(&self) -> &str;

    fn parse(&self, input: &str) -> Result<NestedNode>;
}

/// Turns a nested-annotation tree back into source text
pub trait Renderer {
    fn format(&self) -> &str;

    fn render(&self, root: &NestedNode) -> Result<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_flattens() {
        assert!(Output::<u8>::Nothing.into_vec().is_empty());
        assert_eq!(Output::<u8>::from(1).into_vec(), vec![1]);
        assert_eq!(Output::<u8>::from(vec![1, 2]).into_vec(), vec![1, 2]);
        assert_eq!(Output::<u8>::from(None).into_vec().len(), 0);
        assert_eq!(Output::<u8>::from(Some(3)).into_vec().len(), 1);
    }

    #[test]
    fn test_error_messages() {
        let err = ConversionError::MalformedRoot { count: 2 };
        assert_eq!(
            err.to_string(),
            "expected exactly one root node, conversion produced 2"
        );

        let err = ConversionError::handler("link", "missing href");
        assert_eq!(err.to_string(), "handler for \"link\" failed: missing href");
    }
}

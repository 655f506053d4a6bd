// SPDX-License-Identifier: AGPL-3.0-or-later
//! Nested-annotation tree → annotated-leaf tree
//!
//! Every node goes through the node registry. Wrapper kinds are expected to
//! convert their children with [`ToFlatContext::handle_all`] and push their
//! own mark down onto the resulting leaves, so the builder itself never knows
//! which kinds are marks.

use crate::ast::{FlatNode, NestedNode};
use crate::config::ConvertConfig;
use crate::depth::Depth;
use crate::registry::HandlerRegistry;
use crate::traits::{ConversionError, Output, Result};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Converts one nested node into zero or more annotated-leaf nodes
pub type ToFlatHandler = Arc<
    dyn for<'a> Fn(&'a NestedNode, Option<&'a NestedNode>, &ToFlatContext<'a>) -> Result<Output<FlatNode>>
        + Send
        + Sync,
>;

/// Everything one nested → annotated-leaf conversion needs
#[derive(Clone, Default)]
pub struct ToFlatOptions {
    pub node_handlers: HandlerRegistry<ToFlatHandler>,
    /// Used for every kind without a registered handler
    pub unknown_handler: Option<ToFlatHandler>,
    pub config: ConvertConfig,
}

impl ToFlatOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the handler for a node type
    pub fn node<F>(mut self, name: impl Into<String>, handler: F) -> Self
    where
        F: for<'a> Fn(&'a NestedNode, Option<&'a NestedNode>, &ToFlatContext<'a>) -> Result<Output<FlatNode>>
            + Send
            + Sync
            + 'static,
    {
        self.node_handlers.register(name, Arc::new(handler));
        self
    }

    /// Set the fallback for node types without a handler
    pub fn unknown<F>(mut self, handler: F) -> Self
    where
        F: for<'a> Fn(&'a NestedNode, Option<&'a NestedNode>, &ToFlatContext<'a>) -> Result<Output<FlatNode>>
            + Send
            + Sync
            + 'static,
    {
        self.unknown_handler = Some(Arc::new(handler));
        self
    }

    pub fn with_config(mut self, config: ConvertConfig) -> Self {
        self.config = config;
        self
    }
}

impl fmt::Debug for ToFlatOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToFlatOptions")
            .field("node_handlers", &self.node_handlers)
            .field("unknown_handler", &self.unknown_handler.is_some())
            .field("config", &self.config)
            .finish()
    }
}

/// State of one nested → annotated-leaf conversion
pub struct ToFlatContext<'a> {
    options: &'a ToFlatOptions,
    depth: Depth,
}

impl<'a> ToFlatContext<'a> {
    pub fn new(options: &'a ToFlatOptions) -> Self {
        Self {
            options,
            depth: Depth::default(),
        }
    }

    pub fn options(&self) -> &'a ToFlatOptions {
        self.options
    }

    pub fn config(&self) -> &'a ConvertConfig {
        &self.options.config
    }

    /// Convert the children of `parent` in order, flattening multi-node results
    pub fn handle_all(&self, parent: &'a NestedNode) -> Result<Vec<FlatNode>> {
        let mut values = Vec::with_capacity(parent.children.len());
        for child in &parent.children {
            values.extend(self.handle(child, Some(parent))?);
        }
        Ok(values)
    }

    pub fn handle(&self, node: &'a NestedNode, parent: Option<&'a NestedNode>) -> Result<Vec<FlatNode>> {
        let _guard = self.depth.enter(self.options.config.max_depth)?;

        let kind = node.kind.as_str();
        let handler = match self.options.node_handlers.get(kind) {
            Some(handler) => handler,
            None => match self.options.unknown_handler {
                Some(ref fallback) => {
                    trace!(node = kind, "using unknown-type handler");
                    fallback
                }
                None if self.options.config.strict => {
                    return Err(ConversionError::UnregisteredNode {
                        kind: kind.to_string(),
                    });
                }
                None => {
                    warn!(
                        node = kind,
                        "no handler for node type \"{}\", dropping it", kind
                    );
                    return Ok(Vec::new());
                }
            },
        };

        trace!(node = kind, depth = self.depth.get(), "converting node");
        Ok(handler(node, parent, self)?.into_vec())
    }
}

/// Convert a nested-annotation tree, returning every top-level result
pub fn to_flat_fragment(root: &NestedNode, options: &ToFlatOptions) -> Result<Vec<FlatNode>> {
    let context = ToFlatContext::new(options);
    let nodes = context.handle(root, None)?;
    debug!(root = %root.kind, produced = nodes.len(), "converted nested-annotation tree");
    Ok(nodes)
}

/// Convert a nested-annotation document, requiring exactly one resulting root
pub fn to_flat(root: &NestedNode, options: &ToFlatOptions) -> Result<FlatNode> {
    let nodes = to_flat_fragment(root, options)?;
    let [root]: [FlatNode; 1] = nodes
        .try_into()
        .map_err(|nodes: Vec<FlatNode>| ConversionError::MalformedRoot { count: nodes.len() })?;
    Ok(root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Mark;
    use crate::handlers::{flat_mark, flat_node, literal_to_text};
    use pretty_assertions::assert_eq;

    fn options() -> ToFlatOptions {
        ToFlatOptions::new()
            .node("root", flat_node("doc", None))
            .node("paragraph", flat_node("paragraph", None))
            .node("text", literal_to_text())
            .node("emphasis", flat_mark("em", None))
            .node("strong", flat_mark("strong", None))
    }

    fn lit(value: &str) -> NestedNode {
        NestedNode::literal("text", value)
    }

    #[test]
    fn test_marks_accumulate_outermost_first() {
        let input = NestedNode::parent(
            "paragraph",
            vec![NestedNode::parent(
                "strong",
                vec![NestedNode::parent("emphasis", vec![lit("x")])],
            )],
        );

        let out = to_flat(&input, &options()).unwrap();
        assert_eq!(
            out,
            FlatNode::new("paragraph").with_children(vec![FlatNode::text("x")
                .with_marks(vec![Mark::new("strong"), Mark::new("em")])])
        );
    }

    #[test]
    fn test_empty_document() {
        let out = to_flat(&NestedNode::parent("root", vec![]), &options()).unwrap();
        assert_eq!(out, FlatNode::new("doc"));
    }

    #[test]
    fn test_unregistered_node_is_dropped() {
        let input = NestedNode::parent(
            "root",
            vec![
                NestedNode::parent("table", vec![lit("gone")]),
                NestedNode::parent("paragraph", vec![lit("kept")]),
            ],
        );
        let out = to_flat(&input, &options()).unwrap();
        assert_eq!(out.children.len(), 1);
        assert_eq!(out.text_content(), "kept");
    }

    #[test]
    fn test_strict_mode_rejects_unregistered_node() {
        let opts = options().with_config(ConvertConfig::strict());
        let input = NestedNode::parent("root", vec![NestedNode::new("table")]);

        let err = to_flat(&input, &opts).unwrap_err();
        assert!(matches!(err, ConversionError::UnregisteredNode { ref kind } if kind == "table"));
    }

    #[test]
    fn test_unknown_handler_takes_over() {
        let opts = options().unknown(|node, _parent, _cx| {
            Ok(FlatNode::text(format!("[{}]", node.kind)).into())
        });
        let input = NestedNode::parent("paragraph", vec![NestedNode::new("footnoteReference")]);

        let out = to_flat(&input, &opts).unwrap();
        assert_eq!(out.text_content(), "[footnoteReference]");
    }

    #[test]
    fn test_fragment_keeps_every_result() {
        let opts = options().node("pair", |node, _parent, cx| {
            let children = cx.handle_all(node)?;
            Ok(vec![
                FlatNode::new("paragraph").with_children(children.clone()),
                FlatNode::new("paragraph").with_children(children),
            ]
            .into())
        });
        let input = NestedNode::parent("pair", vec![lit("a")]);

        assert_eq!(to_flat_fragment(&input, &opts).unwrap().len(), 2);
        let err = to_flat(&input, &opts).unwrap_err();
        assert!(matches!(err, ConversionError::MalformedRoot { count: 2 }));
    }

    #[test]
    fn test_depth_limit() {
        let mut node = lit("deep");
        for _ in 0..8 {
            node = NestedNode::parent("emphasis", vec![node]);
        }
        let opts = options().with_config(ConvertConfig {
            max_depth: 4,
            ..Default::default()
        });

        let err = to_flat_fragment(&node, &opts).unwrap_err();
        assert!(matches!(err, ConversionError::DepthLimitExceeded { limit: 4 }));
    }
}

// SPDX-License-Identifier: AGPL-3.0-or-later
//! Annotated-leaf tree → nested-annotation tree
//!
//! The builder walks the input depth-first. Block nodes go through the node
//! registry; the children of every node go through the mark partitioner, so
//! that runs of siblings sharing a leading mark end up under one wrapper built
//! by the mark registry.

use crate::ast::{FlatNode, Mark, NestedNode};
use crate::config::ConvertConfig;
use crate::depth::Depth;
use crate::handlers::text_to_literal;
use crate::partition::{partition_runs, MarkedLeaf};
use crate::registry::HandlerRegistry;
use crate::traits::{ConversionError, Output, Result};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Converts one annotated-leaf node into zero or more nested nodes
pub type ToNestedNodeHandler = Arc<
    dyn for<'a> Fn(&'a FlatNode, Option<&'a FlatNode>, &ToNestedContext<'a>) -> Result<Output<NestedNode>>
        + Send
        + Sync,
>;

/// Wraps already converted children in the nested form of one mark
///
/// Receives the mark, the container whose children are being converted, the
/// converted children and the context.
pub type ToNestedMarkHandler = Arc<
    dyn for<'a> Fn(&'a Mark, &'a FlatNode, Vec<NestedNode>, &ToNestedContext<'a>) -> Result<Output<NestedNode>>
        + Send
        + Sync,
>;

/// Extracts the canonical type name of a node or mark
pub type NameFn<T> = Arc<dyn Fn(&T) -> &str + Send + Sync>;

/// Everything one annotated-leaf → nested conversion needs
#[derive(Clone)]
pub struct ToNestedOptions {
    pub node_name: NameFn<FlatNode>,
    pub mark_name: NameFn<Mark>,
    pub text_handler: ToNestedNodeHandler,
    pub node_handlers: HandlerRegistry<ToNestedNodeHandler>,
    pub mark_handlers: HandlerRegistry<ToNestedMarkHandler>,
    pub config: ConvertConfig,
}

impl ToNestedOptions {
    pub fn new() -> Self {
        Self {
            node_name: Arc::new(node_kind),
            mark_name: Arc::new(mark_kind),
            text_handler: Arc::new(text_to_literal()),
            node_handlers: HandlerRegistry::new(),
            mark_handlers: HandlerRegistry::new(),
            config: ConvertConfig::default(),
        }
    }

    /// Register the handler for a node type
    pub fn node<F>(mut self, name: impl Into<String>, handler: F) -> Self
    where
        F: for<'a> Fn(&'a FlatNode, Option<&'a FlatNode>, &ToNestedContext<'a>) -> Result<Output<NestedNode>>
            + Send
            + Sync
            + 'static,
    {
        self.node_handlers.register(name, Arc::new(handler));
        self
    }

    /// Register the handler for a mark type
    pub fn mark<F>(mut self, name: impl Into<String>, handler: F) -> Self
    where
        F: for<'a> Fn(&'a Mark, &'a FlatNode, Vec<NestedNode>, &ToNestedContext<'a>) -> Result<Output<NestedNode>>
            + Send
            + Sync
            + 'static,
    {
        self.mark_handlers.register(name, Arc::new(handler));
        self
    }

    /// Replace the handler used for text runs without a registered handler
    pub fn text<F>(mut self, handler: F) -> Self
    where
        F: for<'a> Fn(&'a FlatNode, Option<&'a FlatNode>, &ToNestedContext<'a>) -> Result<Output<NestedNode>>
            + Send
            + Sync
            + 'static,
    {
        self.text_handler = Arc::new(handler);
        self
    }

    pub fn with_node_name<F>(mut self, name_of: F) -> Self
    where
        F: Fn(&FlatNode) -> &str + Send + Sync + 'static,
    {
        self.node_name = Arc::new(name_of);
        self
    }

    pub fn with_mark_name<F>(mut self, name_of: F) -> Self
    where
        F: Fn(&Mark) -> &str + Send + Sync + 'static,
    {
        self.mark_name = Arc::new(name_of);
        self
    }

    pub fn with_config(mut self, config: ConvertConfig) -> Self {
        self.config = config;
        self
    }
}

fn node_kind(node: &FlatNode) -> &str {
    &node.kind
}

fn mark_kind(mark: &Mark) -> &str {
    &mark.kind
}

impl Default for ToNestedOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ToNestedOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToNestedOptions")
            .field("node_handlers", &self.node_handlers)
            .field("mark_handlers", &self.mark_handlers)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// State of one annotated-leaf → nested conversion
///
/// Results are cached per input node: a handler may look at a subtree before
/// converting it and every node is still converted exactly once. Cache keys
/// are addresses of nodes borrowed from the input tree for `'a`, so they stay
/// valid and unique for the whole conversion.
pub struct ToNestedContext<'a> {
    options: &'a ToNestedOptions,
    handled: RefCell<HashMap<*const FlatNode, Vec<NestedNode>>>,
    handled_children: RefCell<HashMap<*const FlatNode, Vec<NestedNode>>>,
    depth: Depth,
}

impl<'a> ToNestedContext<'a> {
    pub fn new(options: &'a ToNestedOptions) -> Self {
        Self {
            options,
            handled: RefCell::new(HashMap::new()),
            handled_children: RefCell::new(HashMap::new()),
            depth: Depth::default(),
        }
    }

    pub fn options(&self) -> &'a ToNestedOptions {
        self.options
    }

    pub fn config(&self) -> &'a ConvertConfig {
        &self.options.config
    }

    pub fn node_name(&self, node: &'a FlatNode) -> &'a str {
        (self.options.node_name)(node)
    }

    pub fn mark_name(&self, mark: &'a Mark) -> &'a str {
        (self.options.mark_name)(mark)
    }

    /// Convert the children of `node`, nesting shared marks
    pub fn handle_all(&self, node: &'a FlatNode) -> Result<Vec<NestedNode>> {
        let key = node as *const FlatNode;
        if let Some(hit) = self.handled_children.borrow().get(&key) {
            return Ok(hit.clone());
        }

        let leaves: Vec<MarkedLeaf<'a>> = node.children.iter().map(MarkedLeaf::new).collect();
        let result = self.hydrate_marks(&leaves, node)?;

        self.handled_children.borrow_mut().insert(key, result.clone());
        Ok(result)
    }

    /// Convert a single node, ignoring its marks
    pub fn handle(&self, node: &'a FlatNode, parent: Option<&'a FlatNode>) -> Result<Vec<NestedNode>> {
        let key = node as *const FlatNode;
        if let Some(hit) = self.handled.borrow().get(&key) {
            return Ok(hit.clone());
        }

        let _guard = self.depth.enter(self.options.config.max_depth)?;
        let result = self.dispatch(node, parent)?;

        self.handled.borrow_mut().insert(key, result.clone());
        Ok(result)
    }

    fn dispatch(&self, node: &'a FlatNode, parent: Option<&'a FlatNode>) -> Result<Vec<NestedNode>> {
        let name = self.node_name(node);
        let config = &self.options.config;

        if let Some(handler) = self.options.node_handlers.get(name) {
            trace!(node = name, depth = self.depth.get(), "converting node");
            return Ok(handler(node, parent, self)?.into_vec());
        }

        if name == config.root_type {
            let children = self.handle_all(node)?;
            return Ok(vec![NestedNode::parent(config.root_kind.clone(), children)]);
        }

        if name == config.text_type {
            return Ok((self.options.text_handler)(node, parent, self)?.into_vec());
        }

        if config.strict {
            return Err(ConversionError::UnregisteredNode {
                kind: name.to_string(),
            });
        }
        warn!(
            node = name,
            "no handler for node type \"{}\", dropping it", name
        );
        Ok(Vec::new())
    }

    /// Build nested nodes for `leaves`, the children of `parent`
    ///
    /// Runs of leaves sharing their outermost remaining mark are converted
    /// with that mark peeled off and then handed to the mark's handler, so the
    /// first mark of a leaf becomes its outermost wrapper.
    pub fn hydrate_marks(&self, leaves: &[MarkedLeaf<'a>], parent: &'a FlatNode) -> Result<Vec<NestedNode>> {
        let mut out = Vec::new();
        for run in partition_runs(leaves, |leaf| leaf.marks) {
            out.extend(self.convert_run(run, parent)?);
        }
        Ok(out)
    }

    fn convert_run(&self, run: &[MarkedLeaf<'a>], parent: &'a FlatNode) -> Result<Vec<NestedNode>> {
        let Some(mark) = run.first().and_then(|leaf| leaf.marks.first()) else {
            let mut out = Vec::new();
            for leaf in run {
                out.extend(self.handle(leaf.node, Some(parent))?);
            }
            return Ok(out);
        };

        // Every peeled mark is one more wrapper level
        let _guard = self.depth.enter(self.options.config.max_depth)?;
        let peeled: Vec<MarkedLeaf<'a>> = run.iter().map(|leaf| leaf.peel()).collect();
        let children = self.hydrate_marks(&peeled, parent)?;

        let name = self.mark_name(mark);
        match self.options.mark_handlers.get(name) {
            Some(handler) => {
                trace!(mark = name, leaves = run.len(), "wrapping run");
                Ok(handler(mark, parent, children, self)?.into_vec())
            }
            None if self.options.config.strict => Err(ConversionError::UnregisteredMark {
                kind: name.to_string(),
            }),
            None => {
                warn!(
                    mark = name,
                    "no handler for mark type \"{}\", keeping its content unwrapped", name
                );
                Ok(children)
            }
        }
    }
}

/// Convert an annotated-leaf tree
///
/// Returns whatever the root's handler produced: usually one node, possibly
/// none or several.
pub fn to_nested(root: &FlatNode, options: &ToNestedOptions) -> Result<Vec<NestedNode>> {
    let context = ToNestedContext::new(options);
    let nodes = context.handle(root, None)?;
    debug!(root = %root.kind, produced = nodes.len(), "converted annotated-leaf tree");
    Ok(nodes)
}

/// Convert an annotated-leaf document, requiring exactly one resulting root
pub fn to_nested_document(root: &FlatNode, options: &ToNestedOptions) -> Result<NestedNode> {
    let nodes = to_nested(root, options)?;
    let [root]: [NestedNode; 1] = nodes
        .try_into()
        .map_err(|nodes: Vec<NestedNode>| ConversionError::MalformedRoot { count: nodes.len() })?;
    Ok(root)
}

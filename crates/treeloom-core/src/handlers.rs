// SPDX-License-Identifier: AGPL-3.0-or-later
//! Ready-made handlers for the common one-to-one mappings
//!
//! Most schema pairs map a node kind to exactly one node kind of the other
//! model and keep the children as they are. These constructors cover that
//! case from a target kind name and an optional attribute mapping.

use crate::ast::{Attrs, FlatNode, Mark, NestedNode};
use crate::to_flat::ToFlatContext;
use crate::to_nested::ToNestedContext;
use crate::traits::{Output, Result};

fn pin_to_nested<F>(f: F) -> F
where
    F: for<'a> Fn(&'a FlatNode, Option<&'a FlatNode>, &ToNestedContext<'a>) -> Result<Output<NestedNode>>,
{
    f
}

fn pin_mark<F>(f: F) -> F
where
    F: for<'a> Fn(&'a Mark, &'a FlatNode, Vec<NestedNode>, &ToNestedContext<'a>) -> Result<Output<NestedNode>>,
{
    f
}

fn pin_to_flat<F>(f: F) -> F
where
    F: for<'a> Fn(&'a NestedNode, Option<&'a NestedNode>, &ToFlatContext<'a>) -> Result<Output<FlatNode>>,
{
    f
}

/// Map an annotated-leaf node to a nested node of `kind` with converted children
pub fn nested_node(
    kind: impl Into<String>,
    attrs: Option<fn(&FlatNode) -> Attrs>,
) -> impl for<'a> Fn(&'a FlatNode, Option<&'a FlatNode>, &ToNestedContext<'a>) -> Result<Output<NestedNode>>
       + Send
       + Sync
       + 'static {
    let kind = kind.into();
    pin_to_nested(move |node, _parent, cx| {
        let children = cx.handle_all(node)?;
        let mut out = NestedNode::parent(kind.clone(), children);
        if let Some(attrs) = attrs {
            out.attrs = attrs(node);
        }
        Ok(out.into())
    })
}

/// Wrap the children of a mark run in a nested node of `kind`
pub fn nested_mark(
    kind: impl Into<String>,
    attrs: Option<fn(&Mark) -> Attrs>,
) -> impl for<'a> Fn(&'a Mark, &'a FlatNode, Vec<NestedNode>, &ToNestedContext<'a>) -> Result<Output<NestedNode>>
       + Send
       + Sync
       + 'static {
    let kind = kind.into();
    pin_mark(move |mark, _parent, children, _cx| {
        let mut out = NestedNode::parent(kind.clone(), children);
        if let Some(attrs) = attrs {
            out.attrs = attrs(mark);
        }
        Ok(out.into())
    })
}

/// Default text handler: a `text` literal carrying the run's text
pub fn text_to_literal(
) -> impl for<'a> Fn(&'a FlatNode, Option<&'a FlatNode>, &ToNestedContext<'a>) -> Result<Output<NestedNode>>
       + Send
       + Sync
       + 'static {
    pin_to_nested(|node, _parent, _cx| {
        let value = node.text.clone().unwrap_or_default();
        Ok(NestedNode::literal("text", value).into())
    })
}

/// Map a nested node to an annotated-leaf node of `kind` with converted children
pub fn flat_node(
    kind: impl Into<String>,
    attrs: Option<fn(&NestedNode) -> Attrs>,
) -> impl for<'a> Fn(&'a NestedNode, Option<&'a NestedNode>, &ToFlatContext<'a>) -> Result<Output<FlatNode>>
       + Send
       + Sync
       + 'static {
    let kind = kind.into();
    pin_to_flat(move |node, _parent, cx| {
        let children = cx.handle_all(node)?;
        let mut out = FlatNode::new(kind.clone()).with_children(children);
        if let Some(attrs) = attrs {
            out.attrs = attrs(node);
        }
        Ok(out.into())
    })
}

/// Turn a nested wrapper into a mark of `kind` on every leaf below it
pub fn flat_mark(
    kind: impl Into<String>,
    attrs: Option<fn(&NestedNode) -> Attrs>,
) -> impl for<'a> Fn(&'a NestedNode, Option<&'a NestedNode>, &ToFlatContext<'a>) -> Result<Output<FlatNode>>
       + Send
       + Sync
       + 'static {
    let kind = kind.into();
    pin_to_flat(move |node, _parent, cx| {
        let mut mark = Mark::new(kind.clone());
        if let Some(attrs) = attrs {
            mark.attrs = attrs(node);
        }
        let children = cx.handle_all(node)?;
        Ok(children
            .into_iter()
            .map(|child| child.annotate(&mark))
            .collect::<Vec<_>>()
            .into())
    })
}

/// Map a `text` literal to a text run; empty literals produce nothing
pub fn literal_to_text(
) -> impl for<'a> Fn(&'a NestedNode, Option<&'a NestedNode>, &ToFlatContext<'a>) -> Result<Output<FlatNode>>
       + Send
       + Sync
       + 'static {
    pin_to_flat(|node, _parent, _cx| {
        Ok(node
            .value
            .as_deref()
            .filter(|value| !value.is_empty())
            .map(FlatNode::text)
            .into())
    })
}

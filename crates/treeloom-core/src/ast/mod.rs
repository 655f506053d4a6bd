// SPDX-License-Identifier: AGPL-3.0-or-later
//! Open-kind document trees
//!
//! Two tree models are provided, neither tied to a particular schema:
//! - [`FlatNode`]: the annotated-leaf model. Formatting lives on each text
//!   run as an ordered list of [`Mark`]s (ProseMirror `Node.toJSON()` shape).
//! - [`NestedNode`]: the nested-annotation model. Formatting is expressed by
//!   wrapper nodes around the content they affect (unist/mdast shape).
//!
//! Node and mark kinds are plain strings and attributes are JSON values, so a
//! concrete schema is just a set of kind names plus the handlers that map them.

mod flat;
mod nested;

pub use flat::{FlatNode, Mark};
pub use nested::NestedNode;

use std::collections::BTreeMap;

/// Attribute bag shared by nodes and marks of both models
pub type Attrs = BTreeMap<String, serde_json::Value>;

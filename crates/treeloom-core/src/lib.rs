// SPDX-License-Identifier: AGPL-3.0-or-later
//! Treeloom Core - Conversion between annotated-leaf and nested-annotation trees
//!
//! This crate provides:
//! - Two open-kind tree models: annotated-leaf ([`FlatNode`]) and nested-annotation ([`NestedNode`])
//! - Handler registries keyed by node and mark type name, for both directions
//! - The mark partitioner that turns per-leaf marks into wrapper nodes
//! - Convenience handler constructors and a ready-made mdast preset
//! - Parser and renderer traits for text format collaborators

pub mod ast;
pub mod config;
mod depth;
pub mod handlers;
pub mod partition;
pub mod registry;
pub mod to_flat;
pub mod to_nested;
pub mod traits;

#[cfg(feature = "mdast")]
pub mod mdast;

pub use ast::{Attrs, FlatNode, Mark, NestedNode};
pub use config::ConvertConfig;
pub use registry::HandlerRegistry;
pub use to_flat::{to_flat, to_flat_fragment, ToFlatContext, ToFlatHandler, ToFlatOptions};
pub use to_nested::{
    to_nested, to_nested_document, ToNestedContext, ToNestedMarkHandler, ToNestedNodeHandler,
    ToNestedOptions,
};
pub use traits::{ConversionError, Output, Parser, Renderer, Result};

// SPDX-License-Identifier: AGPL-3.0-or-later
//! Treeloom Markdown - CommonMark text in and out of mdast-shaped trees
//!
//! Parsing and rendering go through comrak. The nested-annotation trees this
//! crate produces and consumes use mdast node names, so they plug straight
//! into the [`treeloom_core::mdast`] preset.

mod parser;
mod renderer;

use comrak::ComrakOptions;
use treeloom_core::mdast::{to_flat_options, to_nested_options};
use treeloom_core::{
    to_flat, to_nested_document, ConvertConfig, FlatNode, NestedNode, Parser, Renderer, Result,
};

/// Markdown format handler
pub struct MarkdownHandler;

impl MarkdownHandler {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MarkdownHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser for MarkdownHandler {
    fn format(&self) -> &str {
        "markdown"
    }

    fn parse(&self, input: &str) -> Result<NestedNode> {
        parser::parse_markdown(input)
    }
}

impl Renderer for MarkdownHandler {
    fn format(&self) -> &str {
        "markdown"
    }

    fn render(&self, root: &NestedNode) -> Result<String> {
        renderer::render_markdown(root)
    }
}

fn comrak_options() -> ComrakOptions<'static> {
    let mut options = ComrakOptions::default();
    options.extension.strikethrough = true;
    options
}

/// Parse markdown straight into an annotated-leaf document
pub fn markdown_to_flat(input: &str, config: &ConvertConfig) -> Result<FlatNode> {
    let nested = MarkdownHandler::new().parse(input)?;
    to_flat(&nested, &to_flat_options().with_config(config.clone()))
}

/// Render an annotated-leaf document as markdown
pub fn flat_to_markdown(doc: &FlatNode, config: &ConvertConfig) -> Result<String> {
    let nested = to_nested_document(doc, &to_nested_options().with_config(config.clone()))?;
    MarkdownHandler::new().render(&nested)
}

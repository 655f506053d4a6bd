// SPDX-License-Identifier: AGPL-3.0-or-later
//! Conversions behind the subcommands

use crate::files::{Document, FileError, FileResult};
use treeloom_core::mdast::{to_flat_options, to_nested_options};
use treeloom_core::{to_flat, to_nested_document, ConvertConfig, FlatNode, NestedNode, Parser, Renderer};
use treeloom_markdown::{flat_to_markdown, markdown_to_flat, MarkdownHandler};

/// Produce an annotated-leaf tree from markdown or nested JSON
pub fn into_flat(doc: &Document, config: &ConvertConfig) -> FileResult<FlatNode> {
    let flat = match doc {
        Document::Markdown(text) => markdown_to_flat(text, config)?,
        Document::Nested(root) => to_flat(root, &to_flat_options().with_config(config.clone()))?,
        Document::Flat(_) => {
            return Err(FileError::UnsupportedFormat {
                format: doc.format(),
                target: "annotated-leaf JSON",
            })
        }
    };
    Ok(flat)
}

/// Produce a nested-annotation tree from annotated-leaf JSON or markdown
pub fn into_nested(doc: &Document, config: &ConvertConfig) -> FileResult<NestedNode> {
    let nested = match doc {
        Document::Flat(root) => {
            to_nested_document(root, &to_nested_options().with_config(config.clone()))?
        }
        Document::Markdown(text) => MarkdownHandler::new().parse(text)?,
        Document::Nested(_) => {
            return Err(FileError::UnsupportedFormat {
                format: doc.format(),
                target: "nested-annotation JSON",
            })
        }
    };
    Ok(nested)
}

/// Produce markdown from either tree model
pub fn into_markdown(doc: &Document, config: &ConvertConfig) -> FileResult<String> {
    let markdown = match doc {
        Document::Flat(root) => flat_to_markdown(root, config)?,
        Document::Nested(root) => MarkdownHandler::new().render(root)?,
        Document::Markdown(_) => {
            return Err(FileError::UnsupportedFormat {
                format: doc.format(),
                target: "markdown",
            })
        }
    };
    Ok(markdown)
}

// SPDX-License-Identifier: AGPL-3.0-or-later
//! mdast-shaped nested tree → markdown

use crate::comrak_options;
use comrak::nodes::{
    Ast, AstNode, ListDelimType, ListType, NodeCode, NodeCodeBlock, NodeHeading, NodeHtmlBlock,
    NodeLink, NodeList, NodeValue,
};
use comrak::{format_commonmark, Arena};
use std::cell::RefCell;
use treeloom_core::{ConversionError, NestedNode, Result};

pub(crate) fn render_markdown(root: &NestedNode) -> Result<String> {
    let arena = Arena::new();
    let document = alloc(&arena, NodeValue::Document);
    if root.kind == "root" {
        append_children(&arena, document, &root.children, false)?;
    } else {
        for node in build_node(&arena, root, false)? {
            document.append(node);
        }
    }

    let mut output = Vec::new();
    format_commonmark(document, &comrak_options(), &mut output)
        .map_err(|e| ConversionError::SerializationError(format!("Comrak serialization failed: {}", e)))?;

    let markdown = String::from_utf8(output)
        .map_err(|e| ConversionError::SerializationError(format!("UTF-8 conversion failed: {}", e)))?;

    // Comrak separates consecutive lists with a marker comment
    Ok(markdown.replace("<!-- end list -->\n\n", ""))
}

fn alloc<'a>(arena: &'a Arena<AstNode<'a>>, value: NodeValue) -> &'a AstNode<'a> {
    arena.alloc(AstNode::new(RefCell::new(Ast::new(value, (0, 0).into()))))
}

fn append_children<'a>(
    arena: &'a Arena<AstNode<'a>>,
    parent: &'a AstNode<'a>,
    children: &[NestedNode],
    inline: bool,
) -> Result<()> {
    for child in children {
        for node in build_node(arena, child, inline)? {
            parent.append(node);
        }
    }
    Ok(())
}

fn list_data(node: &NestedNode) -> NodeList {
    let ordered = node.attr_bool("ordered").unwrap_or(false);
    NodeList {
        list_type: if ordered {
            ListType::Ordered
        } else {
            ListType::Bullet
        },
        marker_offset: 0,
        padding: 0,
        start: node.attr_u64("start").unwrap_or(1) as usize,
        delimiter: ListDelimType::Period,
        bullet_char: b'-',
        tight: !node.attr_bool("spread").unwrap_or(false),
    }
}

/// Build the comrak nodes for one nested node
///
/// `inline` tells whether the node sits in phrasing content, which decides
/// how raw html is emitted.
fn build_node<'a>(
    arena: &'a Arena<AstNode<'a>>,
    node: &NestedNode,
    inline: bool,
) -> Result<Vec<&'a AstNode<'a>>> {
    let value = node.value.clone().unwrap_or_default();

    let (ast_value, children_inline) = match node.kind.as_str() {
        "paragraph" => (NodeValue::Paragraph, Some(true)),
        "heading" => {
            let level = node.attr_u64("depth").unwrap_or(1).clamp(1, 6) as u8;
            (NodeValue::Heading(NodeHeading { level, setext: false }), Some(true))
        }
        "blockquote" => (NodeValue::BlockQuote, Some(false)),
        "list" => {
            let list = alloc(arena, NodeValue::List(list_data(node)));
            for child in &node.children {
                if child.kind == "listItem" {
                    let item = alloc(arena, NodeValue::Item(list_data(node)));
                    append_children(arena, item, &child.children, false)?;
                    list.append(item);
                } else {
                    for built in build_node(arena, child, false)? {
                        list.append(built);
                    }
                }
            }
            return Ok(vec![list]);
        }
        "listItem" => {
            let data = NodeList {
                tight: !node.attr_bool("spread").unwrap_or(false),
                ..list_data(node)
            };
            (NodeValue::Item(data), Some(false))
        }
        "code" => {
            let mut literal = value;
            if !literal.ends_with('\n') {
                literal.push('\n');
            }
            let info = match (node.attr_str("lang"), node.attr_str("meta")) {
                (Some(lang), Some(meta)) => format!("{} {}", lang, meta),
                (Some(lang), None) => lang.to_string(),
                _ => String::new(),
            };
            let block = NodeCodeBlock {
                fenced: true,
                fence_char: b'`',
                fence_length: 3,
                fence_offset: 0,
                info,
                literal,
            };
            (NodeValue::CodeBlock(block), None)
        }
        "html" if inline => (NodeValue::HtmlInline(value), None),
        "html" => {
            let mut literal = value;
            if !literal.ends_with('\n') {
                literal.push('\n');
            }
            (NodeValue::HtmlBlock(NodeHtmlBlock { block_type: 0, literal }), None)
        }
        "thematicBreak" => (NodeValue::ThematicBreak, None),
        "text" => return Ok(text_nodes(arena, &value)),
        "emphasis" => (NodeValue::Emph, Some(true)),
        "strong" => (NodeValue::Strong, Some(true)),
        "delete" => (NodeValue::Strikethrough, Some(true)),
        "inlineCode" => (
            NodeValue::Code(NodeCode {
                num_backticks: 1,
                literal: value,
            }),
            None,
        ),
        "break" => (NodeValue::LineBreak, None),
        "link" => (NodeValue::Link(link_data(node)), Some(true)),
        "image" => {
            let image = alloc(arena, NodeValue::Image(link_data(node)));
            if let Some(alt) = node.attr_str("alt").filter(|a| !a.is_empty()) {
                image.append(alloc(arena, NodeValue::Text(alt.to_string())));
            }
            return Ok(vec![image]);
        }
        other => {
            return Err(ConversionError::SerializationError(format!(
                "cannot render node type \"{}\" as markdown",
                other
            )));
        }
    };

    let built = alloc(arena, ast_value);
    if let Some(children_inline) = children_inline {
        append_children(arena, built, &node.children, children_inline)?;
    }
    Ok(vec![built])
}

fn link_data(node: &NestedNode) -> NodeLink {
    NodeLink {
        url: node.attr_str("url").unwrap_or_default().to_string(),
        title: node.attr_str("title").unwrap_or_default().to_string(),
    }
}

/// Text with embedded newlines becomes text runs separated by soft breaks
fn text_nodes<'a>(arena: &'a Arena<AstNode<'a>>, value: &str) -> Vec<&'a AstNode<'a>> {
    let mut nodes = Vec::new();
    for (i, line) in value.split('\n').enumerate() {
        if i > 0 {
            nodes.push(alloc(arena, NodeValue::SoftBreak));
        }
        if !line.is_empty() {
            nodes.push(alloc(arena, NodeValue::Text(line.to_string())));
        }
    }
    nodes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(value: &str) -> NestedNode {
        NestedNode::literal("text", value)
    }

    fn root(children: Vec<NestedNode>) -> NestedNode {
        NestedNode::parent("root", children)
    }

    #[test]
    fn test_render_heading() {
        let doc = root(vec![NestedNode::parent("heading", vec![text("Title")]).with_attr("depth", 2)]);
        let output = render_markdown(&doc).unwrap();
        assert!(output.contains("## Title"));
    }

    #[test]
    fn test_render_inline_marks() {
        let doc = root(vec![NestedNode::parent(
            "paragraph",
            vec![
                NestedNode::parent("strong", vec![text("bold")]),
                text(" and "),
                NestedNode::parent("emphasis", vec![text("em")]),
                text(" and "),
                NestedNode::parent("delete", vec![text("gone")]),
                text(" and "),
                NestedNode::literal("inlineCode", "code"),
            ],
        )]);
        let output = render_markdown(&doc).unwrap();
        assert!(output.contains("**bold**"));
        assert!(output.contains("*em*"));
        assert!(output.contains("~gone~"));
        assert!(output.contains("`code`"));
    }

    #[test]
    fn test_render_code_block() {
        let doc = root(vec![NestedNode::literal("code", "fn main() {}").with_attr("lang", "rust")]);
        let output = render_markdown(&doc).unwrap();
        assert!(output.contains("```rust"));
        assert!(output.contains("fn main() {}"));
    }

    #[test]
    fn test_render_bullet_list() {
        let item = |value: &str| {
            NestedNode::parent("listItem", vec![NestedNode::parent("paragraph", vec![text(value)])])
        };
        let doc = root(vec![NestedNode::parent("list", vec![item("one"), item("two")])
            .with_attr("ordered", false)]);
        let output = render_markdown(&doc).unwrap();
        assert!(output.contains("- one\n- two"));
    }

    #[test]
    fn test_render_link() {
        let doc = root(vec![NestedNode::parent(
            "paragraph",
            vec![NestedNode::parent("link", vec![text("docs")]).with_attr("url", "https://example.com")],
        )]);
        let output = render_markdown(&doc).unwrap();
        assert!(output.contains("[docs](https://example.com)"));
    }

    #[test]
    fn test_unknown_kind_fails() {
        let doc = root(vec![NestedNode::new("table")]);
        let err = render_markdown(&doc).unwrap_err();
        assert!(matches!(err, ConversionError::SerializationError(_)));
    }
}

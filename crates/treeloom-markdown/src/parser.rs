// SPDX-License-Identifier: AGPL-3.0-or-later
//! Markdown → mdast-shaped nested tree

use crate::comrak_options;
use comrak::nodes::{AstNode, ListType, NodeValue};
use comrak::{parse_document, Arena};
use tracing::debug;
use treeloom_core::{ConversionError, NestedNode, Result};

/// Deepest markdown nesting accepted
const MAX_DEPTH: usize = 512;

pub(crate) fn parse_markdown(input: &str) -> Result<NestedNode> {
    let arena = Arena::new();
    let options = comrak_options();
    let root = parse_document(&arena, input, &options);

    convert_node(root, 0)?.ok_or_else(|| ConversionError::ParseError {
        message: "markdown document produced no root node".to_string(),
    })
}

/// Convert the children of `node`, merging adjacent text literals
fn convert_children<'a>(node: &'a AstNode<'a>, depth: usize) -> Result<Vec<NestedNode>> {
    let mut children: Vec<NestedNode> = Vec::new();
    for child in node.children() {
        let Some(converted) = convert_node(child, depth + 1)? else {
            continue;
        };
        if converted.kind == "text" {
            if let Some(last) = children.last_mut().filter(|n| n.kind == "text") {
                let more = converted.value.unwrap_or_default();
                last.value.get_or_insert_with(String::new).push_str(&more);
                continue;
            }
        }
        children.push(converted);
    }
    Ok(children)
}

fn convert_node<'a>(node: &'a AstNode<'a>, depth: usize) -> Result<Option<NestedNode>> {
    if depth > MAX_DEPTH {
        return Err(ConversionError::DepthLimitExceeded { limit: MAX_DEPTH });
    }
    let data = node.data.borrow();

    let converted = match &data.value {
        NodeValue::Document => NestedNode::parent("root", convert_children(node, depth)?),
        NodeValue::Paragraph => NestedNode::parent("paragraph", convert_children(node, depth)?),
        NodeValue::Heading(heading) => {
            NestedNode::parent("heading", convert_children(node, depth)?).with_attr("depth", heading.level)
        }
        NodeValue::BlockQuote => NestedNode::parent("blockquote", convert_children(node, depth)?),
        NodeValue::List(list) => {
            let ordered = matches!(list.list_type, ListType::Ordered);
            let mut out = NestedNode::parent("list", convert_children(node, depth)?)
                .with_attr("ordered", ordered)
                .with_attr("spread", !list.tight);
            if ordered {
                out = out.with_attr("start", list.start);
            }
            out
        }
        NodeValue::Item(_) => NestedNode::parent("listItem", convert_children(node, depth)?),
        NodeValue::CodeBlock(code) => {
            let value = code.literal.strip_suffix('\n').unwrap_or(&code.literal);
            let mut out = NestedNode::literal("code", value);
            let mut info = code.info.trim().splitn(2, char::is_whitespace);
            if let Some(lang) = info.next().filter(|l| !l.is_empty()) {
                out = out.with_attr("lang", lang);
            }
            if let Some(meta) = info.next().map(str::trim).filter(|m| !m.is_empty()) {
                out = out.with_attr("meta", meta);
            }
            out
        }
        NodeValue::HtmlBlock(html) => NestedNode::literal("html", html.literal.trim_end_matches('\n')),
        NodeValue::ThematicBreak => NestedNode::new("thematicBreak"),
        NodeValue::Text(text) => NestedNode::literal("text", text.as_str()),
        NodeValue::SoftBreak => NestedNode::literal("text", "\n"),
        NodeValue::LineBreak => NestedNode::new("break"),
        NodeValue::Emph => NestedNode::parent("emphasis", convert_children(node, depth)?),
        NodeValue::Strong => NestedNode::parent("strong", convert_children(node, depth)?),
        NodeValue::Strikethrough => NestedNode::parent("delete", convert_children(node, depth)?),
        NodeValue::Code(code) => NestedNode::literal("inlineCode", code.literal.as_str()),
        NodeValue::HtmlInline(html) => NestedNode::literal("html", html.as_str()),
        NodeValue::Link(link) => {
            let mut out = NestedNode::parent("link", convert_children(node, depth)?).with_attr("url", link.url.as_str());
            if !link.title.is_empty() {
                out = out.with_attr("title", link.title.as_str());
            }
            out
        }
        NodeValue::Image(image) => {
            let mut out = NestedNode::new("image")
                .with_attr("url", image.url.as_str())
                .with_attr("alt", collect_text(node));
            if !image.title.is_empty() {
                out = out.with_attr("title", image.title.as_str());
            }
            out
        }
        other => {
            debug!(node = ?other, "skipping unsupported markdown node");
            return Ok(None);
        }
    };

    Ok(Some(converted))
}

/// Plain text of an inline subtree, used for image descriptions
fn collect_text<'a>(node: &'a AstNode<'a>) -> String {
    let mut out = String::new();
    for descendant in node.descendants() {
        match &descendant.data.borrow().value {
            NodeValue::Text(text) => out.push_str(text),
            NodeValue::Code(code) => out.push_str(&code.literal),
            NodeValue::SoftBreak | NodeValue::LineBreak => out.push(' '),
            _ => {}
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_paragraph() {
        let root = parse_markdown("Hello *world*").unwrap();
        assert_eq!(
            root,
            NestedNode::parent(
                "root",
                vec![NestedNode::parent(
                    "paragraph",
                    vec![
                        NestedNode::literal("text", "Hello "),
                        NestedNode::parent("emphasis", vec![NestedNode::literal("text", "world")]),
                    ]
                )]
            )
        );
    }

    #[test]
    fn test_soft_break_joins_text() {
        let root = parse_markdown("one\ntwo").unwrap();
        assert_eq!(root.children[0].children, vec![NestedNode::literal("text", "one\ntwo")]);
    }

    #[test]
    fn test_parse_code_block_info() {
        let root = parse_markdown("```rust title=main\nfn main() {}\n```\n").unwrap();
        let code = &root.children[0];
        assert_eq!(code.kind, "code");
        assert_eq!(code.value.as_deref(), Some("fn main() {}"));
        assert_eq!(code.attr_str("lang"), Some("rust"));
        assert_eq!(code.attr_str("meta"), Some("title=main"));
    }

    #[test]
    fn test_parse_ordered_list() {
        let root = parse_markdown("3. a\n4. b\n").unwrap();
        let list = &root.children[0];
        assert_eq!(list.kind, "list");
        assert_eq!(list.attr_bool("ordered"), Some(true));
        assert_eq!(list.attr_u64("start"), Some(3));
        assert_eq!(list.attr_bool("spread"), Some(false));
        assert_eq!(list.children.len(), 2);
    }

    #[test]
    fn test_parse_link_and_image() {
        let root = parse_markdown("[docs](https://example.com \"Docs\") ![a *cat*](cat.png)").unwrap();
        let inline = &root.children[0].children;
        assert_eq!(inline[0].kind, "link");
        assert_eq!(inline[0].attr_str("url"), Some("https://example.com"));
        assert_eq!(inline[0].attr_str("title"), Some("Docs"));
        assert_eq!(inline[2].kind, "image");
        assert_eq!(inline[2].attr_str("alt"), Some("a cat"));
    }

    #[test]
    fn test_parse_strikethrough() {
        let root = parse_markdown("~~gone~~").unwrap();
        assert_eq!(root.children[0].children[0].kind, "delete");
    }
}

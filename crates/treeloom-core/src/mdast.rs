// SPDX-License-Identifier: AGPL-3.0-or-later
//! Handler registries between a ProseMirror-markdown style schema and mdast
//!
//! | Annotated-leaf | mdast |
//! |---|---|
//! | `doc` | `root` |
//! | `paragraph`, `blockquote` | same name |
//! | `heading` (`level`) | `heading` (`depth`) |
//! | `code_block` (`params`) | `code` (`lang`, `value`) |
//! | `horizontal_rule` | `thematicBreak` |
//! | `bullet_list` / `ordered_list` (`order`, `tight`) | `list` (`ordered`, `start`, `spread`) |
//! | `list_item` | `listItem` |
//! | `hard_break` | `break` |
//! | `image` (`src`, `alt`, `title`) | `image` (`url`, `alt`, `title`) |
//! | mark `em` / `strong` / `strike` | `emphasis` / `strong` / `delete` |
//! | mark `link` (`href`, `title`) | `link` (`url`, `title`) |
//! | mark `code` | `inlineCode` literal |
//!
//! Raw `html` has no annotated-leaf counterpart and is left unregistered.

use crate::ast::{Attrs, FlatNode, Mark, NestedNode};
use crate::handlers::{flat_mark, flat_node, literal_to_text, nested_mark, nested_node};
use crate::to_flat::{ToFlatContext, ToFlatOptions};
use crate::to_nested::{ToNestedContext, ToNestedOptions};
use crate::traits::{ConversionError, Output, Result};
use serde_json::Value;

/// Copy the attributes named in `pairs` from `from`, renaming each one
fn rename(from: &Attrs, pairs: &[(&str, &str)]) -> Attrs {
    pairs
        .iter()
        .filter_map(|(src, dst)| from.get(*src).map(|v| (dst.to_string(), v.clone())))
        .collect()
}

/// Registries for annotated-leaf → mdast
pub fn to_nested_options() -> ToNestedOptions {
    ToNestedOptions::new()
        .node("doc", nested_node("root", None))
        .node("paragraph", nested_node("paragraph", None))
        .node("blockquote", nested_node("blockquote", None))
        .node("heading", nested_node("heading", Some(heading_attrs)))
        .node("code_block", code_block_to_code)
        .node("horizontal_rule", nested_node("thematicBreak", None))
        .node("bullet_list", nested_node("list", Some(bullet_list_attrs)))
        .node("ordered_list", nested_node("list", Some(ordered_list_attrs)))
        .node("list_item", nested_node("listItem", None))
        .node("hard_break", nested_node("break", None))
        .node("image", nested_node("image", Some(image_attrs)))
        .mark("em", nested_mark("emphasis", None))
        .mark("strong", nested_mark("strong", None))
        .mark("strike", nested_mark("delete", None))
        .mark("link", nested_mark("link", Some(link_attrs)))
        .mark("code", code_mark_to_inline_code)
}

/// Registries for mdast → annotated-leaf
pub fn to_flat_options() -> ToFlatOptions {
    ToFlatOptions::new()
        .node("root", flat_node("doc", None))
        .node("paragraph", flat_node("paragraph", None))
        .node("blockquote", flat_node("blockquote", None))
        .node("heading", flat_node("heading", Some(level_attrs)))
        .node("code", code_to_code_block)
        .node("thematicBreak", flat_node("horizontal_rule", None))
        .node("list", list_to_flat)
        .node("listItem", flat_node("list_item", None))
        .node("break", flat_node("hard_break", None))
        .node("image", image_to_flat)
        .node("text", literal_to_text())
        .node("emphasis", flat_mark("em", None))
        .node("strong", flat_mark("strong", None))
        .node("delete", flat_mark("strike", None))
        .node("link", flat_mark("link", Some(href_attrs)))
        .node("inlineCode", inline_code_to_text)
}

fn heading_attrs(node: &FlatNode) -> Attrs {
    let mut attrs = Attrs::new();
    attrs.insert("depth".into(), Value::from(node.attr_u64("level").unwrap_or(1)));
    attrs
}

fn level_attrs(node: &NestedNode) -> Attrs {
    let mut attrs = Attrs::new();
    attrs.insert("level".into(), Value::from(node.attr_u64("depth").unwrap_or(1)));
    attrs
}

fn list_attrs(node: &FlatNode, ordered: bool) -> Attrs {
    let mut attrs = Attrs::new();
    attrs.insert("ordered".into(), Value::Bool(ordered));
    if let Some(tight) = node.attr_bool("tight") {
        attrs.insert("spread".into(), Value::Bool(!tight));
    }
    attrs
}

fn bullet_list_attrs(node: &FlatNode) -> Attrs {
    list_attrs(node, false)
}

fn ordered_list_attrs(node: &FlatNode) -> Attrs {
    let mut attrs = list_attrs(node, true);
    if let Some(order) = node.attrs.get("order") {
        attrs.insert("start".into(), order.clone());
    }
    attrs
}

fn image_attrs(node: &FlatNode) -> Attrs {
    rename(&node.attrs, &[("src", "url"), ("alt", "alt"), ("title", "title")])
}

fn link_attrs(mark: &Mark) -> Attrs {
    rename(&mark.attrs, &[("href", "url"), ("title", "title")])
}

fn href_attrs(node: &NestedNode) -> Attrs {
    rename(&node.attrs, &[("url", "href"), ("title", "title")])
}

fn code_block_to_code<'a>(
    node: &'a FlatNode,
    _parent: Option<&'a FlatNode>,
    _cx: &ToNestedContext<'a>,
) -> Result<Output<NestedNode>> {
    let mut code = NestedNode::literal("code", node.text_content());
    if let Some(lang) = node.attr_str("params").filter(|p| !p.is_empty()) {
        code = code.with_attr("lang", lang);
    }
    Ok(code.into())
}

fn code_mark_to_inline_code<'a>(
    _mark: &'a Mark,
    _parent: &'a FlatNode,
    children: Vec<NestedNode>,
    _cx: &ToNestedContext<'a>,
) -> Result<Output<NestedNode>> {
    let value: String = children.iter().map(NestedNode::text_content).collect();
    Ok(NestedNode::literal("inlineCode", value).into())
}

fn code_to_code_block<'a>(
    node: &'a NestedNode,
    _parent: Option<&'a NestedNode>,
    _cx: &ToFlatContext<'a>,
) -> Result<Output<FlatNode>> {
    let mut block = FlatNode::new("code_block");
    if let Some(lang) = node.attr_str("lang") {
        block = block.with_attr("params", lang);
    }
    if let Some(value) = node.value.as_deref().filter(|v| !v.is_empty()) {
        block = block.with_children(vec![FlatNode::text(value)]);
    }
    Ok(block.into())
}

fn list_to_flat<'a>(
    node: &'a NestedNode,
    _parent: Option<&'a NestedNode>,
    cx: &ToFlatContext<'a>,
) -> Result<Output<FlatNode>> {
    let ordered = node.attr_bool("ordered").unwrap_or(false);
    let mut list = FlatNode::new(if ordered { "ordered_list" } else { "bullet_list" });
    if ordered {
        if let Some(start) = node.attrs.get("start") {
            list.attrs.insert("order".into(), start.clone());
        }
    }
    if let Some(spread) = node.attr_bool("spread") {
        list.attrs.insert("tight".into(), Value::Bool(!spread));
    }
    Ok(list.with_children(cx.handle_all(node)?).into())
}

fn image_to_flat<'a>(
    node: &'a NestedNode,
    _parent: Option<&'a NestedNode>,
    _cx: &ToFlatContext<'a>,
) -> Result<Output<FlatNode>> {
    if node.attr_str("url").is_none() {
        return Err(ConversionError::missing_attribute("image", "url"));
    }
    let attrs = rename(&node.attrs, &[("url", "src"), ("alt", "alt"), ("title", "title")]);
    Ok(FlatNode::new("image").with_attrs(attrs).into())
}

fn inline_code_to_text<'a>(
    node: &'a NestedNode,
    _parent: Option<&'a NestedNode>,
    _cx: &ToFlatContext<'a>,
) -> Result<Output<FlatNode>> {
    Ok(node
        .value
        .as_deref()
        .filter(|v| !v.is_empty())
        .map(|v| FlatNode::text(v).with_marks(vec![Mark::new("code")]))
        .into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{to_flat, to_nested_document};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn sample() -> FlatNode {
        let link = Mark::new("link").with_attr("href", "https://example.com");
        FlatNode::new("doc").with_children(vec![
            FlatNode::new("heading")
                .with_attr("level", 2)
                .with_children(vec![FlatNode::text("Intro")]),
            FlatNode::new("paragraph").with_children(vec![
                FlatNode::text("See ").with_marks(vec![Mark::new("em")]),
                FlatNode::text("the docs").with_marks(vec![Mark::new("em"), link.clone()]),
                FlatNode::text(" or ").with_marks(vec![link]),
                FlatNode::text("run()").with_marks(vec![Mark::new("code")]),
            ]),
            FlatNode::new("ordered_list")
                .with_attr("order", 3)
                .with_attr("tight", true)
                .with_children(vec![FlatNode::new("list_item").with_children(vec![
                    FlatNode::new("paragraph").with_children(vec![FlatNode::text("item")]),
                ])]),
            FlatNode::new("code_block")
                .with_attr("params", "rust")
                .with_children(vec![FlatNode::text("fn main() {}")]),
            FlatNode::new("horizontal_rule"),
        ])
    }

    #[test]
    fn test_to_mdast_shape() {
        let root = to_nested_document(&sample(), &to_nested_options()).unwrap();
        let value = serde_json::to_value(&root).unwrap();

        assert_eq!(value["type"], "root");
        assert_eq!(value["children"][0], json!({
            "type": "heading",
            "depth": 2,
            "children": [{"type": "text", "value": "Intro"}]
        }));
        assert_eq!(value["children"][1]["children"], json!([
            {"type": "emphasis", "children": [
                {"type": "text", "value": "See "},
                {"type": "link", "url": "https://example.com", "children": [
                    {"type": "text", "value": "the docs"}
                ]}
            ]},
            {"type": "link", "url": "https://example.com", "children": [
                {"type": "text", "value": " or "}
            ]},
            {"type": "inlineCode", "value": "run()"}
        ]));
        assert_eq!(value["children"][2]["ordered"], true);
        assert_eq!(value["children"][2]["start"], 3);
        assert_eq!(value["children"][2]["spread"], false);
        assert_eq!(value["children"][3], json!({
            "type": "code", "lang": "rust", "value": "fn main() {}"
        }));
        assert_eq!(value["children"][4], json!({"type": "thematicBreak"}));
    }

    #[test]
    fn test_round_trip() {
        let input = sample();
        let nested = to_nested_document(&input, &to_nested_options()).unwrap();
        let back = to_flat(&nested, &to_flat_options()).unwrap();
        assert_eq!(back, input);
    }

    #[test]
    fn test_html_is_dropped() {
        let root = NestedNode::parent(
            "root",
            vec![
                NestedNode::literal("html", "<div>raw</div>"),
                NestedNode::parent("paragraph", vec![NestedNode::literal("text", "kept")]),
            ],
        );
        let flat = to_flat(&root, &to_flat_options()).unwrap();
        assert_eq!(flat.children.len(), 1);
        assert_eq!(flat.children[0].kind, "paragraph");
    }

    #[test]
    fn test_image_requires_url() {
        let image = NestedNode::new("image").with_attr("alt", "no source");
        let err = to_flat(&image, &to_flat_options()).unwrap_err();
        assert_eq!(err.to_string(), "node \"image\" is missing attribute \"url\"");
    }

    #[test]
    fn test_bullet_list_from_mdast_json() {
        let list: NestedNode = serde_json::from_value(json!({
            "type": "list",
            "ordered": false,
            "spread": true,
            "children": [{"type": "listItem", "children": [
                {"type": "paragraph", "children": [{"type": "text", "value": "a"}]}
            ]}]
        }))
        .unwrap();

        let flat = to_flat(&list, &to_flat_options()).unwrap();
        assert_eq!(flat.kind, "bullet_list");
        assert_eq!(flat.attr_bool("tight"), Some(false));
        assert_eq!(flat.attrs.get("order"), None);
        assert_eq!(flat.text_content(), "a");
    }
}

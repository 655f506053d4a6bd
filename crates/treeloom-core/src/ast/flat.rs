// SPDX-License-Identifier: AGPL-3.0-or-later
//! Annotated-leaf tree (ProseMirror-style)

use super::Attrs;
use serde::{Deserialize, Serialize};

/// A formatting annotation attached to a leaf
///
/// Equality is by value: two marks are the same mark when their kinds and
/// attributes are equal, regardless of where they were created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mark {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Attrs::is_empty")]
    pub attrs: Attrs,
}

impl Mark {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            attrs: Attrs::new(),
        }
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    pub fn attr_str(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).and_then(|v| v.as_str())
    }
}

/// A node of the annotated-leaf model
///
/// Block nodes carry `children`; text runs carry `text` and an ordered list
/// of `marks`, where the first mark is the outermost one.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FlatNode {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Attrs::is_empty")]
    pub attrs: Attrs,
    #[serde(default, rename = "content", skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<FlatNode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub marks: Vec<Mark>,
}

impl FlatNode {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            ..Default::default()
        }
    }

    /// Create a text run with no marks
    pub fn text(value: impl Into<String>) -> Self {
        Self {
            kind: "text".to_string(),
            text: Some(value.into()),
            ..Default::default()
        }
    }

    pub fn with_children(mut self, children: Vec<FlatNode>) -> Self {
        self.children = children;
        self
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    pub fn with_attrs(mut self, attrs: Attrs) -> Self {
        self.attrs.extend(attrs);
        self
    }

    pub fn with_marks(mut self, marks: Vec<Mark>) -> Self {
        self.marks = marks;
        self
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn attr_str(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).and_then(|v| v.as_str())
    }

    pub fn attr_u64(&self, name: &str) -> Option<u64> {
        self.attrs.get(name).and_then(|v| v.as_u64())
    }

    pub fn attr_bool(&self, name: &str) -> Option<bool> {
        self.attrs.get(name).and_then(|v| v.as_bool())
    }

    /// Concatenated text of this node and all of its descendants
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        if let Some(ref text) = self.text {
            out.push_str(text);
        }
        for child in &self.children {
            child.collect_text(out);
        }
    }

    /// Add `mark` to this node's mark set
    ///
    /// An equal mark already present leaves the set untouched. A mark of the
    /// same kind with other attributes is replaced. The new mark becomes the
    /// outermost, i.e. the first in the list.
    pub fn add_mark(&mut self, mark: Mark) {
        if self.marks.contains(&mark) {
            return;
        }
        self.marks.retain(|m| m.kind != mark.kind);
        self.marks.insert(0, mark);
    }

    /// Apply `mark` to every leaf under (and including) this node
    pub fn annotate(mut self, mark: &Mark) -> Self {
        if self.is_leaf() {
            self.add_mark(mark.clone());
        } else {
            self.children = std::mem::take(&mut self.children)
                .into_iter()
                .map(|child| child.annotate(mark))
                .collect();
        }
        self
    }
}

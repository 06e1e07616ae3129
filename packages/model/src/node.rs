//! # Nodes
//!
//! A document is a tree of [`Node`]s. Each node carries its stable key, a
//! back-reference to its parent (by key) and a [`NodeKind`] payload:
//!
//! - `Root` / `Element` own an ordered list of child keys
//! - `Text` owns string content plus format, style and editing mode
//! - `LineBreak` and `Decorator` are leaves
//!
//! Concrete kinds such as headings or links are plain elements and text nodes
//! distinguished by their `type_name`.

use crate::text::char_len;
use crate::NodeKey;
use serde::{Deserialize, Serialize};
use std::ops::BitOr;

/// Bitmask of inline text formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TextFormat(u32);

impl TextFormat {
    pub const BOLD: TextFormat = TextFormat(1);
    pub const ITALIC: TextFormat = TextFormat(1 << 1);
    pub const STRIKETHROUGH: TextFormat = TextFormat(1 << 2);
    pub const UNDERLINE: TextFormat = TextFormat(1 << 3);
    pub const CODE: TextFormat = TextFormat(1 << 4);
    pub const SUBSCRIPT: TextFormat = TextFormat(1 << 5);
    pub const SUPERSCRIPT: TextFormat = TextFormat(1 << 6);
    pub const HIGHLIGHT: TextFormat = TextFormat(1 << 7);
    pub const LOWERCASE: TextFormat = TextFormat(1 << 8);
    pub const UPPERCASE: TextFormat = TextFormat(1 << 9);
    pub const CAPITALIZE: TextFormat = TextFormat(1 << 10);

    pub const fn empty() -> Self {
        TextFormat(0)
    }

    pub const fn from_bits(bits: u32) -> Self {
        TextFormat(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn contains(self, other: TextFormat) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: TextFormat) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: TextFormat) {
        self.0 &= !other.0;
    }

    pub fn toggle(&mut self, other: TextFormat) {
        self.0 ^= other.0;
    }
}

impl BitOr for TextFormat {
    type Output = TextFormat;

    fn bitor(self, rhs: TextFormat) -> TextFormat {
        TextFormat(self.0 | rhs.0)
    }
}

/// Editing behavior of a text node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextMode {
    /// Plain, freely editable and mergeable text
    #[default]
    Normal,
    /// Edited as a single unit: any partial deletion removes the whole node
    Token,
    /// Edited segment-wise: a partial deletion turns it into plain text
    Segmented,
    /// Excluded from text content unless asked for
    Inert,
}

/// Per-node detail flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextDetail {
    #[serde(default)]
    pub directionless: bool,
    #[serde(default)]
    pub unmergeable: bool,
}

/// Payload of a text node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextData {
    pub type_name: String,
    pub text: String,
    pub format: TextFormat,
    pub style: String,
    pub mode: TextMode,
    pub detail: TextDetail,
}

impl TextData {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            type_name: "text".to_string(),
            text: text.into(),
            format: TextFormat::empty(),
            style: String::new(),
            mode: TextMode::Normal,
            detail: TextDetail::default(),
        }
    }

    pub fn with_type(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = type_name.into();
        self
    }

    pub fn with_format(mut self, format: TextFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = style.into();
        self
    }

    pub fn with_mode(mut self, mode: TextMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_detail(mut self, detail: TextDetail) -> Self {
        self.detail = detail;
        self
    }

    /// Size in chars
    pub fn size(&self) -> usize {
        char_len(&self.text)
    }

    /// Plain `text` node in normal mode
    pub fn is_simple_text(&self) -> bool {
        self.type_name == "text" && self.mode == TextMode::Normal
    }

    /// Whether two simple text nodes can be merged into one
    pub fn can_merge_with(&self, other: &TextData) -> bool {
        self.is_simple_text()
            && other.is_simple_text()
            && !self.detail.unmergeable
            && !other.detail.unmergeable
            && self.format == other.format
            && self.style == other.style
    }
}

/// Payload of an element (and of the root)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementData {
    pub type_name: String,
    pub(crate) children: Vec<NodeKey>,
    pub inline: bool,
    pub shadow_root: bool,
    pub can_be_empty: bool,
    pub format: u32,
    pub indent: u32,
}

impl ElementData {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            children: Vec::new(),
            inline: false,
            shadow_root: false,
            can_be_empty: true,
            format: 0,
            indent: 0,
        }
    }

    pub fn paragraph() -> Self {
        Self::new("paragraph")
    }

    pub(crate) fn root() -> Self {
        Self::new("root")
    }

    pub fn with_inline(mut self, inline: bool) -> Self {
        self.inline = inline;
        self
    }

    pub fn with_shadow_root(mut self, shadow_root: bool) -> Self {
        self.shadow_root = shadow_root;
        self
    }

    pub fn with_can_be_empty(mut self, can_be_empty: bool) -> Self {
        self.can_be_empty = can_be_empty;
        self
    }

    pub fn with_indent(mut self, indent: u32) -> Self {
        self.indent = indent;
        self
    }

    pub fn children(&self) -> &[NodeKey] {
        &self.children
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

/// Payload of a decorator leaf (embeds, images, mentions...)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoratorData {
    pub type_name: String,
    pub inline: bool,
}

impl DecoratorData {
    pub fn new(type_name: impl Into<String>, inline: bool) -> Self {
        Self {
            type_name: type_name.into(),
            inline,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Root(ElementData),
    Element(ElementData),
    Text(TextData),
    LineBreak,
    Decorator(DecoratorData),
}

/// One version of a node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub(crate) key: NodeKey,
    pub(crate) parent: Option<NodeKey>,
    pub(crate) kind: NodeKind,
}

impl Node {
    pub(crate) fn new(key: NodeKey, kind: NodeKind) -> Self {
        Self {
            key,
            parent: None,
            kind,
        }
    }

    pub fn key(&self) -> NodeKey {
        self.key
    }

    pub fn parent(&self) -> Option<NodeKey> {
        self.parent
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn type_name(&self) -> &str {
        match &self.kind {
            NodeKind::Root(_) => "root",
            NodeKind::Element(data) => &data.type_name,
            NodeKind::Text(data) => &data.type_name,
            NodeKind::LineBreak => "linebreak",
            NodeKind::Decorator(data) => &data.type_name,
        }
    }

    pub(crate) fn element_mut(&mut self) -> Option<&mut ElementData> {
        match &mut self.kind {
            NodeKind::Root(data) | NodeKind::Element(data) => Some(data),
            _ => None,
        }
    }

    pub(crate) fn text_mut(&mut self) -> Option<&mut TextData> {
        match &mut self.kind {
            NodeKind::Text(data) => Some(data),
            _ => None,
        }
    }
}

/// Capabilities the caret and offset code asks of a node
///
/// Code that only needs to know "can this hold children" or "how long is
/// this" goes through these instead of matching on [`NodeKind`].
pub trait NodeBehavior {
    fn as_element(&self) -> Option<&ElementData>;

    fn as_text(&self) -> Option<&TextData>;

    fn is_root(&self) -> bool;

    fn is_line_break(&self) -> bool;

    fn is_decorator(&self) -> bool;

    /// Inline nodes flow within a block; text and line breaks always do
    fn is_inline(&self) -> bool;

    fn is_element(&self) -> bool {
        self.as_element().is_some()
    }

    fn is_text(&self) -> bool {
        self.as_text().is_some()
    }

    fn is_leaf(&self) -> bool {
        !self.is_element()
    }

    fn is_shadow_root(&self) -> bool {
        self.as_element().map(|e| e.shadow_root).unwrap_or(false)
    }

    /// Length in chars for text nodes, 0 otherwise
    fn text_size(&self) -> usize {
        self.as_text().map(TextData::size).unwrap_or(0)
    }
}

impl NodeBehavior for Node {
    fn as_element(&self) -> Option<&ElementData> {
        match &self.kind {
            NodeKind::Root(data) | NodeKind::Element(data) => Some(data),
            _ => None,
        }
    }

    fn as_text(&self) -> Option<&TextData> {
        match &self.kind {
            NodeKind::Text(data) => Some(data),
            _ => None,
        }
    }

    fn is_root(&self) -> bool {
        matches!(self.kind, NodeKind::Root(_))
    }

    fn is_line_break(&self) -> bool {
        matches!(self.kind, NodeKind::LineBreak)
    }

    fn is_decorator(&self) -> bool {
        matches!(self.kind, NodeKind::Decorator(_))
    }

    fn is_inline(&self) -> bool {
        match &self.kind {
            NodeKind::Root(_) => false,
            NodeKind::Element(data) => data.inline,
            NodeKind::Text(_) | NodeKind::LineBreak => true,
            NodeKind::Decorator(data) => data.inline,
        }
    }
}

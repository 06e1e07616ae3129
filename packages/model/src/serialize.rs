//! JSON form of a document

use crate::editor::Editor;
use crate::errors::EditorResult;
use crate::node::{DecoratorData, ElementData, NodeKind, TextData, TextDetail, TextFormat, TextMode};
use crate::store::NodeStore;
use crate::NodeKey;
use serde::{Deserialize, Serialize};
use tracing::debug;

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum SerializedNode {
    #[serde(rename_all = "camelCase")]
    Element {
        #[serde(rename = "type")]
        type_name: String,
        #[serde(default)]
        children: Vec<SerializedNode>,
        #[serde(default)]
        inline: bool,
        #[serde(default)]
        shadow_root: bool,
        #[serde(default = "default_true")]
        can_be_empty: bool,
        #[serde(default)]
        format: u32,
        #[serde(default)]
        indent: u32,
    },
    #[serde(rename_all = "camelCase")]
    Text {
        #[serde(rename = "type", default = "default_text_type")]
        type_name: String,
        text: String,
        #[serde(default)]
        format: TextFormat,
        #[serde(default)]
        style: String,
        #[serde(default)]
        mode: TextMode,
        #[serde(default)]
        detail: TextDetail,
    },
    LineBreak,
    #[serde(rename_all = "camelCase")]
    Decorator {
        #[serde(rename = "type")]
        type_name: String,
        #[serde(default)]
        inline: bool,
    },
}

fn default_text_type() -> String {
    "text".to_string()
}

/// The root's children, in order
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SerializedEditorState {
    pub children: Vec<SerializedNode>,
}

impl SerializedEditorState {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

/// Serialize the subtree at `key`; `None` for unknown keys and the root
pub fn export_node<S: NodeStore + ?Sized>(store: &S, key: NodeKey) -> Option<SerializedNode> {
    let node = store.get_node(key)?;
    let serialized = match node.kind() {
        NodeKind::Root(_) => return None,
        NodeKind::Element(data) => SerializedNode::Element {
            type_name: data.type_name.clone(),
            children: data
                .children()
                .iter()
                .filter_map(|child| export_node(store, *child))
                .collect(),
            inline: data.inline,
            shadow_root: data.shadow_root,
            can_be_empty: data.can_be_empty,
            format: data.format,
            indent: data.indent,
        },
        NodeKind::Text(data) => SerializedNode::Text {
            type_name: data.type_name.clone(),
            text: data.text.clone(),
            format: data.format,
            style: data.style.clone(),
            mode: data.mode,
            detail: data.detail,
        },
        NodeKind::LineBreak => SerializedNode::LineBreak,
        NodeKind::Decorator(data) => SerializedNode::Decorator {
            type_name: data.type_name.clone(),
            inline: data.inline,
        },
    };
    Some(serialized)
}

/// Serialize everything attached to the root of `store`
pub fn export_state<S: NodeStore + ?Sized>(store: &S) -> SerializedEditorState {
    SerializedEditorState {
        children: store
            .get_children(NodeKey::ROOT)
            .iter()
            .filter_map(|child| export_node(store, *child))
            .collect(),
    }
}

impl Editor {
    pub fn export_state(&self) -> SerializedEditorState {
        export_state(self)
    }

    /// Replace the root's children with `serialized` (inside an update)
    pub fn import_state(&mut self, serialized: &SerializedEditorState) -> EditorResult<()> {
        self.clear_children(NodeKey::ROOT)?;
        let mut keys = Vec::with_capacity(serialized.children.len());
        for child in &serialized.children {
            keys.push(self.import_node(child)?);
        }
        self.append_all(NodeKey::ROOT, &keys)?;
        debug!(nodes = self.node_keys().len(), "imported state");
        Ok(())
    }

    /// Create detached nodes for `serialized` and return the subtree root
    pub fn import_node(&mut self, serialized: &SerializedNode) -> EditorResult<NodeKey> {
        match serialized {
            SerializedNode::Element {
                type_name,
                children,
                inline,
                shadow_root,
                can_be_empty,
                format,
                indent,
            } => {
                let mut data = ElementData::new(type_name.clone())
                    .with_inline(*inline)
                    .with_shadow_root(*shadow_root)
                    .with_can_be_empty(*can_be_empty)
                    .with_indent(*indent);
                data.format = *format;
                let key = self.create_element(data)?;
                let mut child_keys = Vec::with_capacity(children.len());
                for child in children {
                    child_keys.push(self.import_node(child)?);
                }
                if let Some(element) = self.get_writable(key)?.element_mut() {
                    element.children = child_keys.clone();
                }
                for child in child_keys {
                    self.get_writable(child)?.parent = Some(key);
                }
                Ok(key)
            }
            SerializedNode::Text {
                type_name,
                text,
                format,
                style,
                mode,
                detail,
            } => self.create_text_with(
                TextData::new(text.clone())
                    .with_type(type_name.clone())
                    .with_format(*format)
                    .with_style(style.clone())
                    .with_mode(*mode)
                    .with_detail(*detail),
            ),
            SerializedNode::LineBreak => self.create_line_break(),
            SerializedNode::Decorator { type_name, inline } => {
                self.create_decorator(DecoratorData::new(type_name.clone(), *inline))
            }
        }
    }
}

impl SerializedNode {
    pub fn text(text: impl Into<String>) -> Self {
        SerializedNode::Text {
            type_name: default_text_type(),
            text: text.into(),
            format: TextFormat::empty(),
            style: String::new(),
            mode: TextMode::Normal,
            detail: TextDetail::default(),
        }
    }

    pub fn paragraph(children: Vec<SerializedNode>) -> Self {
        SerializedNode::Element {
            type_name: "paragraph".to_string(),
            children,
            inline: false,
            shadow_root: false,
            can_be_empty: true,
            format: 0,
            indent: 0,
        }
    }

    pub fn is_element(&self) -> bool {
        matches!(self, SerializedNode::Element { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeBehavior;

    #[test]
    fn test_json_shape() {
        let state = SerializedEditorState {
            children: vec![SerializedNode::paragraph(vec![
                SerializedNode::text("Hi"),
                SerializedNode::LineBreak,
            ])],
        };
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["children"][0]["kind"], "element");
        assert_eq!(json["children"][0]["type"], "paragraph");
        assert_eq!(json["children"][0]["canBeEmpty"], true);
        assert_eq!(json["children"][0]["children"][0]["kind"], "text");
        assert_eq!(json["children"][0]["children"][1]["kind"], "lineBreak");
    }

    #[test]
    fn test_import_then_export() {
        let json = r#"{
            "children": [
                { "kind": "element", "type": "heading", "children": [
                    { "kind": "text", "text": "Title", "format": 1 }
                ]},
                { "kind": "element", "type": "paragraph", "children": [
                    { "kind": "text", "text": "Body" },
                    { "kind": "decorator", "type": "mention", "inline": true }
                ]}
            ]
        }"#;
        let serialized = SerializedEditorState::from_json(json).unwrap();

        let mut editor = Editor::new();
        editor
            .update(|editor| editor.import_state(&serialized))
            .unwrap();

        assert_eq!(editor.get_text_content(NodeKey::ROOT), "Title\n\nBody");
        assert_eq!(editor.export_state(), serialized);
        let heading = editor.get_first_child(NodeKey::ROOT).unwrap();
        let title = editor.get_first_child(heading).unwrap();
        assert!(editor
            .get_node(title)
            .and_then(|n| n.as_text())
            .map(|t| t.format.contains(TextFormat::BOLD))
            .unwrap_or(false));
    }
}

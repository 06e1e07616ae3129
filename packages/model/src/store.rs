//! # Read traversal
//!
//! [`NodeStore`] is the read side of the model. The editor implements it over
//! its active state (pending inside an update, committed otherwise) and
//! [`StateReader`](crate::StateReader) implements it over any snapshot, so
//! everything built on top (carets, offset views, validation) works against
//! either.
//!
//! Only `get_node` and `node_keys` are required; every traversal below is
//! derived from parent links and child lists. Traversal boundaries are
//! `None` or empty, never errors.

use crate::errors::{EditorError, EditorResult};
use crate::node::{NodeBehavior, TextMode};
use crate::text::char_len;
use crate::{Node, NodeKey};

/// Options for [`NodeStore::get_text_content_with`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextContentOptions {
    pub include_inert: bool,
    pub include_directionless: bool,
}

const DOUBLE_LINE_BREAK: &str = "\n\n";

pub trait NodeStore {
    fn get_node(&self, key: NodeKey) -> Option<&Node>;

    /// Every key in the underlying registry, attached or not
    fn node_keys(&self) -> Vec<NodeKey>;

    fn has_node(&self, key: NodeKey) -> bool {
        self.get_node(key).is_some()
    }

    /// Like `get_node`, but a missing key is a `NodeNotFound` error
    fn node(&self, key: NodeKey) -> EditorResult<&Node> {
        self.get_node(key).ok_or(EditorError::NodeNotFound(key))
    }

    fn get_parent(&self, key: NodeKey) -> Option<NodeKey> {
        self.get_node(key).and_then(|node| node.parent)
    }

    /// Child keys of an element; empty for leaves and unknown keys
    fn get_children(&self, key: NodeKey) -> &[NodeKey] {
        self.get_node(key)
            .and_then(|node| node.as_element())
            .map(|element| element.children())
            .unwrap_or(&[])
    }

    fn get_children_size(&self, key: NodeKey) -> usize {
        self.get_children(key).len()
    }

    fn get_first_child(&self, key: NodeKey) -> Option<NodeKey> {
        self.get_children(key).first().copied()
    }

    fn get_last_child(&self, key: NodeKey) -> Option<NodeKey> {
        self.get_children(key).last().copied()
    }

    fn get_child_at_index(&self, key: NodeKey, index: usize) -> Option<NodeKey> {
        self.get_children(key).get(index).copied()
    }

    fn get_index_within_parent(&self, key: NodeKey) -> Option<usize> {
        let parent = self.get_parent(key)?;
        self.get_children(parent).iter().position(|child| *child == key)
    }

    fn get_next_sibling(&self, key: NodeKey) -> Option<NodeKey> {
        let parent = self.get_parent(key)?;
        let index = self.get_index_within_parent(key)?;
        self.get_child_at_index(parent, index + 1)
    }

    fn get_previous_sibling(&self, key: NodeKey) -> Option<NodeKey> {
        let parent = self.get_parent(key)?;
        let index = self.get_index_within_parent(key)?;
        index
            .checked_sub(1)
            .and_then(|prev| self.get_child_at_index(parent, prev))
    }

    /// Ancestors from the parent up to the root
    fn get_parents(&self, key: NodeKey) -> Vec<NodeKey> {
        let mut parents = Vec::new();
        let mut current = self.get_parent(key);
        while let Some(parent) = current {
            // A malformed chain must not spin forever
            if parents.contains(&parent) {
                break;
            }
            parents.push(parent);
            current = self.get_parent(parent);
        }
        parents
    }

    /// Reachable from the root through parent links
    fn is_attached(&self, key: NodeKey) -> bool {
        if !self.has_node(key) {
            return false;
        }
        if key.is_root() {
            return true;
        }
        // The chain stops at the first missing ancestor
        self.get_parents(key).last() == Some(&NodeKey::ROOT) && self.has_node(NodeKey::ROOT)
    }

    fn is_ancestor_of(&self, ancestor: NodeKey, key: NodeKey) -> bool {
        self.get_parents(key).contains(&ancestor)
    }

    fn is_root_or_shadow_root(&self, key: NodeKey) -> bool {
        self.get_node(key)
            .map(|node| node.is_root() || node.is_shadow_root())
            .unwrap_or(false)
    }

    fn get_first_descendant(&self, key: NodeKey) -> Option<NodeKey> {
        let mut node = self.get_first_child(key)?;
        while let Some(child) = self.get_first_child(node) {
            node = child;
        }
        Some(node)
    }

    fn get_last_descendant(&self, key: NodeKey) -> Option<NodeKey> {
        let mut node = self.get_last_child(key)?;
        while let Some(child) = self.get_last_child(node) {
            node = child;
        }
        Some(node)
    }

    /// Leaf (or bottom-most element) at child `index`; past the end resolves
    /// to the last child's last descendant
    fn get_descendant_by_index(&self, key: NodeKey, index: usize) -> Option<NodeKey> {
        let children = self.get_children(key);
        if index >= children.len() {
            let resolved = *children.last()?;
            return Some(self.get_last_descendant(resolved).unwrap_or(resolved));
        }
        let resolved = children[index];
        Some(self.get_first_descendant(resolved).unwrap_or(resolved))
    }

    /// The ancestor (or self) whose parent is the root or a shadow root
    fn get_top_level_element(&self, key: NodeKey) -> Option<NodeKey> {
        let mut node = key;
        loop {
            let parent = self.get_parent(node)?;
            if self.is_root_or_shadow_root(parent) {
                return Some(node);
            }
            node = parent;
        }
    }

    /// A block holds inline content directly: root, block decorators, and
    /// non-inline elements whose first child is inline (or absent)
    fn is_block(&self, key: NodeKey) -> bool {
        let Some(node) = self.get_node(key) else {
            return false;
        };
        if node.is_root() || (node.is_decorator() && !node.is_inline()) {
            return true;
        }
        let Some(element) = node.as_element() else {
            return false;
        };
        if element.shadow_root || element.inline || !element.can_be_empty {
            return false;
        }
        match self.get_first_child(key).and_then(|child| self.get_node(child)) {
            None => true,
            Some(child) => child.is_inline(),
        }
    }

    /// Nearest block at or above `key`
    fn get_ancestor_block(&self, key: NodeKey) -> Option<NodeKey> {
        let mut node = key;
        loop {
            if self.is_block(node) {
                return Some(node);
            }
            node = self.get_parent(node)?;
        }
    }

    fn get_text_content(&self, key: NodeKey) -> String {
        self.get_text_content_with(key, TextContentOptions::default())
    }

    fn get_text_content_with(&self, key: NodeKey, options: TextContentOptions) -> String {
        let mut out = String::new();
        write_text_content(self, key, options, &mut out);
        out
    }

    fn get_text_content_size(&self, key: NodeKey) -> usize {
        char_len(&self.get_text_content(key))
    }
}

fn write_text_content<S: NodeStore + ?Sized>(
    store: &S,
    key: NodeKey,
    options: TextContentOptions,
    out: &mut String,
) {
    let Some(node) = store.get_node(key) else {
        return;
    };
    if let Some(text) = node.as_text() {
        let skip = (text.mode == TextMode::Inert && !options.include_inert)
            || (text.detail.directionless && !options.include_directionless);
        if !skip {
            out.push_str(&text.text);
        }
        return;
    }
    if node.is_line_break() {
        out.push('\n');
        return;
    }
    let children = store.get_children(key);
    for (index, child) in children.iter().enumerate() {
        write_text_content(store, *child, options, out);
        let is_block_element = store
            .get_node(*child)
            .map(|child| child.is_element() && !child.is_inline())
            .unwrap_or(false);
        if is_block_element && index + 1 != children.len() {
            out.push_str(DOUBLE_LINE_BREAK);
        }
    }
}

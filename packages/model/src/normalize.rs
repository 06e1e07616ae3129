//! Commit-time passes: text normalization and garbage collection

use crate::editor::Editor;
use crate::errors::EditorResult;
use crate::node::NodeBehavior;
use crate::store::NodeStore;
use crate::NodeKey;
use tracing::{debug, trace};

impl Editor {
    /// Drop empty simple text and merge neighbours that share format and style
    pub(crate) fn normalize_dirty_text(&mut self) -> EditorResult<()> {
        let dirty: Vec<NodeKey> = self.pending_mut()?.dirty_leaves.iter().copied().collect();
        let mut merged = 0usize;
        for key in dirty {
            if self.is_normalizable(key) && self.is_attached(key) {
                merged += self.normalize_text_node(key)?;
            }
        }
        if merged > 0 {
            debug!(merged, "normalized text nodes");
        }
        Ok(())
    }

    fn is_normalizable(&self, key: NodeKey) -> bool {
        self.get_node(key)
            .and_then(|node| node.as_text())
            .map(|text| text.is_simple_text() && !text.detail.unmergeable)
            .unwrap_or(false)
    }

    fn is_empty_text(&self, key: NodeKey) -> bool {
        self.get_node(key)
            .and_then(|node| node.as_text())
            .map(|text| text.text.is_empty())
            .unwrap_or(false)
    }

    fn can_merge(&self, first: NodeKey, second: NodeKey) -> bool {
        match (
            self.get_node(first).and_then(|n| n.as_text()),
            self.get_node(second).and_then(|n| n.as_text()),
        ) {
            (Some(a), Some(b)) => a.can_merge_with(b),
            _ => false,
        }
    }

    /// Append `second`'s text to `first` and remove `second`
    fn merge_text_nodes(&mut self, first: NodeKey, second: NodeKey) -> EditorResult<NodeKey> {
        let appended = self.node(second)?.as_text().map(|t| t.text.clone()).unwrap_or_default();
        let size = self.node(first)?.text_size();
        self.splice_text(first, size, 0, &appended)?;
        self.remove(second)?;
        trace!(into = %first, from = %second, "merged text nodes");
        Ok(first)
    }

    fn normalize_text_node(&mut self, key: NodeKey) -> EditorResult<usize> {
        if self.is_empty_text(key) {
            self.remove(key)?;
            return Ok(1);
        }
        let mut node = key;
        let mut merged = 0;

        while let Some(previous) = self.get_previous_sibling(node) {
            if !self.is_normalizable(previous) {
                break;
            }
            if self.is_empty_text(previous) {
                self.remove(previous)?;
                merged += 1;
            } else if self.can_merge(previous, node) {
                node = self.merge_text_nodes(previous, node)?;
                merged += 1;
                break;
            } else {
                break;
            }
        }

        while let Some(next) = self.get_next_sibling(node) {
            if !self.is_normalizable(next) {
                break;
            }
            if self.is_empty_text(next) {
                self.remove(next)?;
                merged += 1;
            } else if self.can_merge(node, next) {
                self.merge_text_nodes(node, next)?;
                merged += 1;
                break;
            } else {
                break;
            }
        }
        Ok(merged)
    }

    /// Remove every dirty node that is no longer attached, with its subtree
    pub(crate) fn collect_garbage(&mut self) -> Vec<NodeKey> {
        let Ok(pending) = self.pending_mut() else {
            return Vec::new();
        };
        let candidates: Vec<NodeKey> = pending
            .dirty_leaves
            .iter()
            .chain(pending.dirty_elements.iter())
            .copied()
            .collect();

        let mut removed = Vec::new();
        for key in candidates {
            if key.is_root() || !self.has_node(key) || self.is_attached(key) {
                continue;
            }
            let mut stack = vec![key];
            while let Some(current) = stack.pop() {
                // Children moved elsewhere keep living under their new parent
                let owned: Vec<NodeKey> = self
                    .get_children(current)
                    .iter()
                    .copied()
                    .filter(|child| self.get_parent(*child) == Some(current))
                    .collect();
                stack.extend(owned);
                if let Ok(pending) = self.pending_mut() {
                    if pending.state.registry.remove(&current).is_some() {
                        removed.push(current);
                    }
                }
            }
        }
        if !removed.is_empty() {
            removed.sort();
            debug!(removed = removed.len(), "collected detached nodes");
        }
        removed
    }
}

//! Structural and text mutations
//!
//! Every attach detaches the node from its previous parent first, so a node is
//! never listed under two parents. Detached nodes stay in the registry until
//! commit collects them.

use crate::editor::Editor;
use crate::errors::{EditorError, EditorResult};
use crate::node::{NodeBehavior, TextData, TextDetail, TextFormat, TextMode};
use crate::store::NodeStore;
use crate::text::{char_len, splice_chars};
use crate::NodeKey;
use tracing::trace;

impl Editor {
    /// Unlink `key` from its parent, if it has one
    pub fn detach(&mut self, key: NodeKey) -> EditorResult<()> {
        let Some(parent) = self.node(key)?.parent else {
            return Ok(());
        };
        if let Some(element) = self.get_writable(parent)?.element_mut() {
            element.children.retain(|child| *child != key);
        }
        self.get_writable(key)?.parent = None;
        Ok(())
    }

    /// Check that `key` may become a child of `parent`
    pub fn ensure_can_attach(&self, key: NodeKey, parent: NodeKey) -> EditorResult<()> {
        self.node(key)?;
        if key.is_root() {
            return Err(EditorError::InvalidStructure(
                "the root cannot be attached to another node".into(),
            ));
        }
        if !self.node(parent)?.is_element() {
            return Err(EditorError::NotAnElement(parent));
        }
        if key == parent || self.is_ancestor_of(key, parent) {
            return Err(EditorError::CycleDetected { node: key, parent });
        }
        Ok(())
    }

    pub fn append(&mut self, parent: NodeKey, key: NodeKey) -> EditorResult<()> {
        self.append_all(parent, &[key])
    }

    pub fn append_all(&mut self, parent: NodeKey, keys: &[NodeKey]) -> EditorResult<()> {
        let size = self.get_children_size(parent);
        self.splice_children(parent, size, 0, keys)
    }

    /// Remove `delete_count` children at `start` and insert `keys` in their place
    ///
    /// Inserted nodes are detached from wherever they were, including from
    /// `parent` itself. An element left empty that cannot be empty is removed.
    pub fn splice_children(
        &mut self,
        parent: NodeKey,
        start: usize,
        delete_count: usize,
        keys: &[NodeKey],
    ) -> EditorResult<()> {
        if !self.node(parent)?.is_element() {
            return Err(EditorError::NotAnElement(parent));
        }
        let size = self.get_children_size(parent);
        let end = start
            .checked_add(delete_count)
            .filter(|end| *end <= size)
            .ok_or_else(|| {
                EditorError::InvalidStructure(format!(
                    "splice of {delete_count} children at {start} exceeds {size} children of {parent}"
                ))
            })?;
        for (index, key) in keys.iter().enumerate() {
            self.ensure_can_attach(*key, parent)?;
            if keys[..index].contains(key) {
                return Err(EditorError::InvalidStructure(format!(
                    "{key} is inserted twice"
                )));
            }
        }

        let deleted: Vec<NodeKey> = self.get_children(parent)[start..end].to_vec();
        for key in &deleted {
            self.detach(*key)?;
        }

        // Nodes being moved from in front of the insertion point shift it left
        let shift = self.get_children(parent)[..start]
            .iter()
            .filter(|child| keys.contains(child))
            .count();
        let insert_at = start - shift;

        for key in keys {
            self.detach(*key)?;
        }
        if let Some(element) = self.get_writable(parent)?.element_mut() {
            element
                .children
                .splice(insert_at..insert_at, keys.iter().copied());
        }
        for key in keys {
            self.get_writable(*key)?.parent = Some(parent);
        }
        trace!(
            parent = %parent,
            start,
            deleted = deleted.len(),
            inserted = keys.len(),
            "spliced children"
        );

        self.remove_if_emptied(parent)
    }

    pub fn insert_before(&mut self, target: NodeKey, key: NodeKey) -> EditorResult<()> {
        let (parent, index) = self.position_of(target)?;
        self.splice_children(parent, index, 0, &[key])
    }

    pub fn insert_after(&mut self, target: NodeKey, key: NodeKey) -> EditorResult<()> {
        let (parent, index) = self.position_of(target)?;
        self.splice_children(parent, index + 1, 0, &[key])
    }

    fn position_of(&self, target: NodeKey) -> EditorResult<(NodeKey, usize)> {
        self.node(target)?;
        if target.is_root() {
            return Err(EditorError::InvalidStructure(
                "cannot insert next to the root".into(),
            ));
        }
        let parent = self.get_parent(target).ok_or(EditorError::NoParent(target))?;
        let index = self
            .get_index_within_parent(target)
            .ok_or(EditorError::NoParent(target))?;
        Ok((parent, index))
    }

    pub fn remove(&mut self, key: NodeKey) -> EditorResult<()> {
        self.remove_with(key, false)
    }

    /// Detach `key`; unless `preserve_empty_parent`, a parent that cannot be
    /// empty and was left empty goes too
    pub fn remove_with(&mut self, key: NodeKey, preserve_empty_parent: bool) -> EditorResult<()> {
        if key.is_root() {
            return Err(EditorError::InvalidStructure(
                "the root cannot be removed".into(),
            ));
        }
        let Some(parent) = self.node(key)?.parent else {
            return Ok(());
        };
        self.detach(key)?;
        trace!(key = %key, parent = %parent, "removed node");
        if preserve_empty_parent {
            return Ok(());
        }
        self.remove_if_emptied(parent)
    }

    fn remove_if_emptied(&mut self, key: NodeKey) -> EditorResult<()> {
        let Some(element) = self.node(key)?.as_element() else {
            return Ok(());
        };
        if element.is_empty() && !element.can_be_empty && !self.is_root_or_shadow_root(key) {
            self.remove(key)?;
        }
        Ok(())
    }

    /// Put `replacement` where `key` is; with `include_children` the old
    /// node's children move to the end of `replacement`
    pub fn replace(
        &mut self,
        key: NodeKey,
        replacement: NodeKey,
        include_children: bool,
    ) -> EditorResult<()> {
        if key == replacement {
            return Ok(());
        }
        let (parent, _) = self.position_of(key)?;
        self.ensure_can_attach(replacement, parent)?;
        if include_children && !self.node(replacement)?.is_element() {
            return Err(EditorError::NotAnElement(replacement));
        }
        let children: Vec<NodeKey> = if include_children {
            self.get_children(key).to_vec()
        } else {
            Vec::new()
        };

        self.detach(replacement)?;
        let index = self
            .get_index_within_parent(key)
            .ok_or(EditorError::NoParent(key))?;
        self.splice_children(parent, index, 1, &[replacement])?;
        if !children.is_empty() {
            self.append_all(replacement, &children)?;
        }
        Ok(())
    }

    /// Detach every child; the element itself stays even if it cannot be empty
    pub fn clear_children(&mut self, key: NodeKey) -> EditorResult<()> {
        if !self.node(key)?.is_element() {
            return Err(EditorError::NotAnElement(key));
        }
        let children = self.get_children(key).to_vec();
        for child in children {
            self.detach(child)?;
        }
        Ok(())
    }

    fn writable_text(&mut self, key: NodeKey) -> EditorResult<&mut TextData> {
        if !self.node(key)?.is_text() {
            return Err(EditorError::NotText(key));
        }
        self.get_writable(key)?
            .text_mut()
            .ok_or(EditorError::NotText(key))
    }

    pub fn set_text_content(&mut self, key: NodeKey, text: &str) -> EditorResult<()> {
        self.writable_text(key)?.text = text.to_string();
        Ok(())
    }

    /// Replace `delete_count` chars at `offset` with `insert`
    pub fn splice_text(
        &mut self,
        key: NodeKey,
        offset: usize,
        delete_count: usize,
        insert: &str,
    ) -> EditorResult<()> {
        let size = self.node(key)?.as_text().map(TextData::size).ok_or(EditorError::NotText(key))?;
        if offset > size {
            return Err(EditorError::OffsetOutOfRange { key, offset, size });
        }
        let data = self.writable_text(key)?;
        data.text = splice_chars(&data.text, offset, delete_count, insert);
        trace!(key = %key, offset, delete_count, size = char_len(insert), "spliced text");
        Ok(())
    }

    pub fn set_text_format(&mut self, key: NodeKey, format: TextFormat) -> EditorResult<()> {
        self.writable_text(key)?.format = format;
        Ok(())
    }

    pub fn toggle_format(&mut self, key: NodeKey, format: TextFormat) -> EditorResult<()> {
        self.writable_text(key)?.format.toggle(format);
        Ok(())
    }

    pub fn set_text_style(&mut self, key: NodeKey, style: &str) -> EditorResult<()> {
        self.writable_text(key)?.style = style.to_string();
        Ok(())
    }

    pub fn set_text_mode(&mut self, key: NodeKey, mode: TextMode) -> EditorResult<()> {
        self.writable_text(key)?.mode = mode;
        Ok(())
    }

    pub fn set_text_detail(&mut self, key: NodeKey, detail: TextDetail) -> EditorResult<()> {
        self.writable_text(key)?.detail = detail;
        Ok(())
    }
}

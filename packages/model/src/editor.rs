//! # Editor
//!
//! Owns the arena, the committed [`EditorState`] and at most one pending
//! update. All writes go through [`Editor::update`] (or the explicit
//! `begin_update` / `commit` / `discard` form):
//!
//! ```text
//! begin_update ──► pending = committed.clone()
//!       │
//!       ▼
//!  get_writable(key) ──► first write clones the node into a new slot
//!       │
//!       ▼
//! commit ──► normalize dirty text ──► collect detached nodes ──► committed = pending
//!
//! discard ──► drop pending, release the slots it allocated
//! ```

use crate::arena::{Arena, SlotId};
use crate::errors::{EditorError, EditorResult};
use crate::node::{
    DecoratorData, ElementData, Node, NodeBehavior, NodeKind, TextData,
};
use crate::state::{EditorState, NodeRef, StateReader};
use crate::store::NodeStore;
use crate::NodeKey;
use std::collections::BTreeSet;
use tracing::{debug, instrument, trace};

/// Model-level switches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelConfig {
    /// Merge adjacent simple text nodes and drop empty ones on commit
    pub normalize_text: bool,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            normalize_text: true,
        }
    }
}

/// What a commit changed, for whoever reconciles the rendered view
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommitSummary {
    pub version: u64,
    pub dirty_elements: Vec<NodeKey>,
    pub dirty_leaves: Vec<NodeKey>,
    /// Keys dropped from the registry by garbage collection
    pub removed: Vec<NodeKey>,
}

#[derive(Debug)]
pub(crate) struct PendingUpdate {
    pub(crate) state: EditorState,
    cloned: BTreeSet<NodeKey>,
    pub(crate) dirty_elements: BTreeSet<NodeKey>,
    pub(crate) dirty_leaves: BTreeSet<NodeKey>,
    arena_len: usize,
}

#[derive(Debug)]
pub struct Editor {
    arena: Arena,
    committed: EditorState,
    pending: Option<PendingUpdate>,
    next_key: u32,
    next_version: u64,
    config: ModelConfig,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}

impl Editor {
    pub fn new() -> Self {
        Self::with_config(ModelConfig::default())
    }

    pub fn with_config(config: ModelConfig) -> Self {
        let mut arena = Arena::new();
        let root_slot = arena.alloc(Node::new(
            NodeKey::ROOT,
            NodeKind::Root(ElementData::root()),
        ));
        Self {
            arena,
            committed: EditorState::with_root(root_slot),
            pending: None,
            next_key: 1,
            next_version: 1,
            config,
        }
    }

    pub fn config(&self) -> ModelConfig {
        self.config
    }

    pub fn set_config(&mut self, config: ModelConfig) {
        self.config = config;
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    /// The last committed snapshot
    pub fn state(&self) -> &EditorState {
        &self.committed
    }

    /// Read access to any snapshot produced by this editor
    pub fn reader<'a>(&'a self, state: &'a EditorState) -> StateReader<'a> {
        StateReader::new(&self.arena, state)
    }

    /// Pending state inside an update, committed state otherwise
    pub fn active_state(&self) -> &EditorState {
        self.pending
            .as_ref()
            .map(|pending| &pending.state)
            .unwrap_or(&self.committed)
    }

    pub fn is_updating(&self) -> bool {
        self.pending.is_some()
    }

    /// Replace the committed state with an earlier snapshot of this editor
    pub fn set_state(&mut self, state: EditorState) -> EditorResult<()> {
        if self.pending.is_some() {
            return Err(EditorError::ReentrantUpdate);
        }
        debug!(version = state.version, "restoring editor state");
        self.committed = state;
        Ok(())
    }

    /// Run `f` as one update: commit on `Ok`, discard everything on `Err`
    pub fn update<T>(
        &mut self,
        f: impl FnOnce(&mut Editor) -> EditorResult<T>,
    ) -> EditorResult<T> {
        self.update_with_summary(f).map(|(value, _)| value)
    }

    pub fn update_with_summary<T>(
        &mut self,
        f: impl FnOnce(&mut Editor) -> EditorResult<T>,
    ) -> EditorResult<(T, CommitSummary)> {
        self.begin_update()?;
        match f(self) {
            Ok(value) => {
                let summary = self.commit()?;
                Ok((value, summary))
            }
            Err(err) => {
                debug!(error = %err, "update failed, discarding");
                self.discard();
                Err(err)
            }
        }
    }

    /// Read-only scope over the active state
    pub fn read<T>(&self, f: impl FnOnce(&Editor) -> T) -> T {
        f(self)
    }

    pub fn begin_update(&mut self) -> EditorResult<()> {
        if self.pending.is_some() {
            return Err(EditorError::ReentrantUpdate);
        }
        self.pending = Some(PendingUpdate {
            state: self.committed.clone(),
            cloned: BTreeSet::new(),
            dirty_elements: BTreeSet::new(),
            dirty_leaves: BTreeSet::new(),
            arena_len: self.arena.len(),
        });
        trace!(version = self.committed.version, "update started");
        Ok(())
    }

    #[instrument(level = "debug", skip(self))]
    pub fn commit(&mut self) -> EditorResult<CommitSummary> {
        if self.pending.is_none() {
            return Err(EditorError::NoActiveUpdate);
        }
        if self.config.normalize_text {
            if let Err(err) = self.normalize_dirty_text() {
                self.discard();
                return Err(err);
            }
        }
        let removed = self.collect_garbage();

        let pending = self.pending.take().ok_or(EditorError::NoActiveUpdate)?;
        let mut state = pending.state;
        state.version = self.next_version;
        self.next_version += 1;
        self.committed = state;

        let summary = CommitSummary {
            version: self.committed.version,
            dirty_elements: pending.dirty_elements.into_iter().collect(),
            dirty_leaves: pending.dirty_leaves.into_iter().collect(),
            removed,
        };
        debug!(
            version = summary.version,
            dirty_elements = summary.dirty_elements.len(),
            dirty_leaves = summary.dirty_leaves.len(),
            removed = summary.removed.len(),
            "committed update"
        );
        Ok(summary)
    }

    /// Drop the pending update, including every slot it allocated
    pub fn discard(&mut self) {
        if let Some(pending) = self.pending.take() {
            debug!(
                released = self.arena.len() - pending.arena_len,
                "discarded update"
            );
            self.arena.truncate(pending.arena_len);
        }
    }

    /// Capture the current version of `key`
    pub fn node_ref(&self, key: NodeKey) -> Option<NodeRef> {
        self.active_state()
            .slot(key)
            .map(|slot| NodeRef { key, slot })
    }

    /// The exact version a reference captured
    pub fn read_ref(&self, node_ref: &NodeRef) -> EditorResult<&Node> {
        self.arena
            .get(node_ref.slot)
            .filter(|node| node.key == node_ref.key)
            .ok_or(EditorError::StaleReference(node_ref.key))
    }

    /// The version of a referenced node in the active state
    pub fn get_latest(&self, node_ref: &NodeRef) -> Option<&Node> {
        self.get_node(node_ref.key)
    }

    /// Writable access to `key` inside an update
    ///
    /// The first write to a node in an update clones it into a new slot. The
    /// node is marked dirty and its ancestors are marked as dirty elements.
    pub fn get_writable(&mut self, key: NodeKey) -> EditorResult<&mut Node> {
        let slot = self.writable_slot(key)?;
        self.arena
            .get_mut(slot)
            .ok_or(EditorError::StaleReference(key))
    }

    fn writable_slot(&mut self, key: NodeKey) -> EditorResult<SlotId> {
        if self.pending.is_none() {
            return Err(EditorError::NoActiveUpdate);
        }
        let node = self.node(key)?;
        let is_element = node.is_element();
        let ancestors = self.get_parents(key);

        let Editor { arena, pending, .. } = self;
        let pending = pending.as_mut().ok_or(EditorError::NoActiveUpdate)?;
        let current = pending
            .state
            .slot(key)
            .ok_or(EditorError::NodeNotFound(key))?;

        let slot = if pending.cloned.contains(&key) {
            current
        } else {
            let copy = arena
                .get(current)
                .cloned()
                .ok_or(EditorError::StaleReference(key))?;
            let slot = arena.alloc(copy);
            pending.state.registry.insert(key, slot);
            pending.cloned.insert(key);
            trace!(key = %key, "cloned node for write");
            slot
        };

        if is_element {
            pending.dirty_elements.insert(key);
        } else {
            pending.dirty_leaves.insert(key);
        }
        pending.dirty_elements.extend(ancestors);
        Ok(slot)
    }

    fn create_node(&mut self, kind: NodeKind) -> EditorResult<NodeKey> {
        let pending = self.pending.as_mut().ok_or(EditorError::NoActiveUpdate)?;
        let key = NodeKey::new(self.next_key);
        self.next_key += 1;

        let is_element = matches!(kind, NodeKind::Element(_));
        let slot = self.arena.alloc(Node::new(key, kind));
        pending.state.registry.insert(key, slot);
        pending.cloned.insert(key);
        if is_element {
            pending.dirty_elements.insert(key);
        } else {
            pending.dirty_leaves.insert(key);
        }
        trace!(key = %key, "created node");
        Ok(key)
    }

    pub fn create_element(&mut self, data: ElementData) -> EditorResult<NodeKey> {
        self.create_node(NodeKind::Element(data))
    }

    pub fn create_paragraph(&mut self) -> EditorResult<NodeKey> {
        self.create_element(ElementData::paragraph())
    }

    pub fn create_text(&mut self, text: &str) -> EditorResult<NodeKey> {
        self.create_text_with(TextData::new(text))
    }

    pub fn create_text_with(&mut self, data: TextData) -> EditorResult<NodeKey> {
        self.create_node(NodeKind::Text(data))
    }

    pub fn create_line_break(&mut self) -> EditorResult<NodeKey> {
        self.create_node(NodeKind::LineBreak)
    }

    pub fn create_decorator(&mut self, data: DecoratorData) -> EditorResult<NodeKey> {
        self.create_node(NodeKind::Decorator(data))
    }

    pub(crate) fn pending_mut(&mut self) -> EditorResult<&mut PendingUpdate> {
        self.pending.as_mut().ok_or(EditorError::NoActiveUpdate)
    }
}

impl NodeStore for Editor {
    fn get_node(&self, key: NodeKey) -> Option<&Node> {
        self.active_state()
            .slot(key)
            .and_then(|slot| self.arena.get(slot))
    }

    fn node_keys(&self) -> Vec<NodeKey> {
        self.active_state().keys()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_editor_has_root() {
        let editor = Editor::new();
        assert!(editor.has_node(NodeKey::ROOT));
        assert!(editor.get_node(NodeKey::ROOT).map(|n| n.is_root()).unwrap_or(false));
        assert_eq!(editor.state().version(), 0);
        assert!(!editor.is_updating());
    }

    #[test]
    fn test_mutation_outside_update_fails() {
        let mut editor = Editor::new();
        assert_eq!(editor.create_paragraph(), Err(EditorError::NoActiveUpdate));
        assert_eq!(
            editor.get_writable(NodeKey::ROOT).map(|_| ()),
            Err(EditorError::NoActiveUpdate)
        );
    }

    #[test]
    fn test_reentrant_update_fails() {
        let mut editor = Editor::new();
        let result = editor.update(|editor| editor.begin_update());
        assert_eq!(result, Err(EditorError::ReentrantUpdate));
        assert!(!editor.is_updating());
    }

    #[test]
    fn test_discard_releases_slots() {
        let mut editor = Editor::new();
        let before = editor.arena().len();

        let result: EditorResult<()> = editor.update(|editor| {
            let paragraph = editor.create_paragraph()?;
            editor.append(NodeKey::ROOT, paragraph)?;
            Err(EditorError::InvalidStructure("abort".into()))
        });

        assert!(result.is_err());
        assert_eq!(editor.arena().len(), before);
        assert_eq!(editor.get_children_size(NodeKey::ROOT), 0);
        assert_eq!(editor.state().version(), 0);
    }

    #[test]
    fn test_first_write_clones_once() {
        let mut editor = Editor::new();
        editor
            .update(|editor| {
                let text = editor.create_text("a")?;
                editor.append(NodeKey::ROOT, text)
            })
            .unwrap();

        let root_slot = editor.state().slot(NodeKey::ROOT).unwrap();
        editor.begin_update().unwrap();
        editor.get_writable(NodeKey::ROOT).unwrap();
        let cloned = editor.active_state().slot(NodeKey::ROOT).unwrap();
        editor.get_writable(NodeKey::ROOT).unwrap();
        assert_ne!(root_slot, cloned);
        assert_eq!(editor.active_state().slot(NodeKey::ROOT), Some(cloned));
        editor.discard();
        assert_eq!(editor.state().slot(NodeKey::ROOT), Some(root_slot));
    }

    #[test]
    fn test_versions_increase() {
        let mut editor = Editor::new();
        editor.update(|_| Ok(())).unwrap();
        editor.update(|_| Ok(())).unwrap();
        assert_eq!(editor.state().version(), 2);
    }
}

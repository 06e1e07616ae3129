//! Registry snapshots

use crate::arena::{Arena, SlotId};
use crate::store::NodeStore;
use crate::{Node, NodeKey};
use std::collections::HashMap;

/// One version of the document: which arena slot holds each live key
///
/// Cloning a state clones the registry only; node versions are shared through
/// the arena.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorState {
    pub(crate) registry: HashMap<NodeKey, SlotId>,
    pub(crate) version: u64,
}

impl EditorState {
    pub(crate) fn with_root(root_slot: SlotId) -> Self {
        let mut registry = HashMap::new();
        registry.insert(NodeKey::ROOT, root_slot);
        Self {
            registry,
            version: 0,
        }
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    pub fn contains(&self, key: NodeKey) -> bool {
        self.registry.contains_key(&key)
    }

    pub fn slot(&self, key: NodeKey) -> Option<SlotId> {
        self.registry.get(&key).copied()
    }

    /// Live keys, sorted
    pub fn keys(&self) -> Vec<NodeKey> {
        let mut keys: Vec<NodeKey> = self.registry.keys().copied().collect();
        keys.sort();
        keys
    }
}

/// A captured reference to one version of a node
///
/// Reading through a `NodeRef` keeps returning the version it captured even
/// after later updates clone the node; `Editor::get_latest` re-resolves it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeRef {
    pub(crate) key: NodeKey,
    pub(crate) slot: SlotId,
}

impl NodeRef {
    pub fn key(&self) -> NodeKey {
        self.key
    }

    pub fn slot(&self) -> SlotId {
        self.slot
    }
}

/// Read-only view over any snapshot produced by the same editor
#[derive(Debug, Clone, Copy)]
pub struct StateReader<'a> {
    arena: &'a Arena,
    state: &'a EditorState,
}

impl<'a> StateReader<'a> {
    pub fn new(arena: &'a Arena, state: &'a EditorState) -> Self {
        Self { arena, state }
    }

    pub fn state(&self) -> &'a EditorState {
        self.state
    }
}

impl<'a> NodeStore for StateReader<'a> {
    fn get_node(&self, key: NodeKey) -> Option<&Node> {
        self.state.slot(key).and_then(|slot| self.arena.get(slot))
    }

    fn node_keys(&self) -> Vec<NodeKey> {
        self.state.keys()
    }
}

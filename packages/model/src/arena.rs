//! Append-only storage for node versions

use crate::Node;

/// Index of one node version inside an [`Arena`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotId(u32);

impl SlotId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Every node version ever written by an editor
///
/// Slots are never rewritten: a copy-on-write clone goes into a new slot and
/// older snapshots keep pointing at the old one. Only the slots allocated by a
/// discarded update are released (see [`Arena::truncate`]).
#[derive(Debug, Default, Clone)]
pub struct Arena {
    slots: Vec<Node>,
}

impl Arena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self, node: Node) -> SlotId {
        let slot = SlotId(self.slots.len() as u32);
        self.slots.push(node);
        slot
    }

    pub fn get(&self, slot: SlotId) -> Option<&Node> {
        self.slots.get(slot.index())
    }

    pub(crate) fn get_mut(&mut self, slot: SlotId) -> Option<&mut Node> {
        self.slots.get_mut(slot.index())
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Drop every slot from `len` on
    pub(crate) fn truncate(&mut self, len: usize) {
        self.slots.truncate(len);
    }
}

//! # Carets
//!
//! A caret is a directional pointer anchored at an origin node:
//!
//! ```text
//!            Child { P, Next }         Child { P, Previous }
//!                  │                          │
//!                  ▼                          ▼
//!   P: [ a ]   [ b ]   [ c ]   ...   [ y ]   [ z ]
//!          ▲ Sibling { a, Next } points at b
//!          Sibling { b, Previous } points at a
//! ```
//!
//! A `TextPoint` caret is a sibling caret on a text node that also carries a
//! char offset into it. Carets hold keys only: they are values computed
//! against a store, never stored across updates.

use folio_model::{Editor, EditorError, EditorResult, NodeBehavior, NodeKey, NodeStore};
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Next,
    Previous,
}

impl Direction {
    pub fn flip(self) -> Self {
        match self {
            Direction::Next => Direction::Previous,
            Direction::Previous => Direction::Next,
        }
    }

    pub fn is_next(self) -> bool {
        self == Direction::Next
    }
}

/// Where upward traversal stops
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RootMode {
    /// Stop at the document root
    #[default]
    Root,
    /// Also stop at shadow roots (table cells and the like)
    ShadowRoot,
}

/// Equality is structural: kind, direction and origin, plus the offset for
/// text point carets. Use [`Caret::is_same_node_caret`] to ignore offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Caret {
    Sibling {
        origin: NodeKey,
        direction: Direction,
    },
    Child {
        origin: NodeKey,
        direction: Direction,
    },
    TextPoint {
        origin: NodeKey,
        direction: Direction,
        offset: usize,
    },
}

impl Caret {
    pub fn sibling(origin: NodeKey, direction: Direction) -> Self {
        Caret::Sibling { origin, direction }
    }

    pub fn child(origin: NodeKey, direction: Direction) -> Self {
        Caret::Child { origin, direction }
    }

    pub fn text_point(origin: NodeKey, direction: Direction, offset: usize) -> Self {
        Caret::TextPoint {
            origin,
            direction,
            offset,
        }
    }

    pub fn origin(&self) -> NodeKey {
        match *self {
            Caret::Sibling { origin, .. }
            | Caret::Child { origin, .. }
            | Caret::TextPoint { origin, .. } => origin,
        }
    }

    pub fn direction(&self) -> Direction {
        match *self {
            Caret::Sibling { direction, .. }
            | Caret::Child { direction, .. }
            | Caret::TextPoint { direction, .. } => direction,
        }
    }

    /// Char offset of a text point caret
    pub fn offset(&self) -> Option<usize> {
        match *self {
            Caret::TextPoint { offset, .. } => Some(offset),
            _ => None,
        }
    }

    pub fn is_sibling(&self) -> bool {
        matches!(self, Caret::Sibling { .. })
    }

    pub fn is_child(&self) -> bool {
        matches!(self, Caret::Child { .. })
    }

    pub fn is_text_point(&self) -> bool {
        matches!(self, Caret::TextPoint { .. })
    }

    /// The node this caret points at, `None` at a boundary
    pub fn node_at_caret<S: NodeStore + ?Sized>(&self, store: &S) -> Option<NodeKey> {
        match *self {
            Caret::Sibling { origin, direction } | Caret::TextPoint { origin, direction, .. } => {
                match direction {
                    Direction::Next => store.get_next_sibling(origin),
                    Direction::Previous => store.get_previous_sibling(origin),
                }
            }
            Caret::Child { origin, direction } => match direction {
                Direction::Next => store.get_first_child(origin),
                Direction::Previous => store.get_last_child(origin),
            },
        }
    }

    /// The element whose children this caret moves through
    pub fn parent_at_caret<S: NodeStore + ?Sized>(&self, store: &S) -> Option<NodeKey> {
        match *self {
            Caret::Child { origin, .. } => Some(origin),
            _ => store.get_parent(self.origin()),
        }
    }

    /// Sibling caret on the node this caret points at
    pub fn adjacent_caret<S: NodeStore + ?Sized>(&self, store: &S) -> Option<Caret> {
        self.node_at_caret(store)
            .map(|node| Caret::sibling(node, self.direction()))
    }

    /// Lazy walk over the successive adjacent carets
    pub fn iter<'a, S: NodeStore + ?Sized>(&self, store: &'a S) -> AdjacentCarets<'a, S> {
        AdjacentCarets {
            store,
            current: Some(*self),
        }
    }

    /// Sibling caret at the logical parent; `None` at the root (and at shadow
    /// roots with [`RootMode::ShadowRoot`])
    pub fn parent_caret<S: NodeStore + ?Sized>(&self, store: &S, mode: RootMode) -> Option<Caret> {
        let parent = self.parent_at_caret(store)?;
        let stops = match mode {
            RootMode::Root => parent.is_root(),
            RootMode::ShadowRoot => store.is_root_or_shadow_root(parent),
        };
        if stops {
            None
        } else {
            Some(Caret::sibling(parent, self.direction()))
        }
    }

    /// Same position seen from the other side
    ///
    /// `flipped(flipped(c)) == c` for every caret with a parent.
    pub fn flipped<S: NodeStore + ?Sized>(&self, store: &S) -> EditorResult<Caret> {
        let direction = self.direction().flip();
        match *self {
            Caret::TextPoint { origin, offset, .. } => {
                Ok(Caret::text_point(origin, direction, offset))
            }
            Caret::Sibling { origin, .. } => match self.node_at_caret(store) {
                Some(node) => Ok(Caret::sibling(node, direction)),
                None => {
                    let parent = store
                        .get_parent(origin)
                        .ok_or(EditorError::NoParent(origin))?;
                    Ok(Caret::child(parent, direction))
                }
            },
            Caret::Child { origin, .. } => Ok(match self.node_at_caret(store) {
                Some(node) => Caret::sibling(node, direction),
                None => Caret::child(origin, direction),
            }),
        }
    }

    /// Child caret into the origin, if the origin is an element
    pub fn child_caret<S: NodeStore + ?Sized>(&self, store: &S) -> Option<Caret> {
        match *self {
            Caret::Child { .. } => Some(*self),
            Caret::Sibling { origin, direction } => store
                .get_node(origin)
                .filter(|node| node.is_element())
                .map(|_| Caret::child(origin, direction)),
            Caret::TextPoint { .. } => None,
        }
    }

    pub fn sibling_caret(&self) -> Caret {
        Caret::sibling(self.origin(), self.direction())
    }

    /// Same kind (text points count as siblings), direction and origin
    pub fn is_same_node_caret(&self, other: &Caret) -> bool {
        let same_kind = match (self, other) {
            (Caret::Child { .. }, Caret::Child { .. }) => true,
            (Caret::Child { .. }, _) | (_, Caret::Child { .. }) => false,
            _ => true,
        };
        same_kind && self.direction() == other.direction() && self.origin() == other.origin()
    }

    pub fn is_same_point_caret(&self, other: &Caret) -> bool {
        self == other
    }

    /// Whether the origin is still attached to the document
    pub fn is_attached<S: NodeStore + ?Sized>(&self, store: &S) -> bool {
        store.is_attached(self.origin())
    }

    /// Insert `node` at the caret: after/before the origin for sibling carets,
    /// as first/last child for child carets
    pub fn insert(&self, editor: &mut Editor, node: NodeKey) -> EditorResult<Caret> {
        match *self {
            Caret::Sibling { origin, direction } | Caret::TextPoint { origin, direction, .. } => {
                match direction {
                    Direction::Next => editor.insert_after(origin, node)?,
                    Direction::Previous => editor.insert_before(origin, node)?,
                }
            }
            Caret::Child { origin, direction } => match direction {
                Direction::Next => editor.splice_children(origin, 0, 0, &[node])?,
                Direction::Previous => editor.append(origin, node)?,
            },
        }
        Ok(*self)
    }

    /// Remove the node at the caret, if any
    pub fn remove(&self, editor: &mut Editor) -> EditorResult<Caret> {
        if let Some(target) = self.node_at_caret(&*editor) {
            editor.remove(target)?;
        }
        Ok(*self)
    }

    /// Replace the node at the caret with `node`, or insert it at a boundary
    pub fn replace_or_insert(
        &self,
        editor: &mut Editor,
        node: NodeKey,
        include_children: bool,
    ) -> EditorResult<Caret> {
        let target = self.node_at_caret(&*editor);
        if node == self.origin() || Some(node) == target {
            return Ok(*self);
        }
        match target {
            Some(target) => editor.replace(target, node, include_children)?,
            None => {
                self.insert(editor, node)?;
            }
        }
        Ok(*self)
    }

    /// Remove `delete_count` nodes in the caret's direction and put `nodes` in
    /// their place
    ///
    /// `nodes` are given in `nodes_direction` order. Nodes are placed over the
    /// queued removals first; once the queue is exhausted the rest is inserted.
    pub fn splice(
        &self,
        editor: &mut Editor,
        delete_count: usize,
        nodes: &[NodeKey],
        nodes_direction: Direction,
    ) -> EditorResult<Caret> {
        let direction = self.direction();
        let parent = self.parent_at_caret(&*editor);

        let mut to_remove: Vec<NodeKey> = self
            .iter(&*editor)
            .take(delete_count)
            .map(|caret| caret.origin())
            .collect();

        let ordered: Vec<NodeKey> = if nodes_direction == direction {
            nodes.to_vec()
        } else {
            nodes.iter().rev().copied().collect()
        };

        let mut caret = *self;
        for node in ordered {
            if to_remove.is_empty() {
                caret.insert(editor, node)?;
            } else {
                let target = caret
                    .node_at_caret(&*editor)
                    .ok_or_else(|| EditorError::SpliceUnderflow(to_remove.clone()))?;
                to_remove.retain(|key| *key != target && *key != node);
                if target != node && caret.origin() != node {
                    if parent.is_some() && editor.get_parent(node) == parent {
                        editor.remove(node)?;
                    }
                    editor.replace(target, node, false)?;
                }
            }
            caret = Caret::sibling(node, direction);
        }

        for key in &to_remove {
            editor.remove(*key)?;
        }
        trace!(
            origin = %self.origin(),
            delete_count,
            inserted = nodes.len(),
            "spliced at caret"
        );
        Ok(*self)
    }
}

/// Iterator over [`Caret::adjacent_caret`] until a boundary
///
/// Each item is computed from the store when requested, so the walk sees the
/// tree as it is at that moment. It cannot be restarted.
pub struct AdjacentCarets<'a, S: NodeStore + ?Sized> {
    store: &'a S,
    current: Option<Caret>,
}

impl<'a, S: NodeStore + ?Sized> Iterator for AdjacentCarets<'a, S> {
    type Item = Caret;

    fn next(&mut self) -> Option<Caret> {
        let next = self.current?.adjacent_caret(self.store);
        self.current = next;
        next
    }
}

//! # Offset view
//!
//! Projects a document snapshot onto one linear coordinate space:
//!
//! ```text
//!   root
//!   ├── P1 ── "Hello"        text   [0, 5)
//!   │                        P1     [0, 6)   +1 block boundary
//!   └── P2 ── "World"        text   [6, 11)
//!                            P2     [6, 12)
//! ```
//!
//! Text consumes its char length, line breaks and decorators consume 1, and
//! an element consumes `block_offset_size` after its children unless it
//! directly follows another block boundary and has children of its own.
//!
//! Views are built on demand from any [`NodeStore`] and are never updated in
//! place. Keep an old view around only to diff against a newer one.

use crate::selection::{Point, PointType, RangeSelection};
use folio_common::{walk_children, walk_document, Visitor};
use folio_model::{DecoratorData, ElementData, NodeBehavior, NodeKey, NodeStore, TextData};
use std::collections::{HashMap, HashSet};
use tracing::{debug, instrument, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OffsetKind {
    Element,
    Text,
    /// Line breaks and decorators
    Inline,
}

/// One node's span; links are indices into the owning view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OffsetNode {
    pub key: NodeKey,
    pub kind: OffsetKind,
    pub start: usize,
    pub end: usize,
    pub parent: Option<usize>,
    pub prev: Option<usize>,
    pub next: Option<usize>,
    pub child: Option<usize>,
}

impl OffsetNode {
    pub fn span(&self) -> usize {
        self.end - self.start
    }
}

#[derive(Debug, Clone, Default)]
pub struct OffsetView {
    nodes: Vec<OffsetNode>,
    index: HashMap<NodeKey, usize>,
    first: Option<usize>,
    block_offset_size: usize,
}

impl OffsetView {
    /// Project the attached tree of `store`
    #[instrument(level = "debug", skip(store))]
    pub fn build<S: NodeStore + ?Sized>(store: &S, block_offset_size: usize) -> Self {
        let mut builder = OffsetBuilder {
            view: OffsetView {
                block_offset_size,
                ..OffsetView::default()
            },
            offset: 0,
            prev_is_block: false,
            parent: None,
            last: None,
        };
        walk_document(&mut builder, store);
        let view = builder.view;
        debug!(nodes = view.len(), size = view.text_size(), "built offset view");
        view
    }

    pub fn node(&self, key: NodeKey) -> Option<&OffsetNode> {
        self.index.get(&key).map(|i| &self.nodes[*i])
    }

    pub fn first_node(&self) -> Option<&OffsetNode> {
        self.first.map(|i| &self.nodes[i])
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Total size of the coordinate space
    pub fn text_size(&self) -> usize {
        let mut size = 0;
        let mut cursor = self.first;
        while let Some(i) = cursor {
            size = self.nodes[i].end;
            cursor = self.nodes[i].next;
        }
        size
    }

    pub fn block_offset_size(&self) -> usize {
        self.block_offset_size
    }

    /// Innermost node holding `offset`
    ///
    /// Leaves (and every node when `block_offset_size` is 0) also hold the
    /// offset right after their end.
    pub fn search(&self, offset: usize) -> Option<&OffsetNode> {
        self.search_index(offset).map(|i| &self.nodes[i])
    }

    fn search_index(&self, offset: usize) -> Option<usize> {
        let mut cursor = self.first;
        while let Some(i) = cursor {
            let node = &self.nodes[i];
            let inclusive = node.kind != OffsetKind::Element || self.block_offset_size == 0;
            if offset < node.end + usize::from(inclusive) {
                match node.child {
                    Some(child) => cursor = Some(child),
                    None => return Some(i),
                }
            } else {
                cursor = node.next;
            }
        }
        None
    }

    /// Nodes strictly before `index`: its previous siblings, nearest first,
    /// then the previous siblings of each ancestor
    fn preceding(&self, index: usize) -> Vec<usize> {
        let mut out = Vec::new();
        let mut current = Some(index);
        while let Some(i) = current {
            let mut sibling = self.nodes[i].prev;
            while let Some(s) = sibling {
                out.push(s);
                sibling = self.nodes[s].prev;
            }
            current = self.nodes[i].parent;
        }
        out
    }

    /// Where `offset`, measured against `previous`, lands in this view
    ///
    /// Spans that grew or shrank before the offset shift it; nodes deleted
    /// before it pull it back. An offset inside a deleted node moves to the
    /// place that node started.
    pub fn adjusted_offset_from_diff(&self, offset: usize, previous: &OffsetView) -> usize {
        let Some(holder) = previous.search_index(offset) else {
            return offset;
        };
        let holder_node = &previous.nodes[holder];
        let mut adjusted = offset as i64;
        let mut visited: HashSet<NodeKey> = HashSet::new();

        let walk: Vec<usize> = match self.index.get(&holder_node.key) {
            Some(current) => self.preceding(*current),
            None => {
                adjusted = holder_node.start as i64;
                let survivor = previous
                    .preceding(holder)
                    .into_iter()
                    .find_map(|i| self.index.get(&previous.nodes[i].key).copied());
                match survivor {
                    Some(current) => {
                        let mut walk = vec![current];
                        walk.extend(self.preceding(current));
                        walk
                    }
                    None => Vec::new(),
                }
            }
        };

        for i in walk {
            let node = &self.nodes[i];
            visited.insert(node.key);
            let span = node.span() as i64;
            adjusted += match previous.node(node.key) {
                Some(before) => span - before.span() as i64,
                None => span,
            };
        }

        for i in previous.preceding(holder) {
            let node = &previous.nodes[i];
            if !visited.contains(&node.key) && !self.index.contains_key(&node.key) {
                adjusted -= node.span() as i64;
            }
        }

        trace!(offset, adjusted, "adjusted offset from diff");
        adjusted.max(0) as usize
    }

    /// Resolve `[start, end]` back to a selection in `store`
    ///
    /// With `diff`, both offsets are first re-targeted from that older view.
    /// Returns `None` when an offset falls outside the view or resolves to a
    /// key `store` does not hold.
    pub fn create_selection_from_offsets<S: NodeStore + ?Sized>(
        &self,
        store: &S,
        start: usize,
        end: usize,
        diff: Option<&OffsetView>,
    ) -> Option<RangeSelection> {
        let (start, end) = match diff {
            Some(previous) => (
                self.adjusted_offset_from_diff(start, previous),
                self.adjusted_offset_from_diff(end, previous),
            ),
            None => (start, end),
        };
        let anchor = self.resolve_point(store, start, start != end)?;
        let focus = self.resolve_point(store, end, false)?;
        Some(RangeSelection::new(anchor, focus))
    }

    fn resolve_point<S: NodeStore + ?Sized>(&self, store: &S, offset: usize, is_ranged_start: bool) -> Option<Point> {
        let hit = self.search(offset)?;
        let node = store.get_node(hit.key)?;
        match hit.kind {
            OffsetKind::Text => {
                let local = offset - hit.start;
                if is_ranged_start && local == node.text_size() {
                    // Start at a text edge moves into a following text sibling
                    if let Some(sibling) = store.get_next_sibling(hit.key) {
                        if store.get_node(sibling).map(|n| n.is_text()).unwrap_or(false) {
                            return Some(Point::text(sibling, 0));
                        }
                    }
                }
                Some(Point::text(hit.key, local))
            }
            OffsetKind::Inline => {
                let parent = store.get_parent(hit.key)?;
                let index = store.get_index_within_parent(hit.key)?;
                Some(Point::element(parent, index + usize::from(offset > hit.start)))
            }
            OffsetKind::Element => Some(Point::element(hit.key, 0)),
        }
    }

    /// `(start, end)` offsets of a selection's anchor and focus
    pub fn get_offsets_from_selection<S: NodeStore + ?Sized>(
        &self,
        store: &S,
        selection: &RangeSelection,
    ) -> Option<(usize, usize)> {
        Some((
            self.offset_of_point(store, &selection.anchor)?,
            self.offset_of_point(store, &selection.focus)?,
        ))
    }

    fn offset_of_point<S: NodeStore + ?Sized>(&self, store: &S, point: &Point) -> Option<usize> {
        match point.kind {
            PointType::Text => Some(self.node(point.key)?.start + point.offset),
            PointType::Element => {
                let Some(descendant) = store.get_descendant_by_index(point.key, point.offset) else {
                    return Some(self.node(point.key)?.start);
                };
                let node = self.node(descendant)?;
                if point.offset >= store.get_children_size(point.key) {
                    Some(node.end)
                } else {
                    Some(node.start)
                }
            }
        }
    }
}

struct OffsetBuilder {
    view: OffsetView,
    offset: usize,
    prev_is_block: bool,
    parent: Option<usize>,
    last: Option<usize>,
}

impl OffsetBuilder {
    fn push(&mut self, key: NodeKey, kind: OffsetKind) -> usize {
        let index = self.view.nodes.len();
        self.view.nodes.push(OffsetNode {
            key,
            kind,
            start: self.offset,
            end: self.offset,
            parent: self.parent,
            prev: self.last,
            next: None,
            child: None,
        });
        match (self.last, self.parent) {
            (Some(last), _) => self.view.nodes[last].next = Some(index),
            (None, Some(parent)) => self.view.nodes[parent].child = Some(index),
            (None, None) => self.view.first = Some(index),
        }
        self.view.index.insert(key, index);
        self.last = Some(index);
        index
    }

    fn push_leaf(&mut self, key: NodeKey, kind: OffsetKind, size: usize) {
        let index = self.push(key, kind);
        self.offset += size;
        self.prev_is_block = false;
        self.view.nodes[index].end = self.offset;
    }
}

impl<S: NodeStore + ?Sized> Visitor<S> for OffsetBuilder {
    fn visit_element(&mut self, store: &S, key: NodeKey, element: &ElementData) {
        let index = self.push(key, OffsetKind::Element);
        let parent = self.parent;
        self.parent = Some(index);
        self.last = None;
        walk_children(self, store, key);
        self.parent = parent;
        self.last = Some(index);

        if !self.prev_is_block || element.is_empty() {
            self.offset += self.view.block_offset_size;
        }
        self.prev_is_block = true;
        self.view.nodes[index].end = self.offset;
    }

    fn visit_text(&mut self, _store: &S, key: NodeKey, text: &TextData) {
        self.push_leaf(key, OffsetKind::Text, text.size());
    }

    fn visit_line_break(&mut self, _store: &S, key: NodeKey) {
        self.push_leaf(key, OffsetKind::Inline, 1);
    }

    fn visit_decorator(&mut self, _store: &S, key: NodeKey, _decorator: &DecoratorData) {
        self.push_leaf(key, OffsetKind::Inline, 1);
    }

    fn visit_missing(&mut self, _store: &S, key: NodeKey) {
        trace!(key = %key, "skipping unresolved child");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_model::Editor;

    fn document(paragraphs: &[&[&str]]) -> (Editor, Vec<(NodeKey, Vec<NodeKey>)>) {
        let mut editor = Editor::new();
        let blocks = editor
            .update(|editor| {
                let mut out = Vec::new();
                for texts in paragraphs {
                    let paragraph = editor.create_paragraph()?;
                    let mut keys = Vec::new();
                    for text in texts.iter() {
                        let key = if *text == "\n" {
                            editor.create_line_break()?
                        } else {
                            editor.create_text(text)?
                        };
                        editor.append(paragraph, key)?;
                        keys.push(key);
                    }
                    editor.append(NodeKey::ROOT, paragraph)?;
                    out.push((paragraph, keys));
                }
                Ok(out)
            })
            .unwrap();
        (editor, blocks)
    }

    #[test]
    fn test_spans() {
        let (editor, blocks) = document(&[&["Hello"], &[], &["ab", "\n"]]);
        let view = OffsetView::build(&editor, 1);

        let span = |key| {
            let node = view.node(key).unwrap();
            (node.start, node.end)
        };
        assert_eq!(span(blocks[0].1[0]), (0, 5));
        assert_eq!(span(blocks[0].0), (0, 6));
        assert_eq!(span(blocks[1].0), (6, 7));
        assert_eq!(span(blocks[2].1[0]), (7, 9));
        assert_eq!(span(blocks[2].1[1]), (9, 10));
        assert_eq!(span(blocks[2].0), (7, 11));
        assert_eq!(view.text_size(), 11);
        assert_eq!(view.len(), 6);
        assert_eq!(view.first_node().map(|n| n.key), Some(blocks[0].0));
    }

    #[test]
    fn test_search_prefers_innermost() {
        let (editor, blocks) = document(&[&["ab"], &["cd"]]);
        let view = OffsetView::build(&editor, 1);
        assert_eq!(view.search(0).map(|n| n.key), Some(blocks[0].1[0]));
        assert_eq!(view.search(2).map(|n| n.key), Some(blocks[0].1[0]));
        assert_eq!(view.search(3).map(|n| n.key), Some(blocks[1].1[0]));
        assert_eq!(view.search(5).map(|n| n.key), Some(blocks[1].1[0]));
        assert_eq!(view.search(7), None);
    }

    #[test]
    fn test_zero_block_offset() {
        let (editor, blocks) = document(&[&["ab"], &["cd"]]);
        let view = OffsetView::build(&editor, 0);
        assert_eq!(view.node(blocks[1].1[0]).map(|n| n.start), Some(2));
        assert_eq!(view.text_size(), 4);
    }

    #[test]
    fn test_ranged_start_moves_into_next_text() {
        let (editor, blocks) = document(&[&["ab", "cd"]]);
        let keys = &blocks[0].1;
        let view = OffsetView::build(&editor, 1);

        let ranged = view.create_selection_from_offsets(&editor, 2, 3, None).unwrap();
        assert_eq!(ranged.anchor, Point::text(keys[1], 0));
        assert_eq!(ranged.focus, Point::text(keys[1], 1));

        let collapsed = view.create_selection_from_offsets(&editor, 2, 2, None).unwrap();
        assert_eq!(collapsed.anchor, Point::text(keys[0], 2));
    }

    #[test]
    fn test_line_break_resolves_to_element_point() {
        let (editor, blocks) = document(&[&["\n"]]);
        let (paragraph, _) = &blocks[0];
        let view = OffsetView::build(&editor, 1);

        let before = view.create_selection_from_offsets(&editor, 0, 0, None).unwrap();
        assert_eq!(before.anchor, Point::element(*paragraph, 0));
        let after = view.create_selection_from_offsets(&editor, 1, 1, None).unwrap();
        assert_eq!(after.anchor, Point::element(*paragraph, 1));
        assert_eq!(view.get_offsets_from_selection(&editor, &after), Some((1, 1)));
    }

    #[test]
    fn test_empty_view() {
        let editor = Editor::new();
        let view = OffsetView::build(&editor, 1);
        assert!(view.is_empty());
        assert_eq!(view.create_selection_from_offsets(&editor, 0, 0, None), None);
    }
}

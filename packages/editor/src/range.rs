//! # Caret ranges
//!
//! A [`CaretRange`] is an anchor/focus pair of carets sharing one direction.
//! Its endpoints may be text points, in which case [`CaretRange::text_slices`]
//! describes the partially selected text at each end and
//! [`CaretRange::iter_node_carets`] walks every caret strictly between them.

use crate::caret::{Caret, Direction, RootMode};
use crate::caret_utils::{
    adjacent_child_caret, caret_from_point, caret_in_direction, point_from_caret,
};
use crate::selection::{compare_points, RangeSelection};
use folio_model::text::char_slice;
use folio_model::{Editor, EditorResult, NodeBehavior, NodeStore};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaretRange {
    pub anchor: Caret,
    pub focus: Caret,
}

impl CaretRange {
    pub fn new(anchor: Caret, focus: Caret) -> Self {
        Self { anchor, focus }
    }

    pub fn collapsed(caret: Caret) -> Self {
        Self::new(caret, caret)
    }

    pub fn direction(&self) -> Direction {
        self.anchor.direction()
    }

    /// Anchor and focus are the same point (text offsets included)
    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }

    /// The same range walked the other way; anchor and focus swap
    pub fn in_direction<S: NodeStore + ?Sized>(
        &self,
        store: &S,
        direction: Direction,
    ) -> EditorResult<CaretRange> {
        if self.direction() == direction {
            return Ok(*self);
        }
        Ok(CaretRange::new(
            caret_in_direction(store, self.focus, direction)?,
            caret_in_direction(store, self.anchor, direction)?,
        ))
    }

    /// Range over a selection, directed from its first point to its last
    pub fn from_selection<S: NodeStore + ?Sized>(
        store: &S,
        selection: &RangeSelection,
    ) -> EditorResult<CaretRange> {
        let direction = match compare_points(store, &selection.anchor, &selection.focus) {
            Ordering::Greater => Direction::Previous,
            _ => Direction::Next,
        };
        let anchor = caret_from_point(store, &selection.anchor, Direction::Next)?;
        let focus = caret_from_point(store, &selection.focus, Direction::Next)?;
        Ok(CaretRange::new(
            caret_in_direction(store, anchor, direction)?,
            caret_in_direction(store, focus, direction)?,
        ))
    }

    pub fn to_selection<S: NodeStore + ?Sized>(&self, store: &S) -> EditorResult<RangeSelection> {
        Ok(RangeSelection::new(
            point_from_caret(store, &self.anchor)?,
            point_from_caret(store, &self.focus)?,
        ))
    }

    /// Partially selected text at the anchor and the focus
    ///
    /// The anchor slice runs from the anchor offset to the text edge in the
    /// range direction, the focus slice from the opposite edge to the focus
    /// offset. Endpoints in the same text node give a single slice.
    pub fn text_slices<S: NodeStore + ?Sized>(&self, store: &S) -> [Option<TextPointCaretSlice>; 2] {
        let anchor = TextPointCaretSlice::from_endpoint(store, &self.anchor, false);
        let focus = TextPointCaretSlice::from_endpoint(store, &self.focus, true);
        if let (Some(anchor), Some(focus)) = (anchor, focus) {
            if anchor.caret.is_same_node_caret(&focus.caret) {
                let distance = focus.offset() as isize - anchor.offset() as isize;
                return [Some(TextPointCaretSlice::new(anchor.caret, distance)), None];
            }
        }
        [anchor, focus]
    }

    /// Every caret strictly between anchor and focus, in range direction
    ///
    /// Entering an element yields its child caret, leaving it yields its
    /// sibling caret; leaves yield their sibling caret. A text focus is not
    /// itself yielded.
    pub fn iter_node_carets<'a, S: NodeStore + ?Sized>(
        &self,
        store: &'a S,
        root_mode: RootMode,
    ) -> NodeCaretIter<'a, S> {
        let anchor = if self.anchor.is_text_point() {
            self.anchor.sibling_caret()
        } else {
            self.anchor
        };
        let focus = self.focus;
        let mut iter = NodeCaretIter {
            store,
            focus,
            root_mode,
            next: None,
        };
        if !anchor.is_same_node_caret(&focus) {
            iter.next = iter.step(&anchor);
        }
        iter
    }
}

/// Lazy pre-order walk between two carets; see [`CaretRange::iter_node_carets`]
pub struct NodeCaretIter<'a, S: NodeStore + ?Sized> {
    store: &'a S,
    focus: Caret,
    root_mode: RootMode,
    next: Option<Caret>,
}

impl<'a, S: NodeStore + ?Sized> NodeCaretIter<'a, S> {
    fn step(&self, state: &Caret) -> Option<Caret> {
        if state.is_same_node_caret(&self.focus) {
            return None;
        }
        adjacent_child_caret(self.store, state)
            .or_else(|| state.parent_caret(self.store, self.root_mode))
    }
}

impl<'a, S: NodeStore + ?Sized> Iterator for NodeCaretIter<'a, S> {
    type Item = Caret;

    fn next(&mut self) -> Option<Caret> {
        let current = self.next?;
        if self.focus.is_text_point() && self.focus.is_same_node_caret(&current) {
            self.next = None;
            return None;
        }
        self.next = self.step(&current);
        Some(current)
    }
}

/// A run of text next to a text point caret
///
/// `distance` is signed: positive runs towards the end of the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextPointCaretSlice {
    pub caret: Caret,
    pub distance: isize,
}

impl TextPointCaretSlice {
    pub fn new(caret: Caret, distance: isize) -> Self {
        Self { caret, distance }
    }

    fn from_endpoint<S: NodeStore + ?Sized>(store: &S, caret: &Caret, is_focus: bool) -> Option<Self> {
        let offset = caret.offset()?;
        let edge_direction = if is_focus {
            caret.direction().flip()
        } else {
            caret.direction()
        };
        let edge = match edge_direction {
            Direction::Next => store.get_node(caret.origin()).map(|n| n.text_size()).unwrap_or(0),
            Direction::Previous => 0,
        };
        Some(Self::new(*caret, edge as isize - offset as isize))
    }

    fn offset(&self) -> usize {
        self.caret.offset().unwrap_or(0)
    }

    /// `[start, end)` char indices covered by the slice
    pub fn slice_indices(&self) -> (usize, usize) {
        let offset = self.offset();
        let other = (offset as isize + self.distance).max(0) as usize;
        if other < offset {
            (other, offset)
        } else {
            (offset, other)
        }
    }

    pub fn text_content<S: NodeStore + ?Sized>(&self, store: &S) -> String {
        let (start, end) = self.slice_indices();
        store
            .get_node(self.caret.origin())
            .and_then(|node| node.as_text())
            .map(|text| char_slice(&text.text, start, end).to_string())
            .unwrap_or_default()
    }

    pub fn text_content_size(&self) -> usize {
        self.distance.unsigned_abs()
    }

    /// Delete the slice's text; the result points where it started
    pub fn remove_text_slice(&self, editor: &mut Editor) -> EditorResult<Caret> {
        let (start, end) = self.slice_indices();
        let origin = self.caret.origin();
        editor.splice_text(origin, start, end - start, "")?;
        Ok(Caret::text_point(origin, self.caret.direction(), start))
    }
}

//! Key/offset selection points

use folio_model::{NodeKey, NodeStore};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointType {
    /// `offset` is a char offset into a text node
    Text,
    /// `offset` is a child index of an element
    Element,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub key: NodeKey,
    pub offset: usize,
    #[serde(rename = "type")]
    pub kind: PointType,
}

impl Point {
    pub fn text(key: NodeKey, offset: usize) -> Self {
        Self {
            key,
            offset,
            kind: PointType::Text,
        }
    }

    pub fn element(key: NodeKey, offset: usize) -> Self {
        Self {
            key,
            offset,
            kind: PointType::Element,
        }
    }

    pub fn is_before<S: NodeStore + ?Sized>(&self, store: &S, other: &Point) -> bool {
        compare_points(store, self, other) == Ordering::Less
    }
}

/// Document order of two points
///
/// Points compare by the child-index path from the root to their node, with
/// the point offset appended. An element point at index `i` sorts before
/// anything inside child `i`.
pub fn compare_points<S: NodeStore + ?Sized>(store: &S, a: &Point, b: &Point) -> Ordering {
    point_path(store, a).cmp(&point_path(store, b))
}

fn point_path<S: NodeStore + ?Sized>(store: &S, point: &Point) -> Vec<usize> {
    let mut path = vec![point.offset];
    let mut key = point.key;
    while let Some(index) = store.get_index_within_parent(key) {
        path.push(index);
        match store.get_parent(key) {
            Some(parent) => key = parent,
            None => break,
        }
    }
    path.reverse();
    path
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeSelection {
    pub anchor: Point,
    pub focus: Point,
}

impl RangeSelection {
    pub fn new(anchor: Point, focus: Point) -> Self {
        Self { anchor, focus }
    }

    pub fn collapsed(point: Point) -> Self {
        Self::new(point, point)
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }

    /// Focus comes before anchor in document order
    pub fn is_backward<S: NodeStore + ?Sized>(&self, store: &S) -> bool {
        self.focus.is_before(store, &self.anchor)
    }

    /// `(start, end)` in document order
    pub fn ordered<S: NodeStore + ?Sized>(&self, store: &S) -> (Point, Point) {
        if self.is_backward(store) {
            (self.focus, self.anchor)
        } else {
            (self.anchor, self.focus)
        }
    }
}

//! Structural invariant checks
//!
//! Walks the tree from the root and reports the first broken invariant:
//! every listed child exists, points back at the parent that lists it and
//! appears exactly once. With `allow_detached = false` every registered key
//! must also be reachable, which is what a committed state guarantees after
//! garbage collection.

use crate::error::ValidationError;
use crate::result::ValidationResult;
use crate::visitor::{walk_children, walk_document, Visitor};
use folio_model::{DecoratorData, ElementData, NodeKey, NodeStore, TextData};
use std::collections::HashSet;
use tracing::debug;

/// Counts gathered while validating
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TreeStats {
    pub elements: usize,
    pub texts: usize,
    pub leaves: usize,
}

impl TreeStats {
    /// Attached nodes, root excluded
    pub fn total(&self) -> usize {
        self.elements + self.texts + self.leaves
    }
}

#[derive(Debug, Default)]
pub struct TreeValidator {
    pub allow_detached: bool,
    seen: HashSet<NodeKey>,
    stats: TreeStats,
    error: Option<ValidationError>,
}

impl TreeValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allow_detached(mut self, allow: bool) -> Self {
        self.allow_detached = allow;
        self
    }

    pub fn validate<S: NodeStore + ?Sized>(mut self, store: &S) -> ValidationResult<TreeStats> {
        let Some(root) = store.get_node(NodeKey::ROOT) else {
            return Err(ValidationError::MissingRoot);
        };
        if let Some(parent) = root.parent() {
            return Err(ValidationError::RootHasParent(parent));
        }

        self.seen.insert(NodeKey::ROOT);
        walk_document(&mut self, store);
        if let Some(error) = self.error {
            return Err(error);
        }

        if !self.allow_detached {
            if let Some(key) = store
                .node_keys()
                .into_iter()
                .find(|key| !self.seen.contains(key))
            {
                return Err(ValidationError::DetachedNode(key));
            }
        }
        debug!(nodes = self.stats.total(), "validated tree");
        Ok(self.stats)
    }

    fn check_children<S: NodeStore + ?Sized>(&mut self, store: &S, parent: NodeKey) -> bool {
        for child in store.get_children(parent) {
            if self.error.is_some() {
                return false;
            }
            let Some(node) = store.get_node(*child) else {
                self.error = Some(ValidationError::MissingChild {
                    parent,
                    child: *child,
                });
                return false;
            };
            if node.parent() != Some(parent) {
                self.error = Some(ValidationError::ParentMismatch {
                    parent,
                    child: *child,
                    actual: node.parent(),
                });
                return false;
            }
            if !self.seen.insert(*child) {
                self.error = Some(ValidationError::DuplicateChild { child: *child });
                return false;
            }
        }
        true
    }
}

impl<S: NodeStore + ?Sized> Visitor<S> for TreeValidator {
    fn visit_root(&mut self, store: &S, _root: &ElementData) {
        if self.check_children(store, NodeKey::ROOT) {
            walk_children(self, store, NodeKey::ROOT);
        }
    }

    fn visit_element(&mut self, store: &S, key: NodeKey, _element: &ElementData) {
        if self.error.is_some() {
            return;
        }
        self.stats.elements += 1;
        if self.check_children(store, key) {
            walk_children(self, store, key);
        }
    }

    fn visit_text(&mut self, _store: &S, _key: NodeKey, _text: &TextData) {
        self.stats.texts += 1;
    }

    fn visit_line_break(&mut self, _store: &S, _key: NodeKey) {
        self.stats.leaves += 1;
    }

    fn visit_decorator(&mut self, _store: &S, _key: NodeKey, _decorator: &DecoratorData) {
        self.stats.leaves += 1;
    }
}

/// Validate a committed tree: no dangling links and nothing detached
pub fn validate_tree<S: NodeStore + ?Sized>(store: &S) -> ValidationResult<TreeStats> {
    TreeValidator::new().validate(store)
}

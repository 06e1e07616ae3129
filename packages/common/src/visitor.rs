use folio_model::{DecoratorData, ElementData, NodeKey, NodeKind, NodeStore, TextData};

/// Visitor pattern for walking a document tree in pre-order
///
/// Works over any [`NodeStore`], so the same visitor can walk the live editor
/// or an older snapshot. The default implementations walk the whole tree;
/// override specific `visit_*` methods to act on nodes. An override of
/// `visit_element` decides whether (and when) to descend by calling
/// [`walk_children`].
pub trait Visitor<S: NodeStore + ?Sized>: Sized {
    fn visit_node(&mut self, store: &S, key: NodeKey) {
        walk_node(self, store, key);
    }

    fn visit_root(&mut self, store: &S, _root: &ElementData) {
        walk_children(self, store, NodeKey::ROOT);
    }

    fn visit_element(&mut self, store: &S, key: NodeKey, _element: &ElementData) {
        walk_children(self, store, key);
    }

    fn visit_text(&mut self, _store: &S, _key: NodeKey, _text: &TextData) {
        // Leaf node, no children to walk
    }

    fn visit_line_break(&mut self, _store: &S, _key: NodeKey) {
        // Leaf node, no children to walk
    }

    fn visit_decorator(&mut self, _store: &S, _key: NodeKey, _decorator: &DecoratorData) {
        // Leaf node, no children to walk
    }

    /// Called for a child key the store cannot resolve
    fn visit_missing(&mut self, _store: &S, _key: NodeKey) {}
}

/// Walk the whole document from the root
pub fn walk_document<S, V>(visitor: &mut V, store: &S)
where
    S: NodeStore + ?Sized,
    V: Visitor<S>,
{
    visitor.visit_node(store, NodeKey::ROOT);
}

pub fn walk_node<S, V>(visitor: &mut V, store: &S, key: NodeKey)
where
    S: NodeStore + ?Sized,
    V: Visitor<S>,
{
    let Some(node) = store.get_node(key) else {
        visitor.visit_missing(store, key);
        return;
    };
    match node.kind() {
        NodeKind::Root(root) => visitor.visit_root(store, root),
        NodeKind::Element(element) => visitor.visit_element(store, key, element),
        NodeKind::Text(text) => visitor.visit_text(store, key, text),
        NodeKind::LineBreak => visitor.visit_line_break(store, key),
        NodeKind::Decorator(decorator) => visitor.visit_decorator(store, key, decorator),
    }
}

pub fn walk_children<S, V>(visitor: &mut V, store: &S, key: NodeKey)
where
    S: NodeStore + ?Sized,
    V: Visitor<S>,
{
    for child in store.get_children(key) {
        visitor.visit_node(store, *child);
    }
}

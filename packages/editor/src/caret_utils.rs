//! Caret helpers shared by ranges, removal and selection conversion

use crate::caret::{Caret, Direction};
use crate::selection::{Point, PointType};
use folio_model::{EditorError, EditorResult, NodeBehavior, NodeKey, NodeStore};

/// A caret whose target is the origin of `caret`
///
/// Rotates around the origin: the sibling caret on the node before it, or the
/// parent's child caret when it is the first child in `caret`'s direction.
pub fn rewind_sibling_caret<S: NodeStore + ?Sized>(store: &S, caret: &Caret) -> EditorResult<Caret> {
    let origin = caret.origin();
    let direction = caret.direction();
    match Caret::sibling(origin, direction.flip()).node_at_caret(store) {
        Some(node) => Ok(Caret::sibling(node, direction)),
        None => {
            let parent = store.get_parent(origin).ok_or(EditorError::NoParent(origin))?;
            Ok(Caret::child(parent, direction))
        }
    }
}

pub fn child_caret_or_self<S: NodeStore + ?Sized>(store: &S, caret: Caret) -> Caret {
    caret.child_caret(store).unwrap_or(caret)
}

/// The adjacent caret, entered as a child caret when it lands on an element
pub fn adjacent_child_caret<S: NodeStore + ?Sized>(store: &S, caret: &Caret) -> Option<Caret> {
    caret
        .adjacent_caret(store)
        .map(|adjacent| child_caret_or_self(store, adjacent))
}

pub fn caret_in_direction<S: NodeStore + ?Sized>(
    store: &S,
    caret: Caret,
    direction: Direction,
) -> EditorResult<Caret> {
    if caret.direction() == direction {
        Ok(caret)
    } else {
        caret.flipped(store)
    }
}

fn text_edge<S: NodeStore + ?Sized>(store: &S, key: NodeKey, edge: Direction) -> usize {
    match edge {
        Direction::Next => store.get_node(key).map(|node| node.text_size()).unwrap_or(0),
        Direction::Previous => 0,
    }
}

/// Text point caret at the start (`Previous`) or end (`Next`) of a text node
pub fn text_point_caret_at_edge<S: NodeStore + ?Sized>(
    store: &S,
    key: NodeKey,
    direction: Direction,
    edge: Direction,
) -> Caret {
    Caret::text_point(key, direction, text_edge(store, key, edge))
}

/// Canonical form of a caret: descend into elements and prefer a text point
/// on a neighbouring text node
pub fn normalize_caret<S: NodeStore + ?Sized>(store: &S, caret: Caret) -> Caret {
    let caret = child_caret_or_self(store, caret);
    let direction = caret.direction();
    let origin_is_text = store.get_node(caret.origin()).map(|n| n.is_text()).unwrap_or(false);
    if origin_is_text {
        return if caret.is_text_point() {
            caret
        } else {
            text_point_caret_at_edge(store, caret.origin(), direction, direction)
        };
    }
    match caret.adjacent_caret(store) {
        Some(adjacent)
            if store
                .get_node(adjacent.origin())
                .map(|n| n.is_text())
                .unwrap_or(false) =>
        {
            text_point_caret_at_edge(store, adjacent.origin(), direction, direction.flip())
        }
        _ => caret,
    }
}

/// Caret `index` children into `parent`, in `direction`
pub fn child_caret_at_index<S: NodeStore + ?Sized>(
    store: &S,
    parent: NodeKey,
    index: usize,
    direction: Direction,
) -> EditorResult<Caret> {
    let mut caret = Caret::child(parent, Direction::Next);
    for _ in 0..index {
        match caret.adjacent_caret(store) {
            Some(next) => caret = next,
            None => break,
        }
    }
    caret_in_direction(store, caret, direction)
}

pub fn caret_from_point<S: NodeStore + ?Sized>(
    store: &S,
    point: &Point,
    direction: Direction,
) -> EditorResult<Caret> {
    let node = store.node(point.key)?;
    match point.kind {
        PointType::Text => {
            let size = node.as_text().map(|t| t.size()).ok_or(EditorError::NotText(point.key))?;
            if point.offset > size {
                return Err(EditorError::OffsetOutOfRange {
                    key: point.key,
                    offset: point.offset,
                    size,
                });
            }
            Ok(Caret::text_point(point.key, direction, point.offset))
        }
        PointType::Element => {
            if !node.is_element() {
                return Err(EditorError::NotAnElement(point.key));
            }
            child_caret_at_index(store, point.key, point.offset, direction)
        }
    }
}

pub fn point_from_caret<S: NodeStore + ?Sized>(store: &S, caret: &Caret) -> EditorResult<Point> {
    let origin = caret.origin();
    let is_next = caret.direction().is_next();
    match *caret {
        Caret::TextPoint { offset, .. } => Ok(Point::text(origin, offset)),
        Caret::Sibling { direction, .. } => {
            let node = store.node(origin)?;
            if node.is_text() {
                return Ok(Point::text(origin, text_edge(store, origin, direction)));
            }
            let parent = store.get_parent(origin).ok_or(EditorError::NoParent(origin))?;
            let index = store
                .get_index_within_parent(origin)
                .ok_or(EditorError::NoParent(origin))?;
            Ok(Point::element(parent, index + usize::from(is_next)))
        }
        Caret::Child { .. } => {
            if !store.node(origin)?.is_element() {
                return Err(EditorError::NotAnElement(origin));
            }
            let offset = if is_next { 0 } else { store.get_children_size(origin) };
            Ok(Point::element(origin, offset))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_model::Editor;

    fn fixture() -> (Editor, NodeKey, NodeKey, NodeKey) {
        let mut editor = Editor::new();
        let (paragraph, text, br) = editor
            .update(|editor| {
                let paragraph = editor.create_paragraph()?;
                let text = editor.create_text("abc")?;
                let br = editor.create_line_break()?;
                editor.append_all(paragraph, &[text, br])?;
                editor.append(NodeKey::ROOT, paragraph)?;
                Ok((paragraph, text, br))
            })
            .unwrap();
        (editor, paragraph, text, br)
    }

    #[test]
    fn test_rewind_points_back_at_origin() {
        let (editor, paragraph, text, br) = fixture();
        let rewound = rewind_sibling_caret(&editor, &Caret::sibling(br, Direction::Next)).unwrap();
        assert_eq!(rewound, Caret::sibling(text, Direction::Next));
        assert_eq!(rewound.node_at_caret(&editor), Some(br));

        let rewound = rewind_sibling_caret(&editor, &Caret::sibling(text, Direction::Next)).unwrap();
        assert_eq!(rewound, Caret::child(paragraph, Direction::Next));
    }

    #[test]
    fn test_normalize_prefers_text_points() {
        let (editor, paragraph, text, br) = fixture();
        assert_eq!(
            normalize_caret(&editor, Caret::sibling(paragraph, Direction::Next)),
            Caret::text_point(text, Direction::Next, 0)
        );
        assert_eq!(
            normalize_caret(&editor, Caret::sibling(text, Direction::Next)),
            Caret::text_point(text, Direction::Next, 3)
        );
        assert_eq!(
            normalize_caret(&editor, Caret::sibling(br, Direction::Previous)),
            Caret::text_point(text, Direction::Previous, 3)
        );
    }

    #[test]
    fn test_point_caret_conversion() {
        let (editor, paragraph, text, _) = fixture();

        let caret = caret_from_point(&editor, &Point::element(paragraph, 1), Direction::Next).unwrap();
        assert_eq!(caret, Caret::sibling(text, Direction::Next));
        assert_eq!(point_from_caret(&editor, &caret).unwrap(), Point::text(text, 3));

        let caret = caret_from_point(&editor, &Point::element(paragraph, 2), Direction::Previous).unwrap();
        assert_eq!(caret, Caret::child(paragraph, Direction::Previous));
        assert_eq!(point_from_caret(&editor, &caret).unwrap(), Point::element(paragraph, 2));

        let caret = caret_from_point(&editor, &Point::text(text, 2), Direction::Next).unwrap();
        assert_eq!(point_from_caret(&editor, &caret).unwrap(), Point::text(text, 2));

        assert!(caret_from_point(&editor, &Point::text(text, 9), Direction::Next).is_err());
    }

    #[test]
    fn test_child_caret_at_index_clamps() {
        let (editor, paragraph, _, br) = fixture();
        let caret = child_caret_at_index(&editor, paragraph, 10, Direction::Next).unwrap();
        assert_eq!(caret, Caret::sibling(br, Direction::Next));
    }
}

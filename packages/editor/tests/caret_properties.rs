//! Property tests for carets and offset views

use folio_editor::folio_model::{Editor, NodeKey, NodeStore};
use folio_editor::{Caret, Direction, OffsetView, Point, RangeSelection};
use proptest::prelude::*;

/// 0 = empty paragraph, 1..=3 = that many line breaks, 4.. = one text node
fn build(shapes: &[(u8, String)]) -> (Editor, Vec<Point>) {
    let mut editor = Editor::new();
    let points = editor
        .update(|editor| {
            let mut points = Vec::new();
            for (shape, text) in shapes {
                let paragraph = editor.create_paragraph()?;
                editor.append(NodeKey::ROOT, paragraph)?;
                match *shape {
                    0 => points.push(Point::element(paragraph, 0)),
                    n @ 1..=3 => {
                        for _ in 0..n {
                            let br = editor.create_line_break()?;
                            editor.append(paragraph, br)?;
                        }
                        points.extend((0..=n as usize).map(|i| Point::element(paragraph, i)));
                    }
                    _ => {
                        let key = editor.create_text(text)?;
                        editor.append(paragraph, key)?;
                        points.extend((0..=text.chars().count()).map(|i| Point::text(key, i)));
                    }
                }
            }
            Ok(points)
        })
        .unwrap();
    (editor, points)
}

fn shapes() -> impl Strategy<Value = Vec<(u8, String)>> {
    prop::collection::vec((0u8..6, "[a-zé]{1,6}"), 1..6)
}

fn all_carets(editor: &Editor) -> Vec<Caret> {
    let mut carets = Vec::new();
    for key in editor.node_keys() {
        if key == NodeKey::ROOT {
            continue;
        }
        for direction in [Direction::Next, Direction::Previous] {
            carets.push(Caret::sibling(key, direction));
            if let Some(caret) = Caret::sibling(key, direction).child_caret(editor) {
                carets.push(caret);
            }
            carets.push(Caret::text_point(key, direction, 1));
        }
    }
    carets
}

proptest! {
    #[test]
    fn flip_is_an_involution(shapes in shapes()) {
        let (editor, _) = build(&shapes);
        for caret in all_carets(&editor) {
            let flipped = caret.flipped(&editor).unwrap();
            prop_assert_ne!(flipped.direction(), caret.direction());
            prop_assert_eq!(flipped.flipped(&editor).unwrap(), caret);
        }
    }

    #[test]
    fn caret_equality_ignores_nothing_but_offsets(
        origin in 0u32..4,
        offset in 0usize..10,
        other_offset in 0usize..10,
    ) {
        let mut editor = Editor::new();
        let keys = editor
            .update(|editor| {
                let mut keys = Vec::new();
                for _ in 0..4 {
                    let key = editor.create_paragraph()?;
                    editor.append(NodeKey::ROOT, key)?;
                    keys.push(key);
                }
                Ok(keys)
            })
            .unwrap();
        let key = keys[origin as usize];

        prop_assert_eq!(Caret::sibling(key, Direction::Next), Caret::sibling(key, Direction::Next));
        prop_assert_ne!(Caret::sibling(key, Direction::Next), Caret::child(key, Direction::Next));
        prop_assert_ne!(Caret::sibling(key, Direction::Next), Caret::sibling(key, Direction::Previous));

        let a = Caret::text_point(key, Direction::Next, offset);
        let b = Caret::text_point(key, Direction::Next, other_offset);
        prop_assert_eq!(a == b, offset == other_offset);
        prop_assert!(a.is_same_node_caret(&b));
    }

    #[test]
    fn diff_against_itself_is_identity(shapes in shapes(), block_offset_size in 0usize..3) {
        let (editor, _) = build(&shapes);
        let view = OffsetView::build(&editor, block_offset_size);
        for offset in 0..=view.text_size() + 1 {
            prop_assert_eq!(view.adjusted_offset_from_diff(offset, &view), offset);
        }
    }

    #[test]
    fn offsets_round_trip(shapes in shapes(), a in any::<prop::sample::Index>(), b in any::<prop::sample::Index>()) {
        let (editor, points) = build(&shapes);
        let view = OffsetView::build(&editor, 1);
        let anchor = *a.get(&points);
        let focus = *b.get(&points);

        for selection in [RangeSelection::collapsed(anchor), RangeSelection::new(anchor, focus)] {
            let (start, end) = view.get_offsets_from_selection(&editor, &selection).unwrap();
            let resolved = view.create_selection_from_offsets(&editor, start, end, None);
            prop_assert_eq!(resolved, Some(selection));
        }
    }
}

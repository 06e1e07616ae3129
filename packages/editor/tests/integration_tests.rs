//! Integration tests for editor crate

use anyhow::Result;
use folio_common::validate_tree;
use folio_editor::folio_model::{Editor, NodeKey, NodeStore, TextData, TextFormat};
use folio_editor::{
    remove_text_from_caret_range, Caret, CaretRange, Direction, Document, EditorConfig,
    OffsetView, Point, RangeSelection,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

enum Block<'a> {
    Texts(&'a [TextData]),
    LineBreaks(usize),
}

fn build(editor: &mut Editor, blocks: &[Block]) -> Result<Vec<(NodeKey, Vec<NodeKey>)>> {
    let built = editor.update(|editor| {
        let mut out = Vec::new();
        for block in blocks {
            let paragraph = editor.create_paragraph()?;
            let mut keys = Vec::new();
            match block {
                Block::Texts(texts) => {
                    for text in texts.iter() {
                        keys.push(editor.create_text_with(text.clone())?);
                    }
                }
                Block::LineBreaks(count) => {
                    for _ in 0..*count {
                        keys.push(editor.create_line_break()?);
                    }
                }
            }
            editor.append_all(paragraph, &keys)?;
            editor.append(NodeKey::ROOT, paragraph)?;
            out.push((paragraph, keys));
        }
        Ok(out)
    })?;
    Ok(built)
}

#[test]
fn test_offsets_in_single_paragraph() -> Result<()> {
    init_tracing();
    let mut editor = Editor::new();
    let blocks = build(&mut editor, &[Block::Texts(&[TextData::new("Hello")])])?;
    let hello = blocks[0].1[0];

    let view = OffsetView::build(&editor, 1);
    for offset in 0..=5 {
        let selection = view
            .create_selection_from_offsets(&editor, offset, offset, None)
            .expect("offset inside the document");
        assert_eq!(selection.anchor, Point::text(hello, offset));
    }

    let world = editor.update(|editor| {
        let paragraph = editor.create_paragraph()?;
        let world = editor.create_text("World")?;
        editor.append(paragraph, world)?;
        editor.append(NodeKey::ROOT, paragraph)?;
        Ok(world)
    })?;
    let view = OffsetView::build(&editor, 1);
    let selection = view
        .create_selection_from_offsets(&editor, 6, 6, None)
        .expect("start of the second block");
    assert_eq!(selection.anchor, Point::text(world, 0));
    assert_eq!(view.node(world).map(|n| n.start), Some(6));
    Ok(())
}

#[test]
fn test_remove_across_split_text() -> Result<()> {
    init_tracing();
    let mut editor = Editor::new();
    let blocks = build(
        &mut editor,
        &[Block::Texts(&[
            TextData::new("Hello "),
            TextData::new("World").with_format(TextFormat::BOLD),
        ])],
    )?;
    let (paragraph, keys) = &blocks[0];
    assert_eq!(editor.get_text_content(*paragraph), "Hello World");

    let view = OffsetView::build(&editor, 1);
    let selection = view
        .create_selection_from_offsets(&editor, 2, 8, None)
        .expect("offsets inside the paragraph");
    assert_eq!(selection.anchor, Point::text(keys[0], 2));
    assert_eq!(selection.focus, Point::text(keys[1], 2));

    let result = editor.update(|editor| {
        let range = CaretRange::from_selection(&*editor, &selection)?;
        let slices: Vec<String> = range
            .text_slices(&*editor)
            .iter()
            .flatten()
            .map(|slice| slice.text_content(&*editor))
            .collect();
        assert_eq!(slices.concat(), "llo Wo");
        remove_text_from_caret_range(editor, range)
    })?;

    assert_eq!(editor.get_children(NodeKey::ROOT), &[*paragraph]);
    assert_eq!(editor.get_text_content(NodeKey::ROOT), "Herld");
    assert_eq!(result, CaretRange::collapsed(Caret::text_point(keys[0], Direction::Next, 2)));
    validate_tree(&editor)?;
    Ok(())
}

#[test]
fn test_delete_offsets_merges_plain_text() -> Result<()> {
    let mut doc = Document::default();
    doc.update(|editor| {
        let paragraph = editor.create_paragraph()?;
        let hello = editor.create_text("Hello ")?;
        let world = editor.create_text("World")?;
        editor.append_all(paragraph, &[hello, world])?;
        editor.append(NodeKey::ROOT, paragraph)
    })?;
    // Plain neighbours are merged on commit
    let before = doc.validate()?;
    assert_eq!(before.texts, 1);

    let landing = doc.delete_offsets(2, 8)?.expect("selection after delete");
    assert_eq!(doc.text_content(), "Herld");
    assert_eq!(doc.validate()?.texts, 1);
    assert_eq!(doc.editor().get_text_content_size(NodeKey::ROOT), 5);
    assert!(landing.is_collapsed());
    Ok(())
}

#[test]
fn test_merge_adjacent_paragraphs() -> Result<()> {
    init_tracing();
    let mut editor = Editor::new();
    let blocks = build(
        &mut editor,
        &[
            Block::Texts(&[TextData::new("AB")]),
            Block::Texts(&[TextData::new("CD")]),
        ],
    )?;
    let (first, ab) = (blocks[0].0, blocks[0].1[0]);
    let (second, cd) = (blocks[1].0, blocks[1].1[0]);

    let range = CaretRange::new(
        Caret::text_point(ab, Direction::Next, 2),
        Caret::text_point(cd, Direction::Next, 0),
    );
    assert!(!range.is_collapsed());
    let result = editor.update(|editor| remove_text_from_caret_range(editor, range))?;

    assert_eq!(editor.get_children(NodeKey::ROOT), &[first]);
    assert_eq!(editor.get_text_content(NodeKey::ROOT), "ABCD");
    assert!(!editor.has_node(second));
    assert_eq!(result.anchor, Caret::text_point(ab, Direction::Next, 2));
    validate_tree(&editor)?;
    Ok(())
}

#[test]
fn test_splice_nothing_is_a_no_op() -> Result<()> {
    let mut editor = Editor::new();
    let blocks = build(&mut editor, &[Block::LineBreaks(3)])?;
    let (paragraph, keys) = &blocks[0];

    let (_, summary) = editor.update_with_summary(|editor| {
        Caret::child(*paragraph, Direction::Next).splice(editor, 0, &[], Direction::Next)?;
        Caret::sibling(keys[1], Direction::Previous).splice(editor, 0, &[], Direction::Next)
    })?;

    assert_eq!(editor.get_children(*paragraph), keys.as_slice());
    assert!(summary.dirty_elements.is_empty());
    assert!(summary.dirty_leaves.is_empty());
    assert!(summary.removed.is_empty());
    Ok(())
}

#[test]
fn test_splice_all_children_leaves_no_orphans() -> Result<()> {
    let mut editor = Editor::new();
    let blocks = build(&mut editor, &[Block::LineBreaks(3)])?;
    let (paragraph, keys) = &blocks[0];

    let (_, summary) = editor.update_with_summary(|editor| {
        Caret::child(*paragraph, Direction::Next).splice(editor, keys.len(), &[], Direction::Next)
    })?;

    assert!(editor.get_children(*paragraph).is_empty());
    for key in keys {
        assert!(!editor.has_node(*key));
        assert!(summary.removed.contains(key));
    }
    validate_tree(&editor)?;
    Ok(())
}

#[test]
fn test_offset_round_trip() -> Result<()> {
    let mut editor = Editor::new();
    let blocks = build(
        &mut editor,
        &[
            Block::LineBreaks(0),
            Block::LineBreaks(1),
            Block::Texts(&[TextData::new("abc")]),
            Block::LineBreaks(2),
        ],
    )?;
    let view = OffsetView::build(&editor, 1);

    let mut points = vec![Point::element(blocks[0].0, 0)];
    points.extend((0..=1).map(|i| Point::element(blocks[1].0, i)));
    points.extend((0..=3).map(|i| Point::text(blocks[2].1[0], i)));
    points.extend((0..=2).map(|i| Point::element(blocks[3].0, i)));

    for anchor in &points {
        for focus in &points {
            let selection = RangeSelection::new(*anchor, *focus);
            let (start, end) = view
                .get_offsets_from_selection(&editor, &selection)
                .expect("attached points");
            let resolved = view.create_selection_from_offsets(&editor, start, end, None);
            assert_eq!(resolved, Some(selection), "offsets {}..{}", start, end);
        }
    }
    Ok(())
}

#[test]
fn test_diff_against_same_view_is_identity() -> Result<()> {
    let mut editor = Editor::new();
    build(
        &mut editor,
        &[
            Block::Texts(&[TextData::new("Hello"), TextData::new("!").with_format(TextFormat::BOLD)]),
            Block::LineBreaks(2),
            Block::Texts(&[]),
        ],
    )?;
    let view = OffsetView::build(&editor, 1);
    for offset in 0..=view.text_size() + 1 {
        assert_eq!(view.adjusted_offset_from_diff(offset, &view), offset);
    }
    Ok(())
}

#[test]
fn test_diff_follows_shrunk_block() -> Result<()> {
    let mut editor = Editor::new();
    let blocks = build(
        &mut editor,
        &[
            Block::Texts(&[TextData::new("Hello")]),
            Block::Texts(&[TextData::new("World")]),
        ],
    )?;
    let previous = OffsetView::build(&editor, 1);
    let hello = blocks[0].1[0];
    let world = blocks[1].1[0];

    editor.update(|editor| editor.splice_text(hello, 3, 2, ""))?;
    let view = OffsetView::build(&editor, 1);

    assert_eq!(view.adjusted_offset_from_diff(8, &previous), 6);
    let selection = view
        .create_selection_from_offsets(&editor, 8, 8, Some(&previous))
        .expect("offset still inside the document");
    assert_eq!(selection.anchor, Point::text(world, 2));
    Ok(())
}

#[test]
fn test_diff_collapses_into_deleted_block() -> Result<()> {
    let mut editor = Editor::new();
    let blocks = build(
        &mut editor,
        &[
            Block::Texts(&[TextData::new("Hello")]),
            Block::Texts(&[TextData::new("World")]),
            Block::Texts(&[TextData::new("!!")]),
        ],
    )?;
    let previous = OffsetView::build(&editor, 1);

    editor.update(|editor| editor.remove(blocks[1].0))?;
    let view = OffsetView::build(&editor, 1);

    assert_eq!(view.adjusted_offset_from_diff(8, &previous), 6);
    assert_eq!(view.adjusted_offset_from_diff(13, &previous), 7);
    let selection = view
        .create_selection_from_offsets(&editor, 8, 8, Some(&previous))
        .expect("offset still inside the document");
    assert_eq!(selection.anchor, Point::text(blocks[2].1[0], 0));
    Ok(())
}

#[test]
fn test_document_history_round_trip() -> Result<()> {
    let config = EditorConfig::from_json_str(r#"{ "historyMaxLevels": 1 }"#)?;
    let mut doc = Document::new(config);
    let text = doc.update(|editor| {
        let paragraph = editor.create_paragraph()?;
        let text = editor.create_text("one")?;
        editor.append(paragraph, text)?;
        editor.append(NodeKey::ROOT, paragraph)?;
        Ok(text)
    })?;
    doc.update(|editor| editor.set_text_content(text, "two"))?;

    assert_eq!(doc.history().undo_levels(), 1);
    assert!(doc.undo()?);
    assert_eq!(doc.text_content(), "one");
    assert!(!doc.undo()?);
    assert!(doc.redo()?);
    assert_eq!(doc.text_content(), "two");

    let json = doc.to_json()?;
    let copy = Document::from_json(&json, EditorConfig::default())?;
    assert_eq!(copy.text_content(), "two");
    Ok(())
}

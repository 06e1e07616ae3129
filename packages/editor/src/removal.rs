//! Removing everything between the two ends of a caret range
//!
//! ```text
//!   P1: [ "He|llo" ]        P2: [ "Wor|ld" ]
//!            anchor                  focus
//!
//!   1. walk the carets between anchor and focus, queue enclosed nodes
//!   2. remove the queue
//!   3. cut the partial text at both ends
//!   4. merge P2's children into P1 when P2 was entered
//!   5. collapse onto the first candidate still attached
//!
//!   P1: [ "He|ld" ]
//! ```

use crate::caret::{Caret, Direction, RootMode};
use crate::caret_utils::{normalize_caret, rewind_sibling_caret};
use crate::range::CaretRange;
use folio_model::{Editor, EditorError, EditorResult, NodeBehavior, NodeKey, NodeStore, TextData, TextMode};
use std::collections::HashSet;
use tracing::{debug, instrument, trace};

/// Remove the contents of `range` and return the collapsed caret range where
/// the selection lands, in the direction of the input range
///
/// Partially selected elements keep their place; when the range ends inside
/// a different block than it starts in, that block's remaining children are
/// moved onto the end of the starting block. Must be called inside an update.
#[instrument(level = "debug", skip(editor))]
pub fn remove_text_from_caret_range(editor: &mut Editor, initial: CaretRange) -> EditorResult<CaretRange> {
    if initial.is_collapsed() {
        return Ok(initial);
    }
    let range = initial.in_direction(&*editor, Direction::Next)?;

    let mut anchor_candidates = candidate_carets(&*editor, range.anchor)?;
    let mut focus_candidates = Vec::new();
    for caret in candidate_carets(&*editor, range.focus.flipped(&*editor)?)? {
        focus_candidates.push(caret.flipped(&*editor)?);
    }

    let mut seen_start: HashSet<NodeKey> = HashSet::new();
    let mut removed: Vec<NodeKey> = Vec::new();
    for caret in range.iter_node_carets(&*editor, RootMode::Root) {
        let origin = caret.origin();
        match caret {
            Caret::Child { .. } => {
                seen_start.insert(origin);
            }
            Caret::Sibling { .. } => {
                let is_element = editor.get_node(origin).map(|n| n.is_element()).unwrap_or(false);
                if !is_element || seen_start.contains(&origin) {
                    removed.push(origin);
                }
            }
            Caret::TextPoint { .. } => {}
        }
    }
    let slices = range.text_slices(&*editor);

    debug!(removed = removed.len(), entered = seen_start.len(), "queued enclosed nodes");
    for key in &removed {
        editor.remove(*key)?;
    }

    for slice in slices.into_iter().flatten() {
        let origin = slice.caret.origin();
        let Some(text) = editor.get_node(origin).and_then(|n| n.as_text()) else {
            continue;
        };
        let size = text.size();
        let mode = text.mode;
        let caret_before = rewind_sibling_caret(&*editor, &Caret::sibling(origin, Direction::Next))?;

        if slice.distance.unsigned_abs() == size || (mode == TextMode::Token && slice.distance != 0) {
            trace!(key = %origin, "removing whole text node");
            caret_before.remove(editor)?;
        } else if slice.distance != 0 {
            let mut next = slice.remove_text_slice(editor)?;
            if mode == TextMode::Segmented {
                let source = editor.node(origin)?.as_text().ok_or(EditorError::NotText(origin))?;
                let plain = TextData::new(source.text.clone())
                    .with_format(source.format)
                    .with_style(source.style.clone());
                let plain = editor.create_text_with(plain)?;
                caret_before.replace_or_insert(editor, plain, false)?;
                next = Caret::text_point(plain, Direction::Next, next.offset().unwrap_or(0));
            }
            if anchor_candidates.first().map(|c| c.origin()) == Some(origin) {
                anchor_candidates.insert(0, next);
            }
            if focus_candidates.first().map(|c| c.origin()) == Some(origin) {
                focus_candidates.insert(0, next);
            }
        }
    }

    let anchor_block = first_attached(&*editor, &anchor_candidates)
        .and_then(|caret| editor.get_ancestor_block(caret.origin()));
    let focus_block = first_attached(&*editor, &focus_candidates)
        .and_then(|caret| editor.get_ancestor_block(caret.origin()));
    if let (Some(anchor_block), Some(focus_block)) = (anchor_block, focus_block) {
        if should_merge(&*editor, anchor_block, focus_block, &seen_start) {
            let children = editor.get_children(focus_block).to_vec();
            debug!(
                into = %anchor_block,
                from = %focus_block,
                children = children.len(),
                "merging blocks"
            );
            Caret::child(anchor_block, Direction::Previous).splice(editor, 0, &children, Direction::Next)?;
            editor.remove(focus_block)?;
        }
    }

    let best = best_candidate(&*editor, &anchor_candidates, &focus_candidates)?;
    let landing = normalize_caret(&*editor, best);
    debug!(origin = %landing.origin(), "selection relocated");
    CaretRange::collapsed(landing).in_direction(&*editor, initial.direction())
}

/// The caret itself followed by the carets in front of its origin and of
/// each of its ancestors, innermost first
fn candidate_carets<S: NodeStore + ?Sized>(store: &S, anchor: Caret) -> EditorResult<Vec<Caret>> {
    let mut carets = vec![anchor];
    let mut parent = if anchor.is_child() {
        anchor.parent_caret(store, RootMode::Root)
    } else {
        Some(anchor.sibling_caret())
    };
    while let Some(caret) = parent {
        carets.push(rewind_sibling_caret(store, &caret)?);
        parent = caret.parent_caret(store, RootMode::Root);
    }
    Ok(carets)
}

fn first_attached<S: NodeStore + ?Sized>(store: &S, candidates: &[Caret]) -> Option<Caret> {
    candidates.iter().find(|caret| caret.is_attached(store)).copied()
}

/// First attached caret among the anchor candidates, then the focus ones
fn best_candidate<S: NodeStore + ?Sized>(
    store: &S,
    anchor_candidates: &[Caret],
    focus_candidates: &[Caret],
) -> EditorResult<Caret> {
    if let Some(caret) = first_attached(store, anchor_candidates).or_else(|| first_attached(store, focus_candidates)) {
        return Ok(caret);
    }
    let keys = anchor_candidates
        .iter()
        .chain(focus_candidates)
        .map(|caret| caret.origin())
        .collect();
    Err(EditorError::SelectionLost(keys))
}

fn should_merge<S: NodeStore + ?Sized>(
    store: &S,
    anchor_block: NodeKey,
    focus_block: NodeKey,
    seen_start: &HashSet<NodeKey>,
) -> bool {
    let is_element = |key: NodeKey| {
        store
            .get_node(key)
            .map(|node| node.is_element() && !node.is_root())
            .unwrap_or(false)
    };
    anchor_block != focus_block
        && seen_start.contains(&focus_block)
        && is_element(anchor_block)
        && is_element(focus_block)
        && !store.is_ancestor_of(focus_block, anchor_block)
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_model::TextFormat;

    fn build(editor: &mut Editor, paragraphs: &[&[TextData]]) -> Vec<(NodeKey, Vec<NodeKey>)> {
        editor
            .update(|editor| {
                let mut out = Vec::new();
                for texts in paragraphs {
                    let paragraph = editor.create_paragraph()?;
                    let mut keys = Vec::new();
                    for text in texts.iter() {
                        let key = editor.create_text_with(text.clone())?;
                        editor.append(paragraph, key)?;
                        keys.push(key);
                    }
                    editor.append(NodeKey::ROOT, paragraph)?;
                    out.push((paragraph, keys));
                }
                Ok(out)
            })
            .unwrap()
    }

    #[test]
    fn test_collapsed_range_is_untouched() {
        let mut editor = Editor::new();
        let blocks = build(&mut editor, &[&[TextData::new("abc")]]);
        let text = blocks[0].1[0];
        let caret = Caret::text_point(text, Direction::Next, 1);
        let result = editor
            .update(|editor| remove_text_from_caret_range(editor, CaretRange::collapsed(caret)))
            .unwrap();
        assert_eq!(result, CaretRange::collapsed(caret));
        assert_eq!(editor.get_text_content(NodeKey::ROOT), "abc");
    }

    #[test]
    fn test_token_text_goes_whole() {
        let mut editor = Editor::new();
        let blocks = build(
            &mut editor,
            &[&[
                TextData::new("ab"),
                TextData::new("@mention").with_mode(TextMode::Token),
            ]],
        );
        let (paragraph, keys) = &blocks[0];
        let range = CaretRange::new(
            Caret::text_point(keys[0], Direction::Next, 1),
            Caret::text_point(keys[1], Direction::Next, 3),
        );
        let result = editor
            .update(|editor| remove_text_from_caret_range(editor, range))
            .unwrap();
        assert_eq!(editor.get_text_content(*paragraph), "a");
        assert_eq!(result.anchor, Caret::text_point(keys[0], Direction::Next, 1));
        assert!(!editor.has_node(keys[1]));
    }

    #[test]
    fn test_segmented_text_becomes_plain() {
        let mut editor = Editor::new();
        let blocks = build(
            &mut editor,
            &[&[TextData::new("segment")
                .with_mode(TextMode::Segmented)
                .with_format(TextFormat::ITALIC)]],
        );
        let (paragraph, keys) = &blocks[0];
        let range = CaretRange::new(
            Caret::text_point(keys[0], Direction::Next, 0),
            Caret::text_point(keys[0], Direction::Next, 3),
        );
        let result = editor
            .update(|editor| remove_text_from_caret_range(editor, range))
            .unwrap();

        let replacement = editor.get_first_child(*paragraph).unwrap();
        assert_ne!(replacement, keys[0]);
        let text = editor.get_node(replacement).unwrap().as_text().unwrap();
        assert_eq!(text.text, "ment");
        assert_eq!(text.mode, TextMode::Normal);
        assert_eq!(text.format, TextFormat::ITALIC);
        assert_eq!(result.anchor, Caret::text_point(replacement, Direction::Next, 0));
    }

    #[test]
    fn test_backward_range_keeps_direction() {
        let mut editor = Editor::new();
        let blocks = build(&mut editor, &[&[TextData::new("abcdef")]]);
        let text = blocks[0].1[0];
        let range = CaretRange::new(
            Caret::text_point(text, Direction::Previous, 4),
            Caret::text_point(text, Direction::Previous, 1),
        );
        let result = editor
            .update(|editor| remove_text_from_caret_range(editor, range))
            .unwrap();
        assert_eq!(editor.get_text_content(NodeKey::ROOT), "aef");
        assert_eq!(result.direction(), Direction::Previous);
        assert_eq!(result.anchor, Caret::text_point(text, Direction::Previous, 1));
    }

    #[test]
    fn test_detached_candidates_lose_the_selection() {
        let mut editor = Editor::new();
        let blocks = build(&mut editor, &[&[TextData::new("one")], &[TextData::new("two")]]);
        let (gone, gone_texts) = blocks[0].clone();
        let kept = blocks[1].1[0];
        editor.update(|editor| editor.remove(gone)).unwrap();

        let anchors = [
            Caret::text_point(gone_texts[0], Direction::Next, 1),
            Caret::sibling(gone, Direction::Previous),
        ];
        let focuses = [Caret::child(gone, Direction::Next)];
        assert_eq!(
            best_candidate(&editor, &anchors, &focuses),
            Err(EditorError::SelectionLost(vec![gone_texts[0], gone, gone]))
        );

        let focuses = [Caret::text_point(kept, Direction::Next, 2)];
        assert_eq!(best_candidate(&editor, &anchors, &focuses), Ok(focuses[0]));
    }

    #[test]
    fn test_enclosed_paragraph_is_removed() {
        let mut editor = Editor::new();
        let blocks = build(
            &mut editor,
            &[
                &[TextData::new("one")],
                &[TextData::new("two")],
                &[TextData::new("three")],
            ],
        );
        let range = CaretRange::new(
            Caret::text_point(blocks[0].1[0], Direction::Next, 1),
            Caret::text_point(blocks[2].1[0], Direction::Next, 2),
        );
        editor
            .update(|editor| remove_text_from_caret_range(editor, range))
            .unwrap();

        assert_eq!(editor.get_children(NodeKey::ROOT), &[blocks[0].0]);
        assert_eq!(editor.get_text_content(NodeKey::ROOT), "oree");
        assert!(!editor.has_node(blocks[1].0));
        assert!(!editor.has_node(blocks[2].0));
    }
}

//! Char-indexed string helpers
//!
//! Text offsets throughout folio count Unicode scalar values, not bytes.

/// Number of chars in `text`
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Byte index of the char at `char_index`, clamped to the end of the string
pub fn byte_index(text: &str, char_index: usize) -> usize {
    text.char_indices()
        .nth(char_index)
        .map(|(i, _)| i)
        .unwrap_or(text.len())
}

/// Substring between two char offsets (clamped)
pub fn char_slice(text: &str, start: usize, end: usize) -> &str {
    let end = end.max(start);
    &text[byte_index(text, start)..byte_index(text, end)]
}

/// Replace `delete_count` chars at `offset` with `insert`
pub fn splice_chars(text: &str, offset: usize, delete_count: usize, insert: &str) -> String {
    let start = byte_index(text, offset);
    let end = byte_index(text, offset.saturating_add(delete_count));
    let mut out = String::with_capacity(text.len() + insert.len());
    out.push_str(&text[..start]);
    out.push_str(insert);
    out.push_str(&text[end..]);
    out
}

//! # Undo/Redo Stack
//!
//! Tracks committed states and restores them on undo/redo.
//!
//! ## Design
//!
//! - Each committed update records the state before and after it
//! - Undo restores the `before` state and moves the entry to the redo stack
//! - Redo restores the `after` state
//! - New entries clear the redo stack
//! - Batches group several updates into one undo step
//!
//! Entries are registry snapshots. Node versions live in the editor's arena,
//! so recording a state never copies node payloads.
//!
//! ## Example
//!
//! ```rust,ignore
//! let mut stack = UndoStack::new();
//! let before = editor.state().clone();
//! editor.update(|editor| { /* edit */ Ok(()) })?;
//! stack.record(before, editor.state().clone());
//!
//! stack.undo(&mut editor)?;
//! stack.redo(&mut editor)?;
//! ```

use folio_model::{Editor, EditorResult, EditorState};
use tracing::debug;

/// One undo step
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub before: EditorState,
    pub after: EditorState,
    pub description: Option<String>,
}

impl HistoryEntry {
    pub fn new(before: EditorState, after: EditorState) -> Self {
        Self {
            before,
            after,
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

#[derive(Debug, Default)]
struct Batch {
    entry: Option<HistoryEntry>,
    description: Option<String>,
}

/// Undo/redo stack over committed editor states
#[derive(Debug)]
pub struct UndoStack {
    /// Most recent last
    undo_stack: Vec<HistoryEntry>,

    /// Most recently undone last
    redo_stack: Vec<HistoryEntry>,

    /// 0 = unlimited
    max_levels: usize,

    current_batch: Option<Batch>,
}

impl UndoStack {
    /// Undo stack keeping 100 levels
    pub fn new() -> Self {
        Self::with_max_levels(100)
    }

    pub fn with_max_levels(max_levels: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_levels,
            current_batch: None,
        }
    }

    pub fn max_levels(&self) -> usize {
        self.max_levels
    }

    /// Record one committed update; inside a batch it extends the batch
    pub fn record(&mut self, before: EditorState, after: EditorState) {
        if let Some(batch) = &mut self.current_batch {
            match &mut batch.entry {
                Some(entry) => entry.after = after,
                None => batch.entry = Some(HistoryEntry::new(before, after)),
            }
            return;
        }
        self.push_entry(HistoryEntry::new(before, after));
    }

    /// Start grouping updates into a single undo step
    pub fn begin_batch(&mut self) {
        self.current_batch = Some(Batch::default());
    }

    /// Close the current batch; an empty batch records nothing
    pub fn end_batch(&mut self) {
        if let Some(batch) = self.current_batch.take() {
            if let Some(mut entry) = batch.entry {
                entry.description = batch.description;
                self.push_entry(entry);
            }
        }
    }

    pub fn is_batching(&self) -> bool {
        self.current_batch.is_some()
    }

    /// Describe the current batch (ignored outside a batch)
    pub fn set_batch_description(&mut self, description: impl Into<String>) {
        if let Some(batch) = &mut self.current_batch {
            batch.description = Some(description.into());
        }
    }

    fn push_entry(&mut self, entry: HistoryEntry) {
        self.undo_stack.push(entry);

        if self.max_levels > 0 && self.undo_stack.len() > self.max_levels {
            self.undo_stack.remove(0);
        }

        self.redo_stack.clear();
        debug!(levels = self.undo_stack.len(), "recorded history entry");
    }

    /// Restore the state before the most recent entry
    ///
    /// Returns `false` when there is nothing to undo.
    pub fn undo(&mut self, editor: &mut Editor) -> EditorResult<bool> {
        let Some(entry) = self.undo_stack.pop() else {
            return Ok(false);
        };
        if let Err(err) = editor.set_state(entry.before.clone()) {
            self.undo_stack.push(entry);
            return Err(err);
        }
        self.redo_stack.push(entry);
        Ok(true)
    }

    /// Re-apply the most recently undone entry
    pub fn redo(&mut self, editor: &mut Editor) -> EditorResult<bool> {
        let Some(entry) = self.redo_stack.pop() else {
            return Ok(false);
        };
        if let Err(err) = editor.set_state(entry.after.clone()) {
            self.redo_stack.push(entry);
            return Err(err);
        }
        self.undo_stack.push(entry);
        Ok(true)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_levels(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_levels(&self) -> usize {
        self.redo_stack.len()
    }

    /// Drop all history, including an open batch
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.current_batch = None;
    }

    pub fn undo_description(&self) -> Option<&str> {
        self.undo_stack
            .last()
            .and_then(|entry| entry.description.as_deref())
    }

    pub fn redo_description(&self) -> Option<&str> {
        self.redo_stack
            .last()
            .and_then(|entry| entry.description.as_deref())
    }
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new()
    }
}

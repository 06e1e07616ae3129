//! # Document Handle
//!
//! Core document abstraction for folio editing.
//!
//! A `Document` owns an [`Editor`], its undo history and its configuration.
//! Documents are either:
//! - **Memory-backed**: created empty or from JSON
//! - **File-backed**: loaded from and saved to a JSON file
//!
//! ## Lifecycle
//!
//! ```text
//! Load → Import → Update → Commit → Save
//!   ↓       ↓        ↓        ↓       ↓
//! File   State   Mutations History  File
//! ```

use crate::config::EditorConfig;
use crate::errors::{DocumentError, DocumentResult};
use crate::offset_view::OffsetView;
use crate::range::CaretRange;
use crate::removal::remove_text_from_caret_range;
use crate::selection::RangeSelection;
use crate::undo_stack::UndoStack;
use folio_common::{validate_tree, TreeStats};
use folio_model::{Editor, EditorResult, EditorState, NodeKey, NodeStore, SerializedEditorState};
use std::path::PathBuf;
use tracing::debug;

/// Editable folio document
#[derive(Debug)]
pub struct Document {
    /// Backing file (if any)
    pub path: Option<PathBuf>,

    /// Current version number (increments on each committed update)
    pub version: u64,

    editor: Editor,
    history: UndoStack,
    config: EditorConfig,
    dirty: bool,
}

impl Document {
    /// Empty memory-backed document
    pub fn new(config: EditorConfig) -> Self {
        Self {
            path: None,
            version: 0,
            editor: Editor::with_config(config.model_config()),
            history: UndoStack::with_max_levels(config.history_max_levels),
            config,
            dirty: false,
        }
    }

    /// Memory-backed document from a serialized state; history starts empty
    pub fn from_json(json: &str, config: EditorConfig) -> DocumentResult<Self> {
        let serialized = SerializedEditorState::from_json(json)?;
        let mut doc = Self::new(config);
        doc.editor.update(|editor| editor.import_state(&serialized))?;
        Ok(doc)
    }

    /// File-backed document
    pub fn load(path: impl Into<PathBuf>, config: EditorConfig) -> DocumentResult<Self> {
        let path = path.into();
        let json = std::fs::read_to_string(&path)?;
        let mut doc = Self::from_json(&json, config)?;
        doc.path = Some(path);
        Ok(doc)
    }

    /// Write the committed state back to the backing file
    pub fn save(&mut self) -> DocumentResult<()> {
        let Some(path) = &self.path else {
            return Err(DocumentError::NotFileBacked);
        };
        std::fs::write(path, self.to_json()?)?;
        self.dirty = false;
        Ok(())
    }

    /// Check if document has unsaved changes
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn editor(&self) -> &Editor {
        &self.editor
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn history(&self) -> &UndoStack {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut UndoStack {
        &mut self.history
    }

    pub fn state(&self) -> &EditorState {
        self.editor.state()
    }

    /// Run one update and record it in the history
    pub fn update<T>(&mut self, f: impl FnOnce(&mut Editor) -> EditorResult<T>) -> DocumentResult<T> {
        let before = self.editor.state().clone();
        let value = self.editor.update(f)?;
        self.history.record(before, self.editor.state().clone());
        self.version += 1;
        self.dirty = true;
        debug!(version = self.version, "document updated");
        Ok(value)
    }

    pub fn read<T>(&self, f: impl FnOnce(&Editor) -> T) -> T {
        self.editor.read(f)
    }

    /// Offset view of the committed state
    pub fn offset_view(&self) -> OffsetView {
        OffsetView::build(&self.editor, self.config.block_offset_size)
    }

    /// Offset view of an earlier snapshot of this document
    pub fn offset_view_of(&self, state: &EditorState) -> OffsetView {
        OffsetView::build(&self.editor.reader(state), self.config.block_offset_size)
    }

    /// Delete the content between two offsets
    ///
    /// Returns the collapsed selection left behind, resolved against the
    /// committed state, or `None` when the offsets fall outside the document.
    pub fn delete_offsets(&mut self, start: usize, end: usize) -> DocumentResult<Option<RangeSelection>> {
        let view = self.offset_view();
        let Some(selection) = view.create_selection_from_offsets(&self.editor, start, end, None) else {
            return Ok(None);
        };
        let block_offset_size = self.config.block_offset_size;
        let landing = self.update(|editor| {
            let range = CaretRange::from_selection(&*editor, &selection)?;
            let result = remove_text_from_caret_range(editor, range)?;
            let selection = result.to_selection(&*editor)?;
            let pending = OffsetView::build(&*editor, block_offset_size);
            Ok(pending
                .get_offsets_from_selection(&*editor, &selection)
                .map(|(anchor, _)| anchor))
        })?;
        let Some(offset) = landing else {
            return Ok(None);
        };
        Ok(self
            .offset_view()
            .create_selection_from_offsets(&self.editor, offset, offset, None))
    }

    /// Returns `false` when there is nothing to undo
    pub fn undo(&mut self) -> DocumentResult<bool> {
        let undone = self.history.undo(&mut self.editor)?;
        if undone {
            self.version += 1;
            self.dirty = true;
        }
        Ok(undone)
    }

    pub fn redo(&mut self) -> DocumentResult<bool> {
        let redone = self.history.redo(&mut self.editor)?;
        if redone {
            self.version += 1;
            self.dirty = true;
        }
        Ok(redone)
    }

    pub fn text_content(&self) -> String {
        self.editor.get_text_content(NodeKey::ROOT)
    }

    /// Check the committed tree's structural invariants
    pub fn validate(&self) -> DocumentResult<TreeStats> {
        Ok(validate_tree(&self.editor)?)
    }

    pub fn to_json(&self) -> DocumentResult<String> {
        Ok(self.editor.export_state().to_json()?)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

//! # Folio Editor
//!
//! Carets, ranges, offset views and the document facade on top of the
//! folio node store.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ model: keyed copy-on-write node store       │
//! └─────────────────────────────────────────────┘
//!            ↓                        ↓
//! ┌───────────────────────┐  ┌──────────────────────┐
//! │ caret / range         │  │ offset view          │
//! │  - directional carets │  │  - linear offsets    │
//! │  - text slices        │  │  - offset ↔ selection│
//! │  - range removal      │  │  - snapshot diffing  │
//! └───────────────────────┘  └──────────────────────┘
//!            ↓                        ↓
//! ┌─────────────────────────────────────────────┐
//! │ document: config + updates + undo history   │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Carets are values**: they hold keys and are recomputed against the
//!    store on every read, so they never dangle across updates
//! 2. **Views are derived**: an offset view is rebuilt from a snapshot, never
//!    patched in place
//! 3. **History is snapshots**: undo restores a committed state rather than
//!    replaying inverse operations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use folio_editor::{Document, EditorConfig};
//!
//! let mut doc = Document::load("notes.json", EditorConfig::load(".")?)?;
//!
//! // Delete "llo Wo" from "Hello World"
//! let landing = doc.delete_offsets(2, 8)?;
//!
//! doc.undo()?;
//! doc.save()?;
//! ```

mod caret;
mod caret_utils;
mod config;
mod document;
mod errors;
mod offset_view;
mod range;
mod removal;
mod selection;
mod undo_stack;

pub use caret::{AdjacentCarets, Caret, Direction, RootMode};
pub use caret_utils::{
    adjacent_child_caret, caret_from_point, caret_in_direction, child_caret_at_index,
    child_caret_or_self, normalize_caret, point_from_caret, rewind_sibling_caret,
    text_point_caret_at_edge,
};
pub use config::{EditorConfig, DEFAULT_CONFIG_NAME};
pub use document::Document;
pub use errors::{DocumentError, DocumentResult};
pub use offset_view::{OffsetKind, OffsetNode, OffsetView};
pub use range::{CaretRange, NodeCaretIter, TextPointCaretSlice};
pub use removal::remove_text_from_caret_range;
pub use selection::{compare_points, Point, PointType, RangeSelection};
pub use undo_stack::{HistoryEntry, UndoStack};

// Re-export the model for convenience
pub use folio_model;

//! # Folio Model
//!
//! The node store behind the folio editor: a copy-on-write document tree with
//! stable keys.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ Arena: every node version ever written      │
//! │  slot 0   slot 1   slot 2   slot 3 ...      │
//! └─────────────────────────────────────────────┘
//!          ▲          ▲                ▲
//! ┌────────┴───┐  ┌───┴──────────┐  ┌──┴────────┐
//! │ committed  │  │ older        │  │ pending   │
//! │ EditorState│  │ snapshots    │  │ update    │
//! │ key → slot │  │ (history)    │  │ key → slot│
//! └────────────┘  └──────────────┘  └───────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Keys, not pointers**: parent and child links are `NodeKey`s resolved
//!    through the registry of the state being read
//! 2. **Clone on first write**: an update never touches a slot that a
//!    committed snapshot can see
//! 3. **One update at a time**: a second `begin_update` is `ReentrantUpdate`
//! 4. **All or nothing**: a failing update is discarded, never half-applied
//!
//! ## Usage
//!
//! ```rust,ignore
//! use folio_model::{Editor, NodeKey, NodeStore};
//!
//! let mut editor = Editor::new();
//! editor.update(|editor| {
//!     let paragraph = editor.create_paragraph()?;
//!     let text = editor.create_text("Hello")?;
//!     editor.append(paragraph, text)?;
//!     editor.append(NodeKey::ROOT, paragraph)
//! })?;
//!
//! assert_eq!(editor.get_text_content(NodeKey::ROOT), "Hello");
//! ```

mod arena;
mod editor;
mod errors;
mod key;
mod mutations;
mod node;
mod normalize;
mod serialize;
mod state;
mod store;
pub mod text;

pub use arena::{Arena, SlotId};
pub use editor::{CommitSummary, Editor, ModelConfig};
pub use errors::{EditorError, EditorResult};
pub use key::NodeKey;
pub use node::{
    DecoratorData, ElementData, Node, NodeBehavior, NodeKind, TextData, TextDetail, TextFormat,
    TextMode,
};
pub use serialize::{export_node, export_state, SerializedEditorState, SerializedNode};
pub use state::{EditorState, NodeRef, StateReader};
pub use store::{NodeStore, TextContentOptions};

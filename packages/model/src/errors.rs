//! Error types for the node store
//!
//! Every variant is a precondition violation: the operation that produced it
//! must abort and the surrounding update is discarded. Ordinary traversal
//! outcomes (no sibling, no parent at the root) are `None`, never errors.

use crate::NodeKey;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditorError {
    #[error("No active update: mutations must run inside Editor::update")]
    NoActiveUpdate,

    #[error("An update is already in progress")]
    ReentrantUpdate,

    #[error("Node not found: {0}")]
    NodeNotFound(NodeKey),

    #[error("Node is not an element: {0}")]
    NotAnElement(NodeKey),

    #[error("Node is not text: {0}")]
    NotText(NodeKey),

    #[error("Node has no parent: {0}")]
    NoParent(NodeKey),

    #[error("Would create cycle: {node} cannot be attached under {parent}")]
    CycleDetected { node: NodeKey, parent: NodeKey },

    #[error("Offset {offset} is outside text node {key} (size {size})")]
    OffsetOutOfRange {
        key: NodeKey,
        offset: usize,
        size: usize,
    },

    #[error("Invalid structure: {0}")]
    InvalidStructure(String),

    #[error("Splice underflow: ran out of siblings while {0:?} were still queued for removal")]
    SpliceUnderflow(Vec<NodeKey>),

    #[error("Selection was lost: no candidate among {0:?} is still attached")]
    SelectionLost(Vec<NodeKey>),

    #[error("Stale node reference: {0} points at a discarded version")]
    StaleReference(NodeKey),
}

pub type EditorResult<T> = Result<T, EditorError>;

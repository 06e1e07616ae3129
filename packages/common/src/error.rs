use folio_model::NodeKey;
use thiserror::Error;

/// A broken tree invariant found by [`TreeValidator`](crate::TreeValidator)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Root node is missing")]
    MissingRoot,

    #[error("Root node has a parent: {0}")]
    RootHasParent(NodeKey),

    #[error("{parent} lists missing child {child}")]
    MissingChild { parent: NodeKey, child: NodeKey },

    #[error("{child} is listed under {parent} but points at {actual:?}")]
    ParentMismatch {
        parent: NodeKey,
        child: NodeKey,
        actual: Option<NodeKey>,
    },

    #[error("{child} appears more than once in the tree")]
    DuplicateChild { child: NodeKey },

    #[error("Detached node still registered: {0}")]
    DetachedNode(NodeKey),
}

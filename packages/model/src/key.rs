//! Node keys

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identity of a node across every version of a document.
///
/// Keys are allocated from a per-editor counter and never reused, so a key
/// that disappears from the registry never comes back with a different node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeKey(u32);

impl NodeKey {
    /// Key of the document root
    pub const ROOT: NodeKey = NodeKey(0);

    pub(crate) const fn new(raw: u32) -> Self {
        NodeKey(raw)
    }

    /// Raw numeric value
    pub fn get(self) -> u32 {
        self.0
    }

    pub fn is_root(self) -> bool {
        self == Self::ROOT
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            write!(f, "root")
        } else {
            write!(f, "#{}", self.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_display() {
        assert_eq!(NodeKey::ROOT.to_string(), "root");
        assert_eq!(NodeKey::new(7).to_string(), "#7");
        assert!(NodeKey::ROOT.is_root());
        assert!(!NodeKey::new(7).is_root());
    }
}

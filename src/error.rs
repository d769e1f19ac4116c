use thiserror::Error;

use crate::node::NodeId;

/// Errors surfaced by tree mutators and by [`Tree::validate`](crate::Tree::validate).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TreeError {
    /// A tree has exactly one root; erasing it would leave its children with
    /// no parent to re-home into.
    #[error("the root node cannot be erased")]
    RootNotErasable,

    /// A position-indexed child operation was given a position outside
    /// `[0, child_count)`.
    #[error("child position {position} is out of range ({len} children)")]
    OutOfRange { position: usize, len: usize },

    /// A node's parent link disagrees with the child list that holds it.
    #[error("parent link of node {0} does not match the child list holding it")]
    BrokenParentLink(NodeId),

    /// The sibling links around a node are not mutually consistent.
    #[error("sibling links around node {0} are not mutually consistent")]
    BrokenSiblingLink(NodeId),

    /// A node's cached child count disagrees with its actual child list.
    #[error("cached child count of node {0} disagrees with its child list")]
    ChildCountMismatch(NodeId),

    /// The number of nodes reachable from the root disagrees with the number
    /// of occupied slots.
    #[error("{reachable} nodes reachable from the root, {len} allocated")]
    NodeCountMismatch { reachable: usize, len: usize },
}

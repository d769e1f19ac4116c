//! Node handles and arena slot types.
//!
//! Nodes live in a slot vector owned by [`Tree`](crate::Tree) and are
//! addressed by [`NodeId`]. Each occupied slot carries the value plus the
//! intrusive links that place the node in the structure: a parent
//! back-reference, first/last child handles, and prev/next sibling handles
//! forming a doubly-linked sibling list. The sibling links are what make
//! arbitrary-position splicing O(1) and keep every other sibling's handle
//! valid across insertions and removals.

use std::fmt;

/// A type-safe handle to a node within a [`Tree`](crate::Tree).
/// Wraps a `usize` index into the underlying slot vector.
///
/// Handles stay valid across mutations of *other* nodes. A handle held
/// across the erasure of its own node is stale; using it afterwards either
/// panics or, if the slot has been recycled, silently refers to the new
/// occupant. Callers own that contract.
#[derive(Clone, Debug, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeId(pub(crate) usize);

impl From<usize> for NodeId {
    fn from(i: usize) -> Self {
        NodeId(i)
    }
}

impl From<NodeId> for usize {
    fn from(id: NodeId) -> Self {
        id.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An occupied arena slot: the value and the intrusive structure links.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub(crate) struct Node<T> {
    pub(crate) value: T,
    pub(crate) parent: Option<NodeId>,
    pub(crate) first_child: Option<NodeId>,
    pub(crate) last_child: Option<NodeId>,
    pub(crate) prev_sibling: Option<NodeId>,
    pub(crate) next_sibling: Option<NodeId>,
    /// Length of the sibling list under this node, maintained by every splice.
    pub(crate) child_count: usize,
}

impl<T> Node<T> {
    pub(crate) fn root(value: T) -> Self {
        Node {
            value,
            parent: None,
            first_child: None,
            last_child: None,
            prev_sibling: None,
            next_sibling: None,
            child_count: 0,
        }
    }

    pub(crate) fn child(value: T, parent: NodeId) -> Self {
        Node {
            parent: Some(parent),
            ..Node::root(value)
        }
    }
}

/// An arena slot: a live node, or a vacancy threaded onto the free list.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub(crate) enum Entry<T> {
    Occupied(Node<T>),
    Vacant { next_free: Option<usize> },
}

impl<T> Entry<T> {
    pub(crate) fn as_node(&self) -> Option<&Node<T>> {
        match self {
            Entry::Occupied(node) => Some(node),
            Entry::Vacant { .. } => None,
        }
    }

    pub(crate) fn as_node_mut(&mut self) -> Option<&mut Node<T>> {
        match self {
            Entry::Occupied(node) => Some(node),
            Entry::Vacant { .. } => None,
        }
    }
}

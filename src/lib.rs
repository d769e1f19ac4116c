//! # Salix
//!
//! Salix is a Rust library providing a generic multi-way tree with cheap
//! structural surgery and order-aware traversal.
//!
//! Nodes live in a slot arena addressed by stable [`NodeId`] handles, and an
//! intrusive doubly-linked sibling list threads through the slots so that
//! inserting or removing a child at any position is O(1) and never
//! invalidates the handles of other nodes.
//!
//! The core pieces are:
//! *   [`Tree<T>`]: owns the nodes and exposes the structural mutators:
//!     child insertion at the front/back/an arbitrary position, [`erase`]
//!     (remove one node, re-homing its children), [`prune`] (detach a
//!     subtree into a new tree), [`chop`] (detach and destroy a subtree),
//!     and the `graft_*` family (adopt another tree as a subtree).
//! *   [`PreOrderCursor`] / [`PostOrderCursor`]: non-owning cursors that
//!     traverse a subtree without recursion by carrying an explicit stack of
//!     pending frames, and that navigate laterally among siblings and
//!     upward to parents.
//!
//! [`erase`]: Tree::erase
//! [`prune`]: Tree::prune
//! [`chop`]: Tree::chop
//!
//! ```
//! use salix::Tree;
//!
//! let mut tree = Tree::with_root(1);
//! let root = tree.root().unwrap();
//! let two = tree.push_back_child(root, 2);
//! tree.push_back_child(root, 4);
//! tree.push_back_child(two, 3);
//!
//! assert_eq!(tree.pre_order().map(|id| tree[id]).collect::<Vec<_>>(), [1, 2, 3, 4]);
//! assert_eq!(tree.post_order().map(|id| tree[id]).collect::<Vec<_>>(), [3, 2, 4, 1]);
//!
//! let branch = tree.prune(two);
//! assert_eq!(branch.len(), 2);
//! assert_eq!(tree.pre_order().map(|id| tree[id]).collect::<Vec<_>>(), [1, 4]);
//! ```

pub mod cursor;
pub mod error;
pub mod node;
pub mod tree;

pub use cursor::{PostOrderCursor, PreOrderCursor};
pub use error::TreeError;
pub use node::NodeId;
pub use tree::{AncestorsIter, ChildrenIter, Tree};

#[cfg(test)]
mod tests;

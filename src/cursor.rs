//! Order-aware cursors over a [`Tree`](crate::Tree).
//!
//! A cursor is a non-owning view: it borrows the tree, targets one node (or
//! the exhausted sentinel), and carries the explicit stack of pending frames
//! that lets the traversal resume without recursion. Two concrete cursor
//! types exist, one per traversal order, with explicit conversions between
//! them; there is no virtual hierarchy.
//!
//! Both cursors implement [`Iterator`] yielding [`NodeId`]s; values are read
//! by indexing the tree with the yielded handles.
//!
//! Because a cursor holds a shared borrow of its tree, the borrow checker
//! rejects structural mutation while any cursor is live. Handles extracted
//! from a cursor (`node()`) outlive it and feed the tree's mutators.

use std::fmt;
use std::iter::FusedIterator;
use std::ptr;

use crate::node::NodeId;
use crate::tree::Tree;

/// One pending level of a depth-first walk: a node whose children are being
/// visited, plus the first child not yet entered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Frame {
    node: NodeId,
    next_child: Option<NodeId>,
}

// ---------------------------------------------------------------------------
// Pre-order
// ---------------------------------------------------------------------------

/// A cursor visiting a subtree in pre-order: each node before its children,
/// children left to right.
///
/// The traversal scope is the subtree rooted at the node the cursor was
/// created on; [`Tree::pre_order`] starts at the root and therefore covers
/// the whole tree.
///
/// # Examples
///
/// ```
/// use salix::Tree;
///
/// let mut tree = Tree::new();
/// let root = tree.set_root('a');
/// let b = tree.push_back_child(root, 'b');
/// tree.push_back_child(root, 'c');
/// tree.push_back_child(b, 'd');
///
/// let order: String = tree.pre_order().map(|id| tree[id]).collect();
/// assert_eq!(order, "abdc");
/// ```
pub struct PreOrderCursor<'t, T> {
    tree: &'t Tree<T>,
    current: Option<NodeId>,
    path: Vec<Frame>,
}

impl<'t, T> PreOrderCursor<'t, T> {
    pub(crate) fn new(tree: &'t Tree<T>, start: Option<NodeId>) -> Self {
        PreOrderCursor {
            tree,
            current: start,
            path: Vec::new(),
        }
    }

    /// Handle of the targeted node, or `None` once exhausted.
    pub fn node(&self) -> Option<NodeId> {
        self.current
    }

    /// Value of the targeted node, or `None` once exhausted.
    pub fn value(&self) -> Option<&'t T> {
        self.current.map(|id| &self.tree[id])
    }

    /// True once the traversal has moved past its last node.
    pub fn is_end(&self) -> bool {
        self.current.is_none()
    }

    /// Moves to the pre-order successor. Exhausted cursors stay exhausted.
    ///
    /// A node with children is entered (its frame remembers which child to
    /// resume with); at a leaf, frames are popped until one still has an
    /// unvisited child. An empty stack with nothing left marks the end.
    pub fn advance(&mut self) {
        let Some(node) = self.current else { return };

        if let Some(first) = self.tree.first_child(node) {
            self.path.push(Frame {
                node,
                next_child: self.tree.next_sibling(first),
            });
            self.current = Some(first);
            return;
        }

        while let Some(top) = self.path.last_mut() {
            if let Some(next) = top.next_child {
                top.next_child = self.tree.next_sibling(next);
                self.current = Some(next);
                return;
            }
            self.path.pop();
        }
        self.current = None;
    }

    /// Cursor at the parent of the targeted node; exhausted when the target
    /// is the root (or the cursor already was exhausted).
    ///
    /// Navigation returns a fresh cursor by value: its pending path is
    /// empty, so its traversal scope is the subtree rooted at its target.
    pub fn parent(&self) -> Self {
        self.reposition(|tree, node| tree.parent(node))
    }

    /// Cursor at the first child of the targeted node, exhausted if none.
    pub fn first_child(&self) -> Self {
        self.reposition(|tree, node| tree.first_child(node))
    }

    /// Cursor at the last child of the targeted node, exhausted if none.
    pub fn last_child(&self) -> Self {
        self.reposition(|tree, node| tree.last_child(node))
    }

    /// Cursor at the next sibling of the targeted node, exhausted if none.
    pub fn next_sibling(&self) -> Self {
        self.reposition(|tree, node| tree.next_sibling(node))
    }

    /// Cursor at the previous sibling of the targeted node, exhausted if none.
    pub fn prev_sibling(&self) -> Self {
        self.reposition(|tree, node| tree.prev_sibling(node))
    }

    fn reposition(&self, go: impl FnOnce(&Tree<T>, NodeId) -> Option<NodeId>) -> Self {
        PreOrderCursor::new(self.tree, self.current.and_then(|id| go(self.tree, id)))
    }

    /// Re-derives a post-order cursor from the targeted node alone: the
    /// result begins a post-order traversal of the target's subtree, so it
    /// is positioned at that subtree's leftmost-deepest leaf.
    pub fn to_post_order(&self) -> PostOrderCursor<'t, T> {
        PostOrderCursor::new(self.tree, self.current)
    }
}

impl<T> Clone for PreOrderCursor<'_, T> {
    fn clone(&self) -> Self {
        PreOrderCursor {
            tree: self.tree,
            current: self.current,
            path: self.path.clone(),
        }
    }
}

/// Cursors compare by targeted node identity within the same tree; all
/// exhausted cursors of one tree are equal to each other.
impl<T> PartialEq for PreOrderCursor<'_, T> {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self.tree, other.tree) && self.current == other.current
    }
}

impl<T> Eq for PreOrderCursor<'_, T> {}

impl<T> fmt::Debug for PreOrderCursor<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreOrderCursor")
            .field("current", &self.current)
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl<T> Iterator for PreOrderCursor<'_, T> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.current?;
        self.advance();
        Some(node)
    }
}

impl<T> FusedIterator for PreOrderCursor<'_, T> {}

// ---------------------------------------------------------------------------
// Post-order
// ---------------------------------------------------------------------------

/// A cursor visiting a subtree in post-order: all children (left to right)
/// before their parent.
///
/// Construction always eagerly descends to the first post-order node of the
/// target subtree, because children must be visited before the node the
/// cursor was created on. Cloning copies the live traversal state verbatim,
/// so a mid-traversal clone resumes exactly where the original stood.
///
/// # Examples
///
/// ```
/// use salix::Tree;
///
/// let mut tree = Tree::new();
/// let root = tree.set_root('a');
/// let b = tree.push_back_child(root, 'b');
/// tree.push_back_child(root, 'c');
/// tree.push_back_child(b, 'd');
///
/// let order: String = tree.post_order().map(|id| tree[id]).collect();
/// assert_eq!(order, "dbca");
/// ```
pub struct PostOrderCursor<'t, T> {
    tree: &'t Tree<T>,
    current: Option<NodeId>,
    path: Vec<Frame>,
}

impl<'t, T> PostOrderCursor<'t, T> {
    pub(crate) fn new(tree: &'t Tree<T>, start: Option<NodeId>) -> Self {
        let mut cursor = PostOrderCursor {
            tree,
            current: None,
            path: Vec::new(),
        };
        if let Some(node) = start {
            cursor.path.push(Frame {
                node,
                next_child: tree.first_child(node),
            });
            cursor.advance();
        }
        cursor
    }

    /// Handle of the targeted node, or `None` once exhausted.
    pub fn node(&self) -> Option<NodeId> {
        self.current
    }

    /// Value of the targeted node, or `None` once exhausted.
    pub fn value(&self) -> Option<&'t T> {
        self.current.map(|id| &self.tree[id])
    }

    /// True once the traversal has moved past its last node.
    pub fn is_end(&self) -> bool {
        self.current.is_none()
    }

    /// Moves to the post-order successor. Exhausted cursors stay exhausted.
    ///
    /// While the top frame still has unvisited children, the next child's
    /// frame is pushed and descended into; a frame with no unvisited
    /// children pops, and its node is the next result. An empty stack marks
    /// the end.
    pub fn advance(&mut self) {
        while let Some(top) = self.path.last_mut() {
            if let Some(child) = top.next_child {
                top.next_child = self.tree.next_sibling(child);
                let frame = Frame {
                    node: child,
                    next_child: self.tree.first_child(child),
                };
                self.path.push(frame);
                continue;
            }
            let done = self.path.pop().expect("loop guarantees a top frame");
            self.current = Some(done.node);
            return;
        }
        self.current = None;
    }

    /// Cursor positioned at the parent of the targeted node; exhausted when
    /// the target is the root.
    ///
    /// Navigation repositions without pending traversal state: the returned
    /// cursor is meant for inspection and further lateral movement, and
    /// advancing it ends the traversal. To walk the target's subtree in
    /// post-order, use [`Tree::post_order_at`].
    pub fn parent(&self) -> Self {
        self.reposition(|tree, node| tree.parent(node))
    }

    /// Cursor positioned at the first child of the targeted node.
    pub fn first_child(&self) -> Self {
        self.reposition(|tree, node| tree.first_child(node))
    }

    /// Cursor positioned at the last child of the targeted node.
    pub fn last_child(&self) -> Self {
        self.reposition(|tree, node| tree.last_child(node))
    }

    /// Cursor positioned at the next sibling of the targeted node.
    pub fn next_sibling(&self) -> Self {
        self.reposition(|tree, node| tree.next_sibling(node))
    }

    /// Cursor positioned at the previous sibling of the targeted node.
    pub fn prev_sibling(&self) -> Self {
        self.reposition(|tree, node| tree.prev_sibling(node))
    }

    fn reposition(&self, go: impl FnOnce(&Tree<T>, NodeId) -> Option<NodeId>) -> Self {
        PostOrderCursor {
            tree: self.tree,
            current: self.current.and_then(|id| go(self.tree, id)),
            path: Vec::new(),
        }
    }

    /// Re-derives a pre-order cursor positioned at the targeted node; its
    /// traversal scope is that node's subtree.
    pub fn to_pre_order(&self) -> PreOrderCursor<'t, T> {
        PreOrderCursor::new(self.tree, self.current)
    }
}

impl<T> Clone for PostOrderCursor<'_, T> {
    fn clone(&self) -> Self {
        PostOrderCursor {
            tree: self.tree,
            current: self.current,
            path: self.path.clone(),
        }
    }
}

/// Cursors compare by targeted node identity within the same tree; all
/// exhausted cursors of one tree are equal to each other.
impl<T> PartialEq for PostOrderCursor<'_, T> {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self.tree, other.tree) && self.current == other.current
    }
}

impl<T> Eq for PostOrderCursor<'_, T> {}

impl<T> fmt::Debug for PostOrderCursor<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostOrderCursor")
            .field("current", &self.current)
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl<T> Iterator for PostOrderCursor<'_, T> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.current?;
        self.advance();
        Some(node)
    }
}

impl<T> FusedIterator for PostOrderCursor<'_, T> {}

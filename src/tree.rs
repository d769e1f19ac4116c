//! The tree container and its structural mutators.
//!
//! All splicing logic that maintains the parent/child/sibling invariants
//! lives here; [`cursor`](crate::cursor) only ever reads the structure.
//! Nodes are stored in a slot arena and addressed by [`NodeId`]; the
//! intrusive sibling links give O(1) insertion and removal at any position
//! without invalidating the handles of other nodes.

use std::fmt;
use std::mem;
use std::ops::{Index, IndexMut};

use ahash::AHashMap;
use itertools::{EitherOrBoth, Itertools};

use crate::cursor::{PostOrderCursor, PreOrderCursor};
use crate::error::TreeError;
use crate::node::{Entry, Node, NodeId};

/// A generic multi-way tree.
///
/// Values hang off a single root; every node keeps its children in insertion
/// order, which is also the traversal order. Structural changes go through
/// the mutators on this type, positions are communicated through [`NodeId`]
/// handles, and traversal happens through the cursors returned by
/// [`pre_order`](Tree::pre_order) and [`post_order`](Tree::post_order).
///
/// # Examples
///
/// ```
/// use salix::Tree;
///
/// let mut tree = Tree::new();
/// let root = tree.set_root("root");
/// let left = tree.push_back_child(root, "left");
/// tree.push_back_child(root, "right");
/// tree.push_back_child(left, "leaf");
///
/// let visited: Vec<&str> = tree.pre_order().map(|id| tree[id]).collect();
/// assert_eq!(visited, ["root", "left", "leaf", "right"]);
/// ```
#[derive(Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tree<T> {
    slots: Vec<Entry<T>>,
    free_head: Option<usize>,
    root: Option<NodeId>,
    len: usize,
}

impl<T> Tree<T> {
    /// Creates an empty tree.
    pub fn new() -> Self {
        Tree {
            slots: Vec::new(),
            free_head: None,
            root: None,
            len: 0,
        }
    }

    /// Creates a tree holding a single root node.
    pub fn with_root(value: T) -> Self {
        let mut tree = Tree::new();
        tree.set_root(value);
        tree
    }

    /// True iff the tree has no root.
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Number of nodes in the tree.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Handle of the root node, if any.
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    // --------------------------------------------------------------------
    // Arena plumbing
    // --------------------------------------------------------------------

    fn node(&self, id: NodeId) -> &Node<T> {
        self.slots[id.0]
            .as_node()
            .unwrap_or_else(|| panic!("stale or foreign node id: {id}"))
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node<T> {
        self.slots[id.0]
            .as_node_mut()
            .unwrap_or_else(|| panic!("stale or foreign node id: {id}"))
    }

    fn alloc(&mut self, node: Node<T>) -> NodeId {
        self.len += 1;
        match self.free_head {
            Some(slot) => {
                self.free_head = match self.slots[slot] {
                    Entry::Vacant { next_free } => next_free,
                    Entry::Occupied(_) => unreachable!("free list points at an occupied slot"),
                };
                self.slots[slot] = Entry::Occupied(node);
                NodeId(slot)
            }
            None => {
                let id = NodeId(self.slots.len());
                self.slots.push(Entry::Occupied(node));
                id
            }
        }
    }

    fn dealloc(&mut self, id: NodeId) -> Node<T> {
        if self.slots[id.0].as_node().is_none() {
            panic!("stale or foreign node id: {id}");
        }
        let entry = mem::replace(
            &mut self.slots[id.0],
            Entry::Vacant {
                next_free: self.free_head,
            },
        );
        self.free_head = Some(id.0);
        self.len -= 1;
        match entry {
            Entry::Occupied(node) => node,
            Entry::Vacant { .. } => unreachable!(),
        }
    }

    // --------------------------------------------------------------------
    // Sibling-list splicing
    //
    // The link helpers are the only code that touches the sibling list.
    // They also maintain the child's parent link and the parent's cached
    // child count, so every public mutator composes them.
    // --------------------------------------------------------------------

    fn link_front(&mut self, parent: NodeId, child: NodeId) {
        let old_first = self.node(parent).first_child;
        {
            let c = self.node_mut(child);
            c.parent = Some(parent);
            c.prev_sibling = None;
            c.next_sibling = old_first;
        }
        match old_first {
            Some(first) => self.node_mut(first).prev_sibling = Some(child),
            None => self.node_mut(parent).last_child = Some(child),
        }
        let p = self.node_mut(parent);
        p.first_child = Some(child);
        p.child_count += 1;
    }

    fn link_back(&mut self, parent: NodeId, child: NodeId) {
        let old_last = self.node(parent).last_child;
        {
            let c = self.node_mut(child);
            c.parent = Some(parent);
            c.prev_sibling = old_last;
            c.next_sibling = None;
        }
        match old_last {
            Some(last) => self.node_mut(last).next_sibling = Some(child),
            None => self.node_mut(parent).first_child = Some(child),
        }
        let p = self.node_mut(parent);
        p.last_child = Some(child);
        p.child_count += 1;
    }

    fn link_before(&mut self, parent: NodeId, anchor: NodeId, child: NodeId) {
        let prev = self.node(anchor).prev_sibling;
        {
            let c = self.node_mut(child);
            c.parent = Some(parent);
            c.prev_sibling = prev;
            c.next_sibling = Some(anchor);
        }
        self.node_mut(anchor).prev_sibling = Some(child);
        match prev {
            Some(prev) => self.node_mut(prev).next_sibling = Some(child),
            None => self.node_mut(parent).first_child = Some(child),
        }
        self.node_mut(parent).child_count += 1;
    }

    /// Detaches `node` from its parent's child list. The node keeps its own
    /// subtree; only the upward and lateral links are severed.
    fn unlink(&mut self, node: NodeId) {
        let (parent, prev, next) = {
            let n = self.node(node);
            (n.parent, n.prev_sibling, n.next_sibling)
        };
        if let Some(prev) = prev {
            self.node_mut(prev).next_sibling = next;
        }
        if let Some(next) = next {
            self.node_mut(next).prev_sibling = prev;
        }
        if let Some(parent) = parent {
            let p = self.node_mut(parent);
            if p.first_child == Some(node) {
                p.first_child = next;
            }
            if p.last_child == Some(node) {
                p.last_child = prev;
            }
            p.child_count -= 1;
        }
        let n = self.node_mut(node);
        n.parent = None;
        n.prev_sibling = None;
        n.next_sibling = None;
    }

    // --------------------------------------------------------------------
    // Construction mutators
    // --------------------------------------------------------------------

    /// Creates the root if none exists, otherwise overwrites the root's
    /// value in place. Returns the root's handle.
    ///
    /// # Examples
    ///
    /// ```
    /// # use salix::Tree;
    /// let mut tree = Tree::new();
    /// let root = tree.set_root(1);
    /// assert_eq!(tree.set_root(2), root);
    /// assert_eq!(tree[root], 2);
    /// assert_eq!(tree.len(), 1);
    /// ```
    pub fn set_root(&mut self, value: T) -> NodeId {
        match self.root {
            Some(root) => {
                self.node_mut(root).value = value;
                root
            }
            None => {
                let root = self.alloc(Node::root(value));
                self.root = Some(root);
                root
            }
        }
    }

    /// Allocates a new node holding `value` as the first child of `parent`.
    pub fn push_front_child(&mut self, parent: NodeId, value: T) -> NodeId {
        let child = self.alloc(Node::child(value, parent));
        self.link_front(parent, child);
        child
    }

    /// Allocates a new node holding `value` as the last child of `parent`.
    pub fn push_back_child(&mut self, parent: NodeId, value: T) -> NodeId {
        let child = self.alloc(Node::child(value, parent));
        self.link_back(parent, child);
        child
    }

    /// Allocates a new node holding `value` and splices it immediately
    /// before `before` in `parent`'s child list.
    ///
    /// `before` must be a child of `parent`; this is a caller contract, not
    /// a checked error.
    pub fn insert_child(&mut self, parent: NodeId, before: NodeId, value: T) -> NodeId {
        debug_assert_eq!(
            self.node(before).parent,
            Some(parent),
            "`before` must be a child of `parent`"
        );
        let child = self.alloc(Node::child(value, parent));
        self.link_before(parent, before, child);
        child
    }

    /// Position-indexed variant of [`insert_child`](Tree::insert_child):
    /// splices the new node so it ends up at `position` among `parent`'s
    /// children. Fails with [`TreeError::OutOfRange`] when `position` is not
    /// in `[0, child_count)`.
    pub fn insert_child_at(
        &mut self,
        parent: NodeId,
        position: usize,
        value: T,
    ) -> Result<NodeId, TreeError> {
        match self.child_at(parent, position) {
            Some(anchor) => Ok(self.insert_child(parent, anchor, value)),
            None => Err(TreeError::OutOfRange {
                position,
                len: self.child_count(parent),
            }),
        }
    }

    // --------------------------------------------------------------------
    // Removal and transfer mutators
    // --------------------------------------------------------------------

    /// Removes exactly `node`, splicing its children (in order) into the
    /// slot it occupied in its parent's child list, and returns its value.
    /// The subtree under `node` flattens up by one level.
    ///
    /// Fails with [`TreeError::RootNotErasable`] when `node` is the root,
    /// leaving the tree untouched.
    ///
    /// # Examples
    ///
    /// ```
    /// # use salix::Tree;
    /// let mut tree = Tree::new();
    /// let root = tree.set_root(0);
    /// let mid = tree.push_back_child(root, 1);
    /// tree.push_back_child(mid, 2);
    ///
    /// assert_eq!(tree.erase(mid), Ok(1));
    /// let flat: Vec<i32> = tree.pre_order().map(|id| tree[id]).collect();
    /// assert_eq!(flat, [0, 2]);
    /// ```
    pub fn erase(&mut self, node: NodeId) -> Result<T, TreeError> {
        if self.root == Some(node) {
            return Err(TreeError::RootNotErasable);
        }
        let (parent, prev, next, first, last, count) = {
            let n = self.node(node);
            let parent = n.parent.expect("non-root node always has a parent");
            (
                parent,
                n.prev_sibling,
                n.next_sibling,
                n.first_child,
                n.last_child,
                n.child_count,
            )
        };

        // Re-home every child one level up.
        let mut child = first;
        while let Some(c) = child {
            let n = self.node_mut(c);
            n.parent = Some(parent);
            child = n.next_sibling;
        }

        // Splice the (possibly empty) run of children into the position the
        // erased node held.
        if let (Some(first), Some(last)) = (first, last) {
            self.node_mut(first).prev_sibling = prev;
            self.node_mut(last).next_sibling = next;
            match prev {
                Some(prev) => self.node_mut(prev).next_sibling = Some(first),
                None => self.node_mut(parent).first_child = Some(first),
            }
            match next {
                Some(next) => self.node_mut(next).prev_sibling = Some(last),
                None => self.node_mut(parent).last_child = Some(last),
            }
        } else {
            match prev {
                Some(prev) => self.node_mut(prev).next_sibling = next,
                None => self.node_mut(parent).first_child = next,
            }
            match next {
                Some(next) => self.node_mut(next).prev_sibling = prev,
                None => self.node_mut(parent).last_child = prev,
            }
        }
        let p = self.node_mut(parent);
        p.child_count += count;
        p.child_count -= 1;

        Ok(self.dealloc(node).value)
    }

    /// Detaches the subtree rooted at `node` and moves it into a new,
    /// independently-owned tree. Nothing is dropped; values transfer.
    ///
    /// Pruning the root is legal and leaves this tree empty.
    pub fn prune(&mut self, node: NodeId) -> Tree<T> {
        if self.root == Some(node) {
            return mem::take(self);
        }
        self.unlink(node);
        let mut pruned = Tree::new();
        let root = pruned.adopt(self, node);
        pruned.root = Some(root);
        pruned
    }

    /// Detaches and destroys the subtree rooted at `node`, the node itself
    /// included. Chopping the root empties the tree.
    pub fn chop(&mut self, node: NodeId) {
        if self.root == Some(node) {
            self.root = None;
        } else {
            self.unlink(node);
        }
        // Children must be released before their parent; walk the doomed
        // subtree in post-order before touching any slot.
        let doomed: Vec<NodeId> = self.post_order_at(node).collect();
        for id in doomed {
            self.dealloc(id);
        }
    }

    /// Takes ownership of `source`'s whole tree and attaches it as the
    /// first child of `parent`. Returns the handle of the grafted subtree's
    /// root, or `None` when `source` is empty.
    pub fn graft_front(&mut self, parent: NodeId, mut source: Tree<T>) -> Option<NodeId> {
        let root = source.root.take()?;
        let grafted = self.adopt(&mut source, root);
        self.link_front(parent, grafted);
        Some(grafted)
    }

    /// Takes ownership of `source`'s whole tree and attaches it as the last
    /// child of `parent`. Returns the handle of the grafted subtree's root,
    /// or `None` when `source` is empty.
    pub fn graft_back(&mut self, parent: NodeId, mut source: Tree<T>) -> Option<NodeId> {
        let root = source.root.take()?;
        let grafted = self.adopt(&mut source, root);
        self.link_back(parent, grafted);
        Some(grafted)
    }

    /// Takes ownership of `source`'s whole tree and splices it immediately
    /// before `before` in `parent`'s child list. Same caller contract as
    /// [`insert_child`](Tree::insert_child).
    pub fn graft_at(
        &mut self,
        parent: NodeId,
        before: NodeId,
        mut source: Tree<T>,
    ) -> Option<NodeId> {
        debug_assert_eq!(
            self.node(before).parent,
            Some(parent),
            "`before` must be a child of `parent`"
        );
        let root = source.root.take()?;
        let grafted = self.adopt(&mut source, root);
        self.link_before(parent, before, grafted);
        Some(grafted)
    }

    /// Moves the subtree rooted at `node` out of `source` and into this
    /// tree's arena, rebuilding the links under freshly allocated ids.
    /// Returns the subtree root's new handle; the caller splices it into a
    /// child list (or installs it as the root).
    fn adopt(&mut self, source: &mut Tree<T>, node: NodeId) -> NodeId {
        let old_root = source.dealloc(node);
        let new_root = self.alloc(Node::root(old_root.value));
        // (next source child to move, its already-moved parent)
        let mut stack = vec![(old_root.first_child, new_root)];
        while let Some((child, new_parent)) = stack.pop() {
            let Some(child) = child else { continue };
            let old = source.dealloc(child);
            let new_child = self.alloc(Node::child(old.value, new_parent));
            self.link_back(new_parent, new_child);
            stack.push((old.next_sibling, new_parent));
            stack.push((old.first_child, new_child));
        }
        new_root
    }

    // --------------------------------------------------------------------
    // Navigation
    // --------------------------------------------------------------------

    /// Value of `node`, or `None` for a stale handle.
    pub fn get(&self, node: NodeId) -> Option<&T> {
        self.slots.get(node.0)?.as_node().map(|n| &n.value)
    }

    /// Mutable value of `node`, or `None` for a stale handle.
    pub fn get_mut(&mut self, node: NodeId) -> Option<&mut T> {
        self.slots
            .get_mut(node.0)?
            .as_node_mut()
            .map(|n| &mut n.value)
    }

    /// Parent of `node`, `None` for the root.
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.node(node).parent
    }

    /// First child of `node`, if any.
    pub fn first_child(&self, node: NodeId) -> Option<NodeId> {
        self.node(node).first_child
    }

    /// Last child of `node`, if any.
    pub fn last_child(&self, node: NodeId) -> Option<NodeId> {
        self.node(node).last_child
    }

    /// Next sibling of `node`, if any.
    pub fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        self.node(node).next_sibling
    }

    /// Previous sibling of `node`, if any.
    pub fn prev_sibling(&self, node: NodeId) -> Option<NodeId> {
        self.node(node).prev_sibling
    }

    /// Number of children under `node`. O(1).
    pub fn child_count(&self, node: NodeId) -> usize {
        self.node(node).child_count
    }

    /// `position`-th child of `parent`, or `None` when `position` is out of
    /// range. O(position).
    pub fn child_at(&self, parent: NodeId, position: usize) -> Option<NodeId> {
        let mut child = self.node(parent).first_child;
        for _ in 0..position {
            child = self.node(child?).next_sibling;
        }
        child
    }

    /// Iterates over the direct children of `node`, in order.
    pub fn iter_children(&self, node: NodeId) -> ChildrenIter<'_, T> {
        ChildrenIter {
            tree: self,
            next: self.node(node).first_child,
        }
    }

    /// Iterates upwards from `node` (inclusive) to the root.
    pub fn iter_ancestors(&self, node: NodeId) -> AncestorsIter<'_, T> {
        AncestorsIter {
            tree: self,
            current: Some(node),
        }
    }

    // --------------------------------------------------------------------
    // Cursor factories
    // --------------------------------------------------------------------

    /// Pre-order cursor over the whole tree. On an empty tree the cursor is
    /// already exhausted.
    pub fn pre_order(&self) -> PreOrderCursor<'_, T> {
        PreOrderCursor::new(self, self.root)
    }

    /// Pre-order cursor scoped to the subtree rooted at `node`.
    pub fn pre_order_at(&self, node: NodeId) -> PreOrderCursor<'_, T> {
        PreOrderCursor::new(self, Some(node))
    }

    /// Post-order cursor over the whole tree. Construction eagerly descends
    /// to the first node in post-order (the leftmost-deepest leaf).
    pub fn post_order(&self) -> PostOrderCursor<'_, T> {
        PostOrderCursor::new(self, self.root)
    }

    /// Post-order cursor scoped to the subtree rooted at `node`.
    pub fn post_order_at(&self, node: NodeId) -> PostOrderCursor<'_, T> {
        PostOrderCursor::new(self, Some(node))
    }

    // --------------------------------------------------------------------
    // Auditing
    // --------------------------------------------------------------------

    /// Audits every structural link: parent/child agreement, sibling-list
    /// symmetry, cached child counts, and the reachable-node count against
    /// the number of occupied slots.
    pub fn validate(&self) -> Result<(), TreeError> {
        let mut reachable = 0usize;
        if let Some(root) = self.root {
            let r = self.node(root);
            if r.parent.is_some() {
                return Err(TreeError::BrokenParentLink(root));
            }
            if r.prev_sibling.is_some() || r.next_sibling.is_some() {
                return Err(TreeError::BrokenSiblingLink(root));
            }
            let mut seen = vec![false; self.slots.len()];
            let mut stack = vec![root];
            while let Some(node) = stack.pop() {
                if seen[node.0] {
                    return Err(TreeError::BrokenSiblingLink(node));
                }
                seen[node.0] = true;
                reachable += 1;

                let mut count = 0usize;
                let mut prev = None;
                let mut child = self.node(node).first_child;
                while let Some(c) = child {
                    let n = self.node(c);
                    if n.parent != Some(node) {
                        return Err(TreeError::BrokenParentLink(c));
                    }
                    if n.prev_sibling != prev {
                        return Err(TreeError::BrokenSiblingLink(c));
                    }
                    count += 1;
                    if count > self.len {
                        return Err(TreeError::BrokenSiblingLink(c));
                    }
                    stack.push(c);
                    prev = Some(c);
                    child = n.next_sibling;
                }
                let n = self.node(node);
                if n.last_child != prev {
                    return Err(TreeError::BrokenSiblingLink(node));
                }
                if n.child_count != count {
                    return Err(TreeError::ChildCountMismatch(node));
                }
            }
        }
        if reachable != self.len {
            return Err(TreeError::NodeCountMismatch {
                reachable,
                len: self.len,
            });
        }
        Ok(())
    }
}

impl<T> Default for Tree<T> {
    fn default() -> Self {
        Tree::new()
    }
}

impl<T> From<T> for Tree<T> {
    fn from(value: T) -> Self {
        Tree::with_root(value)
    }
}

impl<T> Index<NodeId> for Tree<T> {
    type Output = T;
    fn index(&self, index: NodeId) -> &Self::Output {
        &self.node(index).value
    }
}

impl<T> IndexMut<NodeId> for Tree<T> {
    fn index_mut(&mut self, index: NodeId) -> &mut Self::Output {
        &mut self.node_mut(index).value
    }
}

/// Structural deep clone: a pre-order walk allocates a matching node per
/// source node, relinking through a source-id to clone-id correspondence
/// map. The clone's arena is compact regardless of free slots in the source.
impl<T: Clone> Clone for Tree<T> {
    fn clone(&self) -> Self {
        let mut clone = Tree {
            slots: Vec::with_capacity(self.len),
            free_head: None,
            root: None,
            len: 0,
        };
        let Some(root) = self.root else { return clone };
        let mut correspondence = AHashMap::with_capacity(self.len);
        let new_root = clone.alloc(Node::root(self.node(root).value.clone()));
        clone.root = Some(new_root);
        correspondence.insert(root, new_root);
        // Pre-order visits parents before children, so the correspondence
        // for a parent always exists by the time its child is copied.
        for id in self.pre_order().skip(1) {
            let parent = self.node(id).parent.expect("only the root has no parent");
            let new_parent = correspondence[&parent];
            let new_id = clone.alloc(Node::child(self.node(id).value.clone(), new_parent));
            clone.link_back(new_parent, new_id);
            correspondence.insert(id, new_id);
        }
        clone
    }
}

/// Structural shape+value equality: a lock-step pre-order walk comparing the
/// value and child count at every position. A pre-order sequence annotated
/// with per-node degrees determines a tree uniquely, so this is a complete
/// structural comparison.
impl<T: PartialEq> PartialEq for Tree<T> {
    fn eq(&self, other: &Self) -> bool {
        self.pre_order()
            .zip_longest(other.pre_order())
            .all(|pair| match pair {
                EitherOrBoth::Both(a, b) => {
                    let (a, b) = (self.node(a), other.node(b));
                    a.value == b.value && a.child_count == b.child_count
                }
                EitherOrBoth::Left(_) | EitherOrBoth::Right(_) => false,
            })
    }
}

impl<T: Eq> Eq for Tree<T> {}

impl<T: fmt::Display> fmt::Display for Tree<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn draw_subtree<T: fmt::Display>(
            f: &mut fmt::Formatter<'_>,
            tree: &Tree<T>,
            node: NodeId,
            prefix: &str,
            is_last_child: bool,
        ) -> fmt::Result {
            let connector = if is_last_child {
                "└── "
            } else {
                "├── "
            };
            writeln!(f, "{prefix}{connector}{}", tree.node(node).value)?;
            let child_prefix = format!("{prefix}{}", if is_last_child { "    " } else { "│   " });
            let count = tree.child_count(node);
            for (i, child) in tree.iter_children(node).enumerate() {
                draw_subtree(f, tree, child, &child_prefix, i + 1 == count)?;
            }
            Ok(())
        }

        let Some(root) = self.root else {
            return Ok(());
        };
        writeln!(f, "{}", self.node(root).value)?;
        let count = self.child_count(root);
        for (i, child) in self.iter_children(root).enumerate() {
            draw_subtree(f, self, child, "", i + 1 == count)?;
        }
        Ok(())
    }
}

/// Iterator over the direct children of a node, following sibling links.
#[derive(Clone)]
pub struct ChildrenIter<'t, T> {
    tree: &'t Tree<T>,
    next: Option<NodeId>,
}

impl<T> Iterator for ChildrenIter<'_, T> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let child = self.next?;
        self.next = self.tree.node(child).next_sibling;
        Some(child)
    }
}

impl<T> std::iter::FusedIterator for ChildrenIter<'_, T> {}

/// Iterator that climbs from a starting node (inclusive) up to the root.
#[derive(Clone)]
pub struct AncestorsIter<'t, T> {
    tree: &'t Tree<T>,
    current: Option<NodeId>,
}

impl<T> Iterator for AncestorsIter<'_, T> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.current?;
        self.current = self.tree.node(node).parent;
        Some(node)
    }
}

impl<T> std::iter::FusedIterator for AncestorsIter<'_, T> {}

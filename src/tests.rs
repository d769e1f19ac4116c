//! Cross-module scenario and property tests.

use ahash::AHashMap;
use proptest::prelude::*;

use crate::{NodeId, Tree};

fn pre_values<T: Clone>(tree: &Tree<T>) -> Vec<T> {
    tree.pre_order().map(|id| tree[id].clone()).collect()
}

/// Rebuilds the two-tree grafting scenario: a host tree of round values, a
/// scion tree grafted under the host's fourth child, in front of its only
/// child.
#[test]
fn grafting_scenario() {
    let mut host = Tree::with_root(10);
    let root = host.root().unwrap();
    for value in [20, 30, 40, 50] {
        host.push_back_child(root, value);
    }

    // Navigate to the second child and grow the middle branch.
    let n30 = host.pre_order().first_child().next_sibling().node().unwrap();
    host.push_back_child(n30, 60);
    let n70 = host.push_back_child(n30, 70);
    for value in [80, 90, 100] {
        host.push_back_child(n70, value);
    }
    let n100 = host
        .pre_order_at(n70)
        .first_child()
        .next_sibling()
        .next_sibling()
        .node()
        .unwrap();
    host.push_back_child(n100, 110);

    let n50 = host.pre_order().last_child().node().unwrap();
    let n120 = host.push_back_child(n50, 120);
    similar_asserts::assert_eq!(
        pre_values(&host),
        vec![10, 20, 30, 60, 70, 80, 90, 100, 110, 40, 50, 120]
    );

    let mut scion = Tree::with_root(28);
    let s_root = scion.root().unwrap();
    let s7 = scion.push_back_child(s_root, 7);
    let s5 = scion.push_back_child(s_root, 5);
    scion.push_back_child(s7, 2);
    let s6 = scion.push_back_child(s7, 6);
    scion.push_back_child(s6, 5);
    scion.push_back_child(s6, 11);
    let s9 = scion.push_back_child(s5, 9);
    scion.push_back_child(s9, 4);

    host.graft_at(n50, n120, scion).unwrap();
    similar_asserts::assert_eq!(
        pre_values(&host),
        vec![10, 20, 30, 60, 70, 80, 90, 100, 110, 40, 50, 28, 7, 2, 6, 5, 11, 5, 9, 4, 120]
    );
    host.validate().unwrap();
}

/// Deterministically attaches node `i` under one of the nodes `0..i`, chosen
/// by the seed, so arbitrary seed vectors map to arbitrary tree shapes.
fn build_tree(seeds: &[(usize, u8)]) -> (Tree<u8>, Vec<NodeId>) {
    let mut tree = Tree::new();
    let mut ids = Vec::with_capacity(seeds.len());
    for (i, &(seed, value)) in seeds.iter().enumerate() {
        if i == 0 {
            ids.push(tree.set_root(value));
        } else {
            ids.push(tree.push_back_child(ids[seed % i], value));
        }
    }
    (tree, ids)
}

fn arb_seeds() -> impl Strategy<Value = Vec<(usize, u8)>> {
    proptest::collection::vec((any::<usize>(), any::<u8>()), 1..24)
}

proptest! {
    #[test]
    fn post_order_is_a_descendants_first_permutation(seeds in arb_seeds()) {
        let (tree, _) = build_tree(&seeds);
        let pre: Vec<NodeId> = tree.pre_order().collect();
        let post: Vec<NodeId> = tree.post_order().collect();

        let mut sorted_pre = pre.clone();
        let mut sorted_post = post.clone();
        sorted_pre.sort_unstable();
        sorted_post.sort_unstable();
        prop_assert_eq!(sorted_pre, sorted_post);

        // Every node appears strictly after all of its descendants.
        let position: AHashMap<NodeId, usize> =
            post.iter().enumerate().map(|(i, &id)| (id, i)).collect();
        for &id in &pre {
            for child in tree.iter_children(id) {
                prop_assert!(position[&child] < position[&id]);
            }
        }
    }

    #[test]
    fn clone_round_trips(seeds in arb_seeds()) {
        let (tree, _) = build_tree(&seeds);
        let clone = tree.clone();
        prop_assert!(clone == tree);
        clone.validate().unwrap();
    }

    #[test]
    fn erase_rehomes_children(seeds in arb_seeds(), pick in any::<usize>()) {
        let (mut tree, ids) = build_tree(&seeds);
        prop_assume!(ids.len() > 1);
        let node = ids[1 + pick % (ids.len() - 1)];
        let parent = tree.parent(node).unwrap();
        let expected: Vec<NodeId> = tree
            .iter_children(parent)
            .flat_map(|c| {
                if c == node {
                    tree.iter_children(node).collect::<Vec<_>>()
                } else {
                    vec![c]
                }
            })
            .collect();

        tree.erase(node).unwrap();
        let after: Vec<NodeId> = tree.iter_children(parent).collect();
        prop_assert_eq!(after, expected);
        prop_assert!(tree.pre_order().all(|id| id != node));
        tree.validate().unwrap();
    }

    #[test]
    fn chop_removes_a_contiguous_preorder_run(seeds in arb_seeds(), pick in any::<usize>()) {
        let (mut tree, ids) = build_tree(&seeds);
        let node = ids[pick % ids.len()];
        let before: Vec<NodeId> = tree.pre_order().collect();
        let subtree: Vec<NodeId> = tree.pre_order_at(node).collect();

        // The subtree occupies a contiguous run of the pre-order sequence.
        let start = before.iter().position(|&id| id == node).unwrap();
        prop_assert_eq!(&before[start..start + subtree.len()], &subtree[..]);

        tree.chop(node);
        let mut expected = before;
        expected.drain(start..start + subtree.len());
        let after: Vec<NodeId> = tree.pre_order().collect();
        prop_assert_eq!(after, expected);
        tree.validate().unwrap();
    }

    #[test]
    fn prune_then_graft_back_restores_the_sequence(seeds in arb_seeds(), pick in any::<usize>()) {
        let (mut tree, ids) = build_tree(&seeds);
        prop_assume!(ids.len() > 1);
        let node = ids[1 + pick % (ids.len() - 1)];
        let before = pre_values(&tree);
        let subtree_values: Vec<u8> = tree.pre_order_at(node).map(|id| tree[id]).collect();
        let parent = tree.parent(node).unwrap();
        let anchor = tree.next_sibling(node);

        let pruned = tree.prune(node);
        prop_assert_eq!(pre_values(&pruned), subtree_values);
        prop_assert!(tree.pre_order().all(|id| id != node));
        pruned.validate().unwrap();

        match anchor {
            Some(anchor) => tree.graft_at(parent, anchor, pruned),
            None => tree.graft_back(parent, pruned),
        };
        prop_assert_eq!(pre_values(&tree), before);
        tree.validate().unwrap();
    }
}

//! Linked tree: the representation produced directly by ingestion.
//!
//! Nodes live in an arena in the order their records arrived, bounded by
//! `2 * max_leaves` slots. Child links are
//! arena indices rather than pointers, so the whole tree is dropped at once
//! and no recursive destruction is needed.

use super::view::TreeView;
use super::NodeId;

/// A node of a [`LinkedTree`].
#[derive(Debug, Clone, PartialEq)]
pub struct LinkedNode {
    /// Node id as assigned by the input stream.
    pub id: u64,
    /// Feature index (always non-negative, the builder strips any sign).
    pub fid: u32,
    /// Threshold for internal nodes, output value for leaves.
    pub theta: f32,
    pub left: Option<NodeId>,
    pub right: Option<NodeId>,
}

impl LinkedNode {
    pub fn new(id: u64, fid: u32, theta: f32) -> Self {
        Self {
            id,
            fid,
            theta,
            left: None,
            right: None,
        }
    }

    /// Number of attached children (0, 1 or 2).
    #[inline]
    pub fn n_children(&self) -> usize {
        self.left.is_some() as usize + self.right.is_some() as usize
    }
}

/// Tree built from a parent-referencing record stream.
///
/// The root is always slot 0. Every node has zero or two children; the
/// builder rejects anything else before a `LinkedTree` is handed out.
#[derive(Debug, Clone)]
pub struct LinkedTree {
    nodes: Vec<LinkedNode>,
}

impl LinkedTree {
    /// Wrap an arena whose slot 0 is the root.
    ///
    /// Structural validation is the builder's job; this only debug-checks
    /// the binary-node invariant.
    pub(crate) fn from_arena(nodes: Vec<LinkedNode>) -> Self {
        debug_assert!(!nodes.is_empty(), "tree must have a root");
        debug_assert!(nodes.iter().all(|n| n.n_children() != 1));
        Self { nodes }
    }

    /// Node stored at `slot`.
    #[inline]
    pub fn node(&self, slot: NodeId) -> &LinkedNode {
        &self.nodes[slot as usize]
    }

    /// All nodes in arrival order.
    #[inline]
    pub fn nodes(&self) -> &[LinkedNode] {
        &self.nodes
    }
}

impl TreeView for LinkedTree {
    #[inline]
    fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    fn children(&self, node: NodeId) -> Option<(NodeId, NodeId)> {
        let node = &self.nodes[node as usize];
        match (node.left, node.right) {
            (Some(left), Some(right)) => Some((left, right)),
            _ => None,
        }
    }

    #[inline]
    fn split_index(&self, node: NodeId) -> u32 {
        self.nodes[node as usize].fid
    }

    #[inline]
    fn theta(&self, node: NodeId) -> f32 {
        self.nodes[node as usize].theta
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Stump stored out of pre-order: right leaf arrives before the left one.
    ///
    /// ```text
    ///        [0] f0 <= 0.5
    ///        /          \
    ///    [2] 1.0      [1] 2.0
    /// ```
    fn stump() -> LinkedTree {
        let mut root = LinkedNode::new(10, 0, 0.5);
        root.right = Some(1);
        root.left = Some(2);
        LinkedTree::from_arena(vec![
            root,
            LinkedNode::new(30, 0, 2.0),
            LinkedNode::new(20, 0, 1.0),
        ])
    }

    #[test]
    fn traverse_follows_links_not_slots() {
        let tree = stump();
        assert_eq!(tree.traverse_to_leaf(&[0.1]), 2);
        assert_eq!(tree.traverse_to_leaf(&[0.9]), 1);
        assert_eq!(tree.predict_row(&[0.1]), 1.0);
        assert_eq!(tree.predict_row(&[0.9]), 2.0);
    }

    #[test]
    fn threshold_equality_goes_left() {
        assert_eq!(stump().predict_row(&[0.5]), 1.0);
    }

    #[test]
    fn structure_queries() {
        let tree = stump();
        assert_eq!(tree.n_nodes(), 3);
        assert_eq!(tree.count_nodes(), 3);
        assert_eq!(tree.count_leaves(), 2);
        assert_eq!(tree.depth(), 1);
        assert_eq!(tree.max_feature_index(), Some(0));
        assert!(tree.is_leaf(1));
        assert!(!tree.is_leaf(0));
    }

    #[test]
    fn single_leaf_tree() {
        let tree = LinkedTree::from_arena(vec![LinkedNode::new(0, 3, 4.5)]);
        assert_eq!(tree.depth(), 0);
        assert_eq!(tree.max_feature_index(), None);
        assert_eq!(tree.predict_row(&[]), 4.5);
    }
}

//! Compact tree: a dense pre-order array with one slot per node.
//!
//! # Layout
//!
//! ```text
//!          [0]               slot 0: root
//!         /   \
//!       [1]   [4]            left child of slot i is always i + 1
//!      /   \
//!    [2]   [3]               right child follows the whole left subtree
//! ```
//!
//! Encoding any [`TreeView`] produces exactly `count_nodes` slots with the
//! same decision function.

use super::node::{Node, SplitCondition};
use super::view::TreeView;
use super::NodeId;

/// Densely packed tree with explicit split/leaf node shapes.
#[derive(Debug, Clone, PartialEq)]
pub struct CompactTree {
    nodes: Box<[Node]>,
}

impl CompactTree {
    /// Repack `tree` into a pre-order array of exactly `tree.count_nodes()` slots.
    pub fn from_tree<T: TreeView>(tree: &T) -> Self {
        let n_nodes = tree.count_nodes();
        let mut nodes = Vec::with_capacity(n_nodes);
        pack_preorder(tree, tree.root(), &mut nodes);
        debug_assert_eq!(nodes.len(), n_nodes);

        Self {
            nodes: nodes.into_boxed_slice(),
        }
    }

    /// Build directly from nodes already in pre-order.
    ///
    /// Intended for tests and hand-written trees; child indices are trusted.
    pub fn from_nodes(nodes: Vec<Node>) -> Self {
        debug_assert!(!nodes.is_empty(), "tree must have a root");
        Self {
            nodes: nodes.into_boxed_slice(),
        }
    }

    /// Node at `slot`.
    #[inline]
    pub fn node(&self, slot: NodeId) -> &Node {
        &self.nodes[slot as usize]
    }

    /// All nodes in pre-order.
    #[inline]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }
}

/// Place `node` at the next free slot, then its left subtree, then its right.
///
/// Returns the slot assigned to `node`. Recursion depth is bounded by the
/// tree depth.
fn pack_preorder<T: TreeView>(tree: &T, node: NodeId, out: &mut Vec<Node>) -> NodeId {
    let slot = out.len() as NodeId;

    match tree.children(node) {
        None => out.push(Node::leaf(tree.theta(node))),
        Some((left, right)) => {
            // Reserve the slot; children are known only after their subtrees land.
            out.push(Node::leaf(0.0));
            let left_slot = pack_preorder(tree, left, out);
            let right_slot = pack_preorder(tree, right, out);
            let condition = SplitCondition::new(tree.split_index(node), tree.theta(node));
            out[slot as usize] = Node::split(condition, left_slot, right_slot);
        }
    }

    slot
}

impl TreeView for CompactTree {
    #[inline]
    fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    fn children(&self, node: NodeId) -> Option<(NodeId, NodeId)> {
        self.nodes[node as usize].children()
    }

    #[inline]
    fn split_index(&self, node: NodeId) -> u32 {
        match &self.nodes[node as usize] {
            Node::Split { condition, .. } => condition.feature_index,
            Node::Leaf(_) => 0,
        }
    }

    #[inline]
    fn theta(&self, node: NodeId) -> f32 {
        match &self.nodes[node as usize] {
            Node::Split { condition, .. } => condition.threshold,
            Node::Leaf(value) => *value,
        }
    }

    #[inline]
    fn traverse_to_leaf(&self, features: &[f32]) -> NodeId {
        let mut idx = 0u32;

        while let Node::Split {
            condition,
            left,
            right,
        } = &self.nodes[idx as usize]
        {
            let fvalue = features[condition.feature_index as usize];
            idx = if condition.go_left(fvalue) { *left } else { *right };
        }

        idx
    }
}

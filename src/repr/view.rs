//! Read-only tree interface shared by the linked and compact representations.

use super::node::go_right;
use super::NodeId;

/// Read-only view of a tree for traversal.
///
/// Provides the minimal interface needed to walk a tree from root to leaf.
/// Implemented for [`LinkedTree`](super::LinkedTree) and
/// [`CompactTree`](super::CompactTree); the compact and flat encoders are
/// generic over it, so either can be re-encoded.
///
/// Nodes have either no children (leaf) or exactly two. `theta` doubles as the
/// split threshold of an internal node and the output value of a leaf.
pub trait TreeView {
    /// Number of nodes in the tree.
    fn n_nodes(&self) -> usize;

    /// Root node id.
    fn root(&self) -> NodeId {
        0
    }

    /// `(left, right)` for an internal node, `None` for a leaf.
    fn children(&self, node: NodeId) -> Option<(NodeId, NodeId)>;

    /// Feature index of the node. Leaves report 0.
    fn split_index(&self, node: NodeId) -> u32;

    /// Threshold of an internal node, or output value of a leaf.
    fn theta(&self, node: NodeId) -> f32;

    /// Check if a node is a leaf.
    #[inline]
    fn is_leaf(&self, node: NodeId) -> bool {
        self.children(node).is_none()
    }

    /// Traverse from the root to the leaf reached by `features`.
    ///
    /// # Panics
    ///
    /// Panics if a split references a feature index outside `features`.
    /// Callers validate the feature width against
    /// [`max_feature_index`](Self::max_feature_index) up front.
    #[inline]
    fn traverse_to_leaf(&self, features: &[f32]) -> NodeId {
        let mut node = self.root();

        while let Some((left, right)) = self.children(node) {
            let fvalue = features[self.split_index(node) as usize];
            node = if go_right(fvalue, self.theta(node)) {
                right
            } else {
                left
            };
        }

        node
    }

    /// Output of this tree for one feature vector.
    #[inline]
    fn predict_row(&self, features: &[f32]) -> f32 {
        self.theta(self.traverse_to_leaf(features))
    }

    /// Number of edges on the longest root-to-leaf path.
    fn depth(&self) -> usize {
        let mut max_depth = 0;
        let mut stack = vec![(self.root(), 0usize)];

        while let Some((node, depth)) = stack.pop() {
            match self.children(node) {
                Some((left, right)) => {
                    stack.push((left, depth + 1));
                    stack.push((right, depth + 1));
                }
                None => max_depth = max_depth.max(depth),
            }
        }

        max_depth
    }

    /// Number of nodes reachable from the root.
    fn count_nodes(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self.root()];

        while let Some(node) = stack.pop() {
            count += 1;
            if let Some((left, right)) = self.children(node) {
                stack.push(left);
                stack.push(right);
            }
        }

        count
    }

    /// Number of leaves reachable from the root.
    fn count_leaves(&self) -> usize {
        // A strictly binary tree has one more leaf than internal nodes.
        (self.count_nodes() + 1) / 2
    }

    /// Largest feature index used by any split, `None` for a single-leaf tree.
    fn max_feature_index(&self) -> Option<u32> {
        (0..self.n_nodes() as NodeId)
            .filter(|&node| !self.is_leaf(node))
            .map(|node| self.split_index(node))
            .max()
    }
}

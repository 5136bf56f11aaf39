//! Flat forest: all trees packed into one shared node buffer.
//!
//! # Buffer Layout
//!
//! ```text
//! nodes: [ tree 0 (pre-order) | tree 1 (pre-order) | ... ]
//!          ^offset 0            ^offset n0
//! ```
//!
//! Each [`FlatNode`] stores absolute child offsets into the shared buffer.
//! A leaf points both children at itself, so "take one more step" is a no-op
//! once a walk has terminated. This is what lets the batch traversal run a
//! fixed number of steps per tree without ever asking whether a row is done.

use tracing::debug;

use crate::error::{ForestError, Result};

use super::ensemble::EnsembleStats;
use super::node::go_right;
use super::view::TreeView;
use super::{NodeId, MAX_DEPTH};

/// Packed node of a [`FlatForest`].
///
/// `theta` is the threshold of an internal node and the output value of a
/// leaf. Leaves carry `fid = 0` so the unconditional feature load in the
/// traversal always stays in bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
#[repr(C)]
pub struct FlatNode {
    pub fid: u32,
    pub theta: f32,
    /// Absolute `[left, right]` offsets; both equal the node's own offset for a leaf.
    pub children: [u32; 2],
}

impl FlatNode {
    /// Whether this node is a self-looping leaf at absolute offset `at`.
    #[inline]
    pub fn is_leaf_at(&self, at: u32) -> bool {
        self.children == [at, at]
    }

    /// Next offset for one feature vector.
    #[inline(always)]
    pub fn step(&self, features: &[f32]) -> u32 {
        self.children[go_right(features[self.fid as usize], self.theta) as usize]
    }
}

/// Location and shape of one tree inside the shared buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeRange {
    /// Absolute offset of the tree's root.
    pub offset: u32,
    /// Number of nodes in the tree.
    pub len: u32,
    /// Edges on the longest root-to-leaf path.
    pub depth: u32,
}

impl TreeRange {
    /// Fixed step count used to evaluate this tree.
    ///
    /// A single-leaf tree still takes one step: its root loops onto itself.
    #[inline]
    pub fn steps(&self) -> usize {
        (self.depth as usize).max(1)
    }
}

/// Every tree of an ensemble packed into one contiguous buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatForest {
    nodes: Box<[FlatNode]>,
    trees: Box<[TreeRange]>,
}

impl FlatForest {
    /// Pack `trees` in order into a shared buffer.
    ///
    /// # Errors
    ///
    /// [`ForestError::UnsupportedDepth`] if any tree is deeper than [`MAX_DEPTH`].
    pub fn from_trees<'a, T, I>(trees: I) -> Result<Self>
    where
        T: TreeView + 'a,
        I: IntoIterator<Item = &'a T>,
    {
        let mut nodes = Vec::new();
        let mut ranges = Vec::new();

        for (tree_idx, tree) in trees.into_iter().enumerate() {
            let depth = tree.depth();
            if depth > MAX_DEPTH {
                return Err(ForestError::UnsupportedDepth {
                    tree: tree_idx,
                    depth,
                });
            }

            let offset = nodes.len() as u32;
            nodes.reserve(tree.count_nodes());
            place_preorder(tree, tree.root(), &mut nodes);
            let len = nodes.len() as u32 - offset;

            debug!(tree = tree_idx, offset, len, depth, "placed tree in flat buffer");
            ranges.push(TreeRange {
                offset,
                len,
                depth: depth as u32,
            });
        }

        Ok(Self {
            nodes: nodes.into_boxed_slice(),
            trees: ranges.into_boxed_slice(),
        })
    }

    /// The shared node buffer.
    #[inline]
    pub fn nodes(&self) -> &[FlatNode] {
        &self.nodes
    }

    /// Per-tree ranges, in ensemble order.
    #[inline]
    pub fn trees(&self) -> &[TreeRange] {
        &self.trees
    }

    /// Number of trees.
    #[inline]
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Nodes belonging to one tree.
    #[inline]
    pub fn tree_nodes(&self, tree: usize) -> &[FlatNode] {
        let range = self.trees[tree];
        &self.nodes[range.offset as usize..(range.offset + range.len) as usize]
    }

    /// Node, leaf and depth totals, read from the packed buffer.
    pub fn stats(&self) -> EnsembleStats {
        let n_leaves = self
            .nodes
            .iter()
            .enumerate()
            .filter(|(at, node)| node.is_leaf_at(*at as u32))
            .count();

        EnsembleStats {
            n_trees: self.trees.len(),
            n_nodes: self.nodes.len(),
            n_leaves,
            max_depth: self.trees.iter().map(|t| t.depth as usize).max().unwrap_or(0),
        }
    }

    /// Largest feature index read by any node (leaves read index 0).
    pub fn max_feature_index(&self) -> Option<u32> {
        self.nodes.iter().map(|n| n.fid).max()
    }

    /// Walk one tree until a self-loop, returning the terminal index relative
    /// to the tree's offset.
    ///
    /// This is the variable-length walk; the batch traversal must agree with it.
    pub fn walk_to_leaf(&self, tree: usize, features: &[f32]) -> NodeId {
        let offset = self.trees[tree].offset;
        let mut cur = offset;

        loop {
            let next = self.nodes[cur as usize].step(features);
            if next == cur {
                return cur - offset;
            }
            cur = next;
        }
    }

    /// Leaf value at a terminal index relative to `tree`'s offset.
    #[inline]
    pub fn leaf_value(&self, tree: usize, terminal: NodeId) -> f32 {
        self.nodes[(self.trees[tree].offset + terminal) as usize].theta
    }
}

/// Append `node`'s subtree in pre-order with absolute child offsets.
///
/// Returns the absolute offset assigned to `node`.
fn place_preorder<T: TreeView>(tree: &T, node: NodeId, out: &mut Vec<FlatNode>) -> u32 {
    let at = out.len() as u32;

    match tree.children(node) {
        None => out.push(FlatNode {
            fid: 0,
            theta: tree.theta(node),
            children: [at, at],
        }),
        Some((left, right)) => {
            out.push(FlatNode {
                fid: tree.split_index(node),
                theta: tree.theta(node),
                children: [at, at],
            });
            let left_at = place_preorder(tree, left, out);
            let right_at = place_preorder(tree, right, out);
            out[at as usize].children = [left_at, right_at];
        }
    }

    at
}

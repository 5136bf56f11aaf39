//! Tree construction from a parent-referencing record stream.
//!
//! Records arrive in any order that keeps parents ahead of their children:
//!
//! ```text
//! root 1 0 0.5        ROOT(id, fid, theta)
//! leaf 3 1 0 2.0      LEAF(id, parent_id, is_left, value)
//! leaf 2 1 1 1.0
//! end
//! ```
//!
//! Ids are opaque labels. Each one is resolved to the arena slot it was
//! stored in, so nothing assumes ids are contiguous or equal to positions.

use std::collections::HashMap;

use tracing::debug;

use crate::error::{ForestError, Result};
use crate::repr::{Ensemble, LinkedNode, LinkedTree, NodeId, TreeView};

// =============================================================================
// Records
// =============================================================================

/// One record of a tree's description.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodeRecord {
    /// First record of every tree.
    Root { id: u64, fid: i32, theta: f32 },
    /// Internal node attached under `parent_id`.
    Node {
        id: u64,
        parent_id: u64,
        is_left: bool,
        fid: i32,
        theta: f32,
    },
    /// Leaf attached under `parent_id`, carrying its output value.
    Leaf {
        id: u64,
        parent_id: u64,
        is_left: bool,
        value: f32,
    },
    /// Terminates the tree.
    End,
}

/// The records of one tree plus the integer that precedes them in the file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TreeRecords {
    /// Per-tree header value. Exporters write the tree depth here; it is
    /// compared against the computed depth but never trusted.
    pub hint: Option<u64>,
    pub records: Vec<NodeRecord>,
}

/// Every tree segment of an ensemble description, with the declared count.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnsembleRecords {
    pub declared_trees: usize,
    pub trees: Vec<TreeRecords>,
}

// =============================================================================
// TreeBuilder
// =============================================================================

/// Most slots reserved up front, however large `max_leaves` is.
const RESERVE_LIMIT: usize = 1 << 16;

/// Incremental builder for one [`LinkedTree`].
///
/// A tree may hold at most `2 * max_leaves` nodes; one that needs more fails
/// with [`ForestError::CapacityExceeded`].
#[derive(Debug)]
pub struct TreeBuilder {
    tree: usize,
    capacity: usize,
    nodes: Vec<LinkedNode>,
    /// Slots created by `LEAF` records; nothing may be attached under them.
    leaf_record: Vec<bool>,
    slots: HashMap<u64, NodeId>,
    ended: bool,
}

impl TreeBuilder {
    /// Start tree number `tree` with room for `2 * max_leaves` nodes.
    pub fn new(tree: usize, max_leaves: usize) -> Self {
        let capacity = max_leaves.saturating_mul(2);
        let reserve = capacity.min(RESERVE_LIMIT);
        Self {
            tree,
            capacity,
            nodes: Vec::with_capacity(reserve),
            leaf_record: Vec::with_capacity(reserve),
            slots: HashMap::with_capacity(reserve),
            ended: false,
        }
    }

    /// Number of nodes created so far.
    #[inline]
    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Consume one record.
    pub fn push(&mut self, record: NodeRecord) -> Result<()> {
        if self.ended {
            return Err(self.malformed("record after `end`"));
        }

        match record {
            NodeRecord::Root { id, fid, theta } => {
                if !self.nodes.is_empty() {
                    return Err(self.malformed(format!("second root (id {id})")));
                }
                let fid = self.feature_index(id, fid);
                self.insert(LinkedNode::new(id, fid, theta), false)?;
            }
            NodeRecord::Node {
                id,
                parent_id,
                is_left,
                fid,
                theta,
            } => {
                let fid = self.feature_index(id, fid);
                self.attach(LinkedNode::new(id, fid, theta), parent_id, is_left, false)?;
            }
            NodeRecord::Leaf {
                id,
                parent_id,
                is_left,
                value,
            } => {
                self.attach(LinkedNode::new(id, 0, value), parent_id, is_left, true)?;
            }
            NodeRecord::End => {
                if self.nodes.is_empty() {
                    return Err(self.malformed("`end` before root"));
                }
                self.ended = true;
            }
        }

        Ok(())
    }

    /// Validate the finished tree and hand it out.
    pub fn finish(self) -> Result<LinkedTree> {
        if self.nodes.is_empty() {
            return Err(self.malformed("missing root"));
        }
        if !self.ended {
            return Err(self.malformed("missing `end`"));
        }
        if let Some(node) = self.nodes.iter().find(|n| n.n_children() == 1) {
            return Err(self.malformed(format!("node {} has a single child", node.id)));
        }

        debug!(tree = self.tree, nodes = self.nodes.len(), "built linked tree");
        Ok(LinkedTree::from_arena(self.nodes))
    }

    /// Attach `node` under the slot holding `parent_id`.
    fn attach(&mut self, node: LinkedNode, parent_id: u64, is_left: bool, leaf: bool) -> Result<()> {
        if self.nodes.is_empty() {
            return Err(self.malformed(format!("node {} appears before the root", node.id)));
        }

        let parent = *self
            .slots
            .get(&parent_id)
            .ok_or_else(|| self.malformed(format!("node {}: unknown parent id {parent_id}", node.id)))?;

        if self.leaf_record[parent as usize] {
            return Err(self.malformed(format!(
                "node {}: parent {parent_id} is a leaf",
                node.id
            )));
        }

        let side = {
            let parent = &self.nodes[parent as usize];
            if is_left {
                parent.left
            } else {
                parent.right
            }
        };
        if side.is_some() {
            let side = if is_left { "left" } else { "right" };
            return Err(self.malformed(format!(
                "node {}: parent {parent_id} already has a {side} child",
                node.id
            )));
        }

        let slot = self.insert(node, leaf)?;
        let parent = &mut self.nodes[parent as usize];
        if is_left {
            parent.left = Some(slot);
        } else {
            parent.right = Some(slot);
        }

        Ok(())
    }

    /// Store `node` in the next free slot.
    fn insert(&mut self, node: LinkedNode, leaf: bool) -> Result<NodeId> {
        if self.nodes.len() >= self.capacity {
            return Err(ForestError::CapacityExceeded {
                tree: self.tree,
                capacity: self.capacity,
            });
        }
        if self.slots.contains_key(&node.id) {
            return Err(self.malformed(format!("duplicate node id {}", node.id)));
        }

        let slot = self.nodes.len() as NodeId;
        self.slots.insert(node.id, slot);
        self.nodes.push(node);
        self.leaf_record.push(leaf);
        Ok(slot)
    }

    /// Strip the sign from a raw feature index.
    fn feature_index(&self, id: u64, fid: i32) -> u32 {
        if fid < 0 {
            debug!(tree = self.tree, node = id, fid, "negative feature index, using its magnitude");
        }
        fid.unsigned_abs()
    }

    fn malformed(&self, reason: impl Into<String>) -> ForestError {
        ForestError::malformed(self.tree, reason)
    }
}

// =============================================================================
// Ensemble assembly
// =============================================================================

/// Build every tree of `records`, checking the declared tree count.
pub fn build_ensemble(records: &EnsembleRecords, max_leaves: usize) -> Result<Ensemble<LinkedTree>> {
    if records.trees.len() != records.declared_trees {
        return Err(ForestError::malformed(
            records.trees.len().min(records.declared_trees),
            format!(
                "header declares {} trees but {} were found",
                records.declared_trees,
                records.trees.len()
            ),
        ));
    }

    let mut ensemble = Ensemble::with_capacity(records.declared_trees);

    for (tree_idx, segment) in records.trees.iter().enumerate() {
        let mut builder = TreeBuilder::new(tree_idx, max_leaves);
        for &record in &segment.records {
            builder.push(record)?;
        }
        let tree = builder.finish()?;

        if let Some(hint) = segment.hint {
            let depth = tree.depth();
            if hint != depth as u64 {
                debug!(tree = tree_idx, hint, depth, "per-tree hint differs from computed depth");
            }
        }

        ensemble.push_tree(tree);
    }

    Ok(ensemble)
}

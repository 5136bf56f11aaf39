//! Tree node types.

use super::NodeId;

/// Routing predicate shared by every representation.
///
/// Returns true when the row goes right. Equality goes left, and so does NaN
/// (every comparison with NaN is false), which keeps descent and the flat
/// traversal's `children[(value > theta) as usize]` in agreement.
#[inline(always)]
pub fn go_right(value: f32, threshold: f32) -> bool {
    value > threshold
}

/// Split condition for a decision node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitCondition {
    /// Feature index to split on
    pub feature_index: u32,
    /// Threshold value (go left if feature <= threshold)
    pub threshold: f32,
}

impl SplitCondition {
    pub fn new(feature_index: u32, threshold: f32) -> Self {
        Self {
            feature_index,
            threshold,
        }
    }

    /// Evaluate which direction to go for a feature value.
    /// Returns true for left, false for right.
    #[inline]
    pub fn go_left(&self, feature_value: f32) -> bool {
        !go_right(feature_value, self.threshold)
    }
}

/// A node in a [`CompactTree`](super::CompactTree).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Node {
    /// Internal split node
    Split {
        condition: SplitCondition,
        left: NodeId,
        right: NodeId,
    },
    /// Leaf node with its output value
    Leaf(f32),
}

impl Node {
    /// Create a new split node.
    pub fn split(condition: SplitCondition, left: NodeId, right: NodeId) -> Self {
        Self::Split {
            condition,
            left,
            right,
        }
    }

    /// Create a new leaf node.
    pub fn leaf(value: f32) -> Self {
        Self::Leaf(value)
    }

    /// Returns true if this is a leaf node.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        matches!(self, Self::Leaf(_))
    }

    /// Get the leaf value, if this is a leaf.
    #[inline]
    pub fn leaf_value(&self) -> Option<f32> {
        match self {
            Self::Leaf(v) => Some(*v),
            Self::Split { .. } => None,
        }
    }

    /// Get the split condition, if this is a split node.
    #[inline]
    pub fn split_condition(&self) -> Option<&SplitCondition> {
        match self {
            Self::Split { condition, .. } => Some(condition),
            Self::Leaf(_) => None,
        }
    }

    /// Get child indices, if this is a split node.
    #[inline]
    pub fn children(&self) -> Option<(NodeId, NodeId)> {
        match self {
            Self::Split { left, right, .. } => Some((*left, *right)),
            Self::Leaf(_) => None,
        }
    }
}

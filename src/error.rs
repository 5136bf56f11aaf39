//! Error types for ensemble loading and encoding.
//!
//! Every fault this crate reports happens while loading or encoding. Once a
//! representation is built and validated against the feature matrix, scoring
//! cannot fail.

use std::io;

/// Errors raised while building, encoding, or preparing an ensemble for scoring.
#[derive(Debug, thiserror::Error)]
pub enum ForestError {
    /// The ensemble description or record stream is structurally invalid.
    #[error("malformed ensemble (tree {tree}): {reason}")]
    MalformedEnsemble { tree: usize, reason: String },

    /// A tree emitted more nodes than its `2 * max_leaves` capacity.
    #[error("tree {tree} exceeds its node capacity of {capacity}")]
    CapacityExceeded { tree: usize, capacity: usize },

    /// A tree is deeper than the depth-specialized traversal supports.
    #[error("tree {tree} has unsupported depth {depth} (supported: 1..={max})", max = crate::repr::MAX_DEPTH)]
    UnsupportedDepth { tree: usize, depth: usize },

    /// The feature input does not match its header or the ensemble.
    #[error("malformed features: {0}")]
    MalformedFeatures(String),

    /// An input file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl ForestError {
    pub(crate) fn malformed(tree: usize, reason: impl Into<String>) -> Self {
        Self::MalformedEnsemble {
            tree,
            reason: reason.into(),
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T, E = ForestError> = std::result::Result<T, E>;

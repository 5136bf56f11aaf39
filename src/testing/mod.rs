//! Testing utilities shared by unit tests, integration tests and benches.
//!
//! - score vector comparison ([`assert_scores_eq`])
//! - seeded random ensembles and feature matrices ([`RandomEnsemble`],
//!   [`random_features`])
//!
//! # Usage
//!
//! ```
//! use flatforest::testing::{assert_scores_eq, RandomEnsemble};
//! use flatforest::builder::build_ensemble;
//!
//! let records = RandomEnsemble::new(4, 3).max_depth(5).generate(42);
//! let ensemble = build_ensemble(&records, RandomEnsemble::max_leaves_for(5)).unwrap();
//! assert_eq!(ensemble.n_trees(), 4);
//! assert_scores_eq(&[1.0, 2.0], &[1.0, 2.0], "scores");
//! ```

mod ensemble;

pub use ensemble::{random_features, to_text, RandomEnsemble};

use approx::RelativeEq;

// =============================================================================
// Constants
// =============================================================================

/// Default tolerance for floating point comparisons.
/// This is appropriate for most scores where values are O(1).
pub const DEFAULT_TOLERANCE: f32 = 1e-5;

// =============================================================================
// Score Assertions
// =============================================================================

/// Assert that two score vectors agree element-wise.
///
/// Values match when they are within [`DEFAULT_TOLERANCE`] absolutely or
/// relatively, so large sums over many trees are compared fairly.
///
/// # Panics
///
/// Panics if lengths differ or any element differs beyond tolerance.
pub fn assert_scores_eq(actual: &[f32], expected: &[f32], context: &str) {
    assert_eq!(
        actual.len(),
        expected.len(),
        "{context}: length mismatch - got {}, expected {}",
        actual.len(),
        expected.len()
    );

    for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
        assert!(
            a.relative_eq(e, DEFAULT_TOLERANCE, DEFAULT_TOLERANCE),
            "{context}[{i}]: {a} ≠ {e} (diff={})",
            (a - e).abs()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scores_use_relative_tolerance() {
        assert_scores_eq(&[1_000_000.0], &[1_000_001.0], "large");
    }

    #[test]
    #[should_panic(expected = "length mismatch")]
    fn scores_length_mismatch() {
        assert_scores_eq(&[1.0], &[1.0, 2.0], "len");
    }
}

//! Ensemble scorers.
//!
//! Every representation scores through the [`Scorer`] trait:
//!
//! - [`DescentPredictor`]: per-row root-to-leaf descent over an
//!   [`Ensemble`] of linked or compact trees
//! - [`FlatPredictor`]: batches of `V` rows walked through a [`FlatForest`]
//!   with one depth-specialized routine per tree
//!
//! All of them produce the same score for the same row: the sum of every
//! tree's leaf value, accumulated in ensemble order.

use tracing::debug;

use crate::data::DenseMatrix;
use crate::error::{ForestError, Result};
use crate::repr::{Ensemble, FlatForest, TreeView};

use super::traversal::{DepthDispatch, LeafFinder};

// =============================================================================
// Scorer Trait
// =============================================================================

/// Something that turns a feature matrix into one score per row.
pub trait Scorer {
    /// Minimum number of feature columns this scorer reads.
    fn required_features(&self) -> usize;

    /// Write one score per row of `features` into `out`.
    ///
    /// Callers must have checked the feature width with
    /// [`check_features`](Self::check_features); `out.len()` must equal
    /// `features.num_rows()`.
    fn predict_into(&self, features: &DenseMatrix, out: &mut [f32]);

    /// Fail unless every row is wide enough for the ensemble's splits.
    fn check_features(&self, features: &DenseMatrix) -> Result<()> {
        let required = self.required_features();
        if features.num_features() < required {
            return Err(ForestError::MalformedFeatures(format!(
                "ensemble reads {required} features but rows have {}",
                features.num_features()
            )));
        }
        Ok(())
    }

    /// Score every row of `features`.
    fn predict(&self, features: &DenseMatrix) -> Result<Vec<f32>> {
        self.check_features(features)?;
        let mut out = vec![0.0; features.num_rows()];
        self.predict_into(features, &mut out);
        Ok(out)
    }
}

// =============================================================================
// DescentPredictor
// =============================================================================

/// Scores one row at a time by descending every tree from its root.
#[derive(Debug, Clone, Copy)]
pub struct DescentPredictor<'e, T> {
    ensemble: &'e Ensemble<T>,
    required_features: usize,
}

impl<'e, T: TreeView> DescentPredictor<'e, T> {
    pub fn new(ensemble: &'e Ensemble<T>) -> Self {
        Self {
            ensemble,
            required_features: ensemble.required_features(),
        }
    }

    /// Score a single feature vector.
    #[inline]
    pub fn predict_row(&self, features: &[f32]) -> f32 {
        self.ensemble.predict_row(features)
    }
}

impl<T: TreeView> Scorer for DescentPredictor<'_, T> {
    fn required_features(&self) -> usize {
        self.required_features
    }

    fn predict_into(&self, features: &DenseMatrix, out: &mut [f32]) {
        debug_assert_eq!(out.len(), features.num_rows());
        for (score, row) in out.iter_mut().zip(features.rows()) {
            *score = self.predict_row(row);
        }
    }
}

// =============================================================================
// FlatPredictor
// =============================================================================

/// Scores `V` rows at a time against a [`FlatForest`].
///
/// Each tree's routine is picked from the depth table once, at construction,
/// so scoring itself cannot fail. A final partial batch is topped up with
/// zero rows whose scores are discarded.
#[derive(Clone)]
pub struct FlatPredictor<'f, const V: usize> {
    forest: &'f FlatForest,
    routines: Box<[LeafFinder<V>]>,
    required_features: usize,
}

impl<'f, const V: usize> FlatPredictor<'f, V> {
    /// Resolve a traversal routine for every tree of `forest`.
    ///
    /// A single-leaf tree uses the one-step routine; its root is a self-loop.
    ///
    /// # Errors
    ///
    /// [`ForestError::UnsupportedDepth`] if a tree's depth has no routine.
    pub fn new(forest: &'f FlatForest) -> Result<Self> {
        let routines = forest
            .trees()
            .iter()
            .enumerate()
            .map(|(tree, range)| DepthDispatch::<V>::dispatch(tree, range.steps()))
            .collect::<Result<Box<[_]>>>()?;

        debug!(trees = routines.len(), batch = V, "resolved flat traversal routines");
        Ok(Self {
            forest,
            routines,
            // Leaves read feature 0, so any non-empty forest needs one column.
            required_features: forest.max_feature_index().map_or(0, |idx| idx as usize + 1),
        })
    }

    /// Batch width.
    #[inline]
    pub const fn batch_size(&self) -> usize {
        V
    }

    /// Sum every tree's leaf value for one full batch.
    #[inline]
    pub fn predict_batch(&self, rows: &[&[f32]; V]) -> [f32; V] {
        let nodes = self.forest.nodes();
        let mut sums = [0.0f32; V];

        for (range, routine) in self.forest.trees().iter().zip(self.routines.iter()) {
            let terminals = routine(nodes, range.offset, rows);
            for (sum, terminal) in sums.iter_mut().zip(terminals) {
                *sum += nodes[(range.offset + terminal) as usize].theta;
            }
        }

        sums
    }
}

impl<const V: usize> std::fmt::Debug for FlatPredictor<'_, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlatPredictor")
            .field("batch_size", &V)
            .field("n_trees", &self.routines.len())
            .field("required_features", &self.required_features)
            .finish()
    }
}

impl<const V: usize> Scorer for FlatPredictor<'_, V> {
    fn required_features(&self) -> usize {
        self.required_features
    }

    fn predict_into(&self, features: &DenseMatrix, out: &mut [f32]) {
        debug_assert_eq!(out.len(), features.num_rows());
        let n_rows = features.num_rows();
        let padding = vec![0.0f32; features.num_features()];

        for (batch, scores) in out.chunks_mut(V).enumerate() {
            let start = batch * V;
            let rows: [&[f32]; V] = std::array::from_fn(|j| {
                if start + j < n_rows {
                    features.row(start + j)
                } else {
                    padding.as_slice()
                }
            });

            let sums = self.predict_batch(&rows);
            scores.copy_from_slice(&sums[..scores.len()]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repr::{CompactTree, Node, SplitCondition};

    fn stump(left: f32, right: f32) -> CompactTree {
        CompactTree::from_nodes(vec![
            Node::split(SplitCondition::new(0, 0.5), 1, 2),
            Node::leaf(left),
            Node::leaf(right),
        ])
    }

    fn two_stumps() -> Ensemble<CompactTree> {
        [stump(1.0, 2.0), stump(1.0, 2.0)].into_iter().collect()
    }

    fn column(values: &[f32]) -> DenseMatrix {
        DenseMatrix::from_vec(values.to_vec(), values.len(), 1)
    }

    #[test]
    fn descent_scores_rows() {
        let ensemble = two_stumps();
        let scores = DescentPredictor::new(&ensemble)
            .predict(&column(&[0.1, 0.9, 0.5]))
            .unwrap();
        assert_eq!(scores, vec![2.0, 4.0, 2.0]);
    }

    #[test]
    fn flat_matches_descent_with_partial_batch() {
        let ensemble = two_stumps();
        let flat = FlatForest::from_trees(ensemble.trees()).unwrap();
        let features = column(&[0.1, 0.9, 0.5, 0.7, 0.2]);

        let expected = DescentPredictor::new(&ensemble).predict(&features).unwrap();
        assert_eq!(FlatPredictor::<1>::new(&flat).unwrap().predict(&features).unwrap(), expected);
        assert_eq!(FlatPredictor::<4>::new(&flat).unwrap().predict(&features).unwrap(), expected);
        assert_eq!(FlatPredictor::<8>::new(&flat).unwrap().predict(&features).unwrap(), expected);
    }

    #[test]
    fn padding_scores_are_dropped() {
        // Zero padding rows would score 100.0 here; none may leak into the output.
        let ensemble: Ensemble<_> = [stump(100.0, -1.0)].into_iter().collect();
        let flat = FlatForest::from_trees(ensemble.trees()).unwrap();
        let predictor = FlatPredictor::<8>::new(&flat).unwrap();

        let scores = predictor.predict(&column(&[1.0, 2.0, 3.0])).unwrap();
        assert_eq!(scores, vec![-1.0, -1.0, -1.0]);
    }

    #[test]
    fn single_leaf_tree_is_scored() {
        let ensemble: Ensemble<_> = [CompactTree::from_nodes(vec![Node::leaf(0.25)]), stump(1.0, 2.0)]
            .into_iter()
            .collect();
        let flat = FlatForest::from_trees(ensemble.trees()).unwrap();

        let scores = FlatPredictor::<4>::new(&flat).unwrap().predict(&column(&[0.1, 0.9])).unwrap();
        assert_eq!(scores, vec![1.25, 2.25]);
    }

    #[test]
    fn narrow_rows_are_rejected() {
        let ensemble: Ensemble<_> = [CompactTree::from_nodes(vec![
            Node::split(SplitCondition::new(2, 0.5), 1, 2),
            Node::leaf(1.0),
            Node::leaf(2.0),
        ])]
        .into_iter()
        .collect();
        let flat = FlatForest::from_trees(ensemble.trees()).unwrap();
        let features = DenseMatrix::zeros(1, 2);

        for result in [
            DescentPredictor::new(&ensemble).predict(&features),
            FlatPredictor::<4>::new(&flat).unwrap().predict(&features),
        ] {
            assert!(matches!(result, Err(ForestError::MalformedFeatures(_))));
        }
    }

    #[test]
    fn empty_inputs() {
        let ensemble = two_stumps();
        let flat = FlatForest::from_trees(ensemble.trees()).unwrap();
        let scores = FlatPredictor::<8>::new(&flat)
            .unwrap()
            .predict(&DenseMatrix::zeros(0, 1))
            .unwrap();
        assert!(scores.is_empty());
    }
}

//! Ensemble: an ordered collection of trees whose outputs are summed.

use std::fmt;

use super::compact::CompactTree;
use super::view::TreeView;

/// Additive tree ensemble.
///
/// Generic over the tree representation so the linked trees produced by
/// ingestion and their compacted copies share one scoring path.
#[derive(Debug, Clone)]
pub struct Ensemble<T> {
    trees: Vec<T>,
}

impl<T> Default for Ensemble<T> {
    fn default() -> Self {
        Self { trees: Vec::new() }
    }
}

impl<T> Ensemble<T> {
    /// Create an empty ensemble.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty ensemble with room for `n_trees` trees.
    pub fn with_capacity(n_trees: usize) -> Self {
        Self {
            trees: Vec::with_capacity(n_trees),
        }
    }

    /// Append a tree; ensemble order is insertion order.
    pub fn push_tree(&mut self, tree: T) {
        self.trees.push(tree);
    }

    /// Number of trees.
    #[inline]
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Whether the ensemble has no trees.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }

    /// Get a reference to a specific tree.
    #[inline]
    pub fn tree(&self, idx: usize) -> &T {
        &self.trees[idx]
    }

    /// Iterate over trees.
    pub fn trees(&self) -> impl Iterator<Item = &T> {
        self.trees.iter()
    }
}

impl<T: TreeView> Ensemble<T> {
    /// Score one feature vector: the sum of every tree's leaf value.
    pub fn predict_row(&self, features: &[f32]) -> f32 {
        self.trees.iter().map(|tree| tree.predict_row(features)).sum()
    }

    /// Largest feature index read by any split.
    pub fn max_feature_index(&self) -> Option<u32> {
        self.trees.iter().filter_map(TreeView::max_feature_index).max()
    }

    /// Minimum feature vector width needed to score this ensemble.
    #[inline]
    pub fn required_features(&self) -> usize {
        self.max_feature_index().map_or(0, |idx| idx as usize + 1)
    }

    /// Repack every tree into its compact form.
    pub fn compact(&self) -> Ensemble<CompactTree> {
        Ensemble {
            trees: self.trees.iter().map(CompactTree::from_tree).collect(),
        }
    }

    /// Structural summary of the ensemble.
    pub fn stats(&self) -> EnsembleStats {
        let mut stats = EnsembleStats {
            n_trees: self.trees.len(),
            ..EnsembleStats::default()
        };

        for tree in &self.trees {
            stats.n_nodes += tree.count_nodes();
            stats.n_leaves += tree.count_leaves();
            stats.max_depth = stats.max_depth.max(tree.depth());
        }

        stats
    }
}

impl<T> FromIterator<T> for Ensemble<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            trees: iter.into_iter().collect(),
        }
    }
}

/// Node, leaf and depth totals of an [`Ensemble`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct EnsembleStats {
    pub n_trees: usize,
    pub n_nodes: usize,
    pub n_leaves: usize,
    pub max_depth: usize,
}

impl fmt::Display for EnsembleStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} trees, {} nodes, {} leaves, max depth {}",
            self.n_trees, self.n_nodes, self.n_leaves, self.max_depth
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repr::{Node, SplitCondition};

    fn stump(left: f32, right: f32, threshold: f32) -> CompactTree {
        CompactTree::from_nodes(vec![
            Node::split(SplitCondition::new(0, threshold), 1, 2),
            Node::leaf(left),
            Node::leaf(right),
        ])
    }

    #[test]
    fn single_tree() {
        let mut ensemble = Ensemble::new();
        ensemble.push_tree(stump(1.0, 2.0, 0.5));

        assert_eq!(ensemble.predict_row(&[0.1]), 1.0);
        assert_eq!(ensemble.predict_row(&[0.9]), 2.0);
        assert_eq!(ensemble.predict_row(&[0.5]), 1.0);
    }

    #[test]
    fn trees_are_summed() {
        let ensemble: Ensemble<_> = [stump(1.0, 2.0, 0.5), stump(1.0, 2.0, 0.5)]
            .into_iter()
            .collect();

        assert_eq!(ensemble.n_trees(), 2);
        assert_eq!(ensemble.predict_row(&[0.1]), 2.0);
        assert_eq!(ensemble.predict_row(&[0.9]), 4.0);
    }

    #[test]
    fn stats_and_feature_width() {
        let deeper = CompactTree::from_nodes(vec![
            Node::split(SplitCondition::new(3, 0.0), 1, 4),
            Node::split(SplitCondition::new(1, 0.0), 2, 3),
            Node::leaf(1.0),
            Node::leaf(2.0),
            Node::leaf(3.0),
        ]);
        let ensemble: Ensemble<_> = [stump(0.0, 1.0, 0.5), deeper].into_iter().collect();

        assert_eq!(
            ensemble.stats(),
            EnsembleStats {
                n_trees: 2,
                n_nodes: 8,
                n_leaves: 5,
                max_depth: 2,
            }
        );
        assert_eq!(ensemble.max_feature_index(), Some(3));
        assert_eq!(ensemble.required_features(), 4);
    }

    #[test]
    fn empty_ensemble_scores_zero() {
        let ensemble = Ensemble::<CompactTree>::new();
        assert!(ensemble.is_empty());
        assert_eq!(ensemble.predict_row(&[1.0]), 0.0);
        assert_eq!(ensemble.required_features(), 0);
    }
}

//! Seeded random ensembles in record form.
//!
//! Generated trees look like real exporter output: ids are sparse and
//! unordered, records arrive in a shuffled parent-before-child order, and
//! some leaves are written as childless `node` records. Thresholds and
//! feature values share a coarse grid so ties with `theta` happen often.

use std::fmt::Write as _;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::builder::{EnsembleRecords, NodeRecord, TreeRecords};
use crate::data::DenseMatrix;

/// Grid shared by thresholds and feature values.
const GRID: [f32; 5] = [-1.0, -0.5, 0.0, 0.5, 1.0];

/// Random ensemble generator.
#[derive(Debug, Clone)]
pub struct RandomEnsemble {
    n_trees: usize,
    n_features: usize,
    max_depth: usize,
    split_probability: f64,
}

impl RandomEnsemble {
    /// `n_trees` trees splitting on features `0..n_features`.
    pub fn new(n_trees: usize, n_features: usize) -> Self {
        Self {
            n_trees,
            n_features: n_features.max(1),
            max_depth: 6,
            split_probability: 0.75,
        }
    }

    /// Deepest tree that may be generated. Default: 6.
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Chance that a node below the root splits. Default: 0.75.
    pub fn split_probability(mut self, p: f64) -> Self {
        self.split_probability = p.clamp(0.0, 1.0);
        self
    }

    /// `max_leaves` large enough for any tree of depth `max_depth`.
    pub fn max_leaves_for(max_depth: usize) -> usize {
        1usize << max_depth.min(usize::BITS as usize - 2)
    }

    /// Generate the record streams for seed `seed`.
    pub fn generate(&self, seed: u64) -> EnsembleRecords {
        let mut rng = StdRng::seed_from_u64(seed);
        let trees = (0..self.n_trees).map(|_| self.tree(&mut rng)).collect();

        EnsembleRecords {
            declared_trees: self.n_trees,
            trees,
        }
    }

    fn tree(&self, rng: &mut StdRng) -> TreeRecords {
        struct Pending {
            id: u64,
            parent: Option<(u64, bool)>,
            depth: usize,
        }

        let mut next_id = rng.gen_range(0..1000u64);
        let mut frontier = vec![Pending {
            id: next_id,
            parent: None,
            depth: 0,
        }];
        let mut records = Vec::new();
        let mut depth = 0;

        while !frontier.is_empty() {
            let pending = frontier.swap_remove(rng.gen_range(0..frontier.len()));
            depth = depth.max(pending.depth);

            let splits = pending.depth < self.max_depth
                && (pending.depth == 0 || rng.gen_bool(self.split_probability));
            let fid = rng.gen_range(0..self.n_features) as i32;
            let theta = self.value(rng);

            records.push(match (pending.parent, splits) {
                (None, _) => NodeRecord::Root {
                    id: pending.id,
                    fid,
                    theta,
                },
                (Some((parent_id, is_left)), true) => NodeRecord::Node {
                    id: pending.id,
                    parent_id,
                    is_left,
                    fid,
                    theta,
                },
                (Some((parent_id, is_left)), false) if rng.gen_bool(0.2) => NodeRecord::Node {
                    id: pending.id,
                    parent_id,
                    is_left,
                    fid,
                    theta,
                },
                (Some((parent_id, is_left)), false) => NodeRecord::Leaf {
                    id: pending.id,
                    parent_id,
                    is_left,
                    value: theta,
                },
            });

            if splits {
                for is_left in [true, false] {
                    next_id += rng.gen_range(1..7u64);
                    frontier.push(Pending {
                        id: next_id,
                        parent: Some((pending.id, is_left)),
                        depth: pending.depth + 1,
                    });
                }
            }
        }

        records.push(NodeRecord::End);
        TreeRecords {
            hint: Some(depth as u64),
            records,
        }
    }

    fn value(&self, rng: &mut StdRng) -> f32 {
        if rng.gen_bool(0.5) {
            GRID[rng.gen_range(0..GRID.len())]
        } else {
            rng.gen_range(-1.0f32..1.0)
        }
    }
}

/// Random `n_rows x n_features` matrix drawn like the generator's thresholds.
pub fn random_features(n_rows: usize, n_features: usize, seed: u64) -> DenseMatrix {
    let mut rng = StdRng::seed_from_u64(seed);
    let data = (0..n_rows * n_features)
        .map(|_| {
            if rng.gen_bool(0.5) {
                GRID[rng.gen_range(0..GRID.len())]
            } else {
                rng.gen_range(-1.5f32..1.5)
            }
        })
        .collect();
    DenseMatrix::from_vec(data, n_rows, n_features)
}

/// Render records in the textual ensemble format.
pub fn to_text(records: &EnsembleRecords) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", records.declared_trees);

    for tree in &records.trees {
        if let Some(hint) = tree.hint {
            let _ = writeln!(out, "{hint}");
        }
        for record in &tree.records {
            let _ = match *record {
                NodeRecord::Root { id, fid, theta } => writeln!(out, "root {id} {fid} {theta}"),
                NodeRecord::Node {
                    id,
                    parent_id,
                    is_left,
                    fid,
                    theta,
                } => writeln!(out, "node {id} {parent_id} {} {fid} {theta}", is_left as u8),
                NodeRecord::Leaf {
                    id,
                    parent_id,
                    is_left,
                    value,
                } => writeln!(out, "leaf {id} {parent_id} {} {value}", is_left as u8),
                NodeRecord::End => writeln!(out, "end"),
            };
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::build_ensemble;
    use crate::io::parse_ensemble;
    use crate::repr::TreeView;

    #[test]
    fn generated_ensembles_build() {
        let generator = RandomEnsemble::new(10, 4).max_depth(7);
        for seed in 0..20 {
            let records = generator.generate(seed);
            let ensemble = build_ensemble(&records, RandomEnsemble::max_leaves_for(7)).unwrap();

            assert_eq!(ensemble.n_trees(), 10);
            for (tree, segment) in ensemble.trees().zip(&records.trees) {
                assert!(tree.depth() <= 7);
                assert_eq!(segment.hint, Some(tree.depth() as u64));
            }
            assert!(ensemble.required_features() <= 4);
        }
    }

    #[test]
    fn same_seed_same_ensemble() {
        let generator = RandomEnsemble::new(3, 2);
        assert_eq!(generator.generate(7), generator.generate(7));
        assert_ne!(generator.generate(7), generator.generate(8));
    }

    #[test]
    fn text_round_trips_through_parser() {
        let records = RandomEnsemble::new(5, 3).generate(11);
        assert_eq!(parse_ensemble(&to_text(&records)).unwrap(), records);
    }

    #[test]
    fn features_have_requested_shape() {
        let m = random_features(13, 5, 1);
        assert_eq!((m.num_rows(), m.num_features()), (13, 5));
        assert_eq!(m, random_features(13, 5, 1));
    }
}

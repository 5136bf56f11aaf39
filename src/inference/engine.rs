//! A loaded ensemble in its scoring representation.

use tracing::debug;

use crate::config::{BatchSize, Layout};
use crate::error::Result;
use crate::repr::{CompactTree, Ensemble, EnsembleStats, FlatForest, LinkedTree};

use super::predictor::{DescentPredictor, FlatPredictor, Scorer};

/// Ensemble converted once into the representation it will be scored in.
///
/// The intermediate linked trees are dropped as soon as a compact or flat
/// copy exists.
#[derive(Debug)]
pub enum Engine {
    Linked(Ensemble<LinkedTree>),
    Compact(Ensemble<CompactTree>),
    Flat {
        forest: FlatForest,
        batch_size: BatchSize,
    },
}

impl Engine {
    /// Convert `ensemble` into `layout`.
    ///
    /// # Errors
    ///
    /// [`ForestError::UnsupportedDepth`](crate::ForestError::UnsupportedDepth)
    /// if the flat layout is chosen and a tree is too deep.
    pub fn new(ensemble: Ensemble<LinkedTree>, layout: Layout, batch_size: BatchSize) -> Result<Self> {
        let engine = match layout {
            Layout::Linked => Self::Linked(ensemble),
            Layout::Compact => Self::Compact(ensemble.compact()),
            Layout::Flat => Self::Flat {
                forest: FlatForest::from_trees(ensemble.trees())?,
                batch_size,
            },
        };

        debug!(%layout, trees = engine.n_trees(), "engine ready");
        Ok(engine)
    }

    /// Representation held by this engine.
    pub fn layout(&self) -> Layout {
        match self {
            Self::Linked(_) => Layout::Linked,
            Self::Compact(_) => Layout::Compact,
            Self::Flat { .. } => Layout::Flat,
        }
    }

    /// Number of trees.
    pub fn n_trees(&self) -> usize {
        match self {
            Self::Linked(ensemble) => ensemble.n_trees(),
            Self::Compact(ensemble) => ensemble.n_trees(),
            Self::Flat { forest, .. } => forest.n_trees(),
        }
    }

    /// Structural summary of the held representation.
    pub fn stats(&self) -> EnsembleStats {
        match self {
            Self::Linked(ensemble) => ensemble.stats(),
            Self::Compact(ensemble) => ensemble.stats(),
            Self::Flat { forest, .. } => forest.stats(),
        }
    }

    /// Scorer over this engine's representation.
    ///
    /// # Errors
    ///
    /// [`ForestError::UnsupportedDepth`](crate::ForestError::UnsupportedDepth)
    /// if a flat tree has no traversal routine.
    pub fn scorer(&self) -> Result<Box<dyn Scorer + '_>> {
        let scorer: Box<dyn Scorer + '_> = match self {
            Self::Linked(ensemble) => Box::new(DescentPredictor::new(ensemble)),
            Self::Compact(ensemble) => Box::new(DescentPredictor::new(ensemble)),
            Self::Flat { forest, batch_size } => match batch_size {
                BatchSize::B1 => Box::new(FlatPredictor::<1>::new(forest)?),
                BatchSize::B4 => Box::new(FlatPredictor::<4>::new(forest)?),
                BatchSize::B8 => Box::new(FlatPredictor::<8>::new(forest)?),
                BatchSize::B16 => Box::new(FlatPredictor::<16>::new(forest)?),
                BatchSize::B32 => Box::new(FlatPredictor::<32>::new(forest)?),
            },
        };
        Ok(scorer)
    }
}

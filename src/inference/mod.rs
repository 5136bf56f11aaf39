//! Scoring engines.
//!
//! # Overview
//!
//! - [`traversal`]: depth-specialized batch routines and their dispatch table
//! - [`predictor`]: the [`Scorer`] trait with per-row and batched scorers
//! - [`engine`]: a loaded ensemble held in whichever [`Layout`] was chosen
//!
//! # Example
//!
//! ```
//! use flatforest::builder::build_ensemble;
//! use flatforest::config::{BatchSize, Layout};
//! use flatforest::data::DenseMatrix;
//! use flatforest::inference::{Engine, Scorer};
//! use flatforest::io::parse_ensemble;
//!
//! let records = parse_ensemble("1 1 root 1 0 0.5 leaf 2 1 1 1.0 leaf 3 1 0 2.0 end").unwrap();
//! let ensemble = build_ensemble(&records, 2).unwrap();
//! let engine = Engine::new(ensemble, Layout::Flat, BatchSize::B4).unwrap();
//!
//! let features = DenseMatrix::from_vec(vec![0.1, 0.9, 0.5], 3, 1);
//! let scores = engine.scorer().unwrap().predict(&features).unwrap();
//! assert_eq!(scores, vec![1.0, 2.0, 1.0]);
//! ```
//!
//! [`Layout`]: crate::config::Layout

pub mod engine;
pub mod predictor;
pub mod traversal;

pub use engine::Engine;
pub use predictor::{DescentPredictor, FlatPredictor, Scorer};
pub use traversal::{
    find_leaves, DepthDispatch, LeafFinder, DEFAULT_BATCH_SIZE, SUPPORTED_BATCH_SIZES,
};

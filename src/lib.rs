//! flatforest: tree-ensemble scoring over interchangeable memory layouts.
//!
//! One additive tree ensemble can be held three ways and scored by each:
//!
//! - linked trees built straight from a parent-referencing record stream
//! - compact pre-order arrays, one slot per node
//! - a flat shared buffer walked in fixed-size batches by depth-specialized
//!   routines, with self-looping leaves standing in for "done" checks
//!
//! All three compute the same function; the crate exists to compare how
//! layout and execution pattern affect throughput.
//!
//! # Pipeline
//!
//! ```text
//! text ─► io::parse_ensemble ─► builder::build_ensemble ─► Ensemble<LinkedTree>
//!                                                            │
//!                     ┌──────────────────────┬───────────────┤
//!                     ▼                      ▼               ▼
//!              descent (linked)   Ensemble<CompactTree>   FlatForest
//!                                       descent          batch traversal
//! ```

pub mod builder;
pub mod config;
pub mod data;
pub mod error;
pub mod eval;
pub mod inference;
pub mod io;
pub mod repr;
pub mod testing;

pub use config::{BatchSize, ConfigError, EvalConfig, Layout};
pub use error::{ForestError, Result};
pub use inference::{Engine, Scorer};
pub use repr::{CompactTree, Ensemble, FlatForest, LinkedTree, TreeView};

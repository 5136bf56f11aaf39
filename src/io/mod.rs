//! Text loaders for ensembles and feature files.
//!
//! - [`ensemble`]: whitespace-separated tree descriptions, parsed into the
//!   record stream consumed by [`TreeBuilder`](crate::builder::TreeBuilder)
//! - [`features`]: SVM-light style instance files, densified into a
//!   [`DenseMatrix`](crate::data::DenseMatrix)

pub mod ensemble;
pub mod features;

pub use ensemble::{load_ensemble, parse_ensemble};
pub use features::{load_features, parse_features};

//! Feature matrices.
//!
//! Instances are stored densely in row-major order: every row holds one
//! value per feature, with zeros for features a sparse input left out.

mod dense;

pub use dense::DenseMatrix;

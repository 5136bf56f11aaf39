//! In-memory representations of a tree ensemble.
//!
//! The same decision function is stored three ways:
//!
//! - [`LinkedTree`]: arena of nodes in arrival order with optional child links,
//!   as produced by [`TreeBuilder`](crate::builder::TreeBuilder)
//! - [`CompactTree`]: dense pre-order array with exactly one slot per node
//! - [`FlatForest`]: every tree packed into one shared [`FlatNode`] buffer with
//!   self-looping leaves, consumed by the depth-specialized batch traversal
//!
//! [`LinkedTree`] and [`CompactTree`] implement [`TreeView`], so both the
//! encoders and the per-row descent are written once against that trait.

/// Index of a node inside its tree's storage.
pub type NodeId = u32;

/// Deepest tree the depth-specialized traversal can dispatch.
pub const MAX_DEPTH: usize = 150;

pub mod compact;
pub mod ensemble;
pub mod flat;
pub mod linked;
pub mod node;
pub mod view;

pub use compact::CompactTree;
pub use ensemble::{Ensemble, EnsembleStats};
pub use flat::{FlatForest, FlatNode, TreeRange};
pub use linked::{LinkedNode, LinkedTree};
pub use node::{go_right, Node, SplitCondition};
pub use view::TreeView;

//! Depth-specialized batch traversal over a [`FlatForest`] buffer.
//!
//! A batch of `V` rows walks one tree in lock step for exactly `DEPTH`
//! steps. Every step runs the same instructions for every row:
//!
//! ```text
//! cur[j] = node[cur[j]].children[(row[j][node.fid] > node.theta) as usize]
//! ```
//!
//! Leaves loop onto themselves, so a row that lands on a shallow leaf keeps
//! stepping in place until the batch finishes. No row ever checks whether it
//! is done, which keeps the loop body free of data-dependent exits and lets
//! the compiler unroll the fixed trip count.
//!
//! [`FlatForest`]: crate::repr::FlatForest

use crate::error::{ForestError, Result};
use crate::repr::{FlatNode, MAX_DEPTH};

/// Batch widths compiled into the dispatch tables.
pub const SUPPORTED_BATCH_SIZES: [usize; 5] = [1, 4, 8, 16, 32];

/// Default batch width.
pub const DEFAULT_BATCH_SIZE: usize = 8;

/// Routine that walks one tree for a full batch of `V` rows.
///
/// Takes the shared buffer, the tree's root offset and one feature row per
/// batch slot. Returns each row's terminal index relative to the offset.
pub type LeafFinder<const V: usize> = fn(&[FlatNode], u32, &[&[f32]; V]) -> [u32; V];

/// Walk `V` rows through one tree for exactly `DEPTH` steps.
///
/// `DEPTH` must be at least the tree's depth. Extra steps are harmless: a
/// row parked on a leaf stays there.
#[inline]
pub fn find_leaves<const DEPTH: usize, const V: usize>(
    nodes: &[FlatNode],
    offset: u32,
    rows: &[&[f32]; V],
) -> [u32; V] {
    let mut cur = [offset; V];

    for _ in 0..DEPTH {
        for j in 0..V {
            cur[j] = nodes[cur[j] as usize].step(rows[j]);
        }
    }

    for terminal in &mut cur {
        *terminal -= offset;
    }
    cur
}

macro_rules! depth_table {
    ($v:ident; $($depth:literal)+) => {
        [None, $(Some(find_leaves::<$depth, $v> as LeafFinder<$v>)),+]
    };
}

/// Depth-indexed table of [`find_leaves`] instantiations for batch width `V`.
///
/// Entry `d` performs exactly `d` steps. There is no entry for depth 0.
pub struct DepthDispatch<const V: usize>;

impl<const V: usize> DepthDispatch<V> {
    const TABLE: [Option<LeafFinder<V>>; MAX_DEPTH + 1] = depth_table!(V;
        1 2 3 4 5 6 7 8 9 10 11 12 13 14 15
        16 17 18 19 20 21 22 23 24 25 26 27 28 29 30
        31 32 33 34 35 36 37 38 39 40 41 42 43 44 45
        46 47 48 49 50 51 52 53 54 55 56 57 58 59 60
        61 62 63 64 65 66 67 68 69 70 71 72 73 74 75
        76 77 78 79 80 81 82 83 84 85 86 87 88 89 90
        91 92 93 94 95 96 97 98 99 100 101 102 103 104 105
        106 107 108 109 110 111 112 113 114 115 116 117 118 119 120
        121 122 123 124 125 126 127 128 129 130 131 132 133 134 135
        136 137 138 139 140 141 142 143 144 145 146 147 148 149 150
    );

    /// Routine performing exactly `depth` steps.
    #[inline]
    pub fn routine(depth: usize) -> Option<LeafFinder<V>> {
        Self::TABLE.get(depth).copied().flatten()
    }

    /// Routine for tree `tree` of depth `depth`.
    ///
    /// # Errors
    ///
    /// [`ForestError::UnsupportedDepth`] unless `1 <= depth <= MAX_DEPTH`.
    pub fn dispatch(tree: usize, depth: usize) -> Result<LeafFinder<V>> {
        Self::routine(depth).ok_or(ForestError::UnsupportedDepth { tree, depth })
    }
}

//! Ensemble description parser.
//!
//! # Format
//!
//! ```text
//! 2                       number of trees
//! 1                       per-tree hint (exporters write the depth)
//! root 1 0 0.5            root <id> <fid> <theta>
//! leaf 2 1 1 1.0          leaf <id> <parent_id> <is_left> <value>
//! leaf 3 1 0 2.0
//! end
//! 1
//! root 1 0 0.5
//! node 2 1 1 1 0.25       node <id> <parent_id> <is_left> <fid> <theta>
//! ...
//! end
//! ```
//!
//! Tokens are separated by any whitespace, so line breaks carry no meaning.
//! The hint is optional: a tree may start directly with `root`.
//!
//! Only the shape of each record is checked here. Structural rules (parents
//! exist, `end` is present, node counts) belong to the builder.

use std::path::Path;
use std::str::{FromStr, SplitWhitespace};

use tracing::debug;

use crate::builder::{EnsembleRecords, NodeRecord, TreeRecords};
use crate::error::{ForestError, Result};

/// Most tree segments reserved up front from the header's count.
const PREALLOC_TREES: usize = 1024;

/// Read and parse an ensemble description from `path`.
pub fn load_ensemble(path: impl AsRef<Path>) -> Result<EnsembleRecords> {
    let text = std::fs::read_to_string(path.as_ref())?;
    parse_ensemble(&text)
}

/// Parse an ensemble description into per-tree record streams.
///
/// A file that runs out before declaring every tree, or before a tree's
/// `end`, is returned as-is so the builder can report which tree is short.
pub fn parse_ensemble(text: &str) -> Result<EnsembleRecords> {
    let mut tokens = Tokens {
        inner: text.split_whitespace(),
        tree: 0,
    };

    let declared_trees: usize = match tokens.next() {
        Some(token) => tokens.parse(token, "tree count")?,
        None => return Err(ForestError::malformed(0, "empty ensemble description")),
    };

    // The header is untrusted until the builder checks it against the trees found.
    let mut trees = Vec::with_capacity(declared_trees.min(PREALLOC_TREES));

    for tree in 0..declared_trees {
        tokens.tree = tree;
        let Some(first) = tokens.next() else {
            break;
        };

        let mut segment = TreeRecords::default();
        let mut keyword = Some(first);
        if let Ok(hint) = first.parse::<u64>() {
            segment.hint = Some(hint);
            keyword = tokens.next();
        }

        while let Some(word) = keyword {
            let record = tokens.record(word)?;
            segment.records.push(record);
            if record == NodeRecord::End {
                break;
            }
            keyword = tokens.next();
        }

        debug!(tree, records = segment.records.len(), hint = ?segment.hint, "parsed tree records");
        trees.push(segment);
    }

    if let Some(extra) = tokens.next() {
        return Err(ForestError::malformed(
            declared_trees,
            format!("header declares {declared_trees} trees but `{extra}` follows the last one"),
        ));
    }

    Ok(EnsembleRecords {
        declared_trees,
        trees,
    })
}

/// Token cursor that remembers which tree it is in for error reporting.
struct Tokens<'a> {
    inner: SplitWhitespace<'a>,
    tree: usize,
}

impl<'a> Tokens<'a> {
    fn next(&mut self) -> Option<&'a str> {
        self.inner.next()
    }

    fn record(&mut self, keyword: &str) -> Result<NodeRecord> {
        let record = match keyword {
            "root" => NodeRecord::Root {
                id: self.field("id")?,
                fid: self.field("fid")?,
                theta: self.field("theta")?,
            },
            "node" => NodeRecord::Node {
                id: self.field("id")?,
                parent_id: self.field("parent id")?,
                is_left: self.flag()?,
                fid: self.field("fid")?,
                theta: self.field("theta")?,
            },
            "leaf" => NodeRecord::Leaf {
                id: self.field("id")?,
                parent_id: self.field("parent id")?,
                is_left: self.flag()?,
                value: self.field("value")?,
            },
            "end" => NodeRecord::End,
            other => {
                return Err(ForestError::malformed(
                    self.tree,
                    format!("unexpected token `{other}`"),
                ))
            }
        };
        Ok(record)
    }

    fn field<T: FromStr>(&mut self, what: &str) -> Result<T> {
        let token = self
            .next()
            .ok_or_else(|| ForestError::malformed(self.tree, format!("missing {what}")))?;
        self.parse(token, what)
    }

    fn flag(&mut self) -> Result<bool> {
        match self.next() {
            Some("1") => Ok(true),
            Some("0") => Ok(false),
            Some(other) => Err(ForestError::malformed(
                self.tree,
                format!("is_left must be 0 or 1, got `{other}`"),
            )),
            None => Err(ForestError::malformed(self.tree, "missing is_left")),
        }
    }

    fn parse<T: FromStr>(&self, token: &str, what: &str) -> Result<T> {
        token
            .parse()
            .map_err(|_| ForestError::malformed(self.tree, format!("invalid {what} `{token}`")))
    }
}

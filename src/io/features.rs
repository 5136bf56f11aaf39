//! SVM-light style feature files.
//!
//! # Format
//!
//! ```text
//! 2 3                         <n_instances> <n_features>
//! 0 qid:1 1:0.5 2:1.0 3:-2    <label> [qid:<q>] <index>:<value> ...
//! 1 qid:1 1:0.1 3:4 # note    trailing comments are ignored
//! ```
//!
//! One instance per line. Feature indices are 1-based, so `k:v` fills
//! column `k - 1`. Features a line leaves out are zero.

use std::path::Path;

use tracing::debug;

use crate::data::DenseMatrix;
use crate::error::{ForestError, Result};

/// Largest value count a `Vec<f32>` can address.
const MAX_VALUES: usize = isize::MAX as usize / std::mem::size_of::<f32>();

/// Most values reserved up front from the header's dimensions.
const RESERVE_VALUES: usize = 1 << 20;

/// Read and densify a feature file.
pub fn load_features(path: impl AsRef<Path>) -> Result<DenseMatrix> {
    let text = std::fs::read_to_string(path.as_ref())?;
    parse_features(&text)
}

/// Densify an SVM-light style instance listing.
///
/// # Errors
///
/// [`ForestError::MalformedFeatures`] for a bad header, a malformed pair, a
/// feature index outside `1..=n_features`, or an instance count that differs
/// from the header.
pub fn parse_features(text: &str) -> Result<DenseMatrix> {
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, strip_comment(line).trim()))
        .filter(|(_, line)| !line.is_empty());

    let (n_rows, n_features) = match lines.next() {
        Some((_, header)) => parse_header(header)?,
        None => return Err(malformed("empty feature file")),
    };

    let Some(n_values) = n_rows
        .checked_mul(n_features)
        .filter(|&n| n <= MAX_VALUES)
    else {
        return Err(malformed(format!(
            "header declares {n_rows} x {n_features} values, more than a matrix can hold"
        )));
    };

    // Rows are appended as they are read; the header only bounds the reservation.
    let mut data = Vec::with_capacity(n_values.min(RESERVE_VALUES));
    let mut row = 0;

    for (line_no, line) in lines {
        if row == n_rows {
            return Err(malformed(format!(
                "line {line_no}: more instances than the {n_rows} declared"
            )));
        }
        let start = data.len();
        data.resize(start + n_features, 0.0);
        fill_row(&mut data[start..], line, line_no)?;
        row += 1;
    }

    if row != n_rows {
        return Err(malformed(format!("header declares {n_rows} instances, found {row}")));
    }

    debug!(rows = n_rows, features = n_features, "loaded feature matrix");
    Ok(DenseMatrix::from_vec(data, n_rows, n_features))
}

fn parse_header(header: &str) -> Result<(usize, usize)> {
    let mut fields = header.split_whitespace().map(str::parse::<usize>);
    match (fields.next(), fields.next(), fields.next()) {
        (Some(Ok(rows)), Some(Ok(features)), None) => Ok((rows, features)),
        _ => Err(malformed(format!(
            "header must be `<n_instances> <n_features>`, got `{header}`"
        ))),
    }
}

fn fill_row(out: &mut [f32], line: &str, line_no: usize) -> Result<()> {
    let n_features = out.len();
    // The label is not used for scoring.
    for token in line.split_whitespace().skip(1) {
        let Some((index, value)) = token.split_once(':') else {
            return Err(malformed(format!("line {line_no}: expected index:value, got `{token}`")));
        };
        if index == "qid" {
            continue;
        }

        let index: usize = index
            .parse()
            .map_err(|_| malformed(format!("line {line_no}: invalid feature index `{index}`")))?;
        let value: f32 = value
            .parse()
            .map_err(|_| malformed(format!("line {line_no}: invalid value `{value}`")))?;

        if index == 0 || index > n_features {
            return Err(malformed(format!(
                "line {line_no}: feature index {index} outside 1..={n_features}"
            )));
        }
        out[index - 1] = value;
    }

    Ok(())
}

fn strip_comment(line: &str) -> &str {
    line.split_once('#').map_or(line, |(data, _)| data)
}

fn malformed(reason: impl Into<String>) -> ForestError {
    ForestError::MalformedFeatures(reason.into())
}

//! Run configuration.
//!
//! [`EvalConfig`] describes one scoring run: which files to load, how much
//! node storage each tree may use, and which representation scores them.
//! It is built with `bon` and validated when finished.
//!
//! # Example
//!
//! ```
//! use flatforest::config::{BatchSize, EvalConfig, Layout};
//!
//! let config = EvalConfig::builder()
//!     .ensemble("model.txt".into())
//!     .instances("test.svm".into())
//!     .max_leaves(64)
//!     .layout(Layout::Compact)
//!     .build()
//!     .unwrap();
//! assert_eq!(config.batch_size, BatchSize::default());
//!
//! assert!(EvalConfig::builder()
//!     .ensemble("model.txt".into())
//!     .instances("test.svm".into())
//!     .max_leaves(0)
//!     .build()
//!     .is_err());
//! ```

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use bon::Builder;

use crate::inference::traversal::SUPPORTED_BATCH_SIZES;

// =============================================================================
// ConfigError
// =============================================================================

/// Errors that can occur during configuration validation.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// `max_leaves` must be at least 1.
    InvalidMaxLeaves,
    /// Batch width without a compiled traversal.
    UnsupportedBatchSize(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidMaxLeaves => write!(f, "max_leaves must be at least 1"),
            Self::UnsupportedBatchSize(v) => {
                write!(f, "batch size must be one of {:?}, got {}", SUPPORTED_BATCH_SIZES, v)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

// =============================================================================
// Layout & BatchSize
// =============================================================================

/// In-memory representation used for scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    /// Linked trees straight from ingestion, scored by descent.
    Linked,
    /// Pre-order arrays, scored by descent.
    Compact,
    /// Shared flat buffer, scored in batches.
    #[default]
    Flat,
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Linked => "linked",
            Self::Compact => "compact",
            Self::Flat => "flat",
        })
    }
}

/// Number of rows walked through a tree together by the flat layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(into = "usize")]
pub enum BatchSize {
    B1,
    B4,
    B8,
    B16,
    B32,
}

impl BatchSize {
    /// Rows per batch.
    pub const fn get(self) -> usize {
        match self {
            Self::B1 => 1,
            Self::B4 => 4,
            Self::B8 => 8,
            Self::B16 => 16,
            Self::B32 => 32,
        }
    }
}

impl Default for BatchSize {
    fn default() -> Self {
        Self::B8
    }
}

impl TryFrom<usize> for BatchSize {
    type Error = ConfigError;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::B1),
            4 => Ok(Self::B4),
            8 => Ok(Self::B8),
            16 => Ok(Self::B16),
            32 => Ok(Self::B32),
            other => Err(ConfigError::UnsupportedBatchSize(other.to_string())),
        }
    }
}

impl From<BatchSize> for usize {
    fn from(size: BatchSize) -> Self {
        size.get()
    }
}

impl FromStr for BatchSize {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<usize>()
            .map_err(|_| ConfigError::UnsupportedBatchSize(s.to_string()))
            .and_then(Self::try_from)
    }
}

impl fmt::Display for BatchSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.get())
    }
}

// =============================================================================
// EvalConfig
// =============================================================================

/// Configuration of a scoring run.
#[derive(Debug, Clone, Builder)]
#[builder(
    derive(Clone, Debug),
    finish_fn(vis = "", name = __build_internal)
)]
pub struct EvalConfig {
    /// Ensemble description file.
    pub ensemble: PathBuf,

    /// SVM-light style instance file.
    pub instances: PathBuf,

    /// Per-tree node capacity is `2 * max_leaves`.
    pub max_leaves: usize,

    /// Representation to score with. Default: [`Layout::Flat`].
    #[builder(default)]
    pub layout: Layout,

    /// Rows per batch for the flat layout. Default: 8.
    #[builder(default)]
    pub batch_size: BatchSize,

    /// Print every instance's score. Default: false.
    #[builder(default)]
    pub print_scores: bool,
}

/// Custom finishing function that validates the config.
impl<S: eval_config_builder::IsComplete> EvalConfigBuilder<S> {
    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidMaxLeaves`] if `max_leaves == 0`.
    pub fn build(self) -> Result<EvalConfig, ConfigError> {
        let config = self.__build_internal();
        config.validate()?;
        Ok(config)
    }
}

impl EvalConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_leaves == 0 {
            return Err(ConfigError::InvalidMaxLeaves);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::traversal::DEFAULT_BATCH_SIZE;

    #[test]
    fn defaults() {
        let config = EvalConfig::builder()
            .ensemble("e.txt".into())
            .instances("i.txt".into())
            .max_leaves(16)
            .build()
            .unwrap();
        assert_eq!(config.max_leaves, 16);
        assert_eq!(config.layout, Layout::Flat);
        assert_eq!(config.batch_size, BatchSize::B8);
        assert!(!config.print_scores);
    }

    #[test]
    fn zero_max_leaves_rejected() {
        let err = EvalConfig::builder()
            .ensemble("e.txt".into())
            .instances("i.txt".into())
            .max_leaves(0)
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigError::InvalidMaxLeaves);
    }

    #[test]
    fn batch_sizes() {
        for size in SUPPORTED_BATCH_SIZES {
            assert_eq!(BatchSize::try_from(size).unwrap().get(), size);
            assert_eq!(size.to_string().parse::<BatchSize>().unwrap().get(), size);
        }
        assert_eq!(BatchSize::default().get(), DEFAULT_BATCH_SIZE);
        assert!(matches!("3".parse::<BatchSize>(), Err(ConfigError::UnsupportedBatchSize(_))));
        assert!(matches!("eight".parse::<BatchSize>(), Err(ConfigError::UnsupportedBatchSize(_))));
    }

    #[test]
    fn layout_names() {
        assert_eq!(Layout::Compact.to_string(), "compact");
        assert_eq!(serde_json::to_string(&Layout::Linked).unwrap(), "\"linked\"");
        assert_eq!(serde_json::to_string(&BatchSize::B16).unwrap(), "16");
    }
}

//! Error types for accord.

use serde::Serialize;
use thiserror::Error;

/// Result type for accord operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for accord operations.
///
/// Reliability failures are per-statistic: they travel inside
/// [`CoefficientResult::NotCalculated`](crate::CoefficientResult) rather than
/// aborting a whole computation.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[non_exhaustive]
pub enum Error {
    /// Fewer than two coders were supplied.
    #[error("need at least 2 coders (got {found})")]
    InsufficientCoders {
        /// Number of coders actually supplied
        found: usize,
    },

    /// Gold-standard coder index is out of range.
    #[error("gold standard index {index} is out of range for {n_coders} coders")]
    InvalidGoldIndex {
        /// Requested index
        index: usize,
        /// Number of coders available
        n_coders: usize,
    },

    /// The shared text has no positions to compare.
    #[error("text is empty: no positions to compare")]
    EmptyText,

    /// Coder matrices of one computation disagree in shape.
    #[error("coder matrices differ in shape: expected {expected:?}, found {found:?}")]
    ShapeMismatch {
        /// Shape of the first matrix
        expected: (usize, usize),
        /// Shape of the offending matrix
        found: (usize, usize),
    },

    /// Unrecognised level of measurement.
    #[error("Unknown level of measurement: {0}")]
    UnknownLevel(String),

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A report could not be serialised.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Error from the canonical annotation types.
    #[error(transparent)]
    Core(#[from] accord_core::Error),
}

impl Error {
    /// Create an insufficient coders error.
    #[must_use]
    pub fn insufficient_coders(found: usize) -> Self {
        Error::InsufficientCoders { found }
    }

    /// Create an invalid gold index error.
    #[must_use]
    pub fn invalid_gold_index(index: usize, n_coders: usize) -> Self {
        Error::InvalidGoldIndex { index, n_coders }
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }
}

//! Error types for accord-core.

use serde::Serialize;
use thiserror::Error;

/// Result type for accord-core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for accord-core operations.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[non_exhaustive]
pub enum Error {
    /// Span boundaries do not describe a non-empty `[start, end)` range.
    #[error("Invalid span: start {start} must be less than end {end}")]
    InvalidSpan {
        /// Start offset as given
        start: usize,
        /// End offset as given
        end: usize,
    },

    /// A span was attached to an annotation belonging to another coder.
    #[error("Span from coder '{found}' cannot be added to annotation of coder '{expected}'")]
    CoderMismatch {
        /// Coder that owns the annotation
        expected: String,
        /// Coder recorded on the offending span
        found: String,
    },
}

impl Error {
    /// Create an invalid span error.
    #[must_use]
    pub fn invalid_span(start: usize, end: usize) -> Self {
        Self::InvalidSpan { start, end }
    }

    /// Create a coder mismatch error.
    #[must_use]
    pub fn coder_mismatch(expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self::CoderMismatch {
            expected: expected.into(),
            found: found.into(),
        }
    }
}

//! Error types for the fact aligner.

use thiserror::Error;

/// Malformed canonical fact data. The offending record is skipped.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FactError {
    /// Property ids look like `P` followed by digits.
    #[error("invalid property id: {0:?}")]
    InvalidProperty(String),

    /// The statement has no usable value.
    #[error("empty value for property {0}")]
    EmptyValue(String),
}

/// Convenience alias for fact results.
pub type FactResult<T> = Result<T, FactError>;

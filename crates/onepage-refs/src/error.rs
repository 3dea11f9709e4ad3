//! Error types for the reference canonicalizer.

use thiserror::Error;

/// Errors that can occur while canonicalizing a citation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RefError {
    /// The citation carries no field that can identify a source.
    #[error("citation has no usable identifier, title or text")]
    Unresolvable,
}

/// Convenience alias for reference results.
pub type RefResult<T> = Result<T, RefError>;

//! Error types for the translation/embedding boundary.

use std::time::Duration;

use thiserror::Error;

/// A failed call to an external collaborator.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CollaboratorError {
    /// The call did not complete within the per-call timeout.
    #[error("collaborator call timed out after {0:?}")]
    Timeout(Duration),

    /// The service could not be reached or refused the request.
    #[error("collaborator unavailable: {0}")]
    Unavailable(String),

    /// The service answered with something that is not a translation.
    #[error("malformed collaborator response: {0}")]
    Malformed(String),
}

/// Convenience alias for collaborator results.
pub type AlignResult<T> = Result<T, CollaboratorError>;

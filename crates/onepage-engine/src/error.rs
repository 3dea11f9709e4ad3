//! Error types for the engine.

use onepage_ir::{InvariantViolation, IrError};
use onepage_merge::MergeError;
use thiserror::Error;

/// Errors that abort a run.
///
/// Bad articles, bad facts and collaborator failures are recovered inside
/// the run and never surface here.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The configuration is out of range.
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("failed to parse configuration: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("failed to parse snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The assembled IR broke a structural invariant.
    #[error("invariant violation: {0}")]
    Invariant(#[from] InvariantViolation),

    #[error("conflict resolution failed: {0}")]
    Merge(#[from] MergeError),

    #[error("IR error: {0}")]
    Ir(IrError),
}

impl From<IrError> for EngineError {
    fn from(err: IrError) -> Self {
        match err {
            IrError::Invariant(violation) => Self::Invariant(violation),
            other => Self::Ir(other),
        }
    }
}

/// Convenience alias for engine results.
pub type EngineResult<T> = Result<T, EngineError>;

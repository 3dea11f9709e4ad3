//! Error types for the conflict resolver.

use thiserror::Error;

/// Errors that can occur while resolving a cluster.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MergeError {
    /// A cluster with no members reached the resolver.
    #[error("cannot resolve an empty cluster")]
    EmptyCluster,
}

/// Convenience alias for merge results.
pub type MergeResult<T> = Result<T, MergeError>;

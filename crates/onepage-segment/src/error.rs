//! Error types for the segmenter.

use thiserror::Error;

/// Malformed or missing per-language article data.
///
/// These errors exclude a single article from the run; they never abort it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InputError {
    /// A required snapshot field is blank.
    #[error("article snapshot is missing {field}")]
    MissingField {
        /// Name of the blank field.
        field: &'static str,
    },

    /// The article carries no text at all.
    #[error("article {wiki}:{title} has no text")]
    EmptyText { wiki: String, title: String },
}

/// Convenience alias for segmenter results.
pub type SegmentResult<T> = Result<T, InputError>;

//! Error types for the IR assembler.

use thiserror::Error;

/// A structural invariant of the IR does not hold.
///
/// Violations indicate a defect in an earlier stage or a corrupted IR file.
/// They are never recovered from.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    /// A content item cites a reference id missing from the reference map.
    #[error("content item {item} cites unknown reference {reference}")]
    DanglingReference { item: String, reference: String },

    /// A section lists an id missing from the content map.
    #[error("section {section} lists unknown item {item}")]
    DanglingSectionItem { section: String, item: String },

    /// A content item is listed by no section, or by several.
    #[error("content item {item} appears in {count} sections")]
    SectionMembership { item: String, count: usize },

    /// Two sections share a slug.
    #[error("section {0} appears more than once")]
    DuplicateSection(String),

    /// A claim unit belongs to more than one cluster, or twice to one.
    #[error("claim unit {0} belongs to more than one cluster")]
    DuplicateMembership(String),

    /// Two distinct items derived the same id.
    #[error("content id collision on {0}")]
    ContentIdCollision(String),

    /// An id does not match the content it names.
    #[error("id {id} does not match its content (expected {expected})")]
    ContentIdMismatch { id: String, expected: String },

    /// A resolved cluster names a primary or alternate it does not contain.
    #[error("cluster is missing resolved member {0}")]
    MissingMember(String),
}

/// Errors that can occur while assembling, publishing or loading an IR.
#[derive(Debug, Error)]
pub enum IrError {
    #[error(transparent)]
    Invariant(#[from] InvariantViolation),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias for IR results.
pub type IrResult<T> = Result<T, IrError>;

//! Foundation types for onepage.
//!
//! This crate provides the data model shared by every stage of the alignment
//! and merge engine. Every other onepage crate depends on `onepage-types`.
//!
//! # Key Types
//!
//! - [`ContentId`] -- Content-derived identifier (BLAKE3 hash)
//! - [`ClaimId`] / [`ClaimUnit`] -- One sentence-level statement with provenance
//! - [`FactUnit`] / [`FactValue`] -- One structured, property-valued statement
//! - [`CitationMetadata`] / [`ReferenceKey`] / [`ReferenceIdentity`] -- Citations
//! - [`PartialDate`] -- Year, year-month or full date used for recency and qualifiers
//! - [`EntityInfo`] / [`Qid`] -- The entity being merged
//! - [`LanguagePriority`] -- Fixed source-language tie-break order

pub mod citation;
pub mod claim;
pub mod entity;
pub mod error;
pub mod fact;
pub mod id;
pub mod language;
pub mod temporal;

pub use citation::{CitationMetadata, ReferenceIdentity, ReferenceKey};
pub use claim::{ClaimUnit, Provenance, UnitFlags};
pub use entity::{EntityInfo, Qid};
pub use error::TypeError;
pub use fact::{Dataset, FactSource, FactUnit, FactValue, Qualifiers};
pub use id::{ClaimId, ContentId};
pub use language::{LanguagePriority, LanguageRank};
pub use temporal::PartialDate;

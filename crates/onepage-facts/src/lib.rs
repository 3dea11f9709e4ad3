//! Fact aligner for onepage.
//!
//! Merges the structured statements of the canonical knowledge base with the
//! infobox parameters extracted from each language edition. Agreeing values
//! merge their sources; disagreeing values are kept side by side under the
//! same property, so no minority value is silently dropped.
//!
//! # Key Types
//!
//! - [`CanonicalFact`] -- One knowledge-base statement with its references
//! - [`InfoboxRecord`] -- The infobox parameters of one language edition
//! - [`PropertyMap`] -- Infobox parameter alias → property or qualifier
//! - [`FactAligner`] -- Produces the final [`FactUnit`](onepage_types::FactUnit)s

pub mod aligner;
pub mod error;
pub mod input;
pub mod property;
pub mod value;

pub use aligner::FactAligner;
pub use error::{FactError, FactResult};
pub use input::{CanonicalFact, InfoboxRecord, KNOWLEDGE_BASE_LANG};
pub use property::{PropertyMap, PropertyTarget, ValueKind};

//! IR assembler for onepage.
//!
//! Turns resolved clusters, fact units and canonical references into the
//! intermediate representation consumed by renderers. The IR is the only
//! output contract of the engine: every map in it is ordered and every id is
//! content-derived, so the same input always serializes to the same bytes.
//!
//! # Key Types
//!
//! - [`IntermediateRepresentation`] -- Entity, sections, content, references, metadata
//! - [`Assembler`] -- Builds and validates an IR from one run's results
//! - [`SectionTaxonomy`] -- Section order and slug aliases
//! - [`InvariantViolation`] -- A broken structural invariant; always fatal
//! - [`publish`] / [`load`] -- Atomic write and validated read of IR files

pub mod assemble;
pub mod error;
pub mod ids;
pub mod publish;
pub mod schema;
pub mod taxonomy;
mod validate;

pub use assemble::{Assembler, AssemblyInput};
pub use error::{InvariantViolation, IrError, IrResult};
pub use publish::{load, publish};
pub use schema::{
    ClaimEntry, ClaimItem, ContentItem, Counts, FactItem, IntermediateRepresentation, Metadata,
    Section,
};
pub use taxonomy::SectionTaxonomy;

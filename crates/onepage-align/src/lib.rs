//! Cross-lingual clusterer for onepage.
//!
//! Claim units from every language edition are compared through their
//! pivot-language text and partitioned into clusters of equivalent
//! statements. Equivalence is decided pairwise (weighted semantic + lexical
//! similarity behind a token-overlap guard) and closed transitively with a
//! union-find over unit indices.
//!
//! The translation and embedding models live outside the engine, behind the
//! [`Translator`] and [`SimilarityScorer`] capabilities.
//!
//! # Key Types
//!
//! - [`Clusterer`] / [`ClusterConfig`] -- Pairwise decision and partitioning
//! - [`Cluster`] -- A set of equivalent units, sorted by id
//! - [`Translator`] / [`translate_units`] -- Pivot translation with retries and timeouts
//! - [`SimilarityScorer`] -- Optional semantic similarity of two pivot texts

pub mod cluster;
pub mod collaborator;
pub mod error;
pub mod providers;
pub mod tokens;
pub mod translate;
mod unionfind;

pub use cluster::{Cluster, ClusterConfig, Clusterer};
pub use collaborator::{SimilarityScorer, Translation, TranslationRequest, Translator};
pub use error::{AlignResult, CollaboratorError};
pub use providers::{LexicalScorer, PassthroughTranslator, TableEntry, TableTranslator};
pub use tokens::{NumericSignature, TextProfile};
pub use translate::{translate_units, RetryPolicy};

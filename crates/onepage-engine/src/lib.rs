//! Pipeline for onepage.
//!
//! Runs one entity snapshot through every stage of the alignment and merge
//! engine, in a fixed forward order:
//!
//! 1. segmentation of each language edition (parallel)
//! 2. reference canonicalization across all editions and canonical facts
//! 3. pivot translation through the [`Translator`](onepage_align::Translator)
//!    collaborator (retried, with per-call timeouts)
//! 4. cross-lingual clustering and per-cluster conflict resolution (parallel)
//! 5. fact alignment of canonical facts with infobox values
//! 6. IR assembly and invariant validation
//!
//! # Key Types
//!
//! - [`Engine`] -- Runs the pipeline under one [`EngineConfig`]
//! - [`EngineConfig`] -- Pivot, priorities, thresholds, taxonomy, property map, retries
//! - [`EntitySnapshot`] -- Immutable input of one run

pub mod config;
pub mod engine;
pub mod error;
pub mod snapshot;

pub use config::EngineConfig;
pub use engine::Engine;
pub use error::{EngineError, EngineResult};
pub use snapshot::EntitySnapshot;

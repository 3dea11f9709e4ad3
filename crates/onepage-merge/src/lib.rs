//! Conflict resolver for onepage.
//!
//! Every cluster of equivalent claims is reduced to one primary claim and an
//! ordered list of attributed alternates. Nothing is deleted: a claim that
//! loses the comparison stays in the output as an alternate.
//!
//! # Key Types
//!
//! - [`ClaimScore`] -- Lexicographic score of one claim within its cluster
//! - [`ConflictResolver`] -- Scores clusters against the reference registry
//! - [`Resolution`] -- Primary, alternates and [`Sourcing`] status
//! - [`ResolvedCluster`] -- A cluster paired with its resolution

pub mod error;
pub mod resolution;
pub mod resolver;
pub mod score;

pub use error::{MergeError, MergeResult};
pub use resolution::{Resolution, ResolvedCluster, Sourcing};
pub use resolver::ConflictResolver;
pub use score::ClaimScore;

//! Content hashing for onepage.
//!
//! Provides domain-separated BLAKE3 hashing. Every id that appears in the
//! persisted IR (claim units, clusters, facts, references) is derived here
//! from content, never from a run counter, so identical input reproduces
//! identical ids.
//!
//! All hashing wraps the `blake3` crate; there is no custom cryptography.

pub mod hasher;

pub use hasher::ContentHasher;

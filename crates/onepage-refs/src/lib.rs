//! Reference canonicalizer for onepage.
//!
//! Citations from different language editions name the same source in
//! different ways: a DOI in one article, a tracking-laden URL in another, a
//! bare title and date in a third. This crate reduces each citation to a
//! stable [`ReferenceKey`](onepage_types::ReferenceKey) and merges citations
//! sharing a key into one [`ReferenceIdentity`](onepage_types::ReferenceIdentity).
//!
//! # Key Types
//!
//! - [`canonicalize`] -- Pure metadata → key function (DOI > URL > title+date)
//! - [`ReferenceRegistry`] -- Key → identity map with fixed metadata precedence
//! - [`SourcedCitation`] -- A citation together with the language that cited it

pub mod canonical;
pub mod error;
pub mod normalize;
pub mod registry;

pub use canonical::canonicalize;
pub use error::{RefError, RefResult};
pub use normalize::{extract_doi, normalize_title, normalize_url};
pub use registry::{ReferenceRegistry, ResolvedReferences, SourcedCitation};

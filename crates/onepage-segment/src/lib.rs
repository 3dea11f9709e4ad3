//! Segmenter for onepage.
//!
//! Turns the raw wikitext of one language edition into ordered, sentence-level
//! [`ClaimUnit`](onepage_types::ClaimUnit)s. Along the way it collects every
//! citation the article carries (for the reference registry) and the key/value
//! parameters of the first infobox (for the fact aligner).
//!
//! Segmentation never fails on malformed markup. Unbalanced braces, brackets
//! or an unterminated `<ref>` produce a best-effort result in which the
//! affected sentences are flagged `low_confidence`.
//!
//! # Key Types
//!
//! - [`ArticleSnapshot`] -- One fetched article revision
//! - [`SegmentedArticle`] -- Units, citations and infobox parameters of one article
//! - [`segment`] -- The segmentation entry point

pub mod article;
mod cite;
pub mod error;
mod markup;
mod scan;
pub mod segmenter;

pub use article::{ArticleSnapshot, SegmentedArticle};
pub use error::{InputError, SegmentResult};
pub use segmenter::segment;

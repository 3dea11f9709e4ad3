use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::temporal::PartialDate;

/// Raw citation metadata as found in a source article or knowledge-base
/// statement.
///
/// Every field is optional. Field values are kept verbatim for display; the
/// reference canonicalizer derives a [`ReferenceKey`] from normalized copies.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CitationMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doi: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    /// Free text of a citation that carried no structured fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl CitationMetadata {
    fn fields(&self) -> [&Option<String>; 7] {
        [
            &self.doi,
            &self.url,
            &self.title,
            &self.date,
            &self.author,
            &self.publisher,
            &self.text,
        ]
    }

    /// Number of populated (non-blank) fields.
    pub fn completeness(&self) -> usize {
        self.fields()
            .iter()
            .filter(|f| f.as_deref().is_some_and(|v| !v.trim().is_empty()))
            .count()
    }

    /// Returns `true` if no field carries any text.
    pub fn is_empty(&self) -> bool {
        self.completeness() == 0
    }

    /// Fill every missing field from `other`, keeping fields already set.
    pub fn fill_from(&mut self, other: &CitationMetadata) {
        fn fill(slot: &mut Option<String>, from: &Option<String>) {
            let blank = slot.as_deref().map_or(true, |v| v.trim().is_empty());
            if blank && from.as_deref().is_some_and(|v| !v.trim().is_empty()) {
                *slot = from.clone();
            }
        }
        fill(&mut self.doi, &other.doi);
        fill(&mut self.url, &other.url);
        fill(&mut self.title, &other.title);
        fill(&mut self.date, &other.date);
        fill(&mut self.author, &other.author);
        fill(&mut self.publisher, &other.publisher);
        fill(&mut self.text, &other.text);
    }
}

/// Stable key of a canonical citation.
///
/// Keys carry their derivation as a prefix: `doi:<doi>`, `url:<normalized
/// url>`, or `cite:<hash>` for citations identified only by title, date or
/// free text.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReferenceKey(String);

impl ReferenceKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The derivation prefix (`doi`, `url` or `cite`).
    pub fn kind(&self) -> &str {
        self.0.split_once(':').map_or("", |(kind, _)| kind)
    }
}

impl fmt::Debug for ReferenceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ReferenceKey({})", self.0)
    }
}

impl fmt::Display for ReferenceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A canonical citation: one key, the merged display metadata, and the
/// languages whose articles cited it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceIdentity {
    pub key: ReferenceKey,
    pub metadata: CitationMetadata,
    /// Publication date parsed from the merged metadata, used for recency.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<PartialDate>,
    pub languages: BTreeSet<String>,
}

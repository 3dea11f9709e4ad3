//! Key → identity registry.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet};

use onepage_types::{CitationMetadata, LanguagePriority, PartialDate, ReferenceIdentity, ReferenceKey};
use serde::{Deserialize, Serialize};

use crate::canonical::canonicalize;

/// A citation together with the language edition that carried it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourcedCitation {
    pub lang: String,
    pub metadata: CitationMetadata,
}

impl SourcedCitation {
    pub fn new(lang: impl Into<String>, metadata: CitationMetadata) -> Self {
        Self {
            lang: lang.into(),
            metadata,
        }
    }
}

/// Reference keys attached to a unit after resolution.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResolvedReferences {
    /// Resolvable keys, deduplicated, in first-seen order.
    pub keys: Vec<ReferenceKey>,
    /// At least one key was not known to the registry.
    pub pending: bool,
}

/// All canonical references of one merge run.
///
/// Citations sharing a key collapse to a single [`ReferenceIdentity`]. The
/// display metadata comes from the most complete citation (ties broken by
/// language priority, then by the metadata itself), with missing fields
/// filled from the others in the same order. The result is independent of
/// the order citations are supplied in.
#[derive(Clone, Debug, Default)]
pub struct ReferenceRegistry {
    identities: BTreeMap<ReferenceKey, ReferenceIdentity>,
    unresolvable: usize,
}

impl ReferenceRegistry {
    /// Canonicalize and merge a batch of citations.
    pub fn build<I>(citations: I, priority: &LanguagePriority) -> Self
    where
        I: IntoIterator<Item = SourcedCitation>,
    {
        let mut groups: BTreeMap<ReferenceKey, Vec<SourcedCitation>> = BTreeMap::new();
        let mut unresolvable = 0usize;
        for citation in citations {
            match canonicalize(&citation.metadata) {
                Ok(key) => groups.entry(key).or_default().push(citation),
                Err(_) => unresolvable += 1,
            }
        }
        if unresolvable > 0 {
            tracing::debug!(unresolvable, "dropped citations with no usable metadata");
        }

        let identities = groups
            .into_iter()
            .map(|(key, mut group)| {
                group.sort_by(|a, b| {
                    (Reverse(a.metadata.completeness()), priority.rank(&a.lang), &a.metadata).cmp(&(
                        Reverse(b.metadata.completeness()),
                        priority.rank(&b.lang),
                        &b.metadata,
                    ))
                });
                let mut metadata = group[0].metadata.clone();
                for other in &group[1..] {
                    metadata.fill_from(&other.metadata);
                }
                let languages: BTreeSet<String> = group.into_iter().map(|c| c.lang).collect();
                let date = metadata.date.as_deref().and_then(PartialDate::extract);
                let identity = ReferenceIdentity {
                    key: key.clone(),
                    metadata,
                    date,
                    languages,
                };
                (key, identity)
            })
            .collect::<BTreeMap<_, _>>();

        tracing::debug!(references = identities.len(), "reference registry built");
        Self {
            identities,
            unresolvable,
        }
    }

    pub fn get(&self, key: &ReferenceKey) -> Option<&ReferenceIdentity> {
        self.identities.get(key)
    }

    pub fn contains(&self, key: &ReferenceKey) -> bool {
        self.identities.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.identities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.identities.is_empty()
    }

    /// Number of citations that could not be canonicalized.
    pub fn unresolvable(&self) -> usize {
        self.unresolvable
    }

    /// Identities in key order.
    pub fn iter(&self) -> impl Iterator<Item = &ReferenceIdentity> {
        self.identities.values()
    }

    /// Filter a unit's keys down to those the registry knows.
    pub fn resolve(&self, keys: &[ReferenceKey]) -> ResolvedReferences {
        let mut resolved = ResolvedReferences::default();
        for key in keys {
            if !self.contains(key) {
                resolved.pending = true;
            } else if !resolved.keys.contains(key) {
                resolved.keys.push(key.clone());
            }
        }
        resolved
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cite(lang: &str, url: &str, title: Option<&str>, date: Option<&str>) -> SourcedCitation {
        SourcedCitation::new(
            lang,
            CitationMetadata {
                url: Some(url.into()),
                title: title.map(String::from),
                date: date.map(String::from),
                ..Default::default()
            },
        )
    }

    fn priority() -> LanguagePriority {
        LanguagePriority::new(["en", "hi", "de"])
    }

    #[test]
    fn citations_with_same_key_merge() {
        let registry = ReferenceRegistry::build(
            vec![
                cite("en", "https://www.example.com/a?utm_source=x", Some("Story"), None),
                cite("hi", "http://example.com/a/", None, Some("2014-05-26")),
            ],
            &priority(),
        );
        assert_eq!(registry.len(), 1);
        let identity = registry.iter().next().unwrap();
        assert_eq!(identity.key.as_str(), "url:https://example.com/a");
        assert_eq!(identity.languages, BTreeSet::from(["en".to_string(), "hi".to_string()]));
        assert_eq!(identity.metadata.title.as_deref(), Some("Story"));
        assert_eq!(identity.metadata.date.as_deref(), Some("2014-05-26"));
        assert_eq!(identity.date, PartialDate::ymd(2014, 5, 26));
    }

    #[test]
    fn most_complete_citation_wins_then_priority() {
        let citations = vec![
            cite("de", "https://example.com/a", Some("German title"), None),
            cite("en", "https://example.com/a", Some("English title"), None),
            cite("hi", "https://example.com/a", Some("Hindi title"), Some("2014")),
        ];
        let registry = ReferenceRegistry::build(citations, &priority());
        let identity = registry.iter().next().unwrap();
        assert_eq!(identity.metadata.title.as_deref(), Some("Hindi title"));

        let tied = vec![
            cite("de", "https://example.com/a", Some("German title"), None),
            cite("en", "https://example.com/a", Some("English title"), None),
        ];
        let registry = ReferenceRegistry::build(tied, &priority());
        let identity = registry.iter().next().unwrap();
        assert_eq!(identity.metadata.title.as_deref(), Some("English title"));
    }

    #[test]
    fn input_order_does_not_matter() {
        let citations = vec![
            cite("de", "https://example.com/a", Some("A"), None),
            cite("en", "https://example.com/b", Some("B"), Some("2001")),
            cite("hi", "https://example.com/a", Some("C"), Some("2002")),
        ];
        let forward = ReferenceRegistry::build(citations.clone(), &priority());
        let backward = ReferenceRegistry::build(citations.into_iter().rev(), &priority());
        let a: Vec<_> = forward.iter().cloned().collect();
        let b: Vec<_> = backward.iter().cloned().collect();
        assert_eq!(a, b);
    }

    #[test]
    fn unresolvable_citations_are_counted_not_stored() {
        let registry = ReferenceRegistry::build(
            vec![SourcedCitation::new("en", CitationMetadata::default())],
            &priority(),
        );
        assert!(registry.is_empty());
        assert_eq!(registry.unresolvable(), 1);
    }

    #[test]
    fn resolve_dedups_and_flags_unknown_keys() {
        let registry = ReferenceRegistry::build(
            vec![cite("en", "https://example.com/a", None, None)],
            &priority(),
        );
        let known = ReferenceKey::new("url:https://example.com/a");
        let unknown = ReferenceKey::new("url:https://example.com/missing");

        let resolved = registry.resolve(&[known.clone(), known.clone()]);
        assert_eq!(resolved.keys, vec![known.clone()]);
        assert!(!resolved.pending);

        let resolved = registry.resolve(&[unknown, known.clone()]);
        assert_eq!(resolved.keys, vec![known]);
        assert!(resolved.pending);
    }

    #[test]
    fn merged_metadata_recanonicalizes_to_same_key() {
        let registry = ReferenceRegistry::build(
            vec![
                cite("en", "https://example.com/a", Some("T"), None),
                cite("hi", "http://www.example.com/a", None, Some("2020")),
            ],
            &priority(),
        );
        for identity in registry.iter() {
            assert_eq!(canonicalize(&identity.metadata).unwrap(), identity.key);
        }
    }
}

//! Built-in collaborator providers.

use std::cmp::Ordering;
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::collaborator::{SimilarityScorer, Translation, TranslationRequest, Translator};
use crate::error::AlignResult;
use crate::tokens::TextProfile;

/// Returns every text unchanged, without a quality score.
///
/// Suitable when all editions are already written in the pivot language.
#[derive(Clone, Copy, Debug, Default)]
pub struct PassthroughTranslator;

#[async_trait::async_trait]
impl Translator for PassthroughTranslator {
    async fn translate(
        &self,
        _pivot: &str,
        requests: &[TranslationRequest],
    ) -> AlignResult<Vec<Translation>> {
        Ok(requests
            .iter()
            .map(|r| Translation {
                unit: r.unit,
                text: r.text.clone(),
                quality: None,
            })
            .collect())
    }
}

/// One row of a fixed translation table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TableEntry {
    pub lang: String,
    /// Original-language text, matched after whitespace normalization.
    pub source: String,
    /// Pivot-language text.
    pub pivot: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<f64>,
}

/// Looks translations up in a fixed table keyed by language and source text.
///
/// Used for snapshots that carry pre-translated text. Texts missing from the
/// table are omitted from the response.
#[derive(Clone, Debug, Default)]
pub struct TableTranslator {
    table: BTreeMap<(String, String), (String, Option<f64>)>,
}

fn table_key(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Higher quality wins, unscored entries rank lowest, then the larger pivot
/// text. Total, so the table does not depend on insertion order.
fn rank(a: &(String, Option<f64>), b: &(String, Option<f64>)) -> Ordering {
    let quality = match (a.1, b.1) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (x, y) => x.is_some().cmp(&y.is_some()),
    };
    quality.then_with(|| a.0.cmp(&b.0))
}

impl TableTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries<I: IntoIterator<Item = TableEntry>>(entries: I) -> Self {
        let mut translator = Self::new();
        for entry in entries {
            translator.insert(entry);
        }
        translator
    }

    /// Add an entry. Of several entries for the same source text the one
    /// with the highest quality is kept, whatever the insertion order.
    pub fn insert(&mut self, entry: TableEntry) {
        let candidate = (entry.pivot, entry.quality);
        match self.table.entry((entry.lang, table_key(&entry.source))) {
            Entry::Vacant(slot) => {
                slot.insert(candidate);
            }
            Entry::Occupied(mut slot) => {
                if rank(&candidate, slot.get()) == Ordering::Greater {
                    slot.insert(candidate);
                }
            }
        }
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

#[async_trait::async_trait]
impl Translator for TableTranslator {
    async fn translate(
        &self,
        _pivot: &str,
        requests: &[TranslationRequest],
    ) -> AlignResult<Vec<Translation>> {
        Ok(requests
            .iter()
            .filter_map(|r| {
                let (text, quality) = self.table.get(&(r.lang.clone(), table_key(&r.text)))?;
                Some(Translation {
                    unit: r.unit,
                    text: text.clone(),
                    quality: *quality,
                })
            })
            .collect())
    }
}

/// Character-trigram similarity over content tokens.
///
/// A lexical stand-in for an embedding model: tolerant to inflection
/// (`elected` / `elect`) and word order, blind to synonyms.
#[derive(Clone, Copy, Debug, Default)]
pub struct LexicalScorer;

fn trigrams(text: &str) -> BTreeSet<String> {
    TextProfile::of(text)
        .content
        .iter()
        .flat_map(|token| {
            let padded: Vec<char> = format!(" {token} ").chars().collect();
            padded
                .windows(3)
                .map(|w| w.iter().collect::<String>())
                .collect::<Vec<_>>()
        })
        .collect()
}

impl SimilarityScorer for LexicalScorer {
    fn similarity(&self, a: &str, b: &str) -> Option<f64> {
        let (ta, tb) = (trigrams(a), trigrams(b));
        if ta.is_empty() && tb.is_empty() {
            return None;
        }
        let shared = ta.intersection(&tb).count();
        Some(2.0 * shared as f64 / (ta.len() + tb.len()) as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use onepage_types::{ClaimId, ContentId};

    fn request(n: u8, lang: &str, text: &str) -> TranslationRequest {
        TranslationRequest {
            unit: ClaimId::new(ContentId::from_hash([n; 32])),
            lang: lang.into(),
            text: text.into(),
        }
    }

    #[tokio::test]
    async fn passthrough_returns_text_unchanged() {
        let out = PassthroughTranslator
            .translate("en", &[request(1, "en", "X was born in 1950.")])
            .await
            .unwrap();
        assert_eq!(out[0].text, "X was born in 1950.");
        assert_eq!(out[0].quality, None);
    }

    #[tokio::test]
    async fn table_omits_unknown_texts() {
        let table = TableTranslator::from_entries([TableEntry {
            lang: "hi".into(),
            source: "एक्स का जन्म  1950 में हुआ।".into(),
            pivot: "X was born in 1950.".into(),
            quality: Some(0.92),
        }]);
        let out = table
            .translate(
                "en",
                &[
                    request(1, "hi", "एक्स का जन्म 1950 में हुआ।"),
                    request(2, "hi", "अज्ञात वाक्य।"),
                    request(3, "de", "एक्स का जन्म 1950 में हुआ।"),
                ],
            )
            .await
            .unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].unit, request(1, "hi", "").unit);
        assert_eq!(out[0].quality, Some(0.92));
    }

    #[tokio::test]
    async fn duplicate_entries_resolve_the_same_in_any_order() {
        let entry = |pivot: &str, quality: Option<f64>| TableEntry {
            lang: "hi".into(),
            source: "एक्स एक राजनेता हैं।".into(),
            pivot: pivot.into(),
            quality,
        };
        let entries = [
            entry("X is a politician.", Some(0.9)),
            entry("X is a statesman.", Some(0.6)),
            entry("X is a leader.", None),
            entry("X is a politician!", Some(0.9)),
        ];
        let forward = TableTranslator::from_entries(entries.clone());
        let backward = TableTranslator::from_entries(entries.into_iter().rev());
        assert_eq!(forward.len(), 1);

        let requests = [request(1, "hi", "एक्स एक राजनेता हैं।")];
        let a = forward.translate("en", &requests).await.unwrap();
        let b = backward.translate("en", &requests).await.unwrap();
        assert_eq!(a, b);
        assert_eq!(a[0].text, "X is a politician.");
        assert_eq!(a[0].quality, Some(0.9));
    }

    #[test]
    fn lexical_scorer_ranks_paraphrases_above_unrelated() {
        let s = LexicalScorer;
        let same = s.similarity("X was elected in 2014.", "X was elected in 2014").unwrap();
        let inflected = s.similarity("X was elected in 2014.", "X elect 2014").unwrap();
        let unrelated = s.similarity("X was elected in 2014.", "The river floods every spring.").unwrap();
        assert_eq!(same, 1.0);
        assert!(inflected > unrelated);
        assert!(inflected < 1.0);
        assert_eq!(s.similarity("the of", "a an"), None);
    }
}

use std::collections::BTreeMap;

use onepage_refs::SourcedCitation;
use onepage_types::{ClaimUnit, Provenance};
use serde::{Deserialize, Serialize};

use crate::error::{InputError, SegmentResult};

/// One fetched revision of one language edition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleSnapshot {
    /// Source wiki, e.g. `enwiki`.
    pub wiki: String,
    /// Language tag, e.g. `en`.
    pub lang: String,
    pub title: String,
    pub rev_id: u64,
    /// Raw wikitext.
    pub text: String,
}

impl ArticleSnapshot {
    pub fn provenance(&self) -> Provenance {
        Provenance {
            wiki: self.wiki.clone(),
            title: self.title.clone(),
            rev_id: self.rev_id,
        }
    }

    /// Check that the snapshot can be segmented at all.
    pub fn validate(&self) -> SegmentResult<()> {
        for (field, value) in [("wiki", &self.wiki), ("lang", &self.lang), ("title", &self.title)] {
            if value.trim().is_empty() {
                return Err(InputError::MissingField { field });
            }
        }
        if self.text.trim().is_empty() {
            return Err(InputError::EmptyText {
                wiki: self.wiki.clone(),
                title: self.title.clone(),
            });
        }
        Ok(())
    }
}

/// The segmenter's output for one article.
#[derive(Clone, Debug, PartialEq)]
pub struct SegmentedArticle {
    pub provenance: Provenance,
    pub lang: String,
    /// Claim units in document order.
    pub units: Vec<ClaimUnit>,
    /// Every citation encountered, in document order. Named refs appear once.
    pub citations: Vec<SourcedCitation>,
    /// Parameters of the first infobox, keyed by normalized parameter name.
    pub infobox: BTreeMap<String, String>,
}

impl SegmentedArticle {
    /// Number of units flagged low-confidence by segmentation.
    pub fn low_confidence_count(&self) -> usize {
        self.units.iter().filter(|u| u.flags.low_confidence).count()
    }
}

use std::path::Path;

use onepage_align::TableEntry;
use onepage_facts::CanonicalFact;
use onepage_segment::ArticleSnapshot;
use onepage_types::EntityInfo;
use serde::{Deserialize, Serialize};

use crate::error::EngineResult;

/// Everything fetched for one entity: the immutable input of a run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EntitySnapshot {
    pub entity: EntityInfo,
    #[serde(default)]
    pub articles: Vec<ArticleSnapshot>,
    /// Statements of the canonical knowledge base.
    #[serde(default)]
    pub facts: Vec<CanonicalFact>,
    /// Pivot-language text fetched alongside the articles, if any.
    #[serde(default)]
    pub translations: Vec<TableEntry>,
}

impl EntitySnapshot {
    pub fn from_json(json: &str) -> EngineResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> EngineResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Distinct language tags of the articles, sorted.
    pub fn languages(&self) -> Vec<String> {
        let mut langs: Vec<String> = self.articles.iter().map(|a| a.lang.clone()).collect();
        langs.sort();
        langs.dedup();
        langs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_snapshot_parses() {
        let snapshot = EntitySnapshot::from_json(r#"{"entity": {"qid": "Q1058"}}"#).unwrap();
        assert_eq!(snapshot.entity.qid.as_str(), "Q1058");
        assert!(snapshot.articles.is_empty());
        assert!(snapshot.languages().is_empty());
    }

    #[test]
    fn full_snapshot_parses() {
        let json = r#"{
            "entity": {"qid": "Q1058", "labels": {"en": "X", "hi": "एक्स"}},
            "articles": [
                {"wiki": "hiwiki", "lang": "hi", "title": "एक्स", "rev_id": 9, "text": "एक्स एक राजनेता हैं।"},
                {"wiki": "enwiki", "lang": "en", "title": "X", "rev_id": 7, "text": "X is a politician."}
            ],
            "facts": [
                {"property": "P106", "value": {"kind": "entity", "qid": "Q82955", "label": "politician"}}
            ],
            "translations": [
                {"lang": "hi", "source": "एक्स एक राजनेता हैं।", "pivot": "X is a politician.", "quality": 0.9}
            ]
        }"#;
        let snapshot = EntitySnapshot::from_json(json).unwrap();
        assert_eq!(snapshot.languages(), vec!["en", "hi"]);
        assert_eq!(snapshot.facts.len(), 1);
        assert_eq!(snapshot.translations[0].quality, Some(0.9));
    }

    #[test]
    fn bad_qid_is_rejected() {
        assert!(EntitySnapshot::from_json(r#"{"entity": {"qid": "X1"}}"#).is_err());
    }
}

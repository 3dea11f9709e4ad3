use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::citation::ReferenceKey;
use crate::temporal::PartialDate;

/// Qualifier mapping: qualifier property id → normalized value
/// (e.g. `P580` → `2014-05-26`).
pub type Qualifiers = BTreeMap<String, String>;

/// The value of a structured statement.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FactValue {
    /// Free text (typically an infobox value that could not be typed).
    Text { value: String },
    /// Reference to another entity, with its label when known.
    Entity {
        qid: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        label: Option<String>,
    },
    /// A numeric amount, kept as its decimal string.
    Quantity {
        amount: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        unit: Option<String>,
    },
    /// A point in time.
    Time { value: PartialDate },
}

impl FactValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text {
            value: value.into(),
        }
    }

    /// Stable string form used for ordering and content ids.
    pub fn canonical_string(&self) -> String {
        match self {
            Self::Text { value } => format!("text:{}", value.trim()),
            Self::Entity { qid, .. } => format!("entity:{qid}"),
            Self::Quantity { amount, unit } => {
                format!("quantity:{}:{}", amount.trim_start_matches('+'), unit.as_deref().unwrap_or(""))
            }
            Self::Time { value } => format!("time:{value}"),
        }
    }
}

/// Dataset a fact was read from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dataset {
    /// The canonical knowledge base.
    Wikidata,
    /// An infobox in one language edition.
    Infobox,
}

/// Attribution of a [`FactUnit`] to one origin.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FactSource {
    pub dataset: Dataset,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wiki: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rev_id: Option<u64>,
    /// The date the origin asserted the value ("as of").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub as_of: Option<PartialDate>,
}

impl FactSource {
    pub fn wikidata(as_of: Option<PartialDate>) -> Self {
        Self {
            dataset: Dataset::Wikidata,
            wiki: None,
            rev_id: None,
            as_of,
        }
    }

    pub fn infobox(wiki: impl Into<String>, rev_id: u64, as_of: Option<PartialDate>) -> Self {
        Self {
            dataset: Dataset::Infobox,
            wiki: Some(wiki.into()),
            rev_id: Some(rev_id),
            as_of,
        }
    }
}

/// One structured, property-valued statement about the entity.
///
/// Produced once by the fact aligner. Several `FactUnit`s may share a
/// property id when sources disagree; none of them is discarded.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactUnit {
    /// Canonical property id, e.g. `P39`.
    pub property: String,
    pub value: FactValue,
    #[serde(default)]
    pub qualifiers: Qualifiers,
    /// Sorted, deduplicated origins.
    pub sources: Vec<FactSource>,
    /// Sorted, deduplicated reference keys.
    #[serde(default)]
    pub references: Vec<ReferenceKey>,
}

impl FactUnit {
    /// Returns `true` if any origin is the canonical knowledge base.
    pub fn is_canonical(&self) -> bool {
        self.sources.iter().any(|s| s.dataset == Dataset::Wikidata)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_serializes_with_kind_tag() {
        let v = FactValue::Entity {
            qid: "Q11696".into(),
            label: Some("Prime Minister of India".into()),
        };
        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(json["kind"], "entity");
        assert_eq!(json["qid"], "Q11696");
    }

    #[test]
    fn canonical_string_ignores_quantity_sign() {
        let a = FactValue::Quantity {
            amount: "+42".into(),
            unit: None,
        };
        let b = FactValue::Quantity {
            amount: "42".into(),
            unit: None,
        };
        assert_eq!(a.canonical_string(), b.canonical_string());
    }

    #[test]
    fn canonical_flag_follows_sources() {
        let fact = FactUnit {
            property: "P39".into(),
            value: FactValue::text("x"),
            qualifiers: Qualifiers::new(),
            sources: vec![FactSource::infobox("hiwiki", 1, None)],
            references: vec![],
        };
        assert!(!fact.is_canonical());
    }

    #[test]
    fn sources_order_wikidata_first() {
        let mut sources = vec![
            FactSource::infobox("enwiki", 3, None),
            FactSource::wikidata(None),
        ];
        sources.sort();
        assert_eq!(sources[0].dataset, Dataset::Wikidata);
    }
}

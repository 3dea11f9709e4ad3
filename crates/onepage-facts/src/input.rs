use std::collections::BTreeMap;

use onepage_refs::SourcedCitation;
use onepage_types::{CitationMetadata, FactValue, PartialDate, Provenance, Qualifiers};
use serde::{Deserialize, Serialize};

use crate::error::{FactError, FactResult};

/// Language tag recorded for citations of the canonical knowledge base,
/// which belongs to no single language edition.
pub const KNOWLEDGE_BASE_LANG: &str = "mul";

pub(crate) fn is_property_id(id: &str) -> bool {
    id.strip_prefix('P')
        .is_some_and(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
}

/// One statement from the canonical knowledge base.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalFact {
    pub property: String,
    pub value: FactValue,
    #[serde(default)]
    pub qualifiers: Qualifiers,
    #[serde(default)]
    pub references: Vec<CitationMetadata>,
    /// When the knowledge base last asserted the value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub as_of: Option<PartialDate>,
}

impl CanonicalFact {
    pub fn validate(&self) -> FactResult<()> {
        if !is_property_id(&self.property) {
            return Err(FactError::InvalidProperty(self.property.clone()));
        }
        if let Some(bad) = self.qualifiers.keys().find(|k| !is_property_id(k)) {
            return Err(FactError::InvalidProperty(bad.clone()));
        }
        let empty = match &self.value {
            FactValue::Text { value } => value.trim().is_empty(),
            FactValue::Entity { qid, label } => {
                qid.trim().is_empty() && label.as_deref().map_or(true, |l| l.trim().is_empty())
            }
            FactValue::Quantity { amount, .. } => amount.trim().is_empty(),
            FactValue::Time { .. } => false,
        };
        if empty {
            return Err(FactError::EmptyValue(self.property.clone()));
        }
        Ok(())
    }

    /// The statement's references, ready for the reference registry.
    pub fn citations(&self) -> impl Iterator<Item = SourcedCitation> + '_ {
        self.references
            .iter()
            .map(|meta| SourcedCitation::new(KNOWLEDGE_BASE_LANG, meta.clone()))
    }
}

/// The infobox parameters of one language edition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfoboxRecord {
    pub provenance: Provenance,
    pub lang: String,
    pub params: BTreeMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fact(property: &str, value: FactValue) -> CanonicalFact {
        CanonicalFact {
            property: property.into(),
            value,
            qualifiers: Qualifiers::new(),
            references: vec![],
            as_of: None,
        }
    }

    #[test]
    fn property_ids_are_checked() {
        assert!(fact("P39", FactValue::text("x")).validate().is_ok());
        assert_eq!(
            fact("position", FactValue::text("x")).validate(),
            Err(FactError::InvalidProperty("position".into()))
        );
        let mut f = fact("P39", FactValue::text("x"));
        f.qualifiers.insert("start".into(), "2014".into());
        assert!(f.validate().is_err());
    }

    #[test]
    fn blank_values_are_rejected() {
        assert_eq!(
            fact("P106", FactValue::text("  ")).validate(),
            Err(FactError::EmptyValue("P106".into()))
        );
    }

    #[test]
    fn deserializes_from_json() {
        let json = r#"{
            "property": "P39",
            "value": {"kind": "entity", "qid": "Q11696", "label": "Prime Minister of India"},
            "qualifiers": {"P580": "2014-05-26"},
            "references": [{"url": "https://example.gov.in/pm"}]
        }"#;
        let f: CanonicalFact = serde_json::from_str(json).unwrap();
        assert!(f.validate().is_ok());
        let cites: Vec<_> = f.citations().collect();
        assert_eq!(cites[0].lang, KNOWLEDGE_BASE_LANG);
    }
}

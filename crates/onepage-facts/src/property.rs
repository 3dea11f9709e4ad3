//! Infobox parameter names → knowledge-base properties.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// How an infobox value is typed before comparison.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    Time,
    Entity,
    Quantity,
    #[default]
    Text,
}

/// Where one infobox parameter lands.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyTarget {
    /// Main property id, e.g. `P39`.
    pub property: String,
    /// Qualifier id when the parameter qualifies `property` rather than
    /// giving its value, e.g. `P580` (start time) of `P39`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qualifier: Option<String>,
    #[serde(default)]
    pub kind: ValueKind,
}

impl PropertyTarget {
    pub fn value(property: &str, kind: ValueKind) -> Self {
        Self {
            property: property.to_string(),
            qualifier: None,
            kind,
        }
    }

    pub fn qualifier(property: &str, qualifier: &str, kind: ValueKind) -> Self {
        Self {
            property: property.to_string(),
            qualifier: Some(qualifier.to_string()),
            kind,
        }
    }
}

/// Parameter alias → target. Aliases are matched case-insensitively with
/// spaces and hyphens read as underscores.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyMap(BTreeMap<String, PropertyTarget>);

fn alias_key(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .split(|c: char| c.is_whitespace() || c == '-' || c == '_')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}

impl PropertyMap {
    /// An empty map.
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn insert(&mut self, alias: &str, target: PropertyTarget) {
        self.0.insert(alias_key(alias), target);
    }

    pub fn lookup(&self, param: &str) -> Option<&PropertyTarget> {
        self.0.get(&alias_key(param))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn with(mut self, aliases: &[&str], target: PropertyTarget) -> Self {
        for alias in aliases {
            self.insert(alias, target.clone());
        }
        self
    }
}

impl Default for PropertyMap {
    /// Common biography infobox parameters in English and Hindi.
    fn default() -> Self {
        use ValueKind::*;
        Self::new()
            .with(&["birth_date", "born", "birth", "जन्म_तारीख", "जन्म"], PropertyTarget::value("P569", Time))
            .with(&["birth_place", "birthplace", "जन्म_स्थान"], PropertyTarget::value("P19", Entity))
            .with(&["death_date", "died", "death", "मृत्यु_तारीख", "मृत्यु"], PropertyTarget::value("P570", Time))
            .with(&["death_place", "deathplace", "मृत्यु_स्थान"], PropertyTarget::value("P20", Entity))
            .with(&["occupation", "profession", "व्यवसाय"], PropertyTarget::value("P106", Entity))
            .with(&["spouse", "partner", "पत्नी", "जीवनसाथी"], PropertyTarget::value("P26", Entity))
            .with(&["children", "बच्चे"], PropertyTarget::value("P1971", Quantity))
            .with(&["party", "political_party", "राजनीतिक_दल"], PropertyTarget::value("P102", Entity))
            .with(&["nationality", "राष्ट्रीयता"], PropertyTarget::value("P27", Entity))
            .with(&["alma_mater", "education", "शिक्षा"], PropertyTarget::value("P69", Entity))
            .with(&["residence", "home_town", "निवास"], PropertyTarget::value("P551", Entity))
            .with(&["office", "पद"], PropertyTarget::value("P39", Entity))
            .with(
                &["term_start", "took_office", "कार्यकाल_शुरुआत", "कार्यकाल_आरम्भ"],
                PropertyTarget::qualifier("P39", "P580", Time),
            )
            .with(
                &["term_end", "left_office", "कार्यकाल_समाप्ति"],
                PropertyTarget::qualifier("P39", "P582", Time),
            )
            .with(&["predecessor", "पूर्ववर्ती"], PropertyTarget::qualifier("P39", "P1365", Entity))
            .with(&["successor", "उत्तराधिकारी"], PropertyTarget::qualifier("P39", "P1366", Entity))
    }
}

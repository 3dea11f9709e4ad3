use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::TypeError;

/// Canonical identifier of a knowledge-base entity (`Q` followed by digits).
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Qid(String);

impl Qid {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Qid {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let normalized = s.to_ascii_uppercase();
        let valid = normalized
            .strip_prefix('Q')
            .is_some_and(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()));
        if valid {
            Ok(Self(normalized))
        } else {
            Err(TypeError::InvalidQid(s.to_string()))
        }
    }
}

impl fmt::Debug for Qid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Qid({})", self.0)
    }
}

impl fmt::Display for Qid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for Qid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Qid {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// The entity whose language editions are being merged.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityInfo {
    pub qid: Qid,
    /// Language code → label.
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    /// Language code → short description.
    #[serde(default)]
    pub descriptions: BTreeMap<String, String>,
}

impl EntityInfo {
    pub fn new(qid: Qid) -> Self {
        Self {
            qid,
            labels: BTreeMap::new(),
            descriptions: BTreeMap::new(),
        }
    }

    /// Label in `lang`, falling back to the alphabetically first label.
    pub fn label(&self, lang: &str) -> Option<&str> {
        self.labels
            .get(lang)
            .or_else(|| self.labels.values().next())
            .map(String::as_str)
    }
}

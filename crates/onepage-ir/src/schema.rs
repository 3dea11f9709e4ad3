//! The persisted IR schema.

use std::collections::BTreeMap;

use onepage_merge::Sourcing;
use onepage_types::{
    ClaimId, ClaimUnit, EntityInfo, FactSource, FactValue, Qualifiers, ReferenceIdentity, UnitFlags,
};
use serde::{Deserialize, Serialize};

use crate::error::IrResult;

/// The merged article of one entity.
///
/// Serialized as a JSON object with the keys `entity`, `sections`,
/// `content`, `references` and `metadata`. Content and reference maps are
/// keyed by content-derived ids (`c…` claims, `f…` facts, `r…` references).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IntermediateRepresentation {
    pub entity: EntityInfo,
    pub sections: Vec<Section>,
    pub content: BTreeMap<String, ContentItem>,
    pub references: BTreeMap<String, ReferenceIdentity>,
    pub metadata: Metadata,
}

/// A named, ordered list of content item ids.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub slug: String,
    pub items: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentItem {
    Claim(ClaimItem),
    Fact(FactItem),
}

impl ContentItem {
    /// Reference ids cited anywhere in the item.
    pub fn reference_ids(&self) -> Box<dyn Iterator<Item = &String> + '_> {
        match self {
            Self::Claim(claim) => Box::new(claim.entries().flat_map(|e| e.references.iter())),
            Self::Fact(fact) => Box::new(fact.references.iter()),
        }
    }
}

/// One resolved cluster of equivalent claims.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClaimItem {
    pub sourcing: Sourcing,
    pub primary: ClaimEntry,
    /// Remaining cluster members, best first.
    #[serde(default)]
    pub alternates: Vec<ClaimEntry>,
}

impl ClaimItem {
    /// Primary first, then alternates.
    pub fn entries(&self) -> impl Iterator<Item = &ClaimEntry> {
        std::iter::once(&self.primary).chain(self.alternates.iter())
    }

    pub fn member_ids(&self) -> Vec<ClaimId> {
        let mut ids: Vec<ClaimId> = self.entries().map(|e| e.id).collect();
        ids.sort();
        ids
    }
}

/// One claim unit as published, with its attribution.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClaimEntry {
    pub id: ClaimId,
    pub lang: String,
    pub wiki: String,
    pub title: String,
    pub rev_id: u64,
    /// Section slug in the source article, before taxonomy mapping.
    pub section: String,
    pub position: u32,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pivot_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<f64>,
    /// Reference ids, in source order.
    #[serde(default)]
    pub references: Vec<String>,
    #[serde(default)]
    pub flags: UnitFlags,
}

impl ClaimEntry {
    pub(crate) fn from_unit(unit: &ClaimUnit, references: Vec<String>, source_pending: bool) -> Self {
        let mut flags = unit.flags;
        flags.source_pending |= source_pending;
        Self {
            id: unit.id,
            lang: unit.lang.clone(),
            wiki: unit.provenance.wiki.clone(),
            title: unit.provenance.title.clone(),
            rev_id: unit.provenance.rev_id,
            section: unit.section.clone(),
            position: unit.position,
            text: unit.text.clone(),
            pivot_text: unit.pivot_text.clone(),
            quality: unit.quality,
            references,
            flags,
        }
    }
}

/// One structured statement.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactItem {
    pub property: String,
    pub value: FactValue,
    #[serde(default)]
    pub qualifiers: Qualifiers,
    pub sources: Vec<FactSource>,
    #[serde(default)]
    pub references: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub engine_version: String,
    pub pivot: String,
    /// Languages processed, in priority order.
    pub languages: Vec<String>,
    pub counts: Counts,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counts {
    pub claims: usize,
    pub clusters: usize,
    /// Clusters with at least one alternate.
    pub contested: usize,
    pub unsourced: usize,
    pub low_confidence: usize,
    pub source_pending: usize,
    pub facts: usize,
    pub references: usize,
}

impl IntermediateRepresentation {
    /// Parse an IR from JSON. Invariants are not checked; call
    /// [`validate`](Self::validate) on untrusted input.
    pub fn from_json(json: &str) -> IrResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_pretty(&self) -> IrResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn section(&self, slug: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.slug == slug)
    }

    pub fn claims(&self) -> impl Iterator<Item = (&String, &ClaimItem)> {
        self.content.iter().filter_map(|(id, item)| match item {
            ContentItem::Claim(claim) => Some((id, claim)),
            ContentItem::Fact(_) => None,
        })
    }

    pub fn facts(&self) -> impl Iterator<Item = (&String, &FactItem)> {
        self.content.iter().filter_map(|(id, item)| match item {
            ContentItem::Fact(fact) => Some((id, fact)),
            ContentItem::Claim(_) => None,
        })
    }
}

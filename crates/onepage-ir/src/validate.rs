use std::collections::{BTreeMap, BTreeSet};

use crate::error::InvariantViolation;
use crate::ids::{claim_item_id, fact_item_id, reference_id};
use crate::schema::{ContentItem, IntermediateRepresentation};

impl IntermediateRepresentation {
    /// Check every structural invariant. Returns the first violation found,
    /// in a fixed check order.
    ///
    /// - every section item and cited reference resolves
    /// - every content item sits in exactly one section
    /// - every claim unit belongs to exactly one cluster
    /// - every id matches the content it names
    pub fn validate(&self) -> Result<(), InvariantViolation> {
        let mut placements: BTreeMap<&str, usize> = BTreeMap::new();
        let mut slugs = BTreeSet::new();
        for section in &self.sections {
            if !slugs.insert(section.slug.as_str()) {
                return Err(InvariantViolation::DuplicateSection(section.slug.clone()));
            }
            for item in &section.items {
                if !self.content.contains_key(item) {
                    return Err(InvariantViolation::DanglingSectionItem {
                        section: section.slug.clone(),
                        item: item.clone(),
                    });
                }
                *placements.entry(item.as_str()).or_default() += 1;
            }
        }

        let mut members = BTreeSet::new();
        for (id, item) in &self.content {
            let count = placements.get(id.as_str()).copied().unwrap_or(0);
            if count != 1 {
                return Err(InvariantViolation::SectionMembership {
                    item: id.clone(),
                    count,
                });
            }
            if let Some(reference) = item.reference_ids().find(|r| !self.references.contains_key(*r)) {
                return Err(InvariantViolation::DanglingReference {
                    item: id.clone(),
                    reference: reference.clone(),
                });
            }

            let expected = match item {
                ContentItem::Claim(claim) => {
                    for entry in claim.entries() {
                        if !members.insert(entry.id) {
                            return Err(InvariantViolation::DuplicateMembership(entry.id.short_id()));
                        }
                    }
                    claim_item_id(&claim.member_ids())
                }
                ContentItem::Fact(fact) => {
                    fact_item_id(&fact.property, &fact.value, &fact.qualifiers, &fact.sources)
                }
            };
            if *id != expected {
                return Err(InvariantViolation::ContentIdMismatch {
                    id: id.clone(),
                    expected,
                });
            }
        }

        for (id, identity) in &self.references {
            let expected = reference_id(&identity.key);
            if *id != expected {
                return Err(InvariantViolation::ContentIdMismatch {
                    id: id.clone(),
                    expected,
                });
            }
        }
        Ok(())
    }
}

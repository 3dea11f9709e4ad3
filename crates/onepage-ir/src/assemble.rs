use std::collections::{BTreeMap, BTreeSet};

use onepage_merge::{ResolvedCluster, Sourcing};
use onepage_refs::ReferenceRegistry;
use onepage_types::{ClaimId, EntityInfo, FactUnit, LanguagePriority, LanguageRank, ReferenceIdentity, ReferenceKey};

use crate::error::{InvariantViolation, IrResult};
use crate::ids::{claim_item_id, fact_item_id, reference_id};
use crate::schema::{
    ClaimEntry, ClaimItem, ContentItem, Counts, FactItem, IntermediateRepresentation, Metadata,
    Section,
};
use crate::taxonomy::SectionTaxonomy;

/// Everything one run hands to the assembler.
pub struct AssemblyInput<'a> {
    pub entity: EntityInfo,
    pub clusters: Vec<ResolvedCluster>,
    pub facts: Vec<FactUnit>,
    pub registry: &'a ReferenceRegistry,
    /// Languages that contributed at least one article.
    pub languages: Vec<String>,
}

/// Position of an item within its section. Facts precede claims when a
/// section holds both.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum ItemOrder {
    Fact { property: String, value: String, id: String },
    Claim { rank: LanguageRank, position: u32, id: ClaimId },
}

/// Builds the IR of one run and checks its invariants.
pub struct Assembler<'a> {
    taxonomy: &'a SectionTaxonomy,
    priority: &'a LanguagePriority,
    pivot: &'a str,
}

/// Reference keys resolved to ids, collecting the identities actually used.
struct ReferenceTable<'a> {
    registry: &'a ReferenceRegistry,
    used: BTreeMap<String, ReferenceIdentity>,
}

impl<'a> ReferenceTable<'a> {
    /// Ids of the known keys, deduplicated in order, and whether any key
    /// was unknown.
    fn resolve(&mut self, keys: &[ReferenceKey]) -> IrResult<(Vec<String>, bool)> {
        let resolved = self.registry.resolve(keys);
        let mut ids = Vec::with_capacity(resolved.keys.len());
        for key in resolved.keys {
            let Some(identity) = self.registry.get(&key) else {
                continue;
            };
            let id = reference_id(&key);
            match self.used.get(&id) {
                Some(existing) if existing.key != key => {
                    return Err(InvariantViolation::ContentIdCollision(id).into());
                }
                Some(_) => {}
                None => {
                    self.used.insert(id.clone(), identity.clone());
                }
            }
            ids.push(id);
        }
        Ok((ids, resolved.pending))
    }
}

impl<'a> Assembler<'a> {
    pub fn new(taxonomy: &'a SectionTaxonomy, priority: &'a LanguagePriority, pivot: &'a str) -> Self {
        Self {
            taxonomy,
            priority,
            pivot,
        }
    }

    pub fn assemble(&self, input: AssemblyInput<'_>) -> IrResult<IntermediateRepresentation> {
        let mut references = ReferenceTable {
            registry: input.registry,
            used: BTreeMap::new(),
        };
        let mut content: BTreeMap<String, ContentItem> = BTreeMap::new();
        let mut placed: BTreeMap<String, Vec<(ItemOrder, String)>> = BTreeMap::new();
        let mut counts = Counts::default();

        for resolved in &input.clusters {
            let cluster = &resolved.cluster;
            let mut entries = Vec::with_capacity(cluster.len());
            for id in resolved.resolution.ranked() {
                let unit = cluster
                    .get(id)
                    .ok_or_else(|| InvariantViolation::MissingMember(id.short_id()))?;
                let (refs, pending) = references.resolve(&unit.references)?;
                let entry = ClaimEntry::from_unit(unit, refs, pending);
                counts.low_confidence += usize::from(entry.flags.low_confidence);
                counts.source_pending += usize::from(entry.flags.source_pending);
                entries.push(entry);
            }
            if entries.len() != cluster.len() {
                return Err(InvariantViolation::MissingMember(claim_item_id(&cluster.member_ids())).into());
            }

            let mut entries = entries.into_iter();
            let Some(primary) = entries.next() else {
                continue;
            };
            let id = claim_item_id(&cluster.member_ids());
            let section = self.taxonomy.canonical(&primary.section).to_string();
            let order = ItemOrder::Claim {
                rank: self.priority.rank(&primary.lang),
                position: primary.position,
                id: primary.id,
            };

            counts.claims += cluster.len();
            counts.clusters += 1;
            counts.contested += usize::from(cluster.len() > 1);
            counts.unsourced += usize::from(resolved.resolution.sourcing == Sourcing::Unsourced);

            let item = ContentItem::Claim(ClaimItem {
                sourcing: resolved.resolution.sourcing,
                primary,
                alternates: entries.collect(),
            });
            if content.insert(id.clone(), item).is_some() {
                return Err(InvariantViolation::ContentIdCollision(id).into());
            }
            placed.entry(section).or_default().push((order, id));
        }

        for fact in &input.facts {
            let (refs, _) = references.resolve(&fact.references)?;
            let id = fact_item_id(&fact.property, &fact.value, &fact.qualifiers, &fact.sources);
            let order = ItemOrder::Fact {
                property: fact.property.clone(),
                value: fact.value.canonical_string(),
                id: id.clone(),
            };
            let item = ContentItem::Fact(FactItem {
                property: fact.property.clone(),
                value: fact.value.clone(),
                qualifiers: fact.qualifiers.clone(),
                sources: fact.sources.clone(),
                references: refs,
            });
            if content.insert(id.clone(), item).is_some() {
                return Err(InvariantViolation::ContentIdCollision(id).into());
            }
            counts.facts += 1;
            placed
                .entry(self.taxonomy.fact_section.clone())
                .or_default()
                .push((order, id));
        }

        let slugs: BTreeSet<String> = placed.keys().cloned().collect();
        let sections: Vec<Section> = self
            .taxonomy
            .arrange(&slugs)
            .into_iter()
            .map(|slug| {
                let mut items = placed.remove(&slug).unwrap_or_default();
                items.sort();
                Section {
                    slug,
                    items: items.into_iter().map(|(_, id)| id).collect(),
                }
            })
            .collect();

        counts.references = references.used.len();
        let mut languages: Vec<String> = input
            .languages
            .into_iter()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        languages.sort_by_key(|lang| self.priority.rank(lang));

        let ir = IntermediateRepresentation {
            entity: input.entity,
            sections,
            content,
            references: references.used,
            metadata: Metadata {
                engine_version: env!("CARGO_PKG_VERSION").to_string(),
                pivot: self.pivot.to_string(),
                languages,
                counts,
            },
        };
        ir.validate()?;
        tracing::debug!(
            sections = ir.sections.len(),
            items = ir.content.len(),
            references = ir.references.len(),
            "IR assembled"
        );
        Ok(ir)
    }
}

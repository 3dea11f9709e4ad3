use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};

use onepage_refs::canonicalize;
use onepage_types::{FactSource, FactUnit, FactValue, Qualifiers, ReferenceKey};

use crate::input::{CanonicalFact, InfoboxRecord};
use crate::property::PropertyMap;
use crate::value::{
    merge_qualifiers, normalize_all, normalize_qualifier, normalize_qualifiers, qualifiers_agree,
    values_agree,
};

/// A fact unit under construction.
struct Draft {
    property: String,
    value: FactValue,
    qualifiers: Qualifiers,
    sources: BTreeSet<FactSource>,
    references: BTreeSet<ReferenceKey>,
}

impl Draft {
    fn accepts(&self, statement: &Statement) -> bool {
        self.property == statement.property
            && values_agree(&self.value, &statement.value)
            && qualifiers_agree(&self.qualifiers, &statement.qualifiers)
    }

    fn absorb(&mut self, statement: Statement) {
        merge_qualifiers(&mut self.qualifiers, &statement.qualifiers);
        self.sources.insert(statement.source);
    }

    fn into_unit(self) -> FactUnit {
        FactUnit {
            property: self.property,
            value: self.value,
            qualifiers: self.qualifiers,
            sources: self.sources.into_iter().collect(),
            references: self.references.into_iter().collect(),
        }
    }
}

/// Drop formatting noise that does not change the value: surrounding
/// whitespace in text, a leading `+` on amounts, an empty unit.
fn tidy(value: &FactValue) -> FactValue {
    match value {
        FactValue::Text { value } => FactValue::text(value.trim()),
        FactValue::Quantity { amount, unit } => FactValue::Quantity {
            amount: amount.trim_start_matches('+').to_string(),
            unit: unit.clone().filter(|u| !u.is_empty()),
        },
        other => other.clone(),
    }
}

/// Duplicate entity statements keep the smallest label.
fn merge_label(into: &mut FactValue, from: &FactValue) {
    if let (FactValue::Entity { label, .. }, FactValue::Entity { label: Some(other), .. }) = (into, from) {
        if label.as_ref().map_or(true, |current| other < current) {
            *label = Some(other.clone());
        }
    }
}

/// One typed statement read from an infobox.
struct Statement {
    property: String,
    value: FactValue,
    qualifiers: Qualifiers,
    source: FactSource,
}

#[derive(Default)]
struct ParamGroup {
    values: Vec<FactValue>,
    qualifiers: Qualifiers,
}

/// Merges canonical facts with infobox values.
///
/// Canonical statements are ground truth. An infobox statement that agrees
/// with one (same normalized value, no conflicting qualifier) only adds its
/// source and any missing qualifiers. A disagreeing infobox statement is kept
/// as its own [`FactUnit`] under the same property, merged with agreeing
/// statements from other languages.
pub struct FactAligner<'a> {
    properties: &'a PropertyMap,
}

impl<'a> FactAligner<'a> {
    pub fn new(properties: &'a PropertyMap) -> Self {
        Self { properties }
    }

    /// Produce the final fact units, sorted by property, value, qualifiers
    /// and sources. Input order does not affect the result.
    pub fn align(&self, canonical: &[CanonicalFact], infoboxes: &[InfoboxRecord]) -> Vec<FactUnit> {
        let mut drafts = self.canonical_drafts(canonical);
        let canonical_count = drafts.len();

        let mut records: Vec<&InfoboxRecord> = infoboxes.iter().collect();
        records.sort_by(|a, b| {
            (&a.provenance.wiki, a.provenance.rev_id, &a.lang, &a.params)
                .cmp(&(&b.provenance.wiki, b.provenance.rev_id, &b.lang, &b.params))
        });

        let mut divergent = 0usize;
        for record in records {
            for statement in self.statements(record, &drafts[..canonical_count]) {
                let target = drafts[..canonical_count]
                    .iter()
                    .position(|d| d.accepts(&statement))
                    .or_else(|| {
                        drafts[canonical_count..]
                            .iter()
                            .position(|d| d.accepts(&statement))
                            .map(|i| i + canonical_count)
                    });
                match target {
                    Some(i) => drafts[i].absorb(statement),
                    None => {
                        divergent += 1;
                        drafts.push(Draft {
                            property: statement.property,
                            value: statement.value,
                            qualifiers: statement.qualifiers,
                            sources: BTreeSet::from([statement.source]),
                            references: BTreeSet::new(),
                        });
                    }
                }
            }
        }

        let mut units: Vec<FactUnit> = drafts.into_iter().map(Draft::into_unit).collect();
        units.sort_by(|a, b| {
            (&a.property, a.value.canonical_string(), &a.qualifiers, &a.sources).cmp(&(
                &b.property,
                b.value.canonical_string(),
                &b.qualifiers,
                &b.sources,
            ))
        });
        tracing::debug!(
            canonical = canonical_count,
            divergent,
            total = units.len(),
            "facts aligned"
        );
        units
    }

    /// One draft per distinct `(property, value, qualifiers)`, keyed the way
    /// fact ids are derived so two drafts can never share an id. Drafts come
    /// out in key order, independent of input order.
    fn canonical_drafts(&self, facts: &[CanonicalFact]) -> Vec<Draft> {
        let mut drafts: BTreeMap<(String, String, Qualifiers), Draft> = BTreeMap::new();
        for fact in facts {
            if let Err(e) = fact.validate() {
                tracing::warn!(property = %fact.property, error = %e, "canonical fact skipped");
                continue;
            }
            let value = tidy(&fact.value);
            let qualifiers = normalize_qualifiers(&fact.qualifiers);
            let references = fact
                .references
                .iter()
                .filter_map(|meta| canonicalize(meta).ok());
            let source = FactSource::wikidata(fact.as_of);

            let key = (fact.property.clone(), value.canonical_string(), qualifiers.clone());
            match drafts.entry(key) {
                Entry::Occupied(mut slot) => {
                    let draft = slot.get_mut();
                    merge_label(&mut draft.value, &value);
                    draft.sources.insert(source);
                    draft.references.extend(references);
                }
                Entry::Vacant(slot) => {
                    slot.insert(Draft {
                        property: fact.property.clone(),
                        value,
                        qualifiers,
                        sources: BTreeSet::from([source]),
                        references: references.collect(),
                    });
                }
            }
        }
        drafts.into_values().collect()
    }

    fn statements(&self, record: &InfoboxRecord, canonical: &[Draft]) -> Vec<Statement> {
        let mut groups: BTreeMap<String, ParamGroup> = BTreeMap::new();
        for (param, raw) in &record.params {
            let Some(target) = self.properties.lookup(param) else {
                tracing::debug!(wiki = %record.provenance.wiki, %param, "unmapped infobox parameter");
                continue;
            };
            let group = groups.entry(target.property.clone()).or_default();
            match &target.qualifier {
                Some(qualifier) => {
                    if let Some(value) = normalize_qualifier(raw, target.kind) {
                        group.qualifiers.entry(qualifier.clone()).or_insert(value);
                    }
                }
                None => group.values.extend(normalize_all(raw, target.kind)),
            }
        }

        let source = FactSource::infobox(&record.provenance.wiki, record.provenance.rev_id, None);
        let mut out = Vec::new();
        for (property, group) in groups {
            if !group.values.is_empty() {
                for value in group.values {
                    out.push(Statement {
                        property: property.clone(),
                        value,
                        qualifiers: group.qualifiers.clone(),
                        source: source.clone(),
                    });
                }
                continue;
            }
            if group.qualifiers.is_empty() {
                continue;
            }
            // Qualifiers without a value attach to the canonical statement
            // only when it is unambiguous.
            let mut candidates = canonical.iter().filter(|d| d.property == property);
            match (candidates.next(), candidates.next()) {
                (Some(only), None) => out.push(Statement {
                    property,
                    value: only.value.clone(),
                    qualifiers: group.qualifiers,
                    source: source.clone(),
                }),
                _ => tracing::debug!(
                    wiki = %record.provenance.wiki,
                    %property,
                    "qualifiers without a value skipped"
                ),
            }
        }
        out
    }
}

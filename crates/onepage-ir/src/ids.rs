//! Content-derived ids of IR items.
//!
//! Every id is a one-letter kind prefix followed by the short hex of a
//! domain-separated hash. Unchanged input reproduces identical ids.

use onepage_crypto::ContentHasher;
use onepage_types::{ClaimId, Dataset, FactSource, FactValue, Qualifiers, ReferenceKey};

pub const CLAIM_PREFIX: char = 'c';
pub const FACT_PREFIX: char = 'f';
pub const REFERENCE_PREFIX: char = 'r';

/// Id of a claim cluster, over its member ids in sorted order.
pub fn claim_item_id(members: &[ClaimId]) -> String {
    let mut sorted = members.to_vec();
    sorted.sort();
    let fields: Vec<String> = sorted.iter().map(|id| id.content_id().to_hex()).collect();
    format!("{CLAIM_PREFIX}{}", ContentHasher::CLUSTER.hash_fields(&fields).short_hex())
}

fn source_field(source: &FactSource) -> String {
    let dataset = match source.dataset {
        Dataset::Wikidata => "wikidata",
        Dataset::Infobox => "infobox",
    };
    format!(
        "{dataset}|{}|{}|{}",
        source.wiki.as_deref().unwrap_or(""),
        source.rev_id.map(|r| r.to_string()).unwrap_or_default(),
        source.as_of.map(|d| d.to_string()).unwrap_or_default(),
    )
}

/// Id of a fact, over property, value, qualifiers and sources.
pub fn fact_item_id(
    property: &str,
    value: &FactValue,
    qualifiers: &Qualifiers,
    sources: &[FactSource],
) -> String {
    let mut fields = vec![property.to_string(), value.canonical_string()];
    fields.extend(qualifiers.iter().map(|(k, v)| format!("{k}={v}")));
    fields.push(String::new());
    let mut sources: Vec<String> = sources.iter().map(source_field).collect();
    sources.sort();
    fields.extend(sources);
    format!("{FACT_PREFIX}{}", ContentHasher::FACT.hash_fields(&fields).short_hex())
}

/// Id of a reference identity, over its key.
pub fn reference_id(key: &ReferenceKey) -> String {
    format!(
        "{REFERENCE_PREFIX}{}",
        ContentHasher::REFERENCE.hash_fields(&[key.as_str()]).short_hex()
    )
}

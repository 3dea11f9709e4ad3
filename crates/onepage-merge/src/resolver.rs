use std::collections::BTreeSet;

use onepage_align::{Cluster, NumericSignature};
use onepage_refs::ReferenceRegistry;
use onepage_types::{ClaimUnit, LanguagePriority};
use rayon::prelude::*;

use crate::error::{MergeError, MergeResult};
use crate::resolution::{Resolution, ResolvedCluster, Sourcing};
use crate::score::ClaimScore;

/// Scores the members of each cluster and picks a primary.
///
/// The resolver only reads: the registry, the priority list and the
/// clusters are shared by every worker thread.
pub struct ConflictResolver<'a> {
    registry: &'a ReferenceRegistry,
    priority: &'a LanguagePriority,
}

impl<'a> ConflictResolver<'a> {
    pub fn new(registry: &'a ReferenceRegistry, priority: &'a LanguagePriority) -> Self {
        Self { registry, priority }
    }

    /// Score one member of `cluster`.
    pub fn score(&self, cluster: &Cluster, unit: &ClaimUnit) -> ClaimScore {
        let identities: Vec<_> = unit
            .references
            .iter()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .filter_map(|key| self.registry.get(key))
            .collect();
        let latest = identities.iter().filter_map(|identity| identity.date).max();

        let signature = signature_of(unit);
        let concordance = cluster
            .members()
            .iter()
            .filter(|other| signature.compatible(&signature_of(other)))
            .map(|other| other.lang.as_str())
            .collect::<BTreeSet<_>>()
            .len();

        ClaimScore {
            references: identities.len(),
            latest,
            concordance,
            rank: self.priority.rank(&unit.lang),
            id: unit.id,
        }
    }

    /// Rank the members of one cluster.
    pub fn resolve(&self, cluster: &Cluster) -> MergeResult<Resolution> {
        let mut scores: Vec<ClaimScore> = cluster
            .members()
            .iter()
            .map(|unit| self.score(cluster, unit))
            .collect();
        scores.sort_by(|a, b| b.cmp(a));

        let mut ranked = scores.into_iter();
        let best = ranked.next().ok_or(MergeError::EmptyCluster)?;
        // References are scored first, so a primary without one means no
        // member has one.
        let sourcing = if best.references > 0 {
            Sourcing::Sourced
        } else {
            Sourcing::Unsourced
        };
        Ok(Resolution {
            primary: best.id,
            alternates: ranked.map(|s| s.id).collect(),
            sourcing,
        })
    }

    /// Resolve every cluster in parallel. Output order follows input order.
    pub fn resolve_all(&self, clusters: Vec<Cluster>) -> MergeResult<Vec<ResolvedCluster>> {
        let resolved: Vec<ResolvedCluster> = clusters
            .into_par_iter()
            .map(|cluster| {
                self.resolve(&cluster)
                    .map(|resolution| ResolvedCluster { cluster, resolution })
            })
            .collect::<MergeResult<_>>()?;

        let unsourced = resolved
            .iter()
            .filter(|r| r.resolution.sourcing == Sourcing::Unsourced)
            .count();
        let contested = resolved.iter().filter(|r| !r.resolution.alternates.is_empty()).count();
        tracing::debug!(clusters = resolved.len(), contested, unsourced, "clusters resolved");
        Ok(resolved)
    }
}

fn signature_of(unit: &ClaimUnit) -> NumericSignature {
    NumericSignature::of(unit.comparison_text().unwrap_or(&unit.text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use onepage_crypto::ContentHasher;
    use onepage_refs::{canonicalize, SourcedCitation};
    use onepage_types::{CitationMetadata, ClaimId, Provenance, ReferenceKey, UnitFlags};
    use proptest::prelude::*;

    fn citation(n: usize, year: i32) -> CitationMetadata {
        CitationMetadata {
            url: Some(format!("https://news.example/{n}")),
            date: Some(format!("{year}-06-01")),
            ..Default::default()
        }
    }

    fn key(meta: &CitationMetadata) -> ReferenceKey {
        canonicalize(meta).unwrap()
    }

    fn unit(lang: &str, text: &str, refs: &[&CitationMetadata]) -> ClaimUnit {
        ClaimUnit {
            id: ClaimId::new(ContentHasher::CLAIM.hash_fields(&[lang, text])),
            provenance: Provenance {
                wiki: format!("{lang}wiki"),
                title: "X".into(),
                rev_id: 1,
            },
            lang: lang.into(),
            section: "lead".into(),
            position: 0,
            text: text.into(),
            pivot_text: Some(text.into()),
            quality: None,
            references: refs.iter().map(|m| key(m)).collect(),
            flags: UnitFlags::default(),
        }
    }

    fn registry(citations: &[&CitationMetadata]) -> ReferenceRegistry {
        ReferenceRegistry::build(
            citations.iter().map(|m| SourcedCitation::new("en", (*m).clone())),
            &LanguagePriority::default(),
        )
    }

    #[test]
    fn better_sourced_claim_becomes_primary() {
        let (r1, r2, r3) = (citation(1, 2020), citation(2, 2022), citation(3, 2023));
        let registry = registry(&[&r1, &r2, &r3]);
        let priority = LanguagePriority::new(["l1", "l2"]);
        let l1 = unit("l1", "X was born in 1950", &[&r1]);
        let l2 = unit("l2", "X born 1950", &[&r2, &r3]);
        let cluster = Cluster::new(vec![l1.clone(), l2.clone()]);

        let resolution = ConflictResolver::new(&registry, &priority)
            .resolve(&cluster)
            .unwrap();
        assert_eq!(resolution.primary, l2.id);
        assert_eq!(resolution.alternates, vec![l1.id]);
        assert_eq!(resolution.sourcing, Sourcing::Sourced);
    }

    #[test]
    fn recency_breaks_reference_ties() {
        let (old, new) = (citation(1, 1999), citation(2, 2021));
        let registry = registry(&[&old, &new]);
        let priority = LanguagePriority::new(["en", "de"]);
        let en = unit("en", "X won the award", &[&old]);
        let de = unit("de", "X gewann den Preis", &[&new]);
        let resolution = ConflictResolver::new(&registry, &priority)
            .resolve(&Cluster::new(vec![en, de.clone()]))
            .unwrap();
        assert_eq!(resolution.primary, de.id);
    }

    #[test]
    fn unknown_keys_do_not_count() {
        let known = citation(1, 2020);
        let registry = registry(&[&known]);
        let priority = LanguagePriority::new(["en", "hi"]);
        let hi = unit("hi", "a", &[&citation(8, 2024), &citation(9, 2024)]);
        let en = unit("en", "b", &[&known]);
        let resolution = ConflictResolver::new(&registry, &priority)
            .resolve(&Cluster::new(vec![hi, en.clone()]))
            .unwrap();
        assert_eq!(resolution.primary, en.id);
    }

    #[test]
    fn unreferenced_cluster_is_marked_unsourced() {
        let registry = ReferenceRegistry::default();
        let priority = LanguagePriority::new(["hi", "en"]);
        let en = unit("en", "X is a politician", &[]);
        let hi = unit("hi", "X एक राजनेता हैं", &[]);
        let resolution = ConflictResolver::new(&registry, &priority)
            .resolve(&Cluster::new(vec![en.clone(), hi.clone()]))
            .unwrap();
        assert_eq!(resolution.sourcing, Sourcing::Unsourced);
        assert_eq!(resolution.primary, hi.id);
        assert_eq!(resolution.alternates, vec![en.id]);
    }

    #[test]
    fn concordance_counts_languages_with_matching_numbers() {
        let registry = ReferenceRegistry::default();
        let priority = LanguagePriority::new(["fr", "en", "de"]);
        let en = unit("en", "X was born in 1950", &[]);
        let de = unit("de", "X was born 1950", &[]);
        let fr = unit("fr", "X was born in 1951", &[]);
        let cluster = Cluster::new(vec![en.clone(), de, fr]);
        let resolver = ConflictResolver::new(&registry, &priority);
        assert_eq!(resolver.score(&cluster, &en).concordance, 2);
        assert_eq!(resolver.resolve(&cluster).unwrap().primary, en.id);
    }

    #[test]
    fn resolve_all_keeps_order() {
        let registry = ReferenceRegistry::default();
        let priority = LanguagePriority::default();
        let clusters: Vec<Cluster> = (0..20)
            .map(|i| Cluster::new(vec![unit("en", &format!("claim {i}"), &[])]))
            .collect();
        let expected: Vec<ClaimId> = clusters.iter().filter_map(|c| c.first_id()).collect();
        let resolved = ConflictResolver::new(&registry, &priority)
            .resolve_all(clusters)
            .unwrap();
        let primaries: Vec<ClaimId> = resolved.iter().map(|r| r.resolution.primary).collect();
        assert_eq!(primaries, expected);
    }

    #[test]
    fn empty_cluster_is_an_error() {
        let registry = ReferenceRegistry::default();
        let priority = LanguagePriority::default();
        assert_eq!(
            ConflictResolver::new(&registry, &priority).resolve(&Cluster::new(vec![])),
            Err(MergeError::EmptyCluster)
        );
    }

    proptest! {
        #[test]
        fn adding_a_dated_reference_never_lowers_a_claim(
            years in proptest::collection::vec(1990i32..2025, 0..4),
            rival_refs in 0usize..4,
            extra_year in 1990i32..2025,
        ) {
            let mine: Vec<CitationMetadata> =
                years.iter().enumerate().map(|(i, y)| citation(i, *y)).collect();
            let extra = citation(100, extra_year);
            let rival: Vec<CitationMetadata> = (0..rival_refs).map(|i| citation(200 + i, 2000)).collect();

            let all: Vec<&CitationMetadata> =
                mine.iter().chain(rival.iter()).chain(std::iter::once(&extra)).collect();
            let registry = registry(&all);
            let priority = LanguagePriority::new(["en", "de"]);

            let before = unit("de", "X was born in 1950", &mine.iter().collect::<Vec<_>>());
            let mut after = before.clone();
            after.references.push(key(&extra));
            let other = unit("en", "X born 1950", &rival.iter().collect::<Vec<_>>());

            let resolver = ConflictResolver::new(&registry, &priority);
            let cluster_before = Cluster::new(vec![before.clone(), other.clone()]);
            let cluster_after = Cluster::new(vec![after.clone(), other.clone()]);
            let score_before = resolver.score(&cluster_before, &before);
            let score_after = resolver.score(&cluster_after, &after);
            let rival_score = resolver.score(&cluster_after, &other);

            prop_assert!(score_after > score_before);
            if rival_score.references < score_after.references {
                prop_assert!(score_after > rival_score);
                prop_assert_eq!(resolver.resolve(&cluster_after).unwrap().primary, after.id);
            }
        }
    }
}

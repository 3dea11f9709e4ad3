//! Partitioning of claim units into clusters of equivalent statements.

use std::collections::BTreeMap;

use onepage_types::{ClaimId, ClaimUnit};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::collaborator::SimilarityScorer;
use crate::tokens::TextProfile;
use crate::unionfind::UnionFind;

/// Clustering thresholds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    /// Minimum combined similarity for two units to join.
    pub threshold: f64,
    /// Weight of the semantic score in the combined similarity.
    pub semantic_weight: f64,
    /// Minimum content-token Jaccard overlap, checked regardless of the
    /// combined score.
    pub min_lexical_overlap: f64,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            threshold: 0.75,
            semantic_weight: 0.7,
            min_lexical_overlap: 0.2,
        }
    }
}

/// A set of units judged equivalent. Members are sorted by id.
#[derive(Clone, Debug, PartialEq)]
pub struct Cluster {
    members: Vec<ClaimUnit>,
}

impl Cluster {
    /// Build a cluster from at least one unit.
    pub fn new(mut members: Vec<ClaimUnit>) -> Self {
        members.sort_by_key(|u| u.id);
        Self { members }
    }

    pub fn members(&self) -> &[ClaimUnit] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Smallest member id; clusters are emitted in this order.
    pub fn first_id(&self) -> Option<ClaimId> {
        self.members.first().map(|u| u.id)
    }

    pub fn member_ids(&self) -> Vec<ClaimId> {
        self.members.iter().map(|u| u.id).collect()
    }

    pub fn get(&self, id: &ClaimId) -> Option<&ClaimUnit> {
        self.members
            .binary_search_by_key(id, |u| u.id)
            .ok()
            .map(|i| &self.members[i])
    }
}

/// Decides pairwise equivalence and partitions units.
pub struct Clusterer<'a> {
    config: &'a ClusterConfig,
    scorer: &'a dyn SimilarityScorer,
}

impl<'a> Clusterer<'a> {
    pub fn new(config: &'a ClusterConfig, scorer: &'a dyn SimilarityScorer) -> Self {
        Self { config, scorer }
    }

    /// Weighted similarity of two pivot texts: semantic and lexical when the
    /// scorer answers, lexical alone when it does not.
    pub fn combined_similarity(&self, a: &str, b: &str, lexical: f64) -> f64 {
        match self.scorer.similarity(a, b) {
            Some(semantic) => {
                let w = self.config.semantic_weight.clamp(0.0, 1.0);
                w * semantic.clamp(0.0, 1.0) + (1.0 - w) * lexical
            }
            None => lexical,
        }
    }

    fn joins(&self, a: (&str, &TextProfile), b: (&str, &TextProfile)) -> bool {
        let lexical = a.1.overlap(b.1);
        if lexical < self.config.min_lexical_overlap || !a.1.numbers.compatible(&b.1.numbers) {
            return false;
        }
        self.combined_similarity(a.0, b.0, lexical) >= self.config.threshold
    }

    /// Whether two units would be joined directly (before transitive closure).
    /// Units without pivot text never join.
    pub fn equivalent(&self, a: &ClaimUnit, b: &ClaimUnit) -> bool {
        match (a.comparison_text(), b.comparison_text()) {
            (Some(ta), Some(tb)) => {
                self.joins((ta, &TextProfile::of(ta)), (tb, &TextProfile::of(tb)))
            }
            _ => false,
        }
    }

    /// Partition units into clusters.
    ///
    /// Every unit lands in exactly one cluster; units without pivot text are
    /// singletons. Pairs are decided independently and closed transitively,
    /// so the partition does not depend on input order. Clusters come out
    /// ordered by their smallest member id.
    pub fn cluster(&self, mut units: Vec<ClaimUnit>) -> Vec<Cluster> {
        units.sort_by_key(|u| u.id);
        let n = units.len();

        let mut edges: Vec<(usize, usize)> = {
            let profiles: Vec<Option<(&str, TextProfile)>> = units
                .par_iter()
                .map(|u| u.comparison_text().map(|t| (t, TextProfile::of(t))))
                .collect();
            (0..n)
                .into_par_iter()
                .flat_map_iter(|i| {
                    let profiles = &profiles;
                    (i + 1..n).filter_map(move |j| {
                        let (ta, pa) = profiles[i].as_ref()?;
                        let (tb, pb) = profiles[j].as_ref()?;
                        self.joins((*ta, pa), (*tb, pb)).then_some((i, j))
                    })
                })
                .collect()
        };
        edges.sort_unstable();

        let mut uf = UnionFind::new(n);
        let merges = edges.iter().filter(|(i, j)| uf.union(*i, *j)).count();

        let mut groups: BTreeMap<usize, Vec<ClaimUnit>> = BTreeMap::new();
        for (index, unit) in units.into_iter().enumerate() {
            groups.entry(uf.find(index)).or_default().push(unit);
        }
        let clusters: Vec<Cluster> = groups.into_values().map(Cluster::new).collect();

        tracing::debug!(
            units = n,
            edges = edges.len(),
            merges,
            clusters = clusters.len(),
            "units clustered"
        );
        clusters
    }
}

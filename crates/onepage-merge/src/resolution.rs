use onepage_align::Cluster;
use onepage_types::{ClaimId, ClaimUnit};
use serde::{Deserialize, Serialize};

/// Whether a resolved cluster has any backing reference.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sourcing {
    /// The primary claim carries at least one resolvable reference.
    Sourced,
    /// No claim in the cluster carries a resolvable reference.
    Unsourced,
}

/// The outcome of resolving one cluster.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub primary: ClaimId,
    /// The remaining members, best first.
    pub alternates: Vec<ClaimId>,
    pub sourcing: Sourcing,
}

impl Resolution {
    /// Every member id, primary first.
    pub fn ranked(&self) -> impl Iterator<Item = &ClaimId> {
        std::iter::once(&self.primary).chain(self.alternates.iter())
    }
}

/// A cluster together with its resolution.
#[derive(Clone, Debug)]
pub struct ResolvedCluster {
    pub cluster: Cluster,
    pub resolution: Resolution,
}

impl ResolvedCluster {
    pub fn primary(&self) -> Option<&ClaimUnit> {
        self.cluster.get(&self.resolution.primary)
    }
}

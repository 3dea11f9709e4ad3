use std::cmp::Ordering;

use onepage_types::{ClaimId, LanguageRank, PartialDate};

/// The score of one claim within its cluster.
///
/// Compared lexicographically, greater is better:
///
/// 1. distinct resolvable references backing the claim (more wins)
/// 2. date of the most recent of those references (undated loses)
/// 3. cluster languages whose claims agree with this one's numbers
/// 4. source-language priority (earlier wins)
/// 5. claim id (smaller wins), making the order total
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClaimScore {
    pub references: usize,
    pub latest: Option<PartialDate>,
    pub concordance: usize,
    pub rank: LanguageRank,
    pub id: ClaimId,
}

impl Ord for ClaimScore {
    fn cmp(&self, other: &Self) -> Ordering {
        self.references
            .cmp(&other.references)
            .then_with(|| self.latest.cmp(&other.latest))
            .then_with(|| self.concordance.cmp(&other.concordance))
            .then_with(|| other.rank.cmp(&self.rank))
            .then_with(|| other.id.cmp(&self.id))
    }
}

impl PartialOrd for ClaimScore {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

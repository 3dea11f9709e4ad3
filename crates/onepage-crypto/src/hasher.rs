use onepage_types::ContentId;

/// Domain-separated BLAKE3 content hasher.
///
/// Each hasher carries a domain tag (e.g., `"onepage-claim-v1"`,
/// `"onepage-fact-v1"`) that is prepended to every hash computation. A claim
/// and a fact with identical bytes therefore produce different ids.
pub struct ContentHasher {
    domain: &'static str,
}

impl ContentHasher {
    /// Hasher for claim units.
    pub const CLAIM: Self = Self {
        domain: "onepage-claim-v1",
    };
    /// Hasher for claim clusters (over sorted member ids).
    pub const CLUSTER: Self = Self {
        domain: "onepage-cluster-v1",
    };
    /// Hasher for fact units.
    pub const FACT: Self = Self {
        domain: "onepage-fact-v1",
    };
    /// Hasher for reference identities (over the reference key).
    pub const REFERENCE: Self = Self {
        domain: "onepage-ref-v1",
    };
    /// Hasher for citations known only by title, date or free text.
    pub const CITATION: Self = Self {
        domain: "onepage-cite-v1",
    };

    /// Hash an ordered list of text fields.
    ///
    /// Each field is length-prefixed, so `["ab", "c"]` and `["a", "bc"]`
    /// hash differently.
    pub fn hash_fields<S: AsRef<str>>(&self, fields: &[S]) -> ContentId {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.domain.as_bytes());
        hasher.update(b":");
        for field in fields {
            let bytes = field.as_ref().as_bytes();
            hasher.update(&(bytes.len() as u64).to_le_bytes());
            hasher.update(bytes);
        }
        ContentId::from_hash(*hasher.finalize().as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_deterministic() {
        let fields = ["enwiki", "100", "lead", "0", "X was born in 1950."];
        assert_eq!(
            ContentHasher::CLAIM.hash_fields(&fields),
            ContentHasher::CLAIM.hash_fields(&fields)
        );
    }

    #[test]
    fn different_domains_produce_different_hashes() {
        let data = ["same content"];
        let claim = ContentHasher::CLAIM.hash_fields(&data);
        let fact = ContentHasher::FACT.hash_fields(&data);
        let reference = ContentHasher::REFERENCE.hash_fields(&data);
        assert_ne!(claim, fact);
        assert_ne!(claim, reference);
        assert_ne!(fact, reference);
    }

    #[test]
    fn field_boundaries_matter() {
        let a = ContentHasher::CLAIM.hash_fields(&["ab", "c"]);
        let b = ContentHasher::CLAIM.hash_fields(&["a", "bc"]);
        assert_ne!(a, b);
    }
}

use std::path::Path;

use onepage_align::{ClusterConfig, RetryPolicy};
use onepage_facts::PropertyMap;
use onepage_ir::SectionTaxonomy;
use onepage_types::LanguagePriority;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Immutable configuration of one engine.
///
/// Every key is optional in TOML; missing keys take their defaults. A
/// `[properties]` table replaces the built-in property map as a whole.
///
/// ```toml
/// pivot = "en"
/// priority = ["en", "hi", "de"]
///
/// [clustering]
/// threshold = 0.8
///
/// [retry]
/// max_attempts = 5
/// timeout_ms = 2000
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Language all content is translated into for comparison.
    pub pivot: String,
    /// Source-language tie-break order.
    pub priority: LanguagePriority,
    pub clustering: ClusterConfig,
    pub retry: RetryPolicy,
    pub taxonomy: SectionTaxonomy,
    pub properties: PropertyMap,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            pivot: "en".to_string(),
            priority: LanguagePriority::new(["en", "hi"]),
            clustering: ClusterConfig::default(),
            retry: RetryPolicy::default(),
            taxonomy: SectionTaxonomy::default(),
            properties: PropertyMap::default(),
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(s: &str) -> EngineResult<Self> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> EngineResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Check value ranges.
    pub fn validate(&self) -> EngineResult<()> {
        let invalid = |msg: String| Err(EngineError::Config(msg));
        if self.pivot.trim().is_empty() {
            return invalid("pivot language must not be empty".into());
        }
        let c = &self.clustering;
        if !(c.threshold > 0.0 && c.threshold <= 1.0) {
            return invalid(format!("clustering.threshold {} not in (0, 1]", c.threshold));
        }
        if !(0.0..=1.0).contains(&c.semantic_weight) {
            return invalid(format!("clustering.semantic_weight {} not in [0, 1]", c.semantic_weight));
        }
        if !(0.0..=1.0).contains(&c.min_lexical_overlap) {
            return invalid(format!(
                "clustering.min_lexical_overlap {} not in [0, 1]",
                c.min_lexical_overlap
            ));
        }
        if self.retry.max_attempts == 0 {
            return invalid("retry.max_attempts must be at least 1".into());
        }
        if self.retry.timeout_ms == 0 {
            return invalid("retry.timeout_ms must be positive".into());
        }
        if self.taxonomy.fact_section.trim().is_empty() {
            return invalid("taxonomy.fact_section must not be empty".into());
        }
        Ok(())
    }

    /// The priority list in effect. An empty list ranks the pivot first and
    /// every other language alphabetically.
    pub fn language_priority(&self) -> LanguagePriority {
        if self.priority.languages().is_empty() {
            LanguagePriority::new([self.pivot.as_str()])
        } else {
            self.priority.clone()
        }
    }
}

//! The translation/embedding capability boundary.

use onepage_types::ClaimId;
use serde::{Deserialize, Serialize};

use crate::error::AlignResult;

/// One unit to translate.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationRequest {
    pub unit: ClaimId,
    /// Source-language tag.
    pub lang: String,
    pub text: String,
}

/// The collaborator's answer for one unit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Translation {
    pub unit: ClaimId,
    /// Pivot-language text.
    pub text: String,
    /// Quality score in `[0, 1]`, if the service reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<f64>,
}

/// Translates unit text into the pivot language.
///
/// A response may omit requests it cannot translate; those units are treated
/// as having no translation available. An `Err` means the whole call failed
/// and may be retried.
#[async_trait::async_trait]
pub trait Translator: Send + Sync {
    async fn translate(
        &self,
        pivot: &str,
        requests: &[TranslationRequest],
    ) -> AlignResult<Vec<Translation>>;
}

/// Semantic similarity of two pivot-language texts.
///
/// Returns a score in `[0, 1]`, or `None` when no semantic model is
/// available, in which case clustering relies on lexical overlap alone.
pub trait SimilarityScorer: Send + Sync {
    fn similarity(&self, a: &str, b: &str) -> Option<f64>;
}

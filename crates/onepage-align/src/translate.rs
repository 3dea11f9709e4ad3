//! Pivot translation of claim units with retries and per-call timeouts.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use onepage_types::{ClaimId, ClaimUnit};
use serde::{Deserialize, Serialize};

use crate::collaborator::{Translation, TranslationRequest, Translator};
use crate::error::{AlignResult, CollaboratorError};

/// How collaborator calls are retried.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total attempts per call, including the first.
    pub max_attempts: u32,
    /// Timeout of a single attempt, in milliseconds.
    pub timeout_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            timeout_ms: 10_000,
        }
    }
}

impl RetryPolicy {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

async fn call_with_retries(
    translator: &dyn Translator,
    pivot: &str,
    requests: &[TranslationRequest],
    policy: &RetryPolicy,
) -> AlignResult<Vec<Translation>> {
    let attempts = policy.max_attempts.max(1);
    let mut last_error = CollaboratorError::Unavailable("no attempt made".into());
    for attempt in 1..=attempts {
        match tokio::time::timeout(policy.timeout(), translator.translate(pivot, requests)).await {
            Ok(Ok(translations)) => return Ok(translations),
            Ok(Err(e)) => {
                tracing::warn!(attempt, attempts, error = %e, "translation attempt failed");
                last_error = e;
            }
            Err(_) => {
                tracing::warn!(attempt, attempts, "translation attempt timed out");
                last_error = CollaboratorError::Timeout(policy.timeout());
            }
        }
    }
    Err(last_error)
}

/// Give every unit its pivot-language text.
///
/// Units already in the pivot language compare on their own text. Other
/// units are sent to the translator in one batch per language. A unit the
/// translator leaves out, or whose batch fails after the last attempt, comes
/// back [`untranslated`](ClaimUnit::untranslated): low-confidence and excluded
/// from cross-lingual merge. Translation never fails the run.
///
/// The returned units are ordered by language, then by input order.
pub async fn translate_units(
    translator: &dyn Translator,
    pivot: &str,
    units: Vec<ClaimUnit>,
    policy: &RetryPolicy,
) -> Vec<ClaimUnit> {
    let mut by_lang: BTreeMap<String, Vec<ClaimUnit>> = BTreeMap::new();
    for unit in units {
        by_lang.entry(unit.lang.clone()).or_default().push(unit);
    }

    let mut out = Vec::new();
    for (lang, group) in by_lang {
        if lang == pivot {
            out.extend(group.into_iter().map(|unit| {
                let text = unit.text.clone();
                unit.translated(text, None)
            }));
            continue;
        }

        let requests: Vec<TranslationRequest> = group
            .iter()
            .map(|u| TranslationRequest {
                unit: u.id,
                lang: lang.clone(),
                text: u.text.clone(),
            })
            .collect();
        match call_with_retries(translator, pivot, &requests, policy).await {
            Ok(translations) => {
                let mut by_unit: HashMap<ClaimId, Translation> =
                    translations.into_iter().map(|t| (t.unit, t)).collect();
                let mut missing = 0usize;
                for unit in group {
                    match by_unit.remove(&unit.id) {
                        Some(t) if !t.text.trim().is_empty() => {
                            out.push(unit.translated(t.text, t.quality));
                        }
                        _ => {
                            missing += 1;
                            out.push(unit.untranslated());
                        }
                    }
                }
                tracing::debug!(%lang, requested = requests.len(), missing, "language translated");
            }
            Err(e) => {
                tracing::warn!(%lang, units = group.len(), error = %e, "translation unavailable; units kept untranslated");
                out.extend(group.into_iter().map(ClaimUnit::untranslated));
            }
        }
    }
    out
}

use serde::{Deserialize, Serialize};

use crate::citation::ReferenceKey;
use crate::id::ClaimId;

/// Where a unit of content came from.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Provenance {
    /// Source wiki, e.g. `enwiki`, `hiwiki`.
    pub wiki: String,
    /// Article title in the source language.
    pub title: String,
    /// Revision the text was read from.
    pub rev_id: u64,
}

/// Quality flags carried by a [`ClaimUnit`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitFlags {
    /// Segmentation hit malformed markup, or translation was unavailable.
    /// A low-confidence unit never carries a quality score.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub low_confidence: bool,
    /// At least one citation attached to the unit could not be resolved and
    /// was omitted from its reference list.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub source_pending: bool,
}

/// One sentence-level statement from one language edition.
///
/// A `ClaimUnit` is a snapshot value: it is created by the segmenter and
/// never edited afterwards. Translation produces a new value through
/// [`ClaimUnit::translated`] or [`ClaimUnit::untranslated`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClaimUnit {
    pub id: ClaimId,
    pub provenance: Provenance,
    /// Source-language tag, e.g. `en`, `hi`.
    pub lang: String,
    /// Section slug within the source article (`lead` before the first heading).
    pub section: String,
    /// Zero-based position of the unit in its article.
    pub position: u32,
    /// Original-language text.
    pub text: String,
    /// Pivot-language text used only for alignment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pivot_text: Option<String>,
    /// Translation quality score in `[0, 1]`, when the collaborator reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<f64>,
    /// Canonical keys of the citations backing this unit, in source order.
    #[serde(default)]
    pub references: Vec<ReferenceKey>,
    #[serde(default)]
    pub flags: UnitFlags,
}

impl ClaimUnit {
    /// A copy of this unit carrying pivot-language text.
    ///
    /// Units flagged low-confidence by the segmenter keep an absent quality
    /// score regardless of what the translator reported.
    pub fn translated(self, pivot_text: String, quality: Option<f64>) -> Self {
        let quality = if self.flags.low_confidence {
            None
        } else {
            quality.map(|q| q.clamp(0.0, 1.0))
        };
        Self {
            pivot_text: Some(pivot_text),
            quality,
            ..self
        }
    }

    /// A copy of this unit for which no translation is available. It stays
    /// in its original language and is excluded from cross-lingual merge.
    pub fn untranslated(self) -> Self {
        Self {
            pivot_text: None,
            quality: None,
            flags: UnitFlags {
                low_confidence: true,
                ..self.flags
            },
            ..self
        }
    }

    /// Text used for alignment, if any.
    pub fn comparison_text(&self) -> Option<&str> {
        self.pivot_text.as_deref()
    }

    pub fn wiki(&self) -> &str {
        &self.provenance.wiki
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::ContentId;

    fn unit(low_confidence: bool) -> ClaimUnit {
        ClaimUnit {
            id: ClaimId::new(ContentId::from_hash([9; 32])),
            provenance: Provenance {
                wiki: "dewiki".into(),
                title: "X".into(),
                rev_id: 7,
            },
            lang: "de".into(),
            section: "lead".into(),
            position: 0,
            text: "X wurde 1950 geboren.".into(),
            pivot_text: None,
            quality: None,
            references: vec![],
            flags: UnitFlags {
                low_confidence,
                source_pending: false,
            },
        }
    }

    #[test]
    fn translated_keeps_identity_and_sets_pivot() {
        let original = unit(false);
        let translated = original.clone().translated("X was born in 1950.".into(), Some(0.9));
        assert_eq!(translated.id, original.id);
        assert_eq!(translated.text, original.text);
        assert_eq!(translated.comparison_text(), Some("X was born in 1950."));
        assert_eq!(translated.quality, Some(0.9));
    }

    #[test]
    fn low_confidence_units_never_carry_quality() {
        let translated = unit(true).translated("X was born in 1950.".into(), Some(0.9));
        assert_eq!(translated.quality, None);
        assert!(translated.flags.low_confidence);
    }

    #[test]
    fn quality_is_clamped() {
        let translated = unit(false).translated("t".into(), Some(1.7));
        assert_eq!(translated.quality, Some(1.0));
    }

    #[test]
    fn untranslated_marks_low_confidence() {
        let u = unit(false).untranslated();
        assert!(u.flags.low_confidence);
        assert!(u.comparison_text().is_none());
    }

    #[test]
    fn flags_are_omitted_when_clear() {
        let json = serde_json::to_value(UnitFlags::default()).unwrap();
        assert_eq!(json, serde_json::json!({}));
    }
}

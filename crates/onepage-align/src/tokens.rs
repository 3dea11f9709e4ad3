//! Token profiles of pivot-language text.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

static NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+(?:[.,]\d+)*").expect("valid regex"));

/// Function words of the pivot language, ignored when comparing content.
const STOPWORDS: &[&str] = &[
    "a", "about", "after", "also", "an", "and", "are", "as", "at", "be", "been", "before", "being",
    "but", "by", "for", "from", "had", "has", "have", "he", "her", "his", "in", "into", "is", "it",
    "its", "of", "on", "or", "she", "that", "the", "their", "them", "then", "there", "they", "this",
    "to", "was", "were", "which", "who", "whom", "with",
];

/// Map decimal digits of common non-Latin scripts to ASCII.
fn fold_digit(c: char) -> char {
    const ZEROS: &[u32] = &[0x0660, 0x06F0, 0x0966, 0x09E6, 0x0A66, 0x0AE6, 0x0BE6, 0x0C66, 0x0CE6];
    let code = c as u32;
    ZEROS
        .iter()
        .find(|zero| (**zero..**zero + 10).contains(&code))
        .and_then(|zero| char::from_digit(code - zero, 10))
        .unwrap_or(c)
}

/// The set of numbers (years, counts) a statement mentions.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NumericSignature(BTreeSet<String>);

impl NumericSignature {
    pub fn of(text: &str) -> Self {
        let folded: String = text.chars().map(fold_digit).collect();
        Self(
            NUMBER
                .find_iter(&folded)
                .map(|m| m.as_str().replace(',', ""))
                .map(|n| n.trim_start_matches('0').to_string())
                .map(|n| if n.is_empty() { "0".to_string() } else { n })
                .collect(),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Equal sets, or one side mentions no number at all.
    pub fn compatible(&self, other: &Self) -> bool {
        self.is_empty() || other.is_empty() || self == other
    }
}

/// Content tokens and numbers of one text, computed once per unit.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TextProfile {
    pub content: BTreeSet<String>,
    pub numbers: NumericSignature,
}

impl TextProfile {
    pub fn of(text: &str) -> Self {
        let folded: String = text
            .chars()
            .map(fold_digit)
            .flat_map(char::to_lowercase)
            .map(|c| if c.is_alphanumeric() { c } else { ' ' })
            .collect();
        let content = folded
            .split_whitespace()
            .filter(|t| !STOPWORDS.contains(t))
            .map(str::to_string)
            .collect();
        Self {
            content,
            numbers: NumericSignature::of(text),
        }
    }

    /// Jaccard overlap of content tokens. Two empty profiles overlap fully.
    pub fn overlap(&self, other: &Self) -> f64 {
        if self.content.is_empty() && other.content.is_empty() {
            return 1.0;
        }
        let shared = self.content.intersection(&other.content).count();
        let total = self.content.union(&other.content).count();
        shared as f64 / total as f64
    }
}

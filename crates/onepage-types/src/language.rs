use serde::{Deserialize, Serialize};

/// Fixed source-language priority list.
///
/// Used as the last deterministic tie-break wherever two sources are
/// otherwise equal: reference metadata precedence, conflict resolution, and
/// item order within an IR section. Listed languages rank in list order;
/// unlisted languages rank after every listed one, alphabetically.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LanguagePriority(Vec<String>);

/// The rank of one language under a [`LanguagePriority`]. Smaller is better.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct LanguageRank {
    listed: usize,
    lang: String,
}

impl LanguagePriority {
    /// Build a priority list, dropping duplicates after their first entry.
    pub fn new<I, S>(order: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut langs: Vec<String> = Vec::new();
        for lang in order {
            let lang = lang.into();
            if !langs.contains(&lang) {
                langs.push(lang);
            }
        }
        Self(langs)
    }

    /// Rank a language code.
    pub fn rank(&self, lang: &str) -> LanguageRank {
        let listed = self
            .0
            .iter()
            .position(|l| l == lang)
            .unwrap_or(self.0.len());
        LanguageRank {
            listed,
            lang: lang.to_string(),
        }
    }

    pub fn languages(&self) -> &[String] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listed_languages_rank_in_order() {
        let p = LanguagePriority::new(["en", "de", "fr"]);
        assert!(p.rank("en") < p.rank("de"));
        assert!(p.rank("de") < p.rank("fr"));
    }

    #[test]
    fn unlisted_languages_rank_last_alphabetically() {
        let p = LanguagePriority::new(["hi"]);
        assert!(p.rank("hi") < p.rank("ar"));
        assert!(p.rank("ar") < p.rank("zh"));
    }

    #[test]
    fn duplicates_keep_their_first_position() {
        let p = LanguagePriority::new(["de", "en", "de"]);
        assert_eq!(p.languages(), ["de", "en"]);
    }
}

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Slug the segmenter gives to text before the first heading.
pub const LEAD: &str = "lead";

/// Fixed section order and slug aliases.
///
/// Sections are ordered: lead, the fact section, the configured topical
/// sections in configured order, then every other section alphabetically.
/// Source slugs are mapped through `aliases` first, so `early-life-and-career`
/// in one language and `प्रारंभिक-जीवन` in another can land in one section.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SectionTaxonomy {
    pub order: Vec<String>,
    pub aliases: BTreeMap<String, String>,
    /// Section holding every fact item.
    pub fact_section: String,
}

impl Default for SectionTaxonomy {
    fn default() -> Self {
        let order = ["early-life", "education", "career", "political-career", "personal-life", "awards", "legacy"]
            .map(String::from)
            .to_vec();
        let aliases = [
            ("early-life-and-education", "early-life"),
            ("early-life-and-career", "early-life"),
            ("background", "early-life"),
            ("प्रारंभिक-जीवन", "early-life"),
            ("आरंभिक-जीवन", "early-life"),
            ("शिक्षा", "education"),
            ("politics", "political-career"),
            ("political-life", "political-career"),
            ("राजनीतिक-जीवन", "political-career"),
            ("राजनीतिक-करियर", "political-career"),
            ("family", "personal-life"),
            ("व्यक्तिगत-जीवन", "personal-life"),
            ("निजी-जीवन", "personal-life"),
            ("honours", "awards"),
            ("awards-and-honours", "awards"),
            ("सम्मान", "awards"),
            ("पुरस्कार", "awards"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        Self {
            order,
            aliases,
            fact_section: "infobox".to_string(),
        }
    }
}

impl SectionTaxonomy {
    /// Map a source slug to its taxonomy slug.
    pub fn canonical<'a>(&'a self, slug: &'a str) -> &'a str {
        self.aliases.get(slug).map_or(slug, String::as_str)
    }

    /// Order a set of taxonomy slugs.
    pub fn arrange(&self, slugs: &BTreeSet<String>) -> Vec<String> {
        let mut out: Vec<String> = Vec::with_capacity(slugs.len());
        let fixed = [LEAD, self.fact_section.as_str()]
            .into_iter()
            .chain(self.order.iter().map(String::as_str));
        for slug in fixed {
            if slugs.contains(slug) && !out.iter().any(|s| s == slug) {
                out.push(slug.to_string());
            }
        }
        for slug in slugs {
            if !out.contains(slug) {
                out.push(slug.clone());
            }
        }
        out
    }
}

//! Citation templates and `<ref>` bodies → citation metadata.

use std::collections::HashMap;
use std::sync::LazyLock;

use onepage_types::CitationMetadata;
use regex::Regex;

use crate::markup::{clean_inline, is_citation_template, template_name};
use crate::scan::{balanced_spans, split_params, MALFORMED};

static EXTERNAL_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[((?:https?:)?//[^\s\]]+)(?:\s+([^\]]*))?\]").expect("valid regex")
});
static BARE_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"https?://[^\s<>"\]\[|{}]+"#).expect("valid regex"));

const URL_PARAMS: &[&str] = &["url", "chapter-url", "archive-url"];
const TITLE_PARAMS: &[&str] = &["title", "script-title", "trans-title", "chapter"];
const DATE_PARAMS: &[&str] = &["date", "publication-date", "year"];
const PUBLISHER_PARAMS: &[&str] = &[
    "publisher", "work", "website", "newspaper", "journal", "magazine", "agency", "via",
];

fn param_key(raw: &str) -> String {
    raw.trim().to_lowercase().replace(['_', ' '], "-")
}

fn first_of(params: &HashMap<String, String>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|k| params.get(*k).cloned())
}

/// Read a `{{cite …}}` / `{{citation …}}` template body.
pub(crate) fn from_template(inner: &str) -> CitationMetadata {
    let params: HashMap<String, String> = split_params(inner)
        .into_iter()
        .skip(1)
        .filter_map(|p| {
            let (key, value) = p.split_once('=')?;
            let value = clean_value(value);
            (!value.is_empty()).then(|| (param_key(key), value))
        })
        .collect();

    let author = first_of(&params, &["author", "author1", "authors", "vauthors"]).or_else(|| {
        let last = first_of(&params, &["last", "last1"])?;
        Some(match first_of(&params, &["first", "first1"]) {
            Some(first) => format!("{last}, {first}"),
            None => last,
        })
    });

    CitationMetadata {
        doi: params.get("doi").cloned(),
        url: first_of(&params, URL_PARAMS),
        title: first_of(&params, TITLE_PARAMS),
        date: first_of(&params, DATE_PARAMS),
        author,
        publisher: first_of(&params, PUBLISHER_PARAMS),
        text: None,
    }
}

/// Read the body of a `<ref>` tag.
///
/// A citation template inside the body wins. Otherwise an external link gives
/// the URL and its label the title, and the cleaned body is kept as text.
pub(crate) fn from_ref_body(body: &str) -> CitationMetadata {
    let (repaired, spans, _) = balanced_spans(body, "{{", "}}");
    if let Some(span) = spans
        .iter()
        .find(|s| is_citation_template(&template_name(s.inner(&repaired))))
    {
        return from_template(span.inner(&repaired));
    }

    let mut meta = CitationMetadata::default();
    if let Some(caps) = EXTERNAL_LINK.captures(body) {
        meta.url = Some(caps[1].to_string());
        meta.title = caps
            .get(2)
            .map(|m| clean_value(m.as_str()))
            .filter(|t| !t.is_empty());
    } else if let Some(m) = BARE_URL.find(body) {
        meta.url = Some(m.as_str().to_string());
    }

    let mut prose = String::new();
    let mut last = 0;
    for span in &spans {
        prose.push_str(&repaired[last..span.start]);
        last = span.end;
    }
    prose.push_str(&repaired[last..]);
    let text = clean_value(&prose);
    if !text.is_empty() {
        meta.text = Some(text);
    }
    meta
}

fn clean_value(raw: &str) -> String {
    clean_inline(raw)
        .replace(MALFORMED, "")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cite_web_fields() {
        let meta = from_template(
            "cite web |url=https://example.com/a |title=''Sworn in'' |date=26 May 2014 |last=Rao |first=A. |work=[[The Hindu]] |access-date=2020-01-01",
        );
        assert_eq!(meta.url.as_deref(), Some("https://example.com/a"));
        assert_eq!(meta.title.as_deref(), Some("Sworn in"));
        assert_eq!(meta.date.as_deref(), Some("26 May 2014"));
        assert_eq!(meta.author.as_deref(), Some("Rao, A."));
        assert_eq!(meta.publisher.as_deref(), Some("The Hindu"));
    }

    #[test]
    fn cite_journal_doi_and_year() {
        let meta = from_template("Cite journal|doi=10.1000/xyz|year=2020|journal=Nature");
        assert_eq!(meta.doi.as_deref(), Some("10.1000/xyz"));
        assert_eq!(meta.date.as_deref(), Some("2020"));
        assert_eq!(meta.publisher.as_deref(), Some("Nature"));
    }

    #[test]
    fn blank_params_are_ignored() {
        let meta = from_template("cite news|title=|url=  ");
        assert!(meta.is_empty());
    }

    #[test]
    fn ref_body_with_template() {
        let meta = from_ref_body("Quoted in {{cite book|title=Memoir|publisher=P}}");
        assert_eq!(meta.title.as_deref(), Some("Memoir"));
        assert!(meta.text.is_none());
    }

    #[test]
    fn ref_body_with_external_link() {
        let meta = from_ref_body("[https://example.org/r Annual report], 2019.");
        assert_eq!(meta.url.as_deref(), Some("https://example.org/r"));
        assert_eq!(meta.title.as_deref(), Some("Annual report"));
        assert_eq!(meta.text.as_deref(), Some("Annual report, 2019."));
    }

    #[test]
    fn ref_body_free_text() {
        let meta = from_ref_body("Interview with the author, 12 March 2001.");
        assert!(meta.url.is_none());
        assert_eq!(meta.text.as_deref(), Some("Interview with the author, 12 March 2001."));
    }
}

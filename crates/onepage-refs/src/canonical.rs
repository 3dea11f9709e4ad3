//! Citation metadata → stable reference key.

use onepage_crypto::ContentHasher;
use onepage_types::{CitationMetadata, PartialDate, ReferenceKey};

use crate::error::{RefError, RefResult};
use crate::normalize::{extract_doi, find_url, normalize_text, normalize_title, normalize_url};

/// Derive the stable key of a citation.
///
/// Priority order: DOI > URL > normalized title + publication date. With no
/// identifier and no title, free text (or a URL found inside it) and finally
/// author/publisher + date are hashed. A citation with none of these is
/// [`RefError::Unresolvable`].
///
/// The function is pure: the same metadata always yields the same key,
/// independent of call order, and re-canonicalizing the metadata retained by
/// a merged identity yields that identity's key.
pub fn canonicalize(meta: &CitationMetadata) -> RefResult<ReferenceKey> {
    if let Some(doi) = extract_doi(meta) {
        return Ok(ReferenceKey::new(format!("doi:{doi}")));
    }
    if let Some(url) = meta.url.as_deref().and_then(normalize_url) {
        return Ok(ReferenceKey::new(format!("url:{url}")));
    }

    let date = meta.date.as_deref().map(normalize_date).unwrap_or_default();

    if let Some(title) = non_empty(meta.title.as_deref().map(normalize_title)) {
        return Ok(hashed(&["title", &title, &date]));
    }
    if let Some(text) = meta.text.as_deref() {
        if let Some(url) = find_url(text).and_then(normalize_url) {
            return Ok(ReferenceKey::new(format!("url:{url}")));
        }
        if let Some(text) = non_empty(Some(normalize_text(text))) {
            return Ok(hashed(&["text", &text]));
        }
    }
    let author = meta.author.as_deref().map(normalize_text).unwrap_or_default();
    let publisher = meta.publisher.as_deref().map(normalize_text).unwrap_or_default();
    if !author.is_empty() || !publisher.is_empty() {
        return Ok(hashed(&["byline", &author, &publisher, &date]));
    }
    Err(RefError::Unresolvable)
}

fn normalize_date(raw: &str) -> String {
    PartialDate::extract(raw)
        .map(|d| d.to_string())
        .unwrap_or_else(|| normalize_text(raw))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn hashed(fields: &[&str]) -> ReferenceKey {
    let id = ContentHasher::CITATION.hash_fields(fields);
    ReferenceKey::new(format!("cite:{}", id.short_hex()))
}

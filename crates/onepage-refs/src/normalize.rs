//! Field-level normalization of citation metadata.
//!
//! Every function here is idempotent: normalizing an already-normalized value
//! returns it unchanged.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use onepage_types::CitationMetadata;

static DOI: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)10\.\d{4,9}/[^\s"<>|\]\[]+"#).expect("valid regex"));
static BARE_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"https?://[^\s<>"\]\[|]+"#).expect("valid regex"));
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Query parameters that only track the reader and never identify content.
const TRACKING_PARAMS: &[&str] = &[
    "fbclid", "gclid", "dclid", "mc_cid", "mc_eid", "ref", "ref_src", "igshid", "_ga",
];

/// Host prefixes that address the same site.
const HOST_PREFIXES: &[&str] = &["www.", "m.", "mobile."];

fn is_tracking_param(name: &str) -> bool {
    let name = name.to_ascii_lowercase();
    name.starts_with("utm_") || TRACKING_PARAMS.contains(&name.as_str())
}

/// Find a DOI in the DOI field, then the URL, then free text, then the title.
///
/// DOIs are case-insensitive; the result is lowercased with trailing
/// punctuation removed.
pub fn extract_doi(meta: &CitationMetadata) -> Option<String> {
    [&meta.doi, &meta.url, &meta.text, &meta.title]
        .into_iter()
        .filter_map(|field| field.as_deref())
        .find_map(|value| DOI.find(value))
        .map(|m| {
            m.as_str()
                .trim_end_matches(['.', ',', ';', ')', '\''])
                .to_lowercase()
        })
}

/// Find the first bare `http(s)://` URL in free text.
pub fn find_url(text: &str) -> Option<&str> {
    BARE_URL.find(text).map(|m| m.as_str())
}

/// Normalize a URL for identity comparison.
///
/// Scheme and host are case-folded, `http` is unified with `https`, common
/// mirror prefixes (`www.`, `m.`) and default ports are dropped, tracking
/// parameters and fragments are removed, the remaining query parameters are
/// sorted, and trailing slashes on non-root paths are trimmed. Returns
/// `None` when the text does not parse as a URL with a host.
pub fn normalize_url(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let candidate = if trimmed.starts_with("//") {
        format!("https:{trimmed}")
    } else if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };
    let url = Url::parse(&candidate).ok()?;

    let scheme = match url.scheme() {
        "http" | "https" => "https",
        other => other,
    };
    let mut host = url.host_str()?.to_lowercase();
    while let Some(stripped) = HOST_PREFIXES
        .iter()
        .find_map(|prefix| host.strip_prefix(prefix))
        .filter(|rest| rest.contains('.'))
    {
        host = stripped.to_string();
    }
    let port = match (url.scheme(), url.port()) {
        ("http", Some(443)) | (_, None) => String::new(),
        (_, Some(port)) => format!(":{port}"),
    };

    let path = url.path().trim_end_matches('/');
    let path = if path.is_empty() { "/" } else { path };

    let mut params: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| !is_tracking_param(k))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    params.sort();

    let mut normalized = format!("{scheme}://{host}{port}{path}");
    if !params.is_empty() {
        let query = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(params)
            .finish();
        normalized.push('?');
        normalized.push_str(&query);
    }
    Some(normalized)
}

/// Normalize a title for identity comparison.
///
/// Drops a trailing `| Publisher` or short ` - Site` suffix, case-folds,
/// removes punctuation, and collapses whitespace.
pub fn normalize_title(raw: &str) -> String {
    let mut title = raw.trim();
    if let Some((head, _)) = title.rsplit_once(" | ") {
        if !head.trim().is_empty() {
            title = head;
        }
    }
    for sep in [" - ", " – ", " — "] {
        if let Some((head, tail)) = title.rsplit_once(sep) {
            if !head.trim().is_empty() && tail.split_whitespace().count() <= 3 {
                title = head;
                break;
            }
        }
    }
    normalize_text(title)
}

/// Case-fold, strip punctuation, and collapse whitespace.
pub fn normalize_text(raw: &str) -> String {
    let folded: String = raw
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    WHITESPACE.replace_all(folded.trim(), " ").into_owned()
}

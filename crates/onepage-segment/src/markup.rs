//! Wikitext markup removal.
//!
//! Prose survives, markup goes. Citations are replaced by in-band markers
//! (`REF_OPEN index REF_CLOSE`) that survive every later cleaning step and are
//! resolved to reference keys once sentences are known.

use std::collections::{BTreeMap, HashMap};
use std::sync::LazyLock;

use onepage_types::CitationMetadata;
use regex::{Captures, Regex};

use crate::cite;
use crate::scan::{balanced_spans, split_params, MALFORMED};

pub(crate) const REF_OPEN: char = '\u{E000}';
pub(crate) const REF_CLOSE: char = '\u{E001}';

static COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("valid regex"));
static REF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<ref(\s[^>]*?)?(?:/>|>(.*?)</ref\s*>)").expect("valid regex")
});
static UNTERMINATED_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<ref(?:\s[^>]*)?>[^\n]*|</ref\s*>").expect("valid regex"));
static REF_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)name\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s/>]+))"#).expect("valid regex")
});
static EXTERNAL_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[(?:https?:)?//[^\s\]]+(?:\s+([^\]]*))?\]").expect("valid regex")
});
static HTML_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"</?[A-Za-z][^>]*>").expect("valid regex"));
static EMPHASIS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"'{2,}").expect("valid regex"));
static LINE_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>").expect("valid regex"));
static MAGIC_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"__[A-Z]+__").expect("valid regex"));
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));
static SPACE_BEFORE_PUNCT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+([.,;:!?।)])").expect("valid regex"));
static MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("\u{E000}(\\d+)\u{E001}").expect("valid regex"));

/// Link namespaces whose targets are media or categories, never prose.
const NON_PROSE_NAMESPACES: &[&str] = &[
    "file:", "image:", "media:", "category:", "datei:", "bild:", "kategorie:", "fichier:",
    "catégorie:", "archivo:", "categoría:", "चित्र:", "श्रेणी:",
];

/// Template names whose dates are rendered inside infobox values.
const DATE_TEMPLATES: &[&str] = &[
    "birth date", "death date", "start date", "end date", "date", "dob", "birth year",
    "death year",
];

/// Template names whose positional parameters form a list.
const LIST_TEMPLATES: &[&str] = &[
    "ubl", "unbulleted list", "plainlist", "flatlist", "hlist", "plain list", "flat list",
];

/// Citations collected while cleaning one article.
#[derive(Debug, Default)]
pub(crate) struct CitationTable {
    pub entries: Vec<CitationMetadata>,
}

impl CitationTable {
    fn push(&mut self, metadata: CitationMetadata) -> usize {
        self.entries.push(metadata);
        self.entries.len() - 1
    }
}

fn marker(index: usize) -> String {
    format!("{REF_OPEN}{index}{REF_CLOSE}")
}

/// Lowercased template name with underscores read as spaces.
pub(crate) fn template_name(inner: &str) -> String {
    let head = split_params(inner).first().copied().unwrap_or_default();
    WHITESPACE
        .replace_all(&head.replace('_', " ").to_lowercase(), " ")
        .trim()
        .to_string()
}

pub(crate) fn is_citation_template(name: &str) -> bool {
    name == "cite" || name == "citation" || name.starts_with("cite ")
}

/// Remove HTML comments. An unterminated comment swallows the rest of the
/// text and leaves a malformed marker.
pub(crate) fn strip_comments(text: &str) -> String {
    let stripped = COMMENT.replace_all(text, "");
    match stripped.find("<!--") {
        Some(pos) => format!("{}{MALFORMED}", &stripped[..pos]),
        None => stripped.into_owned(),
    }
}

fn ref_name(attrs: Option<&str>) -> Option<String> {
    let caps = REF_NAME.captures(attrs?)?;
    caps.get(1)
        .or_else(|| caps.get(2))
        .or_else(|| caps.get(3))
        .map(|m| m.as_str().trim().to_string())
        .filter(|name| !name.is_empty())
}

/// Replace every `<ref>` with a citation marker.
///
/// A named ref defined anywhere in the article can be reused before or after
/// its definition; every use points at the first definition. A reuse with no
/// definition records an empty (unresolvable) citation.
pub(crate) fn extract_refs(text: &str, table: &mut CitationTable) -> String {
    let mut named: HashMap<String, usize> = HashMap::new();
    for caps in REF.captures_iter(text) {
        let body = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
        if body.trim().is_empty() {
            continue;
        }
        if let Some(name) = ref_name(caps.get(1).map(|m| m.as_str())) {
            if !named.contains_key(&name) {
                let index = table.push(cite::from_ref_body(body));
                named.insert(name, index);
            }
        }
    }

    let replaced = REF.replace_all(text, |caps: &Captures<'_>| {
        let name = ref_name(caps.get(1).map(|m| m.as_str()));
        let body = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
        let index = match name.and_then(|n| named.get(&n).copied()) {
            Some(index) => index,
            None if !body.trim().is_empty() => table.push(cite::from_ref_body(body)),
            None => {
                tracing::debug!("named ref reused without a definition");
                table.push(CitationMetadata::default())
            }
        };
        marker(index)
    });
    UNTERMINATED_REF
        .replace_all(&replaced, MALFORMED.to_string().as_str())
        .into_owned()
}

/// Remove templates from prose.
///
/// Citation templates become citation markers, the first infobox yields its
/// parameters, and every other template is dropped.
pub(crate) fn expand_templates(
    text: &str,
    table: &mut CitationTable,
    infobox: &mut BTreeMap<String, String>,
) -> String {
    let (text, spans, repaired) = balanced_spans(text, "{{", "}}");
    if repaired {
        tracing::debug!("unbalanced template braces repaired");
    }
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for span in spans {
        out.push_str(&text[last..span.start]);
        last = span.end;
        let inner = span.inner(&text);
        let name = template_name(inner);
        if is_citation_template(&name) {
            let index = table.push(cite::from_template(inner));
            out.push_str(&marker(index));
        } else if name.starts_with("infobox") && infobox.is_empty() {
            *infobox = infobox_params(inner);
        }
    }
    out.push_str(&text[last..]);
    out
}

fn infobox_params(inner: &str) -> BTreeMap<String, String> {
    split_params(inner)
        .into_iter()
        .skip(1)
        .filter_map(|param| {
            let (key, value) = param.split_once('=')?;
            let key = WHITESPACE
                .replace_all(key.trim(), "_")
                .to_lowercase();
            let value = infobox_value(value);
            (!key.is_empty() && !value.is_empty()).then_some((key, value))
        })
        .collect()
}

/// Clean one infobox value. Date and list templates are rendered, other
/// templates dropped.
pub(crate) fn infobox_value(raw: &str) -> String {
    let (text, spans, _) = balanced_spans(raw, "{{", "}}");
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for span in spans {
        out.push_str(&text[last..span.start]);
        last = span.end;
        out.push_str(&render_value_template(span.inner(&text)));
    }
    out.push_str(&text[last..]);
    let out = LINE_BREAK.replace_all(&out, "; ");
    let cleaned = clean_inline(&strip_markers(&out));
    cleaned.replace(MALFORMED, "").trim().to_string()
}

fn render_value_template(inner: &str) -> String {
    let name = template_name(inner);
    let params = split_params(inner);
    let positional: Vec<&str> = params
        .iter()
        .skip(1)
        .map(|p| p.trim())
        .filter(|p| !p.contains('='))
        .collect();
    if DATE_TEMPLATES.iter().any(|t| name == *t || name.starts_with(&format!("{t} "))) {
        let parts: Vec<&str> = positional
            .iter()
            .copied()
            .take_while(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit()))
            .take(3)
            .collect();
        return match parts.as_slice() {
            [y] => y.to_string(),
            [y, m] => format!("{y}-{m:0>2}"),
            [y, m, d] => format!("{y}-{m:0>2}-{d:0>2}"),
            _ => String::new(),
        };
    }
    if LIST_TEMPLATES.contains(&name.as_str()) {
        return positional
            .iter()
            .map(|p| infobox_value(p.trim_start_matches('*')))
            .filter(|p| !p.is_empty())
            .collect::<Vec<_>>()
            .join("; ");
    }
    String::new()
}

/// Drop `{| … |}` tables, which may nest.
pub(crate) fn strip_tables(text: &str) -> String {
    let mut depth = 0usize;
    let mut out = String::with_capacity(text.len());
    for line in text.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with("{|") {
            depth += 1;
            continue;
        }
        if depth > 0 {
            if trimmed.starts_with("|}") {
                depth -= 1;
            }
            continue;
        }
        out.push_str(line);
        out.push('\n');
    }
    out
}

/// Resolve wikilinks: media and category links vanish, `[[a|b]]` becomes `b`
/// and `[[a]]` becomes `a`.
fn resolve_links(text: &str) -> String {
    let (text, spans, _) = balanced_spans(text, "[[", "]]");
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for span in spans {
        out.push_str(&text[last..span.start]);
        last = span.end;
        let inner = span.inner(&text);
        let target = inner.trim_start_matches(':').trim().to_lowercase();
        if NON_PROSE_NAMESPACES.iter().any(|ns| target.starts_with(ns)) {
            continue;
        }
        let label = split_params(inner).last().copied().unwrap_or_default();
        out.push_str(&resolve_links(label.trim()));
    }
    out.push_str(&text[last..]);
    out
}

/// Strip inline markup from a fragment of text, keeping its prose.
pub(crate) fn clean_inline(text: &str) -> String {
    let text = resolve_links(text);
    let text = EXTERNAL_LINK.replace_all(&text, |caps: &Captures<'_>| {
        caps.get(1).map(|m| m.as_str().to_string()).unwrap_or_default()
    });
    let text = HTML_TAG.replace_all(&text, "");
    let text = EMPHASIS.replace_all(&text, "");
    let text = MAGIC_WORD.replace_all(&text, "");
    text.replace("&nbsp;", " ")
        .replace("&ndash;", "–")
        .replace("&mdash;", "—")
        .replace("&amp;", "&")
}

/// Remove citation markers from text.
pub(crate) fn strip_markers(text: &str) -> String {
    MARKER.replace_all(text, "").into_owned()
}

/// Text with its markers removed, plus the byte offsets at which they stood.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct Unmarked {
    pub text: String,
    /// `(offset, citation index)` pairs.
    pub citations: Vec<(usize, usize)>,
    /// Offsets of malformed-markup markers.
    pub malformed: Vec<usize>,
}

/// Separate prose from in-band markers.
pub(crate) fn unmark(text: &str) -> Unmarked {
    let collapsed = WHITESPACE.replace_all(text.trim(), " ");
    let mut out = Unmarked::default();
    let mut last = 0;
    for caps in MARKER.captures_iter(&collapsed) {
        let (Some(whole), Ok(index)) = (caps.get(0), caps[1].parse::<usize>()) else {
            continue;
        };
        out.text.push_str(&collapsed[last..whole.start()]);
        out.citations.push((out.text.len(), index));
        last = whole.end();
    }
    out.text.push_str(&collapsed[last..]);

    if out.text.contains(MALFORMED) {
        let mut text = String::with_capacity(out.text.len());
        let mut shift = Vec::new();
        for (pos, c) in out.text.char_indices() {
            if c == MALFORMED {
                out.malformed.push(text.len());
                shift.push((pos, c.len_utf8()));
            } else {
                text.push(c);
            }
        }
        for (offset, _) in &mut out.citations {
            let removed: usize = shift
                .iter()
                .filter(|(pos, _)| *pos < *offset)
                .map(|(_, len)| len)
                .sum();
            *offset -= removed;
        }
        out.text = text;
    }
    out
}

/// Collapse whitespace and tuck stray spaces back before punctuation.
pub(crate) fn tidy(sentence: &str) -> String {
    let collapsed = WHITESPACE.replace_all(sentence.trim(), " ");
    SPACE_BEFORE_PUNCT.replace_all(&collapsed, "$1").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comments_removed_and_unterminated_flagged() {
        assert_eq!(strip_comments("a<!-- hidden -->b"), "ab");
        assert_eq!(strip_comments("a<!-- open"), format!("a{MALFORMED}"));
    }

    #[test]
    fn refs_become_markers_and_named_refs_reuse() {
        let mut table = CitationTable::default();
        let text = concat!(
            "A.<ref name=\"r1\">{{cite web|url=https://example.com/a|title=A}}</ref> ",
            "B.<ref name=r1 /> C.<ref>Plain note</ref>"
        );
        let out = extract_refs(text, &mut table);
        assert_eq!(table.entries.len(), 2);
        assert_eq!(out, format!("A.{} B.{} C.{}", marker(0), marker(0), marker(1)));
        assert_eq!(table.entries[0].url.as_deref(), Some("https://example.com/a"));
    }

    #[test]
    fn named_ref_may_be_used_before_definition() {
        let mut table = CitationTable::default();
        let text = "A.<ref name=\"late\"/> B.<ref name=\"late\">{{cite book|title=Book}}</ref>";
        let out = extract_refs(text, &mut table);
        assert_eq!(table.entries.len(), 1);
        assert_eq!(out, format!("A.{} B.{}", marker(0), marker(0)));
    }

    #[test]
    fn unterminated_ref_is_flagged() {
        let mut table = CitationTable::default();
        let out = extract_refs("A. B.<ref>never closed\nNext line.", &mut table);
        assert_eq!(out, format!("A. B.{MALFORMED}\nNext line."));
    }

    #[test]
    fn templates_dispatch_by_name() {
        let mut table = CitationTable::default();
        let mut infobox = BTreeMap::new();
        let text = concat!(
            "{{Short description|Indian politician}}{{Infobox officeholder\n",
            "| name = X\n| term_start = {{start date|2014|5|26}}\n| party = [[Bharatiya Janata Party|BJP]]\n}}\n",
            "X {{citation needed}} is a politician.{{cite news|title=T|date=2014}}"
        );
        let out = expand_templates(text, &mut table, &mut infobox);
        assert_eq!(out.trim(), format!("X  is a politician.{}", marker(0)));
        assert_eq!(infobox.get("term_start").map(String::as_str), Some("2014-05-26"));
        assert_eq!(infobox.get("party").map(String::as_str), Some("BJP"));
        assert_eq!(table.entries[0].title.as_deref(), Some("T"));
    }

    #[test]
    fn only_first_infobox_is_kept() {
        let mut table = CitationTable::default();
        let mut infobox = BTreeMap::new();
        expand_templates("{{Infobox a|x=1}}{{Infobox b|x=2|y=3}}", &mut table, &mut infobox);
        assert_eq!(infobox.len(), 1);
        assert_eq!(infobox["x"], "1");
    }

    #[test]
    fn list_templates_join_items() {
        assert_eq!(infobox_value("{{ubl|[[A]]|B}}"), "A; B");
        assert_eq!(infobox_value("[[A]]<br />B"), "A; B");
    }

    #[test]
    fn links_and_media_resolved() {
        let text = "[[File:X.jpg|thumb|Caption with [[link]]]]Born in [[Vadnagar]], [[Bombay State|Bombay]]. [[Category:Living people]]";
        assert_eq!(clean_inline(text).trim(), "Born in Vadnagar, Bombay.");
    }

    #[test]
    fn external_links_keep_label_and_emphasis_dropped() {
        assert_eq!(
            clean_inline("'''X''' wrote [https://example.com a book] [https://example.org]."),
            "X wrote a book ."
        );
    }

    #[test]
    fn tables_removed_including_nested() {
        let text = "before\n{|\n| a\n{|\n| b\n|}\n| c\n|}\nafter\n";
        assert_eq!(strip_tables(text), "before\nafter\n");
    }

    #[test]
    fn unmark_records_offsets() {
        let text = format!("A b.{} C{MALFORMED} d.", marker(3));
        let u = unmark(&text);
        assert_eq!(u.text, "A b. C d.");
        assert_eq!(u.citations, vec![(4, 3)]);
        assert_eq!(u.malformed, vec![6]);
    }

    #[test]
    fn tidy_fixes_spacing() {
        assert_eq!(tidy("  X  wrote a book .  "), "X wrote a book.");
    }
}

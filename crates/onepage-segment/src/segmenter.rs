//! Article → claim units.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use onepage_crypto::ContentHasher;
use onepage_refs::{canonicalize, SourcedCitation};
use onepage_types::{ClaimId, ClaimUnit, ReferenceKey, UnitFlags};
use regex::Regex;
use unicode_segmentation::UnicodeSegmentation;

use crate::article::{ArticleSnapshot, SegmentedArticle};
use crate::error::SegmentResult;
use crate::markup::{self, CitationTable};

static HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(={2,6})\s*(.+?)\s*={2,6}$").expect("valid regex"));

/// Section id of text before the first heading.
pub const LEAD_SECTION: &str = "lead";

/// Sections holding citations and links rather than prose about the subject.
const APPARATUS_SECTIONS: &[&str] = &[
    "references", "notes", "footnotes", "citations", "sources", "bibliography",
    "further-reading", "external-links", "see-also", "einzelnachweise", "weblinks", "literatur",
    "références", "notes-et-références", "liens-externes", "referencias", "enlaces-externos",
    "सन्दर्भ", "संदर्भ", "बाहरी-कड़ियाँ",
];

/// Lowercase slug of a heading: ASCII punctuation and whitespace become `-`.
pub fn section_slug(heading: &str) -> String {
    let cleaned = markup::clean_inline(heading);
    let mapped: String = cleaned
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_whitespace() || c.is_ascii_punctuation() {
                '-'
            } else {
                c
            }
        })
        .collect();
    let slug = mapped
        .split('-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-");
    if slug.is_empty() {
        "section".to_string()
    } else {
        slug
    }
}

struct Paragraph {
    section: String,
    text: String,
}

/// Split the cleaned body into paragraphs. List items are paragraphs of
/// their own; apparatus sections are skipped.
fn paragraphs(body: &str) -> Vec<Paragraph> {
    let mut out = Vec::new();
    let mut section = LEAD_SECTION.to_string();
    let mut current = String::new();

    let flush = |section: &str, current: &mut String, out: &mut Vec<Paragraph>| {
        if !current.trim().is_empty() {
            out.push(Paragraph {
                section: section.to_string(),
                text: std::mem::take(current),
            });
        }
        current.clear();
    };

    for line in body.lines() {
        let trimmed = line.trim();
        if let Some(caps) = HEADING.captures(trimmed) {
            flush(&section, &mut current, &mut out);
            section = section_slug(&caps[2]);
            continue;
        }
        if trimmed.is_empty() {
            flush(&section, &mut current, &mut out);
            continue;
        }
        if APPARATUS_SECTIONS.contains(&section.as_str()) {
            continue;
        }
        if trimmed.starts_with(['|', '!']) || trimmed.starts_with("----") {
            continue;
        }
        if trimmed.starts_with(['*', '#', ':', ';']) {
            flush(&section, &mut current, &mut out);
            current.push_str(trimmed.trim_start_matches(['*', '#', ':', ';']));
            flush(&section, &mut current, &mut out);
            continue;
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(trimmed);
    }
    flush(&section, &mut current, &mut out);
    out
}

/// One sentence of a paragraph with the markers that belong to it.
#[derive(Debug, Default)]
struct Sentence {
    text: String,
    citations: Vec<usize>,
    malformed: bool,
}

/// Split a paragraph into sentences and attach its citation markers.
///
/// A marker belongs to the sentence it stands in, except that a marker at the
/// very start of a sentence belongs to the previous one. Sentences without any
/// letter or digit are dropped; their markers move to the previous sentence,
/// or to the next when there is none.
fn sentences(paragraph: &str) -> Vec<Sentence> {
    let unmarked = markup::unmark(paragraph);
    let bounds: Vec<(usize, &str)> = unmarked.text.split_sentence_bound_indices().collect();
    if bounds.is_empty() {
        return Vec::new();
    }

    let locate = |offset: usize, shift_back: bool| -> usize {
        let k = bounds
            .iter()
            .rposition(|(start, _)| *start <= offset)
            .unwrap_or(0);
        if shift_back && k > 0 && bounds[k].0 == offset {
            k - 1
        } else {
            k
        }
    };

    let mut raw: Vec<Sentence> = bounds
        .iter()
        .map(|(_, s)| Sentence {
            text: markup::tidy(s),
            ..Sentence::default()
        })
        .collect();
    for &(offset, index) in &unmarked.citations {
        raw[locate(offset, true)].citations.push(index);
    }
    for &offset in &unmarked.malformed {
        raw[locate(offset, false)].malformed = true;
    }

    let mut kept: Vec<Sentence> = Vec::new();
    let mut carry = Sentence::default();
    for mut sentence in raw {
        if sentence.text.chars().any(char::is_alphanumeric) {
            let mut citations = std::mem::take(&mut carry.citations);
            citations.append(&mut sentence.citations);
            sentence.citations = citations;
            sentence.malformed |= std::mem::take(&mut carry.malformed);
            kept.push(sentence);
        } else if let Some(previous) = kept.last_mut() {
            previous.citations.append(&mut sentence.citations);
            previous.malformed |= sentence.malformed;
        } else {
            carry.citations.append(&mut sentence.citations);
            carry.malformed |= sentence.malformed;
        }
    }
    kept
}

/// Content-derived id of a unit.
pub fn claim_id(wiki: &str, rev_id: u64, section: &str, position: u32, text: &str) -> ClaimId {
    let rev = rev_id.to_string();
    let pos = position.to_string();
    ClaimId::new(ContentHasher::CLAIM.hash_fields(&[wiki, rev.as_str(), section, pos.as_str(), text]))
}

/// Segment one article.
///
/// Deterministic for identical input; unit order follows document order.
/// Only blank snapshots are rejected; malformed markup degrades to
/// low-confidence units.
pub fn segment(article: &ArticleSnapshot) -> SegmentResult<SegmentedArticle> {
    article.validate()?;
    let provenance = article.provenance();

    let mut table = CitationTable::default();
    let mut infobox = BTreeMap::new();
    let text = markup::strip_comments(&article.text);
    let text = markup::extract_refs(&text, &mut table);
    let text = markup::expand_templates(&text, &mut table, &mut infobox);
    let text = markup::strip_tables(&text);
    let body = markup::clean_inline(&text);

    let keys: Vec<Option<ReferenceKey>> = table
        .entries
        .iter()
        .map(|meta| canonicalize(meta).ok())
        .collect();

    let mut units = Vec::new();
    let mut position = 0u32;
    for paragraph in paragraphs(&body) {
        for sentence in sentences(&paragraph.text) {
            let mut references: Vec<ReferenceKey> = Vec::new();
            let mut source_pending = false;
            for index in &sentence.citations {
                match keys.get(*index).cloned().flatten() {
                    Some(key) if !references.contains(&key) => references.push(key),
                    Some(_) => {}
                    None => source_pending = true,
                }
            }
            units.push(ClaimUnit {
                id: claim_id(
                    &provenance.wiki,
                    provenance.rev_id,
                    &paragraph.section,
                    position,
                    &sentence.text,
                ),
                provenance: provenance.clone(),
                lang: article.lang.clone(),
                section: paragraph.section.clone(),
                position,
                text: sentence.text,
                pivot_text: None,
                quality: None,
                references,
                flags: UnitFlags {
                    low_confidence: sentence.malformed,
                    source_pending,
                },
            });
            position += 1;
        }
    }

    let citations: Vec<SourcedCitation> = table
        .entries
        .into_iter()
        .map(|metadata| SourcedCitation::new(article.lang.clone(), metadata))
        .collect();

    let segmented = SegmentedArticle {
        provenance,
        lang: article.lang.clone(),
        units,
        citations,
        infobox,
    };
    tracing::debug!(
        wiki = %segmented.provenance.wiki,
        units = segmented.units.len(),
        citations = segmented.citations.len(),
        infobox_params = segmented.infobox.len(),
        low_confidence = segmented.low_confidence_count(),
        "article segmented"
    );
    Ok(segmented)
}

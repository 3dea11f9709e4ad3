//! Depth-tracking scanner for paired two-character delimiters (`{{ }}`, `[[ ]]`).

/// Replaces a delimiter that has no partner. Sentences containing it are
/// flagged low-confidence.
pub(crate) const MALFORMED: char = '\u{E002}';

/// A balanced span at nesting depth zero, delimiters included.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    /// The text between the delimiters.
    pub fn inner<'a>(&self, text: &'a str) -> &'a str {
        &text[self.start + 2..self.end - 2]
    }
}

struct Scan {
    spans: Vec<Span>,
    unbalanced: Vec<usize>,
}

fn scan(text: &str, open: &str, close: &str) -> Scan {
    let bytes = text.as_bytes();
    let (open, close) = (open.as_bytes(), close.as_bytes());
    let mut stack = Vec::new();
    let mut spans = Vec::new();
    let mut unbalanced = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        let rest = &bytes[i..];
        if rest.starts_with(open) {
            stack.push(i);
            i += 2;
        } else if rest.starts_with(close) {
            match stack.pop() {
                Some(start) if stack.is_empty() => spans.push(Span { start, end: i + 2 }),
                Some(_) => {}
                None => unbalanced.push(i),
            }
            i += 2;
        } else {
            i += 1;
        }
    }
    unbalanced.extend(stack);
    unbalanced.sort_unstable();
    Scan { spans, unbalanced }
}

/// Find the top-level balanced spans of `text`.
///
/// Delimiters without a partner are replaced by [`MALFORMED`] first, so the
/// returned spans always refer to the returned (possibly repaired) text. The
/// flag reports whether any repair happened.
pub(crate) fn balanced_spans(text: &str, open: &str, close: &str) -> (String, Vec<Span>, bool) {
    let first = scan(text, open, close);
    if first.unbalanced.is_empty() {
        return (text.to_string(), first.spans, false);
    }
    let mut repaired = String::with_capacity(text.len());
    let mut last = 0;
    for pos in first.unbalanced {
        repaired.push_str(&text[last..pos]);
        repaired.push(MALFORMED);
        last = pos + 2;
    }
    repaired.push_str(&text[last..]);
    let second = scan(&repaired, open, close);
    (repaired, second.spans, true)
}

/// Split template or link content at `|` characters that are not nested
/// inside another template or link.
pub(crate) fn split_params(inner: &str) -> Vec<&str> {
    let bytes = inner.as_bytes();
    let mut depth = 0usize;
    let mut parts = Vec::new();
    let mut last = 0;
    let mut i = 0;
    while i < bytes.len() {
        let rest = &bytes[i..];
        if rest.starts_with(b"{{") || rest.starts_with(b"[[") {
            depth += 1;
            i += 2;
        } else if rest.starts_with(b"}}") || rest.starts_with(b"]]") {
            depth = depth.saturating_sub(1);
            i += 2;
        } else {
            if bytes[i] == b'|' && depth == 0 {
                parts.push(&inner[last..i]);
                last = i + 1;
            }
            i += 1;
        }
    }
    parts.push(&inner[last..]);
    parts
}

//! Value normalization and agreement.
//!
//! Infobox values are free text. They are typed according to their
//! [`ValueKind`] and compared to canonical values on normalized forms: dates
//! as partial dates, entity labels case-folded, quantities by numeric value.

use std::sync::LazyLock;

use onepage_types::{FactValue, PartialDate, Qualifiers};
use regex::Regex;

use crate::property::ValueKind;

static NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-+]?\d[\d,]*(?:\.\d+)?").expect("valid regex"));

/// Separator the segmenter uses to join list-valued infobox parameters.
const LIST_SEPARATOR: &str = "; ";

fn collapse(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Case-folded, whitespace-collapsed form with edge punctuation removed.
pub fn fold(text: &str) -> String {
    collapse(text)
        .trim_matches(|c: char| !c.is_alphanumeric())
        .to_lowercase()
}

/// Decimal string without sign, grouping separators or trailing zeros.
fn normalize_amount(amount: &str) -> String {
    let mut s: String = amount.trim().trim_start_matches('+').replace(',', "");
    if s.contains('.') {
        s = s.trim_end_matches('0').trim_end_matches('.').to_string();
    }
    if s.is_empty() || s == "-" {
        "0".to_string()
    } else {
        s
    }
}

/// Type one raw infobox value. Returns `None` for blank input.
///
/// A time that cannot be read as a date, or a quantity without a number,
/// falls back to text rather than being dropped.
pub fn normalize(raw: &str, kind: ValueKind) -> Option<FactValue> {
    let text = collapse(raw);
    if text.is_empty() {
        return None;
    }
    let value = match kind {
        ValueKind::Time => match PartialDate::extract(&text) {
            Some(value) => FactValue::Time { value },
            None => FactValue::text(text),
        },
        ValueKind::Quantity => match NUMBER.find(&text) {
            Some(m) => FactValue::Quantity {
                amount: normalize_amount(m.as_str()),
                unit: None,
            },
            None => FactValue::text(text),
        },
        // Infobox entities carry a label but no identifier.
        ValueKind::Entity | ValueKind::Text => FactValue::text(text),
    };
    Some(value)
}

/// Split a list-valued parameter and type each element.
pub fn normalize_all(raw: &str, kind: ValueKind) -> Vec<FactValue> {
    raw.split(LIST_SEPARATOR)
        .filter_map(|part| normalize(part, kind))
        .collect()
}

/// Normalized string form of a qualifier value.
pub fn normalize_qualifier(raw: &str, kind: ValueKind) -> Option<String> {
    let text = collapse(raw);
    if text.is_empty() {
        return None;
    }
    let date = match kind {
        ValueKind::Time => PartialDate::extract(&text),
        _ => text.parse::<PartialDate>().ok(),
    };
    Some(date.map_or(text, |d| d.to_string()))
}

/// Normalize every qualifier of a canonical statement in place.
pub(crate) fn normalize_qualifiers(qualifiers: &Qualifiers) -> Qualifiers {
    qualifiers
        .iter()
        .filter_map(|(k, v)| normalize_qualifier(v, ValueKind::Text).map(|v| (k.clone(), v)))
        .collect()
}

fn label_of(value: &FactValue) -> Option<String> {
    match value {
        FactValue::Text { value } => Some(fold(value)),
        FactValue::Entity { label, .. } => label.as_deref().map(fold),
        _ => None,
    }
}

/// Whether two values state the same thing.
pub fn values_agree(a: &FactValue, b: &FactValue) -> bool {
    use FactValue::*;
    match (a, b) {
        (Time { value: x }, Time { value: y }) => x.agrees_with(y),
        (Time { value: date }, Text { value: text }) | (Text { value: text }, Time { value: date }) => {
            text.parse::<PartialDate>().is_ok_and(|d| d.agrees_with(date))
        }
        (Quantity { amount: x, unit: ux }, Quantity { amount: y, unit: uy }) => {
            normalize_amount(x) == normalize_amount(y) && (ux.is_none() || uy.is_none() || ux == uy)
        }
        (Quantity { amount, .. }, Text { value: text }) | (Text { value: text }, Quantity { amount, .. }) => {
            NUMBER
                .find(text)
                .is_some_and(|m| normalize_amount(m.as_str()) == normalize_amount(amount))
        }
        (Entity { qid: x, .. }, Entity { qid: y, .. }) if !x.is_empty() && !y.is_empty() => x == y,
        _ => match (label_of(a), label_of(b)) {
            (Some(x), Some(y)) => !x.is_empty() && x == y,
            _ => false,
        },
    }
}

fn qualifier_values_agree(a: &str, b: &str) -> bool {
    match (a.parse::<PartialDate>(), b.parse::<PartialDate>()) {
        (Ok(x), Ok(y)) => x.agrees_with(&y),
        _ => fold(a) == fold(b),
    }
}

/// Qualifiers conflict only on keys present on both sides.
pub fn qualifiers_agree(a: &Qualifiers, b: &Qualifiers) -> bool {
    a.iter()
        .all(|(k, v)| b.get(k).map_or(true, |w| qualifier_values_agree(v, w)))
}

/// Add the qualifiers of `other` that `target` lacks. Shared keys keep the
/// value already present unless `other` is more precise.
pub(crate) fn merge_qualifiers(target: &mut Qualifiers, other: &Qualifiers) {
    for (k, v) in other {
        match target.get(k) {
            None => {
                target.insert(k.clone(), v.clone());
            }
            Some(existing) => {
                if let (Ok(x), Ok(y)) = (existing.parse::<PartialDate>(), v.parse::<PartialDate>()) {
                    if precision(&y) > precision(&x) {
                        target.insert(k.clone(), v.clone());
                    }
                }
            }
        }
    }
}

fn precision(date: &PartialDate) -> u8 {
    match (date.month, date.day) {
        (_, Some(_)) => 2,
        (Some(_), None) => 1,
        _ => 0,
    }
}

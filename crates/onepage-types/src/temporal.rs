use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::TypeError;

static ISO_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\+?(\d{1,4})-(\d{1,2})-(\d{1,2})(?:T[0-9:]+Z?)?$").expect("valid regex")
});
static ISO_MONTH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4})-(\d{1,2})$").expect("valid regex"));
static YEAR_ONLY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{3,4})$").expect("valid regex"));
static EMBEDDED_YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(1\d{3}|20\d{2})\b").expect("valid regex"));

/// Day-level formats seen in citation templates and infoboxes.
const DAY_FORMATS: &[&str] = &[
    "%d %B %Y",
    "%B %d, %Y",
    "%B %d %Y",
    "%d %b %Y",
    "%b %d, %Y",
    "%b %d %Y",
    "%d.%m.%Y",
    "%Y/%m/%d",
];

/// A calendar date known to year, month or day precision.
///
/// Citation dates and fact qualifiers arrive in many shapes (`2014-05-26`,
/// `+2014-05-26T00:00:00Z`, `26 May 2014`, `May 2014`, `2014`). They are
/// normalized to a `PartialDate` so that recency comparisons and qualifier
/// agreement checks are independent of the source formatting.
///
/// Ordering: `year` → `month` → `day`, where a missing component sorts
/// before any present one (`2014` < `2014-01` < `2014-01-01`).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PartialDate {
    pub year: i32,
    pub month: Option<u8>,
    pub day: Option<u8>,
}

impl PartialDate {
    /// A date with year precision.
    pub fn year(year: i32) -> Self {
        Self {
            year,
            month: None,
            day: None,
        }
    }

    /// A date with month precision. Returns `None` for an invalid month.
    pub fn year_month(year: i32, month: u8) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self {
            year,
            month: Some(month),
            day: None,
        })
    }

    /// A full date. Returns `None` if the date does not exist.
    pub fn ymd(year: i32, month: u8, day: u8) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month as u32, day as u32).map(Self::from)
    }

    /// Lenient extraction: try a strict parse, then fall back to the first
    /// plausible four-digit year embedded in the text (`c. 1950`).
    pub fn extract(text: &str) -> Option<Self> {
        if let Ok(date) = text.parse() {
            return Some(date);
        }
        EMBEDDED_YEAR
            .captures(text)
            .and_then(|c| c[1].parse().ok())
            .map(Self::year)
    }

    /// Two dates agree when every component known on both sides is equal.
    ///
    /// `2014` agrees with `2014-05-26`; `2014-05-20` does not agree with
    /// `2014-05-26`.
    pub fn agrees_with(&self, other: &Self) -> bool {
        if self.year != other.year {
            return false;
        }
        match (self.month, other.month) {
            (Some(a), Some(b)) if a != b => return false,
            (Some(_), Some(_)) => {}
            _ => return true,
        }
        !matches!((self.day, other.day), (Some(a), Some(b)) if a != b)
    }
}

impl From<NaiveDate> for PartialDate {
    fn from(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: Some(date.month() as u8),
            day: Some(date.day() as u8),
        }
    }
}

impl FromStr for PartialDate {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = || TypeError::InvalidDate(s.to_string());

        if let Some(c) = ISO_DATE.captures(s) {
            let year: i32 = c[1].parse().map_err(|_| invalid())?;
            let month: u8 = c[2].parse().map_err(|_| invalid())?;
            let day: u8 = c[3].parse().map_err(|_| invalid())?;
            // Knowledge-base timestamps use zero components for lower precision.
            return match (month, day) {
                (0, _) => Ok(Self::year(year)),
                (m, 0) => Self::year_month(year, m).ok_or_else(invalid),
                (m, d) => Self::ymd(year, m, d).ok_or_else(invalid),
            };
        }
        if let Some(c) = ISO_MONTH.captures(s) {
            let year: i32 = c[1].parse().map_err(|_| invalid())?;
            let month: u8 = c[2].parse().map_err(|_| invalid())?;
            return Self::year_month(year, month).ok_or_else(invalid);
        }
        if let Some(c) = YEAR_ONLY.captures(s) {
            return c[1].parse().map(Self::year).map_err(|_| invalid());
        }

        for format in DAY_FORMATS {
            if let Ok(date) = NaiveDate::parse_from_str(s, format) {
                return Ok(date.into());
            }
        }
        // "May 2014"
        for format in ["%d %B %Y", "%d %b %Y"] {
            if let Ok(date) = NaiveDate::parse_from_str(&format!("1 {s}"), format) {
                return Ok(Self {
                    year: date.year(),
                    month: Some(date.month() as u8),
                    day: None,
                });
            }
        }
        Err(invalid())
    }
}

impl fmt::Debug for PartialDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PartialDate({self})")
    }
}

impl fmt::Display for PartialDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}", self.year)?;
        if let Some(month) = self.month {
            write!(f, "-{month:02}")?;
            if let Some(day) = self.day {
                write!(f, "-{day:02}")?;
            }
        }
        Ok(())
    }
}

impl Serialize for PartialDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PartialDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

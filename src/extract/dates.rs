//! Date matching shared by every registration-date pass.
//!
//! A keyword is located in the page text, a window of text is cut around it,
//! and the date shapes below are tried against that window in order. The
//! first shape that yields a real calendar date decides the outcome for that
//! keyword: if the date lies before today the keyword is skipped.

use crate::constants::{CATEGORY_WINDOW_AFTER, GENERIC_WINDOW_AFTER, GENERIC_WINDOW_BEFORE};
use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

const MONTHS: &str = "january|february|march|april|may|june|july|august|september|october|november|december|jan|feb|mar|apr|jun|jul|aug|sept|sep|oct|nov|dec";
const DAY_NAMES: &str = "monday|tuesday|wednesday|thursday|friday|saturday|sunday";

static DAY_NAME_MONTH_DAY_YEAR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)(?:{d}),?\s*\b({m})\s+(\d{{1,2}})(?:st|nd|rd|th)?,?\s*(\d{{4}})",
        d = DAY_NAMES,
        m = MONTHS
    ))
    .unwrap()
});
static MONTH_DAY_YEAR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)\b({})\s+(\d{{1,2}})(?:st|nd|rd|th)?,?\s*(\d{{4}})",
        MONTHS
    ))
    .unwrap()
});
static NUMERIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d{1,2})/(\d{1,2})/(\d{4})").unwrap());
static ISO: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d{4})-(\d{2})-(\d{2})").unwrap());
static DAY_NAME_MONTH_DAY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)(?:{d}),?\s*\b({m})\s+(\d{{1,2}})(?:st|nd|rd|th)?\b",
        d = DAY_NAMES,
        m = MONTHS
    ))
    .unwrap()
});
static MONTH_DAY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)\b({})\s+(\d{{1,2}})(?:st|nd|rd|th)?\b",
        MONTHS
    ))
    .unwrap()
});
/// What a year-less match must not be followed by
static TRAILING_YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*,?\s*\d{4}").unwrap());

/// Tries to read one date shape out of a context window
pub type DateMatcher = fn(&str, NaiveDate) -> Option<NaiveDate>;

pub const DATE_MATCHERS: &[(&str, DateMatcher)] = &[
    ("day name, month, day, year", day_name_month_day_year),
    ("month, day, year", month_day_year),
    ("MM/DD/YYYY", numeric_date),
    ("YYYY-MM-DD", iso_date),
    ("day name, month, day", day_name_month_day),
    ("month, day", month_day),
];

/// Month number for a full or abbreviated English month name.
pub fn month_number(name: &str) -> Option<u32> {
    let prefix = name.to_lowercase();
    let month = match prefix.get(..3)? {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}

fn number(caps: &Captures, idx: usize) -> Option<u32> {
    caps.get(idx)?.as_str().parse().ok()
}

fn named_month_date(caps: &Captures) -> Option<NaiveDate> {
    let month = month_number(caps.get(1)?.as_str())?;
    let year = number(caps, 3)? as i32;
    NaiveDate::from_ymd_opt(year, month, number(caps, 2)?)
}

/// Year-less dates land on their next occurrence: this year unless already
/// past, otherwise next year.
pub fn next_occurrence(month: u32, day: u32, today: NaiveDate) -> Option<NaiveDate> {
    let this_year = NaiveDate::from_ymd_opt(today.year(), month, day)?;
    if this_year >= today {
        Some(this_year)
    } else {
        NaiveDate::from_ymd_opt(today.year() + 1, month, day)
    }
}

fn yearless_date(pattern: &Regex, context: &str, today: NaiveDate) -> Option<NaiveDate> {
    let caps = pattern
        .captures_iter(context)
        .find(|caps| {
            let end = caps.get(0).map_or(context.len(), |m| m.end());
            !TRAILING_YEAR.is_match(&context[end..])
        })?;
    let month = month_number(caps.get(1)?.as_str())?;
    next_occurrence(month, number(&caps, 2)?, today)
}

pub fn day_name_month_day_year(context: &str, _today: NaiveDate) -> Option<NaiveDate> {
    named_month_date(&DAY_NAME_MONTH_DAY_YEAR.captures(context)?)
}

pub fn month_day_year(context: &str, _today: NaiveDate) -> Option<NaiveDate> {
    named_month_date(&MONTH_DAY_YEAR.captures(context)?)
}

pub fn numeric_date(context: &str, _today: NaiveDate) -> Option<NaiveDate> {
    let caps = NUMERIC.captures(context)?;
    NaiveDate::from_ymd_opt(number(&caps, 3)? as i32, number(&caps, 1)?, number(&caps, 2)?)
}

pub fn iso_date(context: &str, _today: NaiveDate) -> Option<NaiveDate> {
    let caps = ISO.captures(context)?;
    NaiveDate::from_ymd_opt(number(&caps, 1)? as i32, number(&caps, 2)?, number(&caps, 3)?)
}

pub fn day_name_month_day(context: &str, today: NaiveDate) -> Option<NaiveDate> {
    yearless_date(&DAY_NAME_MONTH_DAY, context, today)
}

pub fn month_day(context: &str, today: NaiveDate) -> Option<NaiveDate> {
    yearless_date(&MONTH_DAY, context, today)
}

/// The date from the first shape that matches the context and forms a valid
/// calendar date, whether or not it has already passed.
pub fn first_date_in(context: &str, today: NaiveDate) -> Option<NaiveDate> {
    DATE_MATCHERS
        .iter()
        .find_map(|(_, matcher)| matcher(context, today))
}

/// Like [`first_date_in`] but rejects dates before `today`.
pub fn accepted_date_in(context: &str, today: NaiveDate) -> Option<NaiveDate> {
    first_date_in(context, today).filter(|date| *date >= today)
}

/// How much text around a keyword is searched for a date
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeywordWindow {
    /// Starts at the keyword and runs forward
    Forward(usize),
    Around { before: usize, after: usize },
}

impl KeywordWindow {
    pub const CATEGORY: KeywordWindow = KeywordWindow::Forward(CATEGORY_WINDOW_AFTER);
    pub const GENERIC: KeywordWindow = KeywordWindow::Around {
        before: GENERIC_WINDOW_BEFORE,
        after: GENERIC_WINDOW_AFTER,
    };

    /// Cuts the window around the keyword starting at byte `idx`. Sizes are
    /// counted in characters.
    pub fn slice(self, text: &str, idx: usize) -> &str {
        let (before, after) = match self {
            KeywordWindow::Forward(after) => (0, after),
            KeywordWindow::Around { before, after } => (before, after),
        };

        let start = if before == 0 {
            idx
        } else {
            text[..idx]
                .char_indices()
                .rev()
                .take(before)
                .last()
                .map_or(idx, |(i, _)| i)
        };
        let end = text[idx..]
            .char_indices()
            .nth(after)
            .map_or(text.len(), |(i, _)| idx + i);

        &text[start..end]
    }
}

/// Walks the keywords in rank order and returns the first accepted date,
/// together with the keyword that produced it.
pub fn find_keyword_date<'k>(
    text_lower: &str,
    keywords: &[&'k str],
    window: KeywordWindow,
    today: NaiveDate,
) -> Option<(NaiveDate, &'k str)> {
    keywords.iter().find_map(|keyword| {
        let idx = text_lower.find(keyword)?;
        let context = window.slice(text_lower, idx);
        accepted_date_in(context, today).map(|date| (date, *keyword))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn today() -> NaiveDate {
        ymd(2025, 6, 1)
    }

    #[test]
    fn test_shapes_with_year() {
        assert_eq!(
            first_date_in("begins monday, january 15, 2026 at noon", today()),
            Some(ymd(2026, 1, 15))
        );
        assert_eq!(first_date_in("opens jan 15th 2026", today()), Some(ymd(2026, 1, 15)));
        assert_eq!(first_date_in("by sept 3, 2025", today()), Some(ymd(2025, 9, 3)));
        assert_eq!(first_date_in("due 3/7/2026", today()), Some(ymd(2026, 3, 7)));
        assert_eq!(first_date_in("from 2026-02-01 on", today()), Some(ymd(2026, 2, 1)));
    }

    #[test]
    fn test_ordinal_superscript_keeps_its_year() {
        let text = crate::extract::page::html_to_text(
            "<p>Open enrollment begins January 15<sup>th</sup>, 2027.</p>",
        );
        assert_eq!(first_date_in(&text.to_lowercase(), today()), Some(ymd(2027, 1, 15)));
    }

    #[test]
    fn test_yearless_dates_roll_forward() {
        assert_eq!(month_day("opens july 4", today()), Some(ymd(2025, 7, 4)));
        assert_eq!(month_day("opens march 3rd", today()), Some(ymd(2026, 3, 3)));
        assert_eq!(
            day_name_month_day("starts saturday, aug 9", today()),
            Some(ymd(2025, 8, 9))
        );
        // today itself is still upcoming
        assert_eq!(month_day("june 1", today()), Some(ymd(2025, 6, 1)));
    }

    #[test]
    fn test_yearless_ignores_dated_matches() {
        assert_eq!(month_day("closes january 15, 2026", today()), None);
        assert_eq!(
            month_day("closes january 15, 2026 and reopens feb 2", today()),
            Some(ymd(2026, 2, 2))
        );
    }

    #[test]
    fn test_invalid_calendar_date_falls_through() {
        assert_eq!(first_date_in("february 30, 2026", today()), None);
        assert_eq!(
            first_date_in("february 30, 2026 or 2026-03-02", today()),
            Some(ymd(2026, 3, 2))
        );
    }

    #[test]
    fn test_past_dates_rejected() {
        assert_eq!(first_date_in("march 1, 2020", today()), Some(ymd(2020, 3, 1)));
        assert_eq!(accepted_date_in("march 1, 2020", today()), None);
        assert_eq!(accepted_date_in("june 1, 2025", today()), Some(ymd(2025, 6, 1)));
    }

    #[test]
    fn test_month_number() {
        assert_eq!(month_number("Sept"), Some(9));
        assert_eq!(month_number("december"), Some(12));
        assert_eq!(month_number("ma"), None);
    }

    #[test]
    fn test_forward_window_starts_at_keyword() {
        let text = "open enrollment é begins soon";
        let idx = text.find("enrollment").unwrap();
        assert_eq!(KeywordWindow::Forward(12).slice(text, idx), "enrollment é");
        assert_eq!(KeywordWindow::Forward(500).slice(text, idx), "enrollment é begins soon");
    }

    #[test]
    fn test_around_window_is_char_safe() {
        let text = "ééé deadline ü";
        let idx = text.find("deadline").unwrap();
        let window = KeywordWindow::Around { before: 2, after: 10 };
        assert_eq!(window.slice(text, idx), "é deadline ü");
        let wide = KeywordWindow::Around { before: 100, after: 200 };
        assert_eq!(wide.slice(text, idx), text);
    }

    #[test]
    fn test_keywords_tried_in_rank_order() {
        let text = "early registration closed march 1, 2020. returning students may enroll starting july 10.";
        let found = find_keyword_date(
            text,
            &["early registration", "returning students"],
            KeywordWindow::CATEGORY,
            today(),
        );
        assert_eq!(found, Some((ymd(2025, 7, 10), "returning students")));
    }

    #[test]
    fn test_forward_window_misses_dates_before_keyword() {
        let text = "july 10: registration opens";
        assert_eq!(
            find_keyword_date(text, &["registration"], KeywordWindow::CATEGORY, today()),
            None
        );
        assert_eq!(
            find_keyword_date(text, &["registration"], KeywordWindow::GENERIC, today()),
            Some((ymd(2025, 7, 10), "registration"))
        );
    }
}

use crate::types::{DayHours, Weekday};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::{BTreeMap, BTreeSet};

const DEFAULT_OPEN: &str = "09:00";
const DEFAULT_CLOSE: &str = "17:00";

/// Where an hours statement may be found, most specific label first
static HOURS_SPANS: Lazy<[Regex; 3]> = Lazy::new(|| {
    [
        Regex::new(r"(?i)(?:hours?|open)[:\s]+([^\n]{10,80})").unwrap(),
        Regex::new(r"(?i)((?:monday|mon)[-\s]*(?:friday|fri)[,\s]*\d+\s*(?:am|pm)[^\n]{0,40})")
            .unwrap(),
        Regex::new(
            r"(?i)((?:mon|tue|wed|thu|fri|sat|sun)[-\s/]+(?:mon|tue|wed|thu|fri|sat|sun)[,\s]+\d+[:\s]*\d*\s*(?:am|pm)[^\n]{0,40})",
        )
        .unwrap(),
    ]
});

const DAY_NAMES: &str =
    r"monday|mon|tuesday|tues|tue|wednesday|wed|thursday|thurs|thur|thu|friday|fri|saturday|sat|sunday|sun";

static DAY_RANGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"\b({d})\.?\s*(?:-|–|to|through|thru)\s*({d})\b",
        d = DAY_NAMES
    ))
    .unwrap()
});
static SINGLE_DAY: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"\b({})\b", DAY_NAMES)).unwrap());

static TIME_RANGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d{1,2})(?::(\d{2}))?\s*(am|pm)?\s*[-to–]+\s*(\d{1,2})(?::(\d{2}))?\s*(am|pm)?")
        .unwrap()
});

/// Weekly schedule pulled from a page: the same hours apply to every listed day
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schedule {
    pub days: BTreeSet<Weekday>,
    pub hours_per_day: BTreeMap<Weekday, DayHours>,
}

/// `None` means the page never states its hours. Callers leave the record
/// untouched in that case instead of inventing a default week.
pub fn extract_hours(text: &str) -> Option<Schedule> {
    let span = find_hours_span(text)?;
    let lower = span.to_lowercase();

    let days = operating_days(&lower);
    let (open, close) = parse_time_range(&lower)
        .unwrap_or_else(|| (DEFAULT_OPEN.to_string(), DEFAULT_CLOSE.to_string()));

    let hours_per_day = days
        .iter()
        .map(|day| {
            (
                *day,
                DayHours {
                    open: open.clone(),
                    close: close.clone(),
                },
            )
        })
        .collect();

    Some(Schedule {
        days,
        hours_per_day,
    })
}

pub fn find_hours_span(text: &str) -> Option<String> {
    HOURS_SPANS
        .iter()
        .find_map(|pattern| pattern.captures(text))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Day ranges ("mon-fri", "tue to sat") expand to every day they cover;
/// any other day name adds just that day.
pub fn operating_days(span_lower: &str) -> BTreeSet<Weekday> {
    let mut days = BTreeSet::new();
    for caps in DAY_RANGE.captures_iter(span_lower) {
        if let (Some(start), Some(end)) = (Weekday::from_name(&caps[1]), Weekday::from_name(&caps[2])) {
            days.extend(start.range_to(end));
        }
    }
    days.extend(
        SINGLE_DAY
            .find_iter(span_lower)
            .filter_map(|m| Weekday::from_name(m.as_str())),
    );
    days
}

/// First open/close pair in the span, as 24-hour `HH:MM` strings.
pub fn parse_time_range(span_lower: &str) -> Option<(String, String)> {
    let caps = TIME_RANGE.captures(span_lower)?;
    let open = to_24_hour(&caps, 1, 2, 3)?;
    let close = to_24_hour(&caps, 4, 5, 6)?;
    Some((open, close))
}

fn to_24_hour(caps: &Captures, hour_idx: usize, min_idx: usize, period_idx: usize) -> Option<String> {
    let mut hour: u32 = caps.get(hour_idx)?.as_str().parse().ok()?;
    let minute: u32 = match caps.get(min_idx) {
        Some(m) => m.as_str().parse().ok()?,
        None => 0,
    };

    match caps.get(period_idx).map(|m| m.as_str()) {
        Some("pm") if hour != 12 => hour += 12,
        Some("am") if hour == 12 => hour = 0,
        _ => {}
    }

    (hour < 24 && minute < 60).then(|| format!("{:02}:{:02}", hour, minute))
}

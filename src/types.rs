use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Day of the week as it appears in the record (`"monday"`, ...).
/// Ordered Monday-first so sets and maps serialize in calendar order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];

    /// Parses a full day name or a common abbreviation ("tue", "tues", "thurs").
    pub fn from_name(name: &str) -> Option<Self> {
        let day = match name.trim_end_matches('.').to_lowercase().as_str() {
            "monday" | "mon" => Weekday::Monday,
            "tuesday" | "tue" | "tues" => Weekday::Tuesday,
            "wednesday" | "wed" => Weekday::Wednesday,
            "thursday" | "thu" | "thur" | "thurs" => Weekday::Thursday,
            "friday" | "fri" => Weekday::Friday,
            "saturday" | "sat" => Weekday::Saturday,
            "sunday" | "sun" => Weekday::Sunday,
            _ => return None,
        };
        Some(day)
    }

    pub fn index(self) -> usize {
        self as usize
    }

    /// Days from `self` through `end` inclusive, wrapping past Sunday.
    pub fn range_to(self, end: Weekday) -> Vec<Weekday> {
        let start = self.index();
        let len = (end.index() + 7 - start) % 7 + 1;
        (0..len).map(|offset| Self::ALL[(start + offset) % 7]).collect()
    }
}

/// Opening hours for one day, both in 24-hour `HH:MM`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayHours {
    pub open: String,
    pub close: String,
}

/// Everything one crawl learns about a provider. Built up in place while the
/// crawl runs and handed back to the caller when it stops.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractionRecord {
    pub name: String,
    pub description: String,
    #[serde(rename = "category")]
    pub categories: Vec<String>,
    pub address: String,
    pub neighborhood: String,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub operating_days: BTreeSet<Weekday>,
    pub hours_per_day: BTreeMap<Weekday, DayHours>,
    pub price_min: Option<f64>,
    pub price_max: Option<f64>,
    pub price_unit: Option<String>,
    pub price_description: Option<String>,
    pub registration_url: Option<String>,
    re_enrollment_date: Option<NaiveDate>,
    new_registration_date: Option<NaiveDate>,
    pub crawled_pages: Vec<String>,
}

impl ExtractionRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn re_enrollment_date(&self) -> Option<NaiveDate> {
        self.re_enrollment_date
    }

    pub fn new_registration_date(&self) -> Option<NaiveDate> {
        self.new_registration_date
    }

    /// Stores the date unless one is already set. Returns whether it was stored.
    pub fn record_re_enrollment_date(&mut self, date: NaiveDate) -> bool {
        if self.re_enrollment_date.is_some() {
            return false;
        }
        self.re_enrollment_date = Some(date);
        true
    }

    /// Stores the date unless one is already set. Returns whether it was stored.
    pub fn record_new_registration_date(&mut self, date: NaiveDate) -> bool {
        if self.new_registration_date.is_some() {
            return false;
        }
        self.new_registration_date = Some(date);
        true
    }

    pub fn has_both_dates(&self) -> bool {
        self.re_enrollment_date.is_some() && self.new_registration_date.is_some()
    }
}

/// What the CLI prints for one provider: the record, or an error object in its place
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ScrapeOutput {
    Record(Box<ExtractionRecord>),
    Error { error: String },
}

impl From<crate::error::Result<ExtractionRecord>> for ScrapeOutput {
    fn from(result: crate::error::Result<ExtractionRecord>) -> Self {
        match result {
            Ok(record) => ScrapeOutput::Record(Box::new(record)),
            Err(e) => ScrapeOutput::Error {
                error: e.to_string(),
            },
        }
    }
}

use super::dates::{find_keyword_date, KeywordWindow};
use super::page::PageSnapshot;
use crate::constants::{
    GENERIC_DATE_KEYWORDS, NEW_REGISTRATION_KEYWORDS, REGISTRATION_LINK_KEYWORDS,
    REGISTRATION_PAGE_EXTRA_KEYWORDS, RE_ENROLLMENT_KEYWORDS,
};
use crate::crawler::urls::origin_of;
use crate::types::ExtractionRecord;
use chrono::NaiveDate;
use tracing::info;

/// Which page the date scan is looking at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationPass {
    /// Any page reached by the crawl
    Crawl,
    /// The dedicated registration page visited after the crawl
    RegistrationPage,
}

/// What a single scan added to the record
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateFindings {
    pub re_enrollment: bool,
    pub new_registration: bool,
}

/// Sets `registration_url` from the first registration-style anchor on the
/// page. An already-set URL is kept.
pub fn find_registration_url(page: &PageSnapshot, record: &mut ExtractionRecord) {
    if record.registration_url.is_some() {
        return;
    }

    let origin = origin_of(&page.url);
    for anchor in page.anchors() {
        let href_lower = anchor.href.to_lowercase();
        if href_lower.starts_with("mailto:") || href_lower.starts_with("tel:") {
            continue;
        }

        let text_lower = anchor.text.to_lowercase();
        let matches = REGISTRATION_LINK_KEYWORDS
            .iter()
            .any(|k| href_lower.contains(k) || text_lower.contains(k));
        if !matches {
            continue;
        }

        if let Some(url) = absolute_registration_href(&anchor.href, &origin) {
            info!("Found registration URL: {}", url);
            record.registration_url = Some(url);
            return;
        }
    }
}

/// Root-relative hrefs hang off the origin, absolute http(s) hrefs are kept,
/// other schemes are rejected and anything else is appended to the origin.
pub fn absolute_registration_href(href: &str, origin: &str) -> Option<String> {
    if href.starts_with('/') {
        return Some(format!("{}{}", origin, href));
    }
    if href.starts_with("http") {
        return Some(href.to_string());
    }
    if href.contains(':') {
        return None;
    }
    Some(format!("{}/{}", origin.trim_end_matches('/'), href))
}

/// Scans the page text for the two registration dates. A date that is
/// already on the record is never replaced and its category is not scanned.
pub fn extract_registration_dates(
    text_lower: &str,
    record: &mut ExtractionRecord,
    today: NaiveDate,
    pass: RegistrationPass,
) -> DateFindings {
    let mut findings = DateFindings::default();

    if record.re_enrollment_date().is_none() {
        if let Some((date, keyword)) =
            find_keyword_date(text_lower, RE_ENROLLMENT_KEYWORDS, KeywordWindow::CATEGORY, today)
        {
            info!(%date, keyword, ?pass, "Found re-enrollment date");
            findings.re_enrollment = record.record_re_enrollment_date(date);
        }
    }

    if record.new_registration_date().is_none() {
        let found = match pass {
            RegistrationPass::Crawl => find_keyword_date(
                text_lower,
                NEW_REGISTRATION_KEYWORDS,
                KeywordWindow::CATEGORY,
                today,
            ),
            RegistrationPass::RegistrationPage => {
                let keywords: Vec<&str> = NEW_REGISTRATION_KEYWORDS
                    .iter()
                    .chain(REGISTRATION_PAGE_EXTRA_KEYWORDS)
                    .copied()
                    .collect();
                find_keyword_date(text_lower, &keywords, KeywordWindow::CATEGORY, today).or_else(
                    || {
                        find_keyword_date(
                            text_lower,
                            GENERIC_DATE_KEYWORDS,
                            KeywordWindow::GENERIC,
                            today,
                        )
                    },
                )
            }
        };

        if let Some((date, keyword)) = found {
            info!(%date, keyword, ?pass, "Found new registration date");
            findings.new_registration = record.record_new_registration_date(date);
        }
    }

    findings
}

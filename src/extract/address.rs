use super::page::{element_text, PageSnapshot};
use super::{first_success, ExtractContext, Strategy};
use crate::constants::ADDRESS_SELECTORS;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Selector;
use serde_json::Value;
use tracing::debug;

const MAX_HTML_ADDRESS_CHARS: usize = 200;
const MIN_ADDRESS_CHARS: usize = 5;

static JSON_LD: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"script[type="application/ld+json"]"#).unwrap());
static ADDRESS_TAG: Lazy<Selector> = Lazy::new(|| Selector::parse("address").unwrap());
static ITEMPROP_STREET: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"[itemprop="streetAddress"]"#).unwrap());
static ITEMPROP_LOCALITY: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"[itemprop="addressLocality"]"#).unwrap());
static ITEMPROP_REGION: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"[itemprop="addressRegion"]"#).unwrap());
static CSS_PROBES: Lazy<Vec<Selector>> = Lazy::new(|| {
    ADDRESS_SELECTORS
        .iter()
        .filter_map(|s| Selector::parse(s).ok())
        .collect()
});

const STREET_SUFFIX: &str = "Street|St|Avenue|Ave|Boulevard|Blvd|Road|Rd|Drive|Dr|Lane|Ln|Way|Court|Ct|Circle|Cir|Place|Pl";

static FULL_ADDRESS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"\d+\s+[A-Za-z\s.]+(?:{}|Terrace|Ter|Parkway|Pkwy)[.,]?\s*(?:#\s*\w+|Suite\s*\w+|Ste\s*\w+|Unit\s*\w+)?[.,]?\s*[A-Za-z\s]+,?\s*[A-Z]{{2}}\s*\d{{5}}",
        STREET_SUFFIX
    ))
    .unwrap()
});

static STREET_ONLY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\d+\s+[A-Za-z\s.]+(?:Street|St|Avenue|Ave|Boulevard|Blvd|Road|Rd|Drive|Dr|Lane|Ln|Way|Court|Ct)")
        .unwrap()
});

const STRATEGIES: &[(&str, Strategy<String>)] = &[
    ("json-ld", structured_data),
    ("address tag", address_tag),
    ("microdata", microdata),
    ("css probe", css_probe),
    ("full address pattern", full_address_pattern),
    ("street and city pattern", street_city_pattern),
    ("street only pattern", street_only_pattern),
];

pub fn extract_address(page: &PageSnapshot, ctx: &ExtractContext) -> Option<String> {
    first_success("address", STRATEGIES, page, ctx)
}

fn structured_data(page: &PageSnapshot, _ctx: &ExtractContext) -> Option<String> {
    for script in page.document.select(&JSON_LD) {
        let raw = script.text().collect::<String>();
        let data: Value = match serde_json::from_str(raw.trim()) {
            Ok(data) => data,
            Err(e) => {
                debug!("Skipping malformed JSON-LD block: {}", e);
                continue;
            }
        };
        if let Some(address) = address_from_json_ld(&data) {
            return Some(address);
        }
    }
    None
}

/// Looks through a JSON-LD document (object, array, or `@graph`) for an
/// `address` and joins street, locality, region and postal code.
pub fn address_from_json_ld(data: &Value) -> Option<String> {
    let items: Vec<&Value> = match data {
        Value::Array(items) => items.iter().collect(),
        Value::Object(map) => {
            let mut items = vec![data];
            if let Some(Value::Array(graph)) = map.get("@graph") {
                items.extend(graph.iter());
            }
            items
        }
        _ => return None,
    };

    items.into_iter().find_map(|item| match item.get("address")? {
        Value::Object(addr) => {
            let parts: Vec<&str> = ["streetAddress", "addressLocality", "addressRegion", "postalCode"]
                .iter()
                .filter_map(|key| addr.get(*key).and_then(Value::as_str))
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .collect();
            (!parts.is_empty()).then(|| parts.join(", "))
        }
        Value::String(addr) if addr.trim().chars().count() > MIN_ADDRESS_CHARS => {
            Some(addr.trim().to_string())
        }
        _ => None,
    })
}

fn plausible_html_address(text: &str) -> bool {
    let len = text.chars().count();
    len > MIN_ADDRESS_CHARS
        && len < MAX_HTML_ADDRESS_CHARS
        && text.chars().any(|c| c.is_ascii_digit())
}

fn address_tag(page: &PageSnapshot, _ctx: &ExtractContext) -> Option<String> {
    let tag = page.document.select(&ADDRESS_TAG).next()?;
    let text = element_text(&tag);
    plausible_html_address(&text).then_some(text)
}

fn microdata(page: &PageSnapshot, _ctx: &ExtractContext) -> Option<String> {
    let street = page.first_text(&ITEMPROP_STREET)?;
    let mut parts = vec![street];
    parts.extend(page.first_text(&ITEMPROP_LOCALITY));
    parts.extend(page.first_text(&ITEMPROP_REGION));
    Some(parts.join(", "))
}

fn css_probe(page: &PageSnapshot, _ctx: &ExtractContext) -> Option<String> {
    CSS_PROBES.iter().find_map(|selector| {
        let element = page.document.select(selector).next()?;
        let text = element_text(&element);
        plausible_html_address(&text).then_some(text)
    })
}

fn full_address_pattern(page: &PageSnapshot, _ctx: &ExtractContext) -> Option<String> {
    FULL_ADDRESS
        .find(&page.text)
        .map(|m| m.as_str().trim().to_string())
}

fn street_city_pattern(page: &PageSnapshot, ctx: &ExtractContext) -> Option<String> {
    let pattern = street_city_regex(&ctx.region)?;
    pattern.find(&page.text).map(|m| m.as_str().trim().to_string())
}

/// Street address followed by the configured city and an optional state
pub fn street_city_regex(region: &str) -> Option<Regex> {
    Regex::new(&format!(
        r"(?i)\d+\s+[A-Za-z\s.]+(?:{})[.,]?\s*(?:{})[.,]?\s*(?:CA|California|NY|New York|TX|Texas|IL|Illinois|WA|Washington)?",
        STREET_SUFFIX,
        regex::escape(region)
    ))
    .ok()
}

fn street_only_pattern(page: &PageSnapshot, _ctx: &ExtractContext) -> Option<String> {
    STREET_ONLY
        .find(&page.text)
        .map(|m| m.as_str().trim().to_string())
}

//! Field extraction. Each field is an ordered chain of strategies; the first
//! strategy that yields a value wins and a field nobody can fill stays empty.

pub mod address;
pub mod categories;
pub mod contact;
pub mod dates;
pub mod description;
pub mod hours;
pub mod name;
pub mod neighborhood;
pub mod page;
pub mod pricing;
pub mod registration;

use crate::types::ExtractionRecord;
use page::PageSnapshot;
use tracing::{debug, instrument};

/// Settings the extractors need beyond the page itself
#[derive(Debug, Clone)]
pub struct ExtractContext {
    /// City used by the street+city address pattern and as the neighborhood fallback
    pub region: String,
}

impl ExtractContext {
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
        }
    }
}

/// One way of pulling a value out of a page
pub type Strategy<T> = fn(&PageSnapshot, &ExtractContext) -> Option<T>;

/// Runs the named strategies in order and returns the first hit.
pub fn first_success<T>(
    field: &str,
    strategies: &[(&str, Strategy<T>)],
    page: &PageSnapshot,
    ctx: &ExtractContext,
) -> Option<T> {
    for (strategy_name, strategy) in strategies {
        if let Some(value) = strategy(page, ctx) {
            debug!(field, strategy = strategy_name, "Field extracted");
            return Some(value);
        }
    }
    debug!(field, "No strategy matched");
    None
}

/// Fills the static provider attributes from a single page. The crawler runs
/// this once, against the first page it manages to fetch.
#[instrument(skip_all, fields(url = %page.url))]
pub fn extract_static_fields(page: &PageSnapshot, ctx: &ExtractContext, record: &mut ExtractionRecord) {
    if let Some(name) = name::extract_name(page, ctx) {
        record.name = name;
    }
    record.description = description::extract_description(page, ctx);

    let contact = contact::extract_contact(&page.text);
    record.contact_email = contact.email;
    record.contact_phone = contact.phone;

    match address::extract_address(page, ctx) {
        Some(found) => {
            record.neighborhood = neighborhood::infer_neighborhood(&found, &ctx.region);
            record.address = found;
        }
        None => {
            record.address.clear();
            record.neighborhood.clear();
        }
    }

    if let Some(schedule) = hours::extract_hours(&page.text) {
        record.operating_days = schedule.days;
        record.hours_per_day = schedule.hours_per_day;
    }

    if let Some(price) = pricing::extract_pricing(&page.text) {
        record.price_min = Some(price.min);
        record.price_max = Some(price.max);
        record.price_unit = price.unit;
        record.price_description = price.description;
    }

    record.categories = categories::extract_categories(page.text_lower());
}

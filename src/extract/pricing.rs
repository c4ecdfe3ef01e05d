use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static FREE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bfree\b").unwrap());

const AMOUNT: &str = r"(\d+(?:,\d{3})*(?:\.\d{2})?)";
const UNIT: &str = r"\s*(?:per|/|each)?\s*(month|session|class|week|term|semester|year)?";

static PRICE_RANGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(?i)\$\s*{a}\s*[-to–]+\s*\$?\s*{a}{u}", a = AMOUNT, u = UNIT)).unwrap()
});
static SINGLE_PRICE: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"(?i)\$\s*{}{}", AMOUNT, UNIT)).unwrap());

#[derive(Debug, Clone, PartialEq)]
pub struct Price {
    pub min: f64,
    pub max: f64,
    /// e.g. "per month"
    pub unit: Option<String>,
    pub description: Option<String>,
}

/// "free" beats a price range, which beats a single amount.
pub fn extract_pricing(text: &str) -> Option<Price> {
    if FREE.is_match(text) {
        return Some(Price {
            min: 0.0,
            max: 0.0,
            unit: None,
            description: Some("Free".to_string()),
        });
    }

    if let Some(caps) = PRICE_RANGE.captures(text) {
        return Some(Price {
            min: parse_amount(&caps[1])?,
            max: parse_amount(&caps[2])?,
            unit: unit_of(&caps, 3),
            description: None,
        });
    }

    let caps = SINGLE_PRICE.captures(text)?;
    let amount = parse_amount(&caps[1])?;
    Some(Price {
        min: amount,
        max: amount,
        unit: unit_of(&caps, 2),
        description: None,
    })
}

fn parse_amount(raw: &str) -> Option<f64> {
    raw.replace(',', "").parse().ok()
}

fn unit_of(caps: &Captures, idx: usize) -> Option<String> {
    caps.get(idx)
        .map(|unit| format!("per {}", unit.as_str().to_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_amount_with_unit() {
        let price = extract_pricing("Tuition is $150 per month.").unwrap();
        assert_eq!(price.min, 150.0);
        assert_eq!(price.max, 150.0);
        assert_eq!(price.unit.as_deref(), Some("per month"));
        assert_eq!(price.description, None);
    }

    #[test]
    fn test_free_wins_over_amounts() {
        let price = extract_pricing("Free after-school program. Materials $20.").unwrap();
        assert_eq!(price.min, 0.0);
        assert_eq!(price.max, 0.0);
        assert_eq!(price.description.as_deref(), Some("Free"));
    }

    #[test]
    fn test_free_needs_word_boundary() {
        let price = extract_pricing("Carefree summers, $40/class").unwrap();
        assert_eq!(price.min, 40.0);
        assert_eq!(price.unit.as_deref(), Some("per class"));
    }

    #[test]
    fn test_range_with_thousands() {
        let price = extract_pricing("Camps run $1,200 - $1,850 per Session").unwrap();
        assert_eq!(price.min, 1200.0);
        assert_eq!(price.max, 1850.0);
        assert_eq!(price.unit.as_deref(), Some("per session"));
    }

    #[test]
    fn test_range_without_unit() {
        let price = extract_pricing("Lessons $25.50 to $40").unwrap();
        assert_eq!((price.min, price.max), (25.5, 40.0));
        assert_eq!(price.unit, None);
    }

    #[test]
    fn test_no_price() {
        assert_eq!(extract_pricing("Call for rates"), None);
    }
}

use crate::constants::NEIGHBORHOOD_KEYWORDS;

/// Maps an address to a neighborhood label by keyword, falling back to the
/// region itself. The first table entry with a matching keyword wins.
pub fn infer_neighborhood(address: &str, region: &str) -> String {
    let lower = address.to_lowercase();
    NEIGHBORHOOD_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(label, _)| label.to_string())
        .unwrap_or_else(|| region.to_string())
}

use crate::constants::{CATEGORY_KEYWORDS, DEFAULT_CATEGORY, MAX_CATEGORIES};

/// Categories whose keywords appear in the text, in table order, capped at
/// three. Never empty.
pub fn extract_categories(text_lower: &str) -> Vec<String> {
    let mut categories: Vec<String> = CATEGORY_KEYWORDS
        .iter()
        .filter(|(_, keywords)| keywords.iter().any(|k| text_lower.contains(k)))
        .map(|(category, _)| category.to_string())
        .take(MAX_CATEGORIES)
        .collect();

    if categories.is_empty() {
        categories.push(DEFAULT_CATEGORY.to_string());
    }
    categories
}

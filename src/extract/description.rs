use super::page::{element_text, PageSnapshot};
use super::{first_success, ExtractContext, Strategy};
use crate::constants::{ABOUT_SECTION_KEYWORDS, DEFAULT_DESCRIPTION};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Selector;

const MAX_DESCRIPTION_CHARS: usize = 500;
const MIN_CLEANED_CHARS: usize = 30;
const MIN_SECTION_CHARS: usize = 50;
const MIN_PARAGRAPH_CHARS: usize = 20;

static META_DESCRIPTION: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"meta[name="description"]"#).unwrap());
static OG_DESCRIPTION: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"meta[property="og:description"]"#).unwrap());
static SECTION_BLOCKS: Lazy<Selector> = Lazy::new(|| Selector::parse("p[class], div[class]").unwrap());
static PARAGRAPHS: Lazy<Selector> = Lazy::new(|| Selector::parse("p").unwrap());

static BOILERPLATE: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        // cookie consent
        r"by using this (?:website|site),?\s+you agree to\s+.*?cookies.*?\.?",
        r"we use cookies\s+.*?\.?",
        r"this (?:website|site) uses cookies\s+.*?\.?",
        r"cookies?\s+help us\s+.*?\.?",
        r"accept\s+(?:all\s+)?cookies?",
        r"cookie\s+(?:policy|preferences|settings|consent)",
        // privacy and terms
        r"by (?:using|continuing|browsing)\s+.*?(?:agree|accept|consent)\s+.*?(?:terms|privacy|policy).*?\.?",
        r"read our privacy policy",
        r"view our terms",
        // site notices and newsletter prompts
        r"javascript (?:is|must be) enabled",
        r"please enable javascript",
        r"your browser.*?not supported",
        r"subscribe to our newsletter",
        r"sign up for (?:our )?(?:newsletter|updates|emails)",
        r"enter your email",
        // navigation chrome
        r"skip to (?:main )?content",
        r"toggle navigation",
        r"\bmenu\b",
        r"search\s*$",
    ]
    .iter()
    .map(|pattern| Regex::new(&format!("(?i){}", pattern)).unwrap())
    .collect()
});

const STRATEGIES: &[(&str, Strategy<String>)] = &[
    ("meta description", meta_description),
    ("og:description", og_description),
    ("about section", about_section),
    ("leading paragraphs", leading_paragraphs),
];

/// Never empty: falls back to a generic placeholder.
pub fn extract_description(page: &PageSnapshot, ctx: &ExtractContext) -> String {
    first_success("description", STRATEGIES, page, ctx)
        .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string())
}

/// Strips cookie banners, legal notices and navigation text. Returns an empty
/// string when too little survives to be a real description.
pub fn clean_description(desc: &str) -> String {
    let mut cleaned = desc.to_string();
    for pattern in BOILERPLATE.iter() {
        cleaned = pattern.replace_all(&cleaned, "").into_owned();
    }
    let cleaned = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");

    if cleaned.chars().count() < MIN_CLEANED_CHARS {
        return String::new();
    }
    cleaned
}

fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

fn non_empty(text: String) -> Option<String> {
    (!text.is_empty()).then_some(text)
}

fn meta_description(page: &PageSnapshot, _ctx: &ExtractContext) -> Option<String> {
    page.meta_content(&META_DESCRIPTION)
        .map(|c| clean_description(&c))
        .and_then(non_empty)
}

fn og_description(page: &PageSnapshot, _ctx: &ExtractContext) -> Option<String> {
    page.meta_content(&OG_DESCRIPTION)
        .map(|c| clean_description(&c))
        .and_then(non_empty)
}

fn about_section(page: &PageSnapshot, _ctx: &ExtractContext) -> Option<String> {
    for keyword in ABOUT_SECTION_KEYWORDS {
        let blocks: Vec<String> = page
            .document
            .select(&SECTION_BLOCKS)
            .filter(|el| {
                el.value()
                    .attr("class")
                    .map(|class| class.to_lowercase().contains(keyword))
                    .unwrap_or(false)
            })
            .take(2)
            .map(|el| element_text(&el))
            .collect();
        if blocks.is_empty() {
            continue;
        }

        let cleaned = clean_description(&blocks.join(" "));
        if cleaned.chars().count() > MIN_SECTION_CHARS {
            return Some(truncate_chars(&cleaned, MAX_DESCRIPTION_CHARS));
        }
    }
    None
}

fn leading_paragraphs(page: &PageSnapshot, _ctx: &ExtractContext) -> Option<String> {
    let joined = page
        .document
        .select(&PARAGRAPHS)
        .take(3)
        .map(|p| element_text(&p))
        .filter(|t| t.chars().count() > MIN_PARAGRAPH_CHARS)
        .collect::<Vec<_>>()
        .join(" ");

    non_empty(clean_description(&joined)).map(|c| truncate_chars(&c, MAX_DESCRIPTION_CHARS))
}

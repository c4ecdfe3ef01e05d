use super::page::PageSnapshot;
use super::{first_success, ExtractContext, Strategy};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Selector;

static OG_TITLE: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"meta[property="og:title"]"#).unwrap());
static TITLE: Lazy<Selector> = Lazy::new(|| Selector::parse("title").unwrap());
static H1: Lazy<Selector> = Lazy::new(|| Selector::parse("h1").unwrap());

static TITLE_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\s*[|\-]\s*(?:Home|Welcome|About).*$").unwrap());

const STRATEGIES: &[(&str, Strategy<String>)] = &[
    ("og:title", og_title),
    ("title", page_title),
    ("h1", first_heading),
];

pub fn extract_name(page: &PageSnapshot, ctx: &ExtractContext) -> Option<String> {
    first_success("name", STRATEGIES, page, ctx)
}

fn og_title(page: &PageSnapshot, _ctx: &ExtractContext) -> Option<String> {
    page.meta_content(&OG_TITLE)
}

fn page_title(page: &PageSnapshot, _ctx: &ExtractContext) -> Option<String> {
    let title = page.first_text(&TITLE)?;
    let stripped = strip_title_suffix(&title);
    (!stripped.is_empty()).then_some(stripped)
}

fn first_heading(page: &PageSnapshot, _ctx: &ExtractContext) -> Option<String> {
    page.first_text(&H1)
}

/// "Sunset Swim School | Home" -> "Sunset Swim School"
pub fn strip_title_suffix(title: &str) -> String {
    TITLE_SUFFIX.replace(title.trim(), "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn snapshot(html: &str) -> PageSnapshot {
        PageSnapshot::from_html(Url::parse("https://example.org/").unwrap(), html)
    }

    fn ctx() -> ExtractContext {
        ExtractContext::new("San Francisco")
    }

    #[test]
    fn test_og_title_wins() {
        let page = snapshot(
            r#"<html><head><meta property="og:title" content=" Bay Chess Club "><title>Other</title></head><body><h1>H</h1></body></html>"#,
        );
        assert_eq!(extract_name(&page, &ctx()).as_deref(), Some("Bay Chess Club"));
    }

    #[test]
    fn test_title_suffix_stripped() {
        let page = snapshot(
            "<html><head><title>Sunset Swim School | Home</title></head><body></body></html>",
        );
        assert_eq!(extract_name(&page, &ctx()).as_deref(), Some("Sunset Swim School"));
        assert_eq!(strip_title_suffix("Art Barn - Welcome to our studio"), "Art Barn");
        assert_eq!(strip_title_suffix("Kids Coding Lab"), "Kids Coding Lab");
    }

    #[test]
    fn test_falls_back_to_h1() {
        let page = snapshot("<html><body><h1>Mission Dance Collective</h1></body></html>");
        assert_eq!(
            extract_name(&page, &ctx()).as_deref(),
            Some("Mission Dance Collective")
        );
    }

    #[test]
    fn test_nothing_found() {
        let page = snapshot("<html><body><p>hello</p></body></html>");
        assert_eq!(extract_name(&page, &ctx()), None);
    }
}

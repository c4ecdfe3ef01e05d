use once_cell::sync::Lazy;
use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};
use url::Url;

static BODY_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("body").unwrap());
static ANCHOR_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").unwrap());

const SKIPPED_TAGS: &[&str] = &["script", "style", "noscript", "template", "svg", "head"];

const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "dd", "div", "dl", "dt", "fieldset",
    "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr",
    "li", "main", "nav", "ol", "p", "pre", "section", "table", "tbody", "td", "tfoot", "th",
    "thead", "tr", "ul",
];

/// An `<a href>` as found on the page, before any resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    pub href: String,
    pub text: String,
}

/// One fetched page, parsed once and shared by every extractor.
/// Lives only as long as the extraction of that page.
pub struct PageSnapshot {
    pub url: Url,
    pub document: Html,
    pub text: String,
    text_lower: String,
}

impl PageSnapshot {
    pub fn new(url: Url, html: &str, text: String) -> Self {
        let text_lower = text.to_lowercase();
        Self {
            url,
            document: Html::parse_document(html),
            text,
            text_lower,
        }
    }

    /// Parses the HTML and derives the plain text from it.
    pub fn from_html(url: Url, html: &str) -> Self {
        let document = Html::parse_document(html);
        let text = document_text(&document);
        let text_lower = text.to_lowercase();
        Self {
            url,
            document,
            text,
            text_lower,
        }
    }

    pub fn text_lower(&self) -> &str {
        &self.text_lower
    }

    pub fn anchors(&self) -> Vec<Anchor> {
        self.document
            .select(&ANCHOR_SELECTOR)
            .filter_map(|a| {
                let href = a.value().attr("href")?.trim().to_string();
                Some(Anchor {
                    href,
                    text: element_text(&a),
                })
            })
            .collect()
    }

    /// Content of the first `<meta>` matching the selector, trimmed and non-empty
    pub fn meta_content(&self, selector: &Selector) -> Option<String> {
        self.document
            .select(selector)
            .filter_map(|m| m.value().attr("content"))
            .map(|c| c.trim().to_string())
            .find(|c| !c.is_empty())
    }

    pub fn first_text(&self, selector: &Selector) -> Option<String> {
        self.document
            .select(selector)
            .next()
            .map(|el| element_text(&el))
            .filter(|t| !t.is_empty())
    }
}

/// Text of an element with whitespace collapsed to single spaces. Inline
/// markup joins as written ("15<sup>th</sup>" reads "15th").
pub fn element_text(element: &ElementRef) -> String {
    let mut raw = String::new();
    walk(*element, &mut raw);
    collapse_whitespace(&raw)
}

pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Renders the visible body text of an HTML page, one line per block element.
pub fn html_to_text(html: &str) -> String {
    document_text(&Html::parse_document(html))
}

fn document_text(document: &Html) -> String {
    let mut raw = String::new();
    match document.select(&BODY_SELECTOR).next() {
        Some(body) => walk(body, &mut raw),
        None => walk(document.root_element(), &mut raw),
    }

    raw.lines()
        .map(collapse_whitespace)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn walk(element: ElementRef, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) => {
                let name = el.name();
                if SKIPPED_TAGS.contains(&name) {
                    continue;
                }
                let block = BLOCK_TAGS.contains(&name);
                if block {
                    out.push('\n');
                }
                if let Some(child_element) = ElementRef::wrap(child) {
                    walk(child_element, out);
                }
                if block {
                    out.push('\n');
                }
            }
            _ => {}
        }
    }
}

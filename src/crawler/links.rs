use crate::constants::PRIORITY_LINK_KEYWORDS;
use crate::crawler::urls::{is_navigable, is_same_domain, normalize_url, resolve};
use crate::extract::page::PageSnapshot;
use std::collections::{HashMap, HashSet};

/// A same-domain link found on a page, keyed by its normalized URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkCandidate {
    pub url: String,
    pub anchor_text: String,
}

impl LinkCandidate {
    pub fn new(url: impl Into<String>, anchor_text: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            anchor_text: anchor_text.into(),
        }
    }

    pub fn is_registration_related(&self) -> bool {
        let url = self.url.to_lowercase();
        let text = self.anchor_text.to_lowercase();
        PRIORITY_LINK_KEYWORDS
            .iter()
            .any(|kw| url.contains(kw) || text.contains(kw))
    }
}

/// Collects crawlable same-domain links from a page in discovery order.
///
/// Duplicates (by normalized URL) are merged, keeping the first position and
/// accumulating anchor text so a later "Register" label still counts.
pub fn extract_links(
    page: &PageSnapshot,
    domain: &str,
    visited: &HashSet<String>,
) -> Vec<LinkCandidate> {
    let mut links: Vec<LinkCandidate> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for anchor in page.anchors() {
        if !is_navigable(&anchor.href) {
            continue;
        }
        let Some(resolved) = resolve(&page.url, &anchor.href) else {
            continue;
        };
        if !matches!(resolved.scheme(), "http" | "https") {
            continue;
        }
        if !is_same_domain(resolved.as_str(), domain) {
            continue;
        }

        let normalized = normalize_url(resolved.as_str());
        if visited.contains(&normalized) {
            continue;
        }

        match positions.get(&normalized) {
            Some(&idx) => {
                let existing = &mut links[idx];
                if !anchor.text.is_empty() && !existing.anchor_text.contains(&anchor.text) {
                    if !existing.anchor_text.is_empty() {
                        existing.anchor_text.push(' ');
                    }
                    existing.anchor_text.push_str(&anchor.text);
                }
            }
            None => {
                positions.insert(normalized.clone(), links.len());
                links.push(LinkCandidate::new(normalized, anchor.text));
            }
        }
    }

    links
}

/// Stable partition: registration-related links first, each group keeping
/// its discovery order.
pub fn prioritize_links(links: Vec<LinkCandidate>) -> Vec<LinkCandidate> {
    let (mut registration, other): (Vec<_>, Vec<_>) = links
        .into_iter()
        .partition(LinkCandidate::is_registration_related);
    registration.extend(other);
    registration
}

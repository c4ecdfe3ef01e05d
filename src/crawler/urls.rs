use crate::constants::{NON_NAVIGABLE_PREFIXES, SKIPPED_EXTENSIONS};
use crate::error::{Result, ScraperError};
use url::Url;

/// Prepends `https://` when the input has no scheme.
pub fn ensure_scheme(raw: &str) -> String {
    let trimmed = raw.trim();
    let lower = trimmed.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed.trim_start_matches('/'))
    }
}

pub fn parse_seed(raw: &str) -> Result<Url> {
    let with_scheme = ensure_scheme(raw);
    let url = Url::parse(&with_scheme)
        .map_err(|e| ScraperError::InvalidUrl(format!("{}: {}", raw, e)))?;
    if url.host_str().is_none() {
        return Err(ScraperError::InvalidUrl(format!("{}: missing host", raw)));
    }
    Ok(url)
}

/// Canonical key for the visited set: no fragment, no trailing slash,
/// scheme/host/port/path/query kept as-is.
pub fn normalize_url(raw: &str) -> String {
    let Ok(url) = Url::parse(raw) else {
        let without_fragment = raw.split('#').next().unwrap_or(raw);
        return without_fragment.trim_end_matches('/').to_string();
    };

    let mut normalized = format!("{}://", url.scheme());
    if let Some(host) = url.host_str() {
        normalized.push_str(host);
    }
    if let Some(port) = url.port() {
        normalized.push_str(&format!(":{}", port));
    }
    normalized.push_str(url.path().trim_end_matches('/'));
    if let Some(query) = url.query() {
        normalized.push('?');
        normalized.push_str(query);
    }
    normalized
}

/// Host-only comparison; a relative link (no host) counts as same-domain.
pub fn is_same_domain(candidate: &str, domain: &str) -> bool {
    match Url::parse(candidate) {
        Ok(url) => match url.host_str() {
            Some(host) => host.eq_ignore_ascii_case(domain),
            None => true,
        },
        Err(url::ParseError::RelativeUrlWithoutBase) => true,
        Err(_) => false,
    }
}

/// Whether an href can lead to another HTML page on the site.
pub fn is_navigable(href: &str) -> bool {
    let href = href.trim();
    if href.is_empty() {
        return false;
    }
    let lower = href.to_lowercase();
    if NON_NAVIGABLE_PREFIXES.iter().any(|p| lower.starts_with(p)) {
        return false;
    }

    // Judge the extension on the path alone so query strings don't hide it
    let path = lower
        .split(['?', '#'])
        .next()
        .unwrap_or(lower.as_str());
    !SKIPPED_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}

/// Resolves an href against the page it was found on.
pub fn resolve(base: &Url, href: &str) -> Option<Url> {
    let href = href.trim();
    if href.starts_with("//") {
        return Url::parse(&format!("{}:{}", base.scheme(), href)).ok();
    }
    base.join(href).ok()
}

pub fn origin_of(url: &Url) -> String {
    url.origin().ascii_serialization()
}

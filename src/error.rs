use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScraperError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Failed to fetch {url}: {message}")]
    Fetch { url: String, message: String },

    #[error("Page load timeout after {secs}s: {url}")]
    Timeout { url: String, secs: u64 },

    /// The page-fetching engine could not be started; aborts the whole crawl.
    #[error("Scraping failed: {0}")]
    EngineStartup(String),

    #[error("robots.txt check failed: {0}")]
    Robots(String),

    #[error("Provider store error: {0}")]
    Store(String),
}

impl ScraperError {
    /// Per-page failures are recovered by the crawl loop; everything else aborts it.
    pub fn is_page_level(&self) -> bool {
        matches!(
            self,
            ScraperError::Fetch { .. } | ScraperError::Timeout { .. } | ScraperError::Http(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ScraperError>;

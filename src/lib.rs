pub mod batch;
pub mod config;
pub mod constants;
pub mod crawler;
pub mod error;
pub mod extract;
pub mod logging;
pub mod types;

pub use crawler::{scrape_program, CrawlMode, CrawlOptions, CrawlPhase, CrawlReport, SiteCrawler};
pub use error::{Result, ScraperError};
pub use types::{ExtractionRecord, ScrapeOutput};

//! Bounded breadth-first crawl of one provider site.

pub mod fetcher;
pub mod frontier;
pub mod links;
pub mod robots;
pub mod urls;

use crate::config::{Config, CrawlConfig};
use crate::error::Result;
use crate::extract::page::PageSnapshot;
use crate::extract::registration::{
    extract_registration_dates, find_registration_url, RegistrationPass,
};
use crate::extract::{extract_static_fields, ExtractContext};
use crate::types::ExtractionRecord;
use chrono::{Local, NaiveDate};
use fetcher::{FetchedPage, PageFetcher, Pause, ReqwestFetcher};
use frontier::CrawlState;
use links::{extract_links, prioritize_links, LinkCandidate};
use serde::Serialize;
use tracing::{info, instrument, warn};
use url::Url;
use urls::{normalize_url, parse_seed};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CrawlMode {
    /// Follow same-domain links breadth-first
    #[default]
    Full,
    /// Fetch the seed page only
    SinglePage,
}

#[derive(Debug, Clone)]
pub struct CrawlOptions {
    pub max_pages: usize,
    pub max_depth: usize,
    pub region: String,
    pub mode: CrawlMode,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self::from_config(&CrawlConfig::default())
    }
}

impl CrawlOptions {
    pub fn from_config(config: &CrawlConfig) -> Self {
        Self {
            max_pages: config.max_pages,
            max_depth: config.max_depth,
            region: config.region.clone(),
            mode: CrawlMode::Full,
        }
    }
}

/// Where a crawl stands. The last three variants end the crawl.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CrawlPhase {
    NotStarted,
    Crawling,
    FoundReEnrollment,
    FoundNewRegistration,
    FoundBoth,
    PageLimitReached,
    FrontierExhausted,
}

impl CrawlPhase {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            CrawlPhase::FoundBoth | CrawlPhase::PageLimitReached | CrawlPhase::FrontierExhausted
        )
    }

    /// Phase after a page has been processed. Having both dates wins over
    /// hitting the page limit on the same page.
    pub fn after_page(record: &ExtractionRecord, pages_crawled: usize, max_pages: usize) -> Self {
        let re_enrollment = record.re_enrollment_date().is_some();
        let new_registration = record.new_registration_date().is_some();
        match (re_enrollment, new_registration) {
            (true, true) => CrawlPhase::FoundBoth,
            _ if pages_crawled >= max_pages => CrawlPhase::PageLimitReached,
            (true, false) => CrawlPhase::FoundReEnrollment,
            (false, true) => CrawlPhase::FoundNewRegistration,
            (false, false) => CrawlPhase::Crawling,
        }
    }
}

/// Result of one crawl
#[derive(Debug, Clone)]
pub struct CrawlReport {
    pub record: ExtractionRecord,
    pub pages_crawled: usize,
    pub phase: CrawlPhase,
    /// Whether the registration page was fetched after the crawl stopped
    pub fallback_ran: bool,
}

pub struct SiteCrawler<F> {
    fetcher: F,
    options: CrawlOptions,
    today: NaiveDate,
}

impl<F: PageFetcher> SiteCrawler<F> {
    pub fn new(fetcher: F, options: CrawlOptions) -> Self {
        Self {
            fetcher,
            options,
            today: Local::now().date_naive(),
        }
    }

    /// Pins "today" for date acceptance
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    /// Crawls from `seed` until a stop condition. The fetcher session is
    /// opened first and closed on every exit path.
    #[instrument(skip(self), fields(max_pages = self.options.max_pages, max_depth = self.options.max_depth))]
    pub async fn crawl(&self, seed: &str) -> Result<CrawlReport> {
        let seed_url = parse_seed(seed)?;
        self.fetcher.open().await?;
        let report = self.run(&seed_url).await;
        self.fetcher.close().await;
        report
    }

    async fn run(&self, seed_url: &Url) -> Result<CrawlReport> {
        robots::check_robots(&self.fetcher, seed_url).await;

        let mut domain = seed_url.host_str().unwrap_or_default().to_lowercase();
        let ctx = ExtractContext::new(self.options.region.clone());
        let mut record = ExtractionRecord::new();
        let mut state = CrawlState::new(normalize_url(seed_url.as_str()));
        let mut phase = CrawlPhase::NotStarted;

        info!(seed = %seed_url, "Starting crawl");

        while let Some((url, depth)) = state.next_unvisited() {
            if state.pages_crawled() >= self.options.max_pages {
                phase = CrawlPhase::PageLimitReached;
                break;
            }
            if depth > self.options.max_depth || !state.begin_page(&url) {
                continue;
            }
            info!(
                url = %url,
                depth,
                page = state.pages_crawled(),
                max_pages = self.options.max_pages,
                "Crawling page"
            );

            let fetched = self.fetcher.fetch(&url).await;
            match fetched {
                Ok(page) => {
                    let first_page = record.crawled_pages.is_empty();
                    if first_page {
                        rebase_after_redirect(&page.url, &mut domain, &mut state);
                    }
                    let links = self.process_page(&url, page, depth, first_page, &ctx, &domain, &state, &mut record);
                    record.crawled_pages.push(url.clone());
                    state.enqueue(links, depth + 1);
                }
                Err(e) if e.is_page_level() => {
                    warn!(url = %url, error = %e, "Failed to fetch page, skipping");
                }
                Err(e) => return Err(e),
            }
            self.fetcher.pause(Pause::Crawl).await;

            phase = CrawlPhase::after_page(&record, state.pages_crawled(), self.options.max_pages);
            if phase.is_terminal() {
                break;
            }
        }

        if !phase.is_terminal() {
            phase = CrawlPhase::FrontierExhausted;
        }
        info!(?phase, pages = state.pages_crawled(), "Crawl stopped");

        let fallback_ran = self.registration_fallback(&mut state, &mut record).await?;
        if fallback_ran && record.has_both_dates() {
            phase = CrawlPhase::FoundBoth;
        }

        Ok(CrawlReport {
            record,
            pages_crawled: state.pages_crawled(),
            phase,
            fallback_ran,
        })
    }

    /// Runs every extractor that applies to a freshly fetched page and returns
    /// the links to queue next. Static fields come from the first page only.
    #[allow(clippy::too_many_arguments)]
    fn process_page(
        &self,
        url: &str,
        page: FetchedPage,
        depth: usize,
        first_page: bool,
        ctx: &ExtractContext,
        domain: &str,
        state: &CrawlState,
        record: &mut ExtractionRecord,
    ) -> Vec<LinkCandidate> {
        let Some(base) = Url::parse(&page.url).or_else(|_| Url::parse(url)).ok() else {
            warn!(url, "Fetched page has an unparseable URL, skipping extraction");
            return Vec::new();
        };
        let snapshot = PageSnapshot::new(base, &page.html, page.text);

        if first_page {
            extract_static_fields(&snapshot, ctx, record);
        }
        find_registration_url(&snapshot, record);
        extract_registration_dates(
            snapshot.text_lower(),
            record,
            self.today,
            RegistrationPass::Crawl,
        );

        let expand = self.options.mode == CrawlMode::Full && depth < self.options.max_depth;
        if !expand {
            return Vec::new();
        }
        prioritize_links(extract_links(&snapshot, domain, state.visited()))
    }

    /// One direct visit to a registration page the crawl never reached, when a
    /// date is still missing.
    async fn registration_fallback(
        &self,
        state: &mut CrawlState,
        record: &mut ExtractionRecord,
    ) -> Result<bool> {
        let Some(registration_url) = record.registration_url.clone() else {
            return Ok(false);
        };
        let key = normalize_url(&registration_url);
        if state.is_visited(&key) || record.has_both_dates() {
            return Ok(false);
        }

        info!(url = %registration_url, "Checking registration page for dates");
        state.mark_visited(&key);
        match self.fetcher.fetch(&registration_url).await {
            Ok(page) => {
                record.crawled_pages.push(key);
                let text_lower = page.text.to_lowercase();
                extract_registration_dates(
                    &text_lower,
                    record,
                    self.today,
                    RegistrationPass::RegistrationPage,
                );
            }
            Err(e) if e.is_page_level() => {
                warn!(url = %registration_url, error = %e, "Failed to fetch registration page");
            }
            Err(e) => return Err(e),
        }
        self.fetcher.pause(Pause::RegistrationPage).await;
        Ok(true)
    }
}

/// Follows a redirect on the first page: links are resolved against the
/// final URL, so its host becomes the crawl domain (example.org ->
/// www.example.org). The final URL is marked visited as well.
fn rebase_after_redirect(final_url: &str, domain: &mut String, state: &mut CrawlState) {
    let Ok(final_url) = Url::parse(final_url) else {
        return;
    };
    state.mark_visited(&normalize_url(final_url.as_str()));

    let Some(host) = final_url.host_str().map(str::to_lowercase) else {
        return;
    };
    if host != *domain {
        info!(original = %domain, resolved = %host, "Crawl domain resolved after redirect");
        *domain = host;
    }
}

/// Scrapes one provider site over HTTP with settings from `config`.
pub async fn scrape_program(
    seed: &str,
    options: CrawlOptions,
    config: &Config,
) -> Result<ExtractionRecord> {
    let fetcher = ReqwestFetcher::launch(&config.fetch)?;
    let report = SiteCrawler::new(fetcher, options).crawl(seed).await?;
    info!(
        pages = report.pages_crawled,
        phase = ?report.phase,
        fallback = report.fallback_ran,
        "Scrape finished"
    );
    Ok(report.record)
}

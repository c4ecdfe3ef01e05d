//! Batch enrichment: crawl every stored provider that has a website and fill
//! in registration fields the store doesn't have yet.

use crate::config::Config;
use crate::crawler::urls::ensure_scheme;
use crate::crawler::{scrape_program, CrawlOptions};
use crate::error::{Result, ScraperError};
use crate::types::ExtractionRecord;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

/// A provider row as stored. Unknown fields are carried through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provider {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub provider_name: Option<String>,
    #[serde(default)]
    pub provider_website: Option<String>,
    #[serde(default)]
    pub registration_url: Option<String>,
    #[serde(default)]
    pub re_enrollment_date: Option<NaiveDate>,
    #[serde(default)]
    pub new_registration_date: Option<NaiveDate>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Provider {
    pub fn website(&self) -> Option<&str> {
        self.provider_website
            .as_deref()
            .map(str::trim)
            .filter(|w| !w.is_empty())
    }

    pub fn display_name(&self) -> &str {
        self.provider_name
            .as_deref()
            .or(self.name.as_deref())
            .unwrap_or("Unknown")
    }

    pub fn is_missing_registration_info(&self) -> bool {
        self.registration_url.as_deref().map_or(true, str::is_empty)
            || self.re_enrollment_date.is_none()
            || self.new_registration_date.is_none()
    }
}

/// Fields to write back for one provider. Only fields the provider lacks are
/// ever present.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProviderUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registration_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub re_enrollment_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_registration_date: Option<NaiveDate>,
}

impl ProviderUpdate {
    pub fn diff(provider: &Provider, record: &ExtractionRecord) -> Self {
        let has_url = provider
            .registration_url
            .as_deref()
            .is_some_and(|u| !u.is_empty());
        Self {
            registration_url: record.registration_url.clone().filter(|_| !has_url),
            re_enrollment_date: record
                .re_enrollment_date()
                .filter(|_| provider.re_enrollment_date.is_none()),
            new_registration_date: record
                .new_registration_date()
                .filter(|_| provider.new_registration_date.is_none()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.registration_url.is_none()
            && self.re_enrollment_date.is_none()
            && self.new_registration_date.is_none()
    }

    pub fn apply_to(&self, provider: &mut Provider) {
        if let Some(url) = &self.registration_url {
            provider.registration_url = Some(url.clone());
        }
        if let Some(date) = self.re_enrollment_date {
            provider.re_enrollment_date = Some(date);
        }
        if let Some(date) = self.new_registration_date {
            provider.new_registration_date = Some(date);
        }
    }
}

/// The registration details a crawl turned up
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScrapedFields {
    pub registration_url: Option<String>,
    pub re_enrollment_date: Option<NaiveDate>,
    pub new_registration_date: Option<NaiveDate>,
    pub crawled_pages: Vec<String>,
}

impl From<&ExtractionRecord> for ScrapedFields {
    fn from(record: &ExtractionRecord) -> Self {
        Self {
            registration_url: record.registration_url.clone(),
            re_enrollment_date: record.re_enrollment_date(),
            new_registration_date: record.new_registration_date(),
            crawled_pages: record.crawled_pages.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProviderResult {
    pub id: String,
    pub name: Option<String>,
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub found: Option<ScrapedFields>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updates: Option<ProviderUpdate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProviderResult {
    fn for_provider(provider: &Provider) -> Self {
        Self {
            id: provider.id.clone(),
            name: provider.provider_name.clone(),
            website: provider.provider_website.clone(),
            found: None,
            updates: None,
            error: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub scraped: usize,
    pub updated: usize,
    pub failed: usize,
    pub providers: Vec<ProviderResult>,
}

#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub limit: Option<usize>,
    pub crawl: CrawlOptions,
    pub dry_run: bool,
    /// Pause between providers
    pub delay: Duration,
    pub only_missing: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            limit: None,
            crawl: CrawlOptions::default(),
            dry_run: false,
            delay: Duration::from_secs(2),
            only_missing: false,
        }
    }
}

/// Where providers are listed from and written back to
#[async_trait]
pub trait ProviderStore: Send + Sync {
    /// Providers that have a website, at most `limit` of them
    async fn list_providers(&self, limit: Option<usize>) -> Result<Vec<Provider>>;
    async fn update_provider(&self, id: &str, update: &ProviderUpdate) -> Result<()>;
}

/// Crawls one provider website
#[async_trait]
pub trait ProviderScraper: Send + Sync {
    async fn scrape(&self, website: &str, options: &CrawlOptions) -> Result<ExtractionRecord>;
}

/// Provider store backed by a JSON array on disk. Each update rewrites the file.
pub struct JsonFileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    async fn read_all(&self) -> Result<Vec<Provider>> {
        let content = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            ScraperError::Store(format!("Failed to read {}: {}", self.path.display(), e))
        })?;
        Ok(serde_json::from_str(&content)?)
    }
}

#[async_trait]
impl ProviderStore for JsonFileStore {
    async fn list_providers(&self, limit: Option<usize>) -> Result<Vec<Provider>> {
        let providers = self
            .read_all()
            .await?
            .into_iter()
            .filter(|p| p.website().is_some())
            .take(limit.unwrap_or(usize::MAX))
            .collect();
        Ok(providers)
    }

    async fn update_provider(&self, id: &str, update: &ProviderUpdate) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut providers = self.read_all().await?;
        let provider = providers
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| ScraperError::Store(format!("No provider with id {}", id)))?;
        update.apply_to(provider);

        let content = serde_json::to_string_pretty(&providers)?;
        tokio::fs::write(&self.path, content).await?;
        debug!(id, path = %self.path.display(), "Provider updated");
        Ok(())
    }
}

/// Crawls over HTTP using the loaded configuration
pub struct SiteScraper {
    config: Config,
}

impl SiteScraper {
    pub fn new(config: Config) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ProviderScraper for SiteScraper {
    async fn scrape(&self, website: &str, options: &CrawlOptions) -> Result<ExtractionRecord> {
        scrape_program(website, options.clone(), &self.config).await
    }
}

/// Crawls each provider in turn. A failed crawl or failed write is counted
/// and the batch moves on to the next provider.
pub async fn run_batch<S, P>(store: &S, scraper: &P, options: &BatchOptions) -> Result<BatchSummary>
where
    S: ProviderStore + ?Sized,
    P: ProviderScraper + ?Sized,
{
    let mut providers = store.list_providers(options.limit).await?;
    info!("Found {} providers with websites", providers.len());

    if options.only_missing {
        providers.retain(Provider::is_missing_registration_info);
        info!(
            "Filtered to {} providers missing registration info",
            providers.len()
        );
    }

    let total = providers.len();
    let mut summary = BatchSummary {
        total,
        ..BatchSummary::default()
    };

    for (i, provider) in providers.iter().enumerate() {
        let website = ensure_scheme(provider.website().unwrap_or_default());
        info!(
            progress = %format!("{}/{}", i + 1, total),
            provider = provider.display_name(),
            website = %website,
            "Scraping provider"
        );

        let mut result = ProviderResult::for_provider(provider);
        match scraper.scrape(&website, &options.crawl).await {
            Ok(record) => {
                summary.scraped += 1;
                result.found = Some(ScrapedFields::from(&record));

                let update = ProviderUpdate::diff(provider, &record);
                if !update.is_empty() {
                    let changes = serde_json::to_string(&update)?;
                    if options.dry_run {
                        info!(id = %provider.id, "Would update: {}", changes);
                    } else {
                        match store.update_provider(&provider.id, &update).await {
                            Ok(()) => {
                                summary.updated += 1;
                                info!(id = %provider.id, "Updated: {}", changes);
                            }
                            Err(e) => {
                                error!(id = %provider.id, error = %e, "Error updating provider");
                                summary.failed += 1;
                                result.error = Some(e.to_string());
                            }
                        }
                    }
                    result.updates = Some(update);
                }
            }
            Err(e) => {
                warn!(website = %website, error = %e, "Error scraping provider");
                summary.failed += 1;
                result.error = Some(e.to_string());
            }
        }
        summary.providers.push(result);

        if i + 1 < total && !options.delay.is_zero() {
            tokio::time::sleep(options.delay).await;
        }
    }

    info!(
        total = summary.total,
        scraped = summary.scraped,
        updated = summary.updated,
        failed = summary.failed,
        "Batch finished"
    );
    Ok(summary)
}

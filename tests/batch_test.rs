use async_trait::async_trait;
use chrono::NaiveDate;
use program_scraper::batch::{
    run_batch, BatchOptions, JsonFileStore, Provider, ProviderScraper, ProviderStore,
    ProviderUpdate,
};
use program_scraper::{CrawlOptions, ExtractionRecord, Result, ScraperError};
use serde_json::Value;
use std::collections::HashMap;
use std::io::Write;
use std::sync::Mutex;
use std::time::Duration;
use tempfile::NamedTempFile;

const PROVIDERS: &str = r#"[
    {"id": "p1", "provider_name": "Sunset Swim", "provider_website": "swim.example.org", "age_range": "5-12"},
    {"id": "p2", "name": "Bay Chess", "provider_website": "https://chess.example.org",
     "registration_url": "https://chess.example.org/join",
     "re_enrollment_date": "2026-01-10", "new_registration_date": "2026-02-10"},
    {"id": "p3", "name": "No Site"},
    {"id": "p4", "name": "Down Studio", "provider_website": "https://down.example.org"}
]"#;

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Returns canned records per website and remembers what it was asked for
#[derive(Default)]
struct StubScraper {
    records: HashMap<String, ExtractionRecord>,
    requested: Mutex<Vec<String>>,
}

impl StubScraper {
    fn new() -> Self {
        let mut swim = ExtractionRecord::new();
        swim.registration_url = Some("https://swim.example.org/register".into());
        swim.record_re_enrollment_date(ymd(2026, 1, 15));
        swim.record_new_registration_date(ymd(2026, 2, 1));

        let mut chess = ExtractionRecord::new();
        chess.registration_url = Some("https://chess.example.org/signup".into());
        chess.record_new_registration_date(ymd(2026, 3, 1));

        let mut records = HashMap::new();
        records.insert("https://swim.example.org".to_string(), swim);
        records.insert("https://chess.example.org".to_string(), chess);
        Self {
            records,
            requested: Mutex::new(Vec::new()),
        }
    }

    fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProviderScraper for StubScraper {
    async fn scrape(&self, website: &str, _options: &CrawlOptions) -> Result<ExtractionRecord> {
        self.requested.lock().unwrap().push(website.to_string());
        self.records
            .get(website)
            .cloned()
            .ok_or_else(|| ScraperError::EngineStartup(format!("cannot reach {}", website)))
    }
}

fn providers_file() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(PROVIDERS.as_bytes()).unwrap();
    file
}

fn options() -> BatchOptions {
    BatchOptions {
        delay: Duration::ZERO,
        ..BatchOptions::default()
    }
}

fn stored(file: &NamedTempFile) -> Vec<Value> {
    let content = std::fs::read_to_string(file.path()).unwrap();
    serde_json::from_str(&content).unwrap()
}

#[tokio::test]
async fn test_batch_fills_missing_fields_and_counts_failures() {
    let file = providers_file();
    let store = JsonFileStore::new(file.path());
    let scraper = StubScraper::new();

    let summary = run_batch(&store, &scraper, &options()).await.unwrap();

    assert_eq!(summary.total, 3);
    assert_eq!(summary.scraped, 2);
    assert_eq!(summary.updated, 1);
    assert_eq!(summary.failed, 1);
    assert_eq!(
        scraper.requested(),
        vec![
            "https://swim.example.org",
            "https://chess.example.org",
            "https://down.example.org"
        ]
    );

    let rows = stored(&file);
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0]["registration_url"], "https://swim.example.org/register");
    assert_eq!(rows[0]["re_enrollment_date"], "2026-01-15");
    assert_eq!(rows[0]["new_registration_date"], "2026-02-01");
    assert_eq!(rows[0]["age_range"], "5-12");
    // already complete, nothing overwritten
    assert_eq!(rows[1]["registration_url"], "https://chess.example.org/join");
    assert_eq!(rows[1]["new_registration_date"], "2026-02-10");

    let down = &summary.providers[2];
    assert_eq!(down.id, "p4");
    assert!(down.found.is_none());
    assert!(down.error.as_deref().unwrap().contains("cannot reach"));
}

#[tokio::test]
async fn test_dry_run_leaves_store_untouched() {
    let file = providers_file();
    let store = JsonFileStore::new(file.path());
    let scraper = StubScraper::new();
    let opts = BatchOptions {
        dry_run: true,
        ..options()
    };

    let summary = run_batch(&store, &scraper, &opts).await.unwrap();

    assert_eq!(summary.updated, 0);
    assert_eq!(std::fs::read_to_string(file.path()).unwrap(), PROVIDERS);
    let updates = summary.providers[0].updates.as_ref().unwrap();
    assert_eq!(
        updates.registration_url.as_deref(),
        Some("https://swim.example.org/register")
    );
    assert!(summary.providers[1].updates.is_none());
}

#[tokio::test]
async fn test_only_missing_skips_complete_providers() {
    let file = providers_file();
    let store = JsonFileStore::new(file.path());
    let scraper = StubScraper::new();
    let opts = BatchOptions {
        only_missing: true,
        ..options()
    };

    let summary = run_batch(&store, &scraper, &opts).await.unwrap();

    assert_eq!(summary.total, 2);
    assert_eq!(
        scraper.requested(),
        vec!["https://swim.example.org", "https://down.example.org"]
    );
}

#[tokio::test]
async fn test_limit_applies_to_providers_with_websites() {
    let file = providers_file();
    let store = JsonFileStore::new(file.path());

    let listed = store.list_providers(Some(2)).await.unwrap();
    let ids: Vec<&str> = listed.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["p1", "p2"]);

    let all = store.list_providers(None).await.unwrap();
    assert_eq!(all.len(), 3);
}

#[tokio::test]
async fn test_update_unknown_provider_is_an_error() {
    let file = providers_file();
    let store = JsonFileStore::new(file.path());
    let update = ProviderUpdate {
        re_enrollment_date: Some(ymd(2026, 1, 1)),
        ..ProviderUpdate::default()
    };

    let result = store.update_provider("missing", &update).await;
    assert!(matches!(result, Err(ScraperError::Store(_))));
}

/// Lists fixed providers and rejects every write
struct ReadOnlyStore {
    providers: Vec<Provider>,
}

#[async_trait]
impl ProviderStore for ReadOnlyStore {
    async fn list_providers(&self, _limit: Option<usize>) -> Result<Vec<Provider>> {
        Ok(self.providers.clone())
    }

    async fn update_provider(&self, id: &str, _update: &ProviderUpdate) -> Result<()> {
        Err(ScraperError::Store(format!("{} is read-only", id)))
    }
}

#[tokio::test]
async fn test_failed_write_counts_as_failure() {
    let providers: Vec<Provider> = serde_json::from_str(PROVIDERS).unwrap();
    let store = ReadOnlyStore {
        providers: providers.into_iter().take(1).collect(),
    };
    let scraper = StubScraper::new();

    let summary = run_batch(&store, &scraper, &options()).await.unwrap();

    assert_eq!(summary.scraped, 1);
    assert_eq!(summary.updated, 0);
    assert_eq!(summary.failed, 1);
    assert!(summary.providers[0]
        .error
        .as_deref()
        .unwrap()
        .contains("read-only"));
}

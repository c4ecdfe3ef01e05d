use crate::constants::{DEFAULT_REGION, DEFAULT_USER_AGENT};
use crate::error::{Result, ScraperError};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CONFIG_PATH: &str = "scraper.toml";
pub const CONFIG_PATH_ENV: &str = "SCRAPER_CONFIG";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawl: CrawlConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub batch: BatchConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CrawlConfig {
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    #[serde(default = "default_region")]
    pub region: String,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            max_pages: default_max_pages(),
            max_depth: default_max_depth(),
            region: default_region(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_load_timeout_secs")]
    pub load_timeout_secs: u64,
    /// Best-effort wait for the body to stop streaming; never fails a page
    #[serde(default = "default_idle_timeout_secs")]
    pub idle_timeout_secs: u64,
    #[serde(default = "default_politeness_min_ms")]
    pub politeness_min_ms: u64,
    #[serde(default = "default_politeness_max_ms")]
    pub politeness_max_ms: u64,
    #[serde(default = "default_registration_politeness_min_ms")]
    pub registration_politeness_min_ms: u64,
    #[serde(default = "default_registration_politeness_max_ms")]
    pub registration_politeness_max_ms: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            load_timeout_secs: default_load_timeout_secs(),
            idle_timeout_secs: default_idle_timeout_secs(),
            politeness_min_ms: default_politeness_min_ms(),
            politeness_max_ms: default_politeness_max_ms(),
            registration_politeness_min_ms: default_registration_politeness_min_ms(),
            registration_politeness_max_ms: default_registration_politeness_max_ms(),
        }
    }
}

impl FetchConfig {
    pub fn load_timeout(&self) -> Duration {
        Duration::from_secs(self.load_timeout_secs)
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    /// A config with every politeness delay disabled, for tests and local fixtures
    pub fn without_delays() -> Self {
        Self {
            politeness_min_ms: 0,
            politeness_max_ms: 0,
            registration_politeness_min_ms: 0,
            registration_politeness_max_ms: 0,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BatchConfig {
    #[serde(default = "default_batch_delay_secs")]
    pub delay_secs: f64,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            delay_secs: default_batch_delay_secs(),
        }
    }
}

fn default_max_pages() -> usize {
    10
}

fn default_max_depth() -> usize {
    2
}

fn default_region() -> String {
    DEFAULT_REGION.to_string()
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_load_timeout_secs() -> u64 {
    15
}

fn default_idle_timeout_secs() -> u64 {
    5
}

fn default_politeness_min_ms() -> u64 {
    500
}

fn default_politeness_max_ms() -> u64 {
    1500
}

fn default_registration_politeness_min_ms() -> u64 {
    1000
}

fn default_registration_politeness_max_ms() -> u64 {
    2000
}

fn default_batch_delay_secs() -> f64 {
    2.0
}

impl Config {
    /// Loads `scraper.toml` (or the file named by `SCRAPER_CONFIG`), falling back
    /// to defaults when no file exists.
    pub fn load() -> Result<Self> {
        let path = std::env::var(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));

        if !path.exists() {
            tracing::debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let config_content = fs::read_to_string(path).map_err(|e| {
            ScraperError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        let config: Config = toml::from_str(&config_content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.crawl.max_pages == 0 {
            return Err(ScraperError::Config("crawl.max_pages must be positive".into()));
        }
        if self.fetch.load_timeout_secs == 0 {
            return Err(ScraperError::Config(
                "fetch.load_timeout_secs must be positive".into(),
            ));
        }
        if self.fetch.politeness_min_ms > self.fetch.politeness_max_ms {
            return Err(ScraperError::Config(
                "fetch.politeness_min_ms exceeds fetch.politeness_max_ms".into(),
            ));
        }
        if self.fetch.registration_politeness_min_ms > self.fetch.registration_politeness_max_ms {
            return Err(ScraperError::Config(
                "fetch.registration_politeness_min_ms exceeds fetch.registration_politeness_max_ms"
                    .into(),
            ));
        }
        if !(self.batch.delay_secs >= 0.0 && self.batch.delay_secs.is_finite()) {
            return Err(ScraperError::Config(
                "batch.delay_secs must be a non-negative number".into(),
            ));
        }
        Ok(())
    }
}

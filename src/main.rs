use anyhow::Context;
use clap::{Parser, Subcommand};
use program_scraper::batch::{run_batch, BatchOptions, JsonFileStore, SiteScraper};
use program_scraper::config::Config;
use program_scraper::{logging, scrape_program, CrawlMode, CrawlOptions, ScrapeOutput};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "program_scraper")]
#[command(about = "Crawls program provider websites for registration links and dates")]
#[command(version = "0.1.0")]
struct Cli {
    /// Config file (defaults to scraper.toml or $SCRAPER_CONFIG)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape a single provider website and print the record as JSON
    Scrape {
        url: String,
        #[arg(long)]
        max_pages: Option<usize>,
        #[arg(long)]
        max_depth: Option<usize>,
        /// Only look at the given page, don't follow links
        #[arg(long)]
        no_crawl: bool,
        /// City used for address matching and as the default neighborhood
        #[arg(long)]
        region: Option<String>,
    },
    /// Scrape every provider in a JSON file and fill in missing registration info
    Batch {
        /// JSON array of providers; updated in place
        #[arg(long)]
        providers: PathBuf,
        #[arg(long)]
        limit: Option<usize>,
        #[arg(long)]
        max_pages: Option<usize>,
        #[arg(long)]
        max_depth: Option<usize>,
        /// Report the updates without writing them
        #[arg(long)]
        dry_run: bool,
        /// Seconds to wait between providers
        #[arg(long)]
        delay: Option<f64>,
        /// Only scrape providers missing a registration URL or date
        #[arg(long)]
        only_missing: bool,
    },
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<Config> {
    let config = match path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    };
    config.context("Failed to load configuration")
}

fn crawl_options(
    config: &Config,
    max_pages: Option<usize>,
    max_depth: Option<usize>,
    region: Option<String>,
    mode: CrawlMode,
) -> anyhow::Result<CrawlOptions> {
    let mut options = CrawlOptions::from_config(&config.crawl);
    if let Some(max_pages) = max_pages {
        anyhow::ensure!(max_pages > 0, "--max-pages must be positive");
        options.max_pages = max_pages;
    }
    if let Some(max_depth) = max_depth {
        options.max_depth = max_depth;
    }
    if let Some(region) = region {
        options.region = region;
    }
    options.mode = mode;
    Ok(options)
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenv::dotenv().ok();
    let _log_guard = logging::init_logging();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref())?;

    match cli.command {
        Commands::Scrape {
            url,
            max_pages,
            max_depth,
            no_crawl,
            region,
        } => {
            let mode = if no_crawl {
                CrawlMode::SinglePage
            } else {
                CrawlMode::Full
            };
            let options = crawl_options(&config, max_pages, max_depth, region, mode)?;

            let result = scrape_program(&url, options, &config).await;
            if let Err(e) = &result {
                error!("Scraping {} failed: {}", url, e);
            }
            let failed = result.is_err();
            let output = ScrapeOutput::from(result);
            println!("{}", serde_json::to_string_pretty(&output)?);

            Ok(if failed {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            })
        }
        Commands::Batch {
            providers,
            limit,
            max_pages,
            max_depth,
            dry_run,
            delay,
            only_missing,
        } => {
            let delay_secs = delay.unwrap_or(config.batch.delay_secs);
            anyhow::ensure!(
                delay_secs.is_finite() && delay_secs >= 0.0,
                "--delay must be a non-negative number of seconds"
            );
            let options = BatchOptions {
                limit,
                crawl: crawl_options(&config, max_pages, max_depth, None, CrawlMode::Full)?,
                dry_run,
                delay: Duration::from_secs_f64(delay_secs),
                only_missing,
            };

            let store = JsonFileStore::new(providers.clone());
            let scraper = SiteScraper::new(config);
            let summary = run_batch(&store, &scraper, &options)
                .await
                .with_context(|| format!("Batch run over {} failed", providers.display()))?;

            info!("Total providers: {}", summary.total);
            info!("Successfully scraped: {}", summary.scraped);
            info!("Updated: {}", summary.updated);
            info!("Failed: {}", summary.failed);

            println!("{}", serde_json::to_string_pretty(&summary)?);
            Ok(ExitCode::SUCCESS)
        }
    }
}

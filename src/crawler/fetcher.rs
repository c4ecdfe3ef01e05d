use crate::config::FetchConfig;
use crate::constants::DEFAULT_USER_AGENT;
use crate::error::{Result, ScraperError};
use crate::extract::page::html_to_text;
use async_trait::async_trait;
use rand::Rng;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use std::time::Duration;
use tracing::{debug, instrument, warn};

const HTML_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// A page as delivered by a fetcher: the final URL after redirects, the raw
/// HTML and its rendered plain text.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub url: String,
    pub html: String,
    pub text: String,
}

impl FetchedPage {
    pub fn from_html(url: impl Into<String>, html: impl Into<String>) -> Self {
        let html = html.into();
        let text = html_to_text(&html);
        Self {
            url: url.into(),
            html,
            text,
        }
    }
}

/// Which politeness range applies after a fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pause {
    Crawl,
    RegistrationPage,
}

/// The page-fetching engine behind a crawl. One session per crawl: `open` is
/// called before the first fetch and `close` on every exit path.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Starts the session. Failure here is fatal for the crawl.
    async fn open(&self) -> Result<()> {
        Ok(())
    }

    async fn fetch(&self, url: &str) -> Result<FetchedPage>;

    async fn fetch_robots(&self, robots_url: &str) -> Result<String>;

    /// Randomized delay between fetches
    async fn pause(&self, _kind: Pause) {}

    async fn close(&self) {}

    fn user_agent(&self) -> &str {
        DEFAULT_USER_AGENT
    }
}

/// Plain HTTP fetcher built on `reqwest`
pub struct ReqwestFetcher {
    client: reqwest::Client,
    config: FetchConfig,
}

impl ReqwestFetcher {
    /// Builds the HTTP client. An error here means no page can be fetched at
    /// all and is reported as an engine startup failure.
    pub fn launch(config: &FetchConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(HTML_ACCEPT));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .gzip(true)
            .deflate(true)
            .connect_timeout(config.load_timeout())
            .build()
            .map_err(|e| ScraperError::EngineStartup(e.to_string()))?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    async fn send(&self, url: &str) -> Result<reqwest::Response> {
        let load_timeout = self.config.load_timeout();
        let response = tokio::time::timeout(load_timeout, self.client.get(url).send())
            .await
            .map_err(|_| ScraperError::Timeout {
                url: url.to_string(),
                secs: self.config.load_timeout_secs,
            })?
            .map_err(|e| ScraperError::Fetch {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScraperError::Fetch {
                url: url.to_string(),
                message: format!("HTTP {}", status),
            });
        }
        Ok(response)
    }

    /// Streams the body until it ends or the idle deadline passes. The
    /// deadline starts when the headers arrive and is not extended by later
    /// chunks; once it passes the page continues with what arrived.
    async fn read_body(&self, url: &str, mut response: reqwest::Response) -> Result<Vec<u8>> {
        let deadline = tokio::time::Instant::now() + self.config.idle_timeout();
        let mut body = Vec::new();
        loop {
            match tokio::time::timeout_at(deadline, response.chunk()).await {
                Ok(Ok(Some(chunk))) => body.extend_from_slice(&chunk),
                Ok(Ok(None)) => break,
                Ok(Err(e)) => {
                    return Err(ScraperError::Fetch {
                        url: url.to_string(),
                        message: e.to_string(),
                    })
                }
                Err(_) => {
                    debug!(
                        url,
                        bytes = body.len(),
                        "Body still streaming at idle deadline, continuing with partial content"
                    );
                    break;
                }
            }
        }
        Ok(body)
    }
}

#[async_trait]
impl PageFetcher for ReqwestFetcher {
    #[instrument(skip(self))]
    async fn fetch(&self, url: &str) -> Result<FetchedPage> {
        let response = self.send(url).await?;
        let final_url = response.url().to_string();
        let body = self.read_body(url, response).await?;
        let html = String::from_utf8_lossy(&body).into_owned();
        debug!(bytes = body.len(), final_url = %final_url, "Page fetched");
        Ok(FetchedPage::from_html(final_url, html))
    }

    async fn fetch_robots(&self, robots_url: &str) -> Result<String> {
        let response = self.send(robots_url).await.map_err(|e| ScraperError::Robots(e.to_string()))?;
        response
            .text()
            .await
            .map_err(|e| ScraperError::Robots(e.to_string()))
    }

    async fn pause(&self, kind: Pause) {
        let (min_ms, max_ms) = match kind {
            Pause::Crawl => (self.config.politeness_min_ms, self.config.politeness_max_ms),
            Pause::RegistrationPage => (
                self.config.registration_politeness_min_ms,
                self.config.registration_politeness_max_ms,
            ),
        };
        let delay = jitter(min_ms, max_ms);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    async fn close(&self) {
        debug!("HTTP session closed");
    }

    fn user_agent(&self) -> &str {
        &self.config.user_agent
    }
}

/// Uniform random delay within `[min_ms, max_ms]`
pub fn jitter(min_ms: u64, max_ms: u64) -> Duration {
    if max_ms <= min_ms {
        if max_ms < min_ms {
            warn!(min_ms, max_ms, "Politeness range is inverted, using the minimum");
        }
        return Duration::from_millis(min_ms);
    }
    Duration::from_millis(rand::thread_rng().gen_range(min_ms..=max_ms))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    #[test]
    fn test_jitter_stays_in_range() {
        for _ in 0..50 {
            let delay = jitter(500, 1500);
            assert!(delay >= Duration::from_millis(500));
            assert!(delay <= Duration::from_millis(1500));
        }
        assert_eq!(jitter(0, 0), Duration::ZERO);
    }

    #[test]
    fn test_fetched_page_renders_text() {
        let page = FetchedPage::from_html(
            "https://example.org/",
            "<html><body><h1>Art Barn</h1><p>Open daily</p></body></html>",
        );
        assert_eq!(page.text, "Art Barn\nOpen daily");
    }

    fn quick_config() -> FetchConfig {
        FetchConfig {
            load_timeout_secs: 1,
            idle_timeout_secs: 1,
            ..FetchConfig::without_delays()
        }
    }

    #[tokio::test]
    async fn test_trickling_body_stops_at_idle_deadline() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 2048];
            let _ = socket.read(&mut request).await;
            let head = "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: 10000\r\n\r\n<p>Summer camp";
            socket.write_all(head.as_bytes()).await.unwrap();
            for _ in 0..40 {
                tokio::time::sleep(Duration::from_millis(300)).await;
                if socket.write_all(b".").await.is_err() {
                    break;
                }
            }
        });

        let fetcher = ReqwestFetcher::launch(&quick_config()).unwrap();
        let url = format!("http://{}/", addr);
        let page = tokio::time::timeout(Duration::from_secs(5), fetcher.fetch(&url))
            .await
            .expect("body read should stop at the idle deadline")
            .unwrap();

        assert!(page.html.starts_with("<p>Summer camp"));
        assert!(page.html.len() < 100);
        assert!(page.text.starts_with("Summer camp"));
    }

    #[tokio::test]
    async fn test_silent_server_hits_load_timeout() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(5)).await;
            drop(socket);
        });

        let fetcher = ReqwestFetcher::launch(&quick_config()).unwrap();
        let url = format!("http://{}/", addr);
        let result = tokio::time::timeout(Duration::from_secs(4), fetcher.fetch(&url))
            .await
            .expect("load timeout should fire first");

        match result {
            Err(e @ ScraperError::Timeout { secs: 1, .. }) => assert!(e.is_page_level()),
            other => panic!("expected a load timeout, got {:?}", other.map(|p| p.url)),
        }
    }

    #[test]
    fn test_launch_with_default_config() {
        let fetcher = ReqwestFetcher::launch(&FetchConfig::without_delays()).unwrap();
        assert_eq!(fetcher.user_agent(), DEFAULT_USER_AGENT);
    }
}

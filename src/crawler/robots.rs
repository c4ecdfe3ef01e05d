use super::fetcher::PageFetcher;
use crate::error::{Result, ScraperError};
use texting_robots::Robot;
use tracing::{debug, warn};
use url::Url;

/// Outcome of the advisory robots.txt check. No verdict stops a crawl.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RobotsVerdict {
    Allowed,
    Disallowed,
    /// robots.txt could not be fetched or parsed
    Unknown,
}

pub fn robots_url(seed: &Url) -> Option<String> {
    seed.host_str()
        .map(|host| format!("https://{}/robots.txt", host))
}

pub fn is_allowed(robots_txt: &str, user_agent: &str, url: &str) -> Result<bool> {
    let robot = Robot::new(user_agent, robots_txt.as_bytes())
        .map_err(|e| ScraperError::Robots(e.to_string()))?;
    Ok(robot.allowed(url))
}

/// Fetches robots.txt once and logs what it says about the seed.
pub async fn check_robots<F: PageFetcher + ?Sized>(fetcher: &F, seed: &Url) -> RobotsVerdict {
    let Some(robots) = robots_url(seed) else {
        return RobotsVerdict::Unknown;
    };

    let verdict = match fetcher.fetch_robots(&robots).await {
        Ok(txt) => is_allowed(&txt, fetcher.user_agent(), seed.as_str()),
        Err(e) => Err(e),
    };

    match verdict {
        Ok(true) => {
            debug!(url = %seed, "robots.txt allows crawling");
            RobotsVerdict::Allowed
        }
        Ok(false) => {
            warn!(url = %seed, "robots.txt disallows crawling, continuing anyway");
            RobotsVerdict::Disallowed
        }
        Err(e) => {
            warn!(url = %seed, error = %e, "Could not check robots.txt, continuing");
            RobotsVerdict::Unknown
        }
    }
}

use super::links::LinkCandidate;
use std::collections::{HashSet, VecDeque};

/// Breadth-first crawl bookkeeping for one provider.
///
/// URLs are stored in normalized form. The visited set only grows, and a URL
/// is marked visited before it is fetched, so a failing page is never retried.
#[derive(Debug, Default)]
pub struct CrawlState {
    visited: HashSet<String>,
    frontier: VecDeque<(String, usize)>,
    pages_crawled: usize,
}

impl CrawlState {
    pub fn new(seed: impl Into<String>) -> Self {
        let mut frontier = VecDeque::new();
        frontier.push_back((seed.into(), 0));
        Self {
            frontier,
            ..Self::default()
        }
    }

    /// Next queued URL that hasn't been visited yet
    pub fn next_unvisited(&mut self) -> Option<(String, usize)> {
        while let Some((url, depth)) = self.frontier.pop_front() {
            if !self.visited.contains(&url) {
                return Some((url, depth));
            }
        }
        None
    }

    /// Claims a page slot for `url`. Returns false if it was already visited.
    pub fn begin_page(&mut self, url: &str) -> bool {
        if !self.mark_visited(url) {
            return false;
        }
        self.pages_crawled += 1;
        true
    }

    pub fn mark_visited(&mut self, url: &str) -> bool {
        self.visited.insert(url.to_string())
    }

    pub fn enqueue(&mut self, links: Vec<LinkCandidate>, depth: usize) {
        for link in links {
            if !self.visited.contains(&link.url) {
                self.frontier.push_back((link.url, depth));
            }
        }
    }

    pub fn is_visited(&self, url: &str) -> bool {
        self.visited.contains(url)
    }

    pub fn visited(&self) -> &HashSet<String> {
        &self.visited
    }

    pub fn pages_crawled(&self) -> usize {
        self.pages_crawled
    }
}

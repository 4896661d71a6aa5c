// src/crawl/visited.rs
// =============================================================================
// Set of URLs the crawler has already committed to fetching.
//
// The set only ever grows during a crawl. A URL goes in right before it is
// fetched, so a page that links back to itself (or to an ancestor) can never
// be scheduled a second time. That is what makes the crawl terminate on
// cyclic sites.
//
// Keys go through `visit_key`, so "www.gytx.dev" and "gytx.dev" are one page.
// =============================================================================

use std::collections::HashSet;

use super::resolver::visit_key;

#[derive(Debug, Default)]
pub struct VisitedSet {
    urls: HashSet<String>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check-and-mark in one step. Returns `true` only the first time a URL is seen.
    pub fn mark(&mut self, url: &str) -> bool {
        self.urls.insert(visit_key(url))
    }

    pub fn contains(&self, url: &str) -> bool {
        self.urls.contains(&visit_key(url))
    }
}

// src/crawl/stats.rs
// =============================================================================
// Counters collected while crawling, reported at the end of every run even
// when some (or all) pages failed.
// =============================================================================

use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Duration;

use super::classifier::IgnoreReason;

#[derive(Debug, Clone, Default, Serialize)]
pub struct CrawlStats {
    /// Pages fetched and parsed successfully
    pub pages_visited: usize,
    /// Pages whose fetch failed (timeout, transport error, non-2xx)
    pub pages_failed: usize,
    /// Pages reached through a pagination link
    pub pagination_pages: usize,
    pub assets_found: usize,
    /// Links ignored, by reason
    pub links_ignored: BTreeMap<IgnoreReason, usize>,
    #[serde(serialize_with = "serialize_millis", rename = "elapsed_ms")]
    pub elapsed: Duration,
}

impl CrawlStats {
    pub fn record_ignored(&mut self, reason: IgnoreReason) {
        *self.links_ignored.entry(reason).or_insert(0) += 1;
    }

    pub fn total_ignored(&self) -> usize {
        self.links_ignored.values().sum()
    }

    /// Fetch attempts, successful or not.
    pub fn pages_attempted(&self) -> usize {
        self.pages_visited + self.pages_failed
    }
}

/// A page that could not be fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedPage {
    pub url: String,
    pub reason: String,
}

fn serialize_millis<S: serde::Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(value.as_millis() as u64)
}

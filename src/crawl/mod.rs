// src/crawl/mod.rs
// =============================================================================
// This module handles website crawling and asset discovery.
//
// Leaf to root:
// - resolver:   href/src values -> absolute, canonical URLs
// - page:       HTML -> raw link candidates (with text and pagination hints)
// - classifier: URL -> Asset / FollowablePage / Pagination / Ignore
// - visited, frontier, inventory, stats: crawl state
// - pacer:      fixed gap between requests
// - fetch:      the HTTP seam (Fetcher trait + reqwest implementation)
// - engine:     the traversal loop tying it all together
// =============================================================================

pub mod classifier;
pub mod engine;
pub mod fetch;
pub mod frontier;
pub mod inventory;
pub mod pacer;
pub mod page;
pub mod resolver;
pub mod stats;
pub mod visited;

pub use classifier::{ClassifierRules, IgnoreReason, LinkClass, LinkClassifier};
pub use engine::{CrawlEngine, CrawlReport};
pub use fetch::{FetchedPage, Fetcher, HttpFetcher};
pub use frontier::TraversalOrder;
pub use inventory::{AssetInventory, AssetKind, AssetRecord};
pub use stats::{CrawlStats, FailedPage};

use crate::config::CrawlConfig;
use crate::error::ConfigError;

// Crawls every page reachable from `root_url` within `domain`
//
// Uses the default settings (500ms between requests, 15s timeout, depth-first)
// and a real HTTP client.
//
// Returns: the full asset inventory, in discovery order
pub async fn explore_all_pages(
    root_url: &str,
    domain: &str,
) -> Result<Vec<AssetRecord>, ConfigError> {
    let mut config = CrawlConfig::new(root_url);
    config.domain = Some(domain.to_string());

    let fetcher = HttpFetcher::new(config.timeout, &config.user_agent, domain)?;
    let report = CrawlEngine::new(config, fetcher)?.run().await;
    Ok(report.assets)
}

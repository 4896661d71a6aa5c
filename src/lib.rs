// src/lib.rs
// =============================================================================
// Library root. The binary in main.rs is a thin CLI over these modules, and
// other tools can call `explore_all_pages` directly.
// =============================================================================

pub mod config;
pub mod crawl;
pub mod download;
pub mod error;
pub mod report;

pub use config::CrawlConfig;
pub use crawl::{explore_all_pages, AssetKind, AssetRecord, CrawlEngine, CrawlReport};
pub use error::{ConfigError, DownloadError, FetchError};

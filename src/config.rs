// src/config.rs
// =============================================================================
// Settings for one crawl run.
//
// The CLI builds a CrawlConfig from its flags; library callers can start from
// CrawlConfig::new(root) and change the public fields they care about.
// =============================================================================

use std::time::Duration;
use url::Url;

use crate::crawl::classifier::{ClassifierRules, DEFAULT_KEYWORDS};
use crate::crawl::frontier::TraversalOrder;
use crate::crawl::resolver::{host_matches, normalize_domain};
use crate::error::ConfigError;

/// Gap between two consecutive requests.
pub const DEFAULT_DELAY: Duration = Duration::from_millis(500);

/// Per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

pub const DEFAULT_USER_AGENT: &str = concat!("wireframe-harvester/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub struct CrawlConfig {
    pub root_url: String,
    /// Crawl domain; None = the root URL's host
    pub domain: Option<String>,
    pub delay: Duration,
    pub timeout: Duration,
    /// Stop after this many fetch attempts; None = until the frontier is empty
    pub max_pages: Option<usize>,
    pub order: TraversalOrder,
    /// File-name keywords that mark an asset
    pub keywords: Vec<String>,
    pub user_agent: String,
}

impl CrawlConfig {
    pub fn new(root_url: impl Into<String>) -> Self {
        Self {
            root_url: root_url.into(),
            domain: None,
            delay: DEFAULT_DELAY,
            timeout: DEFAULT_TIMEOUT,
            max_pages: None,
            order: TraversalOrder::default(),
            keywords: DEFAULT_KEYWORDS.iter().map(|k| k.to_string()).collect(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }

    // Checks the root URL and works out the crawl domain
    //
    // Returns: (parsed root URL, normalized domain)
    pub fn validate(&self) -> Result<(Url, String), ConfigError> {
        let root = Url::parse(self.root_url.trim()).map_err(|source| ConfigError::InvalidRootUrl {
            url: self.root_url.clone(),
            source,
        })?;

        let host = match root.host_str() {
            Some(host) if matches!(root.scheme(), "http" | "https") => host,
            _ => {
                return Err(ConfigError::UnsupportedRootUrl {
                    url: self.root_url.clone(),
                })
            }
        };

        let domain = normalize_domain(self.domain.as_deref().unwrap_or(host));
        if !host_matches(&root, &domain) {
            return Err(ConfigError::RootOutsideDomain {
                url: root.to_string(),
                domain,
            });
        }

        Ok((root, domain))
    }

    /// Classifier tables for this crawl.
    pub fn classifier_rules(&self, domain: &str) -> ClassifierRules {
        ClassifierRules::for_domain(domain).with_keywords(&self.keywords)
    }
}

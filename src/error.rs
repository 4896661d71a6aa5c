// src/error.rs
// =============================================================================
// Error types for the library side of the crate.
//
// - FetchError:    one page could not be fetched. Never fatal to a crawl.
// - ConfigError:   the crawl cannot start (bad root URL, bad domain).
// - DownloadError: one asset could not be saved. Never fatal to a batch.
//
// The binary (main.rs) wraps these in anyhow::Error with extra context.
// =============================================================================

use std::path::PathBuf;
use thiserror::Error;

/// Why a page fetch failed.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("timed out fetching {url}")]
    Timeout { url: String },

    #[error("HTTP {status} fetching {url}")]
    Status { url: String, status: u16 },

    #[error("{url} redirected off the crawl domain to {to}")]
    OffDomainRedirect { url: String, to: String },

    #[error("network error fetching {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("could not read body of {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

impl FetchError {
    // Maps a reqwest send() error, keeping timeouts distinct
    pub fn from_reqwest(url: &str, error: reqwest::Error) -> Self {
        if error.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
            }
        } else {
            FetchError::Network {
                url: url.to_string(),
                source: error,
            }
        }
    }
}

/// The crawl could not be set up.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid root URL '{url}': {source}")]
    InvalidRootUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("root URL must be http(s) and have a host: {url}")]
    UnsupportedRootUrl { url: String },

    #[error("root URL {url} is outside the crawl domain '{domain}'")]
    RootOutsideDomain { url: String, domain: String },

    #[error("could not build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// One asset download failed.
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("network error downloading {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP {status} downloading {url}")]
    Status { url: String, status: u16 },

    #[error("IO error writing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_messages_name_the_url() {
        let timeout = FetchError::Timeout {
            url: "https://gytx.dev/a/".to_string(),
        };
        assert_eq!(timeout.to_string(), "timed out fetching https://gytx.dev/a/");

        let status = FetchError::Status {
            url: "https://gytx.dev/b/".to_string(),
            status: 404,
        };
        assert_eq!(status.to_string(), "HTTP 404 fetching https://gytx.dev/b/");
    }

    #[test]
    fn test_config_error_message() {
        let err = ConfigError::RootOutsideDomain {
            url: "https://gytx.dev/".to_string(),
            domain: "other.dev".to_string(),
        };
        assert!(err.to_string().contains("outside the crawl domain"));
    }
}

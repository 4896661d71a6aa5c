// src/crawl/fetch.rs
// =============================================================================
// The HTTP side of the crawler, kept behind a small trait.
//
// The crawl engine only needs "give me the status and body of this URL". The
// `Fetcher` trait says exactly that, so the engine can be driven by reqwest in
// production and by an in-memory site in tests.
//
// Redirects are followed only while they stay on the crawl domain. A redirect
// that leaves it is not followed: the 3xx response itself comes back, and the
// engine records it as a failed page.
//
// Rust concepts:
// - async-trait: lets an async trait be used as Box<dyn Fetcher>/Arc<dyn Fetcher>
// - Send + Sync: the fetcher can be shared across tokio tasks
// =============================================================================

use async_trait::async_trait;
use reqwest::redirect::Policy;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use super::resolver::{host_matches, normalize_domain};
use crate::error::{ConfigError, FetchError};

const MAX_REDIRECTS: usize = 5;

/// Status and body of a fetched page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    pub status: u16,
    /// URL the body came from, after redirects
    pub final_url: String,
    pub body: String,
}

impl FetchedPage {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Fetches one URL. Transport failures are errors; HTTP error statuses are not.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError>;
}

#[async_trait]
impl<F: Fetcher + ?Sized> Fetcher for std::sync::Arc<F> {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        (**self).fetch(url).await
    }
}

/// reqwest-backed fetcher.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    // Creates a fetcher whose every request gives up after `timeout`
    //
    // Parameters:
    //   domain: crawl domain; redirects to any other host are not followed
    pub fn new(timeout: Duration, user_agent: &str, domain: &str) -> Result<Self, ConfigError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .redirect(same_domain_redirects(normalize_domain(domain)))
            .build()?;
        Ok(Self { client })
    }

    /// Shares the underlying client (used by the asset downloader).
    pub fn client(&self) -> &Client {
        &self.client
    }
}

fn same_domain_redirects(domain: String) -> Policy {
    Policy::custom(move |attempt| {
        if attempt.previous().len() >= MAX_REDIRECTS {
            attempt.error("too many redirects")
        } else if host_matches(attempt.url(), &domain) {
            attempt.follow()
        } else {
            debug!(to = %attempt.url(), "off-domain redirect not followed");
            attempt.stop()
        }
    })
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "text/html,application/xhtml+xml,*/*;q=0.8")
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        debug!(url, status, final_url = %final_url, "response received");

        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout {
                    url: url.to_string(),
                }
            } else {
                FetchError::Body {
                    url: url.to_string(),
                    source: e,
                }
            }
        })?;

        Ok(FetchedPage {
            status,
            final_url,
            body,
        })
    }
}

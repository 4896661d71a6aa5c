// src/download.rs
// =============================================================================
// Downloads the assets a crawl found into a local directory.
//
// Key behaviour:
// - Runs several downloads at once (buffer_unordered), results come back in
//   completion order
// - All-settled: every asset gets an outcome, one failure never stops the rest
// - File names come from the asset URL; clashes get a "-2", "-3"... suffix
//   decided up front, before any task starts
//
// Rust concepts:
// - Streams: stream::iter(...).buffer_unordered(N) caps concurrency at N
// - tokio::fs: async file writes that don't block the runtime
// =============================================================================

use futures::stream::{self, StreamExt};
use reqwest::Client;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::crawl::AssetRecord;
use crate::error::DownloadError;

/// Default number of downloads in flight.
pub const DEFAULT_CONCURRENCY: usize = 8;

/// What happened to one asset.
#[derive(Debug)]
pub struct DownloadOutcome {
    pub asset: AssetRecord,
    pub result: Result<PathBuf, DownloadError>,
}

impl DownloadOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

// Downloads every asset into `out_dir`
//
// Parameters:
//   client: shared reqwest client (cheap to clone)
//   assets: the crawl inventory
//   out_dir: target directory, must already exist
//   concurrency: max downloads in flight (0 is treated as 1)
//
// Returns: one outcome per asset, in completion order
pub async fn download_assets(
    client: &Client,
    assets: &[AssetRecord],
    out_dir: &Path,
    concurrency: usize,
) -> Vec<DownloadOutcome> {
    let targets = plan_file_names(assets, out_dir);

    let futures = assets.iter().cloned().zip(targets).map(|(asset, path)| {
        let client = client.clone();
        async move {
            let result = download_one(&client, &asset.url, &path).await;
            match &result {
                Ok(path) => debug!(url = %asset.url, path = %path.display(), "downloaded asset"),
                Err(error) => warn!(url = %asset.url, %error, "asset download failed"),
            }
            DownloadOutcome { asset, result }
        }
    });

    stream::iter(futures)
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await
}

async fn download_one(client: &Client, url: &str, path: &Path) -> Result<PathBuf, DownloadError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|source| DownloadError::Network {
            url: url.to_string(),
            source,
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(DownloadError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|source| DownloadError::Network {
            url: url.to_string(),
            source,
        })?;

    tokio::fs::write(path, &bytes)
        .await
        .map_err(|source| DownloadError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    Ok(path.to_path_buf())
}

// Picks a unique file path for each asset, in inventory order
fn plan_file_names(assets: &[AssetRecord], out_dir: &Path) -> Vec<PathBuf> {
    let mut taken = HashSet::new();

    assets
        .iter()
        .map(|asset| {
            let base = sanitize_file_name(&asset.name);
            let (stem, ext) = match base.rsplit_once('.') {
                Some((stem, ext)) if !stem.is_empty() => (stem.to_string(), format!(".{}", ext)),
                _ => (base.clone(), String::new()),
            };

            let mut candidate = base;
            let mut n = 2;
            while !taken.insert(candidate.clone()) {
                candidate = format!("{}-{}{}", stem, n, ext);
                n += 1;
            }
            out_dir.join(candidate)
        })
        .collect()
}

// Keeps letters, digits, '.', '-' and '_'; everything else becomes '_'
fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let cleaned = cleaned.trim_matches('.').to_string();
    if cleaned.is_empty() {
        "asset".to_string()
    } else {
        cleaned
    }
}

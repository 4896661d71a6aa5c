// src/crawl/inventory.rs
// =============================================================================
// The asset inventory: every wireframe image/document found during a crawl.
//
// - Append-only: records are never edited or removed once added
// - Discovery order: the Vec keeps the order assets were found in
// - Deduplicated: the same asset linked from ten pages is recorded once,
//   including when one page says "www.gytx.dev" and another "gytx.dev"
// =============================================================================

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::resolver::visit_key;

/// What kind of file an asset is, decided purely from its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    Image,
    Document,
    /// Recognized by keyword only (no known extension)
    Unknown,
}

impl std::fmt::Display for AssetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            AssetKind::Image => "image",
            AssetKind::Document => "document",
            AssetKind::Unknown => "unknown",
        };
        f.write_str(label)
    }
}

/// One discovered asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRecord {
    /// Display name, usually the file name
    pub name: String,
    /// Absolute, canonical URL
    pub url: String,
    pub kind: AssetKind,
    /// Truncated link text / alt text / surrounding text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Page the asset was first discovered on
    pub found_on: String,
}

/// Append-only, URL-deduplicated list of asset records.
#[derive(Debug, Default)]
pub struct AssetInventory {
    records: Vec<AssetRecord>,
    urls: HashSet<String>,
}

impl AssetInventory {
    pub fn new() -> Self {
        Self::default()
    }

    // Adds a record unless one with the same URL is already present
    //
    // Returns: true if the record was new
    pub fn record(&mut self, asset: AssetRecord) -> bool {
        if !self.urls.insert(visit_key(&asset.url)) {
            return false;
        }
        self.records.push(asset);
        true
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[AssetRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<AssetRecord> {
        self.records
    }
}

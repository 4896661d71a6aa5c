// src/report.rs
// =============================================================================
// Turns a CrawlReport into something for humans (a table) or for machines
// (JSON, on stdout or in a file).
// =============================================================================

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;

use crate::crawl::{AssetRecord, CrawlReport, CrawlStats, FailedPage};

// Borrowed view of the report, the shape written as JSON
#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
    pub root_url: &'a str,
    pub domain: &'a str,
    pub stats: &'a CrawlStats,
    pub assets: &'a [AssetRecord],
    pub failures: &'a [FailedPage],
}

impl<'a> From<&'a CrawlReport> for JsonReport<'a> {
    fn from(report: &'a CrawlReport) -> Self {
        Self {
            root_url: &report.root_url,
            domain: &report.domain,
            stats: &report.stats,
            assets: &report.assets,
            failures: &report.failures,
        }
    }
}

pub fn to_json(report: &CrawlReport) -> Result<String> {
    serde_json::to_string_pretty(&JsonReport::from(report)).context("serializing crawl report")
}

pub fn write_json(report: &CrawlReport, path: &Path) -> Result<()> {
    let json = to_json(report)?;
    std::fs::write(path, json).with_context(|| format!("writing report to {}", path.display()))
}

// Prints the inventory as a table followed by the summary
pub fn print_table(report: &CrawlReport) {
    println!("{:<32} {:<10} {:<60} {:<30}", "NAME", "KIND", "URL", "DESCRIPTION");
    println!("{}", "=".repeat(135));

    for asset in &report.assets {
        println!(
            "{:<32} {:<10} {:<60} {:<30}",
            clip(&asset.name, 32),
            asset.kind.to_string(),
            clip(&asset.url, 60),
            clip(asset.description.as_deref().unwrap_or(""), 30),
        );
    }

    println!();
    print_summary(report);
}

/// The summary block. Printed whatever happened to individual pages.
pub fn print_summary(report: &CrawlReport) {
    let stats = &report.stats;
    println!("📊 Summary:");
    println!("   📄 Pages visited: {}", stats.pages_visited);
    println!("   📑 Via pagination: {}", stats.pagination_pages);
    println!("   ❌ Pages failed: {}", stats.pages_failed);
    println!("   🖼️  Assets found: {}", stats.assets_found);
    println!("   🚫 Links ignored: {}", stats.total_ignored());
    println!("   ⏱️  Elapsed: {:.1}s", stats.elapsed.as_secs_f64());

    for failure in &report.failures {
        println!("      - {} ({})", failure.url, failure.reason);
    }
}

// Shortens long cells, keeping the column layout
fn clip(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        let cut: String = text.chars().take(width.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}

// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// We use the "derive" API which lets us define the CLI structure using
// Rust structs and attributes (the #[...] things).
//
// Two subcommands share the same crawl flags (CrawlArgs, flattened in):
// - explore:  crawl and print the asset inventory
// - download: crawl, then save every asset into a directory
// =============================================================================

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

use wireframe_harvester::config::{CrawlConfig, DEFAULT_USER_AGENT};
use wireframe_harvester::crawl::TraversalOrder;
use wireframe_harvester::download::DEFAULT_CONCURRENCY;

#[derive(Parser, Debug)]
#[command(
    name = "wireframe-harvester",
    version,
    about = "Crawl a website and inventory its wireframe images and documents",
    long_about = "wireframe-harvester walks every same-domain page reachable from a root URL, \
                  follows pagination, and lists the images and PDFs that look like wireframes. \
                  It never leaves the domain and never fetches a page twice."
)]
pub struct Cli {
    /// More logging (-v debug, -vv trace). RUST_LOG overrides this
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Crawl a site and list the assets found
    ///
    /// Example: wireframe-harvester explore https://gytx.dev --delay-ms 1000
    Explore {
        #[command(flatten)]
        crawl: CrawlArgs,

        /// Print the inventory as JSON instead of a table
        #[arg(long)]
        json: bool,

        /// Also write the JSON report to this file
        #[arg(long, value_name = "PATH")]
        report: Option<PathBuf>,
    },

    /// Crawl a site, then download every asset found
    ///
    /// Example: wireframe-harvester download https://gytx.dev --out ./wireframes
    Download {
        #[command(flatten)]
        crawl: CrawlArgs,

        /// Directory to save assets into (created if missing)
        #[arg(long, value_name = "DIR")]
        out: PathBuf,

        /// Downloads in flight at once
        #[arg(long, default_value_t = DEFAULT_CONCURRENCY)]
        concurrency: usize,

        /// Also write the JSON report to this file
        #[arg(long, value_name = "PATH")]
        report: Option<PathBuf>,
    },
}

/// Flags shared by every crawling subcommand.
#[derive(Args, Debug, Clone)]
pub struct CrawlArgs {
    /// Root URL to start crawling from (e.g., https://gytx.dev)
    pub root_url: String,

    /// Only crawl this domain (default: the root URL's host)
    #[arg(long)]
    pub domain: Option<String>,

    /// Milliseconds to wait between two requests
    #[arg(long, default_value_t = 500)]
    pub delay_ms: u64,

    /// Seconds before a request is given up on
    #[arg(long, default_value_t = 15)]
    pub timeout_secs: u64,

    /// Stop after this many pages (default: no limit)
    #[arg(long)]
    pub max_pages: Option<usize>,

    /// Visit pages level by level instead of depth-first
    #[arg(long)]
    pub breadth_first: bool,

    /// File-name keyword marking an asset; repeat to replace the default list
    #[arg(long = "keyword", value_name = "WORD")]
    pub keywords: Vec<String>,

    /// User-Agent header sent with every request
    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,
}

impl CrawlArgs {
    pub fn to_config(&self) -> CrawlConfig {
        let mut config = CrawlConfig::new(self.root_url.clone());
        config.domain = self.domain.clone();
        config.delay = Duration::from_millis(self.delay_ms);
        config.timeout = Duration::from_secs(self.timeout_secs);
        config.max_pages = self.max_pages;
        config.order = if self.breadth_first {
            TraversalOrder::BreadthFirst
        } else {
            TraversalOrder::DepthFirst
        };
        if !self.keywords.is_empty() {
            config.keywords = self.keywords.clone();
        }
        config.user_agent = self.user_agent.clone();
        config
    }
}

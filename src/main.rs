// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging (tracing) from -v/-q or RUST_LOG
// 3. Dispatch to the appropriate subcommand handler
// 4. Print the inventory and summary
// 5. Exit with proper code (0 = success, 1 = some downloads failed, 2 = error)
//
// Logs go to stderr, so `explore --json > inventory.json` stays clean.
// =============================================================================

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands, CrawlArgs};
use tracing::{error, info};

use wireframe_harvester::crawl::{CrawlEngine, CrawlReport, HttpFetcher};
use wireframe_harvester::{download, report};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(&cli);

    let exit_code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// Priority: RUST_LOG > --quiet > --verbose > default (info)
fn init_logging(cli: &Cli) {
    let default_level = if cli.quiet {
        "error"
    } else {
        match cli.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Commands::Explore {
            crawl,
            json,
            report: report_path,
        } => {
            let (crawl_report, _) = crawl_site(&crawl).await?;

            if json {
                println!("{}", report::to_json(&crawl_report)?);
            } else {
                report::print_table(&crawl_report);
            }
            if let Some(path) = report_path {
                report::write_json(&crawl_report, &path)?;
                info!(path = %path.display(), "report written");
            }
            Ok(0)
        }
        Commands::Download {
            crawl,
            out,
            concurrency,
            report: report_path,
        } => {
            let (crawl_report, fetcher) = crawl_site(&crawl).await?;
            report::print_summary(&crawl_report);
            if let Some(path) = report_path {
                report::write_json(&crawl_report, &path)?;
            }

            if crawl_report.assets.is_empty() {
                println!("✅ No assets to download");
                return Ok(0);
            }

            tokio::fs::create_dir_all(&out)
                .await
                .with_context(|| format!("creating output directory {}", out.display()))?;

            println!(
                "\n⬇️  Downloading {} asset(s) to {}...\n",
                crawl_report.assets.len(),
                out.display()
            );
            let outcomes =
                download::download_assets(fetcher.client(), &crawl_report.assets, &out, concurrency)
                    .await;

            let failed: Vec<_> = outcomes.iter().filter(|o| !o.is_ok()).collect();
            println!("   ✅ Saved: {}", outcomes.len() - failed.len());
            println!("   ❌ Failed: {}", failed.len());
            for outcome in &failed {
                if let Err(e) = &outcome.result {
                    println!("      - {}", e);
                }
            }

            Ok(if failed.is_empty() { 0 } else { 1 })
        }
    }
}

// Runs one crawl with a real HTTP fetcher, handing the fetcher back so its
// client (and its same-domain redirect policy) can be reused for downloads
async fn crawl_site(args: &CrawlArgs) -> Result<(CrawlReport, HttpFetcher)> {
    let config = args.to_config();
    let (_, domain) = config
        .validate()
        .with_context(|| format!("cannot crawl {}", args.root_url))?;
    let fetcher = HttpFetcher::new(config.timeout, &config.user_agent, &domain)?;

    let engine = CrawlEngine::new(config, fetcher.clone())
        .with_context(|| format!("cannot crawl {}", args.root_url))?;
    Ok((engine.run().await, fetcher))
}

//! Catalog-Harvest main entry point
//!
//! This is the command-line interface for the catalog crawler, normalizer and
//! recommendation API.

use anyhow::Context;
use catalog_harvest::catalog::normalize_file;
use catalog_harvest::config::{load_config_with_hash, Config};
use catalog_harvest::crawler::run_crawl;
use catalog_harvest::output::{print_crawl_report, print_summary, summarize, write_markdown_summary};
use catalog_harvest::recommend::Recommender;
use catalog_harvest::storage::open_catalog;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

/// Catalog-Harvest: a polite product catalog crawler
///
/// Crawls a product catalog breadth-first, normalizes the extracted records
/// into a tabular store, and serves text-similarity recommendations.
#[derive(Parser, Debug)]
#[command(name = "catalog-harvest")]
#[command(version)]
#[command(about = "A polite product catalog crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG", default_value = "harvest.toml")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl the catalog and append new records to the record store
    Crawl,
    /// Build the tabular catalog from the record store and write a summary
    Normalize,
    /// Show catalog statistics and exit
    Stats,
    /// Serve the recommendation API
    Serve,
    /// Validate config and show what would be crawled without crawling
    DryRun,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    match cli.command {
        Command::Crawl => handle_crawl(config).await,
        Command::Normalize => handle_normalize(&config),
        Command::Stats => handle_stats(&config),
        Command::Serve => handle_serve(&config).await,
        Command::DryRun => handle_dry_run(&config, &config_hash),
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("catalog_harvest=info,warn"),
            1 => EnvFilter::new("catalog_harvest=debug,info"),
            2 => EnvFilter::new("catalog_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

fn handle_dry_run(config: &Config, config_hash: &str) -> anyhow::Result<()> {
    println!("=== Catalog-Harvest Dry Run ===\n");
    println!("Config hash: {}\n", config_hash);

    println!("Crawler Configuration:");
    println!("  Seed URL: {}", config.crawler.seed_url);
    println!("  Fetch strategy: {:?}", config.crawler.fetch_strategy);
    println!("  Request timeout: {}s", config.crawler.request_timeout_secs);
    println!("  Politeness delay: {}ms", config.crawler.politeness_delay_ms);
    match config.crawler.max_new_records {
        Some(cap) => println!("  Max new records: {}", cap),
        None => println!("  Max new records: unlimited"),
    }
    if let Some(minimum) = config.crawler.expected_minimum_records {
        println!("  Expected minimum records: {}", minimum);
    }
    println!("  Full text cap: {} chars", config.crawler.max_full_text_chars);

    println!("\nAllowed Domains ({}):", config.crawler.allowed_domains.len());
    for pattern in &config.crawler.allowed_domains {
        println!("  - {}", pattern);
    }

    println!("\nUser Agent: {}", config.user_agent.header_value());

    println!("\nOutput:");
    println!("  Records: {}", config.output.records_path);
    println!("  Archive: {}", config.output.archive_dir);
    println!("  Database: {}", config.output.database_path);
    println!("  Summary: {}", config.output.summary_path);

    println!("\nServer:");
    println!("  Listen: {}", config.server.listen_addr);
    println!("  Default top_k: {}", config.server.default_top_k);

    println!("\n✓ Configuration is valid");
    println!("✓ Would start crawling from {}", config.crawler.seed_url);

    Ok(())
}

async fn handle_crawl(config: Config) -> anyhow::Result<()> {
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, finishing the current page");
            let _ = shutdown_tx.send(true);
        }
    });

    let report = run_crawl(config, shutdown_rx).await.context("crawl failed")?;
    print_crawl_report(&report);

    Ok(())
}

fn handle_normalize(config: &Config) -> anyhow::Result<()> {
    let mut store = open_catalog(Path::new(&config.output.database_path))?;
    normalize_file(Path::new(&config.output.records_path), &mut store)
        .context("normalization failed")?;

    let summary = summarize(&store)?;
    print_summary(&summary);

    let summary_path = Path::new(&config.output.summary_path);
    write_markdown_summary(&summary, summary_path)
        .with_context(|| format!("failed to write {}", summary_path.display()))?;
    println!("\n✓ Summary written to: {}", summary_path.display());

    Ok(())
}

fn handle_stats(config: &Config) -> anyhow::Result<()> {
    println!("Database: {}\n", config.output.database_path);

    let store = open_catalog(Path::new(&config.output.database_path))?;
    print_summary(&summarize(&store)?);

    Ok(())
}

async fn handle_serve(config: &Config) -> anyhow::Result<()> {
    let store = open_catalog(Path::new(&config.output.database_path))?;
    let recommender = Recommender::load(&store)?;

    if recommender.is_empty() {
        tracing::warn!("Catalog is empty; run `normalize` after a crawl");
    }

    catalog_harvest::server::serve(recommender, &config.server).await
}

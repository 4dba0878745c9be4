//! Catalog-Harvest main entry point
//!
//! This is the command-line interface for the catalog ingestion pipeline.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use catalog_harvest::config::load_config_with_hash;
use catalog_harvest::crawler::run_harvest;

/// Catalog-Harvest: product catalog ingestion
///
/// Crawls a storefront's category menu and listing pages, fetches each
/// product's detail page, normalizes the extracted fields, and upserts
/// the result into a SQLite catalog plus a JSON snapshot.
#[derive(Parser, Debug)]
#[command(name = "catalog-harvest")]
#[command(version)]
#[command(about = "Product catalog ingestion pipeline", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be harvested without crawling
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show catalog statistics from the database and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded (hash: {})", config_hash);

    if cli.dry_run {
        handle_dry_run(&config);
    } else if cli.stats {
        handle_stats(&config)?;
    } else {
        handle_harvest(config).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
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

/// Handles the --dry-run mode: validates config and shows the crawl plan
fn handle_dry_run(config: &catalog_harvest::config::Config) {
    println!("=== Catalog-Harvest Dry Run ===\n");

    println!("Site:");
    println!("  Base URL: {}", config.site.base_url);

    println!("\nHTTP:");
    println!("  User agent: {}", config.http.user_agent);
    println!("  Timeout: {}s", config.http.timeout_secs);
    println!("  Retry attempts: {}", config.http.retry_attempts);
    println!("  Backoff base: {}s", config.http.backoff_base_secs);

    println!("\nCrawl:");
    println!("  Request delay: {}ms", config.crawl.request_delay_ms);
    println!(
        "  Skip populated categories: {}",
        config.crawl.skip_populated_categories
    );

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);
    println!("  Snapshot: {}", config.output.snapshot_path);

    println!("\n✓ Configuration is valid");
}

/// Handles the --stats mode: shows catalog counts from the database
fn handle_stats(config: &catalog_harvest::config::Config) -> anyhow::Result<()> {
    use catalog_harvest::output::{load_store_stats, print_store_stats};
    use catalog_harvest::storage::SqliteStore;
    use std::path::Path;

    println!("Database: {}\n", config.output.database_path);

    let store = SqliteStore::new(Path::new(&config.output.database_path))?;
    let stats = load_store_stats(&store)?;
    print_store_stats(&stats);

    Ok(())
}

/// Handles the main harvest operation
async fn handle_harvest(config: catalog_harvest::config::Config) -> anyhow::Result<()> {
    let cancel = CancellationToken::new();

    // First Ctrl-C stops the run cleanly between fetches; persisted
    // records are kept.
    let signal_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received; finishing current request then stopping");
            signal_token.cancel();
        }
    });

    let summary = run_harvest(config, cancel).await?;

    println!("\n=== Harvest Summary ===");
    println!("Categories seen:  {}", summary.categories_seen);
    println!("Products saved:   {}", summary.products_saved);
    println!("Products skipped: {}", summary.products_skipped);
    println!("Errors:           {}", summary.errors);

    Ok(())
}

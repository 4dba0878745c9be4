//! Crawling pipeline: HTTP fetching, markup extraction, orchestration
//!
//! The pipeline runs sequentially: categories, listing pages, and
//! product details are fetched one at a time, with the fixed
//! inter-request delay bounding request rate. The only shared mutable
//! state is the per-category seen-set and the snapshot accumulator, both
//! owned by the orchestrator.

mod extract;
mod fetcher;
mod orchestrator;

pub use extract::{
    discover_categories, extract_listing_cards, extract_product_detail, DiscoveredCategory,
    ListingCard, ProductDetail,
};
pub use fetcher::{build_http_client, fetch_page, FetchError};
pub use orchestrator::{Harvester, RunSummary};

use crate::config::Config;
use crate::storage::SqliteStore;
use crate::Result;
use std::path::Path;
use tokio_util::sync::CancellationToken;

/// Runs a full harvest against the SQLite store at the configured path
///
/// # Arguments
///
/// * `config` - Validated run configuration
/// * `cancel` - Cancellation token; cancel it to stop cleanly between fetches
///
/// # Returns
///
/// * `Ok(RunSummary)` - Run counters
/// * `Err(HarvestError)` - Setup failure or root page fetch failure
///
/// # Example
///
/// ```no_run
/// use catalog_harvest::config::load_config;
/// use catalog_harvest::crawler::run_harvest;
/// use std::path::Path;
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("config.toml"))?;
/// let summary = run_harvest(config, CancellationToken::new()).await?;
/// println!("saved {} products", summary.products_saved);
/// # Ok(())
/// # }
/// ```
pub async fn run_harvest(config: Config, cancel: CancellationToken) -> Result<RunSummary> {
    let store = SqliteStore::new(Path::new(&config.output.database_path))?;
    let harvester = Harvester::new(config, store, cancel)?;
    harvester.run().await
}

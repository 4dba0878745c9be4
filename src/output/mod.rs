//! Output module: run snapshot and store statistics

mod snapshot;

pub use snapshot::{
    write_snapshot, CategorySnapshot, ProductDetailsSnapshot, ProductSnapshot,
};

use crate::storage::{CatalogStore, StorageResult};

/// Counts reported by `--stats` and the end-of-run summary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreStats {
    pub active_categories: u64,
    pub active_products: u64,
}

/// Loads catalog counts from the store
pub fn load_store_stats(store: &dyn CatalogStore) -> StorageResult<StoreStats> {
    Ok(StoreStats {
        active_categories: store.count_active_categories()?,
        active_products: store.count_active_products()?,
    })
}

/// Prints catalog counts for the `--stats` CLI mode
pub fn print_store_stats(stats: &StoreStats) {
    println!("=== Catalog Statistics ===");
    println!("Active categories: {}", stats.active_categories);
    println!("Active products:   {}", stats.active_products);
}

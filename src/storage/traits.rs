//! Storage trait and error types

use crate::storage::{CategoryRecord, NewProduct, ProductRecord};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Category not found after upsert: {0}")]
    CategoryNotFound(String),

    #[error("Product not found after upsert: id {0}")]
    ProductNotFound(i64),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Persistence gateway for the harvested catalog
///
/// Implementations resolve record identity and upsert under a
/// transaction, so a concurrent caller can never observe a half-written
/// record. Categories and products are created or updated in place,
/// never deleted; deactivation is an administrative action outside this
/// pipeline.
pub trait CatalogStore {
    // ===== Categories =====

    /// Creates or updates a category, matched by exact name
    /// (case-insensitive).
    ///
    /// A new category is created active with the provided URL and image;
    /// an existing one has its URL and image overwritten from the latest
    /// crawl values (last-write-wins) and its `updated_at` bumped.
    fn upsert_category(
        &mut self,
        name: &str,
        url: &str,
        image_url: Option<&str>,
    ) -> StorageResult<CategoryRecord>;

    /// Looks up a category by name (case-insensitive)
    fn find_category_by_name(&self, name: &str) -> StorageResult<Option<CategoryRecord>>;

    // ===== Products =====

    /// Creates or updates a product under the given category.
    ///
    /// Identity resolution order:
    /// 1. `product.product_id`, when present — all fields overwritten
    /// 2. else the (`title`, category) pair — update in place if found,
    ///    create otherwise
    ///
    /// Runs the find-then-write pair inside one transaction. Updating
    /// always rewrites every field from the fresh payload, including
    /// resetting `is_active` to true.
    fn upsert_product(
        &mut self,
        category_id: i64,
        product: &NewProduct,
    ) -> StorageResult<ProductRecord>;

    /// Looks up a product by its external product ID
    fn find_product_by_external_id(
        &self,
        product_id: &str,
    ) -> StorageResult<Option<ProductRecord>>;

    /// Looks up a product by its (title, category) identity
    fn find_product_by_identity(
        &self,
        title: &str,
        category_id: i64,
    ) -> StorageResult<Option<ProductRecord>>;

    // ===== Counts =====

    /// Number of products persisted under a category (for the
    /// skip-populated-categories flag)
    fn category_product_count(&self, category_id: i64) -> StorageResult<u64>;

    /// Number of active categories in the store
    fn count_active_categories(&self) -> StorageResult<u64>;

    /// Number of active products in the store
    fn count_active_products(&self) -> StorageResult<u64>;
}

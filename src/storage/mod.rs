//! Storage module for the persisted catalog
//!
//! This module is the persistence gateway: it resolves category and
//! product identity and performs idempotent create-or-update against
//! SQLite. It performs no retries; a store-level failure surfaces to the
//! orchestrator, which logs it and moves on.

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStore;
pub use traits::{CatalogStore, StorageError, StorageResult};

use crate::normalize::Availability;
use indexmap::IndexMap;
use rust_decimal::Decimal;

/// A persisted product category
#[derive(Debug, Clone)]
pub struct CategoryRecord {
    pub id: i64,
    /// Case-insensitively unique category name; the upsert identity
    pub name: String,
    pub url: String,
    pub image_url: Option<String>,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// A persisted product
#[derive(Debug, Clone)]
pub struct ProductRecord {
    pub id: i64,
    pub title: String,
    pub category_id: i64,
    pub url: String,
    pub image_url: Option<String>,
    /// Always positive; payloads without a parseable price never reach
    /// the store
    pub price: Decimal,
    pub price_display: Option<String>,
    pub availability: Availability,
    /// External product identifier; the preferred upsert identity when
    /// present
    pub product_id: Option<String>,
    pub variant_id: Option<String>,
    pub description_text: String,
    /// Ordered, de-duplicated image URLs (stored as a JSON array)
    pub images: Vec<String>,
    /// Specification mapping (stored as a JSON object)
    pub specifications: IndexMap<String, String>,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// A normalized product payload ready for upsert
///
/// Assembled by the orchestrator from a listing card and its detail
/// page, after normalization. Identity resolution order: `product_id`
/// when present, else (`title`, category).
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub title: String,
    pub url: String,
    pub image_url: Option<String>,
    pub price: Decimal,
    pub price_display: Option<String>,
    pub availability: Availability,
    pub product_id: Option<String>,
    pub variant_id: Option<String>,
    pub description_text: String,
    pub images: Vec<String>,
    pub specifications: IndexMap<String, String>,
}

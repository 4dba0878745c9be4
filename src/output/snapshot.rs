//! JSON snapshot of a harvest run
//!
//! After the crawl finishes, the full in-memory category → products
//! structure is serialized to a single JSON document for audit/backup.
//! The snapshot is built from the payloads assembled during the run, not
//! re-read from the store, so it also retains products the store
//! rejected (e.g. unparseable prices). Nothing reads it back; failures
//! here never undo persisted records.

use crate::crawler::{DiscoveredCategory, ListingCard, ProductDetail};
use crate::HarvestError;
use indexmap::IndexMap;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// One category and every product payload assembled under it
#[derive(Debug, Clone, Serialize)]
pub struct CategorySnapshot {
    pub category_name: String,
    pub category_url: String,
    pub image_url: Option<String>,
    pub products: Vec<ProductSnapshot>,
}

/// One assembled product payload, pre-normalization
#[derive(Debug, Clone, Serialize)]
pub struct ProductSnapshot {
    pub product_title: String,
    pub product_url: String,
    /// Display price string as scraped, not the parsed decimal
    pub price: Option<String>,
    pub image_url: Option<String>,
    pub product_details: ProductDetailsSnapshot,
}

/// Raw detail-page fields for the snapshot
#[derive(Debug, Clone, Serialize)]
pub struct ProductDetailsSnapshot {
    /// Raw availability text, not the mapped enum
    pub availability: Option<String>,
    pub product_id: Option<String>,
    pub variant_id: Option<String>,
    pub images: Vec<String>,
    pub description_text: Option<String>,
    pub specifications: IndexMap<String, String>,
}

impl CategorySnapshot {
    /// Starts an empty snapshot entry for a discovered category
    pub fn new(category: &DiscoveredCategory) -> Self {
        Self {
            category_name: category.name.clone(),
            category_url: category.url.clone(),
            image_url: category.image_url.clone(),
            products: Vec::new(),
        }
    }
}

impl ProductSnapshot {
    /// Combines a listing card and its detail page into one payload
    pub fn from_parts(card: &ListingCard, detail: &ProductDetail) -> Self {
        Self {
            product_title: card.title.clone(),
            product_url: card.url.clone(),
            price: card.price_display.clone(),
            image_url: card.image_url.clone(),
            product_details: ProductDetailsSnapshot {
                availability: detail.availability.clone(),
                product_id: detail.product_id.clone(),
                variant_id: detail.variant_id.clone(),
                images: detail.images.clone(),
                description_text: detail.description_text.clone(),
                specifications: detail.specifications.clone(),
            },
        }
    }
}

/// Writes the snapshot document, overwriting any prior snapshot
///
/// Output is pretty-printed UTF-8 JSON; non-ASCII text is written
/// verbatim rather than escaped.
///
/// # Arguments
///
/// * `path` - Destination file path
/// * `categories` - The accumulated snapshot structure
///
/// # Returns
///
/// * `Ok(())` - Snapshot written
/// * `Err(HarvestError)` - IO or serialization failure
pub fn write_snapshot(path: &Path, categories: &[CategorySnapshot]) -> Result<(), HarvestError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, categories)?;
    writer.flush()?;
    Ok(())
}

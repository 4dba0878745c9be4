//! SQLite implementation of the persistence gateway

use crate::normalize::Availability;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{CatalogStore, StorageError, StorageResult};
use crate::storage::{CategoryRecord, NewProduct, ProductRecord};
use crate::HarvestError;
use chrono::Utc;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;

const PRODUCT_COLUMNS: &str = "id, title, category_id, url, image_url, price, price_display, \
     availability, product_id, variant_id, description_text, images, specifications, \
     is_active, created_at, updated_at";

/// SQLite-backed catalog store
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Opens (or creates) the catalog database at the given path
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStore)` - Successfully opened/created database
    /// * `Err(HarvestError)` - Failed to open database
    pub fn new(path: &Path) -> Result<Self, HarvestError> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> Result<Self, HarvestError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

impl CatalogStore for SqliteStore {
    fn upsert_category(
        &mut self,
        name: &str,
        url: &str,
        image_url: Option<&str>,
    ) -> StorageResult<CategoryRecord> {
        let tx = self.conn.transaction()?;
        let now = Utc::now().to_rfc3339();

        match category_by_name(&tx, name)? {
            Some(existing) => {
                // Last-write-wins: the latest crawl's URL and image replace
                // whatever is stored, without conflict detection.
                tx.execute(
                    "UPDATE categories SET url = ?1, image_url = ?2, updated_at = ?3 WHERE id = ?4",
                    params![url, image_url, now, existing.id],
                )?;
            }
            None => {
                tx.execute(
                    "INSERT INTO categories (name, url, image_url, is_active, created_at, updated_at)
                     VALUES (?1, ?2, ?3, 1, ?4, ?4)",
                    params![name, url, image_url, now],
                )?;
            }
        }

        let record = category_by_name(&tx, name)?
            .ok_or_else(|| StorageError::CategoryNotFound(name.to_string()))?;
        tx.commit()?;

        Ok(record)
    }

    fn find_category_by_name(&self, name: &str) -> StorageResult<Option<CategoryRecord>> {
        category_by_name(&self.conn, name)
    }

    fn upsert_product(
        &mut self,
        category_id: i64,
        product: &NewProduct,
    ) -> StorageResult<ProductRecord> {
        let images_json = serde_json::to_string(&product.images)?;
        let specifications_json = serde_json::to_string(&product.specifications)?;
        let price_text = product.price.to_string();

        let tx = self.conn.transaction()?;
        let now = Utc::now().to_rfc3339();

        // Identity resolution: external product ID first, then the
        // (title, category) pair.
        let existing = match product.product_id.as_deref() {
            Some(pid) => product_by_external_id(&tx, pid)?,
            None => product_by_identity(&tx, &product.title, category_id)?,
        };

        let id = match existing {
            Some(existing) => {
                tx.execute(
                    "UPDATE products SET title = ?1, category_id = ?2, url = ?3, image_url = ?4,
                         price = ?5, price_display = ?6, availability = ?7, product_id = ?8,
                         variant_id = ?9, description_text = ?10, images = ?11,
                         specifications = ?12, is_active = 1, updated_at = ?13
                     WHERE id = ?14",
                    params![
                        product.title,
                        category_id,
                        product.url,
                        product.image_url,
                        price_text,
                        product.price_display,
                        product.availability.to_db_string(),
                        product.product_id,
                        product.variant_id,
                        product.description_text,
                        images_json,
                        specifications_json,
                        now,
                        existing.id
                    ],
                )?;
                existing.id
            }
            None => {
                tx.execute(
                    "INSERT INTO products (title, category_id, url, image_url, price,
                         price_display, availability, product_id, variant_id, description_text,
                         images, specifications, is_active, created_at, updated_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, 1, ?13, ?13)",
                    params![
                        product.title,
                        category_id,
                        product.url,
                        product.image_url,
                        price_text,
                        product.price_display,
                        product.availability.to_db_string(),
                        product.product_id,
                        product.variant_id,
                        product.description_text,
                        images_json,
                        specifications_json,
                        now
                    ],
                )?;
                tx.last_insert_rowid()
            }
        };

        let record = product_by_id(&tx, id)?.ok_or(StorageError::ProductNotFound(id))?;
        tx.commit()?;

        Ok(record)
    }

    fn find_product_by_external_id(
        &self,
        product_id: &str,
    ) -> StorageResult<Option<ProductRecord>> {
        product_by_external_id(&self.conn, product_id)
    }

    fn find_product_by_identity(
        &self,
        title: &str,
        category_id: i64,
    ) -> StorageResult<Option<ProductRecord>> {
        product_by_identity(&self.conn, title, category_id)
    }

    fn category_product_count(&self, category_id: i64) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM products WHERE category_id = ?1",
            params![category_id],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn count_active_categories(&self) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM categories WHERE is_active = 1",
            [],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn count_active_products(&self) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM products WHERE is_active = 1",
            [],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }
}

// Free-function query helpers so the same lookups work on a plain
// connection and inside a transaction.

fn category_by_name(conn: &Connection, name: &str) -> StorageResult<Option<CategoryRecord>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, url, image_url, is_active, created_at, updated_at
         FROM categories WHERE name = ?1",
    )?;

    let category = stmt
        .query_row(params![name], |row| {
            Ok(CategoryRecord {
                id: row.get(0)?,
                name: row.get(1)?,
                url: row.get(2)?,
                image_url: row.get(3)?,
                is_active: row.get(4)?,
                created_at: row.get(5)?,
                updated_at: row.get(6)?,
            })
        })
        .optional()?;

    Ok(category)
}

fn product_by_id(conn: &Connection, id: i64) -> StorageResult<Option<ProductRecord>> {
    let sql = format!("SELECT {} FROM products WHERE id = ?1", PRODUCT_COLUMNS);
    let mut stmt = conn.prepare(&sql)?;
    let product = stmt.query_row(params![id], row_to_product).optional()?;
    Ok(product)
}

fn product_by_external_id(
    conn: &Connection,
    product_id: &str,
) -> StorageResult<Option<ProductRecord>> {
    let sql = format!(
        "SELECT {} FROM products WHERE product_id = ?1",
        PRODUCT_COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let product = stmt
        .query_row(params![product_id], row_to_product)
        .optional()?;
    Ok(product)
}

fn product_by_identity(
    conn: &Connection,
    title: &str,
    category_id: i64,
) -> StorageResult<Option<ProductRecord>> {
    let sql = format!(
        "SELECT {} FROM products WHERE title = ?1 AND category_id = ?2",
        PRODUCT_COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let product = stmt
        .query_row(params![title, category_id], row_to_product)
        .optional()?;
    Ok(product)
}

fn row_to_product(row: &Row<'_>) -> rusqlite::Result<ProductRecord> {
    let price_text: String = row.get(5)?;
    let price = Decimal::from_str(&price_text)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(5, Type::Text, Box::new(e)))?;

    let availability_text: String = row.get(7)?;
    let availability =
        Availability::from_db_string(&availability_text).unwrap_or(Availability::InStock);

    let images_json: String = row.get(11)?;
    let images = serde_json::from_str(&images_json).unwrap_or_default();

    let specifications_json: String = row.get(12)?;
    let specifications = serde_json::from_str(&specifications_json).unwrap_or_default();

    Ok(ProductRecord {
        id: row.get(0)?,
        title: row.get(1)?,
        category_id: row.get(2)?,
        url: row.get(3)?,
        image_url: row.get(4)?,
        price,
        price_display: row.get(6)?,
        availability,
        product_id: row.get(8)?,
        variant_id: row.get(9)?,
        description_text: row.get(10)?,
        images,
        specifications,
        is_active: row.get(13)?,
        created_at: row.get(14)?,
        updated_at: row.get(15)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    fn sample_product(title: &str, product_id: Option<&str>) -> NewProduct {
        let mut specifications = IndexMap::new();
        specifications.insert("Weight".to_string(), "50kg".to_string());

        NewProduct {
            title: title.to_string(),
            url: format!("https://shop.example.com/products/{}", title.to_lowercase()),
            image_url: Some("https://cdn.example.com/p.jpg".to_string()),
            price: Decimal::from_str("330.00").unwrap(),
            price_display: Some("Rs. 330.00".to_string()),
            availability: Availability::InStock,
            product_id: product_id.map(|s| s.to_string()),
            variant_id: Some("V1".to_string()),
            description_text: "Strong cement".to_string(),
            images: vec!["https://cdn.example.com/1.jpg".to_string()],
            specifications,
        }
    }

    #[test]
    fn test_category_upsert_creates_then_updates() {
        let mut store = SqliteStore::new_in_memory().unwrap();

        let created = store
            .upsert_category("Cement", "https://shop.example.com/c/cement", Some("img1"))
            .unwrap();
        assert!(created.is_active);
        assert_eq!(created.image_url.as_deref(), Some("img1"));

        let updated = store
            .upsert_category("Cement", "https://shop.example.com/c/cement-2", Some("img2"))
            .unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.url, "https://shop.example.com/c/cement-2");
        assert_eq!(updated.image_url.as_deref(), Some("img2"));

        assert_eq!(store.count_active_categories().unwrap(), 1);
    }

    #[test]
    fn test_category_match_is_case_insensitive() {
        let mut store = SqliteStore::new_in_memory().unwrap();

        let created = store.upsert_category("Cement", "url1", None).unwrap();
        let matched = store.upsert_category("CEMENT", "url2", None).unwrap();

        assert_eq!(matched.id, created.id);
        assert_eq!(store.count_active_categories().unwrap(), 1);
    }

    #[test]
    fn test_product_upsert_by_external_id() {
        let mut store = SqliteStore::new_in_memory().unwrap();
        let category = store.upsert_category("Cement", "url", None).unwrap();

        let first = store
            .upsert_product(category.id, &sample_product("OPC 53 Grade", Some("P123")))
            .unwrap();

        // Same external ID, changed title and price: one record, all
        // fields overwritten
        let mut changed = sample_product("OPC 53 Grade (new)", Some("P123"));
        changed.price = Decimal::from_str("350.00").unwrap();
        let second = store.upsert_product(category.id, &changed).unwrap();

        assert_eq!(second.id, first.id);
        assert_eq!(second.title, "OPC 53 Grade (new)");
        assert_eq!(second.price.to_string(), "350.00");
        assert_eq!(store.count_active_products().unwrap(), 1);
    }

    #[test]
    fn test_product_upsert_by_title_and_category() {
        let mut store = SqliteStore::new_in_memory().unwrap();
        let category = store.upsert_category("Cement", "url", None).unwrap();

        let first = store
            .upsert_product(category.id, &sample_product("OPC 53 Grade", None))
            .unwrap();
        let second = store
            .upsert_product(category.id, &sample_product("OPC 53 Grade", None))
            .unwrap();

        assert_eq!(second.id, first.id);
        assert_eq!(store.count_active_products().unwrap(), 1);
    }

    #[test]
    fn test_same_title_different_category_is_distinct() {
        let mut store = SqliteStore::new_in_memory().unwrap();
        let cement = store.upsert_category("Cement", "url1", None).unwrap();
        let steel = store.upsert_category("Steel", "url2", None).unwrap();

        store
            .upsert_product(cement.id, &sample_product("Bestseller", None))
            .unwrap();
        store
            .upsert_product(steel.id, &sample_product("Bestseller", None))
            .unwrap();

        assert_eq!(store.count_active_products().unwrap(), 2);
    }

    #[test]
    fn test_product_fields_roundtrip() {
        let mut store = SqliteStore::new_in_memory().unwrap();
        let category = store.upsert_category("Cement", "url", None).unwrap();

        let saved = store
            .upsert_product(category.id, &sample_product("OPC 53 Grade", Some("P123")))
            .unwrap();

        let loaded = store
            .find_product_by_external_id("P123")
            .unwrap()
            .expect("product should exist");

        assert_eq!(loaded.id, saved.id);
        assert_eq!(loaded.title, "OPC 53 Grade");
        assert_eq!(loaded.price.to_string(), "330.00");
        assert_eq!(loaded.price_display.as_deref(), Some("Rs. 330.00"));
        assert_eq!(loaded.availability, Availability::InStock);
        assert_eq!(loaded.variant_id.as_deref(), Some("V1"));
        assert_eq!(loaded.images, vec!["https://cdn.example.com/1.jpg".to_string()]);
        assert_eq!(loaded.specifications["Weight"], "50kg");
        assert!(loaded.is_active);
    }

    #[test]
    fn test_category_product_count() {
        let mut store = SqliteStore::new_in_memory().unwrap();
        let category = store.upsert_category("Cement", "url", None).unwrap();

        assert_eq!(store.category_product_count(category.id).unwrap(), 0);
        store
            .upsert_product(category.id, &sample_product("A", None))
            .unwrap();
        store
            .upsert_product(category.id, &sample_product("B", None))
            .unwrap();
        assert_eq!(store.category_product_count(category.id).unwrap(), 2);
    }
}

//! Harvest orchestration - the main crawl loop
//!
//! This module drives the whole pipeline for one run:
//! - Fetch the site root once and discover categories
//! - Upsert each category before touching its products
//! - Walk each category's listing pages until one comes back empty
//! - Fetch, extract, normalize, and persist each product exactly once
//! - Accumulate the snapshot structure and write it at the end
//!
//! Failure isolation rules: a product-level failure is logged and
//! counted but never aborts the page loop; a listing-page failure ends
//! that category's pagination only; a root fetch failure ends the run.

use crate::config::Config;
use crate::crawler::extract::{
    discover_categories, extract_listing_cards, extract_product_detail, DiscoveredCategory,
    ListingCard,
};
use crate::crawler::fetcher::{build_http_client, fetch_page};
use crate::normalize::{parse_price, sanitize_text, Availability};
use crate::output::{write_snapshot, CategorySnapshot, ProductSnapshot};
use crate::storage::{CatalogStore, CategoryRecord, NewProduct};
use crate::HarvestError;
use reqwest::Client;
use rust_decimal::Decimal;
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Counters reported at the end of a harvest run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub categories_seen: u64,
    pub products_saved: u64,
    pub products_skipped: u64,
    pub errors: u64,
}

/// Outcome of processing a single listing card
enum CardOutcome {
    Saved,
    SkippedNoPrice,
}

/// Main harvest orchestrator
///
/// Owns the HTTP client, the injected store handle, the per-run snapshot
/// accumulator, and the cancellation token checked between fetches.
pub struct Harvester<S: CatalogStore> {
    config: Config,
    base: Url,
    client: Client,
    store: S,
    cancel: CancellationToken,
    snapshot: Vec<CategorySnapshot>,
    summary: RunSummary,
}

impl<S: CatalogStore> Harvester<S> {
    /// Creates a new harvester
    ///
    /// # Arguments
    ///
    /// * `config` - Validated run configuration
    /// * `store` - Persistence gateway handle (dependency-injected; no
    ///   process-wide store initialization happens here)
    /// * `cancel` - Token checked between fetches for clean shutdown
    ///
    /// # Returns
    ///
    /// * `Ok(Harvester)` - Ready to run
    /// * `Err(HarvestError)` - Invalid base URL or HTTP client failure
    pub fn new(config: Config, store: S, cancel: CancellationToken) -> Result<Self, HarvestError> {
        let base = Url::parse(&config.site.base_url)?;
        let client = build_http_client(&config.http)?;

        Ok(Self {
            config,
            base,
            client,
            store,
            cancel,
            snapshot: Vec::new(),
            summary: RunSummary::default(),
        })
    }

    /// Runs the full harvest: discovery, per-category crawl, snapshot.
    ///
    /// Returns the run summary on completion. Cancellation between
    /// fetches ends the run early without touching already-persisted
    /// records; the snapshot still covers everything harvested so far.
    pub async fn run(mut self) -> Result<RunSummary, HarvestError> {
        tracing::info!(base = %self.base, "starting catalog harvest");

        let body = fetch_page(&self.client, self.base.as_str(), &self.config.http).await?;
        let categories = discover_categories(&body, &self.base);
        tracing::info!(count = categories.len(), "discovered categories");

        for (_, discovered) in categories {
            if self.cancel.is_cancelled() {
                tracing::warn!("cancellation requested; stopping before next category");
                break;
            }

            self.summary.categories_seen += 1;
            if let Err(e) = self.harvest_category(&discovered).await {
                tracing::error!(
                    category = %discovered.name,
                    error = %e,
                    "category failed; continuing with next"
                );
                self.summary.errors += 1;
            }
        }

        // Snapshot is purely additive; records persisted during the crawl
        // stay committed no matter what happens here.
        let snapshot_path = self.config.output.snapshot_path.clone();
        if let Err(e) = write_snapshot(Path::new(&snapshot_path), &self.snapshot) {
            tracing::error!(path = %snapshot_path, error = %e, "snapshot write failed");
            self.summary.errors += 1;
        } else {
            tracing::info!(path = %snapshot_path, "snapshot written");
        }

        tracing::info!(
            categories_seen = self.summary.categories_seen,
            products_saved = self.summary.products_saved,
            products_skipped = self.summary.products_skipped,
            errors = self.summary.errors,
            "harvest complete"
        );

        Ok(self.summary)
    }

    /// Harvests one category: upsert, then paginate until an empty page.
    ///
    /// Returns an error only for category-scoped failures (the category
    /// upsert itself); listing-page and product-level failures are
    /// handled internally so already-harvested products are kept.
    async fn harvest_category(
        &mut self,
        discovered: &DiscoveredCategory,
    ) -> Result<(), HarvestError> {
        // Categories become visible before any product work, so a category
        // survives even if every one of its product fetches fails.
        let category = self.store.upsert_category(
            &discovered.name,
            &discovered.url,
            discovered.image_url.as_deref(),
        )?;
        tracing::info!(category = %category.name, "category saved");

        if self.config.crawl.skip_populated_categories
            && self.store.category_product_count(category.id)? > 0
        {
            tracing::info!(
                category = %category.name,
                "skipping category that already has products"
            );
            self.snapshot.push(CategorySnapshot::new(discovered));
            return Ok(());
        }

        let mut snap = CategorySnapshot::new(discovered);
        let mut seen: HashSet<String> = HashSet::new();
        let mut page: u32 = 1;

        'pages: loop {
            if self.cancel.is_cancelled() {
                break;
            }

            let page_url = listing_page_url(&discovered.url, page);
            let body = match fetch_page(&self.client, &page_url, &self.config.http).await {
                Ok(b) => b,
                Err(e) => {
                    // Terminal for this category only; what was saved stays.
                    tracing::error!(
                        category = %category.name,
                        url = %page_url,
                        error = %e,
                        "listing page fetch failed; abandoning remaining pages"
                    );
                    self.summary.errors += 1;
                    break;
                }
            };

            let cards = extract_listing_cards(&body, &self.base);
            if cards.is_empty() {
                tracing::debug!(category = %category.name, page, "empty page, pagination done");
                break;
            }

            for card in cards {
                if self.cancel.is_cancelled() {
                    break 'pages;
                }
                if seen.contains(&card.url) {
                    continue;
                }

                match self.process_card(&category, &card, &mut seen, &mut snap).await {
                    Ok(CardOutcome::Saved) => self.summary.products_saved += 1,
                    Ok(CardOutcome::SkippedNoPrice) => self.summary.products_skipped += 1,
                    Err(e) => {
                        self.summary.errors += 1;
                        tracing::error!(
                            category = %category.name,
                            product_url = %card.url,
                            error = %e,
                            "product failed; continuing with page"
                        );
                    }
                }

                sleep(Duration::from_millis(self.config.crawl.request_delay_ms)).await;
            }

            page += 1;
        }

        tracing::info!(
            category = %category.name,
            products = snap.products.len(),
            "category harvested"
        );
        self.snapshot.push(snap);
        Ok(())
    }

    /// Fetches one product's detail page, assembles and persists the payload
    async fn process_card(
        &mut self,
        category: &CategoryRecord,
        card: &ListingCard,
        seen: &mut HashSet<String>,
        snap: &mut CategorySnapshot,
    ) -> Result<CardOutcome, HarvestError> {
        let detail_body = fetch_page(&self.client, &card.url, &self.config.http).await?;
        let detail = extract_product_detail(&detail_body);

        // The payload exists now: it goes into the snapshot and the URL is
        // marked seen, whether or not the store accepts it.
        snap.products.push(ProductSnapshot::from_parts(card, &detail));
        seen.insert(card.url.clone());

        let price = match card.price_display.as_deref().and_then(parse_price) {
            Some(p) if p > Decimal::ZERO => p,
            _ => {
                tracing::warn!(
                    product = %card.title,
                    price = ?card.price_display,
                    "skipping product without a parseable positive price"
                );
                return Ok(CardOutcome::SkippedNoPrice);
            }
        };

        let availability = Availability::from_text(detail.availability.as_deref());
        let description_text = sanitize_text(detail.description_text.as_deref().unwrap_or(""));

        let new_product = NewProduct {
            title: card.title.clone(),
            url: card.url.clone(),
            image_url: card.image_url.clone(),
            price,
            price_display: card.price_display.clone(),
            availability,
            product_id: detail.product_id,
            variant_id: detail.variant_id,
            description_text,
            images: detail.images,
            specifications: detail.specifications,
        };

        self.store.upsert_product(category.id, &new_product)?;
        tracing::debug!(product = %card.title, "product saved");
        Ok(CardOutcome::Saved)
    }
}

/// Builds the URL of one listing page within a category
fn listing_page_url(category_url: &str, page: u32) -> String {
    format!("{}?page={}", category_url, page)
}

//! # Ports
//!
//! Narrow storage interfaces consumed by the pricing services.
//!
//! Each trait names exactly the operations one service needs, so a service
//! holding an `Arc<dyn VariantPriceReader>` cannot write prices by accident.
//! tessera-db implements every trait on SQLite; tests may substitute their
//! own implementations.
//!
//! ```text
//! PriceStore ────────► VariantPriceReader + VariantPriceWriter + VariantLookup
//! RegionalOverrides ─► RegionalOverrideRepository + VariantLookup
//! HistoryRecorder ───► PriceHistoryLog
//! PriceResolver ─────► VariantPriceReader + PricingRecordReader
//! BulkReconciler ────► VariantLookup (+ the services above)
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::StoreResult;
use crate::money::Currency;
use crate::types::{
    Price, PriceHistoryEntry, PricingRecord, RegionalFilter, RegionalOverride, ValidatedPrice,
    VariantSummary,
};

/// The catalog directory: variant existence, SKU lookup, titles.
#[async_trait]
pub trait VariantLookup: Send + Sync {
    async fn find_variant(&self, variant_id: &str) -> StoreResult<Option<VariantSummary>>;

    /// First variant carrying `sku`.
    async fn find_variant_by_sku(&self, sku: &str) -> StoreResult<Option<VariantSummary>>;

    async fn list_variants(
        &self,
        product_id: Option<&str>,
        offset: u32,
        limit: u32,
    ) -> StoreResult<Vec<VariantSummary>>;
}

/// Read access to price sets.
#[async_trait]
pub trait VariantPriceReader: Send + Sync {
    /// Id of the variant's price set, if one was ever created.
    async fn find_price_set_id(&self, variant_id: &str) -> StoreResult<Option<String>>;

    async fn list_prices(&self, price_set_id: &str) -> StoreResult<Vec<Price>>;
}

/// Write access to price sets.
#[async_trait]
pub trait VariantPriceWriter: Send + Sync {
    /// Creates the variant's price set unless one exists; returns the
    /// id of whichever set the variant ends up with.
    async fn create_price_set(&self, variant_id: &str) -> StoreResult<String>;

    async fn insert_price(&self, price_set_id: &str, price: &ValidatedPrice) -> StoreResult<Price>;

    /// Replaces the amount; absent tier bounds keep their stored values.
    async fn update_price(&self, price_id: &str, price: &ValidatedPrice) -> StoreResult<Price>;

    async fn delete_price(&self, price_id: &str) -> StoreResult<()>;
}

/// Keyed `(variant, region, currency)` override storage.
#[async_trait]
pub trait RegionalOverrideRepository: Send + Sync {
    /// Inserts or replaces an override, keeping `created_at` on replace.
    async fn upsert_override(
        &self,
        variant_id: &str,
        region_id: &str,
        currency: Currency,
        amount: i64,
    ) -> StoreResult<RegionalOverride>;

    async fn find_override(
        &self,
        variant_id: &str,
        region_id: &str,
        currency: Currency,
    ) -> StoreResult<Option<RegionalOverride>>;

    async fn list_variant_overrides(
        &self,
        variant_id: &str,
        filter: &RegionalFilter,
    ) -> StoreResult<Vec<RegionalOverride>>;

    /// Overrides of one region across variants, newest `updated_at` first.
    async fn list_region_overrides(
        &self,
        region_id: &str,
        currency: Option<Currency>,
        limit: u32,
    ) -> StoreResult<Vec<RegionalOverride>>;

    /// Returns `false` when nothing matched.
    async fn delete_override(
        &self,
        variant_id: &str,
        region_id: &str,
        currency: Currency,
    ) -> StoreResult<bool>;
}

/// Append-only, per-variant bounded price history.
#[async_trait]
pub trait PriceHistoryLog: Send + Sync {
    /// Prepends `entry` and drops everything past `max_entries` for that variant.
    async fn append(&self, entry: &PriceHistoryEntry, max_entries: u32) -> StoreResult<()>;

    /// Newest first.
    async fn list_variant_history(
        &self,
        variant_id: &str,
        currency: Option<Currency>,
        limit: u32,
    ) -> StoreResult<Vec<PriceHistoryEntry>>;

    /// Entries since `since` across every variant, newest first.
    async fn list_recent_history(
        &self,
        currency: Option<Currency>,
        since: DateTime<Utc>,
        limit: u32,
    ) -> StoreResult<Vec<PriceHistoryEntry>>;
}

/// Loads the full typed aggregate for a variant.
#[async_trait]
pub trait PricingRecordReader: Send + Sync {
    async fn load_record(&self, variant_id: &str) -> StoreResult<PricingRecord>;
}

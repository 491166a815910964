//! # Price Backfill
//!
//! Gives every catalog variant without prices a default price in the
//! default currency. Dry run by default.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use tessera_core::money::format_price;
use tessera_core::ports::VariantLookup;
use tessera_core::{BULK_SCAN_LIMIT, DEFAULT_CURRENCY};

use crate::error::PricingResult;
use crate::store::PriceStore;

/// Amount given to unpriced variants (29.99 in the default currency).
pub const DEFAULT_BACKFILL_AMOUNT: i64 = 2999;

/// Counters reported at the end of a backfill run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BackfillStats {
    pub total_variants: usize,
    pub with_prices: usize,
    pub without_prices: usize,
    pub created_prices: usize,
    pub errors: usize,
}

/// Walks the whole catalog and prices unpriced variants.
pub struct PriceBackfill {
    catalog: Arc<dyn VariantLookup>,
    store: PriceStore,
}

impl PriceBackfill {
    pub fn new(catalog: Arc<dyn VariantLookup>, store: PriceStore) -> Self {
        PriceBackfill { catalog, store }
    }

    /// Runs the backfill. Nothing is written unless `apply` is set.
    ///
    /// A failing variant is counted in `errors` and skipped.
    pub async fn run(&self, apply: bool) -> PricingResult<BackfillStats> {
        let mut stats = BackfillStats::default();
        let mut offset = 0;

        info!(apply, "Starting price backfill");

        loop {
            let page = self
                .catalog
                .list_variants(None, offset, BULK_SCAN_LIMIT)
                .await?;
            if page.is_empty() {
                break;
            }
            offset += page.len() as u32;

            for variant in page {
                stats.total_variants += 1;

                let prices = match self.store.get_variant_prices(&variant.id).await {
                    Ok(prices) => prices,
                    Err(e) => {
                        warn!(variant_id = %variant.id, error = %e, "Could not read prices");
                        stats.errors += 1;
                        continue;
                    }
                };

                if !prices.is_empty() {
                    stats.with_prices += 1;
                    continue;
                }

                stats.without_prices += 1;
                if !apply {
                    info!(
                        variant_id = %variant.id,
                        would_create = %format_price(DEFAULT_BACKFILL_AMOUNT, DEFAULT_CURRENCY),
                        "Variant missing prices (dry run)"
                    );
                    continue;
                }

                match self
                    .store
                    .set_variant_price(&variant.id, DEFAULT_CURRENCY.code(), DEFAULT_BACKFILL_AMOUNT)
                    .await
                {
                    Ok(_) => stats.created_prices += 1,
                    Err(e) => {
                        warn!(variant_id = %variant.id, error = %e, "Could not create default price");
                        stats.errors += 1;
                    }
                }
            }
        }

        info!(
            total_variants = stats.total_variants,
            with_prices = stats.with_prices,
            without_prices = stats.without_prices,
            created_prices = stats.created_prices,
            errors = stats.errors,
            "Price backfill finished"
        );
        Ok(stats)
    }
}

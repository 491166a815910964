//! # Bulk Reconciler
//!
//! Multi-variant price updates and CSV import/export.
//!
//! ## Fault Isolation
//! ```text
//! ┌───────────────────────────┬──────────────────────────────────────────┐
//! │ Operation                 │ One bad item ...                         │
//! ├───────────────────────────┼──────────────────────────────────────────┤
//! │ PriceStore::bulk_set      │ fails the whole call, nothing written    │
//! │ BulkReconciler::bulk_update│ fails that variant, others continue     │
//! │ BulkReconciler::import_csv│ fails that row, others continue          │
//! └───────────────────────────┴──────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use tessera_core::ports::{VariantLookup, VariantPriceReader};
use tessera_core::transfer::{parse_import, render_export, ExportRow, ImportResult, ImportRow};
use tessera_core::validation::validate_price_input;
use tessera_core::{
    BulkSetResult, ChangeAttribution, CoreError, Currency, FormattedPrice, PriceCreateInput,
    RegionalFilter, VariantListQuery, VariantSummary, VariantWithPrices, DEFAULT_CURRENCY,
};

use crate::error::{PricingError, PricingResult};
use crate::regional::RegionalOverrides;
use crate::store::PriceStore;

// =============================================================================
// Bulk Update Types
// =============================================================================

/// Prices to set on one variant.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VariantPriceUpdate {
    pub variant_id: String,
    pub prices: Vec<PriceCreateInput>,
}

/// A variant whose update failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BulkUpdateError {
    pub variant_id: String,
    pub error: String,
}

/// Totals over every variant of a bulk update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BulkUpdateResult {
    pub created: u32,
    pub updated: u32,
    pub errors: Vec<BulkUpdateError>,
}

/// Export filters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportFilter {
    pub product_id: Option<String>,
    pub currency_code: Option<Currency>,
    /// When set, this region's overrides are exported as extra rows.
    pub region_id: Option<String>,
}

// =============================================================================
// Reconciler
// =============================================================================

/// Bulk operations spanning many variants.
#[derive(Clone)]
pub struct BulkReconciler {
    catalog: Arc<dyn VariantLookup>,
    reader: Arc<dyn VariantPriceReader>,
    store: PriceStore,
    regional: RegionalOverrides,
}

impl BulkReconciler {
    pub fn new(
        catalog: Arc<dyn VariantLookup>,
        reader: Arc<dyn VariantPriceReader>,
        store: PriceStore,
        regional: RegionalOverrides,
    ) -> Self {
        BulkReconciler {
            catalog,
            reader,
            store,
            regional,
        }
    }

    /// Applies each variant's prices independently.
    ///
    /// A failing variant is reported in `errors` and does not stop the rest.
    pub async fn bulk_update(
        &self,
        updates: &[VariantPriceUpdate],
        attribution: &ChangeAttribution,
    ) -> BulkUpdateResult {
        let mut result = BulkUpdateResult::default();

        for update in updates {
            match self
                .store
                .bulk_set_variant_prices(&update.variant_id, &update.prices, attribution)
                .await
            {
                Ok(BulkSetResult { created, updated }) => {
                    result.created += created;
                    result.updated += updated;
                }
                Err(e) => {
                    warn!(variant_id = %update.variant_id, error = %e, "Bulk update failed for variant");
                    result.errors.push(BulkUpdateError {
                        variant_id: update.variant_id.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        info!(
            variants = updates.len(),
            created = result.created,
            updated = result.updated,
            failed = result.errors.len(),
            "Bulk update complete"
        );
        result
    }

    /// Imports a CSV price file.
    ///
    /// Only an unusable header row fails the call; every other problem is
    /// reported per row. A `dry_run` resolves variants and validates prices
    /// without writing, so `successful` counts rows a live run would apply.
    /// Rows carrying a `region_id` set a regional override instead of a base
    /// price.
    pub async fn import_csv(
        &self,
        csv_text: &str,
        dry_run: bool,
        attribution: &ChangeAttribution,
    ) -> PricingResult<ImportResult> {
        let (rows, mut result) = parse_import(csv_text)?.into_result();

        for row in &rows {
            let variant_id = match self.resolve_row_variant(row).await {
                Ok(variant) => variant.id,
                Err(e) => {
                    result.fail(row.error(e.to_string()));
                    continue;
                }
            };

            let input = row.to_price_input();
            if let Err(errors) = validate_price_input(&input) {
                result.fail(row.error(CoreError::InvalidPrice(errors).to_string()));
                continue;
            }

            if dry_run {
                result.successful += 1;
                continue;
            }

            let applied = match row.region_id.as_deref() {
                Some(region_id) => self
                    .regional
                    .set_regional_price(
                        &variant_id,
                        region_id,
                        &input.currency_code,
                        input.amount as i64,
                        attribution,
                    )
                    .await
                    .map(|_| ()),
                None => self
                    .store
                    .bulk_set_variant_prices(&variant_id, &[input], attribution)
                    .await
                    .map(|_| ()),
            };

            match applied {
                Ok(()) => result.successful += 1,
                Err(e) => result.fail(row.error(e.to_string())),
            }
        }

        info!(
            total_rows = result.total_rows,
            successful = result.successful,
            failed = result.failed,
            dry_run,
            "CSV import complete"
        );
        Ok(result)
    }

    /// Lists variants with their prices, optionally filtered by currency.
    pub async fn list_variants_with_prices(
        &self,
        query: &VariantListQuery,
    ) -> PricingResult<Vec<VariantWithPrices>> {
        let variants = self
            .catalog
            .list_variants(query.product_id.as_deref(), query.offset, query.limit)
            .await?;

        let mut listed = Vec::with_capacity(variants.len());
        for variant in variants {
            listed.push(self.with_prices(variant, query.currency_code).await?);
        }

        debug!(count = listed.len(), "Listed variants with prices");
        Ok(listed)
    }

    /// Renders variants and prices as an import-compatible CSV.
    ///
    /// One row per stored price, tier bounds included. With a region filter
    /// every override of that region follows as its own row carrying the
    /// `region_id`. A variant with nothing to export still gets a zero-amount
    /// row (tagged with the region when one is given) so the file can be
    /// filled in and imported back.
    pub async fn export_csv(&self, filter: &ExportFilter, limit: u32) -> PricingResult<String> {
        let query = VariantListQuery {
            product_id: filter.product_id.clone(),
            currency_code: filter.currency_code,
            offset: 0,
            limit,
        };
        let variants = self.list_variants_with_prices(&query).await?;

        let mut rows = Vec::new();
        for variant in &variants {
            let overrides = match filter.region_id.as_deref() {
                Some(region_id) => {
                    let region_filter = RegionalFilter {
                        region_id: Some(region_id.to_string()),
                        currency_code: filter.currency_code,
                    };
                    self.regional
                        .get_regional_prices(&variant.id, &region_filter)
                        .await?
                }
                None => Vec::new(),
            };

            if variant.prices.is_empty() && overrides.is_empty() {
                let currency = filter.currency_code.unwrap_or(DEFAULT_CURRENCY);
                rows.push(export_row(variant, currency, 0, filter.region_id.clone(), None, None));
                continue;
            }

            for price in &variant.prices {
                rows.push(export_row(
                    variant,
                    price.currency_code,
                    price.amount,
                    None,
                    price.min_quantity,
                    price.max_quantity,
                ));
            }
            for regional in &overrides {
                rows.push(export_row(
                    variant,
                    regional.currency_code,
                    regional.amount,
                    Some(regional.region_id.clone()),
                    None,
                    None,
                ));
            }
        }

        info!(variants = variants.len(), rows = rows.len(), "Prices exported");
        Ok(render_export(&rows)?)
    }

    async fn with_prices(
        &self,
        variant: VariantSummary,
        currency: Option<Currency>,
    ) -> PricingResult<VariantWithPrices> {
        let price_set_id = self.reader.find_price_set_id(&variant.id).await?;
        let prices = match price_set_id.as_deref() {
            Some(id) => self.reader.list_prices(id).await?,
            None => Vec::new(),
        };

        Ok(VariantWithPrices {
            id: variant.id,
            title: variant.title,
            sku: variant.sku,
            product_id: variant.product_id,
            product_title: variant.product_title,
            price_set_id,
            prices: prices
                .iter()
                .filter(|p| currency.map_or(true, |c| p.currency_code == c))
                .map(FormattedPrice::from)
                .collect(),
        })
    }

    async fn resolve_row_variant(&self, row: &ImportRow) -> PricingResult<VariantSummary> {
        if let Some(variant_id) = row.variant_id.as_deref() {
            return self
                .catalog
                .find_variant(variant_id)
                .await?
                .ok_or_else(|| CoreError::VariantNotFound(variant_id.to_string()).into());
        }

        // parse_import guarantees variant_id or sku.
        let sku = row.sku.as_deref().unwrap_or_default();
        self.catalog
            .find_variant_by_sku(sku)
            .await?
            .ok_or_else(|| PricingError::from(CoreError::SkuNotFound(sku.to_string())))
    }
}

fn export_row(
    variant: &VariantWithPrices,
    currency: Currency,
    amount: i64,
    region_id: Option<String>,
    min_quantity: Option<i64>,
    max_quantity: Option<i64>,
) -> ExportRow {
    ExportRow {
        variant_id: variant.id.clone(),
        sku: variant.sku.clone().unwrap_or_default(),
        variant_title: variant.title.clone(),
        product_title: variant.product_title.clone(),
        currency_code: currency,
        amount,
        formatted_amount: tessera_core::money::format_price(amount, currency),
        region_id,
        min_quantity,
        max_quantity,
    }
}

//! # Regional Overrides
//!
//! Region and currency specific amounts layered over the base price set.
//! Keyed `<region>_<currency>` per variant; independent of the price set.

use std::sync::Arc;

use tracing::{debug, info};

use tessera_core::ports::{RegionalOverrideRepository, VariantLookup};
use tessera_core::validation::{validate_price, validate_required};
use tessera_core::{
    ChangeAttribution, CoreError, Currency, PriceHistoryEntry, RegionalFilter, RegionalOverride,
    BULK_SCAN_LIMIT,
};

use crate::error::PricingResult;
use crate::history::HistoryRecorder;

/// Filters for the cross-variant region scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegionScanFilter {
    pub currency_code: Option<Currency>,
    pub limit: Option<u32>,
}

/// Regional override CRUD.
#[derive(Clone)]
pub struct RegionalOverrides {
    catalog: Arc<dyn VariantLookup>,
    repo: Arc<dyn RegionalOverrideRepository>,
    history: HistoryRecorder,
}

impl RegionalOverrides {
    pub fn new(
        catalog: Arc<dyn VariantLookup>,
        repo: Arc<dyn RegionalOverrideRepository>,
        history: HistoryRecorder,
    ) -> Self {
        RegionalOverrides {
            catalog,
            repo,
            history,
        }
    }

    /// Creates or replaces the override for `(region, currency)`.
    ///
    /// `created_at` of an existing override is kept.
    pub async fn set_regional_price(
        &self,
        variant_id: &str,
        region_id: &str,
        currency_code: &str,
        amount: i64,
        attribution: &ChangeAttribution,
    ) -> PricingResult<RegionalOverride> {
        validate_required("region_id", region_id)?;

        let validation = validate_price(amount as f64, currency_code);
        if !validation.valid {
            return Err(CoreError::InvalidPrice(validation.errors).into());
        }
        let currency: Currency = currency_code.parse()?;

        if self.catalog.find_variant(variant_id).await?.is_none() {
            return Err(CoreError::VariantNotFound(variant_id.to_string()).into());
        }

        let previous = self.repo.find_override(variant_id, region_id, currency).await?;
        let stored = self
            .repo
            .upsert_override(variant_id, region_id, currency, amount)
            .await?;

        let old_amount = previous.map(|o| o.amount);
        if old_amount != Some(amount) {
            self.history.record(
                PriceHistoryEntry::now(variant_id, currency, old_amount, amount, attribution)
                    .in_region(region_id),
            );
        }

        info!(
            variant_id = %variant_id,
            region_id = %region_id,
            currency = %currency,
            amount,
            "Regional price set"
        );
        Ok(stored)
    }

    /// A variant's overrides, optionally narrowed by region and currency.
    pub async fn get_regional_prices(
        &self,
        variant_id: &str,
        filter: &RegionalFilter,
    ) -> PricingResult<Vec<RegionalOverride>> {
        Ok(self.repo.list_variant_overrides(variant_id, filter).await?)
    }

    /// One region's overrides across all variants, most recently updated first.
    ///
    /// Capped at [`BULK_SCAN_LIMIT`] entries.
    pub async fn get_bulk_regional_prices(
        &self,
        region_id: &str,
        filter: &RegionScanFilter,
    ) -> PricingResult<Vec<RegionalOverride>> {
        let limit = filter.limit.unwrap_or(BULK_SCAN_LIMIT).min(BULK_SCAN_LIMIT);
        debug!(region_id = %region_id, limit, "Scanning regional prices");

        Ok(self
            .repo
            .list_region_overrides(region_id, filter.currency_code, limit)
            .await?)
    }

    /// Removes an override. `false` when there was nothing to remove.
    pub async fn delete_regional_price(
        &self,
        variant_id: &str,
        region_id: &str,
        currency: Currency,
    ) -> PricingResult<bool> {
        let deleted = self
            .repo
            .delete_override(variant_id, region_id, currency)
            .await?;

        if deleted {
            info!(
                variant_id = %variant_id,
                region_id = %region_id,
                currency = %currency,
                "Regional price deleted"
            );
        }
        Ok(deleted)
    }
}

//! # Price Resolver
//!
//! Answers "what does a variant cost in this context".
//!
//! ```text
//! calculate_price(ctx)   base price set only: currency + quantity tier
//!                        (region / customer group are passed through as hints)
//!
//! effective_price(ctx)   calculate_price(ctx)
//!                          └─ + regional override for exactly (ctx.region, ctx.currency)
//!                               present? override wins, base kept as original_amount
//! ```
//!
//! Both are read-only and return `None` when nothing applies.

use std::sync::Arc;

use tracing::debug;

use tessera_core::ports::{PricingRecordReader, VariantPriceReader};
use tessera_core::resolve::{calculate_from_prices, compose_effective_price};
use tessera_core::validation::validate_quantity;
use tessera_core::{CalculatedPrice, CalculationContext, PricingRecord};

use crate::error::PricingResult;

/// Read-only price resolution.
#[derive(Clone)]
pub struct PriceResolver {
    reader: Arc<dyn VariantPriceReader>,
    records: Arc<dyn PricingRecordReader>,
}

impl PriceResolver {
    pub fn new(reader: Arc<dyn VariantPriceReader>, records: Arc<dyn PricingRecordReader>) -> Self {
        PriceResolver { reader, records }
    }

    /// Resolves the base price for a context, ignoring regional overrides.
    pub async fn calculate_price(
        &self,
        ctx: &CalculationContext,
    ) -> PricingResult<Option<CalculatedPrice>> {
        if let Some(quantity) = ctx.quantity {
            validate_quantity(quantity)?;
        }

        debug!(
            variant_id = %ctx.variant_id,
            currency = %ctx.currency_code,
            region_id = ?ctx.region_id,
            customer_group_id = ?ctx.customer_group_id,
            quantity = ?ctx.quantity,
            "Calculating price"
        );

        let Some(price_set_id) = self.reader.find_price_set_id(&ctx.variant_id).await? else {
            return Ok(None);
        };
        let prices = self.reader.list_prices(&price_set_id).await?;

        Ok(calculate_from_prices(&prices, ctx))
    }

    /// Resolves the price a buyer in `ctx.region_id` actually pays.
    pub async fn effective_price(
        &self,
        ctx: &CalculationContext,
    ) -> PricingResult<Option<CalculatedPrice>> {
        if let Some(quantity) = ctx.quantity {
            validate_quantity(quantity)?;
        }

        let record = self.records.load_record(&ctx.variant_id).await?;
        Ok(effective_from_record(&record, ctx))
    }

    /// Loads everything stored about a variant's pricing.
    pub async fn pricing_record(&self, variant_id: &str) -> PricingResult<PricingRecord> {
        Ok(self.records.load_record(variant_id).await?)
    }
}

fn effective_from_record(record: &PricingRecord, ctx: &CalculationContext) -> Option<CalculatedPrice> {
    let base = record
        .price_set
        .as_ref()
        .and_then(|set| calculate_from_prices(&set.prices, ctx));

    let regional = ctx.region_id.as_deref().and_then(|region_id| {
        record
            .overrides
            .iter()
            .find(|o| o.region_id == region_id && o.currency_code == ctx.currency_code)
    });

    compose_effective_price(ctx, base, regional)
}

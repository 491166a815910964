//! # Price Store
//!
//! Create-or-update operations over a variant's price set.
//!
//! ## Bulk Set
//! ```text
//! inputs ──► validate ALL ──any invalid──► Err(InvalidPrice), zero writes
//!                │
//!                ▼
//!          variant exists? ──no──► Err(VariantNotFound)
//!                │
//!                ▼
//!          ensure price set, load working list
//!                │
//!                ▼
//!   for each input (in order):
//!     matching price in working list? ──yes──► update   (updated += 1)
//!                                     └─no───► insert   (created += 1, joins list)
//!
//!   tiered input  matches: same currency AND same [min, max]
//!   tier-less     matches: tier-less price of the currency, else its first price
//!     amount changed or created? ──► history.record(...)
//! ```
//!
//! Writes are sequential and not rolled back: a store failure on item `k`
//! leaves items `1..k-1` written.

use std::sync::Arc;

use tracing::{debug, info};

use tessera_core::ports::{VariantLookup, VariantPriceReader, VariantPriceWriter};
use tessera_core::validation::{validate_price, validate_price_input};
use tessera_core::{
    BulkSetResult, ChangeAttribution, CoreError, Currency, Price, PriceCreateInput,
    PriceHistoryEntry, ValidatedPrice,
};

use crate::error::PricingResult;
use crate::history::HistoryRecorder;

/// Price set CRUD for variants.
#[derive(Clone)]
pub struct PriceStore {
    catalog: Arc<dyn VariantLookup>,
    reader: Arc<dyn VariantPriceReader>,
    writer: Arc<dyn VariantPriceWriter>,
    history: HistoryRecorder,
}

impl PriceStore {
    pub fn new(
        catalog: Arc<dyn VariantLookup>,
        reader: Arc<dyn VariantPriceReader>,
        writer: Arc<dyn VariantPriceWriter>,
        history: HistoryRecorder,
    ) -> Self {
        PriceStore {
            catalog,
            reader,
            writer,
            history,
        }
    }

    /// Returns the variant's price set id, creating an empty set if needed.
    pub async fn ensure_price_set(&self, variant_id: &str) -> PricingResult<String> {
        if let Some(id) = self.reader.find_price_set_id(variant_id).await? {
            return Ok(id);
        }

        let id = self.writer.create_price_set(variant_id).await?;
        info!(variant_id = %variant_id, price_set_id = %id, "Price set created");
        Ok(id)
    }

    /// All prices of a variant. Empty when the variant has no price set.
    pub async fn get_variant_prices(&self, variant_id: &str) -> PricingResult<Vec<Price>> {
        let Some(price_set_id) = self.reader.find_price_set_id(variant_id).await? else {
            debug!(variant_id = %variant_id, "No price set");
            return Ok(Vec::new());
        };

        Ok(self.reader.list_prices(&price_set_id).await?)
    }

    /// Sets one currency's price, updating its tier-less price (or, failing
    /// that, the first price of the currency) or creating a tier-less one.
    pub async fn set_variant_price(
        &self,
        variant_id: &str,
        currency_code: &str,
        amount: i64,
    ) -> PricingResult<Price> {
        let validation = validate_price(amount as f64, currency_code);
        if !validation.valid {
            return Err(CoreError::InvalidPrice(validation.errors).into());
        }
        let currency: Currency = currency_code.parse()?;

        self.require_variant(variant_id).await?;
        let price_set_id = self.ensure_price_set(variant_id).await?;
        let existing = self.reader.list_prices(&price_set_id).await?;

        let input = ValidatedPrice {
            currency_code: currency,
            amount,
            min_quantity: None,
            max_quantity: None,
        };

        let attribution = ChangeAttribution::default();
        let (price, old_amount) = match input.find_target(&existing) {
            Some(index) => (
                self.writer.update_price(&existing[index].id, &input).await?,
                Some(existing[index].amount),
            ),
            None => (self.writer.insert_price(&price_set_id, &input).await?, None),
        };

        self.record_change(variant_id, &price, old_amount, &attribution);

        info!(
            variant_id = %variant_id,
            currency = %currency,
            amount,
            "Variant price set"
        );
        Ok(price)
    }

    /// Creates or updates several prices at once.
    ///
    /// Every input is validated before anything is written; one invalid
    /// input fails the whole call with all validation errors.
    pub async fn bulk_set_variant_prices(
        &self,
        variant_id: &str,
        inputs: &[PriceCreateInput],
        attribution: &ChangeAttribution,
    ) -> PricingResult<BulkSetResult> {
        let mut validated = Vec::with_capacity(inputs.len());
        let mut errors = Vec::new();
        for input in inputs {
            match validate_price_input(input) {
                Ok(price) => validated.push(price),
                Err(errs) => errors.extend(errs),
            }
        }
        if !errors.is_empty() {
            return Err(CoreError::InvalidPrice(errors).into());
        }

        self.require_variant(variant_id).await?;
        let price_set_id = self.ensure_price_set(variant_id).await?;
        let mut working = self.reader.list_prices(&price_set_id).await?;

        let mut result = BulkSetResult::default();
        for input in &validated {
            match input.find_target(&working) {
                Some(index) => {
                    let old_amount = working[index].amount;
                    let price = self.writer.update_price(&working[index].id, input).await?;
                    self.record_change(variant_id, &price, Some(old_amount), attribution);
                    working[index] = price;
                    result.updated += 1;
                }
                None => {
                    let price = self.writer.insert_price(&price_set_id, input).await?;
                    self.record_change(variant_id, &price, None, attribution);
                    working.push(price);
                    result.created += 1;
                }
            }
        }

        info!(
            variant_id = %variant_id,
            created = result.created,
            updated = result.updated,
            "Bulk price set complete"
        );
        Ok(result)
    }

    /// Deletes every price of a variant and returns how many were removed.
    ///
    /// Not atomic: a failure part way through leaves the remaining prices.
    /// The (now empty) price set itself is kept.
    pub async fn delete_variant_prices(&self, variant_id: &str) -> PricingResult<usize> {
        let prices = self.get_variant_prices(variant_id).await?;

        for price in &prices {
            self.writer.delete_price(&price.id).await?;
        }

        info!(variant_id = %variant_id, count = prices.len(), "Variant prices deleted");
        Ok(prices.len())
    }

    async fn require_variant(&self, variant_id: &str) -> PricingResult<()> {
        match self.catalog.find_variant(variant_id).await? {
            Some(_) => Ok(()),
            None => Err(CoreError::VariantNotFound(variant_id.to_string()).into()),
        }
    }

    fn record_change(
        &self,
        variant_id: &str,
        price: &Price,
        old_amount: Option<i64>,
        attribution: &ChangeAttribution,
    ) {
        if old_amount == Some(price.amount) {
            return;
        }

        self.history.record(PriceHistoryEntry::now(
            variant_id,
            price.currency_code,
            old_amount,
            price.amount,
            attribution,
        ));
    }
}

//! # Domain Types
//!
//! Core domain types used throughout Tessera.
//!
//! ## Per-Variant Pricing Record
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      PricingRecord (variant_id)                         │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────────┐   ┌───────────────────┐ │
//! │  │    PriceSet     │   │  RegionalOverride   │   │ PriceHistoryEntry │ │
//! │  │  ─────────────  │   │  ─────────────────  │   │ ───────────────── │ │
//! │  │  id             │   │  region_id ┐ key    │   │ timestamp         │ │
//! │  │  prices[]       │   │  currency  ┘        │   │ old → new amount  │ │
//! │  │   currency      │   │  amount             │   │ changed_by        │ │
//! │  │   amount        │   │  created/updated_at │   │ reason            │ │
//! │  │   min..max qty  │   └─────────────────────┘   │ newest first ≤100 │ │
//! │  └─────────────────┘                             └───────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every amount is an `i64` in the currency's smallest unit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::{format_price, Currency};

// =============================================================================
// Price
// =============================================================================

/// One price of a variant for a currency and an optional quantity tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Price {
    pub id: String,

    /// Price set this price belongs to.
    pub price_set_id: String,

    pub currency_code: Currency,

    /// Amount in the smallest currency unit.
    pub amount: i64,

    /// Inclusive lower quantity bound (open when absent).
    pub min_quantity: Option<i64>,

    /// Inclusive upper quantity bound (open when absent).
    pub max_quantity: Option<i64>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Price {
    /// Display string for the amount ("29.99 €").
    pub fn formatted_amount(&self) -> String {
        format_price(self.amount, self.currency_code)
    }

    /// Whether `quantity` falls inside this price's tier.
    pub fn covers_quantity(&self, quantity: i64) -> bool {
        self.min_quantity.map_or(true, |min| quantity >= min)
            && self.max_quantity.map_or(true, |max| quantity <= max)
    }
}

/// A price together with its display string, as returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
pub struct FormattedPrice {
    pub id: String,
    pub currency_code: Currency,
    pub amount: i64,
    pub formatted_amount: String,
    pub min_quantity: Option<i64>,
    pub max_quantity: Option<i64>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl From<&Price> for FormattedPrice {
    fn from(price: &Price) -> Self {
        FormattedPrice {
            id: price.id.clone(),
            currency_code: price.currency_code,
            amount: price.amount,
            formatted_amount: price.formatted_amount(),
            min_quantity: price.min_quantity,
            max_quantity: price.max_quantity,
            created_at: price.created_at,
            updated_at: price.updated_at,
        }
    }
}

/// The complete price collection owned by one variant.
///
/// Created lazily on the first price write and never deleted; removing
/// every price leaves an empty set behind.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
pub struct PriceSet {
    pub id: String,
    pub variant_id: String,
    pub prices: Vec<Price>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Price Input
// =============================================================================

/// A requested price write, as received from API callers and CSV rows.
///
/// `amount` arrives as a JSON number and is only trusted after validation
/// (see [`crate::validation::validate_price_input`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PriceCreateInput {
    pub currency_code: String,
    pub amount: f64,
    #[serde(default)]
    pub min_quantity: Option<i64>,
    #[serde(default)]
    pub max_quantity: Option<i64>,
}

impl PriceCreateInput {
    /// Input for a plain (tier-less) price.
    pub fn new(currency_code: impl Into<String>, amount: i64) -> Self {
        PriceCreateInput {
            currency_code: currency_code.into(),
            amount: amount as f64,
            min_quantity: None,
            max_quantity: None,
        }
    }

    /// Sets the quantity tier bounds.
    pub fn with_tier(mut self, min_quantity: Option<i64>, max_quantity: Option<i64>) -> Self {
        self.min_quantity = min_quantity;
        self.max_quantity = max_quantity;
        self
    }
}

/// A price input that passed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatedPrice {
    pub currency_code: Currency,
    pub amount: i64,
    pub min_quantity: Option<i64>,
    pub max_quantity: Option<i64>,
}

impl ValidatedPrice {
    /// Whether either quantity bound is set.
    pub fn has_tier(&self) -> bool {
        self.min_quantity.is_some() || self.max_quantity.is_some()
    }

    /// Index of the stored price this input overwrites.
    ///
    /// A tiered input only matches the same currency with identical bounds.
    /// A tier-less input prefers the tier-less price of its currency and
    /// falls back to the first price of that currency.
    pub fn find_target(&self, prices: &[Price]) -> Option<usize> {
        let exact = prices.iter().position(|p| {
            p.currency_code == self.currency_code
                && p.min_quantity == self.min_quantity
                && p.max_quantity == self.max_quantity
        });
        if exact.is_some() || self.has_tier() {
            return exact;
        }

        prices.iter().position(|p| p.currency_code == self.currency_code)
    }
}

/// Aggregate counts returned by a bulk price write.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BulkSetResult {
    pub created: u32,
    pub updated: u32,
}

/// Who changed a price and why, copied into history entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeAttribution {
    pub changed_by: Option<String>,
    pub reason: Option<String>,
}

impl ChangeAttribution {
    pub fn new(changed_by: impl Into<String>, reason: impl Into<String>) -> Self {
        ChangeAttribution {
            changed_by: Some(changed_by.into()),
            reason: Some(reason.into()),
        }
    }
}

// =============================================================================
// Regional Override
// =============================================================================

/// A region-and-currency specific amount that wins over the base price.
///
/// Unique per `(variant_id, region_id, currency_code)`. Setting the same key
/// again replaces `amount` and `updated_at` and keeps `created_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct RegionalOverride {
    pub variant_id: String,
    pub region_id: String,
    pub currency_code: Currency,
    pub amount: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl RegionalOverride {
    /// Key of this override inside its variant ("reg_fr_eur").
    pub fn key(&self) -> String {
        override_key(&self.region_id, self.currency_code)
    }

    pub fn formatted_amount(&self) -> String {
        format_price(self.amount, self.currency_code)
    }
}

/// Builds the `<region>_<currency>` key used to address an override.
pub fn override_key(region_id: &str, currency: Currency) -> String {
    format!("{}_{}", region_id, currency)
}

/// Optional filters for a variant's overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegionalFilter {
    pub region_id: Option<String>,
    pub currency_code: Option<Currency>,
}

// =============================================================================
// Price History
// =============================================================================

/// One immutable entry in a variant's price history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct PriceHistoryEntry {
    pub variant_id: String,

    #[ts(as = "String")]
    pub timestamp: DateTime<Utc>,

    pub currency_code: Currency,

    /// Set when the change targeted a regional override.
    pub region_id: Option<String>,

    /// `None` when the price did not exist before.
    pub old_amount: Option<i64>,

    pub new_amount: i64,
    pub changed_by: Option<String>,
    pub reason: Option<String>,
}

impl PriceHistoryEntry {
    /// A change recorded now.
    pub fn now(
        variant_id: impl Into<String>,
        currency_code: Currency,
        old_amount: Option<i64>,
        new_amount: i64,
        attribution: &ChangeAttribution,
    ) -> Self {
        PriceHistoryEntry {
            variant_id: variant_id.into(),
            timestamp: Utc::now(),
            currency_code,
            region_id: None,
            old_amount,
            new_amount,
            changed_by: attribution.changed_by.clone(),
            reason: attribution.reason.clone(),
        }
    }

    /// Marks the entry as a regional override change.
    pub fn in_region(mut self, region_id: impl Into<String>) -> Self {
        self.region_id = Some(region_id.into());
        self
    }
}

/// Filters for one variant's history.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryFilter {
    pub currency_code: Option<Currency>,
    pub limit: Option<u32>,
}

/// Filters for the cross-variant "recent changes" scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecentHistoryFilter {
    pub currency_code: Option<Currency>,
    /// Look-back window in days.
    pub days: Option<i64>,
    pub limit: Option<u32>,
}

/// A variant's full audit trail.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
pub struct AuditTrail {
    pub variant_id: String,
    pub variant_title: Option<String>,
    pub history: Vec<PriceHistoryEntry>,
    pub total_changes: usize,
}

// =============================================================================
// Pricing Record
// =============================================================================

/// Everything stored about one variant's pricing.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
pub struct PricingRecord {
    pub variant_id: String,
    pub price_set: Option<PriceSet>,
    pub overrides: Vec<RegionalOverride>,
    pub history: Vec<PriceHistoryEntry>,
}

// =============================================================================
// Calculation
// =============================================================================

/// Input for resolving one effective price. Not persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalculationContext {
    pub variant_id: String,
    pub currency_code: Currency,
    pub region_id: Option<String>,
    pub customer_group_id: Option<String>,
    pub quantity: Option<i64>,
}

impl CalculationContext {
    pub fn new(variant_id: impl Into<String>, currency_code: Currency) -> Self {
        CalculationContext {
            variant_id: variant_id.into(),
            currency_code,
            region_id: None,
            customer_group_id: None,
            quantity: None,
        }
    }

    pub fn in_region(mut self, region_id: impl Into<String>) -> Self {
        self.region_id = Some(region_id.into());
        self
    }

    pub fn with_quantity(mut self, quantity: i64) -> Self {
        self.quantity = Some(quantity);
        self
    }
}

/// The single price answering a calculation context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CalculatedPrice {
    pub variant_id: String,
    pub currency_code: Currency,
    pub amount: i64,
    pub formatted_amount: String,

    /// Base amount replaced by a regional override.
    pub original_amount: Option<i64>,

    pub min_quantity: Option<i64>,
    pub max_quantity: Option<i64>,

    /// Region whose override produced `amount`.
    pub region_id: Option<String>,

    pub is_override: bool,
}

// =============================================================================
// Catalog
// =============================================================================

/// What the catalog directory knows about a variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct VariantSummary {
    pub id: String,
    pub product_id: String,
    pub product_title: String,
    pub title: String,
    pub sku: Option<String>,
}

/// Listing filters for variants with prices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantListQuery {
    pub product_id: Option<String>,
    pub currency_code: Option<Currency>,
    pub offset: u32,
    pub limit: u32,
}

impl Default for VariantListQuery {
    fn default() -> Self {
        VariantListQuery {
            product_id: None,
            currency_code: None,
            offset: 0,
            limit: crate::DEFAULT_LIST_LIMIT,
        }
    }
}

/// A variant with its (optionally currency-filtered) prices.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
pub struct VariantWithPrices {
    pub id: String,
    pub title: String,
    pub sku: Option<String>,
    pub product_id: String,
    pub product_title: String,
    pub price_set_id: Option<String>,
    pub prices: Vec<FormattedPrice>,
}

// =============================================================================
// Unit Tests
// =============================================================================

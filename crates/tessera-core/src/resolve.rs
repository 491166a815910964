//! # Price Resolution
//!
//! Pure selection rules used by the resolver.
//!
//! ## Quantity Tiers: Most Specific Wins
//! ```text
//! prices (eur):  [1..∞] 2999   [10..49] 2799   [10..19] 2699
//!
//! quantity 1   → [1..∞]    2999   (only match)
//! quantity 15  → [10..19]  2699   (narrowest range)
//! quantity 30  → [10..49]  2799
//! ```
//! Among prices whose range contains the quantity: narrowest range first,
//! then the higher `min_quantity`, then the most recently updated.
//! Absent bounds are open, so a tier-less price is the widest match.
//!
//! ## Override Precedence
//! A regional override for the exact `(region_id, currency)` pair replaces
//! the base amount. Any other region falls back to the base price.

use std::cmp::{Ordering, Reverse};

use crate::money::{format_price, Currency};
use crate::types::{CalculatedPrice, CalculationContext, Price, RegionalOverride};
use crate::DEFAULT_QUANTITY;

/// Width of a tier's quantity range; open bounds count as unbounded.
fn tier_width(price: &Price) -> i128 {
    let min = price.min_quantity.unwrap_or(0) as i128;
    let max = price.max_quantity.map_or(i64::MAX as i128, |max| max as i128);
    max - min
}

fn specificity(a: &Price, b: &Price) -> Ordering {
    tier_width(a)
        .cmp(&tier_width(b))
        .then_with(|| Reverse(a.min_quantity.unwrap_or(0)).cmp(&Reverse(b.min_quantity.unwrap_or(0))))
        .then_with(|| b.updated_at.cmp(&a.updated_at))
}

/// Picks the price for `currency` that applies to `quantity`.
///
/// Returns `None` when no price of that currency covers the quantity.
pub fn select_price(prices: &[Price], currency: Currency, quantity: i64) -> Option<&Price> {
    prices
        .iter()
        .filter(|p| p.currency_code == currency && p.covers_quantity(quantity))
        .min_by(|a, b| specificity(a, b))
}

/// Builds the base calculated price for a context from a variant's prices.
pub fn calculate_from_prices(prices: &[Price], ctx: &CalculationContext) -> Option<CalculatedPrice> {
    let quantity = ctx.quantity.unwrap_or(DEFAULT_QUANTITY);
    let price = select_price(prices, ctx.currency_code, quantity)?;

    Some(CalculatedPrice {
        variant_id: ctx.variant_id.clone(),
        currency_code: price.currency_code,
        amount: price.amount,
        formatted_amount: price.formatted_amount(),
        original_amount: None,
        min_quantity: price.min_quantity,
        max_quantity: price.max_quantity,
        region_id: None,
        is_override: false,
    })
}

/// Layers a regional override on top of the base answer.
///
/// The override only applies when it matches the context's region and
/// currency exactly. It wins even when no base price exists.
pub fn compose_effective_price(
    ctx: &CalculationContext,
    base: Option<CalculatedPrice>,
    regional: Option<&RegionalOverride>,
) -> Option<CalculatedPrice> {
    let matching = regional.filter(|o| {
        o.variant_id == ctx.variant_id
            && o.currency_code == ctx.currency_code
            && ctx.region_id.as_deref() == Some(o.region_id.as_str())
    });

    let Some(found) = matching else {
        return base;
    };

    let (min_quantity, max_quantity) = base
        .as_ref()
        .map_or((None, None), |b| (b.min_quantity, b.max_quantity));

    Some(CalculatedPrice {
        variant_id: ctx.variant_id.clone(),
        currency_code: found.currency_code,
        amount: found.amount,
        formatted_amount: format_price(found.amount, found.currency_code),
        original_amount: base.map(|b| b.amount),
        min_quantity,
        max_quantity,
        region_id: Some(found.region_id.clone()),
        is_override: true,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn price(id: &str, currency: Currency, amount: i64, min: Option<i64>, max: Option<i64>) -> Price {
        let now = Utc::now();
        Price {
            id: id.to_string(),
            price_set_id: "pset_1".to_string(),
            currency_code: currency,
            amount,
            min_quantity: min,
            max_quantity: max,
            created_at: now,
            updated_at: now,
        }
    }

    fn regional(region: &str, currency: Currency, amount: i64) -> RegionalOverride {
        let now = Utc::now();
        RegionalOverride {
            variant_id: "variant_1".to_string(),
            region_id: region.to_string(),
            currency_code: currency,
            amount,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_select_price_by_currency() {
        let prices = vec![
            price("p_eur", Currency::Eur, 2999, None, None),
            price("p_usd", Currency::Usd, 3299, None, None),
        ];

        assert_eq!(select_price(&prices, Currency::Usd, 1).unwrap().id, "p_usd");
        assert!(select_price(&prices, Currency::Gbp, 1).is_none());
    }

    #[test]
    fn test_most_specific_tier_wins() {
        let prices = vec![
            price("base", Currency::Eur, 2999, Some(1), None),
            price("wide", Currency::Eur, 2799, Some(10), Some(49)),
            price("narrow", Currency::Eur, 2699, Some(10), Some(19)),
        ];

        assert_eq!(select_price(&prices, Currency::Eur, 1).unwrap().id, "base");
        assert_eq!(select_price(&prices, Currency::Eur, 15).unwrap().id, "narrow");
        assert_eq!(select_price(&prices, Currency::Eur, 30).unwrap().id, "wide");
        assert_eq!(select_price(&prices, Currency::Eur, 500).unwrap().id, "base");
    }

    #[test]
    fn test_equal_width_prefers_higher_min_then_latest() {
        let mut older = price("older", Currency::Eur, 100, Some(5), Some(10));
        older.updated_at = Utc::now() - Duration::hours(1);
        let newer = price("newer", Currency::Eur, 90, Some(5), Some(10));
        let lower = price("lower", Currency::Eur, 80, Some(4), Some(9));

        let prices = vec![older, lower, newer];
        assert_eq!(select_price(&prices, Currency::Eur, 9).unwrap().id, "newer");
        assert_eq!(select_price(&prices, Currency::Eur, 4).unwrap().id, "lower");
    }

    #[test]
    fn test_quantity_outside_every_tier() {
        let prices = vec![price("bulk", Currency::Eur, 2500, Some(100), None)];
        let ctx = CalculationContext::new("variant_1", Currency::Eur);
        assert!(calculate_from_prices(&prices, &ctx).is_none());
        assert!(calculate_from_prices(&prices, &ctx.with_quantity(100)).is_some());
    }

    #[test]
    fn test_calculate_formats_amount() {
        let prices = vec![price("p", Currency::Usd, 3299, None, None)];
        let ctx = CalculationContext::new("variant_1", Currency::Usd);
        let calculated = calculate_from_prices(&prices, &ctx).unwrap();

        assert_eq!(calculated.amount, 3299);
        assert_eq!(calculated.formatted_amount, "$32.99");
        assert!(!calculated.is_override);
    }

    #[test]
    fn test_override_wins_for_exact_region() {
        let prices = vec![price("p", Currency::Eur, 2999, None, None)];
        let ctx = CalculationContext::new("variant_1", Currency::Eur).in_region("reg_fr");
        let base = calculate_from_prices(&prices, &ctx);
        let fr = regional("reg_fr", Currency::Eur, 3499);

        let effective = compose_effective_price(&ctx, base, Some(&fr)).unwrap();
        assert_eq!(effective.amount, 3499);
        assert_eq!(effective.original_amount, Some(2999));
        assert_eq!(effective.region_id.as_deref(), Some("reg_fr"));
        assert!(effective.is_override);
    }

    #[test]
    fn test_override_ignored_for_other_region() {
        let prices = vec![price("p", Currency::Eur, 2999, None, None)];
        let ctx = CalculationContext::new("variant_1", Currency::Eur).in_region("reg_de");
        let base = calculate_from_prices(&prices, &ctx);
        let fr = regional("reg_fr", Currency::Eur, 3499);

        let effective = compose_effective_price(&ctx, base, Some(&fr)).unwrap();
        assert_eq!(effective.amount, 2999);
        assert!(!effective.is_override);
    }

    #[test]
    fn test_override_without_base_price() {
        let ctx = CalculationContext::new("variant_1", Currency::Gbp).in_region("reg_uk");
        let uk = regional("reg_uk", Currency::Gbp, 2500);

        let effective = compose_effective_price(&ctx, None, Some(&uk)).unwrap();
        assert_eq!(effective.amount, 2500);
        assert_eq!(effective.original_amount, None);
        assert_eq!(effective.formatted_amount, "25.00 £");
    }
}

//! # Money Module
//!
//! Supported currencies and the money codec: conversion between decimal
//! (major-unit) amounts and integer smallest-unit amounts, plus display
//! formatting.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │    29.99 * 100 = 2998.9999999999995  ❌                                 │
//! │                                                                         │
//! │  OUR SOLUTION: Integer smallest units                                   │
//! │    Stored:   2999 (i64)                                                 │
//! │    Decimal:  29.99 (rust_decimal, exact)                                │
//! │    Display:  "29.99 €" / "$29.99"                                       │
//! │                                                                         │
//! │  Floats never reach storage. Decimal input is converted exactly once,  │
//! │  rounding half away from zero.                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use rust_decimal::Decimal;
//! use tessera_core::money::{format_price, to_smallest_unit, Currency};
//!
//! let amount = to_smallest_unit(Decimal::new(2999, 2), Currency::Eur);
//! assert_eq!(amount, 2999);
//! assert_eq!(format_price(amount, Currency::Eur), "29.99 €");
//! assert_eq!(format_price(amount, Currency::Usd), "$29.99");
//! ```

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;

// =============================================================================
// Currency
// =============================================================================

/// A supported ISO currency, always serialized lower-case.
///
/// ## Display Rules
/// | Currency | Decimals | Symbol | Placement |
/// |----------|----------|--------|-----------|
/// | eur      | 2        | €      | suffix    |
/// | usd      | 2        | $      | prefix    |
/// | gbp      | 2        | £      | suffix    |
/// | chf      | 2        | CHF    | suffix    |
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum Currency {
    Eur,
    Usd,
    Gbp,
    Chf,
}

impl Currency {
    /// Every supported currency, in display order.
    pub const ALL: [Currency; 4] = [Currency::Eur, Currency::Usd, Currency::Gbp, Currency::Chf];

    /// Lower-case ISO code.
    pub const fn code(&self) -> &'static str {
        match self {
            Currency::Eur => "eur",
            Currency::Usd => "usd",
            Currency::Gbp => "gbp",
            Currency::Chf => "chf",
        }
    }

    /// Number of decimal places between the major and the smallest unit.
    pub const fn decimals(&self) -> u32 {
        match self {
            Currency::Eur | Currency::Usd | Currency::Gbp | Currency::Chf => 2,
        }
    }

    /// Display symbol.
    pub const fn symbol(&self) -> &'static str {
        match self {
            Currency::Eur => "€",
            Currency::Usd => "$",
            Currency::Gbp => "£",
            Currency::Chf => "CHF",
        }
    }

    /// Comma separated list of supported codes ("eur, usd, gbp, chf").
    pub fn supported_codes() -> String {
        Currency::ALL
            .iter()
            .map(|c| c.code())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Parses a currency code, ignoring case and surrounding whitespace.
///
/// ```rust
/// use tessera_core::money::Currency;
///
/// assert_eq!("EUR".parse::<Currency>().unwrap(), Currency::Eur);
/// assert!("xyz".parse::<Currency>().is_err());
/// ```
impl FromStr for Currency {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_lowercase();
        Currency::ALL
            .into_iter()
            .find(|c| c.code() == code)
            .ok_or(ValidationError::UnsupportedCurrency { code })
    }
}

// =============================================================================
// Codec Functions
// =============================================================================

/// Converts a decimal (major-unit) amount to the currency's smallest unit.
///
/// Multiplies by `10^decimals` and rounds half away from zero.
/// Results outside the `i64` range saturate.
///
/// ```rust
/// use rust_decimal::Decimal;
/// use tessera_core::money::{to_smallest_unit, Currency};
///
/// assert_eq!(to_smallest_unit(Decimal::new(29995, 3), Currency::Eur), 3000);
/// assert_eq!(to_smallest_unit(Decimal::new(29994, 3), Currency::Eur), 2999);
/// ```
pub fn to_smallest_unit(amount: Decimal, currency: Currency) -> i64 {
    let saturated = if amount.is_sign_negative() {
        i64::MIN
    } else {
        i64::MAX
    };

    let factor = Decimal::from(10_i64.pow(currency.decimals()));
    let Some(scaled) = amount.checked_mul(factor) else {
        return saturated;
    };

    scaled
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .unwrap_or(saturated)
}

/// Converts a smallest-unit amount back to an exact decimal.
///
/// ```rust
/// use rust_decimal::Decimal;
/// use tessera_core::money::{from_smallest_unit, Currency};
///
/// assert_eq!(from_smallest_unit(2999, Currency::Usd), Decimal::new(2999, 2));
/// ```
pub fn from_smallest_unit(amount: i64, currency: Currency) -> Decimal {
    Decimal::new(amount, currency.decimals())
}

/// Formats a smallest-unit amount for display.
///
/// US dollars put the symbol in front (`$29.99`); every other currency puts
/// it after the number, separated by a space (`29.99 €`, `29.99 CHF`).
pub fn format_price(amount: i64, currency: Currency) -> String {
    let value = from_smallest_unit(amount, currency);

    match currency {
        Currency::Usd => format!("{}{}", currency.symbol(), value),
        _ => format!("{} {}", value, currency.symbol()),
    }
}

// =============================================================================
// Money Type
// =============================================================================

/// An amount in the smallest unit of a specific currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Money {
    amount: i64,
    currency: Currency,
}

impl Money {
    /// Creates a Money value from a smallest-unit amount.
    #[inline]
    pub const fn new(amount: i64, currency: Currency) -> Self {
        Money { amount, currency }
    }

    /// Creates a Money value from a decimal major-unit amount.
    pub fn from_decimal(amount: Decimal, currency: Currency) -> Self {
        Money::new(to_smallest_unit(amount, currency), currency)
    }

    /// Amount in the smallest unit.
    #[inline]
    pub const fn amount(&self) -> i64 {
        self.amount
    }

    #[inline]
    pub const fn currency(&self) -> Currency {
        self.currency
    }

    /// Exact decimal value in major units.
    pub fn to_decimal(&self) -> Decimal {
        from_smallest_unit(self.amount, self.currency)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_price(self.amount, self.currency))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

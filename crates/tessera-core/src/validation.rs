//! # Validation Module
//!
//! Stateless rule checks for prices, run before anything is written.
//!
//! ## Rules (checked in this order, all collected)
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. currency_code is one of eur, usd, gbp, chf (case-insensitive)      │
//! │  2. amount is a finite number                                          │
//! │  3. amount is a whole number of smallest units                         │
//! │  4. amount >= MIN_PRICE                                                │
//! │  5. amount <= MAX_PRICE                                                │
//! │                                                                         │
//! │  validate_price(-1, "eur")  → [amount must be at least 0]              │
//! │  validate_price(NaN, "xyz") → [Unsupported currency, not a number]     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing here short-circuits: a single call reports every problem.

use serde::Serialize;

use crate::error::{FieldError, ValidationError};
use crate::money::Currency;
use crate::types::{PriceCreateInput, ValidatedPrice};
use crate::{MAX_PRICE, MIN_PRICE};

/// Result type for single-rule validation.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Price Validation
// =============================================================================

/// Outcome of [`validate_price`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceValidation {
    pub valid: bool,
    #[serde(serialize_with = "serialize_errors")]
    pub errors: Vec<ValidationError>,
}

fn serialize_errors<S>(errors: &[ValidationError], serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.collect_seq(errors.iter().map(FieldError::from))
}

/// Checks an amount and a currency code, collecting every failing rule.
///
/// ## Example
/// ```rust
/// use tessera_core::validation::validate_price;
///
/// assert!(validate_price(2999.0, "eur").valid);
/// assert_eq!(validate_price(f64::NAN, "xyz").errors.len(), 2);
/// ```
pub fn validate_price(amount: f64, currency_code: &str) -> PriceValidation {
    let mut errors = Vec::new();

    if let Err(err) = currency_code.parse::<Currency>() {
        errors.push(err);
    }

    errors.extend(amount_errors(amount));

    PriceValidation {
        valid: errors.is_empty(),
        errors,
    }
}

fn amount_errors(amount: f64) -> Vec<ValidationError> {
    let field = || "amount".to_string();

    if !amount.is_finite() {
        return vec![ValidationError::NotANumber { field: field() }];
    }

    let mut errors = Vec::new();

    if amount.fract() != 0.0 {
        errors.push(ValidationError::NotAnInteger { field: field() });
    }

    if amount < MIN_PRICE as f64 {
        errors.push(ValidationError::BelowMinimum {
            field: field(),
            min: MIN_PRICE,
        });
    } else if amount > MAX_PRICE as f64 {
        errors.push(ValidationError::AboveMaximum {
            field: field(),
            max: MAX_PRICE,
        });
    }

    errors
}

/// Validates a full price input, including its quantity tier.
///
/// On success the amount is converted to an integer and the currency
/// is normalized.
pub fn validate_price_input(input: &PriceCreateInput) -> Result<ValidatedPrice, Vec<ValidationError>> {
    let mut errors = validate_price(input.amount, &input.currency_code).errors;

    if let Err(err) = validate_quantity_tier(input.min_quantity, input.max_quantity) {
        errors.push(err);
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    // Both checks above passed, so the currency parses.
    let currency_code = input
        .currency_code
        .parse::<Currency>()
        .map_err(|err| vec![err])?;

    Ok(ValidatedPrice {
        currency_code,
        amount: input.amount as i64,
        min_quantity: input.min_quantity,
        max_quantity: input.max_quantity,
    })
}

// =============================================================================
// Quantity Validators
// =============================================================================

/// Validates quantity tier bounds.
///
/// ## Rules
/// - Bounds must not be negative
/// - `min_quantity` must not exceed `max_quantity`
///
/// Overlapping tiers of the same currency are allowed; resolution picks
/// the most specific one.
pub fn validate_quantity_tier(
    min_quantity: Option<i64>,
    max_quantity: Option<i64>,
) -> ValidationResult<()> {
    for (field, value) in [("min_quantity", min_quantity), ("max_quantity", max_quantity)] {
        if let Some(value) = value {
            if value < 0 {
                return Err(ValidationError::BelowMinimum {
                    field: field.to_string(),
                    min: 0,
                });
            }
        }
    }

    if let (Some(min), Some(max)) = (min_quantity, max_quantity) {
        if min > max {
            return Err(ValidationError::InvalidFormat {
                field: "min_quantity".to_string(),
                reason: format!("{} exceeds max_quantity {}", min, max),
            });
        }
    }

    Ok(())
}

/// Validates a quantity used in a calculation context.
pub fn validate_quantity(quantity: i64) -> ValidationResult<()> {
    if quantity < 1 {
        return Err(ValidationError::BelowMinimum {
            field: "quantity".to_string(),
            min: 1,
        });
    }

    Ok(())
}

// =============================================================================
// Identifier Validators
// =============================================================================

/// Validates that a required identifier is present and non-blank.
///
/// ```rust
/// use tessera_core::validation::validate_required;
///
/// assert!(validate_required("variant_id", "variant_123").is_ok());
/// assert!(validate_required("variant_id", "  ").is_err());
/// ```
pub fn validate_required(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_price() {
        let result = validate_price(2999.0, "eur");
        assert!(result.valid);
        assert!(result.errors.is_empty());

        assert!(validate_price(0.0, "usd").valid);
        assert!(validate_price(MAX_PRICE as f64, "chf").valid);
        assert!(validate_price(100.0, "GBP").valid);
    }

    #[test]
    fn test_negative_amount_reports_minimum() {
        let result = validate_price(-1.0, "eur");
        assert!(!result.valid);
        assert_eq!(
            result.errors,
            vec![ValidationError::BelowMinimum {
                field: "amount".to_string(),
                min: 0
            }]
        );
    }

    #[test]
    fn test_nan_and_bad_currency_reports_both() {
        let result = validate_price(f64::NAN, "xyz");
        assert!(!result.valid);
        assert_eq!(result.errors.len(), 2);
        assert!(matches!(
            result.errors[0],
            ValidationError::UnsupportedCurrency { .. }
        ));
        assert!(matches!(result.errors[1], ValidationError::NotANumber { .. }));
    }

    #[test]
    fn test_collects_currency_and_range_errors() {
        let result = validate_price(-5.5, "jpy");
        assert_eq!(result.errors.len(), 3);
        assert_eq!(result.errors[0].field(), "currency_code");
        assert!(matches!(result.errors[1], ValidationError::NotAnInteger { .. }));
        assert!(matches!(result.errors[2], ValidationError::BelowMinimum { .. }));
    }

    #[test]
    fn test_above_maximum() {
        let result = validate_price(MAX_PRICE as f64 + 1.0, "eur");
        assert_eq!(
            result.errors,
            vec![ValidationError::AboveMaximum {
                field: "amount".to_string(),
                max: MAX_PRICE
            }]
        );
    }

    #[test]
    fn test_infinite_amount() {
        let result = validate_price(f64::INFINITY, "eur");
        assert_eq!(result.errors.len(), 1);
        assert!(matches!(result.errors[0], ValidationError::NotANumber { .. }));
    }

    #[test]
    fn test_validate_price_input_normalizes() {
        let input = PriceCreateInput::new("EUR", 2999).with_tier(Some(1), Some(10));
        let validated = validate_price_input(&input).unwrap();

        assert_eq!(validated.currency_code, Currency::Eur);
        assert_eq!(validated.amount, 2999);
        assert_eq!(validated.min_quantity, Some(1));
        assert_eq!(validated.max_quantity, Some(10));
    }

    #[test]
    fn test_validate_price_input_rejects_inverted_tier() {
        let input = PriceCreateInput::new("eur", 2999).with_tier(Some(10), Some(5));
        let errors = validate_price_input(&input).unwrap_err();

        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field(), "min_quantity");
    }

    #[test]
    fn test_validate_quantity_tier_rejects_negative_bounds() {
        assert!(validate_quantity_tier(Some(-1), None).is_err());
        assert!(validate_quantity_tier(None, Some(-3)).is_err());
        assert!(validate_quantity_tier(Some(0), Some(0)).is_ok());
        assert!(validate_quantity_tier(None, None).is_ok());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(0).is_err());
    }

    #[test]
    fn test_price_validation_serializes_field_errors() {
        let json = serde_json::to_value(validate_price(-1.0, "eur")).unwrap();
        assert_eq!(json["valid"], false);
        assert_eq!(json["errors"][0]["field"], "amount");
        assert_eq!(json["errors"][0]["message"], "amount must be at least 0");
    }
}

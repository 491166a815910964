//! # Error Types
//!
//! Domain-specific error types for tessera-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  tessera-core errors (this file)                                       │
//! │  ├── ValidationError  - One failing price/input rule                   │
//! │  ├── CoreError        - Domain errors (invalid price, unknown variant) │
//! │  └── StoreError       - What a port implementation reports             │
//! │                                                                         │
//! │  tessera-db errors (separate crate)                                    │
//! │  └── DbError          - SQLite failures, converted into StoreError     │
//! │                                                                         │
//! │  pricing-api errors (in app)                                           │
//! │  └── ApiError         - What the HTTP caller sees                      │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → PricingError → ApiError           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use thiserror::Error;
use ts_rs::TS;

use crate::money::Currency;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    /// One or more price inputs failed validation.
    ///
    /// ## When This Occurs
    /// - Unsupported currency code
    /// - Amount is not a finite number, fractional, negative, or too large
    /// - Quantity tier bounds are inverted
    ///
    /// Every failing rule is carried, not just the first one.
    #[error("Invalid price: {}", join_messages(.0))]
    InvalidPrice(Vec<ValidationError>),

    /// The catalog has no variant with this id.
    #[error("Variant not found: {0}")]
    VariantNotFound(String),

    /// The catalog has no variant with this SKU.
    #[error("Variant not found for SKU: {0}")]
    SkuNotFound(String),

    /// The CSV payload itself is unusable (bad encoding, missing headers).
    ///
    /// Problems with individual rows are reported per row instead.
    #[error("Invalid CSV: {0}")]
    Csv(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Returns the validation errors carried by this error, if any.
    pub fn validation_errors(&self) -> Vec<ValidationError> {
        match self {
            CoreError::InvalidPrice(errors) => errors.clone(),
            CoreError::Validation(error) => vec![error.clone()],
            _ => Vec::new(),
        }
    }
}

fn join_messages(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Each variant names the offending `field` so callers can render a
/// structured `{field, message}` list.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Currency code is not in the supported set.
    #[error("Unsupported currency: {code}. Supported: {}", Currency::supported_codes())]
    UnsupportedCurrency { code: String },

    /// Amount is NaN or infinite.
    #[error("{field} must be a valid number")]
    NotANumber { field: String },

    /// Amount has a fractional part in smallest units.
    #[error("{field} must be a whole number of smallest currency units")]
    NotAnInteger { field: String },

    /// Value is below the allowed minimum.
    #[error("{field} must be at least {min}")]
    BelowMinimum { field: String, min: i64 },

    /// Value is above the allowed maximum.
    #[error("{field} cannot exceed {max}")]
    AboveMaximum { field: String, max: i64 },

    /// Invalid format (e.g., inverted quantity range, unparsable number).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// Name of the field this error is about.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::UnsupportedCurrency { .. } => "currency_code",
            ValidationError::Required { field }
            | ValidationError::NotANumber { field }
            | ValidationError::NotAnInteger { field }
            | ValidationError::BelowMinimum { field, .. }
            | ValidationError::AboveMaximum { field, .. }
            | ValidationError::InvalidFormat { field, .. } => field,
        }
    }
}

/// Serializable `{field, message}` pair sent to API callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl From<&ValidationError> for FieldError {
    fn from(err: &ValidationError) -> Self {
        FieldError {
            field: err.field().to_string(),
            message: err.to_string(),
        }
    }
}

// =============================================================================
// Store Error
// =============================================================================

/// Error reported by a port implementation.
///
/// Storage backends translate their own errors into this shape so the
/// services never depend on a concrete database crate.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    /// The addressed record does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// A uniqueness or reference constraint rejected the write.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The backend cannot be reached (pool closed, exhausted, ...).
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// Anything else.
    #[error("Storage failure: {0}")]
    Internal(String),
}

impl StoreError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        StoreError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

/// Result type returned by port implementations.
pub type StoreResult<T> = Result<T, StoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::UnsupportedCurrency {
            code: "xyz".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Unsupported currency: xyz. Supported: eur, usd, gbp, chf"
        );
        assert_eq!(err.field(), "currency_code");

        let err = ValidationError::BelowMinimum {
            field: "amount".to_string(),
            min: 0,
        };
        assert_eq!(err.to_string(), "amount must be at least 0");

        let err = ValidationError::AboveMaximum {
            field: "amount".to_string(),
            max: 1_000_000_000,
        };
        assert_eq!(err.to_string(), "amount cannot exceed 1000000000");
    }

    #[test]
    fn test_invalid_price_lists_every_error() {
        let err = CoreError::InvalidPrice(vec![
            ValidationError::UnsupportedCurrency {
                code: "xyz".to_string(),
            },
            ValidationError::NotANumber {
                field: "amount".to_string(),
            },
        ]);

        let message = err.to_string();
        assert!(message.contains("Unsupported currency: xyz"));
        assert!(message.contains("amount must be a valid number"));
        assert_eq!(err.validation_errors().len(), 2);
    }

    #[test]
    fn test_field_error_from_validation_error() {
        let err = ValidationError::Required {
            field: "sku".to_string(),
        };
        let field_error = FieldError::from(&err);
        assert_eq!(field_error.field, "sku");
        assert_eq!(field_error.message, "sku is required");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "variant_id".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
        assert_eq!(core_err.validation_errors().len(), 1);
    }
}

//! # Pricing Error Types
//!
//! ```text
//! CoreError  (validation, unknown variant/SKU, bad CSV)  ─┐
//! StoreError (storage port failures)                      ─┼─► PricingError
//! History queue gone                                      ─┘
//! ```

use tessera_core::{CoreError, StoreError};
use thiserror::Error;

/// Result type alias for pricing service operations.
pub type PricingResult<T> = Result<T, PricingError>;

/// Errors surfaced by the pricing services.
#[derive(Debug, Error)]
pub enum PricingError {
    /// Domain rule failure (validation, not found, CSV).
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Storage port failure.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The history worker has stopped.
    #[error("Price history queue is closed")]
    HistoryQueueClosed,
}

impl PricingError {
    /// Whether this is a "no such thing" outcome rather than a failure.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            PricingError::Core(CoreError::VariantNotFound(_) | CoreError::SkuNotFound(_))
                | PricingError::Store(StoreError::NotFound { .. })
        )
    }
}

impl From<tessera_core::ValidationError> for PricingError {
    fn from(err: tessera_core::ValidationError) -> Self {
        PricingError::Core(CoreError::Validation(err))
    }
}

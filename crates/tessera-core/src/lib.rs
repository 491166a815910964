//! # tessera-core: Pure Pricing Logic for Tessera
//!
//! This crate is the **heart** of the pricing engine. It contains the money
//! codec, price validation, quantity-tier selection and override composition
//! as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Tessera Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 apps/pricing-api (axum, /pricing)               │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │       tessera-pricing (store, overrides, history, resolver)     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ ports (traits)                         │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ tessera-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   money   │  │validation │  │  resolve  │  │ transfer  │  │   │
//! │  │   │ Currency  │  │ amount &  │  │ tiers and │  │ import /  │  │   │
//! │  │   │ Money     │  │ currency  │  │ overrides │  │ export    │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                ▲                                        │
//! │  ┌─────────────────────────────┴───────────────────────────────────┐   │
//! │  │            tessera-db (implements the ports on SQLite)          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Supported currencies and the smallest-unit money codec
//! - [`validation`] - Price validation (collects every failing rule)
//! - [`types`] - Domain types (Price, PriceSet, RegionalOverride, ...)
//! - [`resolve`] - Quantity-tier selection and regional override composition
//! - [`transfer`] - CSV import parsing and export rendering
//! - [`ports`] - Narrow storage interfaces implemented by tessera-db
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Integer Money**: Every stored amount is an `i64` in the currency's smallest unit
//! 2. **No I/O**: Database and network access live behind [`ports`]
//! 3. **Explicit Errors**: Validation reports every failing rule, never panics

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod ports;
pub mod resolve;
pub mod transfer;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, StoreError, StoreResult, ValidationError};
pub use money::{Currency, Money};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Smallest accepted price amount (in smallest currency units).
pub const MIN_PRICE: i64 = 0;

/// Largest accepted price amount (in smallest currency units).
///
/// ## Business Reason
/// Ten million in major units. Anything larger is a typing mistake.
pub const MAX_PRICE: i64 = 1_000_000_000;

/// Currency used when a caller does not name one (exports, backfill).
pub const DEFAULT_CURRENCY: Currency = Currency::Eur;

/// Maximum number of history entries kept per variant.
///
/// Older entries are dropped when a new one is appended.
pub const MAX_HISTORY_ENTRIES: u32 = 100;

/// Upper bound for cross-variant scans (regional overrides, recent history).
pub const BULK_SCAN_LIMIT: u32 = 1000;

/// Default page size for variant listings.
pub const DEFAULT_LIST_LIMIT: u32 = 50;

/// Largest page size accepted over HTTP for variant listings.
pub const MAX_LIST_LIMIT: u32 = 100;

/// Default look-back window (in days) for recent price changes.
pub const DEFAULT_HISTORY_DAYS: i64 = 30;

/// Longest look-back window (in days) accepted for recent price changes.
pub const MAX_HISTORY_DAYS: i64 = 3650;

/// Quantity assumed when a calculation context does not carry one.
pub const DEFAULT_QUANTITY: i64 = 1;

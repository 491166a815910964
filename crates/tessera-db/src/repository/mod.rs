//! # Repository Module
//!
//! SQLite implementations of the tessera-core ports.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repositories and Ports                               │
//! │                                                                         │
//! │  PriceStore (tessera-pricing)                                          │
//! │       │                                                                 │
//! │       │  Arc<dyn VariantPriceWriter>::insert_price(set_id, &price)     │
//! │       ▼                                                                 │
//! │  PriceRepository                                                       │
//! │  ├── inherent methods  → DbResult<T>   (SQL lives here)                │
//! │  └── port impls        → StoreResult<T> (DbError converted)            │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`catalog::CatalogRepository`] - Variant directory (existence, SKU, titles)
//! - [`price::PriceRepository`] - Price sets and their prices
//! - [`regional::RegionalPriceRepository`] - Regional overrides
//! - [`history::PriceHistoryRepository`] - Bounded price history

pub mod catalog;
pub mod history;
pub mod price;
pub mod regional;

//! # tessera-db: Database Layer for Tessera
//!
//! SQLite storage for the pricing engine, built on sqlx.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Tessera Data Flow                                │
//! │                                                                         │
//! │  HTTP handler (POST /pricing/{variant_id})                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  tessera-pricing services (hold Arc<dyn Port>)                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    tessera-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────────┐   ┌────────────┐ │   │
//! │  │   │   Database    │    │    Repositories    │   │ Migrations │ │   │
//! │  │   │   (pool.rs)   │    │                    │   │ (embedded) │ │   │
//! │  │   │               │    │ CatalogRepository  │   │            │ │   │
//! │  │   │ SqlitePool    │◄───│ PriceRepository    │   │ 001_pricing│ │   │
//! │  │   │ WAL, FKs on   │    │ RegionalPriceRepo  │   │  _schema   │ │   │
//! │  │   │               │    │ PriceHistoryRepo   │   │            │ │   │
//! │  │   └───────────────┘    └────────────────────┘   └────────────┘ │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Port implementations (catalog, prices, overrides, history)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tessera_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("tessera.db")).await?;
//! let prices: Arc<dyn VariantPriceReader> = Arc::new(db.prices());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::catalog::CatalogRepository;
pub use repository::history::PriceHistoryRepository;
pub use repository::price::PriceRepository;
pub use repository::regional::RegionalPriceRepository;

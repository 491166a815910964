//! # tessera-pricing: Pricing Services for Tessera
//!
//! Price store, regional overrides, history recording, resolution and bulk
//! reconciliation, written against the ports of tessera-core.
//!
//! ## Request Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Pricing Request Flow                           │
//! │                                                                         │
//! │  POST /pricing/{variant_id}  {prices: [...]}                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  PriceStore::bulk_set_variant_prices                                   │
//! │       │  1. validate every input (tessera-core)                        │
//! │       │  2. ensure price set                                           │
//! │       │  3. update same-currency price or insert                       │
//! │       │                                                                 │
//! │       ├──────────────► HistoryRecorder::record  (queued, best effort)  │
//! │       ▼                                                                 │
//! │  {created, updated}                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`store`] - Price set create-or-update ([`PriceStore`])
//! - [`regional`] - Regional overrides ([`RegionalOverrides`])
//! - [`history`] - Background history queue ([`HistoryRecorder`], [`HistoryWorker`])
//! - [`resolver`] - Price calculation ([`PriceResolver`])
//! - [`reconciler`] - Bulk updates, CSV import/export ([`BulkReconciler`])
//! - [`backfill`] - Default prices for unpriced variants
//! - [`engine`] - Wiring of all of the above

pub mod backfill;
pub mod engine;
pub mod error;
pub mod history;
pub mod reconciler;
pub mod regional;
pub mod resolver;
pub mod store;

pub use backfill::{BackfillStats, PriceBackfill};
pub use engine::{PricingEngine, PricingPorts};
pub use error::{PricingError, PricingResult};
pub use history::{FormattedHistoryEntry, HistoryRecorder, HistoryWorker};
pub use reconciler::{
    BulkReconciler, BulkUpdateError, BulkUpdateResult, ExportFilter, VariantPriceUpdate,
};
pub use regional::{RegionScanFilter, RegionalOverrides};
pub use resolver::PriceResolver;
pub use store::PriceStore;

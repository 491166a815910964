//! # Pricing Engine
//!
//! Wires the services to one set of storage ports.
//!
//! ```text
//! PricingPorts ──► PricingEngine::new(ports, capacity)
//!                     │
//!                     ├─► (engine, HistoryWorker)   spawn worker.run()
//!                     │
//!                     ├─ store       PriceStore
//!                     ├─ regional    RegionalOverrides
//!                     ├─ history     HistoryRecorder
//!                     ├─ resolver    PriceResolver
//!                     └─ reconciler  BulkReconciler
//! ```

use std::sync::Arc;

use tessera_core::ports::{
    PriceHistoryLog, PricingRecordReader, RegionalOverrideRepository, VariantLookup,
    VariantPriceReader, VariantPriceWriter,
};
use tessera_core::{AuditTrail, VariantSummary};

use crate::backfill::PriceBackfill;
use crate::error::PricingResult;
use crate::history::{HistoryRecorder, HistoryWorker};
use crate::reconciler::BulkReconciler;
use crate::regional::RegionalOverrides;
use crate::resolver::PriceResolver;
use crate::store::PriceStore;

/// Storage implementations the engine runs on.
#[derive(Clone)]
pub struct PricingPorts {
    pub catalog: Arc<dyn VariantLookup>,
    pub price_reader: Arc<dyn VariantPriceReader>,
    pub price_writer: Arc<dyn VariantPriceWriter>,
    pub regional: Arc<dyn RegionalOverrideRepository>,
    pub history: Arc<dyn PriceHistoryLog>,
    pub records: Arc<dyn PricingRecordReader>,
}

/// All pricing services sharing one history queue.
#[derive(Clone)]
pub struct PricingEngine {
    pub store: PriceStore,
    pub regional: RegionalOverrides,
    pub history: HistoryRecorder,
    pub resolver: PriceResolver,
    pub reconciler: BulkReconciler,
    catalog: Arc<dyn VariantLookup>,
}

impl PricingEngine {
    /// Builds the services and the history worker that must be spawned
    /// for history entries to be written.
    pub fn new(ports: PricingPorts, history_capacity: usize) -> (Self, HistoryWorker) {
        let (worker, history) = HistoryWorker::new(ports.history, history_capacity);

        let store = PriceStore::new(
            ports.catalog.clone(),
            ports.price_reader.clone(),
            ports.price_writer,
            history.clone(),
        );
        let regional = RegionalOverrides::new(ports.catalog.clone(), ports.regional, history.clone());
        let resolver = PriceResolver::new(ports.price_reader.clone(), ports.records);
        let reconciler = BulkReconciler::new(
            ports.catalog.clone(),
            ports.price_reader,
            store.clone(),
            regional.clone(),
        );

        let engine = PricingEngine {
            store,
            regional,
            history,
            resolver,
            reconciler,
            catalog: ports.catalog,
        };

        (engine, worker)
    }

    /// Looks a variant up in the catalog directory.
    pub async fn find_variant(&self, variant_id: &str) -> PricingResult<Option<VariantSummary>> {
        Ok(self.catalog.find_variant(variant_id).await?)
    }

    /// Audit trail of a variant, titled from the catalog when known.
    pub async fn audit_trail(&self, variant_id: &str) -> PricingResult<AuditTrail> {
        let title = self.find_variant(variant_id).await?.map(|v| v.title);
        self.history.audit_trail(variant_id, title).await
    }

    /// A backfill job over this engine's catalog and price store.
    pub fn backfill(&self) -> PriceBackfill {
        PriceBackfill::new(self.catalog.clone(), self.store.clone())
    }
}

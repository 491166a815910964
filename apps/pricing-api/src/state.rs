//! Shared application state.

use std::sync::Arc;

use tessera_db::Database;
use tessera_pricing::{HistoryWorker, PricingEngine, PricingPorts};

use crate::auth::JwtManager;
use crate::config::ApiConfig;

/// State handed to every handler. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub engine: PricingEngine,
    pub db: Database,
    pub jwt: JwtManager,
    pub config: Arc<ApiConfig>,
}

impl AppState {
    /// Wires the pricing engine to the SQLite repositories.
    ///
    /// The returned worker must be spawned for history to be written.
    pub fn new(db: Database, config: ApiConfig) -> (Self, HistoryWorker) {
        let (engine, worker) = PricingEngine::new(pricing_ports(&db), config.history_queue_capacity);

        let state = AppState {
            engine,
            jwt: JwtManager::new(config.jwt_secret.clone()),
            db,
            config: Arc::new(config),
        };

        (state, worker)
    }
}

/// SQLite implementations of every pricing port.
pub fn pricing_ports(db: &Database) -> PricingPorts {
    PricingPorts {
        catalog: Arc::new(db.catalog()),
        price_reader: Arc::new(db.prices()),
        price_writer: Arc::new(db.prices()),
        regional: Arc::new(db.regional_prices()),
        history: Arc::new(db.price_history()),
        records: Arc::new(db.clone()),
    }
}

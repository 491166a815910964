//! # Tessera Pricing API
//!
//! Admin HTTP server for the pricing engine.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Pricing API Routes                             │
//! │                                                                         │
//! │  /health                (public)                                       │
//! │                                                                         │
//! │  require_admin ─► /pricing                 GET    variants + prices    │
//! │                   /pricing/{variant_id}    GET | POST | DELETE         │
//! │                   /pricing/calculate       POST                        │
//! │                   /pricing/bulk            POST                        │
//! │                   /pricing/regional        GET | POST | DELETE         │
//! │                   /pricing/history         GET | POST                  │
//! │                   /pricing/import          POST                        │
//! │                   /pricing/export          GET    text/csv             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! Environment variables:
//! - `TESSERA_BIND_ADDR` - Bind address (default: 0.0.0.0)
//! - `TESSERA_PORT` - HTTP port (default: 9000)
//! - `TESSERA_DATABASE_PATH` - SQLite file (default: ./tessera.db)
//! - `TESSERA_DB_MAX_CONNECTIONS` - Pool size (default: 5)
//! - `TESSERA_JWT_SECRET` - Secret for admin bearer tokens
//! - `TESSERA_HISTORY_QUEUE_CAPACITY` - Queued history entries (default: 1024)
//! - `TESSERA_EXPORT_LIMIT` - Variants per CSV export (default: 5000)

use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod routes;
pub mod state;

// Re-exports
pub use auth::{AdminPrincipal, JwtManager};
pub use config::{ApiConfig, ConfigError};
pub use error::{ApiError, ApiResult};
pub use extract::ApiJson;
pub use state::AppState;

/// Build the full HTTP router.
pub fn build_router(state: AppState) -> Router {
    let protected = routes::pricing_router().layer(axum::middleware::from_fn_with_state(
        state.clone(),
        auth::require_admin,
    ));

    Router::new()
        .route("/health", get(routes::health::health))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

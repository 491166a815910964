//! # Tessera Pricing API
//!
//! HTTP server for the admin pricing dashboard.
//!
//! ## Startup
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  load ApiConfig ─► open SQLite (migrations) ─► spawn history worker    │
//! │        ─► serve /pricing until SIGINT / SIGTERM                         │
//! │        ─► drain history queue ─► close pool                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use tessera_db::{Database, DbConfig};
use tessera_pricing_api::{build_router, ApiConfig, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("Starting Tessera pricing API...");

    // Load configuration
    let config = ApiConfig::load().context("invalid configuration")?;
    if config.uses_dev_secret() {
        warn!("TESSERA_JWT_SECRET not set, using the development secret");
    }
    info!(
        addr = %config.bind_address(),
        database = %config.database_path,
        "Configuration loaded"
    );

    // Open database (runs migrations)
    let db = Database::new(
        DbConfig::new(&config.database_path).max_connections(config.db_max_connections),
    )
    .await
    .context("failed to open database")?;
    info!("Database ready");

    // Start the history worker
    let bind_addr = config.bind_address();
    let (state, worker) = AppState::new(db.clone(), config);
    let history = state.engine.history.clone();
    let worker_task = tokio::spawn(worker.run());

    // Serve
    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind to {}", bind_addr))?;
    info!(addr = %bind_addr, "Pricing API listening");

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    // Drain queued history before closing the pool
    if let Err(e) = history.shutdown().await {
        warn!(error = %e, "History worker already stopped");
    }
    if let Err(e) = worker_task.await {
        warn!(error = %e, "History worker task failed");
    }
    db.close().await;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}

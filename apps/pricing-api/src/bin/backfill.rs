//! # Price Backfill
//!
//! Gives every catalog variant without prices a default price
//! (29.99 in the default currency).
//!
//! ## Usage
//! ```bash
//! # Preview (nothing is written)
//! cargo run -p tessera-pricing-api --bin backfill
//!
//! # Write the missing prices
//! cargo run -p tessera-pricing-api --bin backfill -- --apply
//!
//! # Specify database path
//! cargo run -p tessera-pricing-api --bin backfill -- --db ./data/tessera.db --apply
//! ```

use std::env;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use tessera_db::{Database, DbConfig};
use tessera_pricing::PricingEngine;
use tessera_pricing_api::state::pricing_ports;

/// Queue size for the history entries written by the backfill.
const HISTORY_CAPACITY: usize = 4096;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let args: Vec<String> = env::args().collect();

    let mut apply = false;
    let mut db_path =
        env::var("TESSERA_DATABASE_PATH").unwrap_or_else(|_| String::from("./tessera.db"));

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--apply" => apply = true,
            "--dry-run" => apply = false,
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Tessera Price Backfill");
                println!();
                println!("Usage: backfill [OPTIONS]");
                println!();
                println!("Options:");
                println!("      --dry-run      Report variants without prices (default)");
                println!("      --apply        Create the missing prices");
                println!("  -d, --db <PATH>    Database file path (default: ./tessera.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("💶 Tessera Price Backfill");
    println!("   Database: {}", db_path);
    println!("   Mode:     {}", if apply { "APPLY" } else { "DRY RUN" });
    println!();

    let db = Database::new(DbConfig::new(&db_path))
        .await
        .with_context(|| format!("failed to open {}", db_path))?;

    let (engine, worker) = PricingEngine::new(pricing_ports(&db), HISTORY_CAPACITY);
    let worker_task = tokio::spawn(worker.run());

    let stats = engine.backfill().run(apply).await?;

    engine.history.shutdown().await?;
    worker_task.await.context("history worker failed")?;
    db.close().await;

    println!("📊 Backfill summary");
    println!("   Total variants:  {}", stats.total_variants);
    println!("   With prices:     {}", stats.with_prices);
    println!("   Without prices:  {}", stats.without_prices);
    println!("   Prices created:  {}", stats.created_prices);
    println!("   Errors:          {}", stats.errors);

    if !apply && stats.without_prices > 0 {
        println!();
        println!("Run again with --apply to create the missing prices.");
    }

    Ok(())
}

//! # Catalog Seed Generator
//!
//! Populates the catalog directory with demo variants for development.
//!
//! ## Usage
//! ```bash
//! # 200 variants, no prices
//! cargo run -p tessera-db --bin seed
//!
//! # Custom amount, price every second variant
//! cargo run -p tessera-db --bin seed -- --count 1000 --with-prices
//!
//! # Specify database path
//! cargo run -p tessera-db --bin seed -- --db ./data/tessera.db
//! ```
//!
//! Variants without prices are what the `backfill` binary of pricing-api
//! picks up.

use std::env;
use tessera_core::{Currency, ValidatedPrice, VariantSummary};
use tessera_db::{Database, DbConfig};

/// Products and their handle prefix.
const PRODUCTS: &[(&str, &str)] = &[
    ("LIN", "Linen Shirt"),
    ("DEN", "Denim Jacket"),
    ("WOL", "Wool Sweater"),
    ("CHI", "Chino Trousers"),
    ("TEE", "Organic Tee"),
    ("PAR", "Rain Parka"),
    ("SNE", "Canvas Sneakers"),
    ("BEL", "Leather Belt"),
];

/// Variant sizes and their surcharge in cents.
const SIZES: &[(&str, i64)] = &[("XS", 0), ("S", 0), ("M", 0), ("L", 200), ("XL", 400)];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut count: usize = 200;
    let mut db_path = String::from("./tessera.db");
    let mut with_prices = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(200);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--with-prices" | "-p" => with_prices = true,
            "--help" | "-h" => {
                println!("Tessera Catalog Seed Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of variants to generate (default: 200)");
                println!("  -d, --db <PATH>    Database file path (default: ./tessera.db)");
                println!("  -p, --with-prices  Give every second variant EUR and USD prices");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Tessera Catalog Seed Generator");
    println!("=================================");
    println!("Database: {}", db_path);
    println!("Variants: {}", count);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.catalog().count().await?;
    if existing > 0 {
        println!("⚠ Catalog already has {} variants", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Generating variants...");

    let start = std::time::Instant::now();
    let mut generated = 0;
    let mut priced = 0;

    'outer: for batch in 0.. {
        for (code, product_title) in PRODUCTS {
            let product_id = format!("prod_{}_{}", code.to_lowercase(), batch);

            for (size, surcharge) in SIZES {
                if generated >= count {
                    break 'outer;
                }

                let variant = VariantSummary {
                    id: format!("variant_{:05}", generated),
                    product_id: product_id.clone(),
                    product_title: product_title.to_string(),
                    title: size.to_string(),
                    sku: Some(format!("{}-{:03}-{}", code, batch, size)),
                };

                db.catalog().upsert(&variant).await?;

                if with_prices && generated % 2 == 0 {
                    let base = 1999 + ((generated * 37) % 6000) as i64 + surcharge;
                    let set_id = db.prices().ensure_price_set(&variant.id).await?;
                    for (currency, amount) in [(Currency::Eur, base), (Currency::Usd, base + base / 10)] {
                        let price = ValidatedPrice {
                            currency_code: currency,
                            amount,
                            min_quantity: None,
                            max_quantity: None,
                        };
                        db.prices().insert(&set_id, &price).await?;
                    }
                    priced += 1;
                }

                generated += 1;
            }
        }
    }

    let elapsed = start.elapsed();
    println!();
    println!("✓ Generated {} variants in {:?}", generated, elapsed);
    if with_prices {
        println!("  {} variants received EUR/USD prices", priced);
    }

    println!();
    println!("✓ Seed complete!");

    Ok(())
}

//! # Price Repository
//!
//! Price sets and the prices inside them.
//!
//! ## Layout
//! ```text
//! price_sets (one per variant, UNIQUE variant_id)
//!     │
//!     │ 1 ── n   ON DELETE CASCADE
//!     ▼
//! prices (currency, amount, optional min..max quantity tier)
//! ```
//!
//! A price set is created on the first write for a variant and never
//! removed; deleting every price leaves the empty set behind.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use tessera_core::ports::{VariantPriceReader, VariantPriceWriter};
use tessera_core::{Price, PriceSet, StoreResult, ValidatedPrice};

const PRICE_COLUMNS: &str = "id, price_set_id, currency_code, amount, min_quantity, max_quantity, created_at, updated_at";

/// Repository for price set operations.
#[derive(Debug, Clone)]
pub struct PriceRepository {
    pool: SqlitePool,
}

impl PriceRepository {
    /// Creates a new PriceRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PriceRepository { pool }
    }

    /// Gets the price set id of a variant.
    pub async fn get_price_set_id(&self, variant_id: &str) -> DbResult<Option<String>> {
        let id: Option<String> =
            sqlx::query_scalar("SELECT id FROM price_sets WHERE variant_id = ?1")
                .bind(variant_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(id)
    }

    /// Loads a variant's price set with all of its prices.
    pub async fn find_price_set(&self, variant_id: &str) -> DbResult<Option<PriceSet>> {
        let row: Option<(String, DateTime<Utc>)> =
            sqlx::query_as("SELECT id, created_at FROM price_sets WHERE variant_id = ?1")
                .bind(variant_id)
                .fetch_optional(&self.pool)
                .await?;

        let Some((id, created_at)) = row else {
            return Ok(None);
        };

        let prices = self.list_for_set(&id).await?;

        Ok(Some(PriceSet {
            id,
            variant_id: variant_id.to_string(),
            prices,
            created_at,
        }))
    }

    /// Lists the prices of a set.
    ///
    /// Ordered by currency, then tier lower bound, then creation time.
    pub async fn list_for_set(&self, price_set_id: &str) -> DbResult<Vec<Price>> {
        let prices = sqlx::query_as::<_, Price>(&format!(
            r#"
            SELECT {PRICE_COLUMNS}
            FROM prices
            WHERE price_set_id = ?1
            ORDER BY currency_code ASC, COALESCE(min_quantity, 0) ASC, created_at ASC
            "#
        ))
        .bind(price_set_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(prices)
    }

    /// Creates the variant's price set if missing and returns its id.
    ///
    /// Concurrent callers converge on the same row through the UNIQUE
    /// `variant_id` constraint.
    pub async fn ensure_price_set(&self, variant_id: &str) -> DbResult<String> {
        let candidate = format!("pset_{}", Uuid::new_v4().simple());

        let inserted = sqlx::query(
            r#"
            INSERT INTO price_sets (id, variant_id, created_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT (variant_id) DO NOTHING
            "#,
        )
        .bind(&candidate)
        .bind(variant_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?
        .rows_affected();

        if inserted > 0 {
            debug!(variant_id = %variant_id, price_set_id = %candidate, "Created price set");
            return Ok(candidate);
        }

        self.get_price_set_id(variant_id)
            .await?
            .ok_or_else(|| DbError::not_found("PriceSet", variant_id))
    }

    /// Inserts a price into a set.
    pub async fn insert(&self, price_set_id: &str, price: &ValidatedPrice) -> DbResult<Price> {
        let id = format!("price_{}", Uuid::new_v4().simple());
        let now = Utc::now();

        debug!(
            price_set_id = %price_set_id,
            currency = %price.currency_code,
            amount = price.amount,
            "Inserting price"
        );

        let created = sqlx::query_as::<_, Price>(&format!(
            r#"
            INSERT INTO prices (
                id, price_set_id, currency_code, amount,
                min_quantity, max_quantity, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
            RETURNING {PRICE_COLUMNS}
            "#
        ))
        .bind(&id)
        .bind(price_set_id)
        .bind(price.currency_code)
        .bind(price.amount)
        .bind(price.min_quantity)
        .bind(price.max_quantity)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    /// Replaces a price's amount.
    ///
    /// A tiered input writes both bounds exactly as given; a tier-less one
    /// keeps the stored bounds.
    pub async fn update(&self, price_id: &str, price: &ValidatedPrice) -> DbResult<Price> {
        debug!(price_id = %price_id, amount = price.amount, "Updating price");

        let updated = sqlx::query_as::<_, Price>(&format!(
            r#"
            UPDATE prices SET
                amount = ?2,
                min_quantity = CASE WHEN ?6 THEN ?3 ELSE min_quantity END,
                max_quantity = CASE WHEN ?6 THEN ?4 ELSE max_quantity END,
                updated_at = ?5
            WHERE id = ?1
            RETURNING {PRICE_COLUMNS}
            "#
        ))
        .bind(price_id)
        .bind(price.amount)
        .bind(price.min_quantity)
        .bind(price.max_quantity)
        .bind(Utc::now())
        .bind(price.has_tier())
        .fetch_optional(&self.pool)
        .await?;

        updated.ok_or_else(|| DbError::not_found("Price", price_id))
    }

    /// Deletes one price.
    pub async fn delete(&self, price_id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM prices WHERE id = ?1")
            .bind(price_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Price", price_id));
        }

        debug!(price_id = %price_id, "Deleted price");
        Ok(())
    }
}

#[async_trait]
impl VariantPriceReader for PriceRepository {
    async fn find_price_set_id(&self, variant_id: &str) -> StoreResult<Option<String>> {
        Ok(self.get_price_set_id(variant_id).await?)
    }

    async fn list_prices(&self, price_set_id: &str) -> StoreResult<Vec<Price>> {
        Ok(self.list_for_set(price_set_id).await?)
    }
}

#[async_trait]
impl VariantPriceWriter for PriceRepository {
    async fn create_price_set(&self, variant_id: &str) -> StoreResult<String> {
        Ok(self.ensure_price_set(variant_id).await?)
    }

    async fn insert_price(&self, price_set_id: &str, price: &ValidatedPrice) -> StoreResult<Price> {
        Ok(self.insert(price_set_id, price).await?)
    }

    async fn update_price(&self, price_id: &str, price: &ValidatedPrice) -> StoreResult<Price> {
        Ok(self.update(price_id, price).await?)
    }

    async fn delete_price(&self, price_id: &str) -> StoreResult<()> {
        Ok(self.delete(price_id).await?)
    }
}

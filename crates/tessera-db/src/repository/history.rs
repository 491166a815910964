//! # Price History Repository
//!
//! Append-only price change log, bounded per variant.
//!
//! ## Append + Trim
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                   SINGLE TRANSACTION                                    │
//! │                                                                         │
//! │  1. INSERT INTO price_history (...) VALUES (...)                        │
//! │                                                                         │
//! │  2. DELETE FROM price_history                                          │
//! │     WHERE variant_id = ?                                               │
//! │       AND id NOT IN (newest `max_entries` ids of that variant)         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Ids are AUTOINCREMENT, so `id DESC` is newest first even when two
//! entries share a timestamp.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use tessera_core::ports::PriceHistoryLog;
use tessera_core::{Currency, PriceHistoryEntry, StoreResult};

/// Repository for price history operations.
#[derive(Debug, Clone)]
pub struct PriceHistoryRepository {
    pool: SqlitePool,
}

impl PriceHistoryRepository {
    /// Creates a new PriceHistoryRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PriceHistoryRepository { pool }
    }

    /// Inserts an entry and trims the variant's history to `max_entries`.
    pub async fn insert_trimmed(&self, entry: &PriceHistoryEntry, max_entries: u32) -> DbResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO price_history (
                variant_id, timestamp, currency_code, region_id,
                old_amount, new_amount, changed_by, reason
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&entry.variant_id)
        .bind(entry.timestamp)
        .bind(entry.currency_code)
        .bind(&entry.region_id)
        .bind(entry.old_amount)
        .bind(entry.new_amount)
        .bind(&entry.changed_by)
        .bind(&entry.reason)
        .execute(&mut *tx)
        .await?;

        let trimmed = sqlx::query(
            r#"
            DELETE FROM price_history
            WHERE variant_id = ?1
              AND id NOT IN (
                  SELECT id FROM price_history
                  WHERE variant_id = ?1
                  ORDER BY id DESC
                  LIMIT ?2
              )
            "#,
        )
        .bind(&entry.variant_id)
        .bind(max_entries)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        debug!(
            variant_id = %entry.variant_id,
            currency = %entry.currency_code,
            trimmed,
            "Recorded price change"
        );
        Ok(())
    }

    /// Lists a variant's history, newest first.
    pub async fn list_for_variant(
        &self,
        variant_id: &str,
        currency: Option<Currency>,
        limit: u32,
    ) -> DbResult<Vec<PriceHistoryEntry>> {
        let entries = sqlx::query_as::<_, PriceHistoryEntry>(
            r#"
            SELECT variant_id, timestamp, currency_code, region_id,
                   old_amount, new_amount, changed_by, reason
            FROM price_history
            WHERE variant_id = ?1
              AND (?2 IS NULL OR currency_code = ?2)
            ORDER BY id DESC
            LIMIT ?3
            "#,
        )
        .bind(variant_id)
        .bind(currency)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    /// Lists changes across all variants since `since`, newest first.
    pub async fn list_since(
        &self,
        currency: Option<Currency>,
        since: DateTime<Utc>,
        limit: u32,
    ) -> DbResult<Vec<PriceHistoryEntry>> {
        let entries = sqlx::query_as::<_, PriceHistoryEntry>(
            r#"
            SELECT variant_id, timestamp, currency_code, region_id,
                   old_amount, new_amount, changed_by, reason
            FROM price_history
            WHERE timestamp >= ?1
              AND (?2 IS NULL OR currency_code = ?2)
            ORDER BY timestamp DESC, id DESC
            LIMIT ?3
            "#,
        )
        .bind(since)
        .bind(currency)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }
}

#[async_trait]
impl PriceHistoryLog for PriceHistoryRepository {
    async fn append(&self, entry: &PriceHistoryEntry, max_entries: u32) -> StoreResult<()> {
        Ok(self.insert_trimmed(entry, max_entries).await?)
    }

    async fn list_variant_history(
        &self,
        variant_id: &str,
        currency: Option<Currency>,
        limit: u32,
    ) -> StoreResult<Vec<PriceHistoryEntry>> {
        Ok(self.list_for_variant(variant_id, currency, limit).await?)
    }

    async fn list_recent_history(
        &self,
        currency: Option<Currency>,
        since: DateTime<Utc>,
        limit: u32,
    ) -> StoreResult<Vec<PriceHistoryEntry>> {
        Ok(self.list_since(currency, since, limit).await?)
    }
}

//! # Regional Price Repository
//!
//! Overrides keyed by `(variant_id, region_id, currency_code)`.
//!
//! Setting an existing key replaces `amount` and `updated_at` in place;
//! `created_at` survives every replacement.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use tessera_core::ports::RegionalOverrideRepository;
use tessera_core::{Currency, RegionalFilter, RegionalOverride, StoreResult};

/// Repository for regional override operations.
#[derive(Debug, Clone)]
pub struct RegionalPriceRepository {
    pool: SqlitePool,
}

impl RegionalPriceRepository {
    /// Creates a new RegionalPriceRepository.
    pub fn new(pool: SqlitePool) -> Self {
        RegionalPriceRepository { pool }
    }

    /// Inserts or replaces an override.
    pub async fn upsert(
        &self,
        variant_id: &str,
        region_id: &str,
        currency: Currency,
        amount: i64,
    ) -> DbResult<RegionalOverride> {
        debug!(
            variant_id = %variant_id,
            region_id = %region_id,
            currency = %currency,
            amount,
            "Upserting regional price"
        );

        let stored = sqlx::query_as::<_, RegionalOverride>(
            r#"
            INSERT INTO regional_prices (
                variant_id, region_id, currency_code, amount, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?5)
            ON CONFLICT (variant_id, region_id, currency_code) DO UPDATE SET
                amount = excluded.amount,
                updated_at = excluded.updated_at
            RETURNING variant_id, region_id, currency_code, amount, created_at, updated_at
            "#,
        )
        .bind(variant_id)
        .bind(region_id)
        .bind(currency)
        .bind(amount)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(stored)
    }

    /// Gets one override by its full key.
    pub async fn get(
        &self,
        variant_id: &str,
        region_id: &str,
        currency: Currency,
    ) -> DbResult<Option<RegionalOverride>> {
        let found = sqlx::query_as::<_, RegionalOverride>(
            r#"
            SELECT variant_id, region_id, currency_code, amount, created_at, updated_at
            FROM regional_prices
            WHERE variant_id = ?1 AND region_id = ?2 AND currency_code = ?3
            "#,
        )
        .bind(variant_id)
        .bind(region_id)
        .bind(currency)
        .fetch_optional(&self.pool)
        .await?;

        Ok(found)
    }

    /// Lists a variant's overrides, optionally filtered by region and currency.
    pub async fn list_for_variant(
        &self,
        variant_id: &str,
        filter: &RegionalFilter,
    ) -> DbResult<Vec<RegionalOverride>> {
        let overrides = sqlx::query_as::<_, RegionalOverride>(
            r#"
            SELECT variant_id, region_id, currency_code, amount, created_at, updated_at
            FROM regional_prices
            WHERE variant_id = ?1
              AND (?2 IS NULL OR region_id = ?2)
              AND (?3 IS NULL OR currency_code = ?3)
            ORDER BY region_id ASC, currency_code ASC
            "#,
        )
        .bind(variant_id)
        .bind(filter.region_id.as_deref())
        .bind(filter.currency_code)
        .fetch_all(&self.pool)
        .await?;

        Ok(overrides)
    }

    /// Lists one region's overrides across variants, most recently updated first.
    pub async fn list_for_region(
        &self,
        region_id: &str,
        currency: Option<Currency>,
        limit: u32,
    ) -> DbResult<Vec<RegionalOverride>> {
        let overrides = sqlx::query_as::<_, RegionalOverride>(
            r#"
            SELECT variant_id, region_id, currency_code, amount, created_at, updated_at
            FROM regional_prices
            WHERE region_id = ?1
              AND (?2 IS NULL OR currency_code = ?2)
            ORDER BY updated_at DESC, variant_id ASC
            LIMIT ?3
            "#,
        )
        .bind(region_id)
        .bind(currency)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        debug!(region_id = %region_id, count = overrides.len(), "Listed region overrides");
        Ok(overrides)
    }

    /// Deletes one override. Returns whether a row was removed.
    pub async fn delete(
        &self,
        variant_id: &str,
        region_id: &str,
        currency: Currency,
    ) -> DbResult<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM regional_prices
            WHERE variant_id = ?1 AND region_id = ?2 AND currency_code = ?3
            "#,
        )
        .bind(variant_id)
        .bind(region_id)
        .bind(currency)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl RegionalOverrideRepository for RegionalPriceRepository {
    async fn upsert_override(
        &self,
        variant_id: &str,
        region_id: &str,
        currency: Currency,
        amount: i64,
    ) -> StoreResult<RegionalOverride> {
        Ok(self.upsert(variant_id, region_id, currency, amount).await?)
    }

    async fn find_override(
        &self,
        variant_id: &str,
        region_id: &str,
        currency: Currency,
    ) -> StoreResult<Option<RegionalOverride>> {
        Ok(self.get(variant_id, region_id, currency).await?)
    }

    async fn list_variant_overrides(
        &self,
        variant_id: &str,
        filter: &RegionalFilter,
    ) -> StoreResult<Vec<RegionalOverride>> {
        Ok(self.list_for_variant(variant_id, filter).await?)
    }

    async fn list_region_overrides(
        &self,
        region_id: &str,
        currency: Option<Currency>,
        limit: u32,
    ) -> StoreResult<Vec<RegionalOverride>> {
        Ok(self.list_for_region(region_id, currency, limit).await?)
    }

    async fn delete_override(
        &self,
        variant_id: &str,
        region_id: &str,
        currency: Currency,
    ) -> StoreResult<bool> {
        Ok(self.delete(variant_id, region_id, currency).await?)
    }
}

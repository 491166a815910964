//! # Catalog Repository
//!
//! Read access to the variant directory the pricing engine prices against.
//!
//! The catalog itself is owned elsewhere; Tessera only needs to know that a
//! variant exists, which SKU it carries and what to call it in exports.
//! `upsert` exists for the seed binary and tests.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use tessera_core::ports::VariantLookup;
use tessera_core::{StoreResult, VariantSummary};

/// Repository for catalog variant lookups.
#[derive(Debug, Clone)]
pub struct CatalogRepository {
    pool: SqlitePool,
}

impl CatalogRepository {
    /// Creates a new CatalogRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CatalogRepository { pool }
    }

    /// Gets a variant by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<VariantSummary>> {
        let variant = sqlx::query_as::<_, VariantSummary>(
            r#"
            SELECT id, product_id, product_title, title, sku
            FROM catalog_variants
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(variant)
    }

    /// Gets the first variant carrying a SKU.
    pub async fn get_by_sku(&self, sku: &str) -> DbResult<Option<VariantSummary>> {
        let variant = sqlx::query_as::<_, VariantSummary>(
            r#"
            SELECT id, product_id, product_title, title, sku
            FROM catalog_variants
            WHERE sku = ?1
            ORDER BY created_at ASC, id ASC
            LIMIT 1
            "#,
        )
        .bind(sku)
        .fetch_optional(&self.pool)
        .await?;

        Ok(variant)
    }

    /// Lists variants, optionally restricted to one product.
    ///
    /// Ordered by insertion so pagination is stable.
    pub async fn list(
        &self,
        product_id: Option<&str>,
        offset: u32,
        limit: u32,
    ) -> DbResult<Vec<VariantSummary>> {
        debug!(product_id = ?product_id, offset, limit, "Listing catalog variants");

        let variants = sqlx::query_as::<_, VariantSummary>(
            r#"
            SELECT id, product_id, product_title, title, sku
            FROM catalog_variants
            WHERE (?1 IS NULL OR product_id = ?1)
            ORDER BY created_at ASC, id ASC
            LIMIT ?2 OFFSET ?3
            "#,
        )
        .bind(product_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(variants)
    }

    /// Inserts a variant or refreshes its titles and SKU.
    pub async fn upsert(&self, variant: &VariantSummary) -> DbResult<()> {
        debug!(id = %variant.id, sku = ?variant.sku, "Upserting catalog variant");

        sqlx::query(
            r#"
            INSERT INTO catalog_variants (id, product_id, product_title, title, sku, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT (id) DO UPDATE SET
                product_id = excluded.product_id,
                product_title = excluded.product_title,
                title = excluded.title,
                sku = excluded.sku
            "#,
        )
        .bind(&variant.id)
        .bind(&variant.product_id)
        .bind(&variant.product_title)
        .bind(&variant.title)
        .bind(&variant.sku)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Counts catalog variants.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM catalog_variants")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

#[async_trait]
impl VariantLookup for CatalogRepository {
    async fn find_variant(&self, variant_id: &str) -> StoreResult<Option<VariantSummary>> {
        Ok(self.get_by_id(variant_id).await?)
    }

    async fn find_variant_by_sku(&self, sku: &str) -> StoreResult<Option<VariantSummary>> {
        Ok(self.get_by_sku(sku).await?)
    }

    async fn list_variants(
        &self,
        product_id: Option<&str>,
        offset: u32,
        limit: u32,
    ) -> StoreResult<Vec<VariantSummary>> {
        Ok(self.list(product_id, offset, limit).await?)
    }
}

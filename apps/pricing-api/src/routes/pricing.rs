//! Variant price routes.
//!
//! - `GET    /pricing`               variants with prices
//! - `GET    /pricing/{variant_id}`  a variant's prices (`?include=record` adds the stored record)
//! - `POST   /pricing/{variant_id}`  create or update prices
//! - `DELETE /pricing/{variant_id}`  remove every price
//! - `POST   /pricing/calculate`     resolve one price
//! - `POST   /pricing/bulk`          many variants at once

use axum::extract::{Path, Query, State};
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use tessera_core::{
    CalculatedPrice, CalculationContext, FormattedPrice, PriceCreateInput, PricingRecord,
    VariantListQuery, VariantWithPrices, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT,
};
use tessera_pricing::{BulkUpdateResult, VariantPriceUpdate};

use super::{non_blank, parse_currency, ADMIN_UPDATE_REASON};
use crate::auth::AdminPrincipal;
use crate::error::{ApiError, ApiResult};
use crate::extract::ApiJson;
use crate::state::AppState;

// =============================================================================
// Request / Response Types
// =============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub product_id: Option<String>,
    pub currency_code: Option<String>,
    pub offset: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub variants: Vec<VariantWithPrices>,
    pub count: usize,
    pub offset: u32,
    pub limit: u32,
}

#[derive(Debug, Default, Deserialize)]
pub struct VariantPricesQuery {
    pub include: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct VariantPricesResponse {
    pub variant_id: String,
    pub prices: Vec<FormattedPrice>,
    pub count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<PricingRecord>,
}

#[derive(Debug, Deserialize)]
pub struct SetPricesRequest {
    #[serde(default)]
    pub prices: Vec<PriceCreateInput>,
}

#[derive(Debug, Serialize)]
pub struct SetPricesResponse {
    pub variant_id: String,
    pub created: u32,
    pub updated: u32,
    pub prices: Vec<FormattedPrice>,
}

#[derive(Debug, Serialize)]
pub struct DeletePricesResponse {
    pub variant_id: String,
    pub deleted: bool,
    pub count: usize,
}

#[derive(Debug, Deserialize)]
pub struct CalculateRequest {
    pub variant_id: Option<String>,
    pub currency_code: Option<String>,
    pub region_id: Option<String>,
    pub customer_group_id: Option<String>,
    pub quantity: Option<i64>,
    /// Layer the region's override over the base price.
    #[serde(default)]
    pub apply_overrides: bool,
}

#[derive(Debug, Serialize)]
pub struct CalculateResponse {
    pub price: CalculatedPrice,
}

#[derive(Debug, Deserialize)]
pub struct BulkRequest {
    #[serde(default)]
    pub updates: Vec<VariantPriceUpdate>,
}

// =============================================================================
// Handlers
// =============================================================================

pub async fn list_variants(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<ListResponse>> {
    let offset = query.offset.unwrap_or(0);
    let limit = query.limit.unwrap_or(DEFAULT_LIST_LIMIT).clamp(1, MAX_LIST_LIMIT);

    let list_query = VariantListQuery {
        product_id: non_blank(query.product_id),
        currency_code: parse_currency(query.currency_code.as_deref())?,
        offset,
        limit,
    };
    let variants = state
        .engine
        .reconciler
        .list_variants_with_prices(&list_query)
        .await?;

    Ok(Json(ListResponse {
        count: variants.len(),
        variants,
        offset,
        limit,
    }))
}

pub async fn get_variant_prices(
    State(state): State<AppState>,
    Path(variant_id): Path<String>,
    Query(query): Query<VariantPricesQuery>,
) -> ApiResult<Json<VariantPricesResponse>> {
    let prices = state.engine.store.get_variant_prices(&variant_id).await?;

    let record = match query.include.as_deref() {
        Some("record") => Some(state.engine.resolver.pricing_record(&variant_id).await?),
        _ => None,
    };

    Ok(Json(VariantPricesResponse {
        count: prices.len(),
        prices: prices.iter().map(FormattedPrice::from).collect(),
        variant_id,
        record,
    }))
}

pub async fn set_variant_prices(
    State(state): State<AppState>,
    Extension(principal): Extension<AdminPrincipal>,
    Path(variant_id): Path<String>,
    ApiJson(body): ApiJson<SetPricesRequest>,
) -> ApiResult<Json<SetPricesResponse>> {
    if body.prices.is_empty() {
        return Err(ApiError::InvalidRequest(
            "prices must be a non-empty array".to_string(),
        ));
    }

    let attribution = principal.attribution(ADMIN_UPDATE_REASON);
    let result = state
        .engine
        .store
        .bulk_set_variant_prices(&variant_id, &body.prices, &attribution)
        .await?;
    let prices = state.engine.store.get_variant_prices(&variant_id).await?;

    info!(
        variant_id = %variant_id,
        user_id = %principal.user_id,
        created = result.created,
        updated = result.updated,
        "Variant prices saved"
    );

    Ok(Json(SetPricesResponse {
        variant_id,
        created: result.created,
        updated: result.updated,
        prices: prices.iter().map(FormattedPrice::from).collect(),
    }))
}

pub async fn delete_variant_prices(
    State(state): State<AppState>,
    Extension(principal): Extension<AdminPrincipal>,
    Path(variant_id): Path<String>,
) -> ApiResult<Json<DeletePricesResponse>> {
    let count = state.engine.store.delete_variant_prices(&variant_id).await?;

    info!(variant_id = %variant_id, user_id = %principal.user_id, count, "Variant prices deleted");

    Ok(Json(DeletePricesResponse {
        variant_id,
        deleted: true,
        count,
    }))
}

pub async fn calculate_price(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CalculateRequest>,
) -> ApiResult<Json<CalculateResponse>> {
    let variant_id = non_blank(body.variant_id).ok_or_else(|| ApiError::required("variant_id"))?;
    let currency = parse_currency(body.currency_code.as_deref())?
        .ok_or_else(|| ApiError::required("currency_code"))?;

    let ctx = CalculationContext {
        variant_id,
        currency_code: currency,
        region_id: non_blank(body.region_id),
        customer_group_id: non_blank(body.customer_group_id),
        quantity: body.quantity,
    };

    let resolver = &state.engine.resolver;
    let price = if body.apply_overrides {
        resolver.effective_price(&ctx).await?
    } else {
        resolver.calculate_price(&ctx).await?
    };

    price
        .map(|price| Json(CalculateResponse { price }))
        .ok_or_else(|| {
            ApiError::NotFound(format!(
                "No price for variant {} in {}",
                ctx.variant_id, ctx.currency_code
            ))
        })
}

pub async fn bulk_update(
    State(state): State<AppState>,
    Extension(principal): Extension<AdminPrincipal>,
    ApiJson(body): ApiJson<BulkRequest>,
) -> ApiResult<Json<BulkUpdateResult>> {
    if body.updates.is_empty() {
        return Err(ApiError::InvalidRequest(
            "updates must be a non-empty array".to_string(),
        ));
    }

    let attribution = principal.attribution(ADMIN_UPDATE_REASON);
    let result = state
        .engine
        .reconciler
        .bulk_update(&body.updates, &attribution)
        .await;

    Ok(Json(result))
}

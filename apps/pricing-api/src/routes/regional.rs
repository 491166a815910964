//! Regional override routes.
//!
//! `GET /pricing/regional?region_id=...` scans the region across variants;
//! adding `variant_id` narrows it to one variant.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};

use tessera_core::{RegionalFilter, RegionalOverride};
use tessera_pricing::RegionScanFilter;

use super::{non_blank, parse_currency, ADMIN_UPDATE_REASON};
use crate::auth::AdminPrincipal;
use crate::error::{ApiError, ApiResult};
use crate::extract::ApiJson;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct RegionalQuery {
    pub region_id: Option<String>,
    pub variant_id: Option<String>,
    pub currency_code: Option<String>,
    pub limit: Option<u32>,
}

/// An override with its display amount.
#[derive(Debug, Serialize)]
pub struct FormattedOverride {
    #[serde(flatten)]
    pub regional_price: RegionalOverride,
    pub formatted_amount: String,
}

impl From<RegionalOverride> for FormattedOverride {
    fn from(regional_price: RegionalOverride) -> Self {
        FormattedOverride {
            formatted_amount: regional_price.formatted_amount(),
            regional_price,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RegionalListResponse {
    pub regional_prices: Vec<FormattedOverride>,
    pub count: usize,
}

#[derive(Debug, Deserialize)]
pub struct SetRegionalRequest {
    pub variant_id: Option<String>,
    pub region_id: Option<String>,
    pub currency_code: Option<String>,
    pub amount: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct SetRegionalResponse {
    pub regional_price: FormattedOverride,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct DeleteRegionalRequest {
    pub variant_id: Option<String>,
    pub region_id: Option<String>,
    pub currency_code: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DeleteRegionalResponse {
    pub deleted: bool,
}

pub async fn list_regional_prices(
    State(state): State<AppState>,
    Query(query): Query<RegionalQuery>,
) -> ApiResult<Json<RegionalListResponse>> {
    let region_id = non_blank(query.region_id).ok_or_else(|| ApiError::required("region_id"))?;
    let currency_code = parse_currency(query.currency_code.as_deref())?;
    let regional = &state.engine.regional;

    let overrides = match non_blank(query.variant_id) {
        Some(variant_id) => {
            let filter = RegionalFilter {
                region_id: Some(region_id),
                currency_code,
            };
            regional.get_regional_prices(&variant_id, &filter).await?
        }
        None => {
            let filter = RegionScanFilter {
                currency_code,
                limit: query.limit,
            };
            regional.get_bulk_regional_prices(&region_id, &filter).await?
        }
    };

    Ok(Json(RegionalListResponse {
        count: overrides.len(),
        regional_prices: overrides.into_iter().map(FormattedOverride::from).collect(),
    }))
}

pub async fn set_regional_price(
    State(state): State<AppState>,
    Extension(principal): Extension<AdminPrincipal>,
    ApiJson(body): ApiJson<SetRegionalRequest>,
) -> ApiResult<(StatusCode, Json<SetRegionalResponse>)> {
    let variant_id = non_blank(body.variant_id).ok_or_else(|| ApiError::required("variant_id"))?;
    let region_id = non_blank(body.region_id).ok_or_else(|| ApiError::required("region_id"))?;
    let currency_code =
        non_blank(body.currency_code).ok_or_else(|| ApiError::required("currency_code"))?;
    let amount = body.amount.ok_or_else(|| ApiError::required("amount"))?;

    let stored = state
        .engine
        .regional
        .set_regional_price(
            &variant_id,
            &region_id,
            &currency_code,
            amount,
            &principal.attribution(ADMIN_UPDATE_REASON),
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(SetRegionalResponse {
            regional_price: stored.into(),
            message: format!("Regional price override saved for {}", region_id),
        }),
    ))
}

pub async fn delete_regional_price(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<DeleteRegionalRequest>,
) -> ApiResult<Json<DeleteRegionalResponse>> {
    let variant_id = non_blank(body.variant_id).ok_or_else(|| ApiError::required("variant_id"))?;
    let region_id = non_blank(body.region_id).ok_or_else(|| ApiError::required("region_id"))?;
    let currency = parse_currency(body.currency_code.as_deref())?
        .ok_or_else(|| ApiError::required("currency_code"))?;

    let deleted = state
        .engine
        .regional
        .delete_regional_price(&variant_id, &region_id, currency)
        .await?;

    Ok(Json(DeleteRegionalResponse { deleted }))
}

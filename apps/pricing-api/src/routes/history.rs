//! Price history routes.
//!
//! - `GET /pricing/history?variant_id=...`  one variant's audit trail
//! - `GET /pricing/history`                 recent changes (`currency_code`, `days`, `limit`)
//! - `POST /pricing/history`                queue an entry (internal hook)

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use tracing::debug;

use tessera_core::validation::validate_price;
use tessera_core::{
    AuditTrail, ChangeAttribution, Currency, PriceHistoryEntry, RecentHistoryFilter,
};
use tessera_pricing::FormattedHistoryEntry;

use super::{non_blank, parse_currency};
use crate::auth::AdminPrincipal;
use crate::error::{ApiError, ApiResult};
use crate::extract::ApiJson;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    pub variant_id: Option<String>,
    pub currency_code: Option<String>,
    pub days: Option<i64>,
    pub limit: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum HistoryResponse {
    AuditTrail {
        audit_trail: AuditTrail,
    },
    Recent {
        history: Vec<FormattedHistoryEntry>,
        count: usize,
    },
}

#[derive(Debug, Deserialize)]
pub struct RecordHistoryRequest {
    pub variant_id: Option<String>,
    pub currency_code: Option<String>,
    pub old_amount: Option<i64>,
    pub new_amount: Option<i64>,
    pub region_id: Option<String>,
    pub changed_by: Option<String>,
    pub reason: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RecordHistoryResponse {
    pub message: String,
}

pub async fn get_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> ApiResult<Json<HistoryResponse>> {
    if let Some(variant_id) = non_blank(query.variant_id) {
        let audit_trail = state.engine.audit_trail(&variant_id).await?;
        return Ok(Json(HistoryResponse::AuditTrail { audit_trail }));
    }

    let filter = RecentHistoryFilter {
        currency_code: parse_currency(query.currency_code.as_deref())?,
        days: query.days,
        limit: query.limit,
    };
    let history = state.engine.history.get_bulk_price_history(&filter).await?;

    Ok(Json(HistoryResponse::Recent {
        count: history.len(),
        history: history.into_iter().map(FormattedHistoryEntry::from).collect(),
    }))
}

pub async fn record_history(
    State(state): State<AppState>,
    Extension(principal): Extension<AdminPrincipal>,
    ApiJson(body): ApiJson<RecordHistoryRequest>,
) -> ApiResult<(StatusCode, Json<RecordHistoryResponse>)> {
    let variant_id = non_blank(body.variant_id).ok_or_else(|| ApiError::required("variant_id"))?;
    let currency_code =
        non_blank(body.currency_code).ok_or_else(|| ApiError::required("currency_code"))?;
    let new_amount = body.new_amount.ok_or_else(|| ApiError::required("new_amount"))?;

    let validation = validate_price(new_amount as f64, &currency_code);
    if !validation.valid {
        return Err(ApiError::validation(&validation.errors));
    }
    let currency: Currency = currency_code.parse()?;

    let attribution = ChangeAttribution {
        changed_by: non_blank(body.changed_by).or(Some(principal.user_id)),
        reason: non_blank(body.reason),
    };
    let mut entry =
        PriceHistoryEntry::now(&variant_id, currency, body.old_amount, new_amount, &attribution);
    if let Some(region_id) = non_blank(body.region_id) {
        entry = entry.in_region(region_id);
    }

    state.engine.history.record(entry);
    debug!(variant_id = %variant_id, currency = %currency, "History entry accepted");

    Ok((
        StatusCode::ACCEPTED,
        Json(RecordHistoryResponse {
            message: "Price change queued for the audit trail".to_string(),
        }),
    ))
}

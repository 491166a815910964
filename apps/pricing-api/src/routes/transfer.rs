//! CSV import and export routes.

use axum::extract::{Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use tessera_core::transfer::{decode_payload, CsvFormat, ImportResult};
use tessera_pricing::ExportFilter;

use super::{non_blank, parse_currency};
use crate::auth::AdminPrincipal;
use crate::error::{ApiError, ApiResult};
use crate::extract::ApiJson;
use crate::state::AppState;

/// Reason attached to history entries written by an import.
const IMPORT_REASON: &str = "CSV import";

#[derive(Debug, Deserialize)]
pub struct ImportRequest {
    pub csv_data: Option<String>,
    #[serde(default)]
    pub format: CsvFormat,
    #[serde(default)]
    pub dry_run: bool,
}

#[derive(Debug, Serialize)]
pub struct ImportResponse {
    pub result: ImportResult,
    pub dry_run: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct ExportQuery {
    pub product_id: Option<String>,
    pub currency_code: Option<String>,
    pub region_id: Option<String>,
}

pub async fn import_prices(
    State(state): State<AppState>,
    Extension(principal): Extension<AdminPrincipal>,
    ApiJson(body): ApiJson<ImportRequest>,
) -> ApiResult<Json<ImportResponse>> {
    let csv_data = non_blank(body.csv_data).ok_or_else(|| ApiError::required("csv_data"))?;
    let csv_text = decode_payload(&csv_data, body.format)?;

    let result = state
        .engine
        .reconciler
        .import_csv(&csv_text, body.dry_run, &principal.attribution(IMPORT_REASON))
        .await?;

    info!(
        user_id = %principal.user_id,
        total_rows = result.total_rows,
        successful = result.successful,
        failed = result.failed,
        dry_run = body.dry_run,
        "Price import handled"
    );

    Ok(Json(ImportResponse {
        result,
        dry_run: body.dry_run,
    }))
}

pub async fn export_prices(
    State(state): State<AppState>,
    Query(query): Query<ExportQuery>,
) -> ApiResult<Response> {
    let filter = ExportFilter {
        product_id: non_blank(query.product_id),
        currency_code: parse_currency(query.currency_code.as_deref())?,
        region_id: non_blank(query.region_id),
    };

    let csv = state
        .engine
        .reconciler
        .export_csv(&filter, state.config.export_limit)
        .await?;

    let disposition = format!(
        "attachment; filename=\"prices_export_{}.csv\"",
        Utc::now().timestamp_millis()
    );

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        csv,
    )
        .into_response())
}

//! HTTP routes, one file per area of the `/pricing` surface.

use axum::routing::{get, post};
use axum::Router;

use tessera_core::Currency;

use crate::error::ApiResult;
use crate::state::AppState;

pub mod health;
pub mod history;
pub mod pricing;
pub mod regional;
pub mod transfer;

/// Reason attached to history entries written through the admin dashboard.
pub const ADMIN_UPDATE_REASON: &str = "Price updated via admin dashboard";

/// Router for every authenticated pricing endpoint.
///
/// Static segments take precedence over `{variant_id}`.
pub fn pricing_router() -> Router<AppState> {
    Router::new()
        .route("/pricing", get(pricing::list_variants))
        .route("/pricing/calculate", post(pricing::calculate_price))
        .route("/pricing/bulk", post(pricing::bulk_update))
        .route(
            "/pricing/regional",
            get(regional::list_regional_prices)
                .post(regional::set_regional_price)
                .delete(regional::delete_regional_price),
        )
        .route(
            "/pricing/history",
            get(history::get_history).post(history::record_history),
        )
        .route("/pricing/import", post(transfer::import_prices))
        .route("/pricing/export", get(transfer::export_prices))
        .route(
            "/pricing/{variant_id}",
            get(pricing::get_variant_prices)
                .post(pricing::set_variant_prices)
                .delete(pricing::delete_variant_prices),
        )
}

/// Parses an optional currency query parameter. Blank means absent.
pub(crate) fn parse_currency(code: Option<&str>) -> ApiResult<Option<Currency>> {
    match code.map(str::trim).filter(|c| !c.is_empty()) {
        Some(code) => Ok(Some(code.parse()?)),
        None => Ok(None),
    }
}

/// Treats blank strings as missing.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

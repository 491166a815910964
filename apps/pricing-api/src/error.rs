//! Error types for the Pricing API.
//!
//! Every handler returns [`ApiResult`]; the error renders as
//! `{"error": code, "message": ..., "details"?: [{field, message}]}`.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

use tessera_core::error::FieldError;
use tessera_core::{CoreError, StoreError, ValidationError};
use tessera_pricing::PricingError;

/// Pricing API errors.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{message}")]
    Validation {
        message: String,
        details: Vec<FieldError>,
    },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    #[error("Authorization failed: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type of every handler.
pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    /// A validation failure carrying the individual field errors.
    pub fn validation(errors: &[ValidationError]) -> Self {
        let message = errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");

        ApiError::Validation {
            message,
            details: errors.iter().map(FieldError::from).collect(),
        }
    }

    /// A single missing field.
    pub fn required(field: &str) -> Self {
        ApiError::validation(&[ValidationError::Required {
            field: field.to_string(),
        }])
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation { .. } | ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::AuthFailed(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ApiError::Validation { .. } => "validation_error",
            ApiError::InvalidRequest(_) => "invalid_request",
            ApiError::AuthFailed(_) => "unauthorized",
            ApiError::Forbidden(_) => "forbidden",
            ApiError::NotFound(_) => "not_found",
            ApiError::Conflict(_) => "conflict",
            ApiError::Unavailable(_) => "unavailable",
            ApiError::Internal(_) => "internal_error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();

        let body = match self {
            ApiError::Validation { message, details } => json!({
                "error": code,
                "message": message,
                "details": details,
            }),
            ApiError::Internal(detail) | ApiError::Unavailable(detail) => {
                // Driver and queue messages stay in the logs.
                error!(status = status.as_u16(), error = %detail, "Request failed");
                json!({
                    "error": code,
                    "message": "An internal error occurred",
                })
            }
            other => json!({
                "error": code,
                "message": other.to_string(),
            }),
        };

        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidRequest(rejection.body_text())
    }
}

impl From<PricingError> for ApiError {
    fn from(err: PricingError) -> Self {
        match err {
            PricingError::Core(core) => core.into(),
            PricingError::Store(store) => match store {
                StoreError::NotFound { .. } => ApiError::NotFound(store.to_string()),
                StoreError::Conflict(msg) => ApiError::Conflict(msg),
                StoreError::Unavailable(msg) => ApiError::Unavailable(msg),
                StoreError::Internal(msg) => ApiError::Internal(msg),
            },
            PricingError::HistoryQueueClosed => {
                ApiError::Unavailable("history queue closed".to_string())
            }
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidPrice(errors) => ApiError::validation(&errors),
            CoreError::Validation(error) => ApiError::validation(&[error]),
            CoreError::VariantNotFound(_) | CoreError::SkuNotFound(_) => {
                ApiError::NotFound(err.to_string())
            }
            CoreError::Csv(msg) => ApiError::InvalidRequest(msg),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(&[err])
    }
}

//! JWT authentication module.
//!
//! Every `/pricing` route requires a bearer token whose `role` claim is
//! `admin`. The token subject becomes the `changed_by` of history entries.

use axum::extract::{Request, State};
use axum::http::{header, HeaderMap};
use axum::middleware::Next;
use axum::response::Response;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use tessera_core::ChangeAttribution;

use crate::error::ApiError;
use crate::state::AppState;

/// Role required for every pricing route.
pub const ADMIN_ROLE: &str = "admin";

/// Attribution used when a token carries no usable subject.
const FALLBACK_ACTOR: &str = "admin";

/// JWT claims structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user id)
    pub sub: String,

    /// Caller role
    pub role: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration (Unix timestamp)
    pub exp: i64,

    /// JWT ID
    pub jti: String,
}

/// JWT token manager.
#[derive(Clone)]
pub struct JwtManager {
    secret: String,
}

impl JwtManager {
    pub fn new(secret: impl Into<String>) -> Self {
        JwtManager {
            secret: secret.into(),
        }
    }

    /// Issue a token. Used by tooling and tests; the admin dashboard gets
    /// its tokens from the identity service.
    pub fn generate_token(
        &self,
        user_id: &str,
        role: &str,
        lifetime_secs: i64,
    ) -> Result<String, ApiError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            role: role.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(lifetime_secs)).timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| ApiError::Internal(format!("Failed to generate token: {}", e)))
    }

    /// Validate and decode a token.
    pub fn validate_token(&self, token: &str) -> Result<Claims, ApiError> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map(|data| data.claims)
        .map_err(|e| ApiError::AuthFailed(format!("Invalid token: {}", e)))
    }
}

/// The authenticated admin behind a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminPrincipal {
    pub user_id: String,
}

impl AdminPrincipal {
    /// Attribution for history entries written on this admin's behalf.
    pub fn attribution(&self, reason: &str) -> ChangeAttribution {
        let actor = if self.user_id.trim().is_empty() {
            FALLBACK_ACTOR
        } else {
            self.user_id.as_str()
        };
        ChangeAttribution::new(actor, reason)
    }
}

/// Rejects requests without a valid admin token and stores the
/// [`AdminPrincipal`] in the request extensions.
pub async fn require_admin(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(req.headers())
        .ok_or_else(|| ApiError::AuthFailed("Missing bearer token".to_string()))?;

    let claims = state.jwt.validate_token(token)?;
    if claims.role != ADMIN_ROLE {
        debug!(sub = %claims.sub, role = %claims.role, "Non-admin caller rejected");
        return Err(ApiError::Forbidden("Admin role required".to_string()));
    }

    req.extensions_mut().insert(AdminPrincipal {
        user_id: claims.sub,
    });

    Ok(next.run(req).await)
}

/// Extract bearer token from the authorization header.
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then_some(token)
}

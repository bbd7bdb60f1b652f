//! Request authentication gate.
//!
//! One middleware sits in front of every route. It asks the configured
//! `Authenticator` who the caller is and stores the resulting `Principal`
//! in request extensions. Public paths skip the check.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use gasdesk_core::{Authenticator, Principal, ServiceError};
use jsonwebtoken::{DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Session token claims, as issued by the session provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: user id.
    pub sub: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Issued at (unix timestamp).
    #[serde(default)]
    pub iat: i64,
    /// Expiration (unix timestamp).
    pub exp: i64,
}

/// Verifies `Authorization: Bearer <jwt>` with a shared HS256 secret.
pub struct JwtAuthenticator {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtAuthenticator {
    pub fn new(secret: &str) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::default(),
        }
    }
}

impl Authenticator for JwtAuthenticator {
    fn authenticate(&self, headers: &HeaderMap) -> Result<Principal, ServiceError> {
        let token = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(bearer_token)
            .ok_or_else(|| ServiceError::Unauthorized("missing authorization token".into()))?;

        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| ServiceError::Unauthorized(format!("invalid token: {}", e)))?;

        Ok(Principal {
            subject: data.claims.sub,
            name: data.claims.name,
        })
    }
}

/// Token from an `Authorization` value. The scheme name is matched
/// case-insensitively (`Bearer`, `bearer`, `BEARER`).
fn bearer_token(value: &str) -> Option<&str> {
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim_start();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Middleware that authenticates every non-public request exactly once.
pub async fn auth_gate(
    State(auth): State<Arc<dyn Authenticator>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ServiceError> {
    if is_public_path(request.uri().path()) {
        return Ok(next.run(request).await);
    }

    let principal = auth.authenticate(request.headers()).map_err(|e| {
        warn!(path = %request.uri().path(), error = %e, "request rejected by auth gate");
        e
    })?;

    request.extensions_mut().insert(principal);
    Ok(next.run(request).await)
}

/// Check if a request path is public (no auth required).
fn is_public_path(path: &str) -> bool {
    matches!(path, "/health" | "/version")
}

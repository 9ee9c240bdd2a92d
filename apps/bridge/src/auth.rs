//! Bearer-token verification for the sync API.
//!
//! User tokens are RS256-signed and verified against the backend's JWKS
//! document; service tokens fall back to HS256 with the shared secret. The
//! JWKS document is fetched lazily and kept until a key id misses.

use axum::extract::{Request, State};
use axum::http::{header::AUTHORIZATION, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde_json::Value;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::debug;

use crate::state::AppState;

/// Timeout for JWKS fetches.
const JWKS_FETCH_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing bearer token")]
    MissingToken,
    #[error("Invalid token: {0}")]
    InvalidToken(String),
    #[error("JWT verification is not configured (set SUPABASE_JWKS_URL or SUPABASE_JWT_SECRET)")]
    NotConfigured,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = match self {
            AuthError::NotConfigured => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::UNAUTHORIZED,
        };
        (status, Json(serde_json::json!({"detail": self.to_string()}))).into_response()
    }
}

/// Verified claims attached to the request for handlers that care.
#[derive(Debug, Clone)]
pub struct AuthClaims(pub Value);

/// Token verifier with a cached JWKS document.
pub struct JwtVerifier {
    jwks_url: Option<String>,
    jwt_secret: Option<String>,
    http: reqwest::Client,
    jwks_cache: RwLock<Option<JwkSet>>,
}

impl JwtVerifier {
    #[must_use]
    pub fn new(jwks_url: Option<String>, jwt_secret: Option<String>) -> Self {
        Self {
            jwks_url: jwks_url.filter(|u| !u.trim().is_empty()),
            jwt_secret: jwt_secret.filter(|s| !s.trim().is_empty()),
            http: reqwest::Client::new(),
            jwks_cache: RwLock::new(None),
        }
    }

    pub async fn verify(&self, token: &str) -> Result<Value, AuthError> {
        if self.jwks_url.is_some() {
            match self.verify_rs256(token).await {
                Ok(claims) => return Ok(claims),
                Err(err) => {
                    debug!(error = %err, "JWKS verification failed, trying secret fallback");
                }
            }
        }

        if let Some(secret) = self.jwt_secret.as_deref() {
            let mut validation = Validation::new(Algorithm::HS256);
            validation.validate_aud = false;
            let key = DecodingKey::from_secret(secret.as_bytes());
            return decode::<Value>(token, &key, &validation)
                .map(|data| data.claims)
                .map_err(|e| AuthError::InvalidToken(e.to_string()));
        }

        if self.jwks_url.is_some() {
            return Err(AuthError::InvalidToken(
                "token did not verify against JWKS and no secret fallback is set".to_string(),
            ));
        }
        Err(AuthError::NotConfigured)
    }

    async fn verify_rs256(&self, token: &str) -> Result<Value, AuthError> {
        let url = self.jwks_url.as_deref().ok_or(AuthError::NotConfigured)?;
        let header =
            decode_header(token).map_err(|e| AuthError::InvalidToken(e.to_string()))?;
        let kid = header
            .kid
            .ok_or_else(|| AuthError::InvalidToken("token has no key id".to_string()))?;

        let jwk = match self.cached_key(&kid).await {
            Some(jwk) => jwk,
            None => {
                self.refresh_jwks(url).await?;
                self.cached_key(&kid)
                    .await
                    .ok_or_else(|| AuthError::InvalidToken(format!("unknown key id {kid}")))?
            }
        };

        let key =
            DecodingKey::from_jwk(&jwk).map_err(|e| AuthError::InvalidToken(e.to_string()))?;
        let mut validation = Validation::new(Algorithm::RS256);
        validation.validate_aud = false;
        decode::<Value>(token, &key, &validation)
            .map(|data| data.claims)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))
    }

    async fn cached_key(&self, kid: &str) -> Option<jsonwebtoken::jwk::Jwk> {
        self.jwks_cache
            .read()
            .await
            .as_ref()
            .and_then(|set| set.find(kid))
            .cloned()
    }

    async fn refresh_jwks(&self, url: &str) -> Result<(), AuthError> {
        let jwks: JwkSet = self
            .http
            .get(url)
            .timeout(JWKS_FETCH_TIMEOUT)
            .send()
            .await
            .map_err(|e| AuthError::InvalidToken(format!("JWKS fetch failed: {e}")))?
            .json()
            .await
            .map_err(|e| AuthError::InvalidToken(format!("JWKS decode failed: {e}")))?;
        *self.jwks_cache.write().await = Some(jwks);
        Ok(())
    }
}

fn extract_bearer_token(header: Option<&str>) -> Option<&str> {
    let header = header?;
    let (scheme, token) = header.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Middleware guarding the sync API.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = extract_bearer_token(
        request
            .headers()
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok()),
    );
    let Some(token) = token else {
        return AuthError::MissingToken.into_response();
    };

    match state.verifier.verify(token).await {
        Ok(claims) => {
            request.extensions_mut().insert(AuthClaims(claims));
            next.run(request).await
        }
        Err(err) => err.into_response(),
    }
}

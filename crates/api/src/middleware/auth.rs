//! Bearer-token authentication extractor for Axum handlers.
//!
//! By default a request only has to carry `Authorization: Bearer <token>`;
//! the token is not verified and its `sub` claim is read best-effort to
//! identify the caller. Setting `AUTH_VERIFY_TOKENS=true` switches to full
//! HS256 verification against `JWT_SECRET`.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use shipyard_core::error::CoreError;
use shipyard_core::types::DbId;

use crate::error::AppError;
use crate::state::AppState;

/// How incoming bearer tokens are checked.
#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
    /// Verify token signatures and expiry instead of checking presence only.
    pub verify_tokens: bool,
    /// HMAC-SHA256 secret. Required when `verify_tokens` is set.
    pub jwt_secret: Option<String>,
}

impl AuthConfig {
    /// Load auth configuration from environment variables.
    ///
    /// | Env Var              | Required                   | Default |
    /// |----------------------|----------------------------|---------|
    /// | `AUTH_VERIFY_TOKENS` | no                         | `false` |
    /// | `JWT_SECRET`         | when verification is on    | --      |
    ///
    /// # Panics
    ///
    /// Panics if verification is enabled without a non-empty `JWT_SECRET`.
    pub fn from_env() -> Self {
        let verify_tokens: bool = std::env::var("AUTH_VERIFY_TOKENS")
            .unwrap_or_else(|_| "false".into())
            .parse()
            .expect("AUTH_VERIFY_TOKENS must be true or false");

        let jwt_secret = std::env::var("JWT_SECRET").ok().filter(|s| !s.is_empty());
        if verify_tokens {
            assert!(
                jwt_secret.is_some(),
                "JWT_SECRET must be set when AUTH_VERIFY_TOKENS=true"
            );
        }

        Self {
            verify_tokens,
            jwt_secret,
        }
    }
}

/// Claims read from an access token issued by the auth provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject -- the user's id.
    pub sub: DbId,
    #[serde(default)]
    pub role: Option<String>,
    /// Expiration time (UTC Unix timestamp).
    #[serde(default)]
    pub exp: Option<i64>,
}

/// Verify an HS256 token's signature and expiry, returning its claims.
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )?;
    Ok(data.claims)
}

/// Read the `sub` claim without checking the signature.
///
/// Returns `None` for opaque tokens or tokens without a UUID subject.
pub fn peek_subject(token: &str) -> Option<DbId> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.required_spec_claims.clear();

    decode::<Claims>(token, &DecodingKey::from_secret(&[]), &validation)
        .ok()
        .map(|data| data.claims.sub)
}

/// Caller identity extracted from the `Authorization` header.
///
/// ```ignore
/// async fn my_handler(auth: AuthUser) -> AppResult<Json<()>> {
///     tracing::info!(user_id = ?auth.user_id, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The caller's id, when the token carries one.
    pub user_id: Option<DbId>,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(
                    "No authorization header".into(),
                ))
            })?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(
                    "Invalid Authorization format. Expected: Bearer <token>".into(),
                ))
            })?;

        let auth = &state.config.auth;
        let user_id = match (auth.verify_tokens, auth.jwt_secret.as_deref()) {
            (true, Some(secret)) => {
                let claims = verify_token(token, secret).map_err(|_| {
                    AppError::Core(CoreError::Unauthorized("Invalid or expired token".into()))
                })?;
                Some(claims.sub)
            }
            (true, None) => {
                return Err(AppError::Core(CoreError::Internal(
                    "Token verification enabled without a secret".into(),
                )))
            }
            (false, _) => peek_subject(token),
        };

        Ok(AuthUser { user_id })
    }
}

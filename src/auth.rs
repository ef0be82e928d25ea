use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tokio::task;
use uuid::Uuid;

use crate::{
    access::{self, Role},
    config::AppConfig,
    error::ApiError,
    models::User,
    repository::RepositoryState,
};

/// Claims
///
/// Payload of the bearer token issued at login. Stateless: nothing is stored
/// server-side, a token dies at `exp`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (sub): the user's UUID.
    pub sub: Uuid,
    pub email: String,
    /// Issued At (iat), seconds since the epoch.
    pub iat: usize,
    /// Expiration Time (exp), seconds since the epoch.
    pub exp: usize,
}

/// issue_token
///
/// Signs an HS256 token for `user` valid for the configured lifetime.
pub fn issue_token(config: &AppConfig, user: &User) -> Result<String, ApiError> {
    let now = Utc::now().timestamp().max(0) as usize;
    let exp = usize::try_from(config.jwt_expires_in)
        .ok()
        .and_then(|ttl| now.checked_add(ttl))
        .ok_or_else(|| {
            ApiError::internal(format!(
                "token lifetime of {}s is out of range",
                config.jwt_expires_in
            ))
        })?;
    let claims = Claims {
        sub: user.id,
        email: user.email.clone(),
        iat: now,
        exp,
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| ApiError::internal(format!("failed to sign token: {e}")))
}

/// verify_token
///
/// Checks signature and expiry. Every failure (bad signature, malformed token,
/// expired) is reported the same way.
pub fn verify_token(secret: &str, token: &str) -> Result<Claims, ApiError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    validation.set_required_spec_claims(&["exp", "sub"]);

    decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map(|data| data.claims)
        .map_err(|e| {
            tracing::debug!("Rejected bearer token: {:?}", e.kind());
            ApiError::invalid_token()
        })
}

/// hash_password
///
/// Argon2id with a random salt. Runs on the blocking pool: hashing is
/// deliberately slow and would stall the async runtime.
pub async fn hash_password(password: &str) -> Result<String, ApiError> {
    let password = password.to_string();
    task::spawn_blocking(move || {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| ApiError::internal(format!("failed to hash password: {e}")))
    })
    .await
    .map_err(|e| ApiError::internal(format!("password hashing task failed: {e}")))?
}

/// verify_password
///
/// `Ok(false)` on mismatch and on a stored hash that cannot be parsed.
pub async fn verify_password(password: &str, password_hash: &str) -> Result<bool, ApiError> {
    let password = password.to_string();
    let password_hash = password_hash.to_string();
    task::spawn_blocking(move || match PasswordHash::new(&password_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            tracing::warn!("Stored password hash is not a valid PHC string: {}", e);
            false
        }
    })
    .await
    .map_err(|e| ApiError::internal(format!("password verification task failed: {e}")))
}

/// AuthUser
///
/// The resolved identity of an authenticated request: who is calling and the
/// single effective role they act with (`None` when no role is assigned).
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
    pub role: Option<Role>,
}

impl AuthUser {
    /// Runs the access decision for an operation with the given allow-list.
    pub fn require(&self, allowed: &[Role]) -> Result<Role, ApiError> {
        access::authorize(self.role, allowed).map_err(|denied| {
            tracing::warn!(user_id = %self.id, "Access denied: {}", denied);
            ApiError::from(denied)
        })
    }
}

impl From<&User> for AuthUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            role: user.effective_role(),
        }
    }
}

/// AuthUser Extractor Implementation
///
/// 1. Reuse an identity already resolved earlier in the same request.
/// 2. Extract the `Authorization: Bearer <token>` header.
/// 3. Verify the token signature and expiry.
/// 4. One repository lookup for the user and their role rows; a user deleted
///    after the token was issued is rejected.
///
/// Rejection: `ApiError::Unauthorized` (401) on any failure.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(resolved) = parts.extensions.get::<AuthUser>() {
            return Ok(resolved.clone());
        }

        let repo = RepositoryState::from_ref(state);
        let config = AppConfig::from_ref(state);

        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(ApiError::missing_token)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(ApiError::invalid_token)?;

        let claims = verify_token(&config.jwt_secret, token)?;

        let user = repo.get_user(claims.sub).await?.ok_or_else(|| {
            tracing::debug!(user_id = %claims.sub, "Token subject no longer exists");
            ApiError::invalid_token()
        })?;

        let resolved = AuthUser::from(&user);
        parts.extensions.insert(resolved.clone());
        Ok(resolved)
    }
}

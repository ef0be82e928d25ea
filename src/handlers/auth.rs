use axum::{Json, extract::State, http::StatusCode};

use crate::{
    AppState,
    auth::{AuthUser, hash_password, issue_token, verify_password},
    error::{ApiError, ErrorResponse},
    models::{ChangePasswordRequest, LoginRequest, LoginResponse, MeResponse, UserResponse, normalize_email},
    validation::ValidatedJson,
};

/// login
///
/// [Public Route] Exchanges email and password for a bearer token.
/// An unknown email and a wrong password get the same 401 answer.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token issued", body = LoginResponse),
        (status = 400, description = "Invalid payload", body = ErrorResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let email = normalize_email(&payload.email);

    let Some(credentials) = state.repo.find_credentials_by_email(&email).await? else {
        tracing::debug!("Login attempt for unknown email");
        return Err(ApiError::invalid_credentials());
    };

    if !verify_password(&payload.password, &credentials.password_hash).await? {
        tracing::debug!(user_id = %credentials.user.id, "Login attempt with wrong password");
        return Err(ApiError::invalid_credentials());
    }

    let token = issue_token(&state.config, &credentials.user)?;
    tracing::info!(user_id = %credentials.user.id, "User logged in");

    Ok(Json(LoginResponse {
        token,
        user: UserResponse::from(&credentials.user),
    }))
}

/// me
///
/// [Authenticated Route] The caller's own profile. Works for accounts without a role.
#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "auth",
    responses(
        (status = 200, description = "Current user", body = MeResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    )
)]
pub async fn me(
    auth: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<MeResponse>, ApiError> {
    let user = state
        .repo
        .get_user(auth.id)
        .await?
        .ok_or_else(ApiError::invalid_token)?;

    Ok(Json(MeResponse {
        user: UserResponse::from(&user),
    }))
}

/// change_password
///
/// [Authenticated Route] Replaces the caller's password after checking the current one.
#[utoipa::path(
    put,
    path = "/api/auth/password",
    tag = "auth",
    request_body = ChangePasswordRequest,
    responses(
        (status = 204, description = "Password changed"),
        (status = 400, description = "Invalid payload or wrong current password", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    )
)]
pub async fn change_password(
    auth: AuthUser,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<ChangePasswordRequest>,
) -> Result<StatusCode, ApiError> {
    let credentials = state
        .repo
        .get_credentials(auth.id)
        .await?
        .ok_or_else(ApiError::invalid_token)?;

    if !verify_password(&payload.current_password, &credentials.password_hash).await? {
        return Err(ApiError::PreconditionFailed(
            "Senha atual incorreta".to_string(),
        ));
    }

    let new_hash = hash_password(&payload.new_password).await?;
    if !state.repo.update_password(auth.id, new_hash).await? {
        return Err(ApiError::invalid_token());
    }

    tracing::info!(user_id = %auth.id, "Password changed");
    Ok(StatusCode::NO_CONTENT)
}

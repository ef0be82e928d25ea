use axum::{Json, extract::State, http::StatusCode};
use uuid::Uuid;

use crate::{
    AppState,
    access::USER_ADMINS,
    auth::{AuthUser, hash_password},
    error::{ApiError, ErrorResponse},
    models::{
        CreateUserRequest, NewUser, UpdateRoleRequest, UpdateUserRequest, UserChanges,
        UserResponse, normalize_email,
    },
    validation::{ApiPath, ValidatedJson},
};

const RESOURCE: &str = "Usuário";

/// list_users
///
/// [Admin Route] Every account with its effective role (`null` when none).
#[utoipa::path(
    get,
    path = "/api/users",
    tag = "users",
    responses(
        (status = 200, description = "Users", body = [UserResponse]),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Admins only", body = ErrorResponse)
    )
)]
pub async fn list_users(
    auth: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    auth.require(USER_ADMINS)?;

    let users = state.repo.list_users().await?;
    Ok(Json(users.iter().map(UserResponse::from).collect()))
}

/// create_user
///
/// [Admin Route] Provisions an account, optionally with a role.
/// A duplicate email is rejected with `PreconditionFailed`.
#[utoipa::path(
    post,
    path = "/api/users",
    tag = "users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "Created", body = UserResponse),
        (status = 400, description = "Invalid payload or email already registered", body = ErrorResponse),
        (status = 403, description = "Admins only", body = ErrorResponse)
    )
)]
pub async fn create_user(
    auth: AuthUser,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    auth.require(USER_ADMINS)?;

    let password_hash = hash_password(&payload.password).await?;
    let user = state
        .repo
        .create_user(NewUser {
            email: normalize_email(&payload.email),
            nome: payload.nome.trim().to_string(),
            password_hash,
            role: payload.role,
        })
        .await?;

    tracing::info!(actor = %auth.id, user_id = %user.id, role = ?payload.role, "User created");
    Ok((StatusCode::CREATED, Json(UserResponse::from(&user))))
}

/// update_user
///
/// [Admin Route] Updates name and email; the password only when one is sent.
#[utoipa::path(
    put,
    path = "/api/users/{id}",
    tag = "users",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Updated", body = UserResponse),
        (status = 400, description = "Invalid payload or email already registered", body = ErrorResponse),
        (status = 404, description = "Not found", body = ErrorResponse)
    )
)]
pub async fn update_user(
    auth: AuthUser,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateUserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    auth.require(USER_ADMINS)?;

    let password_hash = match &payload.password {
        Some(password) => Some(hash_password(password).await?),
        None => None,
    };

    let user = state
        .repo
        .update_user(
            id,
            UserChanges {
                email: normalize_email(&payload.email),
                nome: payload.nome.trim().to_string(),
                password_hash,
            },
        )
        .await?
        .ok_or_else(|| ApiError::not_found(RESOURCE))?;

    tracing::info!(actor = %auth.id, user_id = %id, "User updated");
    Ok(Json(UserResponse::from(&user)))
}

/// update_user_role
///
/// [Admin Route] Replaces every role row of the target with exactly one role.
/// An admin cannot change their own role.
#[utoipa::path(
    patch,
    path = "/api/users/{id}/role",
    tag = "users",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = UpdateRoleRequest,
    responses(
        (status = 200, description = "Role replaced", body = UserResponse),
        (status = 400, description = "Invalid role or own account", body = ErrorResponse),
        (status = 404, description = "Not found", body = ErrorResponse)
    )
)]
pub async fn update_user_role(
    auth: AuthUser,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateRoleRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    auth.require(USER_ADMINS)?;

    if id == auth.id {
        return Err(ApiError::PreconditionFailed(
            "Você não pode alterar seu próprio papel".to_string(),
        ));
    }

    let role = payload
        .role
        .ok_or_else(|| ApiError::field("role", "Papel é obrigatório"))?;

    let user = state
        .repo
        .set_user_role(id, role)
        .await?
        .ok_or_else(|| ApiError::not_found(RESOURCE))?;

    tracing::info!(actor = %auth.id, user_id = %id, role = %role, "User role replaced");
    Ok(Json(UserResponse::from(&user)))
}

/// delete_user
///
/// [Admin Route] Hard delete. An admin cannot delete their own account.
#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    tag = "users",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 400, description = "Own account", body = ErrorResponse),
        (status = 404, description = "Not found", body = ErrorResponse)
    )
)]
pub async fn delete_user(
    auth: AuthUser,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, ApiError> {
    auth.require(USER_ADMINS)?;

    if id == auth.id {
        return Err(ApiError::PreconditionFailed(
            "Você não pode excluir sua própria conta".to_string(),
        ));
    }

    if !state.repo.delete_user(id).await? {
        return Err(ApiError::not_found(RESOURCE));
    }
    tracing::info!(actor = %auth.id, user_id = %id, "User deleted");
    Ok(StatusCode::NO_CONTENT)
}

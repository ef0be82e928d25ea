use axum::{Json, extract::State, http::StatusCode};
use uuid::Uuid;

use crate::{
    AppState,
    access::CONTENT_EDITORS,
    auth::AuthUser,
    error::{ApiError, ErrorResponse},
    models::{ListFilter, Sermon, SermonInput},
    validation::{ApiPath, ApiQuery, ValidatedJson},
};

const RESOURCE: &str = "Sermão";

/// list_sermons
///
/// [Public Route] All sermons by date, newest first unless `?order=asc`.
#[utoipa::path(
    get,
    path = "/api/sermoes",
    tag = "sermoes",
    params(ListFilter),
    responses((status = 200, description = "Sermons", body = [Sermon]))
)]
pub async fn list_sermons(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<ListFilter>,
) -> Result<Json<Vec<Sermon>>, ApiError> {
    Ok(Json(state.repo.list_sermons(filter).await?))
}

#[utoipa::path(
    get,
    path = "/api/sermoes/{id}",
    tag = "sermoes",
    params(("id" = Uuid, Path, description = "Sermon ID")),
    responses(
        (status = 200, description = "Found", body = Sermon),
        (status = 404, description = "Not found", body = ErrorResponse)
    )
)]
pub async fn get_sermon(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Sermon>, ApiError> {
    state
        .repo
        .get_sermon(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(RESOURCE))
}

/// create_sermon
///
/// [Editor Route] Allow-list: admin, editor.
#[utoipa::path(
    post,
    path = "/api/sermoes",
    tag = "sermoes",
    request_body = SermonInput,
    responses(
        (status = 201, description = "Created", body = Sermon),
        (status = 400, description = "Invalid payload", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Role not allowed", body = ErrorResponse)
    )
)]
pub async fn create_sermon(
    auth: AuthUser,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<SermonInput>,
) -> Result<(StatusCode, Json<Sermon>), ApiError> {
    auth.require(CONTENT_EDITORS)?;

    let sermon = state.repo.create_sermon(&payload, auth.id).await?;
    tracing::info!(actor = %auth.id, sermon_id = %sermon.id, "Sermon created");
    Ok((StatusCode::CREATED, Json(sermon)))
}

/// update_sermon
///
/// [Editor Route] Full replacement of the sermon's fields.
#[utoipa::path(
    put,
    path = "/api/sermoes/{id}",
    tag = "sermoes",
    params(("id" = Uuid, Path, description = "Sermon ID")),
    request_body = SermonInput,
    responses(
        (status = 200, description = "Updated", body = Sermon),
        (status = 400, description = "Invalid payload", body = ErrorResponse),
        (status = 404, description = "Not found", body = ErrorResponse)
    )
)]
pub async fn update_sermon(
    auth: AuthUser,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ValidatedJson(payload): ValidatedJson<SermonInput>,
) -> Result<Json<Sermon>, ApiError> {
    auth.require(CONTENT_EDITORS)?;

    let sermon = state
        .repo
        .update_sermon(id, &payload, auth.id)
        .await?
        .ok_or_else(|| ApiError::not_found(RESOURCE))?;
    tracing::info!(actor = %auth.id, sermon_id = %id, "Sermon updated");
    Ok(Json(sermon))
}

#[utoipa::path(
    delete,
    path = "/api/sermoes/{id}",
    tag = "sermoes",
    params(("id" = Uuid, Path, description = "Sermon ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not found", body = ErrorResponse)
    )
)]
pub async fn delete_sermon(
    auth: AuthUser,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, ApiError> {
    auth.require(CONTENT_EDITORS)?;

    if !state.repo.delete_sermon(id).await? {
        return Err(ApiError::not_found(RESOURCE));
    }
    tracing::info!(actor = %auth.id, sermon_id = %id, "Sermon deleted");
    Ok(StatusCode::NO_CONTENT)
}

use axum::{Json, extract::State, http::StatusCode};
use uuid::Uuid;

use crate::{
    AppState,
    access::CONTENT_EDITORS,
    auth::AuthUser,
    error::{ApiError, ErrorResponse},
    models::{ListFilter, Pastor, PastorInput},
    validation::{ApiPath, ApiQuery, ValidatedJson},
};

const RESOURCE: &str = "Pastor";

/// list_pastores
///
/// [Public Route] Pastors in display order (`ordem`).
#[utoipa::path(
    get,
    path = "/api/pastores",
    tag = "pastores",
    params(ListFilter),
    responses((status = 200, description = "Pastors", body = [Pastor]))
)]
pub async fn list_pastores(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<ListFilter>,
) -> Result<Json<Vec<Pastor>>, ApiError> {
    Ok(Json(state.repo.list_pastores(filter).await?))
}

#[utoipa::path(
    get,
    path = "/api/pastores/{id}",
    tag = "pastores",
    params(("id" = Uuid, Path, description = "Pastor ID")),
    responses(
        (status = 200, description = "Found", body = Pastor),
        (status = 404, description = "Not found", body = ErrorResponse)
    )
)]
pub async fn get_pastor(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Pastor>, ApiError> {
    state
        .repo
        .get_pastor(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(RESOURCE))
}

#[utoipa::path(
    post,
    path = "/api/pastores",
    tag = "pastores",
    request_body = PastorInput,
    responses(
        (status = 201, description = "Created", body = Pastor),
        (status = 400, description = "Invalid payload", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Role not allowed", body = ErrorResponse)
    )
)]
pub async fn create_pastor(
    auth: AuthUser,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<PastorInput>,
) -> Result<(StatusCode, Json<Pastor>), ApiError> {
    auth.require(CONTENT_EDITORS)?;

    let pastor = state.repo.create_pastor(&payload, auth.id).await?;
    tracing::info!(actor = %auth.id, pastor_id = %pastor.id, "Pastor created");
    Ok((StatusCode::CREATED, Json(pastor)))
}

#[utoipa::path(
    put,
    path = "/api/pastores/{id}",
    tag = "pastores",
    params(("id" = Uuid, Path, description = "Pastor ID")),
    request_body = PastorInput,
    responses(
        (status = 200, description = "Updated", body = Pastor),
        (status = 400, description = "Invalid payload", body = ErrorResponse),
        (status = 404, description = "Not found", body = ErrorResponse)
    )
)]
pub async fn update_pastor(
    auth: AuthUser,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ValidatedJson(payload): ValidatedJson<PastorInput>,
) -> Result<Json<Pastor>, ApiError> {
    auth.require(CONTENT_EDITORS)?;

    let pastor = state
        .repo
        .update_pastor(id, &payload, auth.id)
        .await?
        .ok_or_else(|| ApiError::not_found(RESOURCE))?;
    tracing::info!(actor = %auth.id, pastor_id = %id, "Pastor updated");
    Ok(Json(pastor))
}

#[utoipa::path(
    delete,
    path = "/api/pastores/{id}",
    tag = "pastores",
    params(("id" = Uuid, Path, description = "Pastor ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not found", body = ErrorResponse)
    )
)]
pub async fn delete_pastor(
    auth: AuthUser,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, ApiError> {
    auth.require(CONTENT_EDITORS)?;

    if !state.repo.delete_pastor(id).await? {
        return Err(ApiError::not_found(RESOURCE));
    }
    tracing::info!(actor = %auth.id, pastor_id = %id, "Pastor deleted");
    Ok(StatusCode::NO_CONTENT)
}

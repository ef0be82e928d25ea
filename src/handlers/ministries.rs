use axum::{Json, extract::State, http::StatusCode};
use uuid::Uuid;

use crate::{
    AppState,
    access::CONTENT_EDITORS,
    auth::AuthUser,
    error::{ApiError, ErrorResponse},
    models::{ListFilter, Ministerio, MinisterioInput},
    validation::{ApiPath, ApiQuery, ValidatedJson},
};

const RESOURCE: &str = "Ministério";

/// list_ministerios
///
/// [Public Route] Ministries by name, each with its ordered leader list.
#[utoipa::path(
    get,
    path = "/api/ministerios",
    tag = "ministerios",
    params(ListFilter),
    responses((status = 200, description = "Ministries", body = [Ministerio]))
)]
pub async fn list_ministerios(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<ListFilter>,
) -> Result<Json<Vec<Ministerio>>, ApiError> {
    Ok(Json(state.repo.list_ministerios(filter).await?))
}

#[utoipa::path(
    get,
    path = "/api/ministerios/{id}",
    tag = "ministerios",
    params(("id" = Uuid, Path, description = "Ministry ID")),
    responses(
        (status = 200, description = "Found", body = Ministerio),
        (status = 404, description = "Not found", body = ErrorResponse)
    )
)]
pub async fn get_ministerio(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Ministerio>, ApiError> {
    state
        .repo
        .get_ministerio(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(RESOURCE))
}

/// create_ministerio
///
/// [Editor Route] Creates the ministry and its leaders as one unit. Leader
/// positions (`ordem`) follow the order of the `lideres` array.
#[utoipa::path(
    post,
    path = "/api/ministerios",
    tag = "ministerios",
    request_body = MinisterioInput,
    responses(
        (status = 201, description = "Created", body = Ministerio),
        (status = 400, description = "Invalid payload", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Role not allowed", body = ErrorResponse)
    )
)]
pub async fn create_ministerio(
    auth: AuthUser,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<MinisterioInput>,
) -> Result<(StatusCode, Json<Ministerio>), ApiError> {
    auth.require(CONTENT_EDITORS)?;

    let ministerio = state.repo.create_ministerio(&payload, auth.id).await?;
    tracing::info!(
        actor = %auth.id,
        ministerio_id = %ministerio.id,
        lideres = ministerio.lideres.len(),
        "Ministry created"
    );
    Ok((StatusCode::CREATED, Json(ministerio)))
}

/// update_ministerio
///
/// [Editor Route] Replaces the ministry fields and its entire leader list.
/// Leaders missing from the payload are removed; nothing is merged.
#[utoipa::path(
    put,
    path = "/api/ministerios/{id}",
    tag = "ministerios",
    params(("id" = Uuid, Path, description = "Ministry ID")),
    request_body = MinisterioInput,
    responses(
        (status = 200, description = "Updated", body = Ministerio),
        (status = 400, description = "Invalid payload", body = ErrorResponse),
        (status = 404, description = "Not found", body = ErrorResponse)
    )
)]
pub async fn update_ministerio(
    auth: AuthUser,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ValidatedJson(payload): ValidatedJson<MinisterioInput>,
) -> Result<Json<Ministerio>, ApiError> {
    auth.require(CONTENT_EDITORS)?;

    let ministerio = state
        .repo
        .update_ministerio(id, &payload, auth.id)
        .await?
        .ok_or_else(|| ApiError::not_found(RESOURCE))?;
    tracing::info!(
        actor = %auth.id,
        ministerio_id = %id,
        lideres = ministerio.lideres.len(),
        "Ministry updated"
    );
    Ok(Json(ministerio))
}

/// delete_ministerio
///
/// [Editor Route] Leaders are removed together with the ministry.
#[utoipa::path(
    delete,
    path = "/api/ministerios/{id}",
    tag = "ministerios",
    params(("id" = Uuid, Path, description = "Ministry ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not found", body = ErrorResponse)
    )
)]
pub async fn delete_ministerio(
    auth: AuthUser,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, ApiError> {
    auth.require(CONTENT_EDITORS)?;

    if !state.repo.delete_ministerio(id).await? {
        return Err(ApiError::not_found(RESOURCE));
    }
    tracing::info!(actor = %auth.id, ministerio_id = %id, "Ministry deleted");
    Ok(StatusCode::NO_CONTENT)
}

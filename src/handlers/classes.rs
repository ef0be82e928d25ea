use axum::{Json, extract::State, http::StatusCode};
use uuid::Uuid;

use crate::{
    AppState,
    access::CONTENT_EDITORS,
    auth::AuthUser,
    error::{ApiError, ErrorResponse},
    models::{Aula, AulaInput, ListFilter},
    validation::{ApiPath, ApiQuery, ValidatedJson},
};

fn not_found() -> ApiError {
    ApiError::NotFound("Aula não encontrada".to_string())
}

/// list_aulas
///
/// [Public Route] Bible classes by date, newest first unless `?order=asc`.
#[utoipa::path(
    get,
    path = "/api/aulas",
    tag = "aulas",
    params(ListFilter),
    responses((status = 200, description = "Classes", body = [Aula]))
)]
pub async fn list_aulas(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<ListFilter>,
) -> Result<Json<Vec<Aula>>, ApiError> {
    Ok(Json(state.repo.list_aulas(filter).await?))
}

#[utoipa::path(
    get,
    path = "/api/aulas/{id}",
    tag = "aulas",
    params(("id" = Uuid, Path, description = "Class ID")),
    responses(
        (status = 200, description = "Found", body = Aula),
        (status = 404, description = "Not found", body = ErrorResponse)
    )
)]
pub async fn get_aula(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Aula>, ApiError> {
    state.repo.get_aula(id).await?.map(Json).ok_or_else(not_found)
}

#[utoipa::path(
    post,
    path = "/api/aulas",
    tag = "aulas",
    request_body = AulaInput,
    responses(
        (status = 201, description = "Created", body = Aula),
        (status = 400, description = "Invalid payload", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Role not allowed", body = ErrorResponse)
    )
)]
pub async fn create_aula(
    auth: AuthUser,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<AulaInput>,
) -> Result<(StatusCode, Json<Aula>), ApiError> {
    auth.require(CONTENT_EDITORS)?;

    let aula = state.repo.create_aula(&payload, auth.id).await?;
    tracing::info!(actor = %auth.id, aula_id = %aula.id, "Class created");
    Ok((StatusCode::CREATED, Json(aula)))
}

#[utoipa::path(
    put,
    path = "/api/aulas/{id}",
    tag = "aulas",
    params(("id" = Uuid, Path, description = "Class ID")),
    request_body = AulaInput,
    responses(
        (status = 200, description = "Updated", body = Aula),
        (status = 400, description = "Invalid payload", body = ErrorResponse),
        (status = 404, description = "Not found", body = ErrorResponse)
    )
)]
pub async fn update_aula(
    auth: AuthUser,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ValidatedJson(payload): ValidatedJson<AulaInput>,
) -> Result<Json<Aula>, ApiError> {
    auth.require(CONTENT_EDITORS)?;

    let aula = state
        .repo
        .update_aula(id, &payload, auth.id)
        .await?
        .ok_or_else(not_found)?;
    tracing::info!(actor = %auth.id, aula_id = %id, "Class updated");
    Ok(Json(aula))
}

#[utoipa::path(
    delete,
    path = "/api/aulas/{id}",
    tag = "aulas",
    params(("id" = Uuid, Path, description = "Class ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not found", body = ErrorResponse)
    )
)]
pub async fn delete_aula(
    auth: AuthUser,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, ApiError> {
    auth.require(CONTENT_EDITORS)?;

    if !state.repo.delete_aula(id).await? {
        return Err(not_found());
    }
    tracing::info!(actor = %auth.id, aula_id = %id, "Class deleted");
    Ok(StatusCode::NO_CONTENT)
}

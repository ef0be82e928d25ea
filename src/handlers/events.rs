use axum::{Json, extract::State, http::StatusCode};
use uuid::Uuid;

use crate::{
    AppState,
    access::CONTENT_EDITORS,
    auth::AuthUser,
    error::{ApiError, ErrorResponse},
    models::{Evento, EventoInput, ListFilter},
    validation::{ApiPath, ApiQuery, ValidatedJson},
};

const RESOURCE: &str = "Evento";

/// list_eventos
///
/// [Public Route] Events in calendar order (soonest first by default).
/// The site's agenda calls this with `?ativo=true`.
#[utoipa::path(
    get,
    path = "/api/eventos",
    tag = "eventos",
    params(ListFilter),
    responses((status = 200, description = "Events", body = [Evento]))
)]
pub async fn list_eventos(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<ListFilter>,
) -> Result<Json<Vec<Evento>>, ApiError> {
    Ok(Json(state.repo.list_eventos(filter).await?))
}

#[utoipa::path(
    get,
    path = "/api/eventos/{id}",
    tag = "eventos",
    params(("id" = Uuid, Path, description = "Event ID")),
    responses(
        (status = 200, description = "Found", body = Evento),
        (status = 404, description = "Not found", body = ErrorResponse)
    )
)]
pub async fn get_evento(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Evento>, ApiError> {
    state
        .repo
        .get_evento(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(RESOURCE))
}

#[utoipa::path(
    post,
    path = "/api/eventos",
    tag = "eventos",
    request_body = EventoInput,
    responses(
        (status = 201, description = "Created", body = Evento),
        (status = 400, description = "Invalid payload", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Role not allowed", body = ErrorResponse)
    )
)]
pub async fn create_evento(
    auth: AuthUser,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<EventoInput>,
) -> Result<(StatusCode, Json<Evento>), ApiError> {
    auth.require(CONTENT_EDITORS)?;

    let evento = state.repo.create_evento(&payload, auth.id).await?;
    tracing::info!(actor = %auth.id, evento_id = %evento.id, "Event created");
    Ok((StatusCode::CREATED, Json(evento)))
}

#[utoipa::path(
    put,
    path = "/api/eventos/{id}",
    tag = "eventos",
    params(("id" = Uuid, Path, description = "Event ID")),
    request_body = EventoInput,
    responses(
        (status = 200, description = "Updated", body = Evento),
        (status = 400, description = "Invalid payload", body = ErrorResponse),
        (status = 404, description = "Not found", body = ErrorResponse)
    )
)]
pub async fn update_evento(
    auth: AuthUser,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ValidatedJson(payload): ValidatedJson<EventoInput>,
) -> Result<Json<Evento>, ApiError> {
    auth.require(CONTENT_EDITORS)?;

    let evento = state
        .repo
        .update_evento(id, &payload, auth.id)
        .await?
        .ok_or_else(|| ApiError::not_found(RESOURCE))?;
    tracing::info!(actor = %auth.id, evento_id = %id, "Event updated");
    Ok(Json(evento))
}

#[utoipa::path(
    delete,
    path = "/api/eventos/{id}",
    tag = "eventos",
    params(("id" = Uuid, Path, description = "Event ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not found", body = ErrorResponse)
    )
)]
pub async fn delete_evento(
    auth: AuthUser,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, ApiError> {
    auth.require(CONTENT_EDITORS)?;

    if !state.repo.delete_evento(id).await? {
        return Err(ApiError::not_found(RESOURCE));
    }
    tracing::info!(actor = %auth.id, evento_id = %id, "Event deleted");
    Ok(StatusCode::NO_CONTENT)
}

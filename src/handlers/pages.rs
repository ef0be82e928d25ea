use axum::{Json, extract::State, http::StatusCode};

use crate::{
    AppState,
    access::CONTENT_EDITORS,
    auth::AuthUser,
    error::{ApiError, ErrorResponse},
    models::{Conteudo, ConteudoInput},
    validation::{ApiPath, ValidatedJson, is_valid_slug},
};

const RESOURCE: &str = "Conteúdo";

/// list_conteudos
///
/// [Public Route] Every page content block, ordered by key.
#[utoipa::path(
    get,
    path = "/api/conteudos",
    tag = "conteudos",
    responses((status = 200, description = "Page contents", body = [Conteudo]))
)]
pub async fn list_conteudos(State(state): State<AppState>) -> Result<Json<Vec<Conteudo>>, ApiError> {
    Ok(Json(state.repo.list_conteudos().await?))
}

#[utoipa::path(
    get,
    path = "/api/conteudos/{chave}",
    tag = "conteudos",
    params(("chave" = String, Path, description = "Content key, e.g. `sobre`")),
    responses(
        (status = 200, description = "Found", body = Conteudo),
        (status = 404, description = "Not found", body = ErrorResponse)
    )
)]
pub async fn get_conteudo(
    State(state): State<AppState>,
    ApiPath(chave): ApiPath<String>,
) -> Result<Json<Conteudo>, ApiError> {
    state
        .repo
        .get_conteudo(&chave)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(RESOURCE))
}

/// upsert_conteudo
///
/// [Editor Route] Creates the block under `chave` or replaces its text.
/// Keys are lowercase slugs (`a-z`, `0-9`, `-`).
#[utoipa::path(
    put,
    path = "/api/conteudos/{chave}",
    tag = "conteudos",
    params(("chave" = String, Path, description = "Content key, e.g. `sobre`")),
    request_body = ConteudoInput,
    responses(
        (status = 200, description = "Saved", body = Conteudo),
        (status = 400, description = "Invalid key or payload", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Role not allowed", body = ErrorResponse)
    )
)]
pub async fn upsert_conteudo(
    auth: AuthUser,
    State(state): State<AppState>,
    ApiPath(chave): ApiPath<String>,
    ValidatedJson(payload): ValidatedJson<ConteudoInput>,
) -> Result<Json<Conteudo>, ApiError> {
    auth.require(CONTENT_EDITORS)?;

    if !is_valid_slug(&chave) {
        return Err(ApiError::field(
            "chave",
            "Chave inválida (use letras minúsculas, números e hífens)",
        ));
    }

    let conteudo = state.repo.upsert_conteudo(&chave, &payload, auth.id).await?;
    tracing::info!(actor = %auth.id, chave = %chave, "Page content saved");
    Ok(Json(conteudo))
}

#[utoipa::path(
    delete,
    path = "/api/conteudos/{chave}",
    tag = "conteudos",
    params(("chave" = String, Path, description = "Content key")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not found", body = ErrorResponse)
    )
)]
pub async fn delete_conteudo(
    auth: AuthUser,
    State(state): State<AppState>,
    ApiPath(chave): ApiPath<String>,
) -> Result<StatusCode, ApiError> {
    auth.require(CONTENT_EDITORS)?;

    if !state.repo.delete_conteudo(&chave).await? {
        return Err(ApiError::not_found(RESOURCE));
    }
    tracing::info!(actor = %auth.id, chave = %chave, "Page content deleted");
    Ok(StatusCode::NO_CONTENT)
}

use axum::{
    Json,
    extract::{Multipart, State, multipart::MultipartError},
    http::StatusCode,
};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    AppState,
    access::CONTENT_EDITORS,
    auth::AuthUser,
    error::{ApiError, ErrorResponse},
    models::UploadResponse,
};

/// Multipart form accepted by `POST /api/upload` (documentation only).
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct UploadForm {
    #[schema(value_type = String, format = Binary)]
    file: Vec<u8>,
}

/// Image types accepted for upload, with the extension used for the stored name.
pub fn extension_for(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/jpeg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        "image/gif" => Some("gif"),
        _ => None,
    }
}

fn too_large(limit: usize) -> ApiError {
    ApiError::field(
        "file",
        format!("Arquivo excede o tamanho máximo de {} bytes", limit),
    )
}

fn multipart_error(err: MultipartError, limit: usize) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        too_large(limit)
    } else {
        ApiError::field("file", err.body_text())
    }
}

/// upload_image
///
/// [Editor Route] Stores one image sent as the multipart field `file`.
///
/// The stored name is a fresh UUID plus an extension derived from the declared
/// MIME type, so client file names never reach the storage key.
#[utoipa::path(
    post,
    path = "/api/upload",
    tag = "upload",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Stored", body = UploadResponse),
        (status = 400, description = "Missing file, unsupported type or too large", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Role not allowed", body = ErrorResponse)
    )
)]
pub async fn upload_image(
    auth: AuthUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>), ApiError> {
    auth.require(CONTENT_EDITORS)?;
    let limit = state.config.max_upload_size;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, limit))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let content_type = field.content_type().unwrap_or_default().to_string();
        let extension = extension_for(&content_type).ok_or_else(|| {
            ApiError::field(
                "file",
                "Tipo de arquivo não permitido (use JPEG, PNG, WebP ou GIF)",
            )
        })?;
        let original_name = field.file_name().unwrap_or("arquivo").to_string();

        let bytes = field.bytes().await.map_err(|e| multipart_error(e, limit))?;
        if bytes.is_empty() {
            return Err(ApiError::field("file", "Arquivo vazio"));
        }
        if bytes.len() > limit {
            return Err(too_large(limit));
        }

        let size = bytes.len() as u64;
        let filename = format!("{}.{}", Uuid::new_v4(), extension);
        let url = state
            .storage
            .put_object(&filename, &content_type, bytes)
            .await
            .map_err(|e| ApiError::internal(format!("failed to store upload: {e}")))?;

        tracing::info!(actor = %auth.id, filename = %filename, size, "Image uploaded");
        return Ok((
            StatusCode::CREATED,
            Json(UploadResponse {
                url,
                filename,
                original_name,
                size,
            }),
        ));
    }

    Err(ApiError::field("file", "Arquivo é obrigatório"))
}

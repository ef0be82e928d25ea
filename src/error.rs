use axum::{
    Json,
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;

use crate::{
    access::AccessDenied,
    config::{AppConfig, Env},
};

/// Generic text returned for unexpected failures outside the local environment.
pub const INTERNAL_ERROR_MESSAGE: &str = "Erro interno do servidor";

/// FieldError
///
/// One entry of the `details` array of a validation failure. `path` is
/// machine-readable (`titulo`, `lideres[1].nome`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct FieldError {
    pub path: String,
    pub message: String,
}

impl FieldError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// ErrorResponse
///
/// The uniform error body: `{error, message, details?}`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<FieldError>>,
}

/// ApiError
///
/// Every failure a handler can report. Each variant maps to one HTTP status and
/// one `error` kind in the response body.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Dados inválidos")]
    Validation(Vec<FieldError>),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    PreconditionFailed(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::PreconditionFailed(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "ValidationError",
            ApiError::Unauthorized(_) => "Unauthorized",
            ApiError::Forbidden(_) => "Forbidden",
            ApiError::NotFound(_) => "NotFound",
            ApiError::PreconditionFailed(_) => "PreconditionFailed",
            ApiError::Internal(_) => "InternalServerError",
        }
    }

    pub fn field(path: impl Into<String>, message: impl Into<String>) -> Self {
        ApiError::Validation(vec![FieldError::new(path, message)])
    }

    /// Same answer for an unknown email and a wrong password.
    pub fn invalid_credentials() -> Self {
        ApiError::Unauthorized("Credenciais inválidas".to_string())
    }

    pub fn missing_token() -> Self {
        ApiError::Unauthorized("Token não fornecido".to_string())
    }

    pub fn invalid_token() -> Self {
        ApiError::Unauthorized("Token inválido ou expirado".to_string())
    }

    pub fn not_found(resource: &str) -> Self {
        ApiError::NotFound(format!("{resource} não encontrado"))
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        ApiError::Internal(msg.into())
    }
}

impl From<AccessDenied> for ApiError {
    fn from(denied: AccessDenied) -> Self {
        match denied {
            AccessDenied::Unauthenticated => {
                ApiError::Unauthorized("Usuário sem papel atribuído".to_string())
            }
            AccessDenied::Forbidden(_) => ApiError::Forbidden("Acesso negado".to_string()),
        }
    }
}

/// Carries the real text of an internal error on the response so
/// [`expose_internal_errors`] can surface it in the local environment.
#[derive(Debug, Clone)]
pub struct InternalErrorDetail(pub String);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let kind = self.kind().to_string();

        match self {
            ApiError::Validation(details) => {
                let body = ErrorResponse {
                    error: kind,
                    message: "Dados inválidos".to_string(),
                    details: Some(details),
                };
                (status, Json(body)).into_response()
            }
            ApiError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                let body = ErrorResponse {
                    error: kind,
                    message: INTERNAL_ERROR_MESSAGE.to_string(),
                    details: None,
                };
                let mut response = (status, Json(body)).into_response();
                response
                    .extensions_mut()
                    .insert(InternalErrorDetail(detail));
                response
            }
            ApiError::Unauthorized(message)
            | ApiError::Forbidden(message)
            | ApiError::NotFound(message)
            | ApiError::PreconditionFailed(message) => {
                let body = ErrorResponse {
                    error: kind,
                    message,
                    details: None,
                };
                (status, Json(body)).into_response()
            }
        }
    }
}

/// expose_internal_errors
///
/// Response middleware: in `Env::Local` the generic 500 message is replaced by
/// the underlying error text. Other environments keep the generic body.
pub async fn expose_internal_errors(
    State(config): State<AppConfig>,
    request: Request,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;
    let detail = response.extensions_mut().remove::<InternalErrorDetail>();

    match detail {
        Some(InternalErrorDetail(message)) if config.env == Env::Local => {
            let body = ErrorResponse {
                error: "InternalServerError".to_string(),
                message,
                details: None,
            };
            (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
        }
        _ => response,
    }
}

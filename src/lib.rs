use axum::{
    Router,
    extract::{FromRef, Request},
    http::{HeaderName, HeaderValue},
    middleware::{self, Next},
    response::Response,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    services::ServeDir,
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

pub mod access;
pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod storage;
pub mod validation;

// Routing segregated by required access (public, authenticated, editor, admin).
pub mod routes;
use routes::{admin, authenticated, editor, public};

use access::{CONTENT_EDITORS, USER_ADMINS};
use auth::AuthUser;
use error::ApiError;

// --- Public Re-exports ---

pub use config::AppConfig;
pub use repository::{PostgresRepository, RepositoryState};
pub use storage::{LocalDiskStorage, MockStorageService, S3StorageClient, StorageState};

/// ApiDoc
///
/// OpenAPI document for every handler and wire type, served at
/// `/api-docs/openapi.json` and browsable at `/swagger-ui`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health,
        handlers::auth::login, handlers::auth::me, handlers::auth::change_password,
        handlers::sermons::list_sermons, handlers::sermons::get_sermon,
        handlers::sermons::create_sermon, handlers::sermons::update_sermon,
        handlers::sermons::delete_sermon,
        handlers::classes::list_aulas, handlers::classes::get_aula,
        handlers::classes::create_aula, handlers::classes::update_aula,
        handlers::classes::delete_aula,
        handlers::events::list_eventos, handlers::events::get_evento,
        handlers::events::create_evento, handlers::events::update_evento,
        handlers::events::delete_evento,
        handlers::pastors::list_pastores, handlers::pastors::get_pastor,
        handlers::pastors::create_pastor, handlers::pastors::update_pastor,
        handlers::pastors::delete_pastor,
        handlers::ministries::list_ministerios, handlers::ministries::get_ministerio,
        handlers::ministries::create_ministerio, handlers::ministries::update_ministerio,
        handlers::ministries::delete_ministerio,
        handlers::pages::list_conteudos, handlers::pages::get_conteudo,
        handlers::pages::upsert_conteudo, handlers::pages::delete_conteudo,
        handlers::users::list_users, handlers::users::create_user,
        handlers::users::update_user, handlers::users::update_user_role,
        handlers::users::delete_user,
        handlers::upload::upload_image,
    ),
    components(
        schemas(
            access::Role, error::ErrorResponse, error::FieldError,
            models::UserResponse, models::LoginRequest, models::LoginResponse, models::MeResponse,
            models::ChangePasswordRequest, models::CreateUserRequest, models::UpdateUserRequest,
            models::UpdateRoleRequest, models::SortOrder,
            models::Sermon, models::SermonInput, models::Aula, models::AulaInput,
            models::Evento, models::EventoInput, models::Pastor, models::PastorInput,
            models::Ministerio, models::MinisterioInput, models::Lider, models::LiderInput,
            models::Conteudo, models::ConteudoInput, models::UploadResponse,
            handlers::upload::UploadForm,
        )
    ),
    tags(
        (name = "igreja-api", description = "Church website content API")
    )
)]
pub struct ApiDoc;

/// AppState
///
/// The single shared container for the services every handler needs. Built once
/// in `main` (or by a test) and cloned per request.
#[derive(Clone)]
pub struct AppState {
    /// Persistence layer.
    pub repo: RepositoryState,
    /// Upload backend (local disk, S3/MinIO or mock).
    pub storage: StorageState,
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for StorageState {
    fn from_ref(app_state: &AppState) -> StorageState {
        app_state.storage.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// auth_middleware
///
/// Rejects the request with 401 unless the `AuthUser` extractor resolves a
/// caller. The resolved identity stays in the request extensions, so the
/// handler's own `AuthUser` does not hit the repository again.
async fn auth_middleware(_auth_user: AuthUser, request: Request, next: Next) -> Response {
    next.run(request).await
}

/// Gate for content mutations: 401 without a role, 403 for a role off the list.
async fn editor_middleware(
    auth_user: AuthUser,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    auth_user.require(CONTENT_EDITORS)?;
    Ok(next.run(request).await)
}

async fn admin_middleware(
    auth_user: AuthUser,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    auth_user.require(USER_ADMINS)?;
    Ok(next.run(request).await)
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    match config.cors_origin.as_deref().map(HeaderValue::from_str) {
        Some(Ok(origin)) => cors.allow_origin(origin),
        Some(Err(e)) => {
            tracing::warn!("CORS_ORIGIN is not a valid header value ({}), allowing any origin", e);
            cors.allow_origin(Any)
        }
        None => cors.allow_origin(Any),
    }
}

/// create_router
///
/// Assembles every route under `/api`, applies the access layers per route
/// group, the observability stack and CORS, and registers the shared state.
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config);
    let x_request_id = HeaderName::from_static("x-request-id");

    let api = Router::new()
        .merge(public::public_routes())
        .merge(
            authenticated::authenticated_routes()
                .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware)),
        )
        .merge(
            editor::editor_routes(state.config.max_upload_size)
                .route_layer(middleware::from_fn_with_state(state.clone(), editor_middleware)),
        )
        .merge(
            admin::admin_routes()
                .route_layer(middleware::from_fn_with_state(state.clone(), admin_middleware)),
        );

    let mut router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest("/api", api)
        .fallback(|| async { ApiError::NotFound("Rota não encontrada".to_string()) });

    // Uploaded files are only served by this process when they live on local disk.
    if let config::StorageConfig::Local { upload_dir } = &state.config.storage {
        router = router.nest_service("/uploads", ServeDir::new(upload_dir));
    }

    let config = state.config.clone();

    router
        .with_state(state)
        .layer(middleware::from_fn_with_state(
            config,
            error::expose_internal_errors,
        ))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Builds the `http_request` span for `TraceLayer`, tagged with the
/// `x-request-id` set by `SetRequestIdLayer` so every log line of a request
/// can be correlated.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}

/// ensure_bootstrap_admin
///
/// Creates the configured admin account unless its email is already
/// registered. Returns whether an account was created. An existing account is
/// left untouched, including its password and roles.
pub async fn ensure_bootstrap_admin(
    repo: &RepositoryState,
    admin: &config::BootstrapAdmin,
) -> Result<bool, ApiError> {
    let email = models::normalize_email(&admin.email);
    if repo.find_credentials_by_email(&email).await?.is_some() {
        tracing::debug!("Bootstrap admin already registered");
        return Ok(false);
    }

    let password_hash = auth::hash_password(&admin.password).await?;
    let user = repo
        .create_user(models::NewUser {
            email,
            nome: admin.nome.clone(),
            password_hash,
            role: Some(access::Role::Admin),
        })
        .await?;

    tracing::info!(user_id = %user.id, "Bootstrap admin account created");
    Ok(true)
}

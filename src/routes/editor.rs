use crate::{AppState, handlers};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{post, put},
};

// Multipart framing (boundaries, part headers) on top of the file itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Editor Router Module
///
/// Create, update and delete for every content resource, plus image uploads.
/// Allow-list: admin, editor.
pub fn editor_routes(max_upload_size: usize) -> Router<AppState> {
    Router::new()
        .route("/sermoes", post(handlers::sermons::create_sermon))
        .route(
            "/sermoes/{id}",
            put(handlers::sermons::update_sermon).delete(handlers::sermons::delete_sermon),
        )
        .route("/aulas", post(handlers::classes::create_aula))
        .route(
            "/aulas/{id}",
            put(handlers::classes::update_aula).delete(handlers::classes::delete_aula),
        )
        .route("/eventos", post(handlers::events::create_evento))
        .route(
            "/eventos/{id}",
            put(handlers::events::update_evento).delete(handlers::events::delete_evento),
        )
        .route("/pastores", post(handlers::pastors::create_pastor))
        .route(
            "/pastores/{id}",
            put(handlers::pastors::update_pastor).delete(handlers::pastors::delete_pastor),
        )
        .route("/ministerios", post(handlers::ministries::create_ministerio))
        // PUT replaces the leader list as a whole.
        .route(
            "/ministerios/{id}",
            put(handlers::ministries::update_ministerio)
                .delete(handlers::ministries::delete_ministerio),
        )
        .route(
            "/conteudos/{chave}",
            put(handlers::pages::upsert_conteudo).delete(handlers::pages::delete_conteudo),
        )
        .route(
            "/upload",
            post(handlers::upload::upload_image)
                .layer(DefaultBodyLimit::max(max_upload_size + MULTIPART_OVERHEAD)),
        )
}

use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Site content is readable by anyone. Login is the only public write.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/auth/login", post(handlers::auth::login))
        .route("/sermoes", get(handlers::sermons::list_sermons))
        .route("/sermoes/{id}", get(handlers::sermons::get_sermon))
        .route("/aulas", get(handlers::classes::list_aulas))
        .route("/aulas/{id}", get(handlers::classes::get_aula))
        // `?ativo=true` is what the public agenda uses.
        .route("/eventos", get(handlers::events::list_eventos))
        .route("/eventos/{id}", get(handlers::events::get_evento))
        .route("/pastores", get(handlers::pastors::list_pastores))
        .route("/pastores/{id}", get(handlers::pastors::get_pastor))
        .route("/ministerios", get(handlers::ministries::list_ministerios))
        .route("/ministerios/{id}", get(handlers::ministries::get_ministerio))
        .route("/conteudos", get(handlers::pages::list_conteudos))
        .route("/conteudos/{chave}", get(handlers::pages::get_conteudo))
}

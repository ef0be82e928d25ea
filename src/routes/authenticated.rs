use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, put},
};

/// Authenticated Router Module
///
/// Routes for any caller with a valid token, including accounts that hold no
/// role yet (they can still see their profile and change their password).
pub fn authenticated_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/me", get(handlers::auth::me))
        .route("/auth/password", put(handlers::auth::change_password))
}

use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, patch, put},
};

/// Admin Router Module
///
/// User provisioning and role assignment. Allow-list: admin.
///
/// The self-protection rule (no changing your own role, no deleting your own
/// account) is enforced in the handlers.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/users",
            get(handlers::users::list_users).post(handlers::users::create_user),
        )
        .route(
            "/users/{id}",
            put(handlers::users::update_user).delete(handlers::users::delete_user),
        )
        .route("/users/{id}/role", patch(handlers::users::update_user_role))
}

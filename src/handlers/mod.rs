//! HTTP handlers, one module per resource.
//!
//! Reads of site content are public. Every mutation resolves the caller through
//! the `AuthUser` extractor and runs the access decision against its allow-list
//! before touching storage.

pub mod auth;
pub mod classes;
pub mod events;
pub mod ministries;
pub mod pages;
pub mod pastors;
pub mod sermons;
pub mod upload;
pub mod users;

/// health
///
/// Liveness probe for load balancers and uptime checks.
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "health",
    responses((status = 200, description = "Service is up", body = String))
)]
pub async fn health() -> &'static str {
    "ok"
}

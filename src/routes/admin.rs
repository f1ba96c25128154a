use crate::{AppState, handlers};
use axum::{Router, routing::delete};

/// Admin Router Module
///
/// Nested under `/anime/admin`, which the security policy reserves for the ADMIN
/// role. The rule is listed ahead of the broader `/anime/**` rule so that it is
/// actually reachable.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // DELETE /anime/admin/{id}
        // 204 on success, 400 when the anime does not exist.
        .route("/{id}", delete(handlers::delete))
}

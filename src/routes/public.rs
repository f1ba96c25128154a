use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Public Router Module
///
/// Endpoints matched by the `/actuator/**` permit-all rule. Used by load balancers
/// and monitoring; no credentials are read.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /actuator/health
        // Liveness probe. Returns {"status":"UP"} as soon as the server accepts requests.
        .route("/actuator/health", get(handlers::health))
}

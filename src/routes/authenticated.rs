use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Authenticated Router Module
///
/// The anime CRUD surface guarded by the `/anime/** -> USER` rule. Handlers here
/// never check roles themselves.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // GET /anime?page=&size=&sort=   -> one page
        // POST /anime                    -> create, 201
        // PUT /anime                     -> replace, 204
        .route(
            "/anime",
            get(handlers::list)
                .post(handlers::save)
                .put(handlers::replace),
        )
        // GET /anime/all
        // Unpaged listing; intended for small tables.
        .route("/anime/all", get(handlers::list_all))
        // GET /anime/find?name=
        // Exact-name search. Unmatched names return an empty list.
        .route("/anime/find", get(handlers::find_by_name))
        // GET /anime/by-id/{id}
        // Lookup that also logs the authenticated principal.
        .route("/anime/by-id/{id}", get(handlers::find_by_id_authenticated))
        // GET /anime/{id}
        // Static segments above take priority over this capture.
        .route("/anime/{id}", get(handlers::find_by_id))
}

use axum::{
    Router,
    extract::{FromRef, FromRequestParts, Request, State},
    http::HeaderName,
    middleware::{self, Next},
    response::{IntoResponse, Response},
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

pub mod auth;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod handlers;
pub mod mapper;
pub mod models;
pub mod repository;
pub mod security;
pub mod service;

// Routers grouped by the policy rule that guards them.
pub mod routes;
use routes::{admin, authenticated, public};

use auth::AuthUser;
use error::AppError;
use security::{Access, Decision, SecurityPolicy};

// --- Public Re-exports ---

pub use config::AppConfig;
pub use repository::{InMemoryRepository, PostgresRepository, RepositoryState};
pub use service::AnimeService;

/// ApiDoc
///
/// OpenAPI document for every handler annotated with `#[utoipa::path]`, served at
/// `/api-docs/openapi.json` and rendered by the Swagger UI at `/swagger-ui`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::list, handlers::list_all, handlers::find_by_id,
        handlers::find_by_id_authenticated, handlers::find_by_name, handlers::save,
        handlers::replace, handlers::delete, handlers::health
    ),
    components(
        schemas(
            models::Anime, models::AnimePostRequestBody, models::AnimePutRequestBody,
            error::ExceptionDetails, error::ValidationExceptionDetails, handlers::HealthStatus,
        )
    ),
    tags(
        (name = "anime", description = "Anime CRUD"),
        (name = "actuator", description = "Operational endpoints")
    )
)]
pub struct ApiDoc;

/// AppState
///
/// The single immutable container shared by every request: the service the handlers
/// call, the repository the authenticator reads users from, the loaded configuration,
/// and the authorization rule table.
#[derive(Clone)]
pub struct AppState {
    pub service: AnimeService,
    pub repo: RepositoryState,
    pub config: AppConfig,
    pub policy: SecurityPolicy,
}

impl AppState {
    /// Wires the service onto the given repository and installs the default policy.
    pub fn new(repo: RepositoryState, config: AppConfig) -> Self {
        Self {
            service: AnimeService::new(repo.clone()),
            repo,
            config,
            policy: SecurityPolicy::default(),
        }
    }
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for AnimeService {
    fn from_ref(app_state: &AppState) -> AnimeService {
        app_state.service.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// security_middleware
///
/// Gate in front of every route, including the Swagger UI and the 404 fallback.
/// Permit-all paths pass untouched. Everything else is authenticated from the
/// `Authorization: Basic` header and checked against the policy: 401 when there is no
/// valid identity, 403 when the identity lacks the required role. On success the
/// `AuthUser` is stored in the request extensions for handlers that want the principal.
async fn security_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_owned();
    if state.policy.required_access(&path) == Access::PermitAll {
        return next.run(request).await;
    }

    let (mut parts, body) = request.into_parts();
    let user = match AuthUser::from_request_parts(&mut parts, &state).await {
        Ok(user) => Some(user),
        Err(AppError::Unauthorized) => None,
        Err(other) => return other.into_response(),
    };

    match state
        .policy
        .decide(&path, user.as_ref().map(|u| u.roles.as_slice()))
    {
        Decision::Permit => {
            if let Some(user) = user {
                parts.extensions.insert(user);
            }
            next.run(Request::from_parts(parts, body)).await
        }
        Decision::Unauthenticated => {
            tracing::debug!(%path, "rejected unauthenticated request");
            AppError::Unauthorized.into_response()
        }
        Decision::Forbidden => {
            tracing::warn!(
                %path,
                username = user.as_ref().map(|u| u.username.as_str()).unwrap_or_default(),
                "access denied"
            );
            AppError::Forbidden.into_response()
        }
    }
}

/// create_router
///
/// Assembles the routing structure, the security gate, and the observability layers.
pub fn create_router(state: AppState) -> Router {
    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        .merge(authenticated::authenticated_routes())
        .nest("/anime/admin", admin::admin_routes())
        .with_state(state.clone());

    base_router
        // The gate wraps the whole router so unmatched paths are also subject to the
        // "any other request must be authenticated" rule.
        .layer(middleware::from_fn_with_state(state, security_middleware))
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
}

/// trace_span_logger
///
/// Span for `TraceLayer`, carrying method, uri and the `x-request-id` so every log line
/// of one request can be correlated.
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

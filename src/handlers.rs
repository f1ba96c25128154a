use crate::{
    AppState,
    auth::AuthUser,
    config::AppConfig,
    error::{AppError, AppResult, ExceptionDetails, ValidatedJson, ValidationExceptionDetails},
    models::{Anime, AnimePostRequestBody, AnimePutRequestBody, Page, PageRequest, Sort},
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

// --- Query Structs ---

/// PageParams
///
/// Raw paging parameters of GET /anime, e.g. `?page=1&size=5&sort=name,desc`.
/// Each missing parameter falls back independently: `page` to the configured
/// fallback page (1), `size` to the configured fallback size (5).
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct PageParams {
    /// Zero-based page index. Negative values clamp to 0; omitted means the fallback page.
    pub page: Option<i64>,
    /// Page size, capped at the configured maximum. Omitted or below 1 means the fallback size.
    pub size: Option<i64>,
    /// `property[,asc|desc]` where property is `id` or `name`.
    pub sort: Option<String>,
}

impl PageParams {
    /// Resolves the raw parameters against the configured fallbacks and ceiling.
    pub fn resolve(&self, config: &AppConfig) -> AppResult<PageRequest> {
        let page = self.page.unwrap_or(config.fallback_page).max(0);
        let size = match self.size {
            Some(size) if size >= 1 => size.min(config.max_page_size),
            _ => config.fallback_page_size,
        };
        let mut request = PageRequest::of(page, size);
        if let Some(raw) = self.sort.as_deref().filter(|s| !s.trim().is_empty()) {
            let sort = raw
                .parse::<Sort>()
                .map_err(|e| AppError::BadRequest(e.to_string()))?;
            request = request.with_sort(sort);
        }
        Ok(request)
    }
}

/// NameFilter
///
/// Query of GET /anime/find.
#[derive(Debug, Deserialize, IntoParams)]
pub struct NameFilter {
    /// Exact name to match.
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthStatus {
    pub status: String,
}

// --- Handlers ---

/// list
///
/// Lists anime one page at a time.
#[utoipa::path(
    get,
    path = "/anime",
    params(PageParams),
    responses(
        (status = 200, description = "One page of anime", body = Page<Anime>),
        (status = 400, description = "Unknown sort property", body = ExceptionDetails)
    ),
    tag = "anime"
)]
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> AppResult<Json<Page<Anime>>> {
    let request = params.resolve(&state.config)?;
    Ok(Json(state.service.list_all(&request).await?))
}

/// list_all
///
/// Every anime in one response. No paging.
#[utoipa::path(
    get,
    path = "/anime/all",
    responses((status = 200, description = "All anime", body = [Anime])),
    tag = "anime"
)]
pub async fn list_all(State(state): State<AppState>) -> AppResult<Json<Vec<Anime>>> {
    Ok(Json(state.service.list_all_non_pageable().await?))
}

#[utoipa::path(
    get,
    path = "/anime/{id}",
    params(("id" = i64, Path, description = "Anime id")),
    responses(
        (status = 200, description = "Found", body = Anime),
        (status = 400, description = "Anime does not exist", body = ExceptionDetails)
    ),
    tag = "anime"
)]
pub async fn find_by_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Anime>> {
    Ok(Json(state.service.find_by_id_or_fail(id).await?))
}

/// find_by_id_authenticated
///
/// Same lookup as `find_by_id`, additionally recording who asked.
#[utoipa::path(
    get,
    path = "/anime/by-id/{id}",
    params(("id" = i64, Path, description = "Anime id")),
    responses(
        (status = 200, description = "Found", body = Anime),
        (status = 400, description = "Anime does not exist", body = ExceptionDetails)
    ),
    tag = "anime"
)]
pub async fn find_by_id_authenticated(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Anime>> {
    tracing::info!(principal = %user.username, roles = ?user.roles, anime_id = id, "lookup by id");
    Ok(Json(state.service.find_by_id_or_fail(id).await?))
}

#[utoipa::path(
    get,
    path = "/anime/find",
    params(NameFilter),
    responses((status = 200, description = "Exact name matches, possibly none", body = [Anime])),
    tag = "anime"
)]
pub async fn find_by_name(
    State(state): State<AppState>,
    Query(filter): Query<NameFilter>,
) -> AppResult<Json<Vec<Anime>>> {
    Ok(Json(state.service.find_by_name(&filter.name).await?))
}

#[utoipa::path(
    post,
    path = "/anime",
    request_body = AnimePostRequestBody,
    responses(
        (status = 201, description = "Created", body = Anime),
        (status = 400, description = "Invalid fields", body = ValidationExceptionDetails)
    ),
    tag = "anime"
)]
pub async fn save(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<AnimePostRequestBody>,
) -> AppResult<(StatusCode, Json<Anime>)> {
    let anime = state.service.save(body).await?;
    Ok((StatusCode::CREATED, Json(anime)))
}

/// replace
///
/// Overwrites an existing anime. The id in the body selects the row; it cannot move
/// the update to a different one.
#[utoipa::path(
    put,
    path = "/anime",
    request_body = AnimePutRequestBody,
    responses(
        (status = 204, description = "Replaced"),
        (status = 400, description = "Anime does not exist or fields are invalid", body = ExceptionDetails)
    ),
    tag = "anime"
)]
pub async fn replace(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<AnimePutRequestBody>,
) -> AppResult<StatusCode> {
    state.service.replace(body).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// delete
///
/// [Admin Route] Removes an anime. The ADMIN role is enforced by the security policy
/// before this handler runs.
#[utoipa::path(
    delete,
    path = "/anime/admin/{id}",
    params(("id" = i64, Path, description = "Anime id")),
    responses(
        (status = 204, description = "Success operation."),
        (status = 400, description = "When Anime does not exist in Database.", body = ExceptionDetails),
        (status = 403, description = "Caller lacks the ADMIN role", body = ExceptionDetails)
    ),
    tag = "anime"
)]
pub async fn delete(State(state): State<AppState>, Path(id): Path<i64>) -> AppResult<StatusCode> {
    state.service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/actuator/health",
    responses((status = 200, description = "Service is up", body = HealthStatus)),
    tag = "actuator"
)]
pub async fn health() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "UP".to_string(),
    })
}

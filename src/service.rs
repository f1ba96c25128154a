use crate::{
    error::{AppError, AppResult},
    models::{Anime, AnimePostRequestBody, AnimePutRequestBody, Page, PageRequest},
    repository::RepositoryState,
};

/// AnimeService
///
/// Orchestrates repository calls for the anime resource. "Not found" is decided in
/// exactly one place, [`AnimeService::find_by_id_or_fail`], and reused by `replace`
/// and `delete`.
#[derive(Clone)]
pub struct AnimeService {
    repo: RepositoryState,
}

impl AnimeService {
    pub fn new(repo: RepositoryState) -> Self {
        Self { repo }
    }

    pub async fn list_all(&self, request: &PageRequest) -> AppResult<Page<Anime>> {
        self.repo.find_all_paged(request).await
    }

    /// Every row, no paging guard.
    pub async fn list_all_non_pageable(&self) -> AppResult<Vec<Anime>> {
        self.repo.find_all().await
    }

    /// Exact match. An empty name can never be stored, so it yields an empty list.
    pub async fn find_by_name(&self, name: &str) -> AppResult<Vec<Anime>> {
        if name.is_empty() {
            return Ok(Vec::new());
        }
        self.repo.find_by_name(name).await
    }

    pub async fn find_by_id_or_fail(&self, id: i64) -> AppResult<Anime> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(AppError::not_found)
    }

    pub async fn save(&self, body: AnimePostRequestBody) -> AppResult<Anime> {
        let saved = self.repo.insert(Anime::from(body)).await?;
        tracing::info!(id = saved.id, "anime created");
        Ok(saved)
    }

    /// replace
    ///
    /// Confirms the target exists, then overwrites it. The persisted id is stamped onto
    /// the mapped entity so the update can never be redirected to a different row.
    pub async fn replace(&self, body: AnimePutRequestBody) -> AppResult<()> {
        let id = body.id.ok_or_else(AppError::not_found)?;
        let saved = self.find_by_id_or_fail(id).await?;

        let mut anime = Anime::from(body);
        anime.id = saved.id;

        self.repo.update(anime).await?;
        tracing::info!(id = saved.id, "anime replaced");
        Ok(())
    }

    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let saved = self.find_by_id_or_fail(id).await?;
        self.repo.delete(saved.id).await?;
        tracing::info!(id = saved.id, "anime deleted");
        Ok(())
    }
}

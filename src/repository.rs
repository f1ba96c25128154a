use crate::error::AppResult;
use crate::models::{Anime, CustomUser, Direction, NewCustomUser, Page, PageRequest, SortProperty};
use async_trait::async_trait;
use sqlx::{PgPool, query_builder::QueryBuilder};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Repository Trait
///
/// The persistence contract the service layer is written against. Handlers never see
/// it directly; they go through `AnimeService`, which receives an implementation at
/// construction time.
///
/// **Send + Sync + async_trait** are required so that `Arc<dyn Repository>` can live
/// in the shared axum state.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Anime Retrieval ---
    async fn find_all_paged(&self, request: &PageRequest) -> AppResult<Page<Anime>>;
    // Unbounded; meant for small tables.
    async fn find_all(&self) -> AppResult<Vec<Anime>>;
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Anime>>;
    // Exact, case-sensitive match.
    async fn find_by_name(&self, name: &str) -> AppResult<Vec<Anime>>;

    // --- Anime Writes ---
    // Ignores `anime.id`; the store assigns one.
    async fn insert(&self, anime: Anime) -> AppResult<Anime>;
    // Full overwrite of the row identified by `anime.id`.
    async fn update(&self, anime: Anime) -> AppResult<Anime>;
    // Returns true if a row was removed.
    async fn delete(&self, id: i64) -> AppResult<bool>;

    // --- Users ---
    async fn find_user_by_username(&self, username: &str) -> AppResult<Option<CustomUser>>;
    async fn create_user(&self, user: NewCustomUser) -> AppResult<CustomUser>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the application state.
pub type RepositoryState = Arc<dyn Repository>;

/// PostgresRepository
///
/// `Repository` backed by the `anime` and `custom_user` tables.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    /// find_all_paged
    ///
    /// ORDER BY is assembled from the whitelisted `SortProperty`/`Direction` keywords only;
    /// the limit and offset are bound parameters. Unsorted requests fall back to id order.
    async fn find_all_paged(&self, request: &PageRequest) -> AppResult<Page<Anime>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM anime")
            .fetch_one(&self.pool)
            .await?;

        let mut builder: QueryBuilder<sqlx::Postgres> =
            QueryBuilder::new("SELECT id, name FROM anime ORDER BY ");
        match request.sort {
            Some(sort) => {
                builder.push(sort.property.column());
                builder.push(" ");
                builder.push(sort.direction.keyword());
                // Stable paging when names repeat.
                if sort.property != SortProperty::Id {
                    builder.push(", id ASC");
                }
            }
            None => {
                builder.push("id ASC");
            }
        }
        builder.push(" LIMIT ");
        builder.push_bind(request.size);
        builder.push(" OFFSET ");
        builder.push_bind(request.offset());

        let content = builder
            .build_query_as::<Anime>()
            .fetch_all(&self.pool)
            .await?;

        Ok(Page::new(content, request, total))
    }

    async fn find_all(&self) -> AppResult<Vec<Anime>> {
        let rows = sqlx::query_as::<_, Anime>("SELECT id, name FROM anime ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Anime>> {
        let row = sqlx::query_as::<_, Anime>("SELECT id, name FROM anime WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Vec<Anime>> {
        let rows =
            sqlx::query_as::<_, Anime>("SELECT id, name FROM anime WHERE name = $1 ORDER BY id")
                .bind(name)
                .fetch_all(&self.pool)
                .await?;
        Ok(rows)
    }

    /// insert
    ///
    /// Runs inside its own transaction; a failed insert leaves nothing behind.
    async fn insert(&self, anime: Anime) -> AppResult<Anime> {
        let mut tx = self.pool.begin().await?;
        let saved = sqlx::query_as::<_, Anime>(
            "INSERT INTO anime (name) VALUES ($1) RETURNING id, name",
        )
        .bind(&anime.name)
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;

        tracing::debug!(id = saved.id, "anime inserted");
        Ok(saved)
    }

    /// update
    ///
    /// Overwrites every mutable column. If the row vanished since the caller's existence
    /// check the statement matches nothing and the input is returned unchanged
    /// (last writer wins; no isolation beyond the single statement).
    async fn update(&self, anime: Anime) -> AppResult<Anime> {
        let mut tx = self.pool.begin().await?;
        let updated = sqlx::query_as::<_, Anime>(
            "UPDATE anime SET name = $2 WHERE id = $1 RETURNING id, name",
        )
        .bind(anime.id)
        .bind(&anime.name)
        .fetch_optional(&mut *tx)
        .await?;
        tx.commit().await?;

        match updated {
            Some(row) => Ok(row),
            None => {
                tracing::warn!(id = anime.id, "update matched no row");
                Ok(anime)
            }
        }
    }

    async fn delete(&self, id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM anime WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_user_by_username(&self, username: &str) -> AppResult<Option<CustomUser>> {
        let user = sqlx::query_as::<_, CustomUser>(
            "SELECT id, username, password, name, authorities FROM custom_user WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn create_user(&self, user: NewCustomUser) -> AppResult<CustomUser> {
        let created = sqlx::query_as::<_, CustomUser>(
            r#"INSERT INTO custom_user (username, password, name, authorities)
               VALUES ($1, $2, $3, $4)
               RETURNING id, username, password, name, authorities"#,
        )
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(&user.name)
        .bind(&user.authorities)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }
}

/// InMemoryRepository
///
/// Process-local `Repository` used by the test suites and for running the service
/// without a database. Ids are assigned sequentially starting at 1, like a
/// `BIGSERIAL` column.
#[derive(Default)]
pub struct InMemoryRepository {
    inner: RwLock<MemoryTables>,
}

#[derive(Default)]
struct MemoryTables {
    anime: BTreeMap<i64, Anime>,
    users: Vec<CustomUser>,
    next_anime_id: i64,
    next_user_id: i64,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn find_all_paged(&self, request: &PageRequest) -> AppResult<Page<Anime>> {
        let tables = self.inner.read().await;
        // BTreeMap iteration is already id-ascending, and the sort below is stable.
        let mut rows: Vec<Anime> = tables.anime.values().cloned().collect();
        if let Some(sort) = request.sort {
            match (sort.property, sort.direction) {
                (SortProperty::Id, Direction::Asc) => {}
                (SortProperty::Id, Direction::Desc) => rows.reverse(),
                (SortProperty::Name, Direction::Asc) => rows.sort_by(|a, b| a.name.cmp(&b.name)),
                (SortProperty::Name, Direction::Desc) => rows.sort_by(|a, b| b.name.cmp(&a.name)),
            }
        }

        let total = rows.len() as i64;
        let content = rows
            .into_iter()
            .skip(request.offset().max(0) as usize)
            .take(request.size.max(0) as usize)
            .collect();
        Ok(Page::new(content, request, total))
    }

    async fn find_all(&self) -> AppResult<Vec<Anime>> {
        Ok(self.inner.read().await.anime.values().cloned().collect())
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Anime>> {
        Ok(self.inner.read().await.anime.get(&id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Vec<Anime>> {
        Ok(self
            .inner
            .read()
            .await
            .anime
            .values()
            .filter(|a| a.name == name)
            .cloned()
            .collect())
    }

    async fn insert(&self, anime: Anime) -> AppResult<Anime> {
        let mut tables = self.inner.write().await;
        tables.next_anime_id += 1;
        let saved = Anime {
            id: tables.next_anime_id,
            name: anime.name,
        };
        tables.anime.insert(saved.id, saved.clone());
        Ok(saved)
    }

    async fn update(&self, anime: Anime) -> AppResult<Anime> {
        let mut tables = self.inner.write().await;
        if let Some(row) = tables.anime.get_mut(&anime.id) {
            row.name = anime.name.clone();
        }
        Ok(anime)
    }

    async fn delete(&self, id: i64) -> AppResult<bool> {
        Ok(self.inner.write().await.anime.remove(&id).is_some())
    }

    async fn find_user_by_username(&self, username: &str) -> AppResult<Option<CustomUser>> {
        Ok(self
            .inner
            .read()
            .await
            .users
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn create_user(&self, user: NewCustomUser) -> AppResult<CustomUser> {
        let mut tables = self.inner.write().await;
        tables.next_user_id += 1;
        let created = CustomUser {
            id: tables.next_user_id,
            username: user.username,
            password: user.password_hash,
            name: user.name,
            authorities: user.authorities,
        };
        tables.users.push(created.clone());
        Ok(created)
    }
}

use anime_service::{
    models::{Anime, Direction, NewCustomUser, PageRequest, Sort, SortProperty},
    repository::{PostgresRepository, Repository},
};
use serial_test::serial;
use sqlx::PgPool;

// --- Test Context and Setup ---

/// Holds the pool for one test. Needs a reachable Postgres in `DATABASE_URL`, so the
/// suite is ignored by default: `cargo test -- --ignored`.
struct DbTestContext {
    pool: PgPool,
}

impl DbTestContext {
    async fn setup() -> Self {
        dotenv::dotenv().ok();

        let db_url = std::env::var("DATABASE_URL")
            .expect("DATABASE_URL must be set to run integration tests");

        let pool = PgPool::connect(&db_url)
            .await
            .expect("Failed to connect to database for integration tests.");

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("Failed to run database migrations.");

        sqlx::query("TRUNCATE anime RESTART IDENTITY")
            .execute(&pool)
            .await
            .expect("Failed to clear the anime table.");

        DbTestContext { pool }
    }

    fn repository(&self) -> PostgresRepository {
        PostgresRepository::new(self.pool.clone())
    }
}

async fn insert_named(repo: &PostgresRepository, name: &str) -> Anime {
    repo.insert(Anime {
        id: 0,
        name: name.to_string(),
    })
    .await
    .expect("insert should succeed")
}

// --- Tests ---

#[tokio::test]
#[serial]
#[ignore = "requires DATABASE_URL"]
async fn insert_then_find_by_id() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();

    let saved = insert_named(&repo, "Samurai").await;
    assert!(saved.id > 0);

    let found = repo.find_by_id(saved.id).await.unwrap();
    assert_eq!(found, Some(saved.clone()));
    assert_eq!(repo.find_by_id(saved.id + 1000).await.unwrap(), None);
}

#[tokio::test]
#[serial]
#[ignore = "requires DATABASE_URL"]
async fn find_by_name_is_exact() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();

    insert_named(&repo, "Overlord").await;
    insert_named(&repo, "Overlord II").await;

    let found = repo.find_by_name("Overlord").await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name, "Overlord");
    assert!(repo.find_by_name("overlord").await.unwrap().is_empty());
}

#[tokio::test]
#[serial]
#[ignore = "requires DATABASE_URL"]
async fn paging_sorts_and_counts() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();

    for name in ["Bleach", "Naruto", "Akira"] {
        insert_named(&repo, name).await;
    }

    let request = PageRequest::of(0, 2).with_sort(Sort {
        property: SortProperty::Name,
        direction: Direction::Asc,
    });
    let page = repo.find_all_paged(&request).await.unwrap();
    let names: Vec<_> = page.content.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, vec!["Akira", "Bleach"]);
    assert_eq!(page.total_elements, 3);
    assert_eq!(page.total_pages, 2);

    let page = repo.find_all_paged(&PageRequest::of(1, 2)).await.unwrap();
    assert_eq!(page.content.len(), 1);
    assert_eq!(page.content[0].name, "Akira");
    assert!(page.last);
}

#[tokio::test]
#[serial]
#[ignore = "requires DATABASE_URL"]
async fn update_and_delete() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();

    let saved = insert_named(&repo, "Samurai").await;
    repo.update(Anime {
        id: saved.id,
        name: "Samurai 2".to_string(),
    })
    .await
    .unwrap();
    assert_eq!(repo.find_by_id(saved.id).await.unwrap().unwrap().name, "Samurai 2");

    assert!(repo.delete(saved.id).await.unwrap());
    assert!(!repo.delete(saved.id).await.unwrap());
    assert!(repo.find_all().await.unwrap().is_empty());
}

#[tokio::test]
#[serial]
#[ignore = "requires DATABASE_URL"]
async fn create_and_load_user() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();

    sqlx::query("DELETE FROM custom_user WHERE username = $1")
        .bind("it-user")
        .execute(&ctx.pool)
        .await
        .unwrap();

    let created = repo
        .create_user(NewCustomUser {
            username: "it-user".to_string(),
            password_hash: "$argon2id$placeholder".to_string(),
            name: "Integration".to_string(),
            authorities: "ROLE_USER,ROLE_ADMIN".to_string(),
        })
        .await
        .unwrap();

    let loaded = repo
        .find_user_by_username("it-user")
        .await
        .unwrap()
        .expect("user should exist");
    assert_eq!(loaded.id, created.id);
    assert_eq!(loaded.authorities, "ROLE_USER,ROLE_ADMIN");
    assert!(repo.find_user_by_username("nobody-here").await.unwrap().is_none());
}

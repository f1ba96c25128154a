mod common;

use anime_service::{
    client::{AnimeClient, ClientError},
    create_router,
    models::Anime,
};
use common::{ADMIN, PASSWORD, USER};
use reqwest::StatusCode;
use tokio::net::TcpListener;

/// Serves the app on an ephemeral port and returns its base url.
async fn spawn_server() -> String {
    let (state, _) = common::seeded_state().await;
    let app = create_router(state);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn client_round_trip_as_admin() {
    let base_url = spawn_server().await;
    let client = AnimeClient::new(&base_url, ADMIN, PASSWORD);

    assert!(client.list_all().await.unwrap().is_empty());

    let saved = client.save("Samurai").await.unwrap();
    assert_eq!(saved.name, "Samurai");
    assert!(saved.id > 0);

    let found = client.find_by_id(saved.id).await.unwrap();
    assert_eq!(found, saved);

    let renamed = Anime {
        id: saved.id,
        name: "Samurai 2".to_string(),
    };
    client.replace(&renamed).await.unwrap();
    assert_eq!(client.find_by_name("Samurai 2").await.unwrap(), vec![renamed.clone()]);
    assert!(client.find_by_name("Samurai").await.unwrap().is_empty());

    client.save("Akira").await.unwrap();
    let page = client.list_page(0, 1, Some("name,desc")).await.unwrap();
    assert_eq!(page.content, vec![renamed]);
    assert_eq!(page.total_elements, 2);
    assert_eq!(page.total_pages, 2);

    client.delete(saved.id).await.unwrap();
    match client.find_by_id(saved.id).await {
        Err(ClientError::Status { status, body }) => {
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert!(body.contains("Anime not found"));
        }
        other => panic!("expected 400, got {other:?}"),
    }
}

#[tokio::test]
async fn client_delete_as_user_is_forbidden() {
    let base_url = spawn_server().await;
    let client = AnimeClient::new(&base_url, USER, PASSWORD);

    let saved = client.save("Samurai").await.unwrap();
    match client.delete(saved.id).await {
        Err(ClientError::Status { status, .. }) => assert_eq!(status, StatusCode::FORBIDDEN),
        other => panic!("expected 403, got {other:?}"),
    }
    assert_eq!(client.find_by_id(saved.id).await.unwrap(), saved);
}

#[tokio::test]
async fn client_with_bad_password_is_unauthorized() {
    let base_url = spawn_server().await;
    let client = AnimeClient::new(&base_url, USER, "wrong");

    match client.list_all().await {
        Err(ClientError::Status { status, .. }) => assert_eq!(status, StatusCode::UNAUTHORIZED),
        other => panic!("expected 401, got {other:?}"),
    }
}

#[tokio::test]
async fn client_save_with_empty_name_reports_validation_error() {
    let base_url = spawn_server().await;
    let client = AnimeClient::new(&base_url, USER, PASSWORD);

    match client.save("").await {
        Err(ClientError::Status { status, body }) => {
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert!(body.contains("The anime name cannot be empty"));
        }
        other => panic!("expected 400, got {other:?}"),
    }
}

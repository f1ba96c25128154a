//! Typed HTTP client for the anime endpoints.

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::models::{Anime, AnimePostRequestBody, AnimePutRequestBody, Page};

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered, but not with the status the operation expects.
    #[error("unexpected status {status}: {body}")]
    Status { status: StatusCode, body: String },
}

/// AnimeClient
///
/// Authenticates every request with HTTP Basic credentials.
#[derive(Clone)]
pub struct AnimeClient {
    http: Client,
    base_url: String,
    username: String,
    password: String,
}

impl AnimeClient {
    pub fn new(base_url: impl Into<String>, username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            username: username.into(),
            password: password.into(),
        }
    }

    fn request(&self, method: reqwest::Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.base_url, path))
            .basic_auth(&self.username, Some(&self.password))
    }

    /// GET /anime with explicit paging; `sort` is e.g. `name,desc`.
    pub async fn list_page(&self, page: i64, size: i64, sort: Option<&str>) -> Result<Page<Anime>, ClientError> {
        let mut query = vec![("page", page.to_string()), ("size", size.to_string())];
        if let Some(sort) = sort {
            query.push(("sort", sort.to_string()));
        }
        let response = self.request(reqwest::Method::GET, "/anime").query(&query).send().await?;
        json_with_status(response, StatusCode::OK).await
    }

    pub async fn list_all(&self) -> Result<Vec<Anime>, ClientError> {
        let response = self.request(reqwest::Method::GET, "/anime/all").send().await?;
        json_with_status(response, StatusCode::OK).await
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Anime, ClientError> {
        let response = self
            .request(reqwest::Method::GET, &format!("/anime/{id}"))
            .send()
            .await?;
        json_with_status(response, StatusCode::OK).await
    }

    pub async fn find_by_name(&self, name: &str) -> Result<Vec<Anime>, ClientError> {
        let response = self
            .request(reqwest::Method::GET, "/anime/find")
            .query(&[("name", name)])
            .send()
            .await?;
        json_with_status(response, StatusCode::OK).await
    }

    pub async fn save(&self, name: &str) -> Result<Anime, ClientError> {
        let body = AnimePostRequestBody {
            name: name.to_string(),
        };
        let response = self
            .request(reqwest::Method::POST, "/anime")
            .json(&body)
            .send()
            .await?;
        json_with_status(response, StatusCode::CREATED).await
    }

    pub async fn replace(&self, anime: &Anime) -> Result<(), ClientError> {
        let body = AnimePutRequestBody {
            id: Some(anime.id),
            name: anime.name.clone(),
        };
        let response = self
            .request(reqwest::Method::PUT, "/anime")
            .json(&body)
            .send()
            .await?;
        expect_status(response, StatusCode::NO_CONTENT).await
    }

    /// Needs credentials carrying the ADMIN role.
    pub async fn delete(&self, id: i64) -> Result<(), ClientError> {
        let response = self
            .request(reqwest::Method::DELETE, &format!("/anime/admin/{id}"))
            .send()
            .await?;
        expect_status(response, StatusCode::NO_CONTENT).await
    }
}

async fn expect_status(response: Response, expected: StatusCode) -> Result<(), ClientError> {
    let status = response.status();
    if status == expected {
        Ok(())
    } else {
        let body = response.text().await.unwrap_or_default();
        Err(ClientError::Status { status, body })
    }
}

async fn json_with_status<T: DeserializeOwned>(
    response: Response,
    expected: StatusCode,
) -> Result<T, ClientError> {
    let status = response.status();
    if status != expected {
        let body = response.text().await.unwrap_or_default();
        return Err(ClientError::Status { status, body });
    }
    Ok(response.json().await?)
}

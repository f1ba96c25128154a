//! Error taxonomy and its rendering into the structured error payloads.
//!
//! Every failure that reaches a handler boundary is an [`AppError`]; its
//! `IntoResponse` impl is the single place where status codes and bodies are chosen.

use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use chrono::{Local, NaiveDateTime};
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;
use ts_rs::TS;
use utoipa::ToSchema;
use validator::{Validate, ValidationErrors};

pub const BAD_REQUEST_TITLE: &str = "Bad request exception, check the documentation";
pub const INVALID_FIELDS_TITLE: &str = "Bad request exception, invalid fields";
pub const INVALID_FIELDS_DETAILS: &str = "Check the field errors";
pub const NOT_FOUND_MESSAGE: &str = "Anime not found";

#[derive(Error, Debug)]
pub enum AppError {
    /// Lookup by id missed. Rendered as 400, not 404, for compatibility with existing clients.
    #[error("{0}")]
    BadRequest(String),

    #[error("invalid fields: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("{}", .0.body_text())]
    MalformedBody(#[from] JsonRejection),

    #[error("Full authentication is required to access this resource")]
    Unauthorized,

    #[error("Access is denied")]
    Forbidden,

    #[error("database error")]
    Database(#[from] sqlx::Error),

    #[error("password hash error: {0}")]
    PasswordHash(String),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn not_found() -> Self {
        AppError::BadRequest(NOT_FOUND_MESSAGE.to_string())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }

    /// Diagnostic identifier naming the failure kind, sent as `developerMessage`.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::BadRequest(_) => "anime_service::error::BadRequest",
            AppError::Validation(_) => "anime_service::error::Validation",
            AppError::MalformedBody(_) => "anime_service::error::MalformedBody",
            AppError::Unauthorized => "anime_service::error::Unauthorized",
            AppError::Forbidden => "anime_service::error::Forbidden",
            AppError::Database(_) => "anime_service::error::Database",
            AppError::PasswordHash(_) => "anime_service::error::PasswordHash",
            AppError::Internal(_) => "anime_service::error::Internal",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            // Syntax and type errors in the body are plain 400s; content-type and
            // body-size rejections keep their own status.
            AppError::MalformedBody(
                JsonRejection::JsonDataError(_) | JsonRejection::JsonSyntaxError(_),
            ) => StatusCode::BAD_REQUEST,
            AppError::MalformedBody(rejection) => rejection.status(),
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::Database(_) | AppError::PasswordHash(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// ExceptionDetails
///
/// Body of every non-validation error response.
#[derive(Debug, Clone, Serialize, serde::Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ExceptionDetails {
    #[ts(type = "string")]
    pub timestamp: NaiveDateTime,
    pub status: u16,
    pub title: String,
    pub details: String,
    pub developer_message: String,
}

/// ValidationExceptionDetails
///
/// Body of a 400 caused by constraint violations on a request DTO.
#[derive(Debug, Clone, Serialize, serde::Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ValidationExceptionDetails {
    #[serde(flatten)]
    pub exception: ExceptionDetails,
    // Offending field names, space separated.
    pub fields: String,
    // Their messages, ", " separated, in the same order as `fields`.
    pub fields_message: String,
}

impl ExceptionDetails {
    fn new(status: StatusCode, title: &str, details: String, kind: &str) -> Self {
        Self {
            timestamp: Local::now().naive_local(),
            status: status.as_u16(),
            title: title.to_string(),
            details,
            developer_message: kind.to_string(),
        }
    }
}

/// Flattens validator output into `(fields, fieldsMessage)`.
///
/// The validation crate keeps field errors in a hash map, so fields are emitted in
/// name order to keep the payload stable between runs.
pub fn join_field_errors(errors: &ValidationErrors) -> (String, String) {
    let mut field_errors: Vec<_> = errors.field_errors().into_iter().collect();
    field_errors.sort_by(|(a, _), (b, _)| a.cmp(b));

    let mut fields = Vec::new();
    let mut messages = Vec::new();
    for (field, errs) in field_errors {
        for err in errs {
            fields.push(field.to_string());
            messages.push(
                err.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{field} is invalid")),
            );
        }
    }
    (fields.join(" "), messages.join(", "))
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let kind = self.kind();

        match self {
            AppError::Validation(errors) => {
                let (fields, fields_message) = join_field_errors(&errors);
                tracing::debug!(%fields, "request rejected by validation");
                let body = ValidationExceptionDetails {
                    exception: ExceptionDetails::new(
                        status,
                        INVALID_FIELDS_TITLE,
                        INVALID_FIELDS_DETAILS.to_string(),
                        kind,
                    ),
                    fields,
                    fields_message,
                };
                (status, Json(body)).into_response()
            }
            AppError::BadRequest(msg) => {
                let body = ExceptionDetails::new(status, BAD_REQUEST_TITLE, msg, kind);
                (status, Json(body)).into_response()
            }
            AppError::MalformedBody(rejection) => {
                let body =
                    ExceptionDetails::new(status, BAD_REQUEST_TITLE, rejection.body_text(), kind);
                (status, Json(body)).into_response()
            }
            err @ AppError::Unauthorized => {
                let body = ExceptionDetails::new(status, "Unauthorized", err.to_string(), kind);
                (
                    status,
                    [(header::WWW_AUTHENTICATE, r#"Basic realm="anime""#)],
                    Json(body),
                )
                    .into_response()
            }
            err @ AppError::Forbidden => {
                let body = ExceptionDetails::new(status, "Forbidden", err.to_string(), kind);
                (status, Json(body)).into_response()
            }
            err => {
                // Details stay in the logs; the client only learns that something broke.
                tracing::error!(error = ?err, "unhandled error");
                let body = ExceptionDetails::new(
                    status,
                    "Internal Server Error",
                    "An internal error occurred".to_string(),
                    kind,
                );
                (status, Json(body)).into_response()
            }
        }
    }
}

/// ValidatedJson
///
/// JSON body extractor that runs the DTO's `Validate` impl before the handler sees it.
/// Deserialization failures become [`AppError::MalformedBody`], constraint violations
/// become [`AppError::Validation`].
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        value.validate()?;
        Ok(ValidatedJson(value))
    }
}

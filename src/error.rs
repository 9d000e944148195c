//! Error types for every layer of the directory
//!
//! Errors flow upward: `StoreError` (redb collaborator) is folded into
//! `ServiceError` (business outcomes), which the HTTP layer turns into
//! `ApiError` and finally into a JSON response.

use std::collections::BTreeMap;

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

/// Failures raised by the storage collaborator
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] redb::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("duplicate email: {0}")]
    DuplicateEmail(String),
    #[error("operation cancelled")]
    Cancelled,
}

macro_rules! redb_error_from {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for StoreError {
                fn from(err: $ty) -> Self {
                    StoreError::Database(err.into())
                }
            }
        )*
    };
}

redb_error_from!(
    redb::DatabaseError,
    redb::TransactionError,
    redb::TableError,
    redb::StorageError,
    redb::CommitError,
);

/// Every violated field of an input, keyed by its wire name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    fields: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.fields
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn messages(&self, field: &str) -> &[String] {
        self.fields.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// `Ok(value)` when nothing was recorded, otherwise `Err(self)`
    pub fn into_result<T>(self, value: T) -> Result<T, ValidationErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let fields: Vec<&str> = self.fields().collect();
        write!(f, "invalid fields: {}", fields.join(", "))
    }
}

/// Outcomes of a directory operation that are not a successful result
///
/// "Not found" is deliberately absent: lookups return `Option` instead.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation failed: {0}")]
    Validation(ValidationErrors),
    #[error("a contact with email '{email}' already exists")]
    Conflict { email: String },
    #[error("operation cancelled")]
    Cancelled,
    #[error("internal storage error")]
    Internal(#[source] StoreError),
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateEmail(email) => ServiceError::Conflict { email },
            StoreError::Cancelled => ServiceError::Cancelled,
            other => ServiceError::Internal(other),
        }
    }
}

impl From<ValidationErrors> for ServiceError {
    fn from(errors: ValidationErrors) -> Self {
        ServiceError::Validation(errors)
    }
}

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {reason}")]
    InvalidValue { var: String, reason: String },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors that can occur while installing the tracing subscriber
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("invalid log filter: {0}")]
    Filter(#[from] tracing_subscriber::filter::ParseError),
    #[error("cannot open log directory: {0}")]
    FileAppender(#[from] tracing_appender::rolling::InitError),
    #[error("subscriber already installed: {0}")]
    Subscriber(#[from] tracing_subscriber::util::TryInitError),
}

/// Errors surfaced by HTTP handlers
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
    #[error(transparent)]
    JsonBody(#[from] JsonRejection),
    #[error(transparent)]
    QueryString(#[from] QueryRejection),
    #[error(transparent)]
    PathParam(#[from] PathRejection),
}

/// JSON body returned for every failed request
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub status_code: u16,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<ValidationErrors>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, errors) = match self {
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, message, None),
            ApiError::Service(ServiceError::Validation(errors)) => (
                StatusCode::BAD_REQUEST,
                "One or more validation errors occurred".to_string(),
                Some(errors),
            ),
            ApiError::Service(err @ ServiceError::Conflict { .. }) => {
                tracing::warn!("{}", err);
                (StatusCode::CONFLICT, err.to_string(), None)
            }
            ApiError::Service(ServiceError::Cancelled) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "The request was cancelled before it completed".to_string(),
                None,
            ),
            ApiError::Service(ServiceError::Internal(err)) => {
                tracing::error!(error = %err, "storage failure");
                internal_error()
            }
            ApiError::Task(err) => {
                tracing::error!(error = %err, "blocking task failed");
                internal_error()
            }
            ApiError::JsonBody(rejection) => malformed_request(rejection.body_text()),
            ApiError::QueryString(rejection) => malformed_request(rejection.body_text()),
            ApiError::PathParam(rejection) => malformed_request(rejection.body_text()),
        };

        let body = ErrorResponse {
            status_code: status.as_u16(),
            message,
            timestamp: Utc::now(),
            errors,
        };

        (status, Json(body)).into_response()
    }
}

/// Requests axum could not decode: bad JSON, query strings or path segments
fn malformed_request(detail: String) -> (StatusCode, String, Option<ValidationErrors>) {
    tracing::debug!(%detail, "rejected malformed request");
    (StatusCode::BAD_REQUEST, detail, None)
}

fn internal_error() -> (StatusCode, String, Option<ValidationErrors>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "An internal server error occurred".to_string(),
        None,
    )
}

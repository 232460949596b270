//! Mapping of domain failures onto HTTP responses.

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tempo_auth::AuthError;
use tempo_core::error::TempoError;
use tempo_mail::DispatchError;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Store(#[from] TempoError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    /// The path names a profile other than the session's.
    #[error("forbidden")]
    Forbidden,

    /// Body or path could not be decoded.
    #[error("malformed request: {0}")]
    Malformed(String),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Malformed(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::Malformed(rejection.body_text())
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Auth(err) => match err {
                AuthError::AlreadyExists => StatusCode::CONFLICT,
                AuthError::ProfileDoesNotExist
                | AuthError::WrongPassword
                | AuthError::Unauthorized
                | AuthError::MissingCredential => StatusCode::UNAUTHORIZED,
                AuthError::NotFound => StatusCode::NOT_FOUND,
                AuthError::Validation(_) => StatusCode::BAD_REQUEST,
                AuthError::Storage | AuthError::Crypto(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Store(err) => match err {
                TempoError::NotFound { .. } => StatusCode::NOT_FOUND,
                TempoError::AlreadyExists { .. } => StatusCode::CONFLICT,
                TempoError::Validation { .. } => StatusCode::BAD_REQUEST,
                TempoError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Dispatch(DispatchError::QueueFull | DispatchError::Closed) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            ApiError::Dispatch(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::Malformed(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Client-facing message. Server-side causes never leave the process.
    pub fn message(&self) -> String {
        match self {
            ApiError::Auth(err) if err.is_invalid_credentials() => "invalid credentials".into(),
            _ if self.status().is_server_error() => match self {
                ApiError::Dispatch(err) => err.to_string(),
                _ => "internal error".into(),
            },
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!(error = %self, "Request failed");
        }

        (status, Json(json!({ "error": self.message() }))).into_response()
    }
}

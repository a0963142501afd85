// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{error, warn};

use crate::auth::AuthError;
use crate::database::DatabaseError;

/// Error rendered to the client as `{success: false, error, message}`.
#[derive(Debug)]
pub enum ApiError {
    /// Token or permission failure. The response status is always 401; the
    /// body carries the status the identity layer assigned.
    Auth(AuthError),

    /// A handler failure reported as an authorization failure.
    Unauthorized,

    NotFound,

    Unprocessable,

    InternalServerError,
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Auth(_) | ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Unprocessable => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Numeric code placed in the `error` field of the body
    pub fn error_code(&self) -> u16 {
        match self {
            ApiError::Auth(e) => e.status,
            _ => self.status_code().as_u16(),
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::Auth(e) => &e.description,
            ApiError::Unauthorized => "unauthorized",
            ApiError::NotFound => "resource not found",
            ApiError::Unprocessable => "unprocessable",
            ApiError::InternalServerError => "internal server error",
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        json!({
            "success": false,
            "error": self.error_code(),
            "message": self.message(),
        })
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status_code(), Json(self.to_json())).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        ApiError::Auth(err)
    }
}

/// Failure raised inside a drink handler, before the error policy decides
/// how it is reported.
#[derive(Debug, Error)]
pub enum DrinkError {
    #[error("resource not found")]
    NotFound,

    #[error("invalid request body: {0}")]
    InvalidBody(String),

    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error("failed to serialize response: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Maps handler failures to client errors.
///
/// The legacy service answered every failure other than a missing drink with
/// 401. That remains the default; with `collapse_to_401` off, bad bodies are
/// 422 while storage and serialization failures are 500.
#[derive(Debug, Clone, Copy)]
pub struct ErrorPolicy {
    collapse_to_401: bool,
}

impl ErrorPolicy {
    pub fn new(collapse_to_401: bool) -> Self {
        Self { collapse_to_401 }
    }

    pub fn apply(&self, err: DrinkError) -> ApiError {
        match err {
            DrinkError::NotFound | DrinkError::Database(DatabaseError::NotFound(_)) => ApiError::NotFound,
            DrinkError::InvalidBody(reason) => {
                warn!("Rejected drink request: {}", reason);
                if self.collapse_to_401 {
                    ApiError::Unauthorized
                } else {
                    ApiError::Unprocessable
                }
            }
            DrinkError::Database(e) => {
                error!("Drink store error: {}", e);
                self.server_failure()
            }
            DrinkError::Serialize(e) => {
                error!("Failed to serialize response data: {}", e);
                self.server_failure()
            }
        }
    }

    fn server_failure(&self) -> ApiError {
        if self.collapse_to_401 {
            ApiError::Unauthorized
        } else {
            ApiError::InternalServerError
        }
    }
}

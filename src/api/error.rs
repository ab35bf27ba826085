use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Everything a handler can fail with, mapped one-to-one onto the wire
/// taxonomy. Storage failures collapse into `Internal` and are logged
/// rather than classified further.
#[derive(Error, Debug)]
pub(crate) enum ApiError {
    #[error("{0}")]
    Unauthenticated(&'static str),

    #[error("User not found")]
    UserNotFound,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Category not found")]
    CategoryNotFound,

    #[error("Budget already exists for this category this month")]
    DuplicateBudget,

    #[error("Email already registered")]
    AlreadyRegistered,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("{0}")]
    Validation(String),

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

/// Error response body
#[derive(Serialize)]
pub(crate) struct ErrorResponse {
    pub(crate) error: String,
    pub(crate) code: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(ref source) = self {
            tracing::error!("internal error: {source:#}");
        }

        let (status, code) = match &self {
            ApiError::Unauthenticated(_) => (StatusCode::UNAUTHORIZED, "UNAUTHENTICATED"),
            ApiError::UserNotFound => (StatusCode::UNAUTHORIZED, "USER_NOT_FOUND"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::CategoryNotFound => (StatusCode::NOT_FOUND, "CATEGORY_NOT_FOUND"),
            ApiError::DuplicateBudget => (StatusCode::BAD_REQUEST, "DUPLICATE_BUDGET"),
            ApiError::AlreadyRegistered => (StatusCode::BAD_REQUEST, "ALREADY_REGISTERED"),
            ApiError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS"),
            ApiError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        let body = ErrorResponse {
            error: self.to_string(),
            code: code.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

/// API result type
pub(crate) type ApiResult<T> = Result<T, ApiError>;

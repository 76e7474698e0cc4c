//! HTTP error handling and response types.
//!
//! Handlers are the only place where failures become status codes.

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::db::repository::RepositoryError;
use crate::services::{FieldError, ValidationErrors};

/// Body message for storage failures; the details only go to the log.
const STORAGE_FAILURE_MESSAGE: &str = "Internal server error";

/// API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Per-field problems, only present for validation failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldError>>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            errors: None,
        }
    }

    pub fn with_errors(mut self, errors: Vec<FieldError>) -> Self {
        self.errors = Some(errors);
        self
    }
}

/// Application error type for HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    /// Resource not found
    NotFound(String),
    /// Unparseable path or body
    BadRequest(String),
    /// Payload failed field validation
    Validation(ValidationErrors),
    /// Repository error
    Repository(RepositoryError),
}

impl AppError {
    pub fn teacher_not_found() -> Self {
        AppError::NotFound("Teacher not found".to_string())
    }

    pub fn invalid_teacher_id() -> Self {
        AppError::BadRequest("Invalid teacher ID".to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, ApiError::new("NOT_FOUND", msg)),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, ApiError::new("BAD_REQUEST", msg))
            }
            AppError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                ApiError::new("VALIDATION_ERROR", "Validation error").with_errors(errors.errors),
            ),
            AppError::Repository(RepositoryError::Conflict { message, .. }) => {
                (StatusCode::BAD_REQUEST, ApiError::new("CONFLICT", message))
            }
            AppError::Repository(RepositoryError::NotFound { message, .. }) => {
                (StatusCode::NOT_FOUND, ApiError::new("NOT_FOUND", message))
            }
            AppError::Repository(e) => {
                tracing::error!(context = %e.context(), "Repository failure: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiError::new("REPOSITORY_ERROR", STORAGE_FAILURE_MESSAGE),
                )
            }
        };

        (status, Json(error)).into_response()
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        AppError::Repository(err)
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        AppError::Validation(errors)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

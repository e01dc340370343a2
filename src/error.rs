// src/error.rs

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

/// Failures raised by the quiz core (repository, submission store, grading
/// and the attempt state machine). All of them are recoverable and surface
/// to the caller unchanged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QuizError {
    /// Malformed input to an authoring, submit or grade operation.
    #[error("{0}")]
    Validation(String),

    /// The referenced quiz, submission or attempt does not exist.
    #[error("{0} not found")]
    NotFound(String),

    #[error("student '{student_id}' has already submitted quiz '{quiz_id}'")]
    DuplicateSubmission { quiz_id: String, student_id: String },

    #[error("submission of student '{student_id}' for quiz '{quiz_id}' is already graded")]
    AlreadyGraded { quiz_id: String, student_id: String },

    /// The quiz cannot be started by this student right now.
    #[error("quiz '{0}' is not open for attempts")]
    NotAvailable(String),

    /// The attempt buffer is frozen.
    #[error("the attempt no longer accepts answers")]
    SessionClosed,

    /// The quiz has submissions or running attempts, so its content is fixed.
    #[error("quiz '{0}' has submissions or running attempts")]
    QuizInUse(String),
}

impl QuizError {
    pub fn validation(msg: impl Into<String>) -> Self {
        QuizError::Validation(msg.into())
    }

    pub fn quiz_not_found(id: &str) -> Self {
        QuizError::NotFound(format!("Quiz '{id}'"))
    }
}

/// Global Application Error Enum.
/// Centralizes error handling and mapping to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    // 500 Internal Server Error
    InternalServerError(String),

    // 400 Bad Request
    BadRequest(String),

    // 401 Unauthorized
    AuthError(String),

    // 403 Forbidden
    Forbidden(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict (e.g., second submission for the same quiz)
    Conflict(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl std::error::Error for AppError {}

/// Implements `IntoResponse` for `AppError`.
/// Converts the error into a JSON response with appropriate HTTP status code.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::AuthError(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
        };
        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

/// Maps core failures onto HTTP status codes.
/// Allows using `?` on store and session calls inside handlers.
impl From<QuizError> for AppError {
    fn from(err: QuizError) -> Self {
        let msg = err.to_string();
        match err {
            QuizError::Validation(_) => AppError::BadRequest(msg),
            QuizError::NotFound(_) => AppError::NotFound(msg),
            QuizError::DuplicateSubmission { .. }
            | QuizError::AlreadyGraded { .. }
            | QuizError::SessionClosed
            | QuizError::QuizInUse(_) => AppError::Conflict(msg),
            QuizError::NotAvailable(_) => AppError::Forbidden(msg),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

/// Malformed or mistyped request bodies are client errors.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

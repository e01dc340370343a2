// src/handlers/attempt.rs

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    error::AppError,
    models::user::User,
    session::{AnswerInput, SessionManager},
};

fn require_student(user: &User) -> Result<(), AppError> {
    if user.is_admin() {
        return Err(AppError::Forbidden("Only students can take quizzes".to_string()));
    }
    Ok(())
}

/// Starts an attempt, or resumes the running one.
pub async fn start(
    State(sessions): State<Arc<SessionManager>>,
    Extension(user): Extension<User>,
    Path(quiz_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    require_student(&user)?;
    let view = sessions.start(&quiz_id, &user).await?;

    Ok((StatusCode::CREATED, Json(view)))
}

pub async fn view(
    State(sessions): State<Arc<SessionManager>>,
    Extension(user): Extension<User>,
    Path(quiz_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(sessions.view(&quiz_id, &user.id).await?))
}

pub async fn next(
    State(sessions): State<Arc<SessionManager>>,
    Extension(user): Extension<User>,
    Path(quiz_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(sessions.next(&quiz_id, &user.id).await?))
}

pub async fn previous(
    State(sessions): State<Arc<SessionManager>>,
    Extension(user): Extension<User>,
    Path(quiz_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(sessions.previous(&quiz_id, &user.id).await?))
}

/// Writes into the slot of the current question.
/// Body is `{"option_id": ..}` or `{"text": ..}`.
pub async fn answer(
    State(sessions): State<Arc<SessionManager>>,
    Extension(user): Extension<User>,
    Path(quiz_id): Path<String>,
    input: Result<Json<AnswerInput>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(input) = input?;
    Ok(Json(sessions.answer(&quiz_id, &user.id, input).await?))
}

/// Submits the attempt. Repeating the call returns the same submission.
pub async fn submit(
    State(sessions): State<Arc<SessionManager>>,
    Extension(user): Extension<User>,
    Path(quiz_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let submission = sessions.submit(&quiz_id, &user.id).await?;

    Ok(Json(submission))
}

/// Abandons the attempt without submitting.
pub async fn abandon(
    State(sessions): State<Arc<SessionManager>>,
    Extension(user): Extension<User>,
    Path(quiz_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    sessions.abandon(&quiz_id, &user.id).await?;

    Ok(StatusCode::NO_CONTENT)
}

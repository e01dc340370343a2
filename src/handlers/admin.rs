// src/handlers/admin.rs

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;

use crate::{
    error::{AppError, QuizError},
    grading,
    models::{
        quiz::{NewQuiz, QuizSummary},
        submission::GradeRequest,
    },
    session::SessionManager,
    store::SharedStore,
};

/// Lists all quizzes with their submission counts.
/// Admin only.
pub async fn list_quizzes(State(store): State<SharedStore>) -> Result<impl IntoResponse, AppError> {
    let store = store.lock().await;
    let quizzes: Vec<QuizSummary> = store
        .list_quizzes()
        .iter()
        .map(|q| QuizSummary {
            id: q.id.clone(),
            title: q.title.clone(),
            status: q.status,
            start_time: q.start_time,
            duration_minutes: q.duration_minutes,
            question_count: q.questions.len(),
            total_points: q.total_points(),
            submission_count: store.submissions().list_by_quiz(&q.id).count(),
        })
        .collect();

    Ok(Json(quizzes))
}

/// Creates a new quiz in `scheduled` status.
/// Admin only.
pub async fn create_quiz(
    State(store): State<SharedStore>,
    payload: Result<Json<NewQuiz>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = payload?;
    let quiz = store.lock().await.create_quiz(payload)?;
    tracing::info!(quiz_id = %quiz.id, title = %quiz.title, "quiz created");

    Ok((StatusCode::CREATED, Json(quiz)))
}

/// Returns a quiz including its answer keys.
/// Admin only.
pub async fn get_quiz(
    State(store): State<SharedStore>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let store = store.lock().await;
    let quiz = store.quiz(&id).ok_or_else(|| QuizError::quiz_not_found(&id))?;

    Ok(Json(quiz.clone()))
}

/// Replaces a quiz's content. Id, creation time and status are kept.
/// Refused with 409 while the quiz is being attempted or once submitted.
/// Admin only.
pub async fn update_quiz(
    State(sessions): State<Arc<SessionManager>>,
    Path(id): Path<String>,
    payload: Result<Json<NewQuiz>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = payload?;
    let quiz = sessions.update_quiz(&id, payload).await.map_err(|e| {
        tracing::warn!(quiz_id = %id, "quiz update rejected: {}", e);
        e
    })?;
    tracing::info!(quiz_id = %quiz.id, "quiz updated");

    Ok(Json(quiz))
}

/// Deletes a quiz, its submissions and any running attempts at it.
/// Admin only.
pub async fn delete_quiz(
    State(sessions): State<Arc<SessionManager>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let (quiz, discarded) = sessions.delete_quiz(&id).await?;
    tracing::info!(quiz_id = %quiz.id, discarded, "quiz deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// Lists the submissions of one quiz, in submission order.
/// Admin only.
pub async fn list_submissions(
    State(store): State<SharedStore>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let store = store.lock().await;
    if store.quiz(&id).is_none() {
        return Err(QuizError::quiz_not_found(&id).into());
    }

    Ok(Json(store.submissions_for_quiz(&id)))
}

/// Returns one submission with a per-question breakdown and suggested
/// automatic scores.
/// Admin only.
pub async fn get_submission(
    State(store): State<SharedStore>,
    Path((id, student_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let store = store.lock().await;
    let quiz = store.quiz(&id).ok_or_else(|| QuizError::quiz_not_found(&id))?;
    let submission = store
        .submission(&id, &student_id)
        .ok_or_else(|| AppError::NotFound("Submission not found".to_string()))?;

    Ok(Json(json!({
        "submission": submission,
        "total_points": quiz.total_points(),
        "questions": grading::review(quiz, submission),
    })))
}

/// Grades a submission once.
///
/// * Unawarded multiple-choice questions receive their automatic score
///   unless `auto_grade_choices` is false.
/// * Awards are clamped into each question's range.
/// Admin only.
pub async fn grade_submission(
    State(store): State<SharedStore>,
    Path((id, student_id)): Path<(String, String)>,
    req: Result<Json<GradeRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(req) = req?;
    let mut store = store.lock().await;

    let sheet = if req.auto_grade_choices {
        match (store.quiz(&id), store.submission(&id, &student_id)) {
            (Some(quiz), Some(submission)) => grading::with_auto_scores(quiz, submission, req.sheet),
            _ => req.sheet,
        }
    } else {
        req.sheet
    };

    let graded = store.grade(&id, &student_id, &sheet).map_err(|e| {
        tracing::warn!(quiz_id = %id, %student_id, "grading rejected: {}", e);
        e
    })?;
    tracing::info!(
        quiz_id = %id,
        %student_id,
        earned = ?graded.earned_points,
        total = ?graded.total_points,
        "submission graded"
    );

    Ok(Json(graded))
}

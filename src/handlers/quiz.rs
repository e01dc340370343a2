// src/handlers/quiz.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use chrono::Utc;
use serde::Serialize;

use crate::{
    availability::{DisplayState, display_state},
    error::{AppError, QuizError},
    grading::{self, QuestionReview},
    models::{quiz::PublicQuiz, submission::Submission, user::User},
    store::SharedStore,
};

/// A quiz as listed for one student.
#[derive(Debug, Serialize)]
pub struct QuizCard {
    #[serde(flatten)]
    pub quiz: PublicQuiz,
    pub display: DisplayState,
}

/// Lists every quiz with its display state for the current user.
///
/// The state is computed at request time; a scheduled quiz turns startable
/// as soon as its start time has passed.
pub async fn list_quizzes(
    State(store): State<SharedStore>,
    Extension(user): Extension<User>,
) -> Result<impl IntoResponse, AppError> {
    let now = Utc::now();
    let store = store.lock().await;
    let cards: Vec<QuizCard> = store
        .list_quizzes()
        .iter()
        .map(|quiz| QuizCard {
            quiz: PublicQuiz::from(quiz),
            display: display_state(quiz, store.submission(&quiz.id, &user.id), now),
        })
        .collect();

    Ok(Json(cards))
}

/// Returns one quiz without answer keys.
pub async fn get_quiz(
    State(store): State<SharedStore>,
    Extension(user): Extension<User>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let store = store.lock().await;
    let quiz = store.quiz(&id).ok_or_else(|| QuizError::quiz_not_found(&id))?;

    Ok(Json(QuizCard {
        quiz: PublicQuiz::from(quiz),
        display: display_state(quiz, store.submission(&id, &user.id), Utc::now()),
    }))
}

#[derive(Debug, Serialize)]
pub struct QuizResult {
    pub submission: Submission,
    pub display: DisplayState,
    /// Only present once graded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub questions: Option<Vec<QuestionReview>>,
}

/// Returns the current user's own submission for a quiz.
pub async fn get_result(
    State(store): State<SharedStore>,
    Extension(user): Extension<User>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let store = store.lock().await;
    let quiz = store.quiz(&id).ok_or_else(|| QuizError::quiz_not_found(&id))?;
    let submission = store
        .submission(&id, &user.id)
        .ok_or_else(|| AppError::NotFound("Submission not found".to_string()))?;

    Ok(Json(QuizResult {
        submission: submission.clone(),
        display: display_state(quiz, Some(submission), Utc::now()),
        questions: submission
            .is_graded
            .then(|| grading::review(quiz, submission)),
    }))
}

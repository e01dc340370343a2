// src/models/quiz.rs

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    config::SECONDS_PER_MINUTE,
    error::QuizError,
    models::question::{NewQuestion, PublicQuestion, Question},
};

/// Lifecycle status of a quiz.
///
/// The derived ordering is the lifecycle ordering; status helpers never move
/// a quiz backwards in it. `Active` is part of the ordered set but is never
/// assigned by this crate: startability is derived by
/// [`crate::availability::display_state`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum QuizStatus {
    Draft,
    Scheduled,
    Active,
    Completed,
    Graded,
}

/// The aggregate root: an authored, scheduled assessment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quiz {
    pub id: String,
    pub title: String,
    pub description: Option<String>,

    /// Time limit of one attempt, in minutes.
    pub duration_minutes: u32,

    pub start_time: DateTime<Utc>,
    pub created_at: DateTime<Utc>,

    /// Ordered; exclusively owned by the quiz.
    pub questions: Vec<Question>,

    pub status: QuizStatus,
}

impl Quiz {
    /// Sum of all question points. Derived, never stored.
    pub fn total_points(&self) -> u32 {
        self.questions.iter().map(|q| q.points).sum()
    }

    pub fn question(&self, question_id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == question_id)
    }

    /// Countdown seed for one attempt.
    pub fn duration_secs(&self) -> u32 {
        self.duration_minutes.saturating_mul(SECONDS_PER_MINUTE)
    }

    /// Checks the authoring invariants of the whole quiz.
    pub fn check(&self) -> Result<(), QuizError> {
        if self.title.trim().is_empty() {
            return Err(QuizError::validation("title must not be empty"));
        }
        if self.duration_minutes == 0 {
            return Err(QuizError::validation("duration must be positive"));
        }
        if self.questions.is_empty() {
            return Err(QuizError::validation("a quiz needs at least one question"));
        }

        let mut seen = HashSet::new();
        for question in &self.questions {
            if !seen.insert(question.id.as_str()) {
                return Err(QuizError::validation(format!(
                    "duplicate question id '{}'",
                    question.id
                )));
            }
            question.check()?;
        }
        Ok(())
    }
}

/// DTO for creating or replacing a quiz.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewQuiz {
    #[validate(length(min = 1, max = 200, message = "Title length must be between 1 and 200 chars"))]
    pub title: String,

    #[validate(length(max = 2000))]
    pub description: Option<String>,

    #[validate(range(min = 1, message = "Duration must be at least one minute"))]
    pub duration_minutes: i64,

    pub start_time: DateTime<Utc>,

    /// Must not be empty; enforced by [`Quiz::check`].
    pub questions: Vec<NewQuestion>,
}

impl NewQuiz {
    /// Validates the draft and builds the quiz record it describes.
    pub(crate) fn into_quiz(
        self,
        id: String,
        created_at: DateTime<Utc>,
        status: QuizStatus,
    ) -> Result<Quiz, QuizError> {
        self.validate()
            .map_err(|e| QuizError::validation(e.to_string()))?;

        let duration_minutes = u32::try_from(self.duration_minutes)
            .map_err(|_| QuizError::validation("duration is out of range"))?;
        let questions = self
            .questions
            .into_iter()
            .map(NewQuestion::finalize)
            .collect::<Result<Vec<_>, _>>()?;

        let quiz = Quiz {
            id,
            title: self.title,
            description: self.description.filter(|d| !d.trim().is_empty()),
            duration_minutes,
            start_time: self.start_time,
            created_at,
            questions,
            status,
        };
        quiz.check()?;
        Ok(quiz)
    }
}

/// DTO for sending a quiz to a student (no answer keys).
#[derive(Debug, Clone, Serialize)]
pub struct PublicQuiz {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub duration_minutes: u32,
    pub start_time: DateTime<Utc>,
    pub total_points: u32,
    pub questions: Vec<PublicQuestion>,
}

impl From<&Quiz> for PublicQuiz {
    fn from(quiz: &Quiz) -> Self {
        PublicQuiz {
            id: quiz.id.clone(),
            title: quiz.title.clone(),
            description: quiz.description.clone(),
            duration_minutes: quiz.duration_minutes,
            start_time: quiz.start_time,
            total_points: quiz.total_points(),
            questions: quiz.questions.iter().map(PublicQuestion::from).collect(),
        }
    }
}

/// Administrator listing row.
#[derive(Debug, Clone, Serialize)]
pub struct QuizSummary {
    pub id: String,
    pub title: String,
    pub status: QuizStatus,
    pub start_time: DateTime<Utc>,
    pub duration_minutes: u32,
    pub question_count: usize,
    pub total_points: u32,
    pub submission_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::question::QuestionKind;

    #[test]
    fn status_ordering_follows_lifecycle() {
        assert!(QuizStatus::Draft < QuizStatus::Scheduled);
        assert!(QuizStatus::Scheduled < QuizStatus::Active);
        assert!(QuizStatus::Active < QuizStatus::Completed);
        assert!(QuizStatus::Completed < QuizStatus::Graded);
    }

    #[test]
    fn new_quiz_rejects_empty_title_and_bad_duration() {
        let draft = |title: &str, duration: i64| -> NewQuiz {
            serde_json::from_value(serde_json::json!({
                "title": title,
                "duration_minutes": duration,
                "start_time": "2030-01-01T10:00:00Z",
                "questions": [{ "prompt": "Explain", "points": 5, "type": "written" }]
            }))
            .unwrap()
        };
        let now = Utc::now();

        for (title, duration) in [("", 30), ("   ", 30), ("Quiz", 0), ("Quiz", -10)] {
            let result = draft(title, duration).into_quiz("id".into(), now, QuizStatus::Scheduled);
            assert!(matches!(result, Err(QuizError::Validation(_))), "{title:?} {duration}");
        }

        let ok = draft("Quiz", 30)
            .into_quiz("id".into(), now, QuizStatus::Scheduled)
            .unwrap();
        assert_eq!(ok.duration_secs(), 30 * 60);
        assert_eq!(ok.questions[0].kind, QuestionKind::Written);
    }

    #[test]
    fn new_quiz_rejects_empty_question_list() {
        let draft: NewQuiz = serde_json::from_value(serde_json::json!({
            "title": "Empty",
            "duration_minutes": 10,
            "start_time": "2030-01-01T10:00:00Z",
            "questions": []
        }))
        .unwrap();
        let result = draft.into_quiz("id".into(), Utc::now(), QuizStatus::Scheduled);
        assert_eq!(
            result,
            Err(QuizError::validation("a quiz needs at least one question"))
        );
    }

    #[test]
    fn rejects_duplicate_question_ids() {
        let draft: NewQuiz = serde_json::from_value(serde_json::json!({
            "title": "Dupes",
            "duration_minutes": 10,
            "start_time": "2030-01-01T10:00:00Z",
            "questions": [
                { "id": "q1", "prompt": "One", "points": 5, "type": "written" },
                { "id": "q1", "prompt": "Two", "points": 5, "type": "written" }
            ]
        }))
        .unwrap();
        let result = draft.into_quiz("id".into(), Utc::now(), QuizStatus::Scheduled);
        assert!(matches!(result, Err(QuizError::Validation(_))));
    }
}

// src/availability.rs

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::{
    quiz::{Quiz, QuizStatus},
    submission::Submission,
};

/// How a quiz presents itself to one student at one instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DisplayState {
    Graded { earned_points: u32, total_points: u32 },
    AwaitingGrading,
    AvailableToStart,
    ScheduledFuture { starts_in_secs: i64 },
    Unavailable,
}

/// Maps a quiz, the student's submission (if any) and the current instant to
/// a display state.
///
/// Not cached: a scheduled quiz becomes startable purely because `now`
/// passed its start time, with no event to observe.
pub fn display_state(
    quiz: &Quiz,
    submission: Option<&Submission>,
    now: DateTime<Utc>,
) -> DisplayState {
    if let Some(sub) = submission {
        if sub.is_graded {
            return DisplayState::Graded {
                earned_points: sub.earned_points.unwrap_or(0),
                total_points: sub.total_points.unwrap_or_else(|| quiz.total_points()),
            };
        }
        return DisplayState::AwaitingGrading;
    }

    match quiz.status {
        QuizStatus::Active => DisplayState::AvailableToStart,
        QuizStatus::Scheduled if quiz.start_time <= now => DisplayState::AvailableToStart,
        QuizStatus::Scheduled => DisplayState::ScheduledFuture {
            starts_in_secs: (quiz.start_time - now).num_seconds(),
        },
        _ => DisplayState::Unavailable,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{question::Question, question::QuestionKind};
    use chrono::Duration;

    fn quiz(status: QuizStatus, start_time: DateTime<Utc>) -> Quiz {
        Quiz {
            id: "quiz1".to_string(),
            title: "General Knowledge".to_string(),
            description: None,
            duration_minutes: 30,
            start_time,
            created_at: start_time - Duration::days(1),
            questions: vec![Question {
                id: "q1".to_string(),
                prompt: "Explain".to_string(),
                points: 20,
                kind: QuestionKind::Written,
            }],
            status,
        }
    }

    fn submission(graded: bool) -> Submission {
        Submission {
            quiz_id: "quiz1".to_string(),
            student_id: "user2".to_string(),
            answers: Vec::new(),
            submitted_at: Utc::now(),
            is_graded: graded,
            total_points: graded.then_some(20),
            earned_points: graded.then_some(12),
            grades: Vec::new(),
        }
    }

    #[test]
    fn start_time_boundary_is_inclusive() {
        let now = Utc::now();
        let q = quiz(QuizStatus::Scheduled, now);
        assert_eq!(display_state(&q, None, now), DisplayState::AvailableToStart);
    }

    #[test]
    fn past_start_time_is_startable() {
        let now = Utc::now();
        let q = quiz(QuizStatus::Scheduled, now - Duration::minutes(5));
        assert_eq!(display_state(&q, None, now), DisplayState::AvailableToStart);
    }

    #[test]
    fn future_start_reports_time_until_start() {
        let now = Utc::now();
        let q = quiz(QuizStatus::Scheduled, now + Duration::hours(1));
        assert_eq!(
            display_state(&q, None, now),
            DisplayState::ScheduledFuture { starts_in_secs: 3600 }
        );
    }

    #[test]
    fn active_status_is_startable_regardless_of_time() {
        let now = Utc::now();
        let q = quiz(QuizStatus::Active, now + Duration::hours(1));
        assert_eq!(display_state(&q, None, now), DisplayState::AvailableToStart);
    }

    #[test]
    fn submission_takes_precedence() {
        let now = Utc::now();
        let q = quiz(QuizStatus::Completed, now - Duration::hours(1));

        assert_eq!(
            display_state(&q, Some(&submission(false)), now),
            DisplayState::AwaitingGrading
        );
        assert_eq!(
            display_state(&q, Some(&submission(true)), now),
            DisplayState::Graded {
                earned_points: 12,
                total_points: 20
            }
        );
    }

    #[test]
    fn other_statuses_are_unavailable() {
        let now = Utc::now();
        for status in [QuizStatus::Draft, QuizStatus::Completed, QuizStatus::Graded] {
            let q = quiz(status, now - Duration::hours(1));
            assert_eq!(display_state(&q, None, now), DisplayState::Unavailable);
        }
    }
}

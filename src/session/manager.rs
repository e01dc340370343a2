// src/session/manager.rs

use std::{
    collections::HashMap,
    sync::{Arc, Weak},
    time::Duration,
};

use chrono::Utc;
use tokio::{
    sync::Mutex,
    task::JoinHandle,
    time::{self, Instant},
};

use crate::{
    availability::{DisplayState, display_state},
    config::SESSION_TICK,
    error::QuizError,
    models::{
        quiz::{NewQuiz, Quiz},
        submission::Submission,
        user::User,
    },
    session::{AnswerInput, QuizSession, SessionView},
    store::SharedStore,
};

/// `(quiz_id, student_id)`
type SessionKey = (String, String);

struct ActiveSession {
    session: QuizSession,
    /// Countdown task; aborted when the attempt is dropped.
    ticker: Option<JoinHandle<()>>,
}

impl Drop for ActiveSession {
    fn drop(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
    }
}

/// Registry of running attempts.
///
/// Lock order is always registry first, store second.
pub struct SessionManager {
    sessions: Mutex<HashMap<SessionKey, ActiveSession>>,
    store: SharedStore,
    tick: Duration,
}

fn key(quiz_id: &str, student_id: &str) -> SessionKey {
    (quiz_id.to_string(), student_id.to_string())
}

fn attempt_not_found(quiz_id: &str) -> QuizError {
    QuizError::NotFound(format!("Attempt at quiz '{quiz_id}'"))
}

impl SessionManager {
    pub fn new(store: SharedStore) -> Arc<Self> {
        Self::with_tick(store, SESSION_TICK)
    }

    pub fn with_tick(store: SharedStore, tick: Duration) -> Arc<Self> {
        Arc::new(SessionManager {
            sessions: Mutex::new(HashMap::new()),
            store,
            tick,
        })
    }

    /// Starts an attempt, or returns the running one unchanged.
    pub async fn start(self: &Arc<Self>, quiz_id: &str, student: &User) -> Result<SessionView, QuizError> {
        let key = key(quiz_id, &student.id);
        let mut sessions = self.sessions.lock().await;
        if let Some(active) = sessions.get(&key) {
            return Ok(active.session.view());
        }

        let session = {
            let store = self.store.lock().await;
            let quiz = store
                .quiz(quiz_id)
                .ok_or_else(|| QuizError::quiz_not_found(quiz_id))?;
            if store.submission(quiz_id, &student.id).is_some() {
                return Err(QuizError::DuplicateSubmission {
                    quiz_id: quiz_id.to_string(),
                    student_id: student.id.clone(),
                });
            }
            if display_state(quiz, None, Utc::now()) != DisplayState::AvailableToStart {
                return Err(QuizError::NotAvailable(quiz_id.to_string()));
            }
            QuizSession::start(quiz, student)?
        };

        let view = session.view();
        let ticker = self.spawn_ticker(key.clone());
        sessions.insert(
            key,
            ActiveSession {
                session,
                ticker: Some(ticker),
            },
        );
        tracing::info!(quiz_id, student_id = %student.id, "attempt started");
        Ok(view)
    }

    fn spawn_ticker(self: &Arc<Self>, key: SessionKey) -> JoinHandle<()> {
        let manager: Weak<Self> = Arc::downgrade(self);
        let period = self.tick;
        tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            loop {
                interval.tick().await;
                let Some(manager) = manager.upgrade() else {
                    break;
                };
                if manager.on_tick(&key).await {
                    break;
                }
            }
        })
    }

    /// Returns true once the attempt is gone and the ticker should stop.
    async fn on_tick(&self, key: &SessionKey) -> bool {
        let mut sessions = self.sessions.lock().await;
        let Some(active) = sessions.get_mut(key) else {
            return true;
        };
        let Some(answers) = active.session.tick() else {
            return false;
        };

        let Some(mut active) = sessions.remove(key) else {
            return true;
        };
        // This task is the ticker; detach it instead of aborting itself.
        drop(active.ticker.take());

        let (quiz_id, student_id) = key;
        let result = self.store.lock().await.submit(quiz_id, student_id, answers);
        active.session.terminate();
        match result {
            Ok(_) => tracing::info!(%quiz_id, %student_id, "time expired, attempt submitted"),
            Err(e) => tracing::warn!(%quiz_id, %student_id, "forced submit failed: {}", e),
        }
        true
    }

    pub async fn view(&self, quiz_id: &str, student_id: &str) -> Result<SessionView, QuizError> {
        let sessions = self.sessions.lock().await;
        sessions
            .get(&key(quiz_id, student_id))
            .map(|active| active.session.view())
            .ok_or_else(|| attempt_not_found(quiz_id))
    }

    pub async fn next(&self, quiz_id: &str, student_id: &str) -> Result<SessionView, QuizError> {
        self.with_session(quiz_id, student_id, |s| {
            s.next();
            Ok(())
        })
        .await
    }

    pub async fn previous(&self, quiz_id: &str, student_id: &str) -> Result<SessionView, QuizError> {
        self.with_session(quiz_id, student_id, |s| {
            s.previous();
            Ok(())
        })
        .await
    }

    pub async fn answer(
        &self,
        quiz_id: &str,
        student_id: &str,
        input: AnswerInput,
    ) -> Result<SessionView, QuizError> {
        self.with_session(quiz_id, student_id, |s| s.record(input)).await
    }

    async fn with_session<F>(&self, quiz_id: &str, student_id: &str, f: F) -> Result<SessionView, QuizError>
    where
        F: FnOnce(&mut QuizSession) -> Result<(), QuizError>,
    {
        let mut sessions = self.sessions.lock().await;
        let active = sessions
            .get_mut(&key(quiz_id, student_id))
            .ok_or_else(|| attempt_not_found(quiz_id))?;
        f(&mut active.session)?;
        Ok(active.session.view())
    }

    /// Submits the running attempt on the student's confirmation.
    ///
    /// If the attempt was already submitted (by the countdown or an earlier
    /// call), the stored submission is returned instead. If the store
    /// refuses the answers, the attempt keeps running with its buffer intact.
    pub async fn submit(&self, quiz_id: &str, student_id: &str) -> Result<Submission, QuizError> {
        let key = key(quiz_id, student_id);
        let mut sessions = self.sessions.lock().await;
        let Some(active) = sessions.get(&key) else {
            return self
                .store
                .lock()
                .await
                .submission(quiz_id, student_id)
                .cloned()
                .ok_or_else(|| attempt_not_found(quiz_id));
        };
        if !active.session.is_running() {
            return Err(QuizError::SessionClosed);
        }

        let answers = active.session.pending_answers();
        let submission = self
            .store
            .lock()
            .await
            .submit(quiz_id, student_id, answers)
            .map_err(|e| {
                tracing::warn!(quiz_id, student_id, "submit rejected: {}", e);
                e
            })?;

        // Dropping the attempt aborts its ticker.
        if let Some(mut active) = sessions.remove(&key) {
            active.session.submit();
            active.session.terminate();
        }
        tracing::info!(quiz_id, student_id, "attempt submitted");
        Ok(submission)
    }

    /// Ends an attempt without submitting anything.
    pub async fn abandon(&self, quiz_id: &str, student_id: &str) -> Result<(), QuizError> {
        self.sessions
            .lock()
            .await
            .remove(&key(quiz_id, student_id))
            .map(|_| tracing::info!(quiz_id, student_id, "attempt abandoned"))
            .ok_or_else(|| attempt_not_found(quiz_id))
    }

    /// Replaces a quiz's content. Refused while anyone is attempting the
    /// quiz or once it has a submission.
    pub async fn update_quiz(&self, quiz_id: &str, data: NewQuiz) -> Result<Quiz, QuizError> {
        let sessions = self.sessions.lock().await;
        if sessions.keys().any(|(q, _)| q == quiz_id) {
            return Err(QuizError::QuizInUse(quiz_id.to_string()));
        }
        let quiz = self.store.lock().await.update_quiz(quiz_id, data)?;
        drop(sessions);
        Ok(quiz)
    }

    /// Deletes a quiz together with its submissions and running attempts.
    /// Returns the quiz and how many attempts were discarded.
    pub async fn delete_quiz(&self, quiz_id: &str) -> Result<(Quiz, usize), QuizError> {
        let mut sessions = self.sessions.lock().await;
        let quiz = self.store.lock().await.delete_quiz(quiz_id)?;
        let before = sessions.len();
        sessions.retain(|(q, _), _| q != quiz_id);
        Ok((quiz, before - sessions.len()))
    }

    pub async fn active_count(&self) -> usize {
        self.sessions.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::{
            question::{AnswerOption, Question, QuestionKind},
            quiz::{Quiz, QuizStatus},
            user::Role,
        },
        session::SessionPhase,
        store::QuizStore,
    };
    use chrono::Duration as ChronoDuration;

    fn student(id: &str) -> User {
        User {
            id: id.to_string(),
            name: format!("Student {id}"),
            email: format!("{id}@example.com"),
            role: Role::Student,
        }
    }

    fn store_with_quiz(start_offset: ChronoDuration) -> SharedStore {
        let mut store = QuizStore::new();
        store
            .insert_quiz(Quiz {
                id: "quiz1".to_string(),
                title: "Timed".to_string(),
                description: None,
                duration_minutes: 1,
                start_time: Utc::now() + start_offset,
                created_at: Utc::now(),
                questions: vec![Question {
                    id: "q1".to_string(),
                    prompt: "Pick".to_string(),
                    points: 10,
                    kind: QuestionKind::MultipleChoice {
                        options: vec![
                            AnswerOption {
                                id: "a".to_string(),
                                text: "A".to_string(),
                                is_correct: true,
                            },
                            AnswerOption {
                                id: "b".to_string(),
                                text: "B".to_string(),
                                is_correct: false,
                            },
                        ],
                    },
                }],
                status: QuizStatus::Scheduled,
            })
            .unwrap();
        store.into_shared()
    }

    fn choice(id: &str) -> AnswerInput {
        AnswerInput::Choice {
            option_id: id.to_string(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn countdown_forces_single_submission() {
        let store = store_with_quiz(-ChronoDuration::minutes(5));
        let manager = SessionManager::new(store.clone());
        let s = student("user2");

        manager.start("quiz1", &s).await.unwrap();
        manager.answer("quiz1", &s.id, choice("a")).await.unwrap();

        time::sleep(std::time::Duration::from_secs(61)).await;

        assert_eq!(manager.active_count().await, 0);
        let store_guard = store.lock().await;
        let sub = store_guard.submission("quiz1", &s.id).expect("auto-submitted");
        assert_eq!(sub.answer_for("q1"), Some("a"));
        assert_eq!(store_guard.quiz("quiz1").unwrap().status, QuizStatus::Completed);
    }

    #[tokio::test(start_paused = true)]
    async fn manual_submit_racing_timeout_records_one_submission() {
        let store = store_with_quiz(-ChronoDuration::minutes(5));
        let manager = SessionManager::new(store.clone());
        let s = student("user2");

        manager.start("quiz1", &s).await.unwrap();
        time::sleep(std::time::Duration::from_secs(60)).await;

        let submission = manager.submit("quiz1", &s.id).await.unwrap();
        let again = manager.submit("quiz1", &s.id).await.unwrap();
        assert_eq!(submission, again);
        assert_eq!(store.lock().await.submissions_for_quiz("quiz1").len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn restart_resumes_without_resetting_countdown() {
        let manager = SessionManager::new(store_with_quiz(-ChronoDuration::minutes(5)));
        let s = student("user2");

        manager.start("quiz1", &s).await.unwrap();
        time::sleep(std::time::Duration::from_millis(10_500)).await;

        let view = manager.start("quiz1", &s).await.unwrap();
        assert_eq!(view.remaining_secs, 50);
        assert_eq!(manager.active_count().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn abandon_cancels_without_submitting() {
        let store = store_with_quiz(-ChronoDuration::minutes(5));
        let manager = SessionManager::new(store.clone());
        let s = student("user2");

        manager.start("quiz1", &s).await.unwrap();
        manager.abandon("quiz1", &s.id).await.unwrap();
        time::sleep(std::time::Duration::from_secs(120)).await;

        assert!(store.lock().await.submission("quiz1", &s.id).is_none());
        assert!(matches!(
            manager.submit("quiz1", &s.id).await,
            Err(QuizError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn start_refused_before_start_time_or_after_submission() {
        let store = store_with_quiz(ChronoDuration::hours(1));
        let manager = SessionManager::new(store.clone());
        assert!(matches!(
            manager.start("quiz1", &student("user2")).await,
            Err(QuizError::NotAvailable(_))
        ));

        let store = store_with_quiz(-ChronoDuration::minutes(1));
        store
            .lock()
            .await
            .submit("quiz1", "user2", Vec::new())
            .unwrap();
        let manager = SessionManager::new(store);
        assert!(matches!(
            manager.start("quiz1", &student("user2")).await,
            Err(QuizError::DuplicateSubmission { .. })
        ));
    }

    fn renamed_question() -> NewQuiz {
        serde_json::from_value(serde_json::json!({
            "title": "Timed",
            "duration_minutes": 1,
            "start_time": "2020-01-01T00:00:00Z",
            "questions": [{
                "id": "q1-renamed",
                "prompt": "Pick",
                "points": 10,
                "type": "multiple_choice",
                "options": [
                    { "id": "a", "text": "A", "is_correct": true },
                    { "id": "b", "text": "B" }
                ]
            }]
        }))
        .unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn edit_is_refused_while_attempt_runs() {
        let store = store_with_quiz(-ChronoDuration::minutes(5));
        let manager = SessionManager::new(store.clone());
        let s = student("user2");

        manager.start("quiz1", &s).await.unwrap();
        manager.answer("quiz1", &s.id, choice("a")).await.unwrap();
        assert_eq!(
            manager.update_quiz("quiz1", renamed_question()).await,
            Err(QuizError::QuizInUse("quiz1".to_string()))
        );

        time::sleep(std::time::Duration::from_secs(61)).await;

        let store_guard = store.lock().await;
        assert_eq!(store_guard.submissions_for_quiz("quiz1").len(), 1);
        let sub = store_guard.submission("quiz1", &s.id).unwrap();
        assert_eq!(sub.answer_for("q1"), Some("a"));
        drop(store_guard);

        // Still refused: the submission refers to q1.
        assert!(matches!(
            manager.update_quiz("quiz1", renamed_question()).await,
            Err(QuizError::QuizInUse(_))
        ));
    }

    #[tokio::test]
    async fn edit_is_allowed_before_anyone_starts() {
        let store = store_with_quiz(ChronoDuration::hours(1));
        let manager = SessionManager::new(store.clone());

        let quiz = manager.update_quiz("quiz1", renamed_question()).await.unwrap();
        assert_eq!(quiz.questions[0].id, "q1-renamed");
        assert!(matches!(
            manager.update_quiz("nope", renamed_question()).await,
            Err(QuizError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn delete_quiz_discards_running_attempts() {
        let store = store_with_quiz(-ChronoDuration::minutes(5));
        let manager = SessionManager::new(store.clone());
        manager.start("quiz1", &student("user2")).await.unwrap();
        manager.start("quiz1", &student("user3")).await.unwrap();

        let (quiz, discarded) = manager.delete_quiz("quiz1").await.unwrap();
        assert_eq!(quiz.id, "quiz1");
        assert_eq!(discarded, 2);
        assert_eq!(manager.active_count().await, 0);
        assert!(store.lock().await.quiz("quiz1").is_none());

        assert!(matches!(
            manager.delete_quiz("quiz1").await,
            Err(QuizError::NotFound(_))
        ));
        assert!(matches!(
            manager.start("quiz1", &student("user2")).await,
            Err(QuizError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn rejected_submit_keeps_attempt_running() {
        let store = store_with_quiz(-ChronoDuration::minutes(5));
        let manager = SessionManager::new(store.clone());
        let s = student("user2");

        manager.start("quiz1", &s).await.unwrap();
        manager.answer("quiz1", &s.id, choice("a")).await.unwrap();

        // A submission recorded behind the registry's back makes the store refuse.
        store.lock().await.submit("quiz1", &s.id, Vec::new()).unwrap();

        assert!(matches!(
            manager.submit("quiz1", &s.id).await,
            Err(QuizError::DuplicateSubmission { .. })
        ));
        assert_eq!(manager.active_count().await, 1);
        let view = manager.view("quiz1", &s.id).await.unwrap();
        assert_eq!(view.phase, SessionPhase::Running);
        assert_eq!(view.current_answer, "a");
    }
}

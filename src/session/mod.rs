// src/session/mod.rs

//! Timed attempts.
//!
//! [`QuizSession`] is the synchronous state machine of one attempt;
//! [`SessionManager`] drives the countdown of every running attempt and
//! hands finished buffers to the store.

mod manager;

pub use manager::SessionManager;

use serde::{Deserialize, Serialize};

use crate::{
    error::QuizError,
    models::{
        question::{PublicQuestion, Question, QuestionKind},
        quiz::Quiz,
        submission::Answer,
        user::User,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    Initializing,
    Running,
    Submitting,
    Terminated,
}

/// A student's write into the slot of the current question.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AnswerInput {
    Choice { option_id: String },
    Text { text: String },
}

/// One in-flight attempt of one student at one quiz.
#[derive(Debug, Clone)]
pub struct QuizSession {
    quiz_id: String,
    student_id: String,
    questions: Vec<Question>,
    current: usize,
    /// One slot per question, in quiz order.
    answers: Vec<Answer>,
    remaining_secs: u32,
    phase: SessionPhase,
}

impl QuizSession {
    /// Seeds an empty answer buffer and the countdown, then starts running.
    pub fn start(quiz: &Quiz, student: &User) -> Result<Self, QuizError> {
        if quiz.questions.is_empty() {
            return Err(QuizError::validation(format!(
                "quiz '{}' has no questions",
                quiz.id
            )));
        }

        let mut session = QuizSession {
            quiz_id: quiz.id.clone(),
            student_id: student.id.clone(),
            questions: quiz.questions.clone(),
            current: 0,
            answers: quiz
                .questions
                .iter()
                .map(|q| Answer::new(q.id.clone(), ""))
                .collect(),
            remaining_secs: quiz.duration_secs(),
            phase: SessionPhase::Initializing,
        };
        session.phase = SessionPhase::Running;
        Ok(session)
    }

    pub fn quiz_id(&self) -> &str {
        &self.quiz_id
    }

    pub fn student_id(&self) -> &str {
        &self.student_id
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase == SessionPhase::Running
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    pub fn answers(&self) -> &[Answer] {
        &self.answers
    }

    pub fn current_question(&self) -> &Question {
        &self.questions[self.current]
    }

    pub fn answered_count(&self) -> usize {
        self.answers.iter().filter(|a| !a.is_blank()).count()
    }

    /// Advances the countdown by one second. Returns the frozen answers when
    /// time runs out, which moves the attempt into `Submitting`.
    pub fn tick(&mut self) -> Option<Vec<Answer>> {
        if !self.is_running() {
            return None;
        }
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs == 0 {
            return self.submit();
        }
        None
    }

    /// Moves to the next question; a no-op on the last one.
    pub fn next(&mut self) {
        if self.is_running() && self.current + 1 < self.questions.len() {
            self.current += 1;
        }
    }

    /// Moves to the previous question; a no-op on the first one.
    pub fn previous(&mut self) {
        if self.is_running() && self.current > 0 {
            self.current -= 1;
        }
    }

    /// Overwrites the slot of the current question.
    pub fn record(&mut self, input: AnswerInput) -> Result<(), QuizError> {
        if !self.is_running() {
            return Err(QuizError::SessionClosed);
        }

        let question = &self.questions[self.current];
        let value = match (&question.kind, input) {
            (QuestionKind::MultipleChoice { .. }, AnswerInput::Choice { option_id }) => {
                if question.option(&option_id).is_none() {
                    return Err(QuizError::validation(format!(
                        "question '{}' has no option '{}'",
                        question.id, option_id
                    )));
                }
                option_id
            }
            (QuestionKind::Written, AnswerInput::Text { text }) => text,
            (QuestionKind::MultipleChoice { .. }, AnswerInput::Text { .. }) => {
                return Err(QuizError::validation(format!(
                    "question '{}' expects an option id",
                    question.id
                )));
            }
            (QuestionKind::Written, AnswerInput::Choice { .. }) => {
                return Err(QuizError::validation(format!(
                    "question '{}' expects a written answer",
                    question.id
                )));
            }
        };

        self.answers[self.current].answer = value;
        Ok(())
    }

    /// Freezes the buffer and returns the non-blank answers.
    ///
    /// Only the first call while running yields answers; later calls return
    /// `None`, so a timeout and a manual submit cannot both submit.
    pub fn submit(&mut self) -> Option<Vec<Answer>> {
        if !self.is_running() {
            return None;
        }
        self.phase = SessionPhase::Submitting;
        Some(self.pending_answers())
    }

    /// The non-blank answers as they would be submitted now.
    pub fn pending_answers(&self) -> Vec<Answer> {
        self.answers
            .iter()
            .filter(|a| !a.is_blank())
            .cloned()
            .collect()
    }

    pub fn terminate(&mut self) {
        self.phase = SessionPhase::Terminated;
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            quiz_id: self.quiz_id.clone(),
            phase: self.phase,
            current_index: self.current,
            question_count: self.questions.len(),
            remaining_secs: self.remaining_secs,
            answered_count: self.answered_count(),
            current_question: PublicQuestion::from(self.current_question()),
            current_answer: self.answers[self.current].answer.clone(),
        }
    }
}

/// Snapshot of an attempt as shown to the student.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub quiz_id: String,
    pub phase: SessionPhase,
    pub current_index: usize,
    pub question_count: usize,
    pub remaining_secs: u32,
    pub answered_count: usize,
    pub current_question: PublicQuestion,
    pub current_answer: String,
}

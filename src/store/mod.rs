// src/store/mod.rs

//! In-memory state of one deployment: the quiz repository and the
//! submission store, owned together and handed to callers explicitly.

pub mod quiz_repo;
pub mod submission_store;

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::{
    error::QuizError,
    models::{
        quiz::{NewQuiz, Quiz},
        submission::{Answer, GradeSheet, Submission},
    },
};

pub use quiz_repo::QuizRepository;
pub use submission_store::SubmissionStore;

/// Handle shared by the HTTP layer and the attempt runtime.
pub type SharedStore = Arc<Mutex<QuizStore>>;

#[derive(Debug, Default)]
pub struct QuizStore {
    quizzes: QuizRepository,
    submissions: SubmissionStore,
}

impl QuizStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_shared(self) -> SharedStore {
        Arc::new(Mutex::new(self))
    }

    pub fn submissions(&self) -> &SubmissionStore {
        &self.submissions
    }

    pub fn list_quizzes(&self) -> &[Quiz] {
        self.quizzes.list()
    }

    pub fn quiz(&self, id: &str) -> Option<&Quiz> {
        self.quizzes.get(id)
    }

    pub fn create_quiz(&mut self, data: NewQuiz) -> Result<Quiz, QuizError> {
        self.quizzes.create(data)
    }

    pub fn insert_quiz(&mut self, quiz: Quiz) -> Result<(), QuizError> {
        self.quizzes.insert(quiz)
    }

    /// Replaces a quiz's content, keeping its id, creation time and status.
    ///
    /// Refused once the quiz has a submission: stored answers and grades
    /// refer to its question ids.
    pub fn update_quiz(&mut self, id: &str, data: NewQuiz) -> Result<Quiz, QuizError> {
        let (created_at, status) = self
            .quizzes
            .get(id)
            .map(|q| (q.created_at, q.status))
            .ok_or_else(|| QuizError::quiz_not_found(id))?;
        if self.submissions.list_by_quiz(id).next().is_some() {
            return Err(QuizError::QuizInUse(id.to_string()));
        }

        let quiz = data.into_quiz(id.to_string(), created_at, status)?;
        self.quizzes.update(quiz)
    }

    /// Removes a quiz together with all of its submissions.
    pub fn delete_quiz(&mut self, id: &str) -> Result<Quiz, QuizError> {
        let quiz = self.quizzes.delete(id)?;
        self.submissions.remove_quiz(id);
        Ok(quiz)
    }

    pub fn submit(
        &mut self,
        quiz_id: &str,
        student_id: &str,
        answers: Vec<Answer>,
    ) -> Result<Submission, QuizError> {
        self.submissions
            .submit(&mut self.quizzes, quiz_id, student_id, answers)
    }

    pub fn insert_submission(&mut self, submission: Submission) -> Result<(), QuizError> {
        if self.quizzes.get(&submission.quiz_id).is_none() {
            return Err(QuizError::quiz_not_found(&submission.quiz_id));
        }
        self.submissions.insert(submission)
    }

    pub fn submission(&self, quiz_id: &str, student_id: &str) -> Option<&Submission> {
        self.submissions.find(quiz_id, student_id)
    }

    pub fn submissions_for_quiz(&self, quiz_id: &str) -> Vec<Submission> {
        self.submissions.list_by_quiz(quiz_id).cloned().collect()
    }

    pub fn grade(
        &mut self,
        quiz_id: &str,
        student_id: &str,
        sheet: &GradeSheet,
    ) -> Result<Submission, QuizError> {
        self.submissions
            .grade(&mut self.quizzes, quiz_id, student_id, sheet)
    }
}

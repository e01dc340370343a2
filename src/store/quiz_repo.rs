// src/store/quiz_repo.rs

use chrono::Utc;

use crate::{
    error::QuizError,
    models::quiz::{NewQuiz, Quiz, QuizStatus},
};

/// Owns every quiz, in creation order.
#[derive(Debug, Default)]
pub struct QuizRepository {
    quizzes: Vec<Quiz>,
}

impl QuizRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates an authored quiz, assigns it a fresh id and stores it as
    /// `scheduled`.
    pub fn create(&mut self, data: NewQuiz) -> Result<Quiz, QuizError> {
        let id = loop {
            let candidate = uuid::Uuid::new_v4().to_string();
            if self.get(&candidate).is_none() {
                break candidate;
            }
        };
        let quiz = data.into_quiz(id, Utc::now(), QuizStatus::Scheduled)?;
        self.quizzes.push(quiz.clone());
        Ok(quiz)
    }

    /// Stores a fully formed quiz as-is (used for seeding).
    pub fn insert(&mut self, quiz: Quiz) -> Result<(), QuizError> {
        quiz.check()?;
        if self.get(&quiz.id).is_some() {
            return Err(QuizError::validation(format!(
                "quiz id '{}' already exists",
                quiz.id
            )));
        }
        self.quizzes.push(quiz);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&Quiz> {
        self.quizzes.iter().find(|q| q.id == id)
    }

    pub fn list(&self) -> &[Quiz] {
        &self.quizzes
    }

    /// Replaces the stored quiz with the same id, keeping its position.
    pub fn update(&mut self, quiz: Quiz) -> Result<Quiz, QuizError> {
        quiz.check()?;
        let slot = self
            .quizzes
            .iter_mut()
            .find(|q| q.id == quiz.id)
            .ok_or_else(|| QuizError::quiz_not_found(&quiz.id))?;
        *slot = quiz;
        Ok(slot.clone())
    }

    pub fn delete(&mut self, id: &str) -> Result<Quiz, QuizError> {
        let index = self
            .quizzes
            .iter()
            .position(|q| q.id == id)
            .ok_or_else(|| QuizError::quiz_not_found(id))?;
        Ok(self.quizzes.remove(index))
    }

    pub(crate) fn mark_completed(&mut self, id: &str) {
        self.advance(id, QuizStatus::Completed);
    }

    pub(crate) fn mark_graded(&mut self, id: &str) {
        self.advance(id, QuizStatus::Graded);
    }

    /// Moves a quiz forward to `target`; never backwards, absent ids are ignored.
    fn advance(&mut self, id: &str, target: QuizStatus) {
        if let Some(quiz) = self.quizzes.iter_mut().find(|q| q.id == id) {
            if quiz.status < target {
                quiz.status = target;
            }
        }
    }
}

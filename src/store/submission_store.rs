// src/store/submission_store.rs

use std::collections::HashSet;

use chrono::Utc;

use crate::{
    error::QuizError,
    grading,
    models::submission::{Answer, GradeSheet, Submission},
    store::quiz_repo::QuizRepository,
};

/// Owns every submission, in submission order.
/// At most one submission exists per `(quiz_id, student_id)`.
#[derive(Debug, Default)]
pub struct SubmissionStore {
    submissions: Vec<Submission>,
}

impl SubmissionStore {
    /// Records a student's answers and marks the quiz completed.
    ///
    /// Blank answers are dropped before storing.
    pub fn submit(
        &mut self,
        quizzes: &mut QuizRepository,
        quiz_id: &str,
        student_id: &str,
        answers: Vec<Answer>,
    ) -> Result<Submission, QuizError> {
        if self.find(quiz_id, student_id).is_some() {
            return Err(QuizError::DuplicateSubmission {
                quiz_id: quiz_id.to_string(),
                student_id: student_id.to_string(),
            });
        }
        let quiz = quizzes
            .get(quiz_id)
            .ok_or_else(|| QuizError::quiz_not_found(quiz_id))?;

        let mut seen = HashSet::new();
        for answer in &answers {
            if quiz.question(&answer.question_id).is_none() {
                return Err(QuizError::validation(format!(
                    "answer for unknown question '{}'",
                    answer.question_id
                )));
            }
            if !seen.insert(answer.question_id.as_str()) {
                return Err(QuizError::validation(format!(
                    "question '{}' answered twice",
                    answer.question_id
                )));
            }
        }

        let submission = Submission {
            quiz_id: quiz_id.to_string(),
            student_id: student_id.to_string(),
            answers: answers.into_iter().filter(|a| !a.is_blank()).collect(),
            submitted_at: Utc::now(),
            is_graded: false,
            total_points: None,
            earned_points: None,
            grades: Vec::new(),
        };
        self.submissions.push(submission.clone());
        quizzes.mark_completed(quiz_id);
        Ok(submission)
    }

    /// Stores a submission as-is (used for seeding).
    pub fn insert(&mut self, submission: Submission) -> Result<(), QuizError> {
        if self.find(&submission.quiz_id, &submission.student_id).is_some() {
            return Err(QuizError::DuplicateSubmission {
                quiz_id: submission.quiz_id,
                student_id: submission.student_id,
            });
        }
        self.submissions.push(submission);
        Ok(())
    }

    pub fn find(&self, quiz_id: &str, student_id: &str) -> Option<&Submission> {
        self.submissions
            .iter()
            .find(|s| s.quiz_id == quiz_id && s.student_id == student_id)
    }

    pub fn list_by_quiz<'a>(&'a self, quiz_id: &'a str) -> impl Iterator<Item = &'a Submission> + 'a {
        self.submissions.iter().filter(move |s| s.quiz_id == quiz_id)
    }

    /// Grades a submission exactly once and marks the quiz graded.
    pub fn grade(
        &mut self,
        quizzes: &mut QuizRepository,
        quiz_id: &str,
        student_id: &str,
        sheet: &GradeSheet,
    ) -> Result<Submission, QuizError> {
        let submission = self
            .submissions
            .iter_mut()
            .find(|s| s.quiz_id == quiz_id && s.student_id == student_id)
            .ok_or_else(|| {
                QuizError::NotFound(format!(
                    "Submission of student '{student_id}' for quiz '{quiz_id}'"
                ))
            })?;

        if submission.is_graded {
            return Err(QuizError::AlreadyGraded {
                quiz_id: quiz_id.to_string(),
                student_id: student_id.to_string(),
            });
        }

        let quiz = quizzes
            .get(quiz_id)
            .ok_or_else(|| QuizError::quiz_not_found(quiz_id))?;
        let tally = grading::aggregate(quiz, &sheet.awards)?;

        submission.grades = grading::question_grades(&tally, sheet);
        submission.total_points = Some(tally.total_points);
        submission.earned_points = Some(tally.earned_points);
        submission.is_graded = true;
        let graded = submission.clone();

        quizzes.mark_graded(quiz_id);
        Ok(graded)
    }

    /// Drops every submission of a quiz; returns how many were removed.
    pub(crate) fn remove_quiz(&mut self, quiz_id: &str) -> usize {
        let before = self.submissions.len();
        self.submissions.retain(|s| s.quiz_id != quiz_id);
        before - self.submissions.len()
    }
}

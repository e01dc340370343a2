// src/models/submission.rs

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One answer slot. `answer` is an option id for multiple-choice questions
/// and free text for written ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub question_id: String,
    pub answer: String,
}

impl Answer {
    pub fn new(question_id: impl Into<String>, answer: impl Into<String>) -> Self {
        Answer {
            question_id: question_id.into(),
            answer: answer.into(),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.answer.trim().is_empty()
    }
}

/// Points awarded for one question when a submission was graded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionGrade {
    pub question_id: String,
    pub earned_points: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
}

/// One student's recorded attempt at one quiz.
/// Identified by `(quiz_id, student_id)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub quiz_id: String,
    pub student_id: String,

    /// Non-blank answers only; an unanswered question has no entry.
    pub answers: Vec<Answer>,

    pub submitted_at: DateTime<Utc>,
    pub is_graded: bool,

    /// Populated once graded.
    pub total_points: Option<u32>,
    pub earned_points: Option<u32>,

    #[serde(default)]
    pub grades: Vec<QuestionGrade>,
}

impl Submission {
    pub fn answer_for(&self, question_id: &str) -> Option<&str> {
        self.answers
            .iter()
            .find(|a| a.question_id == question_id)
            .map(|a| a.answer.as_str())
    }

    pub fn grade_for(&self, question_id: &str) -> Option<&QuestionGrade> {
        self.grades.iter().find(|g| g.question_id == question_id)
    }
}

/// Administrator input for grading one submission.
///
/// `awards` maps question id to awarded points; values outside
/// `[0, question.points]` are clamped. `feedback` is optional per question.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GradeSheet {
    #[serde(default)]
    pub awards: HashMap<String, i64>,
    #[serde(default)]
    pub feedback: HashMap<String, String>,
}

impl GradeSheet {
    pub fn with_award(mut self, question_id: impl Into<String>, points: i64) -> Self {
        self.awards.insert(question_id.into(), points);
        self
    }
}

fn default_true() -> bool {
    true
}

/// DTO for the grade endpoint.
#[derive(Debug, Deserialize)]
pub struct GradeRequest {
    #[serde(flatten)]
    pub sheet: GradeSheet,

    /// Fill missing multiple-choice awards with their automatic score.
    #[serde(default = "default_true")]
    pub auto_grade_choices: bool,
}

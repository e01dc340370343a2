// src/models/question.rs

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::QuizError;

/// A selectable answer of a multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerOption {
    /// Unique within its question.
    pub id: String,
    pub text: String,
    pub is_correct: bool,
}

/// Question type tag. Only multiple-choice questions carry options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QuestionKind {
    MultipleChoice { options: Vec<AnswerOption> },
    Written,
}

/// A single prompt owned by exactly one quiz.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,

    /// The text shown to the student.
    pub prompt: String,

    /// Maximum points awarded for this question.
    pub points: u32,

    #[serde(flatten)]
    pub kind: QuestionKind,
}

impl Question {
    pub fn is_multiple_choice(&self) -> bool {
        matches!(self.kind, QuestionKind::MultipleChoice { .. })
    }

    /// Options in authoring order; empty for written questions.
    pub fn options(&self) -> &[AnswerOption] {
        match &self.kind {
            QuestionKind::MultipleChoice { options } => options,
            QuestionKind::Written => &[],
        }
    }

    pub fn option(&self, option_id: &str) -> Option<&AnswerOption> {
        self.options().iter().find(|o| o.id == option_id)
    }

    /// Checks the authoring invariants of a finalized question.
    pub fn check(&self) -> Result<(), QuizError> {
        if self.prompt.trim().is_empty() {
            return Err(QuizError::validation(format!(
                "question '{}': prompt must not be empty",
                self.id
            )));
        }
        if self.points == 0 {
            return Err(QuizError::validation(format!(
                "question '{}': points must be positive",
                self.id
            )));
        }

        let QuestionKind::MultipleChoice { options } = &self.kind else {
            return Ok(());
        };

        if options.len() < 2 {
            return Err(QuizError::validation(format!(
                "question '{}': multiple-choice questions need at least 2 options",
                self.id
            )));
        }

        let mut seen = HashSet::new();
        for option in options {
            if option.text.trim().is_empty() {
                return Err(QuizError::validation(format!(
                    "question '{}': option text must not be empty",
                    self.id
                )));
            }
            if !seen.insert(option.id.as_str()) {
                return Err(QuizError::validation(format!(
                    "question '{}': duplicate option id '{}'",
                    self.id, option.id
                )));
            }
        }

        let correct = options.iter().filter(|o| o.is_correct).count();
        if correct != 1 {
            return Err(QuizError::validation(format!(
                "question '{}': exactly one option must be correct, found {}",
                self.id, correct
            )));
        }

        Ok(())
    }
}

/// DTO for sending an option to a student (excludes the correctness flag).
#[derive(Debug, Clone, Serialize)]
pub struct PublicOption {
    pub id: String,
    pub text: String,
}

/// DTO for sending a question to a student.
#[derive(Debug, Clone, Serialize)]
pub struct PublicQuestion {
    pub id: String,
    #[serde(rename = "type")]
    pub question_type: &'static str,
    pub prompt: String,
    pub points: u32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<PublicOption>,
}

impl From<&Question> for PublicQuestion {
    fn from(q: &Question) -> Self {
        let question_type = match q.kind {
            QuestionKind::MultipleChoice { .. } => "multiple_choice",
            QuestionKind::Written => "written",
        };
        PublicQuestion {
            id: q.id.clone(),
            question_type,
            prompt: q.prompt.clone(),
            points: q.points,
            options: q
                .options()
                .iter()
                .map(|o| PublicOption {
                    id: o.id.clone(),
                    text: o.text.clone(),
                })
                .collect(),
        }
    }
}

/// DTO for authoring an option. The id is generated when omitted.
#[derive(Debug, Clone, Deserialize)]
pub struct NewOption {
    pub id: Option<String>,
    pub text: String,
    #[serde(default)]
    pub is_correct: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NewQuestionKind {
    MultipleChoice { options: Vec<NewOption> },
    Written,
}

/// DTO for authoring a question. The id is generated when omitted.
#[derive(Debug, Clone, Deserialize)]
pub struct NewQuestion {
    pub id: Option<String>,
    pub prompt: String,
    pub points: i64,
    #[serde(flatten)]
    pub kind: NewQuestionKind,
}

fn fresh_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

impl NewQuestion {
    /// Assigns missing ids and finalizes the question.
    pub fn finalize(self) -> Result<Question, QuizError> {
        let id = self.id.unwrap_or_else(fresh_id);
        let points = u32::try_from(self.points).map_err(|_| {
            QuizError::validation(format!("question '{id}': points must be positive"))
        })?;

        let kind = match self.kind {
            NewQuestionKind::Written => QuestionKind::Written,
            NewQuestionKind::MultipleChoice { options } => QuestionKind::MultipleChoice {
                options: options
                    .into_iter()
                    .map(|o| AnswerOption {
                        id: o.id.unwrap_or_else(fresh_id),
                        text: o.text,
                        is_correct: o.is_correct,
                    })
                    .collect(),
            },
        };

        let question = Question {
            id,
            prompt: self.prompt,
            points,
            kind,
        };
        question.check()?;
        Ok(question)
    }
}

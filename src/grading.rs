// src/grading.rs

//! Scoring rules. Everything here is a pure function of its inputs.

use std::collections::HashMap;

use serde::Serialize;

use crate::{
    error::QuizError,
    models::{
        question::Question,
        quiz::Quiz,
        submission::{GradeSheet, QuestionGrade, Submission},
    },
};

/// True iff `question` is multiple-choice and `answer` names its correct option.
pub fn is_multiple_choice_correct(question: &Question, answer: Option<&str>) -> bool {
    answer
        .and_then(|id| question.option(id))
        .is_some_and(|option| option.is_correct)
}

/// Automatic score of a multiple-choice answer; `None` for written questions,
/// which are only ever scored by an administrator.
pub fn auto_score(question: &Question, answer: Option<&str>) -> Option<u32> {
    if !question.is_multiple_choice() {
        return None;
    }
    Some(if is_multiple_choice_correct(question, answer) {
        question.points
    } else {
        0
    })
}

/// Clamps an awarded value into `[0, question.points]`.
pub fn clamp_award(question: &Question, awarded: i64) -> u32 {
    awarded.clamp(0, i64::from(question.points)) as u32
}

/// Result of reducing a set of awards against a quiz.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tally {
    /// Sum of every question's points on the quiz.
    pub total_points: u32,
    /// Sum of the clamped awards.
    pub earned_points: u32,
    /// Clamped award per question, in quiz order; unawarded questions earn 0.
    pub per_question: Vec<(String, u32)>,
}

/// Totals a set of per-question awards. Awards naming a question that is
/// not on the quiz are rejected.
pub fn aggregate(quiz: &Quiz, awards: &HashMap<String, i64>) -> Result<Tally, QuizError> {
    if let Some(unknown) = awards.keys().find(|id| quiz.question(id).is_none()) {
        return Err(QuizError::validation(format!(
            "award for unknown question '{unknown}'"
        )));
    }

    let per_question: Vec<(String, u32)> = quiz
        .questions
        .iter()
        .map(|q| {
            let earned = awards.get(&q.id).map_or(0, |&a| clamp_award(q, a));
            (q.id.clone(), earned)
        })
        .collect();

    Ok(Tally {
        total_points: quiz.total_points(),
        earned_points: per_question.iter().map(|(_, p)| p).sum(),
        per_question,
    })
}

/// Fills every multiple-choice question the sheet leaves unawarded with its
/// automatic score. Explicit awards are kept as given.
pub fn with_auto_scores(quiz: &Quiz, submission: &Submission, mut sheet: GradeSheet) -> GradeSheet {
    for question in &quiz.questions {
        if sheet.awards.contains_key(&question.id) {
            continue;
        }
        if let Some(score) = auto_score(question, submission.answer_for(&question.id)) {
            sheet.awards.insert(question.id.clone(), i64::from(score));
        }
    }
    sheet
}

/// Builds the per-question grade records stored on a graded submission.
pub fn question_grades(tally: &Tally, sheet: &GradeSheet) -> Vec<QuestionGrade> {
    tally
        .per_question
        .iter()
        .map(|(id, earned)| QuestionGrade {
            question_id: id.clone(),
            earned_points: *earned,
            feedback: sheet
                .feedback
                .get(id)
                .map(|f| f.trim().to_string())
                .filter(|f| !f.is_empty()),
        })
        .collect()
}

/// Per-question breakdown of one submission, for grading and results views.
#[derive(Debug, Clone, Serialize)]
pub struct QuestionReview {
    pub question_id: String,
    pub prompt: String,
    pub points: u32,
    pub answer: Option<String>,
    /// Only set for multiple-choice questions.
    pub is_correct: Option<bool>,
    pub auto_score: Option<u32>,
    /// Only set once graded.
    pub earned_points: Option<u32>,
    pub feedback: Option<String>,
}

pub fn review(quiz: &Quiz, submission: &Submission) -> Vec<QuestionReview> {
    quiz.questions
        .iter()
        .map(|q| {
            let answer = submission.answer_for(&q.id);
            let grade = submission.grade_for(&q.id);
            QuestionReview {
                question_id: q.id.clone(),
                prompt: q.prompt.clone(),
                points: q.points,
                answer: answer.map(str::to_string),
                is_correct: q
                    .is_multiple_choice()
                    .then(|| is_multiple_choice_correct(q, answer)),
                auto_score: auto_score(q, answer),
                earned_points: grade.map(|g| g.earned_points),
                feedback: grade.and_then(|g| g.feedback.clone()),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        question::{AnswerOption, QuestionKind},
        quiz::QuizStatus,
        submission::Answer,
    };
    use chrono::Utc;

    fn mcq(id: &str, points: u32) -> Question {
        Question {
            id: id.to_string(),
            prompt: format!("Prompt {id}"),
            points,
            kind: QuestionKind::MultipleChoice {
                options: vec![
                    AnswerOption {
                        id: format!("{id}-a"),
                        text: "A".to_string(),
                        is_correct: true,
                    },
                    AnswerOption {
                        id: format!("{id}-b"),
                        text: "B".to_string(),
                        is_correct: false,
                    },
                ],
            },
        }
    }

    fn written(id: &str, points: u32) -> Question {
        Question {
            id: id.to_string(),
            prompt: format!("Prompt {id}"),
            points,
            kind: QuestionKind::Written,
        }
    }

    fn quiz(questions: Vec<Question>) -> Quiz {
        Quiz {
            id: "quiz".to_string(),
            title: "Quiz".to_string(),
            description: None,
            duration_minutes: 10,
            start_time: Utc::now(),
            created_at: Utc::now(),
            questions,
            status: QuizStatus::Completed,
        }
    }

    fn submission(answers: Vec<Answer>) -> Submission {
        Submission {
            quiz_id: "quiz".to_string(),
            student_id: "student".to_string(),
            answers,
            submitted_at: Utc::now(),
            is_graded: false,
            total_points: None,
            earned_points: None,
            grades: Vec::new(),
        }
    }

    #[test]
    fn multiple_choice_correctness() {
        let q = mcq("q1", 10);
        assert!(is_multiple_choice_correct(&q, Some("q1-a")));
        assert!(!is_multiple_choice_correct(&q, Some("q1-b")));
        assert!(!is_multiple_choice_correct(&q, Some("nope")));
        assert!(!is_multiple_choice_correct(&q, None));
        assert!(!is_multiple_choice_correct(&written("q2", 5), Some("q1-a")));
    }

    #[test]
    fn auto_score_only_for_multiple_choice() {
        let q = mcq("q1", 10);
        assert_eq!(auto_score(&q, Some("q1-a")), Some(10));
        assert_eq!(auto_score(&q, Some("q1-b")), Some(0));
        assert_eq!(auto_score(&written("q2", 5), Some("anything")), None);
    }

    #[test]
    fn aggregate_counts_unawarded_questions_in_total() {
        let quiz = quiz(vec![mcq("q1", 10), written("q2", 20), written("q3", 25)]);
        let awards = HashMap::from([("q1".to_string(), 10), ("q2".to_string(), 5)]);

        let tally = aggregate(&quiz, &awards).unwrap();
        assert_eq!(tally.total_points, 55);
        assert_eq!(tally.earned_points, 15);
        assert_eq!(tally.per_question[2], ("q3".to_string(), 0));
    }

    #[test]
    fn aggregate_clamps_awards() {
        let quiz = quiz(vec![mcq("q1", 10), written("q2", 20)]);
        let awards = HashMap::from([("q1".to_string(), 999), ("q2".to_string(), -4)]);

        let tally = aggregate(&quiz, &awards).unwrap();
        assert_eq!(tally.earned_points, 10);
        assert_eq!(tally.per_question[1].1, 0);
    }

    #[test]
    fn clamp_award_handles_extremes() {
        let q = written("q1", 20);
        assert_eq!(clamp_award(&q, i64::MIN), 0);
        assert_eq!(clamp_award(&q, 7), 7);
        assert_eq!(clamp_award(&q, i64::MAX), 20);
    }

    #[test]
    fn aggregate_rejects_unknown_question() {
        let quiz = quiz(vec![mcq("q1", 10)]);
        let awards = HashMap::from([("ghost".to_string(), 1)]);
        assert!(matches!(aggregate(&quiz, &awards), Err(QuizError::Validation(_))));
    }

    #[test]
    fn auto_scores_fill_only_missing_choice_awards() {
        let quiz = quiz(vec![mcq("q1", 10), mcq("q2", 10), written("q3", 20)]);
        let sub = submission(vec![Answer::new("q1", "q1-a"), Answer::new("q2", "q2-a")]);
        let sheet = GradeSheet::default().with_award("q2", 3);

        let filled = with_auto_scores(&quiz, &sub, sheet);
        assert_eq!(filled.awards["q1"], 10);
        assert_eq!(filled.awards["q2"], 3);
        assert!(!filled.awards.contains_key("q3"));
    }

    #[test]
    fn review_reports_answers_and_correctness() {
        let quiz = quiz(vec![mcq("q1", 10), written("q2", 20)]);
        let sub = submission(vec![Answer::new("q1", "q1-b")]);

        let rows = review(&quiz, &sub);
        assert_eq!(rows[0].is_correct, Some(false));
        assert_eq!(rows[0].auto_score, Some(0));
        assert_eq!(rows[1].answer, None);
        assert_eq!(rows[1].is_correct, None);
        assert_eq!(rows[1].earned_points, None);
    }
}

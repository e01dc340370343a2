// src/fixtures.rs

//! Sample data a fresh deployment can start from.

use chrono::{DateTime, Duration, Utc};

use crate::{
    error::QuizError,
    models::{
        question::{AnswerOption, Question, QuestionKind},
        quiz::{Quiz, QuizStatus},
        submission::{Answer, Submission},
        user::{Role, User},
    },
    store::QuizStore,
};

pub fn users() -> Vec<User> {
    let user = |id: &str, name: &str, email: &str, role| User {
        id: id.to_string(),
        name: name.to_string(),
        email: email.to_string(),
        role,
    };
    vec![
        user("user1", "Admin User", "admin@example.com", Role::Admin),
        user("user2", "Student One", "student1@example.com", Role::Student),
        user("user3", "Student Two", "student2@example.com", Role::Student),
    ]
}

fn multiple_choice(id: &str, prompt: &str, choices: [&str; 4], correct: usize) -> Question {
    Question {
        id: id.to_string(),
        prompt: prompt.to_string(),
        points: 10,
        kind: QuestionKind::MultipleChoice {
            options: choices
                .iter()
                .enumerate()
                .map(|(i, text)| AnswerOption {
                    id: format!("{id}-opt{}", i + 1),
                    text: text.to_string(),
                    is_correct: i == correct,
                })
                .collect(),
        },
    }
}

fn written(id: &str, prompt: &str, points: u32) -> Question {
    Question {
        id: id.to_string(),
        prompt: prompt.to_string(),
        points,
        kind: QuestionKind::Written,
    }
}

/// The sample question bank.
pub fn questions() -> Vec<Question> {
    vec![
        multiple_choice(
            "q1",
            "What is the capital of France?",
            ["Paris", "London", "Berlin", "Madrid"],
            0,
        ),
        written("q2", "Explain the concept of object-oriented programming.", 20),
        multiple_choice(
            "q3",
            "Which language is primarily used for web development?",
            ["Python", "JavaScript", "Java", "C++"],
            1,
        ),
        written("q4", "Describe the process of photosynthesis.", 25),
        multiple_choice(
            "q5",
            "What is the smallest planet in our solar system?",
            ["Earth", "Mars", "Mercury", "Venus"],
            2,
        ),
    ]
}

pub fn quizzes(now: DateTime<Utc>) -> Vec<Quiz> {
    let bank = questions();
    let quiz = |id: &str, title: &str, description: &str, duration, start, qs: &[Question], status| Quiz {
        id: id.to_string(),
        title: title.to_string(),
        description: Some(description.to_string()),
        duration_minutes: duration,
        start_time: start,
        created_at: now,
        questions: qs.to_vec(),
        status,
    };
    vec![
        quiz(
            "quiz1",
            "General Knowledge Quiz",
            "Test your knowledge on various subjects",
            30,
            now + Duration::days(1),
            &bank[0..3],
            QuizStatus::Scheduled,
        ),
        // Already open: startability is derived from the past start time.
        quiz(
            "quiz2",
            "Science Fundamentals",
            "Basic science concepts test",
            45,
            now - Duration::hours(1),
            &bank[..],
            QuizStatus::Scheduled,
        ),
        quiz(
            "quiz3",
            "Programming Basics",
            "Test your programming knowledge",
            20,
            now - Duration::days(3),
            &bank[1..4],
            QuizStatus::Completed,
        ),
    ]
}

pub fn submissions(now: DateTime<Utc>) -> Vec<Submission> {
    vec![Submission {
        quiz_id: "quiz3".to_string(),
        student_id: "user2".to_string(),
        answers: vec![
            Answer::new(
                "q2",
                "Object-oriented programming is a programming paradigm based on the concept of objects.",
            ),
            Answer::new("q3", "q3-opt2"),
            Answer::new(
                "q4",
                "Photosynthesis is the process by which plants make food using sunlight.",
            ),
        ],
        submitted_at: now - Duration::days(2),
        is_graded: false,
        total_points: None,
        earned_points: None,
        grades: Vec::new(),
    }]
}

/// Loads the sample quizzes and submission into `store`.
pub fn seed(store: &mut QuizStore, now: DateTime<Utc>) -> Result<(), QuizError> {
    for quiz in quizzes(now) {
        store.insert_quiz(quiz)?;
    }
    for submission in submissions(now) {
        store.insert_submission(submission)?;
    }
    Ok(())
}

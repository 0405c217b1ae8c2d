// src/handlers/attempt.rs

use std::collections::HashMap;

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::{
    error::AppError,
    models::{
        question::{Question, QuestionView},
        quiz::Quiz,
    },
    utils::jwt::Claims,
};

/// Payload rendered when a user starts a quiz: the questions (without answer
/// keys) and the computed deadline.
#[derive(Debug, Serialize)]
pub struct AttemptView {
    pub quiz: Quiz,
    pub questions: Vec<QuestionView>,
    pub deadline: DateTime<Utc>,
}

/// DTO for submitting a quiz attempt.
/// Keys are question ids as strings, values the selected option (expected
/// numeric, as posted by the form).
#[derive(Debug, Deserialize)]
pub struct SubmitAttemptRequest {
    pub answers: HashMap<String, String>,
}

/// Outcome of grading one submission.
#[derive(Debug, PartialEq, Eq)]
struct GradeResult {
    correct_count: i64,
    total_questions: i64,
    /// Percentage in 0..=100, floor of correct/total.
    total_score: i64,
}

/// Grades a submission against the quiz's questions.
///
/// An unanswered question counts as incorrect. An answer that does not parse
/// as an integer aborts the whole submission. Answer keys that match no
/// question are ignored. A quiz with no questions grades to 0.
fn grade_submission(
    questions: &[Question],
    answers: &HashMap<String, String>,
) -> Result<GradeResult, AppError> {
    let mut correct_count = 0;

    for question in questions {
        let Some(raw) = answers.get(&question.id.to_string()) else {
            continue;
        };

        let selected: i64 = raw.trim().parse().map_err(|_| {
            tracing::warn!(
                "Unparsable answer '{}' for question {}",
                raw,
                question.id
            );
            AppError::BadRequest("Something went wrong".to_string())
        })?;

        if selected == question.correct_option {
            correct_count += 1;
        }
    }

    let total_questions = questions.len() as i64;
    let total_score = if total_questions > 0 {
        (100 * correct_count) / total_questions
    } else {
        0
    };

    Ok(GradeResult {
        correct_count,
        total_questions,
        total_score,
    })
}

async fn fetch_quiz(pool: &SqlitePool, quiz_id: i64) -> Result<Quiz, AppError> {
    sqlx::query_as::<_, Quiz>(
        "SELECT id, chapter_id, date_of_quiz, time_duration, remarks FROM quizzes WHERE id = ?",
    )
    .bind(quiz_id)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::NotFound("The quiz does not exist".to_string()))
}

async fn fetch_questions(pool: &SqlitePool, quiz_id: i64) -> Result<Vec<Question>, AppError> {
    // Creation order, so questions render the way the admin entered them.
    let questions = sqlx::query_as::<_, Question>(
        r#"
        SELECT id, quiz_id, statement, options, correct_option
        FROM questions
        WHERE quiz_id = ?
        ORDER BY id ASC
        "#,
    )
    .bind(quiz_id)
    .fetch_all(pool)
    .await?;

    Ok(questions)
}

/// Lists all quizzes, for the user dashboard.
pub async fn list_quizzes(
    State(pool): State<SqlitePool>,
    Extension(_claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let quizzes = sqlx::query_as::<_, Quiz>(
        r#"
        SELECT id, chapter_id, date_of_quiz, time_duration, remarks
        FROM quizzes
        ORDER BY date_of_quiz ASC, id ASC
        "#,
    )
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to list quizzes: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(Json(quizzes))
}

/// Starts a quiz attempt.
///
/// Loads the quiz's questions and computes the deadline as now + duration.
/// The deadline is not persisted: reloading this view restarts the clock, and
/// a submission after the deadline still grades normally.
pub async fn begin_attempt(
    State(pool): State<SqlitePool>,
    Extension(_claims): Extension<Claims>,
    Path(quiz_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let quiz = fetch_quiz(&pool, quiz_id).await?;
    let questions = fetch_questions(&pool, quiz_id).await?;

    let deadline = Utc::now() + Duration::minutes(quiz.time_duration);

    Ok(Json(AttemptView {
        quiz,
        questions: questions.into_iter().map(QuestionView::from).collect(),
        deadline,
    }))
}

/// Submits a user's answers for a quiz and records the score.
///
/// * Grades the answers against the quiz's questions.
/// * Persists exactly one Score row per successful call; repeat attempts
///   append independent rows.
/// * On an unparsable answer nothing is persisted.
pub async fn submit_attempt(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(quiz_id): Path<i64>,
    Json(req): Json<SubmitAttemptRequest>,
) -> Result<impl IntoResponse, AppError> {
    fetch_quiz(&pool, quiz_id).await?;
    let questions = fetch_questions(&pool, quiz_id).await?;

    let result = grade_submission(&questions, &req.answers)?;

    sqlx::query(
        r#"
        INSERT INTO scores (quiz_id, user_id, time_stamp_of_attempt, total_score)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(quiz_id)
    .bind(claims.user_id())
    .bind(Utc::now())
    .bind(result.total_score)
    .execute(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to insert score: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(Json(serde_json::json!({
        "total_score": result.total_score,
        "correct_count": result.correct_count,
        "total_questions": result.total_questions,
        "message": "Quiz successfully submitted. You can check your score in the 'Score' Tab"
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::types::Json as SqlxJson;

    fn question(id: i64, correct_option: i64) -> Question {
        Question {
            id,
            quiz_id: 1,
            statement: format!("Question {}", id),
            options: SqlxJson(vec![
                "A".to_string(),
                "B".to_string(),
                "C".to_string(),
                "D".to_string(),
            ]),
            correct_option,
        }
    }

    fn answers(entries: &[(i64, &str)]) -> HashMap<String, String> {
        entries
            .iter()
            .map(|(id, v)| (id.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn all_correct_scores_hundred() {
        let questions = vec![question(1, 2), question(2, 3), question(3, 1)];
        let result =
            grade_submission(&questions, &answers(&[(1, "2"), (2, "3"), (3, "1")])).unwrap();
        assert_eq!(result.correct_count, 3);
        assert_eq!(result.total_score, 100);
    }

    #[test]
    fn all_wrong_scores_zero() {
        let questions = vec![question(1, 2), question(2, 3)];
        let result = grade_submission(&questions, &answers(&[(1, "1"), (2, "4")])).unwrap();
        assert_eq!(result.correct_count, 0);
        assert_eq!(result.total_score, 0);
    }

    #[test]
    fn missing_answers_count_as_incorrect() {
        let questions = vec![question(1, 2), question(2, 3)];
        let result = grade_submission(&questions, &answers(&[(1, "2")])).unwrap();
        assert_eq!(result.correct_count, 1);
        assert_eq!(result.total_score, 50);

        let result = grade_submission(&questions, &HashMap::new()).unwrap();
        assert_eq!(result.total_score, 0);
    }

    #[test]
    fn empty_quiz_scores_zero() {
        let result = grade_submission(&[], &answers(&[(1, "2")])).unwrap();
        assert_eq!(result.total_questions, 0);
        assert_eq!(result.total_score, 0);
    }

    #[test]
    fn percentage_is_floored() {
        // Correct options [2, 3, 1]; two of three answered correctly.
        let questions = vec![question(1, 2), question(2, 3), question(3, 1)];
        let result =
            grade_submission(&questions, &answers(&[(1, "2"), (2, "4"), (3, "1")])).unwrap();
        assert_eq!(result.correct_count, 2);
        assert_eq!(result.total_score, 66);
    }

    #[test]
    fn unparsable_answer_aborts_grading() {
        let questions = vec![question(1, 2), question(2, 3)];
        let result = grade_submission(&questions, &answers(&[(1, "2"), (2, "banana")]));
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[test]
    fn unknown_answer_keys_are_ignored() {
        let questions = vec![question(1, 2)];
        let result = grade_submission(&questions, &answers(&[(1, "2"), (99, "junk")])).unwrap();
        assert_eq!(result.correct_count, 1);
        assert_eq!(result.total_score, 100);
    }
}

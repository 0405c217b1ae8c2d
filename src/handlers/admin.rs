// src/handlers/admin.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        chapter::{Chapter, ChapterRequest},
        question::{Question, QuestionRequest},
        quiz::{Quiz, QuizRequest},
        subject::{Subject, SubjectListParams, SubjectRequest},
        user::User,
    },
};

fn map_unique_violation(e: sqlx::Error, what: &str, name: &str) -> AppError {
    if e.to_string().contains("UNIQUE constraint failed") {
        AppError::Conflict(format!("{} '{}' already exists", what, name))
    } else {
        tracing::error!("Database error: {:?}", e);
        AppError::from(e)
    }
}

async fn ensure_exists(
    pool: &SqlitePool,
    table: &str,
    id: i64,
    missing: &str,
) -> Result<(), AppError> {
    // `table` is always a compile-time constant from the callers below.
    let found = sqlx::query_scalar::<_, i64>(&format!("SELECT id FROM {} WHERE id = ?", table))
        .bind(id)
        .fetch_optional(pool)
        .await?;

    found
        .map(|_| ())
        .ok_or(AppError::NotFound(missing.to_string()))
}

/// Lists all users in the system.
/// Admin only.
pub async fn list_users(State(pool): State<SqlitePool>) -> Result<impl IntoResponse, AppError> {
    let users = sqlx::query_as::<_, User>(
        r#"
        SELECT id, username, password, name, qualification, is_admin
        FROM users
        ORDER BY id DESC
        "#,
    )
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to list users: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(Json(users))
}

/// Lists subjects, optionally filtered by a case-insensitive name substring.
/// Admin only.
pub async fn list_subjects(
    State(pool): State<SqlitePool>,
    Query(params): Query<SubjectListParams>,
) -> Result<impl IntoResponse, AppError> {
    let pattern = format!("%{}%", params.q.unwrap_or_default());

    let subjects = sqlx::query_as::<_, Subject>(
        r#"
        SELECT id, name, description
        FROM subjects
        WHERE name LIKE ?
        ORDER BY id ASC
        "#,
    )
    .bind(pattern)
    .fetch_all(&pool)
    .await?;

    Ok(Json(subjects))
}

/// Creates a new subject.
/// Admin only.
pub async fn create_subject(
    State(pool): State<SqlitePool>,
    Json(payload): Json<SubjectRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let subject = sqlx::query_as::<_, Subject>(
        r#"
        INSERT INTO subjects (name, description)
        VALUES (?, ?)
        RETURNING id, name, description
        "#,
    )
    .bind(&payload.name)
    .bind(&payload.description)
    .fetch_one(&pool)
    .await
    .map_err(|e| map_unique_violation(e, "Subject", &payload.name))?;

    Ok((StatusCode::CREATED, Json(subject)))
}

/// Replaces a subject's name and description.
/// Admin only.
pub async fn update_subject(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
    Json(payload): Json<SubjectRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let result = sqlx::query("UPDATE subjects SET name = ?, description = ? WHERE id = ?")
        .bind(&payload.name)
        .bind(&payload.description)
        .bind(id)
        .execute(&pool)
        .await
        .map_err(|e| map_unique_violation(e, "Subject", &payload.name))?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Subject not found".to_string()));
    }

    Ok(StatusCode::OK)
}

/// Deletes a subject by ID.
/// Admin only. Chapters, quizzes, questions and scores underneath are
/// removed by the cascade.
pub async fn delete_subject(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let result = sqlx::query("DELETE FROM subjects WHERE id = ?")
        .bind(id)
        .execute(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete subject: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Subject not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Creates a new chapter under a subject.
/// Admin only.
pub async fn create_chapter(
    State(pool): State<SqlitePool>,
    Path(subject_id): Path<i64>,
    Json(payload): Json<ChapterRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    ensure_exists(&pool, "subjects", subject_id, "Subject not found").await?;

    let chapter = sqlx::query_as::<_, Chapter>(
        r#"
        INSERT INTO chapters (subject_id, name, description)
        VALUES (?, ?, ?)
        RETURNING id, subject_id, name, description
        "#,
    )
    .bind(subject_id)
    .bind(&payload.name)
    .bind(&payload.description)
    .fetch_one(&pool)
    .await
    .map_err(|e| map_unique_violation(e, "Chapter", &payload.name))?;

    Ok((StatusCode::CREATED, Json(chapter)))
}

/// Replaces a chapter's name and description.
/// Admin only.
pub async fn update_chapter(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
    Json(payload): Json<ChapterRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let result = sqlx::query("UPDATE chapters SET name = ?, description = ? WHERE id = ?")
        .bind(&payload.name)
        .bind(&payload.description)
        .bind(id)
        .execute(&pool)
        .await
        .map_err(|e| map_unique_violation(e, "Chapter", &payload.name))?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Chapter not found".to_string()));
    }

    Ok(StatusCode::OK)
}

/// Deletes a chapter by ID. Cascades to its quizzes.
/// Admin only.
pub async fn delete_chapter(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let result = sqlx::query("DELETE FROM chapters WHERE id = ?")
        .bind(id)
        .execute(&pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Chapter not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Creates a new quiz under a chapter.
/// Admin only.
pub async fn create_quiz(
    State(pool): State<SqlitePool>,
    Path(chapter_id): Path<i64>,
    Json(payload): Json<QuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    ensure_exists(&pool, "chapters", chapter_id, "Chapter not found").await?;

    let quiz = sqlx::query_as::<_, Quiz>(
        r#"
        INSERT INTO quizzes (chapter_id, date_of_quiz, time_duration, remarks)
        VALUES (?, ?, ?, ?)
        RETURNING id, chapter_id, date_of_quiz, time_duration, remarks
        "#,
    )
    .bind(chapter_id)
    .bind(payload.date_of_quiz)
    .bind(payload.time_duration)
    .bind(&payload.remarks)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to create quiz: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok((StatusCode::CREATED, Json(quiz)))
}

/// Replaces a quiz's schedule, duration and remarks.
/// Admin only.
pub async fn update_quiz(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
    Json(payload): Json<QuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let result = sqlx::query(
        "UPDATE quizzes SET date_of_quiz = ?, time_duration = ?, remarks = ? WHERE id = ?",
    )
    .bind(payload.date_of_quiz)
    .bind(payload.time_duration)
    .bind(&payload.remarks)
    .bind(id)
    .execute(&pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("The quiz does not exist".to_string()));
    }

    Ok(StatusCode::OK)
}

/// Deletes a quiz by ID. Cascades to its questions and scores.
/// Admin only.
pub async fn delete_quiz(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let result = sqlx::query("DELETE FROM quizzes WHERE id = ?")
        .bind(id)
        .execute(&pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("The quiz does not exist".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Creates a new question under a quiz.
/// Admin only.
pub async fn create_question(
    State(pool): State<SqlitePool>,
    Path(quiz_id): Path<i64>,
    Json(payload): Json<QuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    ensure_exists(&pool, "quizzes", quiz_id, "The quiz does not exist").await?;

    let options_json = serde_json::to_string(&payload.options)?;

    let question = sqlx::query_as::<_, Question>(
        r#"
        INSERT INTO questions (quiz_id, statement, options, correct_option)
        VALUES (?, ?, ?, ?)
        RETURNING id, quiz_id, statement, options, correct_option
        "#,
    )
    .bind(quiz_id)
    .bind(&payload.statement)
    .bind(options_json)
    .bind(payload.correct_option)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to create question: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok((StatusCode::CREATED, Json(question)))
}

/// Replaces a question's statement, options and answer key.
/// Admin only.
pub async fn update_question(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
    Json(payload): Json<QuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let options_json = serde_json::to_string(&payload.options)?;

    let result = sqlx::query(
        "UPDATE questions SET statement = ?, options = ?, correct_option = ? WHERE id = ?",
    )
    .bind(&payload.statement)
    .bind(options_json)
    .bind(payload.correct_option)
    .bind(id)
    .execute(&pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Question not found".to_string()));
    }

    Ok(StatusCode::OK)
}

/// Deletes a question by ID.
/// Admin only.
pub async fn delete_question(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let result = sqlx::query("DELETE FROM questions WHERE id = ?")
        .bind(id)
        .execute(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete question: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Question not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

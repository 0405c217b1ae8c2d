// src/models/quiz.rs

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'quizzes' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Quiz {
    pub id: i64,

    /// Owning chapter.
    pub chapter_id: i64,

    /// The day the quiz is scheduled for.
    pub date_of_quiz: NaiveDate,

    /// Duration of an attempt in minutes. Always positive.
    pub time_duration: i64,

    pub remarks: Option<String>,
}

/// DTO for creating or replacing a quiz under a chapter.
#[derive(Debug, Deserialize, Validate)]
pub struct QuizRequest {
    pub date_of_quiz: NaiveDate,
    #[validate(range(min = 1, message = "Duration must be a positive number of minutes."))]
    pub time_duration: i64,
    #[validate(length(max = 2000))]
    pub remarks: Option<String>,
}

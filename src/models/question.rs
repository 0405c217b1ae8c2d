// src/models/question.rs

use serde::{Deserialize, Serialize};
use sqlx::{prelude::FromRow, types::Json};
use validator::Validate;

/// Represents the 'questions' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,

    /// Owning quiz.
    pub quiz_id: i64,

    /// The text of the question.
    pub statement: String,

    /// Exactly four option texts, stored as a JSON array in the database.
    pub options: Json<Vec<String>>,

    /// 1-based index into `options` of the correct answer. Always in 1..=4.
    pub correct_option: i64,
}

/// DTO for sending a question to a quiz taker (excludes the answer key).
#[derive(Debug, Serialize)]
pub struct QuestionView {
    pub id: i64,
    pub statement: String,
    pub options: Json<Vec<String>>,
}

impl From<Question> for QuestionView {
    fn from(q: Question) -> Self {
        QuestionView {
            id: q.id,
            statement: q.statement,
            options: q.options,
        }
    }
}

/// DTO for creating or replacing a question.
#[derive(Debug, Deserialize, Validate)]
pub struct QuestionRequest {
    #[validate(length(min = 1, max = 2000, message = "Statement cannot be empty."))]
    pub statement: String,
    #[validate(custom(function = validate_options))]
    pub options: Vec<String>,
    #[validate(range(min = 1, max = 4, message = "Correct option must be between 1 and 4."))]
    pub correct_option: i64,
}

fn validate_options(options: &[String]) -> Result<(), validator::ValidationError> {
    if options.len() != 4 {
        return Err(validator::ValidationError::new("exactly_four_options_required"));
    }
    for opt in options {
        if opt.is_empty() || opt.len() > 500 {
            return Err(validator::ValidationError::new("option_length_invalid"));
        }
    }
    Ok(())
}

// src/models/subject.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'subjects' table in the database.
/// A subject is the top of the ownership chain: deleting one cascades to its
/// chapters, quizzes, questions and scores.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Subject {
    pub id: i64,

    /// Unique subject name.
    pub name: String,

    pub description: String,
}

/// DTO for creating or replacing a subject.
#[derive(Debug, Deserialize, Validate)]
pub struct SubjectRequest {
    #[validate(length(min = 1, max = 64, message = "Subject name cannot be empty."))]
    pub name: String,
    #[validate(length(min = 1, max = 256, message = "Description cannot be empty."))]
    pub description: String,
}

/// Query parameters for filtering the subject list.
#[derive(Debug, Deserialize)]
pub struct SubjectListParams {
    /// Case-insensitive substring match on the subject name.
    pub q: Option<String>,
}

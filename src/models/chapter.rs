// src/models/chapter.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'chapters' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Chapter {
    pub id: i64,

    /// Owning subject.
    pub subject_id: i64,

    /// Unique chapter name.
    pub name: String,

    pub description: String,
}

/// DTO for creating or replacing a chapter under a subject.
#[derive(Debug, Deserialize, Validate)]
pub struct ChapterRequest {
    #[validate(length(min = 1, max = 64, message = "Chapter name cannot be empty."))]
    pub name: String,
    #[validate(length(min = 1, max = 256, message = "Description cannot be empty."))]
    pub description: String,
}

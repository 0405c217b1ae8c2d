// src/models/score.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Represents the 'scores' table in the database.
/// One row per completed quiz attempt. Rows are append-only: nothing in the
/// application updates or deletes a score directly.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Score {
    pub id: i64,
    pub quiz_id: i64,
    pub user_id: i64,

    /// When the attempt was submitted (UTC).
    pub time_stamp_of_attempt: chrono::DateTime<chrono::Utc>,

    /// Percentage score, 0..=100.
    pub total_score: i64,
}

/// Aggregated view of a user's score history.
#[derive(Debug, Serialize, Deserialize)]
pub struct ScoreSummary {
    pub count: i64,
    pub max: i64,
    /// Arithmetic mean of the percentage scores. Unrounded; presentation
    /// decides the rounding.
    pub average: f64,
}

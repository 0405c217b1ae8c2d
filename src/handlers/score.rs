// src/handlers/score.rs

use axum::{Extension, Json, extract::State, response::IntoResponse};
use sqlx::SqlitePool;

use crate::{
    error::AppError,
    models::score::{Score, ScoreSummary},
    utils::jwt::Claims,
};

/// Row shape for the aggregate summary query.
#[derive(sqlx::FromRow)]
struct SummaryRow {
    count: i64,
    max: Option<i64>,
    average: Option<f64>,
}

/// Lists the caller's score history, newest attempt first.
/// Only the resolved identity's own rows are ever returned.
pub async fn list_scores(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let scores = sqlx::query_as::<_, Score>(
        r#"
        SELECT id, quiz_id, user_id, time_stamp_of_attempt, total_score
        FROM scores
        WHERE user_id = ?
        ORDER BY time_stamp_of_attempt DESC, id DESC
        "#,
    )
    .bind(claims.user_id())
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to list scores: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(Json(scores))
}

/// Aggregates the caller's score history into count/max/average.
/// An empty history yields zeros rather than nulls.
pub async fn summary(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let row = sqlx::query_as::<_, SummaryRow>(
        r#"
        SELECT
            COUNT(*) AS count,
            MAX(total_score) AS max,
            AVG(total_score) AS average
        FROM scores
        WHERE user_id = ?
        "#,
    )
    .bind(claims.user_id())
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to summarize scores: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(Json(ScoreSummary {
        count: row.count,
        max: row.max.unwrap_or(0),
        average: row.average.unwrap_or(0.0),
    }))
}

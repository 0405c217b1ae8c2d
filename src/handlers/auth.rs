// src/handlers/auth.rs

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    config::Config,
    error::AppError,
    models::user::{CreateUserRequest, LoginRequest, User},
    utils::{
        hash::{hash_password, verify_password},
        jwt::sign_jwt,
    },
};

/// Registers a new user.
///
/// Hashes the password using Argon2 before storing it.
/// Registration can never grant the admin flag.
/// Returns 201 Created and the user object (excluding password).
pub async fn register(
    State(pool): State<SqlitePool>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let hashed_password = hash_password(&payload.password)?;

    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (username, password, name, qualification)
        VALUES (?, ?, ?, ?)
        RETURNING id, username, password, name, qualification, is_admin
        "#,
    )
    .bind(&payload.username)
    .bind(&hashed_password)
    .bind(&payload.name)
    .bind(&payload.qualification)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        if e.to_string().contains("UNIQUE constraint failed") {
            AppError::Conflict(format!("Username '{}' already exists", payload.username))
        } else {
            tracing::error!("Failed to register user: {:?}", e);
            AppError::from(e)
        }
    })?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// Authenticates a user and returns a JWT token.
///
/// Verifies the username and password against the database.
/// If valid, signs a JWT token carrying the user's ID.
pub async fn login(
    State(pool): State<SqlitePool>,
    State(config): State<Config>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT id, username, password, name, qualification, is_admin
        FROM users
        WHERE username = ?
        "#,
    )
    .bind(&payload.username)
    .fetch_optional(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Login DB error: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    let user = user.ok_or(AppError::AuthError(
        "Username or password is incorrect.".to_string(),
    ))?;

    let is_valid = verify_password(&payload.password, &user.password)?;

    if !is_valid {
        return Err(AppError::AuthError(
            "Username or password is incorrect.".to_string(),
        ));
    }

    let token = sign_jwt(user.id, &config.jwt_secret, config.jwt_expiration)?;

    Ok(Json(json!({
        "token": token,
        "type": "Bearer",
        "is_admin": user.is_admin
    })))
}

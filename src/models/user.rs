// src/models/user.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'users' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: i64,

    /// Unique username.
    pub username: String,

    /// Argon2 password hash.
    /// Skipped during serialization to prevent leaking sensitive data.
    #[serde(skip)]
    pub password: String,

    /// Display name shown on dashboards.
    pub name: String,

    /// Optional qualification filled in at signup.
    pub qualification: Option<String>,

    /// Whether this user is an administrator.
    pub is_admin: bool,
}

/// DTO for creating a new user (Registration).
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(
        min = 3,
        max = 32,
        message = "Username length must be between 3 and 32 characters."
    ))]
    pub username: String,
    #[validate(length(
        min = 4,
        max = 128,
        message = "Password length must be between 4 and 128 characters."
    ))]
    pub password: String,
    #[validate(length(min = 1, max = 64, message = "Name cannot be empty."))]
    pub name: String,
    #[validate(length(max = 64))]
    pub qualification: Option<String>,
}

/// DTO for user login.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 32))]
    pub username: String,
    #[validate(length(min = 1, max = 128))]
    pub password: String,
}

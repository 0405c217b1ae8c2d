// src/db.rs

use std::str::FromStr;
use std::time::Duration;

use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};

use crate::{config::Config, error::AppError, utils::hash::hash_password};

/// Opens the SQLite pool and applies pending migrations.
///
/// Foreign keys are switched on for every connection; the cascade deletes in
/// the schema depend on it.
pub async fn connect(database_url: &str, max_connections: u32) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(3))
        .connect_with(options)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(pool)
}

/// Seeds the bootstrap administrator if no admin row exists yet.
/// Registration never grants the admin flag, so this is the only way an
/// admin comes into existence.
pub async fn seed_admin(pool: &SqlitePool, config: &Config) -> Result<(), AppError> {
    let admin_exists =
        sqlx::query_scalar::<_, i64>("SELECT id FROM users WHERE is_admin = TRUE LIMIT 1")
            .fetch_optional(pool)
            .await?;

    if admin_exists.is_none() {
        tracing::info!("Seeding admin user: {}", config.admin_username);
        let hashed_password = hash_password(&config.admin_password)?;

        sqlx::query(
            "INSERT INTO users (username, password, name, is_admin) VALUES (?, ?, 'Admin', TRUE)",
        )
        .bind(&config.admin_username)
        .bind(&hashed_password)
        .execute(pool)
        .await?;
        tracing::info!("Admin user created successfully.");
    }

    Ok(())
}

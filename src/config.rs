// src/config.rs

use dotenvy::dotenv;
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    /// Token lifetime in seconds.
    pub jwt_expiration: u64,
    pub rust_log: String,
    /// Credentials for the bootstrap administrator. Only used when no admin
    /// row exists yet.
    pub admin_username: String,
    pub admin_password: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");

        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET must be set");

        let jwt_expiration = env::var("JWT_EXPIRATION")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(3600);

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let admin_username = env::var("ADMIN_USERNAME").unwrap_or_else(|_| "admin".to_string());
        let admin_password = env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "admin".to_string());

        Self {
            database_url,
            jwt_secret,
            jwt_expiration,
            rust_log,
            admin_username,
            admin_password,
        }
    }
}

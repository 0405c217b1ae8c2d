// src/utils/jwt.rs

use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::{config::Config, error::AppError, state::AppState};

/// JWT Claims structure. The resolved identity for a request: middleware
/// verifies the token and injects `Claims` into the request extensions, so
/// handlers never touch ambient session state.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Claims {
    /// Subject - Stores the User ID (as string).
    pub sub: String,
    /// Expiration time as Unix timestamp.
    pub exp: usize,
}

impl Claims {
    /// The user id carried by the token.
    pub fn user_id(&self) -> i64 {
        self.sub.parse::<i64>().unwrap_or(0)
    }
}

/// Signs a new JWT for the user.
pub fn sign_jwt(id: i64, secret: &str, expiration_seconds: u64) -> Result<String, AppError> {
    // Calculate expiration: current time + expiration_seconds
    let expiration = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| AppError::InternalServerError(e.to_string()))?
        .as_secs() as usize
        + expiration_seconds as usize;

    let claims = Claims {
        sub: id.to_string(),
        exp: expiration,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::InternalServerError(e.to_string()))
}

/// Verifies and decodes a JWT string.
///
/// Returns the `Claims` if valid, otherwise returns an `AppError`.
pub fn verify_jwt(token: &str, secret: &str) -> Result<Claims, AppError> {
    let token_data = decode(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::AuthError("Please sign in first.".to_string()))?;

    Ok(token_data.claims)
}

/// Axum Middleware: Authentication.
///
/// Intercepts requests, validates the 'Authorization: Bearer <token>' header.
/// If valid, injects `Claims` into the request extensions for handlers to use.
/// If invalid, returns 401 Unauthorized.
pub async fn auth_middleware(
    State(config): State<Config>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    let token = match auth_header {
        Some(header) if header.starts_with("Bearer ") => &header[7..],
        _ => return Err(AppError::AuthError("Please sign in first.".to_string())),
    };

    let claims = verify_jwt(token, &config.jwt_secret)?;
    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

/// Axum Middleware: Admin Authorization.
///
/// Must be used AFTER `auth_middleware`. Loads the user row for the resolved
/// identity and requires the admin flag. The flag is read from the database,
/// not the token.
pub async fn admin_middleware(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let claims = req
        .extensions()
        .get::<Claims>()
        .ok_or(AppError::AuthError("Please sign in first.".to_string()))?;

    let is_admin = sqlx::query_scalar::<_, bool>("SELECT is_admin FROM users WHERE id = ?")
        .bind(claims.user_id())
        .fetch_optional(&state.pool)
        .await?
        .ok_or(AppError::AuthError("Please sign in first.".to_string()))?;

    if !is_admin {
        return Err(AppError::Forbidden(
            "You are not authorised to access this page.".to_string(),
        ));
    }

    Ok(next.run(req).await)
}

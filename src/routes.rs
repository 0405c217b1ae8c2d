// src/routes.rs

use axum::{
    Router,
    http::Method,
    middleware,
    routing::{delete, get, post, put},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{admin, attempt, auth, score},
    state::AppState,
    utils::jwt::{admin_middleware, auth_middleware},
};

/// Assembles the main application router.
///
/// * Merges all sub-routers (auth, quizzes, scores, admin).
/// * Applies global middleware (Trace, CORS).
/// * Injects global state (Database Pool + Config).
pub fn create_router(state: AppState) -> Router {
    let origins = [
        "http://localhost:3000".parse().unwrap(),
        "http://127.0.0.1:3000".parse().unwrap(),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login));

    // Everything a signed-in user can do: browse quizzes, take attempts,
    // review scores.
    let user_routes = Router::new()
        .route("/quizzes", get(attempt::list_quizzes))
        .route(
            "/quizzes/{id}/attempt",
            get(attempt::begin_attempt).post(attempt::submit_attempt),
        )
        .route("/scores", get(score::list_scores))
        .route("/scores/summary", get(score::summary))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let admin_routes = Router::new()
        .route("/users", get(admin::list_users))
        .route(
            "/subjects",
            get(admin::list_subjects).post(admin::create_subject),
        )
        .route(
            "/subjects/{id}",
            put(admin::update_subject).delete(admin::delete_subject),
        )
        .route("/subjects/{id}/chapters", post(admin::create_chapter))
        .route(
            "/chapters/{id}",
            put(admin::update_chapter).delete(admin::delete_chapter),
        )
        .route("/chapters/{id}/quizzes", post(admin::create_quiz))
        .route(
            "/quizzes/{id}",
            put(admin::update_quiz).delete(admin::delete_quiz),
        )
        .route("/quizzes/{id}/questions", post(admin::create_question))
        .route(
            "/questions/{id}",
            delete(admin::delete_question).put(admin::update_question),
        )
        // Double middleware protection: Auth first, then Admin check
        .layer(middleware::from_fn_with_state(
            state.clone(),
            admin_middleware,
        ))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .nest("/api/auth", auth_routes)
        .nest("/api", user_routes)
        .nest("/api/admin", admin_routes)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

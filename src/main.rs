// src/main.rs

use dotenvy::dotenv;
use quizmaster::config::Config;
use quizmaster::db;
use quizmaster::routes;
use quizmaster::state::AppState;
use std::net::SocketAddr;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenv().ok();

    // Load configuration from environment
    let config = Config::from_env();

    let file_appender = tracing_appender::rolling::daily("logs", "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = EnvFilter::new(&config.rust_log);
    let stdout_layer = fmt::layer().with_writer(std::io::stdout).with_target(false);
    let file_layer = fmt::layer().with_writer(non_blocking).with_ansi(false);

    // Initialize Tracing (Logging)
    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    // Initialize Database Pool and apply migrations
    let pool = match db::connect(&config.database_url, 5).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("Failed to open database: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("Database ready.");

    // Seed Admin User
    if let Err(e) = db::seed_admin(&pool, &config).await {
        tracing::error!("Failed to seed admin user: {:?}", e);
    }

    // Create AppState
    let state = AppState {
        pool: pool.clone(),
        config: config.clone(),
    };

    // Create the Axum application router
    let app = routes::create_router(state);

    // Bind to the listening address
    let addr = SocketAddr::from(([0, 0, 0, 0], 3000));
    tracing::info!("Listening on {}", addr);

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    // Start the server
    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

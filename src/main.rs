// src/main.rs

use chrono::Utc;
use dotenvy::dotenv;
use quizroom::config::Config;
use quizroom::fixtures;
use quizroom::models::user::UserDirectory;
use quizroom::routes;
use quizroom::state::AppState;
use quizroom::store::QuizStore;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file (if present)
    dotenv().ok();

    // Load configuration from environment
    let config = Config::from_env();

    let file_appender = tracing_appender::rolling::daily(&config.log_dir, "app.log");
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

    // Seed the in-memory store
    let mut store = QuizStore::new();
    let users = if config.seed_fixtures {
        fixtures::seed(&mut store, Utc::now())?;
        tracing::info!(
            quizzes = store.list_quizzes().len(),
            "Seeded sample quizzes and submissions."
        );
        UserDirectory::new(fixtures::users())
    } else {
        tracing::warn!("SEED_FIXTURES is off; no users can log in.");
        UserDirectory::default()
    };

    // Create AppState
    let state = AppState::new(store, users, config.clone());

    // Create the Axum application router
    let app = routes::create_router(state);

    // Bind to the listening address
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Listening on {}", listener.local_addr()?);

    // Start the server
    axum::serve(listener, app).await?;
    Ok(())
}

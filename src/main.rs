use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use whosaid::{app, config::ServerConfig, questions::QuestionBank};

#[tokio::main]
async fn main() {
    // Load .env file if present (before any env var reads)
    if let Err(e) = dotenvy::dotenv() {
        // Not an error if .env doesn't exist, only log if it's a different issue
        if !matches!(e, dotenvy::Error::Io(_)) {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "whosaid=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting whosaid...");

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    let questions = match QuestionBank::load(&config.questions_path) {
        Ok(bank) => bank,
        Err(e) => {
            tracing::error!(
                "Failed to load questions from {}: {}",
                config.questions_path.display(),
                e
            );
            std::process::exit(1);
        }
    };
    if questions.is_empty() {
        tracing::warn!("Question bank is empty; rounds will show \"No questions available\"");
    } else {
        tracing::info!("Loaded {} questions", questions.len());
    }

    if !config.static_dir.is_dir() {
        tracing::error!(
            "Static directory {} does not exist",
            config.static_dir.display()
        );
        std::process::exit(1);
    }

    let addr = config.addr;
    let static_dir = config.static_dir.clone();
    let reaper_interval = config.reaper_interval;
    let idle_timeout = config.room_idle_timeout;

    let state = Arc::new(app::AppState::new(config, Arc::new(questions)));

    // Spawn background task that drops rooms nobody has used for a while
    state
        .registry
        .clone()
        .spawn_reaper(reaper_interval, idle_timeout);

    let router = app::router(state, static_dir);

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind {}: {}", addr, e);
            std::process::exit(1);
        }
    };
    tracing::info!("Listening on http://{}", addr);

    if let Err(e) = axum::serve(listener, router).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

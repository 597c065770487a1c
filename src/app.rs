//! Shared server state and the HTTP router

use axum::{routing::get, Router};
use std::path::Path;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::config::ServerConfig;
use crate::questions::QuestionProvider;
use crate::registry::RoomRegistry;
use crate::{api, ws};

pub struct AppState {
    pub registry: Arc<RoomRegistry>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(config: ServerConfig, questions: Arc<dyn QuestionProvider>) -> Self {
        let registry = RoomRegistry::new(questions, config.game.clone(), config.hub());
        Self {
            registry: Arc::new(registry),
            config: Arc::new(config),
        }
    }
}

/// Build the router: WebSocket entry, JSON API, and static assets for everything else
pub fn router(state: Arc<AppState>, static_dir: impl AsRef<Path>) -> Router {
    Router::new()
        .route("/ws", get(ws::ws_handler))
        .route("/api/health", get(api::health))
        .route("/api/rooms/{room_id}", get(api::room_snapshot))
        .fallback_service(ServeDir::new(static_dir.as_ref()))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

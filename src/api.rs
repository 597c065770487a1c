//! HTTP API endpoints.
//!
//! Read-only views used for monitoring and by the lobby page before a player
//! opens a socket.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::sync::Arc;

use crate::app::AppState;

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub rooms: usize,
}

/// GET /api/health
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        rooms: state.registry.len().await,
    })
}

/// Current snapshot of an existing room.
///
/// GET /api/rooms/{room_id}
///
/// Never creates a room; unknown ids are a 404.
pub async fn room_snapshot(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
) -> Response {
    match state.registry.get(&room_id).await {
        Some(room) => Json(room.snapshot().await).into_response(),
        None => (StatusCode::NOT_FOUND, format!("Room {} not found", room_id)).into_response(),
    }
}

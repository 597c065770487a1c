pub mod handlers;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use futures::{sink::SinkExt, stream::StreamExt};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::app::AppState;
use crate::protocol::ServerMessage;

#[derive(Debug, Deserialize)]
pub struct WsQuery {
    pub room: Option<String>,
    pub name: Option<String>,
}

impl WsQuery {
    /// Room id and display name, if both are present and non-blank
    pub fn admission(&self) -> Option<(String, String)> {
        let room = self.room.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
        let name = self.name.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
        Some((room.to_string(), name.to_string()))
    }
}

/// WebSocket upgrade handler
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<WsQuery>,
    State(state): State<Arc<AppState>>,
) -> Response {
    let Some((room_id, name)) = params.admission() else {
        tracing::warn!("Refusing WebSocket connection without room and name: {:?}", params);
        return (StatusCode::BAD_REQUEST, "room and name are required").into_response();
    };

    tracing::info!("WebSocket connection request: room={}, name={}", room_id, name);
    ws.on_upgrade(move |socket| handle_socket(socket, room_id, name, state))
}

/// Handle one player's connection for its whole lifetime
async fn handle_socket(socket: WebSocket, room_id: String, name: String, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();

    let room = state.registry.get_or_create(&room_id).await;
    let (tx, mut rx) = mpsc::channel::<ServerMessage>(state.config.player_queue);
    let player = room.attach(name, tx).await;
    let player_id = player.id;

    // Writer: forward room snapshots to the socket
    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let json = match serde_json::to_string(&msg) {
                Ok(json) => json,
                Err(e) => {
                    tracing::error!("Failed to serialize outbound message: {}", e);
                    continue;
                }
            };
            if sender.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
    });

    // Reader: turn frames into room commands
    let reader_room = room.clone();
    let reader_id = player_id.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(frame) = receiver.next().await {
            match frame {
                Ok(Message::Text(text)) => {
                    handlers::handle_frame(&reader_room, &reader_id, text.as_str()).await;
                }
                Ok(Message::Close(_)) => {
                    tracing::debug!("Player {} closed the socket", reader_id);
                    break;
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::debug!("WebSocket error for player {}: {}", reader_id, e);
                    break;
                }
            }
        }
    });

    // Either side ending means the player is gone
    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    room.detach(&player_id).await;
    tracing::info!("WebSocket connection closed for player {} in room {}", player_id, room_id);
}

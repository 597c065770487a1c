//! Per-room snapshot fan-out
//!
//! Each room owns a bounded queue of snapshots drained by one background task.
//! Snapshots are full state, so a dropped one is superseded by the next.

use crate::protocol::ServerMessage;
use crate::room::Room;
use crate::types::RoomId;
use std::sync::Weak;
use std::time::Duration;
use tokio::sync::mpsc::{self, error::TrySendError};

#[derive(Debug, Clone)]
pub struct HubConfig {
    /// Snapshots waiting for delivery before new ones are dropped
    pub capacity: usize,
    /// How long a single player's outbound queue may block delivery
    pub send_timeout: Duration,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            capacity: 100,
            send_timeout: Duration::from_secs(1),
        }
    }
}

/// Producer side of a room's broadcast queue
#[derive(Debug, Clone)]
pub struct HubHandle {
    room_id: RoomId,
    tx: mpsc::Sender<ServerMessage>,
}

impl HubHandle {
    /// Queue a message without waiting. Returns false if it was dropped.
    pub fn enqueue(&self, msg: ServerMessage) -> bool {
        match self.tx.try_send(msg) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                tracing::debug!("Broadcast queue full for room {}, dropping snapshot", self.room_id);
                false
            }
            Err(TrySendError::Closed(_)) => {
                tracing::debug!("Broadcast hub for room {} has stopped", self.room_id);
                false
            }
        }
    }
}

/// Start the delivery task for a room.
///
/// The task holds only a weak reference, so it stops once the room is dropped.
pub fn spawn_hub(room: Weak<Room>, room_id: RoomId, config: HubConfig) -> HubHandle {
    let (tx, rx) = mpsc::channel(config.capacity.max(1));
    tokio::spawn(run_hub(room, room_id.clone(), rx, config.send_timeout));
    HubHandle { room_id, tx }
}

async fn run_hub(
    room: Weak<Room>,
    room_id: RoomId,
    mut rx: mpsc::Receiver<ServerMessage>,
    send_timeout: Duration,
) {
    tracing::debug!("Broadcast hub started for room {}", room_id);

    while let Some(msg) = rx.recv().await {
        let Some(room) = room.upgrade() else {
            break;
        };

        // Whoever is in the room now, not when the snapshot was taken
        let recipients = room.recipients().await;

        let mut failed = Vec::new();
        for (player_id, sink) in recipients {
            if let Err(e) = sink.send_timeout(msg.clone(), send_timeout).await {
                tracing::warn!(
                    "Failed to deliver to player {} in room {}: {}",
                    player_id,
                    room_id,
                    e
                );
                failed.push(player_id);
            }
        }

        for player_id in failed {
            room.detach(&player_id).await;
        }
    }

    tracing::debug!("Broadcast hub stopped for room {}", room_id);
}

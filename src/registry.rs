//! Process-wide room lookup
//!
//! The registry's map is the only structure shared between rooms. It is guarded
//! by its own lock and never waits on a room lock while holding it; the reaper
//! only try-locks rooms under the registry's write lock.

use crate::broadcast::HubConfig;
use crate::questions::QuestionProvider;
use crate::room::Room;
use crate::types::{GameConfig, RoomId};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

pub struct RoomRegistry {
    rooms: RwLock<HashMap<RoomId, Arc<Room>>>,
    questions: Arc<dyn QuestionProvider>,
    game_config: GameConfig,
    hub_config: HubConfig,
}

impl RoomRegistry {
    pub fn new(
        questions: Arc<dyn QuestionProvider>,
        game_config: GameConfig,
        hub_config: HubConfig,
    ) -> Self {
        Self {
            rooms: RwLock::new(HashMap::new()),
            questions,
            game_config,
            hub_config,
        }
    }

    /// Look up a room, creating it in LOBBY if this id has not been seen.
    ///
    /// Concurrent callers racing on a new id all get the same room.
    pub async fn get_or_create(&self, room_id: &str) -> Arc<Room> {
        if let Some(room) = self.rooms.read().await.get(room_id) {
            return room.clone();
        }

        let mut rooms = self.rooms.write().await;
        rooms
            .entry(room_id.to_string())
            .or_insert_with(|| {
                tracing::info!("Created room {}", room_id);
                Room::new(
                    room_id,
                    self.questions.clone(),
                    self.game_config.clone(),
                    self.hub_config.clone(),
                )
            })
            .clone()
    }

    pub async fn get(&self, room_id: &str) -> Option<Arc<Room>> {
        self.rooms.read().await.get(room_id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.rooms.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rooms.read().await.is_empty()
    }

    /// Ids of every live room, sorted
    pub async fn room_ids(&self) -> Vec<RoomId> {
        let mut ids: Vec<RoomId> = self.rooms.read().await.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Drop rooms that have had no players for at least `idle_timeout`.
    ///
    /// A room still referenced outside the registry (a connection that has
    /// resolved it but not attached yet) is kept. Returns the removed ids.
    pub async fn remove_idle(&self, idle_timeout: Duration) -> Vec<RoomId> {
        // Awaiting a room's lock happens with no registry lock held
        let snapshot: Vec<(RoomId, Arc<Room>)> = self
            .rooms
            .read()
            .await
            .iter()
            .map(|(id, room)| (id.clone(), room.clone()))
            .collect();

        let mut candidates = Vec::new();
        for (id, room) in snapshot {
            if matches!(room.idle_for().await, Some(elapsed) if elapsed >= idle_timeout) {
                candidates.push(id);
            }
        }
        if candidates.is_empty() {
            return candidates;
        }

        let mut rooms = self.rooms.write().await;
        let mut removed = Vec::new();
        for id in candidates {
            let Some(room) = rooms.get(&id) else {
                continue;
            };
            // Someone resolved it since, or a player joined
            if Arc::strong_count(room) > 1 {
                continue;
            }
            if matches!(room.try_idle_for(), Some(elapsed) if elapsed >= idle_timeout) {
                rooms.remove(&id);
                tracing::info!("Removed idle room {}", id);
                removed.push(id);
            }
        }
        removed
    }

    /// Periodically remove idle rooms
    pub fn spawn_reaper(self: Arc<Self>, interval: Duration, idle_timeout: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let removed = self.remove_idle(idle_timeout).await;
                if !removed.is_empty() {
                    tracing::debug!("Reaper removed {} idle rooms", removed.len());
                }
            }
        })
    }
}

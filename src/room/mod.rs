//! Per-room game session
//!
//! A [`Room`] owns its players and all round-scoped data behind a single
//! `RwLock`. Commands take the write half, mutate, release, and only then build
//! a snapshot under the read half and hand it to the room's broadcast hub.

mod answer;
mod guess;
mod round;
mod score;
mod snapshot;

pub use answer::shuffle_answers;
pub use score::tally_correct_guesses;

use crate::broadcast::{self, HubConfig, HubHandle};
use crate::error::CommandError;
use crate::protocol::ServerMessage;
use crate::questions::QuestionProvider;
use crate::types::*;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// Shown when the question bank has nothing to offer
pub const NO_QUESTIONS: &str = "No questions available";

/// Mutable state of a room. Only reachable through the room's lock.
#[derive(Debug)]
pub(crate) struct RoomInner {
    pub state: GameState,
    pub players: HashMap<PlayerId, Player>,
    next_join_seq: u64,
    pub question: String,
    pub question_deck: Vec<String>,
    pub question_index: usize,
    pub round_no: u32,
    pub answers: HashMap<PlayerId, String>,
    pub shuffled_answers: Vec<ShuffledAnswer>,
    pub voted_guesses: HashMap<PlayerId, HashMap<DisplayId, PlayerId>>,
    /// Set once the current round's points have been awarded
    pub scored: bool,
    pub last_round_result: HashMap<PlayerId, u32>,
    pub empty_since: Option<Instant>,
}

impl RoomInner {
    fn new() -> Self {
        Self {
            state: GameState::Lobby,
            players: HashMap::new(),
            next_join_seq: 0,
            question: String::new(),
            question_deck: Vec::new(),
            question_index: 0,
            round_no: 0,
            answers: HashMap::new(),
            shuffled_answers: Vec::new(),
            voted_guesses: HashMap::new(),
            scored: false,
            last_round_result: HashMap::new(),
            empty_since: Some(Instant::now()),
        }
    }

    pub fn require_host(&self, player_id: &str, action: &'static str) -> Result<(), CommandError> {
        match self.players.get(player_id) {
            Some(player) if player.is_host => Ok(()),
            Some(_) => Err(CommandError::NotHost(action)),
            None => Err(CommandError::UnknownPlayer),
        }
    }

    pub fn require_player(&self, player_id: &str) -> Result<(), CommandError> {
        if self.players.contains_key(player_id) {
            Ok(())
        } else {
            Err(CommandError::UnknownPlayer)
        }
    }

    /// Forget everything tied to the current round
    pub fn clear_round(&mut self) {
        self.answers.clear();
        self.voted_guesses.clear();
        self.shuffled_answers.clear();
        self.last_round_result.clear();
        self.scored = false;
    }

    /// Drop a departed player's unrevealed answer and their guesses, then
    /// re-check whether the remaining players have completed the phase.
    fn forget_player(&mut self, player_id: &str, config: &GameConfig) {
        if self.state == GameState::Answering {
            self.answers.remove(player_id);
        }
        self.voted_guesses.remove(player_id);

        match self.state {
            GameState::Answering => {
                self.close_answering_if_complete(config);
            }
            GameState::Voting => {
                self.close_voting_if_complete(config);
            }
            _ => {}
        }
    }
}

/// One isolated game session
pub struct Room {
    id: RoomId,
    inner: RwLock<RoomInner>,
    hub: HubHandle,
    questions: Arc<dyn QuestionProvider>,
    config: GameConfig,
}

impl std::fmt::Debug for Room {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Room")
            .field("id", &self.id)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Room {
    /// Create a room in LOBBY and start its broadcast hub.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(
        id: impl Into<RoomId>,
        questions: Arc<dyn QuestionProvider>,
        config: GameConfig,
        hub_config: HubConfig,
    ) -> Arc<Self> {
        let id = id.into();
        Arc::new_cyclic(|weak| {
            let hub = broadcast::spawn_hub(weak.clone(), id.clone(), hub_config);
            Self {
                id,
                inner: RwLock::new(RoomInner::new()),
                hub,
                questions,
                config,
            }
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Add a player. The first player to join an empty room becomes host.
    pub async fn attach(&self, name: impl Into<String>, sink: PlayerSink) -> Player {
        let player = {
            let mut inner = self.inner.write().await;
            let player = Player {
                id: ulid::Ulid::new().to_string(),
                name: name.into(),
                is_host: inner.players.is_empty(),
                score: 0,
                join_seq: inner.next_join_seq,
                sink,
            };
            inner.next_join_seq += 1;
            inner.empty_since = None;
            inner.players.insert(player.id.clone(), player.clone());
            player
        };

        tracing::info!(
            "Player {} ({}) joined room {} (host: {})",
            player.name,
            player.id,
            self.id,
            player.is_host
        );
        self.publish().await;
        player
    }

    /// Remove a player. Returns false if they were already gone.
    ///
    /// Host status is not handed to anyone else when the host leaves.
    pub async fn detach(&self, player_id: &str) -> bool {
        let removed = {
            let mut inner = self.inner.write().await;
            let removed = inner.players.remove(player_id);
            if removed.is_some() {
                inner.forget_player(player_id, &self.config);
                if inner.players.is_empty() {
                    inner.empty_since = Some(Instant::now());
                }
            }
            removed
        };

        let Some(player) = removed else {
            return false;
        };

        tracing::info!(
            "Player {} ({}) left room {}",
            player.name,
            player.id,
            self.id
        );
        self.publish().await;
        true
    }

    pub async fn player_count(&self) -> usize {
        self.inner.read().await.players.len()
    }

    pub async fn state(&self) -> GameState {
        self.inner.read().await.state
    }

    /// How long the room has had no players, if it is empty
    pub async fn idle_for(&self) -> Option<Duration> {
        self.inner.read().await.empty_since.map(|t| t.elapsed())
    }

    /// Like [`Room::idle_for`], but gives up instead of waiting on a busy room
    pub(crate) fn try_idle_for(&self) -> Option<Duration> {
        self.inner.try_read().ok()?.empty_since.map(|t| t.elapsed())
    }

    /// Connection handles of the players present right now
    pub(crate) async fn recipients(&self) -> Vec<(PlayerId, PlayerSink)> {
        self.inner
            .read()
            .await
            .players
            .values()
            .map(|p| (p.id.clone(), p.sink.clone()))
            .collect()
    }

    /// Build a fresh snapshot and queue it for delivery
    pub async fn publish(&self) {
        let snapshot = self.snapshot().await;
        self.hub.enqueue(ServerMessage::GameState(snapshot));
    }

    #[cfg(test)]
    pub(crate) fn hub_handle(&self) -> HubHandle {
        self.hub.clone()
    }

    #[cfg(test)]
    pub(crate) async fn inner_mut(&self) -> tokio::sync::RwLockWriteGuard<'_, RoomInner> {
        self.inner.write().await
    }

    #[cfg(test)]
    pub(crate) async fn inner(&self) -> tokio::sync::RwLockReadGuard<'_, RoomInner> {
        self.inner.read().await
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::questions::QuestionBank;
    use tokio::sync::mpsc;

    pub fn questions(prompts: &[&str]) -> Arc<dyn QuestionProvider> {
        Arc::new(QuestionBank::from_questions(
            prompts.iter().map(|s| s.to_string()).collect(),
        ))
    }

    pub fn room_with(prompts: &[&str]) -> Arc<Room> {
        Room::new(
            "test-room",
            questions(prompts),
            GameConfig::default(),
            HubConfig::default(),
        )
    }

    pub fn room() -> Arc<Room> {
        room_with(&["q1", "q2", "q3"])
    }

    /// Attach a player whose outbound messages are kept in the returned receiver
    pub async fn join(
        room: &Room,
        name: &str,
    ) -> (PlayerId, mpsc::Receiver<ServerMessage>) {
        let (tx, rx) = mpsc::channel(256);
        let player = room.attach(name, tx).await;
        (player.id, rx)
    }

    /// Start a round with the given players answering with their own names
    pub async fn answer_all(room: &Room, players: &[PlayerId]) {
        for id in players {
            room.submit_answer(id, format!("answer of {}", id))
                .await
                .unwrap();
        }
    }

    /// Display id -> author, read straight from the room
    pub async fn owners(room: &Room) -> HashMap<DisplayId, PlayerId> {
        room.inner()
            .await
            .shuffled_answers
            .iter()
            .map(|a| (a.display_id, a.real_owner_id.clone()))
            .collect()
    }
}

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::protocol::ServerMessage;

/// Opaque ID types for readability
pub type RoomId = String;
pub type PlayerId = String;
/// Round-scoped anonymous handle for a shuffled answer
pub type DisplayId = usize;

/// Outbound channel to a player's connection writer
pub type PlayerSink = mpsc::Sender<ServerMessage>;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameState {
    Lobby,
    Answering,
    Voting,
    Results,
    GameOver,
}

impl GameState {
    /// States in which the shuffled answers are visible to clients
    pub fn reveals_answers(&self) -> bool {
        matches!(
            self,
            GameState::Voting | GameState::Results | GameState::GameOver
        )
    }

    /// States in which the last round's per-player tally is shown
    pub fn shows_round_result(&self) -> bool {
        matches!(self, GameState::Results | GameState::GameOver)
    }
}

/// Rules of a match. Shared by every room created by a registry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameConfig {
    pub winning_score: u32,
    pub points_per_correct_guess: u32,
    /// Longest accepted answer in characters. Unbounded when `None`.
    pub max_answer_chars: Option<usize>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            winning_score: 50,
            points_per_correct_guess: 10,
            max_answer_chars: None,
        }
    }
}

/// A connected participant of a room
#[derive(Debug, Clone)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub is_host: bool,
    pub score: u32,
    /// Position in the room's join order, used for stable listing
    pub join_seq: u64,
    pub sink: PlayerSink,
}

/// Player as exposed in snapshots (no connection handle)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PublicPlayer {
    pub id: PlayerId,
    pub name: String,
    pub is_host: bool,
    pub score: u32,
}

impl From<&Player> for PublicPlayer {
    fn from(player: &Player) -> Self {
        Self {
            id: player.id.clone(),
            name: player.name.clone(),
            is_host: player.is_host,
            score: player.score,
        }
    }
}

/// An answer after the anonymizing shuffle. Never serialized as a whole.
#[derive(Debug, Clone, PartialEq)]
pub struct ShuffledAnswer {
    pub text: String,
    /// Author of the answer, server-side only
    pub real_owner_id: PlayerId,
    pub display_id: DisplayId,
}

/// Public view of a shuffled answer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PublicAnswer {
    pub text: String,
    pub id: DisplayId,
}

impl From<&ShuffledAnswer> for PublicAnswer {
    fn from(answer: &ShuffledAnswer) -> Self {
        Self {
            text: answer.text.clone(),
            id: answer.display_id,
        }
    }
}

use crate::types::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Commands a player can send over the socket.
///
/// On the wire every frame is an envelope `{ "type": ..., "payload": ... }`.
/// Decoding goes through [`decode`] rather than a derived `Deserialize` so that
/// payloads of the wrong shape can be told apart from unknown types.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientMessage {
    StartGame,
    SubmitAnswer {
        text: String,
    },
    SubmitGuess {
        answer_id: DisplayId,
        guessed_player_id: PlayerId,
    },
    ShowResults,
    NextRound,
    ResetGame,
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    payload: serde_json::Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GuessPayload {
    answer_id: DisplayId,
    guessed_player_id: PlayerId,
}

/// Why an inbound frame was dropped
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("invalid JSON envelope: {0}")]
    Envelope(#[from] serde_json::Error),

    #[error("unknown message type: {0}")]
    UnknownType(String),

    #[error("invalid payload for {kind}: {reason}")]
    InvalidPayload { kind: &'static str, reason: String },
}

/// Decode a text frame into a command
pub fn decode(text: &str) -> Result<ClientMessage, DecodeError> {
    let envelope: Envelope = serde_json::from_str(text)?;

    match envelope.kind.as_str() {
        "START_GAME" => Ok(ClientMessage::StartGame),
        "SHOW_RESULTS" => Ok(ClientMessage::ShowResults),
        "NEXT_ROUND" => Ok(ClientMessage::NextRound),
        "RESET_GAME" => Ok(ClientMessage::ResetGame),
        "SUBMIT_ANSWER" => match envelope.payload {
            serde_json::Value::String(text) => Ok(ClientMessage::SubmitAnswer { text }),
            other => Err(DecodeError::InvalidPayload {
                kind: "SUBMIT_ANSWER",
                reason: format!("expected a string, got {}", other),
            }),
        },
        "SUBMIT_GUESS" => {
            let guess: GuessPayload = serde_json::from_value(envelope.payload).map_err(|e| {
                DecodeError::InvalidPayload {
                    kind: "SUBMIT_GUESS",
                    reason: e.to_string(),
                }
            })?;
            Ok(ClientMessage::SubmitGuess {
                answer_id: guess.answer_id,
                guessed_player_id: guess.guessed_player_id,
            })
        }
        _ => Err(DecodeError::UnknownType(envelope.kind)),
    }
}

/// Messages pushed to clients
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServerMessage {
    GameState(GameSnapshot),
}

/// Full public view of a room, rebuilt after every mutation.
///
/// `answers` and `last_round_result` are `None` (and omitted from the JSON)
/// outside the states that reveal them.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    pub players: Vec<PublicPlayer>,
    pub state: GameState,
    pub question: String,
    pub answers_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answers: Option<Vec<PublicAnswer>>,
    pub voted_guesses: BTreeMap<PlayerId, BTreeMap<DisplayId, PlayerId>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_round_result: Option<BTreeMap<PlayerId, u32>>,
}

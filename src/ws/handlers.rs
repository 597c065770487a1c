//! WebSocket message dispatch
//!
//! Frames are decoded here and routed to the room. Nothing is ever sent back
//! for a bad frame or a refused command; the player just sees the next
//! snapshot, or none.

use crate::error::CommandError;
use crate::protocol::{self, ClientMessage};
use crate::room::Room;

/// Decode and apply one text frame
pub async fn handle_frame(room: &Room, player_id: &str, text: &str) {
    match protocol::decode(text) {
        Ok(msg) => {
            let _ = handle_message(room, player_id, msg).await;
        }
        Err(e) => {
            tracing::debug!("Dropping frame from player {}: {}", player_id, e);
        }
    }
}

/// Apply a decoded command on behalf of a player
pub async fn handle_message(
    room: &Room,
    player_id: &str,
    msg: ClientMessage,
) -> Result<(), CommandError> {
    let result = match msg {
        ClientMessage::StartGame => room.start_game(player_id).await,
        ClientMessage::SubmitAnswer { text } => room.submit_answer(player_id, text).await,
        ClientMessage::SubmitGuess {
            answer_id,
            guessed_player_id,
        } => {
            room.submit_guess(player_id, answer_id, guessed_player_id)
                .await
        }
        ClientMessage::ShowResults => room.show_results(player_id).await,
        ClientMessage::NextRound => room.next_round(player_id).await,
        ClientMessage::ResetGame => room.reset_game(player_id).await,
    };

    if let Err(ref e) = result {
        tracing::debug!(
            "Ignored command from player {} in room {}: {}",
            player_id,
            room.id(),
            e
        );
    }
    result
}

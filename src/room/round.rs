use super::{Room, RoomInner, NO_QUESTIONS};
use crate::error::CommandError;
use crate::types::*;

impl RoomInner {
    /// Point `question` at the deck entry under the cursor
    fn show_current_question(&mut self) {
        self.question = self
            .question_deck
            .get(self.question_index)
            .cloned()
            .unwrap_or_else(|| NO_QUESTIONS.to_string());
    }

    fn begin_round(&mut self) {
        self.clear_round();
        self.round_no += 1;
        self.state = GameState::Answering;
    }
}

impl Room {
    /// Start (or restart) a match with a freshly shuffled deck (host only).
    ///
    /// Accepted in every state. Scores are kept; only ResetGame zeroes them.
    pub async fn start_game(&self, player_id: &str) -> Result<(), CommandError> {
        {
            let mut inner = self.inner.write().await;
            inner.require_host(player_id, "start the game")?;

            inner.question_deck = self.questions.shuffled_copy();
            inner.question_index = 0;
            inner.round_no = 0;
            inner.show_current_question();
            inner.begin_round();
        }

        tracing::info!("Game started in room {}", self.id);
        self.publish().await;
        Ok(())
    }

    /// Move on to the next prompt, reshuffling when the deck runs out (host only)
    pub async fn next_round(&self, player_id: &str) -> Result<(), CommandError> {
        let round_no = {
            let mut inner = self.inner.write().await;
            inner.require_host(player_id, "advance the round")?;
            if inner.state != GameState::Results {
                return Err(CommandError::WrongState {
                    action: "advance the round",
                    state: inner.state,
                });
            }

            inner.question_index += 1;
            if inner.question_index >= inner.question_deck.len() {
                tracing::debug!("Question deck exhausted in room {}, reshuffling", self.id);
                inner.question_deck = self.questions.shuffled_copy();
                inner.question_index = 0;
            }
            inner.show_current_question();
            inner.begin_round();
            inner.round_no
        };

        tracing::info!("Room {} advanced to round {}", self.id, round_no);
        self.publish().await;
        Ok(())
    }

    /// Zero all scores and return to the lobby (host only). Allowed from any state.
    pub async fn reset_game(&self, player_id: &str) -> Result<(), CommandError> {
        {
            let mut inner = self.inner.write().await;
            inner.require_host(player_id, "reset the game")?;

            for player in inner.players.values_mut() {
                player.score = 0;
            }
            inner.question_deck = self.questions.shuffled_copy();
            inner.question_index = 0;
            inner.question.clear();
            inner.round_no = 0;
            inner.clear_round();
            inner.state = GameState::Lobby;
        }

        tracing::info!("Game reset in room {}", self.id);
        self.publish().await;
        Ok(())
    }
}

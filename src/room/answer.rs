use super::{Room, RoomInner};
use crate::error::CommandError;
use crate::types::*;
use rand::Rng;
use std::collections::HashMap;

/// Anonymize a round's answers.
///
/// Fisher–Yates over the collected entries, then each entry's display id is
/// its position after the permutation. The author stays on the entry as
/// `real_owner_id` and never leaves the server.
pub fn shuffle_answers<R: Rng + ?Sized>(
    answers: &HashMap<PlayerId, String>,
    rng: &mut R,
) -> Vec<ShuffledAnswer> {
    let mut entries: Vec<(PlayerId, String)> = answers
        .iter()
        .map(|(id, text)| (id.clone(), text.clone()))
        .collect();

    for i in (1..entries.len()).rev() {
        let j = rng.random_range(0..=i);
        entries.swap(i, j);
    }

    entries
        .into_iter()
        .enumerate()
        .map(|(display_id, (real_owner_id, text))| ShuffledAnswer {
            text,
            real_owner_id,
            display_id,
        })
        .collect()
}

impl RoomInner {
    /// Move to VOTING once every present player has an answer on record.
    ///
    /// Voting that needs no guesses at all (a lone player) closes right away.
    pub(super) fn close_answering_if_complete(&mut self, config: &GameConfig) -> bool {
        if self.state != GameState::Answering || self.players.is_empty() {
            return false;
        }

        let answered = self
            .players
            .keys()
            .filter(|id| self.answers.contains_key(*id))
            .count();
        if answered < self.players.len() {
            return false;
        }

        self.shuffled_answers = shuffle_answers(&self.answers, &mut rand::rng());
        self.voted_guesses.clear();
        self.state = GameState::Voting;
        self.close_voting_if_complete(config);
        true
    }
}

impl Room {
    /// Record a player's answer for the current round.
    ///
    /// The answer that completes the set shuffles them and opens voting.
    pub async fn submit_answer(&self, player_id: &str, text: String) -> Result<(), CommandError> {
        let opened_voting = {
            let mut inner = self.inner.write().await;
            inner.require_player(player_id)?;

            if inner.state != GameState::Answering {
                return Err(CommandError::WrongState {
                    action: "submit an answer",
                    state: inner.state,
                });
            }
            if text.is_empty() {
                return Err(CommandError::EmptyAnswer);
            }
            if let Some(limit) = self.config.max_answer_chars {
                if text.chars().count() > limit {
                    return Err(CommandError::AnswerTooLong(limit));
                }
            }
            if inner.answers.contains_key(player_id) {
                return Err(CommandError::AlreadyAnswered);
            }

            inner.answers.insert(player_id.to_string(), text);
            inner.close_answering_if_complete(&self.config)
        };

        if opened_voting {
            tracing::info!("All answers in for room {}", self.id);
        } else {
            tracing::debug!("Answer recorded in room {} from {}", self.id, player_id);
        }
        self.publish().await;
        Ok(())
    }
}

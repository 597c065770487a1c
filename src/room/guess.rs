use super::{Room, RoomInner};
use crate::error::CommandError;
use crate::types::*;

impl RoomInner {
    /// Every present player has guessed all answers but (implicitly) their own
    fn voting_complete(&self) -> bool {
        let expected = self.shuffled_answers.len().saturating_sub(1);
        !self.players.is_empty()
            && self.players.keys().all(|id| {
                self.voted_guesses
                    .get(id)
                    .map(|guesses| guesses.len())
                    .unwrap_or(0)
                    >= expected
            })
    }

    /// Award the round's points once and settle on RESULTS or GAME_OVER
    pub(super) fn finish_round(&mut self, config: &GameConfig) {
        self.score_round(config);
        self.state = if self.has_winner(config) {
            GameState::GameOver
        } else {
            GameState::Results
        };
    }

    pub(super) fn close_voting_if_complete(&mut self, config: &GameConfig) -> bool {
        if self.state != GameState::Voting || !self.voting_complete() {
            return false;
        }
        self.finish_round(config);
        true
    }
}

impl Room {
    /// Record `voter`'s guess that `guessed_player_id` wrote answer `display_id`.
    ///
    /// A later guess for the same display id replaces the earlier one. Once every
    /// player has guessed the round is scored.
    pub async fn submit_guess(
        &self,
        voter: &str,
        display_id: DisplayId,
        guessed_player_id: PlayerId,
    ) -> Result<(), CommandError> {
        let outcome = {
            let mut inner = self.inner.write().await;
            inner.require_player(voter)?;

            if inner.state != GameState::Voting {
                return Err(CommandError::WrongState {
                    action: "submit a guess",
                    state: inner.state,
                });
            }
            if display_id >= inner.shuffled_answers.len() {
                return Err(CommandError::InvalidDisplayId(display_id));
            }

            inner
                .voted_guesses
                .entry(voter.to_string())
                .or_default()
                .insert(display_id, guessed_player_id);

            if inner.close_voting_if_complete(&self.config) {
                Some(inner.state)
            } else {
                None
            }
        };

        match outcome {
            Some(state) => tracing::info!("Voting closed in room {}, now {:?}", self.id, state),
            None => tracing::debug!("Guess recorded in room {} from {}", self.id, voter),
        }
        self.publish().await;
        Ok(())
    }

    /// Score the round if that has not happened yet and show the outcome (host only).
    ///
    /// Calling this again in the same round awards nothing new.
    pub async fn show_results(&self, player_id: &str) -> Result<(), CommandError> {
        let state = {
            let mut inner = self.inner.write().await;
            inner.require_host(player_id, "show results")?;

            match inner.state {
                GameState::Voting => inner.finish_round(&self.config),
                // Already settled; GAME_OVER stays put even if the winner left
                GameState::Results | GameState::GameOver => {}
                state => {
                    return Err(CommandError::WrongState {
                        action: "show results",
                        state,
                    })
                }
            }

            inner.state
        };

        tracing::info!("Results shown in room {}: {:?}", self.id, state);
        self.publish().await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;

    /// Three players in VOTING, returning their ids
    async fn voting_room() -> (
        std::sync::Arc<Room>,
        Vec<PlayerId>,
        Vec<tokio::sync::mpsc::Receiver<crate::protocol::ServerMessage>>,
    ) {
        let room = room();
        let mut ids = Vec::new();
        let mut receivers = Vec::new();
        for name in ["Ana", "Bia", "Caio"] {
            let (id, rx) = join(&room, name).await;
            ids.push(id);
            receivers.push(rx);
        }
        room.start_game(&ids[0]).await.unwrap();
        answer_all(&room, &ids).await;
        assert_eq!(room.state().await, GameState::Voting);
        (room, ids, receivers)
    }

    #[tokio::test]
    async fn test_results_fire_on_last_guess() {
        let (room, ids, _rx) = voting_room().await;
        let owners = owners(&room).await;

        let mut guesses = Vec::new();
        for voter in &ids {
            for (display_id, owner) in &owners {
                if owner != voter {
                    guesses.push((voter.clone(), *display_id, owner.clone()));
                }
            }
        }
        assert_eq!(guesses.len(), 6);

        let (last, rest) = guesses.split_last().unwrap();
        for (voter, display_id, owner) in rest {
            room.submit_guess(voter, *display_id, owner.clone())
                .await
                .unwrap();
            assert_eq!(room.state().await, GameState::Voting);
        }
        room.submit_guess(&last.0, last.1, last.2.clone())
            .await
            .unwrap();
        assert_eq!(room.state().await, GameState::Results);

        let inner = room.inner().await;
        for id in &ids {
            assert_eq!(inner.players[id].score, 20);
            assert_eq!(inner.last_round_result[id], 2);
        }
    }

    #[tokio::test]
    async fn test_overwriting_a_guess_does_not_count_twice() {
        let (room, ids, _rx) = voting_room().await;

        // Same display id twice: still one distinct guess, voting stays open
        room.submit_guess(&ids[0], 0, ids[1].clone()).await.unwrap();
        room.submit_guess(&ids[0], 0, ids[2].clone()).await.unwrap();

        let inner = room.inner().await;
        assert_eq!(inner.voted_guesses[&ids[0]].len(), 1);
        assert_eq!(inner.voted_guesses[&ids[0]][&0], ids[2]);
        assert_eq!(inner.state, GameState::Voting);
    }

    #[tokio::test]
    async fn test_wrong_guesses_score_nothing() {
        let (room, ids, _rx) = voting_room().await;
        let owners = owners(&room).await;

        for voter in &ids {
            for (display_id, owner) in &owners {
                if owner != voter {
                    // Always blame the voter themself
                    room.submit_guess(voter, *display_id, voter.clone())
                        .await
                        .unwrap();
                }
            }
        }

        let inner = room.inner().await;
        assert_eq!(inner.state, GameState::Results);
        assert!(inner.players.values().all(|p| p.score == 0));
        assert!(inner.last_round_result.values().all(|c| *c == 0));
    }

    #[tokio::test]
    async fn test_guess_outside_range_is_rejected() {
        let (room, ids, _rx) = voting_room().await;
        assert_eq!(
            room.submit_guess(&ids[0], 3, ids[1].clone()).await,
            Err(CommandError::InvalidDisplayId(3))
        );
        assert!(room.inner().await.voted_guesses.is_empty());
    }

    #[tokio::test]
    async fn test_guess_outside_voting_is_rejected() {
        let room = room();
        let (a, _rx_a) = join(&room, "Ana").await;
        room.start_game(&a).await.unwrap();

        assert!(matches!(
            room.submit_guess(&a, 0, a.clone()).await,
            Err(CommandError::WrongState {
                state: GameState::Answering,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_show_results_is_idempotent() {
        let (room, ids, _rx) = voting_room().await;
        let owners = owners(&room).await;

        // Only the first player guesses, correctly, before the host forces results
        for (display_id, owner) in &owners {
            if *owner != ids[0] {
                room.submit_guess(&ids[0], *display_id, owner.clone())
                    .await
                    .unwrap();
            }
        }

        room.show_results(&ids[0]).await.unwrap();
        assert_eq!(room.state().await, GameState::Results);
        assert_eq!(room.inner().await.players[&ids[0]].score, 20);

        room.show_results(&ids[0]).await.unwrap();
        room.show_results(&ids[0]).await.unwrap();
        assert_eq!(room.inner().await.players[&ids[0]].score, 20);
    }

    #[tokio::test]
    async fn test_show_results_is_host_only_and_needs_a_round() {
        let room = room();
        let (a, _rx_a) = join(&room, "Ana").await;
        let (b, _rx_b) = join(&room, "Bia").await;

        assert!(matches!(
            room.show_results(&a).await,
            Err(CommandError::WrongState {
                state: GameState::Lobby,
                ..
            })
        ));

        room.start_game(&a).await.unwrap();
        answer_all(&room, &[a.clone(), b.clone()]).await;
        assert_eq!(
            room.show_results(&b).await,
            Err(CommandError::NotHost("show results"))
        );
        assert_eq!(room.state().await, GameState::Voting);
    }

    #[tokio::test]
    async fn test_game_over_at_winning_score() {
        let room = room();
        let (a, _rx_a) = join(&room, "Ana").await;
        let (b, _rx_b) = join(&room, "Bia").await;
        room.start_game(&a).await.unwrap();

        // Ana guesses right every round, Bia always wrong: +10 per round for Ana
        for round in 1..=5 {
            answer_all(&room, &[a.clone(), b.clone()]).await;
            let owners = owners(&room).await;
            for (display_id, owner) in &owners {
                if *owner == b {
                    room.submit_guess(&a, *display_id, b.clone()).await.unwrap();
                } else {
                    room.submit_guess(&b, *display_id, b.clone()).await.unwrap();
                }
            }

            let state = room.state().await;
            if round < 5 {
                assert_eq!(state, GameState::Results);
                room.next_round(&a).await.unwrap();
            } else {
                assert_eq!(state, GameState::GameOver);
            }
        }

        assert_eq!(room.inner().await.players[&a].score, 50);

        // Rounds do not continue past game over
        assert!(room.next_round(&a).await.is_err());
        assert!(room
            .submit_answer(&a, "more".to_string())
            .await
            .is_err());
        room.show_results(&a).await.unwrap();
        assert_eq!(room.state().await, GameState::GameOver);
        assert_eq!(room.inner().await.players[&a].score, 50);

        room.reset_game(&a).await.unwrap();
        assert_eq!(room.state().await, GameState::Lobby);
        assert_eq!(room.inner().await.players[&a].score, 0);
    }

    #[tokio::test]
    async fn test_game_over_survives_winner_leaving() {
        let room = room();
        let (a, _rx_a) = join(&room, "Ana").await;
        let (b, _rx_b) = join(&room, "Bia").await;
        room.start_game(&a).await.unwrap();

        // Bia guesses right every round and reaches the winning score
        for round in 1..=5 {
            answer_all(&room, &[a.clone(), b.clone()]).await;
            let owners = owners(&room).await;
            for (display_id, owner) in &owners {
                if *owner == a {
                    room.submit_guess(&b, *display_id, a.clone()).await.unwrap();
                } else {
                    room.submit_guess(&a, *display_id, a.clone()).await.unwrap();
                }
            }
            if round < 5 {
                room.next_round(&a).await.unwrap();
            }
        }
        assert_eq!(room.state().await, GameState::GameOver);

        room.detach(&b).await;
        assert_eq!(room.state().await, GameState::GameOver);

        room.show_results(&a).await.unwrap();
        assert_eq!(room.state().await, GameState::GameOver);
        assert!(room.next_round(&a).await.is_err());
        assert_eq!(room.state().await, GameState::GameOver);
    }
}

use super::{Room, RoomInner};
use crate::protocol::GameSnapshot;
use crate::types::*;
use std::collections::BTreeMap;

impl RoomInner {
    pub(super) fn snapshot(&self) -> GameSnapshot {
        let mut players: Vec<&Player> = self.players.values().collect();
        players.sort_by_key(|p| p.join_seq);

        let answers = self
            .state
            .reveals_answers()
            .then(|| self.shuffled_answers.iter().map(PublicAnswer::from).collect());

        let last_round_result = self.state.shows_round_result().then(|| {
            self.last_round_result
                .iter()
                .map(|(id, correct)| (id.clone(), *correct))
                .collect()
        });

        let voted_guesses = self
            .voted_guesses
            .iter()
            .map(|(voter, guesses)| {
                let guesses: BTreeMap<_, _> = guesses
                    .iter()
                    .map(|(display_id, guessed)| (*display_id, guessed.clone()))
                    .collect();
                (voter.clone(), guesses)
            })
            .collect();

        GameSnapshot {
            players: players.into_iter().map(PublicPlayer::from).collect(),
            state: self.state,
            question: self.question.clone(),
            answers_count: self.answers.len(),
            answers,
            voted_guesses,
            last_round_result,
        }
    }
}

impl Room {
    /// Consistent public view of the room as of now
    pub async fn snapshot(&self) -> GameSnapshot {
        self.inner.read().await.snapshot()
    }
}

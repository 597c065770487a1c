use super::RoomInner;
use crate::types::*;
use std::collections::HashMap;

/// Count each voter's correct guesses against the shuffled answers
pub fn tally_correct_guesses(
    shuffled_answers: &[ShuffledAnswer],
    voted_guesses: &HashMap<PlayerId, HashMap<DisplayId, PlayerId>>,
) -> HashMap<PlayerId, u32> {
    let owners: HashMap<DisplayId, &PlayerId> = shuffled_answers
        .iter()
        .map(|answer| (answer.display_id, &answer.real_owner_id))
        .collect();

    voted_guesses
        .iter()
        .map(|(voter, guesses)| {
            let correct = guesses
                .iter()
                .filter(|(display_id, guessed)| owners.get(*display_id) == Some(guessed))
                .count() as u32;
            (voter.clone(), correct)
        })
        .collect()
}

impl RoomInner {
    /// Award points for the current round. Does nothing if already scored.
    pub(super) fn score_round(&mut self, config: &GameConfig) {
        if self.scored {
            return;
        }

        let tally = tally_correct_guesses(&self.shuffled_answers, &self.voted_guesses);

        self.last_round_result.clear();
        for (id, player) in self.players.iter_mut() {
            let correct = tally.get(id).copied().unwrap_or(0);
            player.score += correct * config.points_per_correct_guess;
            self.last_round_result.insert(id.clone(), correct);
        }
        self.scored = true;
    }

    pub(super) fn has_winner(&self, config: &GameConfig) -> bool {
        self.players
            .values()
            .any(|p| p.score >= config.winning_score)
    }
}

use serde::Serialize;

use super::ids::PlayerId;
use super::state::{Match, RoundStatus};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Standing {
    pub player_id: PlayerId,
    pub votes_received: u32,
    pub rounds_won: u32,
}

/// Totals across reviewed rounds, best first. Ties keep roster order.
pub fn standings(m: &Match) -> Vec<Standing> {
    let mut table: Vec<Standing> = m
        .roster
        .iter()
        .map(|p| Standing {
            player_id: *p,
            votes_received: 0,
            rounds_won: 0,
        })
        .collect();

    for round in m.rounds.iter().filter(|r| r.status == RoundStatus::Reviewed) {
        for vote in &round.votes {
            if let Some(author) = round.author_of(&vote.image) {
                if let Some(row) = table.iter_mut().find(|s| s.player_id == author) {
                    row.votes_received += 1;
                }
            }
        }
        if let Some(author) = round.winner.as_ref().and_then(|w| round.author_of(w)) {
            if let Some(row) = table.iter_mut().find(|s| s.player_id == author) {
                row.rounds_won += 1;
            }
        }
    }

    table.sort_by(|a, b| {
        b.votes_received
            .cmp(&a.votes_received)
            .then(b.rounds_won.cmp(&a.rounds_won))
    });
    table
}

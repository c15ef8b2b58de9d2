use serde::Serialize;

use super::ids::{ImageRef, PlayerId};
use super::state::{Match, MatchStatus, RoundStatus};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MatchTransition {
    /// Explicit: a new match was stored.
    MatchCreated { roster: Vec<PlayerId> },

    /// Edge-triggered: the match status changed.
    StatusChanged { status: MatchStatus },

    /// Explicit: a player answered the invitation.
    InvitationAnswered { player_id: PlayerId, accepted: bool },

    /// Edge-triggered: a round opened for submissions.
    RoundStarted { ordinal: u16 },

    /// Explicit: a player submitted an image.
    ImageSubmitted { ordinal: u16, player_id: PlayerId },

    /// Edge-triggered: a round moved to Voting.
    VotingStarted { ordinal: u16, forced: bool },

    /// Explicit: a player voted.
    VoteCast { ordinal: u16, player_id: PlayerId },

    /// Edge-triggered: a round was reviewed.
    RoundReviewed {
        ordinal: u16,
        winner: Option<ImageRef>,
        forced: bool,
    },
}

/// Derive status and phase transitions from before/after aggregates.
pub fn derive_match_transitions(before: &Match, after: &Match) -> Vec<MatchTransition> {
    let mut transitions = Vec::new();

    if before.status != after.status {
        transitions.push(MatchTransition::StatusChanged {
            status: after.status,
        });
    }

    for round in &after.rounds {
        let previous = before.round(round.ordinal).map(|r| r.status);
        if previous == Some(round.status) {
            continue;
        }
        if previous.is_none() {
            transitions.push(MatchTransition::RoundStarted {
                ordinal: round.ordinal,
            });
        }
        let reached_voting = matches!(round.status, RoundStatus::Voting | RoundStatus::Reviewed);
        let was_before_voting = matches!(previous, None | Some(RoundStatus::Submitting));
        if reached_voting && was_before_voting {
            transitions.push(MatchTransition::VotingStarted {
                ordinal: round.ordinal,
                forced: round.was_forced(RoundStatus::Submitting),
            });
        }
        if round.status == RoundStatus::Reviewed {
            transitions.push(MatchTransition::RoundReviewed {
                ordinal: round.ordinal,
                winner: round.winner.clone(),
                forced: round.was_forced(RoundStatus::Voting),
            });
        }
    }

    transitions
}

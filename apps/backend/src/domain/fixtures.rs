#![cfg(test)]

//! Aggregates in well-known states for domain tests.

use std::time::Duration;

use time::OffsetDateTime;

use super::ids::{ImageRef, PlayerId};
use super::invitation::{create_match, respond, NewMatch};
use super::round_engine::submit_image;
use super::rules::MatchRules;
use super::state::Match;

pub const HOUR: Duration = Duration::from_secs(3600);

/// Pending match; `roster[0]` is the creator.
pub fn pending_match(roster: &[PlayerId], total_rounds: u16, now: OffsetDateTime) -> Match {
    create_match(
        NewMatch {
            creator: roster[0],
            invited: roster[1..].to_vec(),
            total_rounds: Some(total_rounds),
            phase_timeout: Some(HOUR),
        },
        &MatchRules::default(),
        now,
    )
    .expect("fixture roster is valid")
}

/// Every player has accepted; round 1 is Submitting.
pub fn active_match(roster: &[PlayerId], total_rounds: u16, now: OffsetDateTime) -> Match {
    let mut m = pending_match(roster, total_rounds, now);
    for p in &roster[1..] {
        respond(&mut m, *p, true, now).expect("fixture accept");
    }
    m
}

pub fn image_of(player: PlayerId, ordinal: u16) -> ImageRef {
    ImageRef::new(format!("img-{player}-r{ordinal}"))
}

/// Active match whose current round has just moved to Voting.
pub fn voting_match(roster: &[PlayerId], total_rounds: u16, now: OffsetDateTime) -> Match {
    let mut m = active_match(roster, total_rounds, now);
    let ordinal = m.rounds.len() as u16;
    for p in roster {
        submit_image(&mut m, *p, image_of(*p, ordinal), now).expect("fixture submit");
    }
    m
}

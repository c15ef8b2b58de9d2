//! Property tests for the match lifecycle (pure domain, no store).
//!
//! - Active iff every invited player accepted; Cancelled iff anyone declined,
//!   whatever the answering order.
//! - Random action sequences never break aggregate invariants, never exceed
//!   total_rounds and complete exactly on the final review.
//! - Winner resolution is deterministic: most votes, earliest submission on ties.

use proptest::prelude::*;
use time::macros::datetime;
use time::Duration as TimeDuration;

use crate::domain::fixtures::{active_match, image_of, pending_match};
use crate::domain::invitation::respond;
use crate::domain::round_engine::{cast_vote, force_advance, resolve_winner, submit_image};
use crate::domain::state::{MatchStatus, Round, RoundStatus, Submission, Vote};
use crate::domain::test_gens::{self, Action};
use crate::domain::ImageRef;
use crate::errors::domain::{ConflictKind, DomainError};

proptest! {
    #![proptest_config(test_gens::proptest_config())]

    #[test]
    fn prop_activation_iff_all_accept((roster, script) in test_gens::invitation_script()) {
        let now = datetime!(2025-03-01 09:00 UTC);
        let mut m = pending_match(&roster, 3, now);
        let mut declined_seen = false;

        for (idx, accept) in &script {
            let result = respond(&mut m, roster[*idx], *accept, now);
            if declined_seen {
                let closed = matches!(result, Err(DomainError::Conflict(ConflictKind::MatchClosed, _)));
                prop_assert!(closed, "responses after a decline must fail MatchClosed");
            } else {
                prop_assert!(result.is_ok());
                declined_seen = !*accept;
            }
            prop_assert!(m.check_invariants().is_ok(), "{:?}", m.check_invariants());
        }

        let all_accept = script.iter().all(|(_, a)| *a);
        prop_assert_eq!(m.status == MatchStatus::Active, all_accept);
        prop_assert_eq!(m.status == MatchStatus::Cancelled, !all_accept);
        if all_accept {
            prop_assert_eq!(m.rounds.len(), 1);
            prop_assert_eq!(m.rounds[0].status, RoundStatus::Submitting);
        }
    }

    #[test]
    fn prop_random_actions_keep_invariants(
        roster in test_gens::roster(),
        total_rounds in 1u16..=3,
        actions in prop::collection::vec(test_gens::action(), 0..120),
    ) {
        let mut now = datetime!(2025-03-01 09:00 UTC);
        let mut m = active_match(&roster, total_rounds, now);
        let n = roster.len();

        for action in actions {
            now += TimeDuration::seconds(7);
            let ordinal = m.rounds.len() as u16;
            let _ = match action {
                Action::Submit(i) => {
                    let p = roster[i % n];
                    submit_image(&mut m, p, image_of(p, ordinal), now).map(|_| ())
                }
                Action::Vote(i, j) => {
                    let voter = roster[i % n];
                    let target = roster[j % n];
                    cast_vote(&mut m, voter, image_of(target, ordinal), now).map(|_| ())
                }
                Action::Deadline => force_advance(&mut m, now).map(|_| ()),
            };

            prop_assert!(m.check_invariants().is_ok(), "{:?}", m.check_invariants());
            prop_assert!(m.rounds.len() <= usize::from(total_rounds));
            for round in &m.rounds {
                prop_assert!(round.votes.iter().all(|v| round.author_of(&v.image) != Some(v.voter)));
            }
            let finished = m.rounds.len() == usize::from(total_rounds)
                && m.rounds.last().map(|r| r.status) == Some(RoundStatus::Reviewed);
            prop_assert_eq!(m.status == MatchStatus::Completed, finished);
        }
    }

    #[test]
    fn prop_winner_is_most_voted_earliest_on_ties(
        n in 1usize..=10,
        targets in (1usize..=10).prop_flat_map(test_gens::vote_targets),
    ) {
        let now = datetime!(2025-03-01 09:00 UTC);
        let images: Vec<ImageRef> = (0..n).map(|i| ImageRef::new(format!("img-{i}"))).collect();
        let round = Round {
            ordinal: 1,
            status: RoundStatus::Voting,
            phase_started_at: now,
            deadline: None,
            submissions: images
                .iter()
                .enumerate()
                .map(|(i, image)| Submission {
                    player_id: i as i64 + 1,
                    image: image.clone(),
                    submitted_at: now + TimeDuration::seconds(i as i64),
                })
                .collect(),
            votes: targets
                .iter()
                .filter(|t| **t < n)
                .enumerate()
                .map(|(k, t)| Vote {
                    voter: 100 + k as i64,
                    image: images[*t].clone(),
                    cast_at: now,
                })
                .collect(),
            winner: None,
            forced: Vec::new(),
        };

        let mut counts = vec![0u32; n];
        for t in targets.iter().filter(|t| **t < n) {
            counts[*t] += 1;
        }
        let max = counts.iter().copied().max().unwrap_or(0);
        let expected = if max == 0 {
            None
        } else {
            counts.iter().position(|c| *c == max).map(|i| images[i].clone())
        };

        prop_assert_eq!(resolve_winner(&round), expected.clone());
        // Same input, same answer.
        prop_assert_eq!(resolve_winner(&round.clone()), expected);
    }
}

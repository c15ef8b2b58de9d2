use time::macros::datetime;

use crate::domain::fixtures::{active_match, image_of, pending_match, voting_match, HOUR};
use crate::domain::round_engine::{
    cast_vote, force_advance, resolve_winner, submit_image, RoundProgress,
};
use crate::domain::standings::standings;
use crate::domain::state::{MatchStatus, RoundStatus};
use crate::domain::ImageRef;
use crate::errors::domain::{ConflictKind, DomainError, ValidationKind};

const ROSTER: [i64; 4] = [1, 2, 3, 4];

#[test]
fn full_submissions_open_voting_with_fresh_deadline() {
    let start = datetime!(2025-04-01 08:00 UTC);
    let later = datetime!(2025-04-01 08:20 UTC);
    let mut m = active_match(&ROSTER, 4, start);

    for p in [1, 2, 3] {
        assert_eq!(
            submit_image(&mut m, p, image_of(p, 1), start).unwrap(),
            RoundProgress::Unchanged
        );
    }
    assert_eq!(
        submit_image(&mut m, 4, image_of(4, 1), later).unwrap(),
        RoundProgress::VotingOpened
    );

    let round = m.current_round().unwrap();
    assert_eq!(round.status, RoundStatus::Voting);
    assert_eq!(round.deadline, Some(later + HOUR));
    assert!(round.forced.is_empty());
}

#[test]
fn cyclic_votes_pick_earliest_submission() {
    let now = datetime!(2025-04-01 08:00 UTC);
    let mut m = voting_match(&ROSTER, 4, now);

    // A->B, B->C, C->D, D->A: one vote each.
    let pairs = [(1, 2), (2, 3), (3, 4)];
    for (voter, target) in pairs {
        assert_eq!(
            cast_vote(&mut m, voter, image_of(target, 1), now).unwrap(),
            RoundProgress::Unchanged
        );
    }
    assert_eq!(
        cast_vote(&mut m, 4, image_of(1, 1), now).unwrap(),
        RoundProgress::Reviewed {
            match_completed: false
        }
    );

    let reviewed = m.round(1).unwrap();
    assert_eq!(reviewed.status, RoundStatus::Reviewed);
    assert_eq!(reviewed.winner, Some(image_of(1, 1)));
    assert_eq!(reviewed.deadline, None);

    let next = m.current_round().unwrap();
    assert_eq!(next.ordinal, 2);
    assert_eq!(next.status, RoundStatus::Submitting);
}

#[test]
fn submission_checks_in_order() {
    let now = datetime!(2025-04-01 08:00 UTC);
    let mut m = active_match(&ROSTER, 4, now);
    submit_image(&mut m, 1, image_of(1, 1), now).unwrap();

    assert!(matches!(
        submit_image(&mut m, 99, image_of(99, 1), now),
        Err(DomainError::Validation(ValidationKind::NotInRoster, _))
    ));
    // Replay of the same submission.
    assert!(matches!(
        submit_image(&mut m, 1, image_of(1, 1), now),
        Err(DomainError::Conflict(ConflictKind::DuplicateSubmission, _))
    ));
    // Someone else's image.
    assert!(matches!(
        submit_image(&mut m, 2, image_of(1, 1), now),
        Err(DomainError::Conflict(ConflictKind::DuplicateSubmission, _))
    ));
    assert!(matches!(
        submit_image(&mut m, 2, ImageRef::new(" "), now),
        Err(DomainError::Validation(ValidationKind::UnknownImage, _))
    ));
    assert_eq!(m.current_round().unwrap().submissions.len(), 1);
}

#[test]
fn vote_checks_in_order() {
    let now = datetime!(2025-04-01 08:00 UTC);
    let mut m = voting_match(&ROSTER, 4, now);

    assert!(matches!(
        submit_image(&mut m, 1, ImageRef::new("late"), now),
        Err(DomainError::Conflict(ConflictKind::NotAcceptingSubmissions, _))
    ));
    assert!(matches!(
        cast_vote(&mut m, 99, image_of(1, 1), now),
        Err(DomainError::Validation(ValidationKind::NotInRoster, _))
    ));
    assert!(matches!(
        cast_vote(&mut m, 1, ImageRef::new("nope"), now),
        Err(DomainError::Validation(ValidationKind::UnknownImage, _))
    ));
    assert!(matches!(
        cast_vote(&mut m, 1, image_of(1, 1), now),
        Err(DomainError::Validation(ValidationKind::SelfVoteForbidden, _))
    ));

    cast_vote(&mut m, 1, image_of(2, 1), now).unwrap();
    assert!(matches!(
        cast_vote(&mut m, 1, image_of(2, 1), now),
        Err(DomainError::Conflict(ConflictKind::DuplicateVote, _))
    ));
}

#[test]
fn pending_match_rejects_round_actions() {
    let now = datetime!(2025-04-01 08:00 UTC);
    let mut m = pending_match(&ROSTER, 4, now);
    assert!(matches!(
        submit_image(&mut m, 1, image_of(1, 1), now),
        Err(DomainError::Conflict(ConflictKind::NotAcceptingSubmissions, _))
    ));
    assert!(matches!(
        cast_vote(&mut m, 1, image_of(2, 1), now),
        Err(DomainError::Conflict(ConflictKind::NotVoting, _))
    ));
}

#[test]
fn forced_submitting_with_partial_submissions() {
    let now = datetime!(2025-04-01 08:00 UTC);
    let mut m = active_match(&ROSTER, 4, now);
    submit_image(&mut m, 1, image_of(1, 1), now).unwrap();
    submit_image(&mut m, 2, image_of(2, 1), now).unwrap();

    assert_eq!(
        force_advance(&mut m, now + HOUR).unwrap(),
        RoundProgress::VotingOpened
    );
    let round = m.current_round().unwrap();
    assert_eq!(round.status, RoundStatus::Voting);
    assert!(round.was_forced(RoundStatus::Submitting));
    assert_eq!(round.submissions.len(), 2);
    assert_eq!(round.eligible_voters(&m.roster), vec![1, 2, 3, 4]);

    assert!(matches!(
        submit_image(&mut m, 3, image_of(3, 1), now + HOUR),
        Err(DomainError::Conflict(ConflictKind::NotAcceptingSubmissions, _))
    ));
    cast_vote(&mut m, 3, image_of(1, 1), now + HOUR).unwrap();
    cast_vote(&mut m, 4, image_of(2, 1), now + HOUR).unwrap();
    cast_vote(&mut m, 1, image_of(2, 1), now + HOUR).unwrap();
    let progress = cast_vote(&mut m, 2, image_of(1, 1), now + HOUR).unwrap();
    assert_eq!(
        progress,
        RoundProgress::Reviewed {
            match_completed: false
        }
    );
    // 2 votes each; image 1 was submitted first.
    assert_eq!(m.round(1).unwrap().winner, Some(image_of(1, 1)));
}

#[test]
fn zero_submissions_then_zero_votes_has_no_winner() {
    let now = datetime!(2025-04-01 08:00 UTC);
    let mut m = active_match(&ROSTER, 2, now);

    force_advance(&mut m, now + HOUR).unwrap();
    let round = m.current_round().unwrap();
    assert_eq!(round.status, RoundStatus::Voting);
    assert!(round.submissions.is_empty());
    assert!(round.eligible_voters(&m.roster).is_empty());
    // Nobody can vote, so voting is due at once.
    assert_eq!(round.deadline, Some(now + HOUR));

    force_advance(&mut m, now + HOUR).unwrap();
    let reviewed = m.round(1).unwrap();
    assert_eq!(reviewed.status, RoundStatus::Reviewed);
    assert_eq!(reviewed.winner, None);
    assert!(reviewed.was_forced(RoundStatus::Submitting));
    assert!(reviewed.was_forced(RoundStatus::Voting));
    assert_eq!(m.current_round().unwrap().ordinal, 2);
}

#[test]
fn single_submitter_round_finishes_when_others_vote() {
    let now = datetime!(2025-04-01 08:00 UTC);
    let mut m = active_match(&ROSTER, 4, now);
    submit_image(&mut m, 1, image_of(1, 1), now).unwrap();
    force_advance(&mut m, now).unwrap();

    let round = m.current_round().unwrap();
    // The sole submitter has nothing to vote for.
    assert_eq!(round.eligible_voters(&m.roster), vec![2, 3, 4]);

    cast_vote(&mut m, 2, image_of(1, 1), now).unwrap();
    cast_vote(&mut m, 3, image_of(1, 1), now).unwrap();
    let progress = cast_vote(&mut m, 4, image_of(1, 1), now).unwrap();
    assert!(matches!(progress, RoundProgress::Reviewed { .. }));
}

#[test]
fn final_review_completes_match() {
    let now = datetime!(2025-04-01 08:00 UTC);
    let mut m = active_match(&ROSTER, 1, now);
    force_advance(&mut m, now).unwrap();
    let progress = force_advance(&mut m, now + HOUR).unwrap();

    assert_eq!(
        progress,
        RoundProgress::Reviewed {
            match_completed: true
        }
    );
    assert_eq!(m.status, MatchStatus::Completed);
    assert_eq!(m.ended_at, Some(now + HOUR));
    assert_eq!(m.rounds.len(), 1);
    assert!(m.deadline_phase().is_none());

    assert!(matches!(
        submit_image(&mut m, 1, image_of(1, 2), now),
        Err(DomainError::Conflict(ConflictKind::MatchClosed, _))
    ));
    assert!(matches!(
        force_advance(&mut m, now),
        Err(DomainError::Conflict(ConflictKind::MatchClosed, _))
    ));
}

#[test]
fn winner_requires_votes() {
    let now = datetime!(2025-04-01 08:00 UTC);
    let m = voting_match(&ROSTER, 4, now);
    assert_eq!(resolve_winner(m.current_round().unwrap()), None);
}

#[test]
fn standings_sum_votes_and_wins() {
    let now = datetime!(2025-04-01 08:00 UTC);
    let mut m = voting_match(&ROSTER, 2, now);
    cast_vote(&mut m, 1, image_of(3, 1), now).unwrap();
    cast_vote(&mut m, 2, image_of(3, 1), now).unwrap();
    cast_vote(&mut m, 3, image_of(4, 1), now).unwrap();
    cast_vote(&mut m, 4, image_of(3, 1), now).unwrap();

    let table = standings(&m);
    assert_eq!(table[0].player_id, 3);
    assert_eq!(table[0].votes_received, 3);
    assert_eq!(table[0].rounds_won, 1);
    assert_eq!(table[1].player_id, 4);
    assert_eq!(table[1].votes_received, 1);
    assert_eq!(table[1].rounds_won, 0);
    assert_eq!(table.len(), 4);
}

use std::time::Duration;

use time::macros::datetime;

use crate::domain::fixtures::{pending_match, HOUR};
use crate::domain::invitation::{
    create_match, expire_invitations, respond, InvitationOutcome, NewMatch,
};
use crate::domain::rules::MatchRules;
use crate::domain::state::{MatchStatus, RoundStatus};
use crate::errors::domain::{ConflictKind, DomainError, ValidationKind};

fn new_match(creator: i64, invited: Vec<i64>) -> NewMatch {
    NewMatch {
        creator,
        invited,
        total_rounds: None,
        phase_timeout: None,
    }
}

#[test]
fn create_puts_creator_first_and_pre_accepted() {
    let now = datetime!(2025-02-01 10:00 UTC);
    let m = create_match(new_match(7, vec![3, 4, 5]), &MatchRules::default(), now).unwrap();

    assert_eq!(m.roster, vec![7, 3, 4, 5]);
    assert_eq!(m.roster.first(), Some(&7));
    assert_eq!(m.accepted, vec![7]);
    assert_eq!(m.pending(), vec![3, 4, 5]);
    assert_eq!(m.status, MatchStatus::Pending);
    assert_eq!(m.total_rounds, 4);
    assert_eq!(m.phase_timeout, Duration::from_secs(36 * 3600));
    assert_eq!(m.invitation_deadline, Some(now + m.phase_timeout));
    assert!(m.rounds.is_empty());
    assert!(m.check_invariants().is_ok());
}

#[test]
fn creator_listed_among_invited_is_a_duplicate() {
    let now = datetime!(2025-02-01 10:00 UTC);
    let err = create_match(new_match(1, vec![2, 1, 3, 4]), &MatchRules::default(), now)
        .unwrap_err();
    assert!(matches!(
        err,
        DomainError::Validation(ValidationKind::InvalidRoster, _)
    ));
}

#[test]
fn create_rejects_small_roster_and_duplicates() {
    let now = datetime!(2025-02-01 10:00 UTC);
    let rules = MatchRules::default();

    let err = create_match(new_match(1, vec![2, 3]), &rules, now).unwrap_err();
    assert!(matches!(
        err,
        DomainError::Validation(ValidationKind::InvalidRoster, _)
    ));

    let err = create_match(new_match(1, vec![2, 3, 3, 4]), &rules, now).unwrap_err();
    assert!(matches!(
        err,
        DomainError::Validation(ValidationKind::InvalidRoster, _)
    ));
}

#[test]
fn create_rejects_out_of_range_settings() {
    let now = datetime!(2025-02-01 10:00 UTC);
    let rules = MatchRules::default();

    let mut req = new_match(1, vec![2, 3, 4]);
    req.total_rounds = Some(0);
    assert!(matches!(
        create_match(req, &rules, now),
        Err(DomainError::Validation(ValidationKind::InvalidSettings, _))
    ));

    let mut req = new_match(1, vec![2, 3, 4]);
    req.phase_timeout = Some(Duration::from_secs(5));
    assert!(matches!(
        create_match(req, &rules, now),
        Err(DomainError::Validation(ValidationKind::InvalidSettings, _))
    ));
}

#[test]
fn decline_cancels_and_blocks_further_answers() {
    let now = datetime!(2025-02-01 10:00 UTC);
    let mut m = pending_match(&[1, 2, 3, 4], 4, now);

    assert_eq!(
        respond(&mut m, 2, true, now).unwrap(),
        InvitationOutcome::StillPending
    );
    assert_eq!(
        respond(&mut m, 3, true, now).unwrap(),
        InvitationOutcome::StillPending
    );
    assert_eq!(
        respond(&mut m, 4, false, now).unwrap(),
        InvitationOutcome::Cancelled
    );
    assert_eq!(m.status, MatchStatus::Cancelled);
    assert_eq!(m.ended_at, Some(now));
    assert_eq!(m.invitation_deadline, None);

    let err = respond(&mut m, 4, true, now).unwrap_err();
    assert!(matches!(
        err,
        DomainError::Conflict(ConflictKind::MatchClosed, _)
    ));
}

#[test]
fn last_accept_starts_round_one() {
    let start = datetime!(2025-02-01 10:00 UTC);
    let later = datetime!(2025-02-01 10:30 UTC);
    let mut m = pending_match(&[1, 2, 3, 4], 4, start);

    respond(&mut m, 2, true, start).unwrap();
    respond(&mut m, 3, true, start).unwrap();
    assert_eq!(
        respond(&mut m, 4, true, later).unwrap(),
        InvitationOutcome::Started
    );

    assert_eq!(m.status, MatchStatus::Active);
    assert_eq!(m.invitation_deadline, None);
    let round = m.current_round().unwrap();
    assert_eq!(round.ordinal, 1);
    assert_eq!(round.status, RoundStatus::Submitting);
    assert_eq!(round.deadline, Some(later + HOUR));
}

#[test]
fn repeated_answer_is_already_responded() {
    let now = datetime!(2025-02-01 10:00 UTC);
    let mut m = pending_match(&[1, 2, 3, 4], 4, now);
    respond(&mut m, 2, true, now).unwrap();

    assert!(matches!(
        respond(&mut m, 2, true, now),
        Err(DomainError::Conflict(ConflictKind::AlreadyResponded, _))
    ));
    // The creator accepted at creation.
    assert!(matches!(
        respond(&mut m, 1, false, now),
        Err(DomainError::Conflict(ConflictKind::AlreadyResponded, _))
    ));
}

#[test]
fn outsider_is_not_in_roster() {
    let now = datetime!(2025-02-01 10:00 UTC);
    let mut m = pending_match(&[1, 2, 3, 4], 4, now);
    assert!(matches!(
        respond(&mut m, 99, true, now),
        Err(DomainError::Validation(ValidationKind::NotInRoster, _))
    ));
}

#[test]
fn answers_after_start_are_match_closed() {
    let now = datetime!(2025-02-01 10:00 UTC);
    let mut m = pending_match(&[1, 2, 3, 4], 4, now);
    for p in [2, 3, 4] {
        respond(&mut m, p, true, now).unwrap();
    }
    assert!(matches!(
        respond(&mut m, 2, false, now),
        Err(DomainError::Conflict(ConflictKind::MatchClosed, _))
    ));
}

#[test]
fn expiry_declines_everyone_still_pending() {
    let now = datetime!(2025-02-01 10:00 UTC);
    let mut m = pending_match(&[1, 2, 3, 4, 5], 4, now);
    respond(&mut m, 3, true, now).unwrap();

    let expired = expire_invitations(&mut m, now + HOUR).unwrap();
    assert_eq!(expired, vec![2, 4, 5]);
    assert_eq!(m.status, MatchStatus::Cancelled);
    assert_eq!(m.declined, vec![2, 4, 5]);
    assert!(m.pending().is_empty());
    assert!(m.check_invariants().is_ok());

    assert!(matches!(
        expire_invitations(&mut m, now + HOUR),
        Err(DomainError::Conflict(ConflictKind::MatchClosed, _))
    ));
}

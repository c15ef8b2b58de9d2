//! Pre-start lifecycle: match creation and invitation responses.

use std::time::Duration;

use time::OffsetDateTime;

use super::ids::{MatchId, PlayerId};
use super::round_engine::start_round;
use super::rules::MatchRules;
use super::state::{Match, MatchStatus};
use crate::errors::domain::{ConflictKind, DomainError, ValidationKind};

/// Parameters for a new match. Optional settings fall back to the rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMatch {
    pub creator: PlayerId,
    pub invited: Vec<PlayerId>,
    pub total_rounds: Option<u16>,
    pub phase_timeout: Option<Duration>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvitationOutcome {
    StillPending,
    Started,
    Cancelled,
}

/// Build a Pending match with the creator pre-accepted.
pub fn create_match(
    req: NewMatch,
    rules: &MatchRules,
    now: OffsetDateTime,
) -> Result<Match, DomainError> {
    let mut roster = Vec::with_capacity(req.invited.len() + 1);
    roster.push(req.creator);
    roster.extend_from_slice(&req.invited);

    rules.validate_roster(&roster)?;
    let total_rounds = rules.resolve_total_rounds(req.total_rounds, roster.len())?;
    let phase_timeout = rules.resolve_phase_timeout(req.phase_timeout)?;

    Ok(Match {
        id: MatchId::new(),
        roster,
        total_rounds,
        phase_timeout,
        status: MatchStatus::Pending,
        rounds: Vec::new(),
        accepted: vec![req.creator],
        declined: Vec::new(),
        invitation_deadline: Some(now + phase_timeout),
        created_at: now,
        updated_at: now,
        ended_at: None,
    })
}

/// Record one player's answer. Only valid while the match is Pending.
pub fn respond(
    m: &mut Match,
    player: PlayerId,
    accept: bool,
    now: OffsetDateTime,
) -> Result<InvitationOutcome, DomainError> {
    if m.status != MatchStatus::Pending {
        return Err(DomainError::conflict(
            ConflictKind::MatchClosed,
            format!("Match {} is no longer taking invitation responses", m.id),
        ));
    }
    if !m.is_member(player) {
        return Err(DomainError::validation(
            ValidationKind::NotInRoster,
            format!("Player {player} was not invited to match {}", m.id),
        ));
    }
    if m.has_responded(player) {
        return Err(DomainError::conflict(
            ConflictKind::AlreadyResponded,
            format!("Player {player} already answered the invitation"),
        ));
    }

    if !accept {
        m.declined.push(player);
        cancel(m, now);
        return Ok(InvitationOutcome::Cancelled);
    }

    m.accepted.push(player);
    if m.pending().is_empty() {
        m.status = MatchStatus::Active;
        m.invitation_deadline = None;
        start_round(m, now);
        return Ok(InvitationOutcome::Started);
    }
    Ok(InvitationOutcome::StillPending)
}

/// Invitation window elapsed: everyone still undecided is declined.
pub fn expire_invitations(m: &mut Match, now: OffsetDateTime) -> Result<Vec<PlayerId>, DomainError> {
    if m.status != MatchStatus::Pending {
        return Err(DomainError::conflict(
            ConflictKind::MatchClosed,
            format!("Match {} is not waiting for invitations", m.id),
        ));
    }
    let expired = m.pending();
    m.declined.extend(expired.iter().copied());
    cancel(m, now);
    Ok(expired)
}

fn cancel(m: &mut Match, now: OffsetDateTime) {
    m.status = MatchStatus::Cancelled;
    m.invitation_deadline = None;
    m.ended_at = Some(now);
}

//! Round state machine: Submitting -> Voting -> Reviewed.
//!
//! Every entry point checks, in order: match/round phase, roster membership,
//! duplicates, then the image itself.

use time::OffsetDateTime;
use tracing::info;

use super::ids::{ImageRef, PlayerId};
use super::state::{Match, MatchStatus, Round, RoundStatus, Submission, Vote};
use crate::errors::domain::{ConflictKind, DomainError, ValidationKind};

/// What an action did to the round beyond recording itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundProgress {
    Unchanged,
    VotingOpened,
    Reviewed { match_completed: bool },
}

pub(crate) fn start_round(m: &mut Match, now: OffsetDateTime) {
    let ordinal = m.rounds.last().map_or(1, |r| r.ordinal + 1);
    m.rounds.push(Round::open(ordinal, now, m.phase_timeout));
}

fn ensure_active(m: &Match, pending_kind: ConflictKind) -> Result<(), DomainError> {
    match m.status {
        MatchStatus::Active => Ok(()),
        MatchStatus::Pending => Err(DomainError::conflict(
            pending_kind,
            format!("Match {} has not started yet", m.id),
        )),
        MatchStatus::Completed | MatchStatus::Cancelled => Err(DomainError::conflict(
            ConflictKind::MatchClosed,
            format!("Match {} is {:?}", m.id, m.status),
        )),
    }
}

fn ensure_member(m: &Match, player: PlayerId) -> Result<(), DomainError> {
    if m.is_member(player) {
        Ok(())
    } else {
        Err(DomainError::validation(
            ValidationKind::NotInRoster,
            format!("Player {player} is not in match {}", m.id),
        ))
    }
}

fn current_round_mut(m: &mut Match) -> Result<&mut Round, DomainError> {
    let id = m.id;
    m.current_round_mut().ok_or_else(|| {
        DomainError::infra(
            crate::errors::domain::InfraErrorKind::DataCorruption,
            format!("Active match {id} has no current round"),
        )
    })
}

pub fn submit_image(
    m: &mut Match,
    player: PlayerId,
    image: ImageRef,
    now: OffsetDateTime,
) -> Result<RoundProgress, DomainError> {
    ensure_active(m, ConflictKind::NotAcceptingSubmissions)?;
    let roster = m.roster.clone();
    let round = current_round_mut(m)?;
    if round.status != RoundStatus::Submitting {
        return Err(DomainError::conflict(
            ConflictKind::NotAcceptingSubmissions,
            format!("Round {} is no longer accepting submissions", round.ordinal),
        ));
    }
    if !roster.contains(&player) {
        return Err(DomainError::validation(
            ValidationKind::NotInRoster,
            format!("Player {player} is not in this match"),
        ));
    }
    if round.submission_by(player).is_some() {
        return Err(DomainError::conflict(
            ConflictKind::DuplicateSubmission,
            format!("Player {player} already submitted in round {}", round.ordinal),
        ));
    }
    if image.is_blank() {
        return Err(DomainError::validation(
            ValidationKind::UnknownImage,
            "Image reference must not be empty",
        ));
    }
    if round.author_of(&image).is_some() {
        return Err(DomainError::conflict(
            ConflictKind::DuplicateSubmission,
            format!("Image {image} was already submitted in round {}", round.ordinal),
        ));
    }

    round.submissions.push(Submission {
        player_id: player,
        image,
        submitted_at: now,
    });

    if round.pending_submitters(&roster).is_empty() {
        open_voting(m, now)?;
        return Ok(RoundProgress::VotingOpened);
    }
    Ok(RoundProgress::Unchanged)
}

pub fn cast_vote(
    m: &mut Match,
    voter: PlayerId,
    image: ImageRef,
    now: OffsetDateTime,
) -> Result<RoundProgress, DomainError> {
    ensure_active(m, ConflictKind::NotVoting)?;
    let roster = m.roster.clone();
    let round = current_round_mut(m)?;
    if round.status != RoundStatus::Voting {
        return Err(DomainError::conflict(
            ConflictKind::NotVoting,
            format!("Round {} is not in voting", round.ordinal),
        ));
    }
    if !roster.contains(&voter) {
        return Err(DomainError::validation(
            ValidationKind::NotInRoster,
            format!("Player {voter} is not in this match"),
        ));
    }
    if round.vote_by(voter).is_some() {
        return Err(DomainError::conflict(
            ConflictKind::DuplicateVote,
            format!("Player {voter} already voted in round {}", round.ordinal),
        ));
    }
    match round.author_of(&image) {
        None => {
            return Err(DomainError::validation(
                ValidationKind::UnknownImage,
                format!("Image {image} was not submitted in round {}", round.ordinal),
            ))
        }
        Some(author) if author == voter => {
            return Err(DomainError::validation(
                ValidationKind::SelfVoteForbidden,
                "Players cannot vote for their own image",
            ))
        }
        Some(_) => {}
    }

    round.votes.push(Vote {
        voter,
        image,
        cast_at: now,
    });

    if round.pending_voters(&roster).is_empty() {
        let completed = close_round(m, now)?;
        return Ok(RoundProgress::Reviewed {
            match_completed: completed,
        });
    }
    Ok(RoundProgress::Unchanged)
}

/// Close the current phase with whatever has been collected so far.
pub fn force_advance(m: &mut Match, now: OffsetDateTime) -> Result<RoundProgress, DomainError> {
    ensure_active(m, ConflictKind::MatchClosed)?;
    let round = current_round_mut(m)?;
    match round.status {
        RoundStatus::Submitting => {
            round.forced.push(RoundStatus::Submitting);
            info!(
                match_id = %m.id,
                ordinal = m.rounds.len(),
                "Submission deadline reached; opening voting with current submissions"
            );
            open_voting(m, now)?;
            Ok(RoundProgress::VotingOpened)
        }
        RoundStatus::Voting => {
            round.forced.push(RoundStatus::Voting);
            info!(
                match_id = %m.id,
                ordinal = m.rounds.len(),
                "Voting deadline reached; reviewing round with current votes"
            );
            let completed = close_round(m, now)?;
            Ok(RoundProgress::Reviewed {
                match_completed: completed,
            })
        }
        RoundStatus::Reviewed => Err(DomainError::conflict(
            ConflictKind::NotVoting,
            format!("Round {} is already reviewed", round.ordinal),
        )),
    }
}

/// Strictly most votes wins; ties go to the earliest submission; no votes means no winner.
pub fn resolve_winner(round: &Round) -> Option<ImageRef> {
    let mut best: Option<(ImageRef, u32)> = None;
    for (image, count) in round.tally() {
        if count == 0 {
            continue;
        }
        match &best {
            Some((_, top)) if *top >= count => {}
            _ => best = Some((image, count)),
        }
    }
    best.map(|(image, _)| image)
}

/// A voting phase nobody can vote in is due immediately.
fn open_voting(m: &mut Match, now: OffsetDateTime) -> Result<(), DomainError> {
    let timeout = m.phase_timeout;
    let roster = m.roster.clone();
    let round = current_round_mut(m)?;
    round.status = RoundStatus::Voting;
    round.phase_started_at = now;
    round.deadline = if round.eligible_voters(&roster).is_empty() {
        Some(now)
    } else {
        Some(now + timeout)
    };
    Ok(())
}

/// Review the current round; returns true when that completed the match.
fn close_round(m: &mut Match, now: OffsetDateTime) -> Result<bool, DomainError> {
    let round = current_round_mut(m)?;
    round.winner = resolve_winner(round);
    round.status = RoundStatus::Reviewed;
    round.phase_started_at = now;
    round.deadline = None;
    let ordinal = round.ordinal;

    if ordinal >= m.total_rounds {
        m.status = MatchStatus::Completed;
        m.ended_at = Some(now);
        return Ok(true);
    }
    start_round(m, now);
    Ok(false)
}

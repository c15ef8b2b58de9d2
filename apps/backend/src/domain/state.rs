//! Match aggregate and round state.
//!
//! Everything here is plain data plus derived views; the transitions live in
//! `invitation` and `round_engine`.

use std::collections::HashSet;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::ids::{ImageRef, MatchId, PlayerId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    /// Waiting for every invited player to answer.
    Pending,
    Active,
    Completed,
    Cancelled,
}

impl MatchStatus {
    /// Completed and Cancelled matches never change again.
    pub fn is_closed(self) -> bool {
        matches!(self, MatchStatus::Completed | MatchStatus::Cancelled)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundStatus {
    Submitting,
    Voting,
    Reviewed,
}

/// The phase a deadline applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum Phase {
    Invitation,
    Round { ordinal: u16, status: RoundStatus },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub player_id: PlayerId,
    pub image: ImageRef,
    #[serde(with = "time::serde::rfc3339")]
    pub submitted_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    pub voter: PlayerId,
    pub image: ImageRef,
    #[serde(with = "time::serde::rfc3339")]
    pub cast_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Round {
    /// 1-based.
    pub ordinal: u16,
    pub status: RoundStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub phase_started_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub deadline: Option<OffsetDateTime>,
    pub submissions: Vec<Submission>,
    pub votes: Vec<Vote>,
    pub winner: Option<ImageRef>,
    /// Phases that were closed by their deadline rather than by full participation.
    #[serde(default)]
    pub forced: Vec<RoundStatus>,
}

impl Round {
    pub(crate) fn open(ordinal: u16, now: OffsetDateTime, timeout: Duration) -> Self {
        Self {
            ordinal,
            status: RoundStatus::Submitting,
            phase_started_at: now,
            deadline: Some(now + timeout),
            submissions: Vec::new(),
            votes: Vec::new(),
            winner: None,
            forced: Vec::new(),
        }
    }

    pub fn submission_by(&self, player: PlayerId) -> Option<&Submission> {
        self.submissions.iter().find(|s| s.player_id == player)
    }

    pub fn vote_by(&self, player: PlayerId) -> Option<&Vote> {
        self.votes.iter().find(|v| v.voter == player)
    }

    /// Player who submitted `image` this round, if any.
    pub fn author_of(&self, image: &ImageRef) -> Option<PlayerId> {
        self.submissions
            .iter()
            .find(|s| &s.image == image)
            .map(|s| s.player_id)
    }

    pub fn was_forced(&self, phase: RoundStatus) -> bool {
        self.forced.contains(&phase)
    }

    pub fn pending_submitters(&self, roster: &[PlayerId]) -> Vec<PlayerId> {
        roster
            .iter()
            .copied()
            .filter(|p| self.submission_by(*p).is_none())
            .collect()
    }

    /// Roster players who have at least one image by somebody else to vote for.
    pub fn eligible_voters(&self, roster: &[PlayerId]) -> Vec<PlayerId> {
        roster
            .iter()
            .copied()
            .filter(|p| self.submissions.iter().any(|s| s.player_id != *p))
            .collect()
    }

    pub fn pending_voters(&self, roster: &[PlayerId]) -> Vec<PlayerId> {
        self.eligible_voters(roster)
            .into_iter()
            .filter(|p| self.vote_by(*p).is_none())
            .collect()
    }

    /// Vote count per submitted image, in submission order.
    pub fn tally(&self) -> Vec<(ImageRef, u32)> {
        self.submissions
            .iter()
            .map(|s| {
                let count = self.votes.iter().filter(|v| v.image == s.image).count();
                (s.image.clone(), count as u32)
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    pub id: MatchId,
    /// Insertion order; the first entry is the creator.
    pub roster: Vec<PlayerId>,
    pub total_rounds: u16,
    pub phase_timeout: Duration,
    pub status: MatchStatus,
    pub rounds: Vec<Round>,
    pub accepted: Vec<PlayerId>,
    pub declined: Vec<PlayerId>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub invitation_deadline: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub ended_at: Option<OffsetDateTime>,
}

impl Match {
    pub fn is_member(&self, player: PlayerId) -> bool {
        self.roster.contains(&player)
    }

    pub fn has_responded(&self, player: PlayerId) -> bool {
        self.accepted.contains(&player) || self.declined.contains(&player)
    }

    /// Roster players who have neither accepted nor declined.
    pub fn pending(&self) -> Vec<PlayerId> {
        self.roster
            .iter()
            .copied()
            .filter(|p| !self.has_responded(*p))
            .collect()
    }

    pub fn round(&self, ordinal: u16) -> Option<&Round> {
        self.rounds.iter().find(|r| r.ordinal == ordinal)
    }

    /// The round currently in play. None unless the match is Active.
    pub fn current_round(&self) -> Option<&Round> {
        if self.status != MatchStatus::Active {
            return None;
        }
        self.rounds.last()
    }

    pub(crate) fn current_round_mut(&mut self) -> Option<&mut Round> {
        if self.status != MatchStatus::Active {
            return None;
        }
        self.rounds.last_mut()
    }

    /// The phase that currently has a deadline running, if any.
    pub fn deadline_phase(&self) -> Option<Phase> {
        match self.status {
            MatchStatus::Pending => Some(Phase::Invitation),
            MatchStatus::Active => self
                .current_round()
                .filter(|r| r.status != RoundStatus::Reviewed)
                .map(|r| Phase::Round {
                    ordinal: r.ordinal,
                    status: r.status,
                }),
            MatchStatus::Completed | MatchStatus::Cancelled => None,
        }
    }

    pub fn current_deadline(&self) -> Option<OffsetDateTime> {
        match self.deadline_phase()? {
            Phase::Invitation => self.invitation_deadline,
            Phase::Round { .. } => self.current_round().and_then(|r| r.deadline),
        }
    }

    /// Structural invariants every persisted aggregate must satisfy.
    pub fn check_invariants(&self) -> Result<(), String> {
        let mut seen = HashSet::new();
        if self.roster.iter().any(|p| !seen.insert(*p)) {
            return Err("roster contains duplicates".into());
        }
        for p in self.accepted.iter().chain(self.declined.iter()) {
            if !self.is_member(*p) {
                return Err(format!("player {p} responded but is not in the roster"));
            }
        }
        if self.accepted.iter().any(|p| self.declined.contains(p)) {
            return Err("a player both accepted and declined".into());
        }
        let responded: HashSet<_> = self.accepted.iter().chain(self.declined.iter()).collect();
        if responded.len() != self.accepted.len() + self.declined.len() {
            return Err("a response was recorded twice".into());
        }

        let all_accepted = self.pending().is_empty() && self.declined.is_empty();
        match self.status {
            MatchStatus::Pending => {
                if !self.declined.is_empty() || self.pending().is_empty() {
                    return Err("pending match must have undecided players and no declines".into());
                }
                if !self.rounds.is_empty() {
                    return Err("pending match has rounds".into());
                }
            }
            MatchStatus::Active | MatchStatus::Completed => {
                if !all_accepted {
                    return Err(format!("{:?} match without full acceptance", self.status));
                }
            }
            MatchStatus::Cancelled => {
                if self.declined.is_empty() {
                    return Err("cancelled match without a decline".into());
                }
            }
        }

        if self.rounds.len() > usize::from(self.total_rounds) {
            return Err("more rounds than total_rounds".into());
        }
        for (idx, round) in self.rounds.iter().enumerate() {
            if usize::from(round.ordinal) != idx + 1 {
                return Err(format!("round at index {idx} has ordinal {}", round.ordinal));
            }
            let is_last = idx + 1 == self.rounds.len();
            if !is_last && round.status != RoundStatus::Reviewed {
                return Err(format!("round {} is not reviewed but is not last", round.ordinal));
            }
            let mut submitters = HashSet::new();
            let mut images = HashSet::new();
            for s in &round.submissions {
                if !self.is_member(s.player_id) || !submitters.insert(s.player_id) {
                    return Err(format!("round {} has an invalid submission", round.ordinal));
                }
                if !images.insert(&s.image) {
                    return Err(format!("round {} has a repeated image", round.ordinal));
                }
            }
            let mut voters = HashSet::new();
            for v in &round.votes {
                if !self.is_member(v.voter) || !voters.insert(v.voter) {
                    return Err(format!("round {} has an invalid vote", round.ordinal));
                }
                match round.author_of(&v.image) {
                    Some(author) if author != v.voter => {}
                    _ => return Err(format!("round {} has a vote for a bad image", round.ordinal)),
                }
            }
        }

        let finished = self.rounds.len() == usize::from(self.total_rounds)
            && self
                .rounds
                .last()
                .is_some_and(|r| r.status == RoundStatus::Reviewed);
        if (self.status == MatchStatus::Completed) != finished {
            return Err("completed status does not match final round state".into());
        }
        if self.status == MatchStatus::Active && self.rounds.is_empty() {
            return Err("active match without a round".into());
        }
        Ok(())
    }
}

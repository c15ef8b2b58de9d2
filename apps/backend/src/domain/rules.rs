use std::collections::HashSet;
use std::time::Duration;

use super::ids::PlayerId;
use crate::errors::domain::{DomainError, ValidationKind};

pub const MIN_PLAYERS: usize = 4;
pub const MAX_PLAYERS: usize = 10;
pub const ROUNDS_PER_PLAYER: u16 = 1;
pub const MAX_ROUNDS: u16 = 50;
/// 36 hours.
pub const DEFAULT_PHASE_TIMEOUT: Duration = Duration::from_secs(36 * 60 * 60);
pub const MIN_PHASE_TIMEOUT: Duration = Duration::from_secs(60);
/// 7 days.
pub const MAX_PHASE_TIMEOUT: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Bounds applied when a match is created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchRules {
    pub min_players: usize,
    pub max_players: usize,
    /// Used for the default round count: roster size times this.
    pub rounds_per_player: u16,
    pub max_rounds: u16,
    pub default_phase_timeout: Duration,
    pub min_phase_timeout: Duration,
    pub max_phase_timeout: Duration,
}

impl Default for MatchRules {
    fn default() -> Self {
        Self {
            min_players: MIN_PLAYERS,
            max_players: MAX_PLAYERS,
            rounds_per_player: ROUNDS_PER_PLAYER,
            max_rounds: MAX_ROUNDS,
            default_phase_timeout: DEFAULT_PHASE_TIMEOUT,
            min_phase_timeout: MIN_PHASE_TIMEOUT,
            max_phase_timeout: MAX_PHASE_TIMEOUT,
        }
    }
}

impl MatchRules {
    /// Checks the rule set is usable before the service starts.
    pub fn validate(&self) -> Result<(), String> {
        if self.min_players < 2 {
            return Err(format!("min_players must be at least 2, got {}", self.min_players));
        }
        if self.min_players > self.max_players {
            return Err(format!(
                "min_players ({}) exceeds max_players ({})",
                self.min_players, self.max_players
            ));
        }
        if self.rounds_per_player == 0 || self.max_rounds == 0 {
            return Err("round counts must be positive".into());
        }
        if self.min_phase_timeout.is_zero() || self.min_phase_timeout > self.max_phase_timeout {
            return Err("phase timeout bounds are inverted or zero".into());
        }
        if self.default_phase_timeout < self.min_phase_timeout
            || self.default_phase_timeout > self.max_phase_timeout
        {
            return Err("default phase timeout is outside its bounds".into());
        }
        Ok(())
    }

    pub fn validate_roster(&self, roster: &[PlayerId]) -> Result<(), DomainError> {
        if roster.len() < self.min_players || roster.len() > self.max_players {
            return Err(DomainError::validation(
                ValidationKind::InvalidRoster,
                format!(
                    "A match needs between {} and {} players, got {}",
                    self.min_players,
                    self.max_players,
                    roster.len()
                ),
            ));
        }
        let mut seen = HashSet::with_capacity(roster.len());
        if let Some(dup) = roster.iter().find(|p| !seen.insert(**p)) {
            return Err(DomainError::validation(
                ValidationKind::InvalidRoster,
                format!("Player {dup} is listed more than once"),
            ));
        }
        Ok(())
    }

    pub fn resolve_total_rounds(
        &self,
        requested: Option<u16>,
        roster_len: usize,
    ) -> Result<u16, DomainError> {
        match requested {
            Some(n) if n == 0 || n > self.max_rounds => Err(DomainError::validation(
                ValidationKind::InvalidSettings,
                format!("total_rounds must be between 1 and {}, got {n}", self.max_rounds),
            )),
            Some(n) => Ok(n),
            None => {
                let per_player = u32::from(self.rounds_per_player);
                let derived = (roster_len as u32).saturating_mul(per_player);
                Ok(derived.clamp(1, u32::from(self.max_rounds)) as u16)
            }
        }
    }

    pub fn resolve_phase_timeout(&self, requested: Option<Duration>) -> Result<Duration, DomainError> {
        let timeout = requested.unwrap_or(self.default_phase_timeout);
        if timeout < self.min_phase_timeout || timeout > self.max_phase_timeout {
            return Err(DomainError::validation(
                ValidationKind::InvalidSettings,
                format!(
                    "phase timeout must be between {}s and {}s, got {}s",
                    self.min_phase_timeout.as_secs(),
                    self.max_phase_timeout.as_secs(),
                    timeout.as_secs()
                ),
            ));
        }
        Ok(timeout)
    }
}

//! Lock-free reads against the last committed snapshot.

use super::MatchOrchestrator;
use crate::domain::standings::standings;
use crate::domain::{MatchId, PlayerId, Round, Standing};
use crate::errors::domain::{DomainError, NotFoundKind};
use crate::repos::{require_match, MatchSnapshot};

impl MatchOrchestrator {
    pub async fn get_match(&self, match_id: MatchId) -> Result<MatchSnapshot, DomainError> {
        require_match(&*self.repo, match_id).await
    }

    pub async fn get_round(&self, match_id: MatchId, ordinal: u16) -> Result<Round, DomainError> {
        let snapshot = require_match(&*self.repo, match_id).await?;
        snapshot.aggregate.round(ordinal).cloned().ok_or_else(|| {
            DomainError::not_found(
                NotFoundKind::Round,
                format!("Round {ordinal} of match {match_id} not found"),
            )
        })
    }

    pub async fn list_matches_for_player(
        &self,
        player_id: PlayerId,
    ) -> Result<Vec<MatchSnapshot>, DomainError> {
        self.repo.list_for_player(player_id).await
    }

    pub async fn standings(&self, match_id: MatchId) -> Result<Vec<Standing>, DomainError> {
        let snapshot = require_match(&*self.repo, match_id).await?;
        Ok(standings(&snapshot.aggregate))
    }
}

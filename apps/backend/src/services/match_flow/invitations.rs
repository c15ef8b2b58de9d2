use std::collections::HashSet;

use tracing::info;

use super::MatchOrchestrator;
use crate::domain::invitation::{self, NewMatch};
use crate::domain::{MatchId, MatchStatus, MatchTransition, PlayerId};
use crate::errors::domain::{ConflictKind, DomainError, ValidationKind};
use crate::repos::MatchSnapshot;

impl MatchOrchestrator {
    /// Create a Pending match and open its invitation window.
    ///
    /// Fails with `MatchInProgress` while another open match has exactly the
    /// same players.
    pub async fn create_match(&self, req: NewMatch) -> Result<MatchSnapshot, DomainError> {
        let now = self.clock.now();
        let creator = req.creator;
        let aggregate = invitation::create_match(req, &self.rules, now)?;

        for player in &aggregate.roster {
            if self.players.get_player(*player).await?.is_none() {
                return Err(DomainError::validation(
                    ValidationKind::InvalidRoster,
                    format!("Unknown player {player}"),
                ));
            }
        }

        let group: HashSet<PlayerId> = aggregate.roster.iter().copied().collect();
        let existing = self.repo.list_for_player(creator).await?;
        if let Some(open) = existing.iter().find(|s| {
            !s.aggregate.status.is_closed()
                && s.aggregate.roster.len() == group.len()
                && s.aggregate.roster.iter().all(|p| group.contains(p))
        }) {
            return Err(DomainError::conflict(
                ConflictKind::MatchInProgress,
                format!(
                    "Match {} with these players is already in progress",
                    open.aggregate.id
                ),
            ));
        }

        let snapshot = self.repo.insert(&aggregate).await?;
        info!(
            match_id = %snapshot.aggregate.id,
            roster = ?snapshot.aggregate.roster,
            total_rounds = snapshot.aggregate.total_rounds,
            "Match created"
        );

        self.sync_deadline(&snapshot);
        self.publish(
            &snapshot,
            &[
                MatchTransition::MatchCreated {
                    roster: snapshot.aggregate.roster.clone(),
                },
                MatchTransition::StatusChanged {
                    status: MatchStatus::Pending,
                },
            ],
        );
        Ok(snapshot)
    }

    /// Accept or decline. A decline cancels the match; the last accept starts round 1.
    pub async fn respond_to_invitation(
        &self,
        match_id: MatchId,
        player_id: PlayerId,
        accept: bool,
    ) -> Result<MatchSnapshot, DomainError> {
        let result = self
            .run_mutation(match_id, |m, now| {
                let outcome = invitation::respond(m, player_id, accept, now)?;
                info!(
                    match_id = %m.id,
                    player_id,
                    accept,
                    outcome = ?outcome,
                    "Invitation answered"
                );
                Ok(vec![MatchTransition::InvitationAnswered {
                    player_id,
                    accepted: accept,
                }])
            })
            .await?;
        Ok(result.snapshot)
    }
}

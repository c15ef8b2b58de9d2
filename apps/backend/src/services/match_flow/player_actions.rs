use tracing::debug;

use super::MatchOrchestrator;
use crate::domain::round_engine;
use crate::domain::{ImageRef, MatchId, MatchTransition, PlayerId};
use crate::errors::domain::DomainError;
use crate::repos::MatchSnapshot;

impl MatchOrchestrator {
    pub async fn submit_image(
        &self,
        match_id: MatchId,
        player_id: PlayerId,
        image: ImageRef,
    ) -> Result<MatchSnapshot, DomainError> {
        let result = self
            .run_mutation(match_id, |m, now| {
                let ordinal = m.current_round().map_or(0, |r| r.ordinal);
                let progress = round_engine::submit_image(m, player_id, image, now)?;
                debug!(match_id = %m.id, player_id, ordinal, progress = ?progress, "Image submitted");
                Ok(vec![MatchTransition::ImageSubmitted { ordinal, player_id }])
            })
            .await?;
        Ok(result.snapshot)
    }

    pub async fn cast_vote(
        &self,
        match_id: MatchId,
        voter: PlayerId,
        image: ImageRef,
    ) -> Result<MatchSnapshot, DomainError> {
        let result = self
            .run_mutation(match_id, |m, now| {
                let ordinal = m.current_round().map_or(0, |r| r.ordinal);
                let progress = round_engine::cast_vote(m, voter, image, now)?;
                debug!(match_id = %m.id, player_id = voter, ordinal, progress = ?progress, "Vote cast");
                Ok(vec![MatchTransition::VoteCast {
                    ordinal,
                    player_id: voter,
                }])
            })
            .await?;
        Ok(result.snapshot)
    }
}

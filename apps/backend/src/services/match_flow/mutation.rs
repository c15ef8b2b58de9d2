use time::OffsetDateTime;
use tracing::debug;

use super::MatchOrchestrator;
use crate::domain::transition::{derive_match_transitions, MatchTransition};
use crate::domain::{Match, MatchId};
use crate::errors::domain::DomainError;
use crate::repos::{require_match, MatchSnapshot};
use crate::services::notifications::MatchEvent;

#[derive(Debug)]
pub struct MatchMutationResult {
    pub snapshot: MatchSnapshot,
    pub old_version: i32,
    pub transitions: Vec<MatchTransition>,
}

impl MatchMutationResult {
    /// False when the mutation left the aggregate untouched and nothing was written.
    pub fn changed(&self) -> bool {
        self.snapshot.version != self.old_version
    }
}

impl MatchOrchestrator {
    /// Lock, load, mutate a copy, commit with the loaded version, then
    /// reschedule deadlines and emit events.
    ///
    /// The mutation returns the explicit (per-action) transitions; status and
    /// phase transitions are derived from the before/after aggregates.
    pub(super) async fn run_mutation<F>(
        &self,
        match_id: MatchId,
        mutation: F,
    ) -> Result<MatchMutationResult, DomainError>
    where
        F: FnOnce(&mut Match, OffsetDateTime) -> Result<Vec<MatchTransition>, DomainError>,
    {
        let _guard = self
            .locks
            .acquire(match_id, self.config.lock_timeout)
            .await?;

        let before = require_match(&*self.repo, match_id).await?;
        let old_version = before.version;
        let now = self.clock.now();

        let mut after = before.aggregate.clone();
        let mut transitions = mutation(&mut after, now)?;

        if after == before.aggregate {
            debug!(match_id = %match_id, version = old_version, "Mutation changed nothing");
            return Ok(MatchMutationResult {
                snapshot: before,
                old_version,
                transitions: Vec::new(),
            });
        }

        after.updated_at = now;
        let saved = self.repo.save(&after, old_version).await?;

        transitions.extend(derive_match_transitions(&before.aggregate, &saved.aggregate));

        self.sync_deadline(&saved);
        self.publish(&saved, &transitions);
        if saved.aggregate.status.is_closed() {
            self.locks.forget(match_id);
        }

        Ok(MatchMutationResult {
            snapshot: saved,
            old_version,
            transitions,
        })
    }

    pub(super) fn publish(&self, snapshot: &MatchSnapshot, transitions: &[MatchTransition]) {
        for transition in transitions {
            self.emitter.emit(MatchEvent {
                match_id: snapshot.aggregate.id,
                version: snapshot.version,
                transition: transition.clone(),
            });
        }
    }
}

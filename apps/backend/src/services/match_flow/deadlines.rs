use std::time::Duration;

use dashmap::mapref::entry::Entry;
use tracing::{debug, error, info, warn};

use super::MatchOrchestrator;
use crate::domain::invitation::expire_invitations;
use crate::domain::round_engine::force_advance;
use crate::domain::{MatchId, Phase};
use crate::errors::domain::{DomainError, NotFoundKind};
use crate::repos::MatchSnapshot;
use crate::services::deadlines::DeadlineHandle;

/// Identifies the phase a deadline was armed for. A key whose phase no longer
/// matches the stored match is stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeadlineKey {
    pub match_id: MatchId,
    pub phase: Phase,
}

pub(super) struct ArmedDeadline {
    key: DeadlineKey,
    handle: DeadlineHandle,
}

impl MatchOrchestrator {
    /// Bring the armed deadline in line with a committed snapshot.
    ///
    /// Same phase keeps the running timer; a new phase replaces it; no phase
    /// (closed match) cancels it.
    pub(super) fn sync_deadline(&self, snapshot: &MatchSnapshot) {
        let m = &snapshot.aggregate;
        let next = m
            .deadline_phase()
            .zip(m.current_deadline())
            .map(|(phase, at)| (DeadlineKey { match_id: m.id, phase }, at));

        let Some((key, at)) = next else {
            if let Some((_, armed)) = self.armed.remove(&m.id) {
                armed.handle.cancel();
                debug!(match_id = %m.id, "Deadline cancelled");
            }
            return;
        };

        if self
            .armed
            .get(&m.id)
            .is_some_and(|armed| armed.key == key && !armed.handle.is_cancelled())
        {
            return;
        }

        let remaining = at - self.clock.now();
        let delay = if remaining.is_positive() {
            remaining.unsigned_abs()
        } else {
            Duration::ZERO
        };
        self.arm(key, delay);
    }

    /// Schedule `key` after `delay`, replacing whatever was armed for its match.
    fn arm(&self, key: DeadlineKey, delay: Duration) {
        let handle = self.schedule(key, delay);
        if let Some(previous) = self.armed.insert(key.match_id, ArmedDeadline { key, handle }) {
            previous.handle.cancel();
        }
    }

    fn schedule(&self, key: DeadlineKey, delay: Duration) -> DeadlineHandle {
        let tx = self.deadline_tx.clone();
        let handle = self.deadlines.after(
            delay,
            Box::new(move || {
                if tx.send(key).is_err() {
                    debug!(match_id = %key.match_id, "Deadline fired after worker shutdown");
                }
            }),
        );
        debug!(
            match_id = %key.match_id,
            phase = ?key.phase,
            delay_ms = delay.as_millis() as u64,
            "Deadline armed"
        );
        handle
    }

    /// Deal with a fired deadline that could not be applied.
    ///
    /// The fired timer is spent, so its entry must not stay armed. Retryable
    /// failures schedule the same key again after `deadline_retry`; anything
    /// else drops the entry so the next committed mutation arms afresh. An
    /// entry already replaced by a newer phase is left alone.
    pub(super) fn deadline_failed(&self, key: DeadlineKey, err: &DomainError) {
        if !err.is_retryable() {
            error!(
                match_id = %key.match_id,
                phase = ?key.phase,
                error = %err,
                "Failed to apply deadline"
            );
            if let Some((_, armed)) = self
                .armed
                .remove_if(&key.match_id, |_, armed| armed.key == key)
            {
                armed.handle.cancel();
            }
            return;
        }

        match self.armed.entry(key.match_id) {
            Entry::Occupied(mut slot) if slot.get().key == key => {
                let retry = self.config.deadline_retry;
                warn!(
                    match_id = %key.match_id,
                    phase = ?key.phase,
                    error = %err,
                    retry_ms = retry.as_millis() as u64,
                    "Failed to apply deadline; retrying"
                );
                let handle = self.schedule(key, retry);
                let previous = slot.insert(ArmedDeadline { key, handle });
                previous.handle.cancel();
            }
            _ => {
                debug!(
                    match_id = %key.match_id,
                    phase = ?key.phase,
                    error = %err,
                    "Failed deadline already superseded"
                );
            }
        }
    }

    /// Apply a fired deadline. Returns the new snapshot, or `None` when the key
    /// was stale or the match is gone.
    pub async fn handle_deadline(
        &self,
        key: DeadlineKey,
    ) -> Result<Option<MatchSnapshot>, DomainError> {
        let result = self
            .run_mutation(key.match_id, |m, now| {
                if m.deadline_phase() != Some(key.phase) {
                    return Ok(Vec::new());
                }
                match key.phase {
                    Phase::Invitation => {
                        let expired = expire_invitations(m, now)?;
                        info!(
                            match_id = %m.id,
                            expired = ?expired,
                            "Invitation window closed; match cancelled"
                        );
                    }
                    Phase::Round { .. } => {
                        force_advance(m, now)?;
                    }
                }
                Ok(Vec::new())
            })
            .await;

        let result = match result {
            Ok(result) => result,
            Err(DomainError::NotFound(NotFoundKind::Match, _)) => {
                debug!(match_id = %key.match_id, "Deadline for unknown match ignored");
                return Ok(None);
            }
            Err(err) => return Err(err),
        };

        if !result.changed() {
            debug!(
                match_id = %key.match_id,
                phase = ?key.phase,
                "Stale deadline ignored"
            );
            return Ok(None);
        }
        Ok(Some(result.snapshot))
    }

    /// Re-arm deadlines for every open match, e.g. after a restart. Overdue
    /// phases get a zero delay. Returns how many deadlines are armed.
    pub async fn resume_deadlines(&self) -> Result<usize, DomainError> {
        let open = self.repo.list_open().await?;
        for snapshot in &open {
            let _guard = self
                .locks
                .acquire(snapshot.aggregate.id, self.config.lock_timeout)
                .await?;
            self.sync_deadline(snapshot);
        }
        info!(open_matches = open.len(), "Deadlines resumed");
        Ok(self.armed.len())
    }
}

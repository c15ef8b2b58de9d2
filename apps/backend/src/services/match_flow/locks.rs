use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::domain::MatchId;
use crate::errors::domain::{DomainError, InfraErrorKind};

/// One async mutex per match; different matches never contend.
#[derive(Debug, Default)]
pub struct MatchLocks {
    locks: DashMap<MatchId, Arc<Mutex<()>>>,
}

impl MatchLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(
        &self,
        id: MatchId,
        timeout: Duration,
    ) -> Result<OwnedMutexGuard<()>, DomainError> {
        let lock = self.locks.entry(id).or_default().clone();
        tokio::time::timeout(timeout, lock.lock_owned())
            .await
            .map_err(|_| {
                DomainError::infra(
                    InfraErrorKind::Timeout,
                    format!(
                        "Timed out after {}ms waiting for match {id}",
                        timeout.as_millis()
                    ),
                )
            })
    }

    /// Drop the entry for a closed match. Holders of the old mutex finish normally.
    pub fn forget(&self, id: MatchId) {
        self.locks.remove(&id);
    }

    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

//! Match repository: versioned storage of whole Match aggregates.

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::Serialize;

use crate::domain::{Match, MatchId, PlayerId};
use crate::errors::domain::{ConflictKind, DomainError, NotFoundKind};

/// A committed aggregate with the store version it was read at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchSnapshot {
    pub version: i32,
    #[serde(flatten)]
    pub aggregate: Match,
}

#[async_trait]
pub trait MatchRepository: Send + Sync {
    /// Store a new aggregate at version 1.
    async fn insert(&self, aggregate: &Match) -> Result<MatchSnapshot, DomainError>;

    async fn load(&self, id: MatchId) -> Result<Option<MatchSnapshot>, DomainError>;

    /// Replace the aggregate iff the stored version equals `expected_version`.
    async fn save(
        &self,
        aggregate: &Match,
        expected_version: i32,
    ) -> Result<MatchSnapshot, DomainError>;

    /// Pending and Active matches, oldest first.
    async fn list_open(&self) -> Result<Vec<MatchSnapshot>, DomainError>;

    /// Every match whose roster includes `player`, newest first.
    async fn list_for_player(&self, player: PlayerId) -> Result<Vec<MatchSnapshot>, DomainError>;
}

pub async fn require_match(
    repo: &dyn MatchRepository,
    id: MatchId,
) -> Result<MatchSnapshot, DomainError> {
    repo.load(id)
        .await?
        .ok_or_else(|| DomainError::not_found(NotFoundKind::Match, format!("Match {id} not found")))
}

pub(crate) fn version_conflict(id: MatchId, expected: i32, actual: i32) -> DomainError {
    DomainError::conflict(
        ConflictKind::OptimisticLock,
        format!(
            "Match {id} was modified concurrently (expected version {expected}, actual version {actual})"
        ),
    )
}

#[derive(Debug, Default)]
pub struct InMemoryMatchRepository {
    rows: DashMap<MatchId, MatchSnapshot>,
}

impl InMemoryMatchRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MatchRepository for InMemoryMatchRepository {
    async fn insert(&self, aggregate: &Match) -> Result<MatchSnapshot, DomainError> {
        match self.rows.entry(aggregate.id) {
            Entry::Occupied(_) => Err(DomainError::conflict(
                ConflictKind::Other("Unique".into()),
                format!("Match {} already exists", aggregate.id),
            )),
            Entry::Vacant(slot) => {
                let snapshot = MatchSnapshot {
                    version: 1,
                    aggregate: aggregate.clone(),
                };
                slot.insert(snapshot.clone());
                Ok(snapshot)
            }
        }
    }

    async fn load(&self, id: MatchId) -> Result<Option<MatchSnapshot>, DomainError> {
        Ok(self.rows.get(&id).map(|row| row.clone()))
    }

    async fn save(
        &self,
        aggregate: &Match,
        expected_version: i32,
    ) -> Result<MatchSnapshot, DomainError> {
        let mut row = self.rows.get_mut(&aggregate.id).ok_or_else(|| {
            DomainError::not_found(
                NotFoundKind::Match,
                format!("Match {} not found", aggregate.id),
            )
        })?;
        if row.version != expected_version {
            return Err(version_conflict(aggregate.id, expected_version, row.version));
        }
        row.version += 1;
        row.aggregate = aggregate.clone();
        Ok(row.clone())
    }

    async fn list_open(&self) -> Result<Vec<MatchSnapshot>, DomainError> {
        let mut open: Vec<MatchSnapshot> = self
            .rows
            .iter()
            .filter(|row| !row.aggregate.status.is_closed())
            .map(|row| row.clone())
            .collect();
        open.sort_by_key(|s| s.aggregate.id);
        Ok(open)
    }

    async fn list_for_player(&self, player: PlayerId) -> Result<Vec<MatchSnapshot>, DomainError> {
        let mut mine: Vec<MatchSnapshot> = self
            .rows
            .iter()
            .filter(|row| row.aggregate.is_member(player))
            .map(|row| row.clone())
            .collect();
        mine.sort_by(|a, b| b.aggregate.id.cmp(&a.aggregate.id));
        Ok(mine)
    }
}

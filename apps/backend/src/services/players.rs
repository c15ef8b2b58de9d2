use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::domain::PlayerId;
use crate::errors::domain::DomainError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub handle: String,
}

/// Read-only view of the externally owned player registry.
#[async_trait]
pub trait PlayerDirectory: Send + Sync {
    async fn get_player(&self, id: PlayerId) -> Result<Option<Player>, DomainError>;
    /// Every player the directory can list, sorted by id. A directory that
    /// resolves ids on demand has nothing to enumerate and returns an empty list.
    async fn get_players(&self) -> Result<Vec<Player>, DomainError>;
}

#[derive(Debug, Default)]
pub struct InMemoryPlayerDirectory {
    players: DashMap<PlayerId, Player>,
}

impl InMemoryPlayerDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_players(players: impl IntoIterator<Item = Player>) -> Self {
        let dir = Self::new();
        for p in players {
            dir.insert(p);
        }
        dir
    }

    pub fn insert(&self, player: Player) {
        self.players.insert(player.id, player);
    }
}

#[async_trait]
impl PlayerDirectory for InMemoryPlayerDirectory {
    async fn get_player(&self, id: PlayerId) -> Result<Option<Player>, DomainError> {
        Ok(self.players.get(&id).map(|p| p.clone()))
    }

    async fn get_players(&self) -> Result<Vec<Player>, DomainError> {
        let mut all: Vec<Player> = self.players.iter().map(|p| p.clone()).collect();
        all.sort_by_key(|p| p.id);
        Ok(all)
    }
}

/// Treats every positive id as a known player. It holds no registry, so
/// `get_players` is always empty.
#[derive(Debug, Default, Clone, Copy)]
pub struct OpenPlayerDirectory;

#[async_trait]
impl PlayerDirectory for OpenPlayerDirectory {
    async fn get_player(&self, id: PlayerId) -> Result<Option<Player>, DomainError> {
        if id <= 0 {
            return Ok(None);
        }
        Ok(Some(Player {
            id,
            handle: format!("player-{id}"),
        }))
    }

    async fn get_players(&self) -> Result<Vec<Player>, DomainError> {
        Ok(Vec::new())
    }
}

//! `MatchRepository` over SeaORM (Postgres in production, SQLite in tests).

use async_trait::async_trait;
use sea_orm::{DatabaseConnection, TransactionTrait};

use super::matches::{MatchRepository, MatchSnapshot};
use crate::adapters::matches_sea::{self, snapshot_from_row, MatchWrite};
use crate::domain::{Match, MatchId, PlayerId};
use crate::errors::domain::DomainError;
use crate::infra::db_errors::map_db_err;

#[derive(Debug, Clone)]
pub struct SeaMatchRepository {
    db: DatabaseConnection,
}

impl SeaMatchRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }
}

fn decode_all(rows: Vec<crate::entities::MatchRow>) -> Result<Vec<MatchSnapshot>, DomainError> {
    rows.into_iter()
        .map(|row| snapshot_from_row(row).map_err(map_db_err))
        .collect()
}

#[async_trait]
impl MatchRepository for SeaMatchRepository {
    async fn insert(&self, aggregate: &Match) -> Result<MatchSnapshot, DomainError> {
        let write = MatchWrite::from_aggregate(aggregate).map_err(map_db_err)?;
        let txn = self.db.begin().await.map_err(map_db_err)?;
        let row = match matches_sea::create_match(&txn, write, aggregate.created_at).await {
            Ok(row) => row,
            Err(err) => {
                // Best-effort rollback; keep the original error.
                let _ = txn.rollback().await;
                return Err(map_db_err(err));
            }
        };
        txn.commit().await.map_err(map_db_err)?;
        snapshot_from_row(row).map_err(map_db_err)
    }

    async fn load(&self, id: MatchId) -> Result<Option<MatchSnapshot>, DomainError> {
        let row = matches_sea::find_by_id(&self.db, &id.to_string())
            .await
            .map_err(map_db_err)?;
        row.map(|r| snapshot_from_row(r).map_err(map_db_err))
            .transpose()
    }

    async fn save(
        &self,
        aggregate: &Match,
        expected_version: i32,
    ) -> Result<MatchSnapshot, DomainError> {
        let write = MatchWrite::from_aggregate(aggregate).map_err(map_db_err)?;
        let row =
            matches_sea::update_aggregate(&self.db, write, expected_version, aggregate.updated_at)
                .await
                .map_err(map_db_err)?;
        snapshot_from_row(row).map_err(map_db_err)
    }

    async fn list_open(&self) -> Result<Vec<MatchSnapshot>, DomainError> {
        let rows = matches_sea::list_open(&self.db).await.map_err(map_db_err)?;
        decode_all(rows)
    }

    async fn list_for_player(&self, player: PlayerId) -> Result<Vec<MatchSnapshot>, DomainError> {
        let rows = matches_sea::list_for_player(&self.db, player)
            .await
            .map_err(map_db_err)?;
        decode_all(rows)
    }
}

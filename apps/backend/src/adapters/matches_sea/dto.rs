//! Row <-> aggregate conversion for the matches_sea adapter.

use sea_orm::DbErr;

use crate::domain::{Match, MatchId};
use crate::entities::matches::{self, DbMatchStatus};
use crate::repos::MatchSnapshot;

/// Column values written for one aggregate.
#[derive(Debug, Clone)]
pub struct MatchWrite {
    pub id: String,
    pub status: DbMatchStatus,
    pub aggregate: String,
    pub roster: Vec<i64>,
}

impl MatchWrite {
    pub fn from_aggregate(aggregate: &Match) -> Result<Self, DbErr> {
        let json = serde_json::to_string(aggregate)
            .map_err(|e| DbErr::Json(format!("encode match {}: {e}", aggregate.id)))?;
        Ok(Self {
            id: aggregate.id.to_string(),
            status: aggregate.status.into(),
            aggregate: json,
            roster: aggregate.roster.clone(),
        })
    }
}

/// Decode a stored row, refusing anything that breaks aggregate invariants.
pub fn snapshot_from_row(row: matches::Model) -> Result<MatchSnapshot, DbErr> {
    let aggregate: Match = serde_json::from_str(&row.aggregate)
        .map_err(|e| DbErr::Json(format!("decode match {}: {e}", row.id)))?;

    let row_id: MatchId = row
        .id
        .parse()
        .map_err(|e| DbErr::Type(format!("match id '{}' is not a ULID: {e}", row.id)))?;
    if row_id != aggregate.id {
        return Err(DbErr::Type(format!(
            "row {} holds aggregate {}",
            row.id, aggregate.id
        )));
    }
    if DbMatchStatus::from(aggregate.status) != row.status {
        return Err(DbErr::Type(format!(
            "row {} status column disagrees with aggregate",
            row.id
        )));
    }
    aggregate
        .check_invariants()
        .map_err(|e| DbErr::Type(format!("match {} violates invariants: {e}", row.id)))?;

    Ok(MatchSnapshot {
        version: row.version,
        aggregate,
    })
}

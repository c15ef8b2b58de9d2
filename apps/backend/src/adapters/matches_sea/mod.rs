//! SeaORM adapter for the match store - generic over ConnectionTrait.

use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use time::OffsetDateTime;

use crate::entities::matches::{self, DbMatchStatus};
use crate::entities::match_players;
use crate::infra::db_errors::OPTIMISTIC_LOCK_PREFIX;

pub mod dto;

pub use dto::{snapshot_from_row, MatchWrite};

// Adapter functions return DbErr; the repository maps to DomainError.

pub async fn find_by_id<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    id: &str,
) -> Result<Option<matches::Model>, sea_orm::DbErr> {
    matches::Entity::find_by_id(id.to_string()).one(conn).await
}

/// Insert the match row and its roster index. Callers wrap this in a transaction.
pub async fn create_match<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    write: MatchWrite,
    now: OffsetDateTime,
) -> Result<matches::Model, sea_orm::DbErr> {
    let row = matches::ActiveModel {
        id: Set(write.id.clone()),
        status: Set(write.status),
        version: Set(1),
        aggregate: Set(write.aggregate),
        created_at: Set(now),
        updated_at: Set(now),
    };
    matches::Entity::insert(row)
        .exec_without_returning(conn)
        .await?;

    let players: Vec<match_players::ActiveModel> = write
        .roster
        .iter()
        .enumerate()
        .map(|(idx, player_id)| match_players::ActiveModel {
            match_id: Set(write.id.clone()),
            player_id: Set(*player_id),
            turn_order: Set(idx as i16),
        })
        .collect();
    if !players.is_empty() {
        match_players::Entity::insert_many(players)
            .exec_without_returning(conn)
            .await?;
    }

    require_row(conn, &write.id).await
}

/// Apply an optimistic update guarded by `expected_version`, then refetch.
///
/// `rows_affected == 0` means either the match is gone (RecordNotFound) or
/// another writer got there first (Custom OPTIMISTIC_LOCK payload).
pub async fn update_aggregate<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    write: MatchWrite,
    expected_version: i32,
    now: OffsetDateTime,
) -> Result<matches::Model, sea_orm::DbErr> {
    let result = matches::Entity::update_many()
        .col_expr(matches::Column::Aggregate, Expr::value(write.aggregate))
        .col_expr(matches::Column::Status, Expr::value(write.status))
        .col_expr(matches::Column::UpdatedAt, Expr::value(now))
        .col_expr(
            matches::Column::Version,
            Expr::col(matches::Column::Version).add(1),
        )
        .filter(matches::Column::Id.eq(write.id.clone()))
        .filter(matches::Column::Version.eq(expected_version))
        .exec(conn)
        .await?;

    if result.rows_affected == 0 {
        return match find_by_id(conn, &write.id).await? {
            Some(current) => Err(sea_orm::DbErr::Custom(format!(
                "{OPTIMISTIC_LOCK_PREFIX}{{\"expected\":{},\"actual\":{}}}",
                expected_version, current.version
            ))),
            None => Err(sea_orm::DbErr::RecordNotFound(format!(
                "Match {} not found",
                write.id
            ))),
        };
    }

    require_row(conn, &write.id).await
}

pub async fn list_open<C: ConnectionTrait + Send + Sync>(
    conn: &C,
) -> Result<Vec<matches::Model>, sea_orm::DbErr> {
    matches::Entity::find()
        .filter(matches::Column::Status.is_in([DbMatchStatus::Pending, DbMatchStatus::Active]))
        .order_by_asc(matches::Column::Id)
        .all(conn)
        .await
}

pub async fn list_for_player<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    player_id: i64,
) -> Result<Vec<matches::Model>, sea_orm::DbErr> {
    let ids: Vec<String> = match_players::Entity::find()
        .select_only()
        .column(match_players::Column::MatchId)
        .filter(match_players::Column::PlayerId.eq(player_id))
        .into_tuple()
        .all(conn)
        .await?;
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    matches::Entity::find()
        .filter(matches::Column::Id.is_in(ids))
        .order_by_desc(matches::Column::Id)
        .all(conn)
        .await
}

async fn require_row<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    id: &str,
) -> Result<matches::Model, sea_orm::DbErr> {
    find_by_id(conn, id)
        .await?
        .ok_or_else(|| sea_orm::DbErr::RecordNotFound(format!("Match {id} not found")))
}

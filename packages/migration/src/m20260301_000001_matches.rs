use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_query::{ColumnDef, ForeignKeyAction, Index, Table};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Matches {
    Table,
    Id,
    Status,
    Version,
    Aggregate,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum MatchPlayers {
    Table,
    MatchId,
    PlayerId,
    TurnOrder,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // matches: one row per aggregate, versioned for optimistic writes
        manager
            .create_table(
                Table::create()
                    .table(Matches::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Matches::Id)
                            .string_len(26)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Matches::Status).string_len(16).not_null())
                    .col(
                        ColumnDef::new(Matches::Version)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(ColumnDef::new(Matches::Aggregate).text().not_null())
                    .col(
                        ColumnDef::new(Matches::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Matches::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ix_matches_status")
                    .table(Matches::Table)
                    .col(Matches::Status)
                    .to_owned(),
            )
            .await?;

        // match_players: roster index for per-player listings
        manager
            .create_table(
                Table::create()
                    .table(MatchPlayers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MatchPlayers::MatchId)
                            .string_len(26)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MatchPlayers::PlayerId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MatchPlayers::TurnOrder)
                            .small_integer()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(MatchPlayers::MatchId)
                            .col(MatchPlayers::PlayerId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_match_players_match_id")
                            .from(MatchPlayers::Table, MatchPlayers::MatchId)
                            .to(Matches::Table, Matches::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ix_match_players_player_id")
                    .table(MatchPlayers::Table)
                    .col(MatchPlayers::PlayerId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("ix_match_players_player_id")
                    .table(MatchPlayers::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(MatchPlayers::Table).to_owned())
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("ix_matches_status")
                    .table(Matches::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(Matches::Table).to_owned())
            .await?;

        Ok(())
    }
}

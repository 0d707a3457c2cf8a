use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_query::{ColumnDef, ForeignKeyAction, Index, Table};

#[derive(DeriveMigrationName)]
pub struct Migration;

// ----- Iden enums for tables & columns -----
#[derive(Iden)]
enum Accounts {
    Table,
    OwnerId,
    Username,
    Balance,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum PlatformRevenue {
    Table,
    Id,
    Balance,
    UpdatedAt,
}

#[derive(Iden)]
enum Games {
    Table,
    Id,
    Status,
    StateJson,
    Version,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Deposits {
    Table,
    TxRef,
    OwnerId,
    Amount,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Withdrawals {
    Table,
    Id,
    OwnerId,
    Amount,
    AccountDetails,
    Status,
    CreatedAt,
}

#[derive(Iden)]
enum LedgerEntries {
    Table,
    Id,
    OwnerId,
    Op,
    Kind,
    Amount,
    BalanceAfter,
    Reference,
    CreatedAt,
}

/// Row id of the single platform revenue account.
pub const PLATFORM_REVENUE_ID: i16 = 1;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // accounts: one per player, balance in minor units, never negative
        manager
            .create_table(
                Table::create()
                    .table(Accounts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Accounts::OwnerId)
                            .big_integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Accounts::Username).string().not_null())
                    .col(
                        ColumnDef::new(Accounts::Balance)
                            .big_integer()
                            .not_null()
                            .default(0)
                            .check(Expr::col(Accounts::Balance).gte(0)),
                    )
                    .col(
                        ColumnDef::new(Accounts::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Accounts::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // platform_revenue: single row holding retained commission
        manager
            .create_table(
                Table::create()
                    .table(PlatformRevenue::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PlatformRevenue::Id)
                            .small_integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(PlatformRevenue::Balance)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(PlatformRevenue::UpdatedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .exec_stmt(
                Query::insert()
                    .into_table(PlatformRevenue::Table)
                    .columns([PlatformRevenue::Id, PlatformRevenue::Balance])
                    .values_panic([PLATFORM_REVENUE_ID.into(), 0i64.into()])
                    .to_owned(),
            )
            .await?;

        // games: state blob plus the version used for compare-and-swap
        manager
            .create_table(
                Table::create()
                    .table(Games::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Games::Id)
                            .big_integer()
                            .not_null()
                            .primary_key()
                            .auto_increment(),
                    )
                    .col(ColumnDef::new(Games::Status).string_len(16).not_null())
                    .col(ColumnDef::new(Games::StateJson).text().not_null())
                    .col(
                        ColumnDef::new(Games::Version)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(
                        ColumnDef::new(Games::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Games::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ix_games_status")
                    .table(Games::Table)
                    .col(Games::Status)
                    .to_owned(),
            )
            .await?;

        // deposits: pending until the gateway confirms, resolved exactly once
        manager
            .create_table(
                Table::create()
                    .table(Deposits::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Deposits::TxRef)
                            .string_len(64)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Deposits::OwnerId).big_integer().not_null())
                    .col(ColumnDef::new(Deposits::Amount).big_integer().not_null())
                    .col(ColumnDef::new(Deposits::Status).string_len(16).not_null())
                    .col(
                        ColumnDef::new(Deposits::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Deposits::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_deposits_owner_id")
                            .from(Deposits::Table, Deposits::OwnerId)
                            .to(Accounts::Table, Accounts::OwnerId)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        // withdrawals: requests fulfilled out of band
        manager
            .create_table(
                Table::create()
                    .table(Withdrawals::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Withdrawals::Id)
                            .big_integer()
                            .not_null()
                            .primary_key()
                            .auto_increment(),
                    )
                    .col(
                        ColumnDef::new(Withdrawals::OwnerId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Withdrawals::Amount).big_integer().not_null())
                    .col(
                        ColumnDef::new(Withdrawals::AccountDetails)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Withdrawals::Status)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Withdrawals::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_withdrawals_owner_id")
                            .from(Withdrawals::Table, Withdrawals::OwnerId)
                            .to(Accounts::Table, Accounts::OwnerId)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        // ledger_entries: append-only journal; owner_id NULL for platform revenue
        manager
            .create_table(
                Table::create()
                    .table(LedgerEntries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LedgerEntries::Id)
                            .big_integer()
                            .not_null()
                            .primary_key()
                            .auto_increment(),
                    )
                    .col(ColumnDef::new(LedgerEntries::OwnerId).big_integer().null())
                    .col(ColumnDef::new(LedgerEntries::Op).string_len(8).not_null())
                    .col(ColumnDef::new(LedgerEntries::Kind).string_len(32).not_null())
                    .col(
                        ColumnDef::new(LedgerEntries::Amount)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LedgerEntries::BalanceAfter)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(LedgerEntries::Reference).string().not_null())
                    .col(
                        ColumnDef::new(LedgerEntries::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ledger_entries_owner_id")
                            .from(LedgerEntries::Table, LedgerEntries::OwnerId)
                            .to(Accounts::Table, Accounts::OwnerId)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ix_ledger_entries_owner_id")
                    .table(LedgerEntries::Table)
                    .col(LedgerEntries::OwnerId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // drop in reverse order + drop index before table
        manager
            .drop_index(
                Index::drop()
                    .name("ix_ledger_entries_owner_id")
                    .table(LedgerEntries::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(LedgerEntries::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Withdrawals::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Deposits::Table).to_owned())
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("ix_games_status")
                    .table(Games::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(Games::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(PlatformRevenue::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Accounts::Table).to_owned())
            .await?;

        Ok(())
    }
}

//! SeaORM adapter for the account ledger.
//!
//! A balance change is one conditional UPDATE plus a journal insert inside a
//! single transaction. Debits filter on `balance >= amount`, so the database
//! row lock serializes concurrent writers on one account and an overdraft
//! simply matches zero rows.

use async_trait::async_trait;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, NotSet,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};

use crate::domain::money::Money;
use crate::domain::state::PlayerId;
use crate::entities::{accounts, ledger_entries, platform_revenue};
use crate::errors::domain::{DomainError, InfraErrorKind, ValidationKind};
use crate::infra::db_errors::{map_db_err, ACCOUNT_NOT_FOUND_PREFIX, INSUFFICIENT_FUNDS_PREFIX};
use crate::repos::ledger::{
    Account, Ledger, LedgerEntry, LedgerEntryKind, LedgerOpKind, LedgerOperation,
};

fn op_str(op: LedgerOpKind) -> &'static str {
    match op {
        LedgerOpKind::Credit => "credit",
        LedgerOpKind::Debit => "debit",
    }
}

fn to_account(model: accounts::Model) -> Account {
    Account {
        owner_id: model.owner_id,
        username: model.username,
        balance: Money::from_minor(model.balance),
    }
}

fn to_entry(model: ledger_entries::Model) -> Result<LedgerEntry, sea_orm::DbErr> {
    let op = match model.op.as_str() {
        "credit" => LedgerOpKind::Credit,
        "debit" => LedgerOpKind::Debit,
        other => return Err(sea_orm::DbErr::Type(format!("unknown ledger op {other}"))),
    };
    let kind = LedgerEntryKind::parse(&model.kind)
        .ok_or_else(|| sea_orm::DbErr::Type(format!("unknown ledger kind {}", model.kind)))?;
    Ok(LedgerEntry {
        owner_id: model.owner_id,
        op,
        kind,
        amount: Money::from_minor(model.amount),
        balance_after: Money::from_minor(model.balance_after),
        reference: model.reference,
    })
}

pub async fn upsert_account<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    owner_id: PlayerId,
    username: &str,
) -> Result<accounts::Model, sea_orm::DbErr> {
    let now = time::OffsetDateTime::now_utc();
    let active = accounts::ActiveModel {
        owner_id: Set(owner_id),
        username: Set(username.to_string()),
        balance: Set(0),
        created_at: Set(now),
        updated_at: Set(now),
    };
    accounts::Entity::insert(active)
        .on_conflict(
            OnConflict::column(accounts::Column::OwnerId)
                .update_columns([accounts::Column::Username, accounts::Column::UpdatedAt])
                .to_owned(),
        )
        .exec_without_returning(conn)
        .await?;
    require_account(conn, owner_id).await
}

pub async fn require_account<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    owner_id: PlayerId,
) -> Result<accounts::Model, sea_orm::DbErr> {
    accounts::Entity::find_by_id(owner_id)
        .one(conn)
        .await?
        .ok_or_else(|| sea_orm::DbErr::Custom(format!("{ACCOUNT_NOT_FOUND_PREFIX}{owner_id}")))
}

async fn insert_entry<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    owner_id: Option<PlayerId>,
    op: LedgerOpKind,
    kind: LedgerEntryKind,
    amount: Money,
    balance_after: i64,
    reference: &str,
) -> Result<(), sea_orm::DbErr> {
    ledger_entries::ActiveModel {
        id: NotSet,
        owner_id: Set(owner_id),
        op: Set(op_str(op).to_string()),
        kind: Set(kind.as_str().to_string()),
        amount: Set(amount.minor()),
        balance_after: Set(balance_after),
        reference: Set(reference.to_string()),
        created_at: Set(time::OffsetDateTime::now_utc()),
    }
    .insert(conn)
    .await?;
    Ok(())
}

/// Apply one balance change and journal it. Must run inside a transaction.
pub async fn apply_operation<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    op: &LedgerOperation,
) -> Result<i64, sea_orm::DbErr> {
    let amount = op.amount.minor();
    let now = time::OffsetDateTime::now_utc();

    let update = accounts::Entity::update_many()
        .col_expr(accounts::Column::UpdatedAt, Expr::value(now))
        .filter(accounts::Column::OwnerId.eq(op.owner_id));
    let update = match op.op {
        LedgerOpKind::Credit => update.col_expr(
            accounts::Column::Balance,
            Expr::col(accounts::Column::Balance).add(amount),
        ),
        LedgerOpKind::Debit => update
            .col_expr(
                accounts::Column::Balance,
                Expr::col(accounts::Column::Balance).sub(amount),
            )
            .filter(accounts::Column::Balance.gte(amount)),
    };

    let result = update.exec(conn).await?;
    if result.rows_affected == 0 {
        // Either the account doesn't exist or the debit would overdraw it
        let current = require_account(conn, op.owner_id).await?;
        return Err(sea_orm::DbErr::Custom(format!(
            "{INSUFFICIENT_FUNDS_PREFIX}balance {} cannot cover {}",
            Money::from_minor(current.balance),
            op.amount
        )));
    }

    let balance = require_account(conn, op.owner_id).await?.balance;
    insert_entry(
        conn,
        Some(op.owner_id),
        op.op,
        op.kind,
        op.amount,
        balance,
        &op.reference,
    )
    .await?;
    Ok(balance)
}

pub async fn add_commission<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    amount: Money,
    reference: &str,
) -> Result<i64, sea_orm::DbErr> {
    let id = migration::PLATFORM_REVENUE_ID;
    platform_revenue::Entity::update_many()
        .col_expr(
            platform_revenue::Column::Balance,
            Expr::col(platform_revenue::Column::Balance).add(amount.minor()),
        )
        .col_expr(
            platform_revenue::Column::UpdatedAt,
            Expr::value(Some(time::OffsetDateTime::now_utc())),
        )
        .filter(platform_revenue::Column::Id.eq(id))
        .exec(conn)
        .await?;
    let balance = revenue_balance(conn).await?;
    insert_entry(
        conn,
        None,
        LedgerOpKind::Credit,
        LedgerEntryKind::Commission,
        amount,
        balance,
        reference,
    )
    .await?;
    Ok(balance)
}

pub async fn revenue_balance<C: ConnectionTrait + Send + Sync>(
    conn: &C,
) -> Result<i64, sea_orm::DbErr> {
    platform_revenue::Entity::find_by_id(migration::PLATFORM_REVENUE_ID)
        .one(conn)
        .await?
        .map(|row| row.balance)
        .ok_or_else(|| sea_orm::DbErr::RecordNotFound("platform revenue row missing".into()))
}

/// `Ledger` over a SeaORM connection.
#[derive(Debug, Clone)]
pub struct SeaLedger {
    db: DatabaseConnection,
}

impl SeaLedger {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl Ledger for SeaLedger {
    async fn open_account(
        &self,
        owner_id: PlayerId,
        username: &str,
    ) -> Result<Account, DomainError> {
        upsert_account(&self.db, owner_id, username)
            .await
            .map(to_account)
            .map_err(map_db_err)
    }

    async fn account(&self, owner_id: PlayerId) -> Result<Account, DomainError> {
        require_account(&self.db, owner_id)
            .await
            .map(to_account)
            .map_err(map_db_err)
    }

    async fn apply(&self, op: LedgerOperation) -> Result<Money, DomainError> {
        op.validate()?;
        let txn = self.db.begin().await.map_err(map_db_err)?;
        match apply_operation(&txn, &op).await {
            Ok(balance) => {
                txn.commit().await.map_err(map_db_err)?;
                Ok(Money::from_minor(balance))
            }
            Err(e) => {
                // Best-effort rollback; preserve original error
                let _ = txn.rollback().await;
                Err(map_db_err(e))
            }
        }
    }

    async fn record_commission(
        &self,
        amount: Money,
        reference: &str,
    ) -> Result<Money, DomainError> {
        if amount.is_negative() {
            return Err(DomainError::validation(
                ValidationKind::InvalidAmount,
                format!("commission must not be negative, got {amount}"),
            ));
        }
        let txn = self.db.begin().await.map_err(map_db_err)?;
        match add_commission(&txn, amount, reference).await {
            Ok(balance) => {
                txn.commit().await.map_err(map_db_err)?;
                Ok(Money::from_minor(balance))
            }
            Err(e) => {
                let _ = txn.rollback().await;
                Err(map_db_err(e))
            }
        }
    }

    async fn commission_balance(&self) -> Result<Money, DomainError> {
        revenue_balance(&self.db)
            .await
            .map(Money::from_minor)
            .map_err(|e| match e {
                sea_orm::DbErr::RecordNotFound(msg) => {
                    DomainError::infra(InfraErrorKind::DataCorruption, msg)
                }
                other => map_db_err(other),
            })
    }

    async fn entries_for(&self, owner_id: PlayerId) -> Result<Vec<LedgerEntry>, DomainError> {
        let rows = ledger_entries::Entity::find()
            .filter(ledger_entries::Column::OwnerId.eq(owner_id))
            .order_by_asc(ledger_entries::Column::Id)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;
        rows.into_iter()
            .map(|row| to_entry(row).map_err(map_db_err))
            .collect()
    }
}

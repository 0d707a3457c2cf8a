//! SeaORM adapter for deposit and withdrawal records.

use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, NotSet,
    QueryFilter, Set,
};

use crate::domain::money::Money;
use crate::domain::state::PlayerId;
use crate::entities::{deposits, withdrawals};
use crate::errors::domain::{DomainError, NotFoundKind};
use crate::infra::db_errors::map_db_err;
use crate::repos::payments::{
    Deposit, DepositStatus, PaymentRecords, WithdrawalRequest, WithdrawalStatus,
};

impl From<DepositStatus> for deposits::DepositStatus {
    fn from(value: DepositStatus) -> Self {
        match value {
            DepositStatus::Pending => deposits::DepositStatus::Pending,
            DepositStatus::Success => deposits::DepositStatus::Success,
            DepositStatus::Failed => deposits::DepositStatus::Failed,
        }
    }
}

impl From<deposits::DepositStatus> for DepositStatus {
    fn from(value: deposits::DepositStatus) -> Self {
        match value {
            deposits::DepositStatus::Pending => DepositStatus::Pending,
            deposits::DepositStatus::Success => DepositStatus::Success,
            deposits::DepositStatus::Failed => DepositStatus::Failed,
        }
    }
}

fn to_deposit(model: deposits::Model) -> Deposit {
    Deposit {
        tx_ref: model.tx_ref,
        owner_id: model.owner_id,
        amount: Money::from_minor(model.amount),
        status: model.status.into(),
    }
}

fn to_withdrawal(model: withdrawals::Model) -> WithdrawalRequest {
    WithdrawalRequest {
        id: model.id,
        owner_id: model.owner_id,
        amount: Money::from_minor(model.amount),
        account_details: model.account_details,
        status: match model.status {
            withdrawals::WithdrawalStatus::Pending => WithdrawalStatus::Pending,
            withdrawals::WithdrawalStatus::Processed => WithdrawalStatus::Processed,
            withdrawals::WithdrawalStatus::Failed => WithdrawalStatus::Failed,
        },
    }
}

pub async fn insert_deposit<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    owner_id: PlayerId,
    amount: Money,
    tx_ref: &str,
) -> Result<deposits::Model, sea_orm::DbErr> {
    let now = time::OffsetDateTime::now_utc();
    deposits::ActiveModel {
        tx_ref: Set(tx_ref.to_string()),
        owner_id: Set(owner_id),
        amount: Set(amount.minor()),
        status: Set(deposits::DepositStatus::Pending),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(conn)
    .await
}

/// Flip a pending deposit to `outcome`; returns whether this call did it.
pub async fn resolve_pending<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    tx_ref: &str,
    outcome: DepositStatus,
) -> Result<bool, sea_orm::DbErr> {
    let result = deposits::Entity::update_many()
        .col_expr(
            deposits::Column::Status,
            Expr::value(deposits::DepositStatus::from(outcome)),
        )
        .col_expr(
            deposits::Column::UpdatedAt,
            Expr::value(time::OffsetDateTime::now_utc()),
        )
        .filter(deposits::Column::TxRef.eq(tx_ref))
        .filter(deposits::Column::Status.eq(deposits::DepositStatus::Pending))
        .exec(conn)
        .await?;
    Ok(result.rows_affected == 1)
}

/// `PaymentRecords` over a SeaORM connection.
#[derive(Debug, Clone)]
pub struct SeaPaymentRecords {
    db: DatabaseConnection,
}

impl SeaPaymentRecords {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn deposit_not_found(tx_ref: &str) -> DomainError {
    DomainError::not_found(NotFoundKind::Deposit, format!("Deposit {tx_ref} not found"))
}

#[async_trait]
impl PaymentRecords for SeaPaymentRecords {
    async fn create_deposit(
        &self,
        owner_id: PlayerId,
        amount: Money,
        tx_ref: &str,
    ) -> Result<Deposit, DomainError> {
        insert_deposit(&self.db, owner_id, amount, tx_ref)
            .await
            .map(to_deposit)
            .map_err(map_db_err)
    }

    async fn find_deposit(&self, tx_ref: &str) -> Result<Deposit, DomainError> {
        deposits::Entity::find_by_id(tx_ref.to_string())
            .one(&self.db)
            .await
            .map_err(map_db_err)?
            .map(to_deposit)
            .ok_or_else(|| deposit_not_found(tx_ref))
    }

    async fn resolve_deposit(
        &self,
        tx_ref: &str,
        outcome: DepositStatus,
    ) -> Result<bool, DomainError> {
        if resolve_pending(&self.db, tx_ref, outcome)
            .await
            .map_err(map_db_err)?
        {
            return Ok(true);
        }
        // Nothing flipped: distinguish "already resolved" from "unknown ref"
        self.find_deposit(tx_ref).await.map(|_| false)
    }

    async fn create_withdrawal(
        &self,
        owner_id: PlayerId,
        amount: Money,
        account_details: &str,
    ) -> Result<WithdrawalRequest, DomainError> {
        withdrawals::ActiveModel {
            id: NotSet,
            owner_id: Set(owner_id),
            amount: Set(amount.minor()),
            account_details: Set(account_details.to_string()),
            status: Set(withdrawals::WithdrawalStatus::Pending),
            created_at: Set(time::OffsetDateTime::now_utc()),
        }
        .insert(&self.db)
        .await
        .map(to_withdrawal)
        .map_err(map_db_err)
    }
}

//! Records for the deposit and withdrawal touchpoints of the payment gateway.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::money::Money;
use crate::domain::state::PlayerId;
use crate::errors::domain::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DepositStatus {
    Pending,
    Success,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Deposit {
    pub tx_ref: String,
    pub owner_id: PlayerId,
    pub amount: Money,
    pub status: DepositStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WithdrawalStatus {
    Pending,
    Processed,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WithdrawalRequest {
    pub id: i64,
    pub owner_id: PlayerId,
    pub amount: Money,
    #[serde(skip_serializing)]
    pub account_details: String,
    pub status: WithdrawalStatus,
}

#[async_trait]
pub trait PaymentRecords: Send + Sync {
    /// Record a pending deposit. `Conflict(DuplicateReference)` if `tx_ref` exists.
    async fn create_deposit(
        &self,
        owner_id: PlayerId,
        amount: Money,
        tx_ref: &str,
    ) -> Result<Deposit, DomainError>;

    async fn find_deposit(&self, tx_ref: &str) -> Result<Deposit, DomainError>;

    /// Move a pending deposit to `outcome`. Returns `false` when the deposit
    /// had already left `pending`, so each deposit resolves exactly once.
    async fn resolve_deposit(
        &self,
        tx_ref: &str,
        outcome: DepositStatus,
    ) -> Result<bool, DomainError>;

    async fn create_withdrawal(
        &self,
        owner_id: PlayerId,
        amount: Money,
        account_details: &str,
    ) -> Result<WithdrawalRequest, DomainError>;
}

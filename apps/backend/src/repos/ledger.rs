//! Player balances and the platform commission account.
//!
//! Every balance change is journaled as a `LedgerEntry`. A debit that would
//! take a balance below zero is refused with `InsufficientFunds` and leaves
//! both the balance and the journal untouched.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::money::Money;
use crate::domain::state::PlayerId;
use crate::errors::domain::{DomainError, ValidationKind};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Account {
    pub owner_id: PlayerId,
    pub username: String,
    pub balance: Money,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LedgerOpKind {
    Credit,
    Debit,
}

/// Why a balance moved. Stored alongside each journal entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerEntryKind {
    Deposit,
    Stake,
    StakeRefund,
    Prize,
    Commission,
    Withdrawal,
    WithdrawalRefund,
}

impl LedgerEntryKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            LedgerEntryKind::Deposit => "deposit",
            LedgerEntryKind::Stake => "stake",
            LedgerEntryKind::StakeRefund => "stake_refund",
            LedgerEntryKind::Prize => "prize",
            LedgerEntryKind::Commission => "commission",
            LedgerEntryKind::Withdrawal => "withdrawal",
            LedgerEntryKind::WithdrawalRefund => "withdrawal_refund",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "deposit" => LedgerEntryKind::Deposit,
            "stake" => LedgerEntryKind::Stake,
            "stake_refund" => LedgerEntryKind::StakeRefund,
            "prize" => LedgerEntryKind::Prize,
            "commission" => LedgerEntryKind::Commission,
            "withdrawal" => LedgerEntryKind::Withdrawal,
            "withdrawal_refund" => LedgerEntryKind::WithdrawalRefund,
            _ => return None,
        })
    }
}

/// One signed balance change requested by a service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerOperation {
    pub owner_id: PlayerId,
    pub amount: Money,
    pub op: LedgerOpKind,
    pub kind: LedgerEntryKind,
    /// Free-form correlation, e.g. `game:42` or a deposit tx_ref.
    pub reference: String,
}

impl LedgerOperation {
    pub fn credit(
        owner_id: PlayerId,
        amount: Money,
        kind: LedgerEntryKind,
        reference: impl Into<String>,
    ) -> Self {
        Self {
            owner_id,
            amount,
            op: LedgerOpKind::Credit,
            kind,
            reference: reference.into(),
        }
    }

    pub fn debit(
        owner_id: PlayerId,
        amount: Money,
        kind: LedgerEntryKind,
        reference: impl Into<String>,
    ) -> Self {
        Self {
            owner_id,
            amount,
            op: LedgerOpKind::Debit,
            kind,
            reference: reference.into(),
        }
    }

    /// Amounts are strictly positive; the direction lives in `op`.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.amount.is_positive() {
            Ok(())
        } else {
            Err(DomainError::validation(
                ValidationKind::InvalidAmount,
                format!("ledger amount must be positive, got {}", self.amount),
            ))
        }
    }
}

/// Journal row. `owner_id` is `None` for the platform commission account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LedgerEntry {
    pub owner_id: Option<PlayerId>,
    pub op: LedgerOpKind,
    pub kind: LedgerEntryKind,
    pub amount: Money,
    pub balance_after: Money,
    pub reference: String,
}

#[async_trait]
pub trait Ledger: Send + Sync {
    /// Open an account at zero balance, or return the existing one. The
    /// username is refreshed when it changed.
    async fn open_account(&self, owner_id: PlayerId, username: &str)
        -> Result<Account, DomainError>;

    /// `NotFound(Account)` when the player never opened one.
    async fn account(&self, owner_id: PlayerId) -> Result<Account, DomainError>;

    /// Apply one balance change atomically and return the new balance.
    async fn apply(&self, op: LedgerOperation) -> Result<Money, DomainError>;

    /// Credit the platform commission account.
    async fn record_commission(&self, amount: Money, reference: &str) -> Result<Money, DomainError>;

    /// Current platform commission balance.
    async fn commission_balance(&self) -> Result<Money, DomainError>;

    /// Journal entries for one owner in insertion order.
    async fn entries_for(&self, owner_id: PlayerId) -> Result<Vec<LedgerEntry>, DomainError>;

    async fn credit(
        &self,
        owner_id: PlayerId,
        amount: Money,
        kind: LedgerEntryKind,
        reference: &str,
    ) -> Result<Money, DomainError> {
        self.apply(LedgerOperation::credit(owner_id, amount, kind, reference))
            .await
    }

    async fn debit(
        &self,
        owner_id: PlayerId,
        amount: Money,
        kind: LedgerEntryKind,
        reference: &str,
    ) -> Result<Money, DomainError> {
        self.apply(LedgerOperation::debit(owner_id, amount, kind, reference))
            .await
    }
}

/// Balance after applying `op` to `balance`, or the error the ledger reports.
pub(crate) fn next_balance(balance: Money, op: &LedgerOperation) -> Result<Money, DomainError> {
    op.validate()?;
    match op.op {
        LedgerOpKind::Credit => balance.checked_add(op.amount).ok_or_else(|| {
            DomainError::validation(ValidationKind::InvalidAmount, "balance overflow")
        }),
        LedgerOpKind::Debit => match balance.checked_sub(op.amount) {
            Some(next) if !next.is_negative() => Ok(next),
            _ => Err(DomainError::insufficient_funds(format!(
                "balance {balance} cannot cover {}",
                op.amount
            ))),
        },
    }
}

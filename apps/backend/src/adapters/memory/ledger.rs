use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;

use crate::domain::money::Money;
use crate::domain::state::PlayerId;
use crate::errors::domain::{DomainError, NotFoundKind, ValidationKind};
use crate::repos::ledger::{
    next_balance, Account, Ledger, LedgerEntry, LedgerEntryKind, LedgerOpKind, LedgerOperation,
};

/// Balances keyed by owner. `DashMap::get_mut` holds the shard write lock for
/// the whole read-modify-write, which serializes operations per account.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    accounts: DashMap<PlayerId, Account>,
    commission: Mutex<Money>,
    journal: Mutex<Vec<LedgerEntry>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

fn account_not_found(owner_id: PlayerId) -> DomainError {
    DomainError::not_found(
        NotFoundKind::Account,
        format!("Account for player {owner_id} not found"),
    )
}

#[async_trait]
impl Ledger for MemoryLedger {
    async fn open_account(
        &self,
        owner_id: PlayerId,
        username: &str,
    ) -> Result<Account, DomainError> {
        let mut entry = self.accounts.entry(owner_id).or_insert_with(|| Account {
            owner_id,
            username: username.to_string(),
            balance: Money::ZERO,
        });
        if entry.username != username {
            entry.username = username.to_string();
        }
        Ok(entry.clone())
    }

    async fn account(&self, owner_id: PlayerId) -> Result<Account, DomainError> {
        self.accounts
            .get(&owner_id)
            .map(|a| a.clone())
            .ok_or_else(|| account_not_found(owner_id))
    }

    async fn apply(&self, op: LedgerOperation) -> Result<Money, DomainError> {
        let mut account = self
            .accounts
            .get_mut(&op.owner_id)
            .ok_or_else(|| account_not_found(op.owner_id))?;

        let balance = next_balance(account.balance, &op)?;
        account.balance = balance;
        self.journal.lock().push(LedgerEntry {
            owner_id: Some(op.owner_id),
            op: op.op,
            kind: op.kind,
            amount: op.amount,
            balance_after: balance,
            reference: op.reference,
        });
        Ok(balance)
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
        let mut total = self.commission.lock();
        *total = total.checked_add(amount).ok_or_else(|| {
            DomainError::validation(ValidationKind::InvalidAmount, "commission overflow")
        })?;
        self.journal.lock().push(LedgerEntry {
            owner_id: None,
            op: LedgerOpKind::Credit,
            kind: LedgerEntryKind::Commission,
            amount,
            balance_after: *total,
            reference: reference.to_string(),
        });
        Ok(*total)
    }

    async fn commission_balance(&self) -> Result<Money, DomainError> {
        Ok(*self.commission.lock())
    }

    async fn entries_for(&self, owner_id: PlayerId) -> Result<Vec<LedgerEntry>, DomainError> {
        Ok(self
            .journal
            .lock()
            .iter()
            .filter(|e| e.owner_id == Some(owner_id))
            .cloned()
            .collect())
    }
}

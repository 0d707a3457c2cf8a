use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::domain::money::Money;
use crate::domain::state::PlayerId;
use crate::errors::domain::{ConflictKind, DomainError, NotFoundKind};
use crate::repos::payments::{
    Deposit, DepositStatus, PaymentRecords, WithdrawalRequest, WithdrawalStatus,
};

#[derive(Debug, Default)]
pub struct MemoryPaymentRecords {
    deposits: Mutex<HashMap<String, Deposit>>,
    withdrawals: Mutex<Vec<WithdrawalRequest>>,
    next_withdrawal_id: AtomicI64,
}

impl MemoryPaymentRecords {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn withdrawals(&self) -> Vec<WithdrawalRequest> {
        self.withdrawals.lock().clone()
    }
}

#[async_trait]
impl PaymentRecords for MemoryPaymentRecords {
    async fn create_deposit(
        &self,
        owner_id: PlayerId,
        amount: Money,
        tx_ref: &str,
    ) -> Result<Deposit, DomainError> {
        let mut deposits = self.deposits.lock();
        if deposits.contains_key(tx_ref) {
            return Err(DomainError::conflict(
                ConflictKind::DuplicateReference,
                "Deposit reference already exists",
            ));
        }
        let deposit = Deposit {
            tx_ref: tx_ref.to_string(),
            owner_id,
            amount,
            status: DepositStatus::Pending,
        };
        deposits.insert(tx_ref.to_string(), deposit.clone());
        Ok(deposit)
    }

    async fn find_deposit(&self, tx_ref: &str) -> Result<Deposit, DomainError> {
        self.deposits.lock().get(tx_ref).cloned().ok_or_else(|| {
            DomainError::not_found(NotFoundKind::Deposit, format!("Deposit {tx_ref} not found"))
        })
    }

    async fn resolve_deposit(
        &self,
        tx_ref: &str,
        outcome: DepositStatus,
    ) -> Result<bool, DomainError> {
        let mut deposits = self.deposits.lock();
        let deposit = deposits.get_mut(tx_ref).ok_or_else(|| {
            DomainError::not_found(NotFoundKind::Deposit, format!("Deposit {tx_ref} not found"))
        })?;
        if deposit.status != DepositStatus::Pending {
            return Ok(false);
        }
        deposit.status = outcome;
        Ok(true)
    }

    async fn create_withdrawal(
        &self,
        owner_id: PlayerId,
        amount: Money,
        account_details: &str,
    ) -> Result<WithdrawalRequest, DomainError> {
        let request = WithdrawalRequest {
            id: self.next_withdrawal_id.fetch_add(1, Ordering::Relaxed) + 1,
            owner_id,
            amount,
            account_details: account_details.to_string(),
            status: WithdrawalStatus::Pending,
        };
        self.withdrawals.lock().push(request.clone());
        Ok(request)
    }
}

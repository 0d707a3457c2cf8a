//! Deposit and withdrawal touchpoints.
//!
//! The gateway itself is external. A deposit is recorded as pending with a
//! fresh `tx_ref` and only moves money once the gateway confirms it; a
//! withdrawal debits immediately and leaves a request for manual payout.

use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::money::Money;
use crate::domain::state::PlayerId;
use crate::errors::domain::{DomainError, ValidationKind};
use crate::logging::audit;
use crate::repos::ledger::{Ledger, LedgerEntryKind};
use crate::repos::payments::{Deposit, DepositStatus, PaymentRecords, WithdrawalRequest};

/// What a confirmation callback did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepositResolution {
    Credited { balance: Money },
    MarkedFailed,
    /// The deposit was resolved by an earlier callback.
    AlreadyResolved,
}

pub struct PaymentService {
    ledger: Arc<dyn Ledger>,
    records: Arc<dyn PaymentRecords>,
    min_deposit: Money,
}

impl PaymentService {
    pub fn new(
        ledger: Arc<dyn Ledger>,
        records: Arc<dyn PaymentRecords>,
        min_deposit: Money,
    ) -> Self {
        Self {
            ledger,
            records,
            min_deposit,
        }
    }

    pub fn min_deposit(&self) -> Money {
        self.min_deposit
    }

    /// Record a pending deposit. The returned `tx_ref` is what the gateway
    /// echoes back on confirmation.
    pub async fn initiate_deposit(
        &self,
        owner_id: PlayerId,
        username: &str,
        amount: Money,
    ) -> Result<Deposit, DomainError> {
        if amount < self.min_deposit {
            return Err(DomainError::validation(
                ValidationKind::InvalidAmount,
                format!("minimum deposit is {}, got {amount}", self.min_deposit),
            ));
        }
        self.ledger.open_account(owner_id, username).await?;

        let tx_ref = format!("dep-{}", Uuid::new_v4().simple());
        let deposit = self.records.create_deposit(owner_id, amount, &tx_ref).await?;
        info!(owner_id, amount = %amount, tx_ref = %deposit.tx_ref, "Deposit initiated");
        Ok(deposit)
    }

    /// Apply the gateway's verdict on a deposit. Only the callback that moves
    /// the deposit out of `pending` has any effect.
    pub async fn confirm_deposit(
        &self,
        tx_ref: &str,
        succeeded: bool,
    ) -> Result<DepositResolution, DomainError> {
        let deposit = self.records.find_deposit(tx_ref).await?;
        let outcome = if succeeded {
            DepositStatus::Success
        } else {
            DepositStatus::Failed
        };

        if !self.records.resolve_deposit(tx_ref, outcome).await? {
            debug!(tx_ref, "Repeated deposit confirmation ignored");
            return Ok(DepositResolution::AlreadyResolved);
        }

        if !succeeded {
            info!(tx_ref, owner_id = deposit.owner_id, "Deposit marked failed");
            return Ok(DepositResolution::MarkedFailed);
        }

        match self
            .ledger
            .credit(deposit.owner_id, deposit.amount, LedgerEntryKind::Deposit, tx_ref)
            .await
        {
            Ok(balance) => {
                audit::deposit_confirmed(deposit.owner_id, deposit.amount, tx_ref);
                Ok(DepositResolution::Credited { balance })
            }
            Err(e) => {
                audit::reconciliation_needed(
                    Some(deposit.owner_id),
                    deposit.amount,
                    tx_ref,
                    &e.to_string(),
                );
                Err(e)
            }
        }
    }

    /// Debit the balance and queue a payout request. If the request cannot be
    /// recorded the debit is reversed.
    pub async fn request_withdrawal(
        &self,
        owner_id: PlayerId,
        amount: Money,
        account_details: &str,
    ) -> Result<WithdrawalRequest, DomainError> {
        let account_details = account_details.trim();
        if account_details.is_empty() {
            return Err(DomainError::validation(
                ValidationKind::InvalidInput,
                "account details are required",
            ));
        }

        let reference = format!("withdrawal:{owner_id}:{}", Uuid::new_v4().simple());
        self.ledger
            .debit(owner_id, amount, LedgerEntryKind::Withdrawal, &reference)
            .await?;

        match self
            .records
            .create_withdrawal(owner_id, amount, account_details)
            .await
        {
            Ok(request) => {
                audit::withdrawal_requested(owner_id, amount, account_details);
                Ok(request)
            }
            Err(e) => {
                warn!(owner_id, amount = %amount, error = %e, "Withdrawal not recorded; reversing debit");
                if let Err(refund_err) = self
                    .ledger
                    .credit(owner_id, amount, LedgerEntryKind::WithdrawalRefund, &reference)
                    .await
                {
                    audit::reconciliation_needed(
                        Some(owner_id),
                        amount,
                        &reference,
                        &refund_err.to_string(),
                    );
                }
                Err(e)
            }
        }
    }
}

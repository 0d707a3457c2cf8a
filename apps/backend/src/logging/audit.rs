//! Money-movement audit events.
//!
//! Emitted at warn/info with a stable `event` field so log pipelines can
//! alert on them independent of message wording.

use tracing::{error, info};

use crate::domain::money::Money;
use crate::domain::state::PlayerId;
use crate::logging::pii::Redacted;
use crate::trace_ctx;

pub fn deposit_confirmed(owner_id: PlayerId, amount: Money, tx_ref: &str) {
    info!(
        event = "PAYMENT_DEPOSIT_CONFIRMED",
        trace_id = %trace_ctx::trace_id(),
        owner_id,
        amount = %amount,
        tx_ref,
        "Deposit credited"
    );
}

pub fn withdrawal_requested(owner_id: PlayerId, amount: Money, account_details: &str) {
    info!(
        event = "PAYMENT_WITHDRAWAL_REQUESTED",
        trace_id = %trace_ctx::trace_id(),
        owner_id,
        amount = %amount,
        account_details = %Redacted(account_details),
        "Withdrawal requested"
    );
}

/// Money left one place and did not arrive at the next.
pub fn reconciliation_needed(owner_id: Option<PlayerId>, amount: Money, reference: &str, cause: &str) {
    error!(
        event = "PAYMENT_RECONCILIATION_NEEDED",
        trace_id = %trace_ctx::trace_id(),
        ?owner_id,
        amount = %amount,
        reference,
        cause,
        "Manual reconciliation required"
    );
}

//! Storage contracts consumed by the services.
//!
//! Each trait has an in-memory implementation (`adapters::memory`) and a
//! SeaORM implementation (`adapters::*_sea`).

pub mod games;
pub mod ledger;
pub mod payments;

pub use games::{GameStore, StoredGame};
pub use ledger::{Account, Ledger, LedgerEntry, LedgerEntryKind, LedgerOpKind, LedgerOperation};
pub use payments::{Deposit, DepositStatus, PaymentRecords, WithdrawalRequest, WithdrawalStatus};

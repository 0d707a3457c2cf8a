//! In-process implementations of the storage contracts.
//!
//! Used by tests and by the server when no database is configured. Each store
//! gives the same guarantees as its SeaORM counterpart, including CAS on game
//! versions and exactly-once deposit resolution.

mod games;
mod ledger;
mod payments;

pub use games::MemoryGameStore;
pub use ledger::MemoryLedger;
pub use payments::MemoryPaymentRecords;

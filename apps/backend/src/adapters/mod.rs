//! Adapters for external dependencies.

pub mod accounts_sea;
pub mod games_sea;
pub mod memory;
pub mod payments_sea;

pub use accounts_sea::SeaLedger;
pub use games_sea::SeaGameStore;
pub use payments_sea::SeaPaymentRecords;

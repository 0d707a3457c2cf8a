pub mod accounts;
pub mod deposits;
pub mod games;
pub mod ledger_entries;
pub mod platform_revenue;
pub mod withdrawals;

pub use accounts::Entity as Accounts;
pub use deposits::Entity as Deposits;
pub use games::Entity as Games;
pub use ledger_entries::Entity as LedgerEntries;
pub use platform_revenue::Entity as PlatformRevenue;
pub use withdrawals::Entity as Withdrawals;

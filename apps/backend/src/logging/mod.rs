pub mod audit;
pub mod pii;

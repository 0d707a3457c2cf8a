//! Domain-level error type used across the rules engine, services and adapters.
//!
//! This error type is HTTP- and DB-agnostic. Handlers return
//! `Result<T, crate::error::AppError>` and convert from `DomainError`
//! through `From<DomainError> for AppError`.

use std::error::Error;
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Rule and input violations.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ValidationKind {
    /// Operation not valid for the current game status
    InvalidState,
    NotYourTurn,
    NoActiveRoll,
    /// Token/roll combination not permitted
    IllegalMove,
    DuplicatePlayer,
    InvalidStake,
    InvalidWinCondition,
    InvalidAmount,
    InvalidInput,
    Other(String),
}

/// Infra error kinds to distinguish operational failures
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum InfraErrorKind {
    Timeout,
    DbUnavailable,
    DataCorruption,
    /// Money moved but the follow-up step failed; needs manual reconciliation
    Reconciliation,
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum NotFoundKind {
    Game,
    Account,
    Deposit,
    Player,
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConflictKind {
    /// Compare-and-swap on the game version failed
    VersionConflict,
    /// A payout was already recorded for the game
    AlreadySettled,
    DuplicateReference,
    Other(String),
}

/// Central domain error type
#[derive(Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Input/user validation or business rule violation
    Validation(ValidationKind, String),
    /// Ledger floor would be violated
    InsufficientFunds(String),
    /// Semantic conflict
    Conflict(ConflictKind, String),
    /// Missing resource in domain terms
    NotFound(NotFoundKind, String),
    /// Infrastructure/operational failures
    Infra(InfraErrorKind, String),
}

impl Display for DomainError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            DomainError::Validation(kind, d) => write!(f, "validation error {kind:?}: {d}"),
            DomainError::InsufficientFunds(d) => write!(f, "insufficient funds: {d}"),
            DomainError::Conflict(kind, d) => write!(f, "conflict {kind:?}: {d}"),
            DomainError::NotFound(kind, d) => write!(f, "not found {kind:?}: {d}"),
            DomainError::Infra(kind, d) => write!(f, "infra {kind:?}: {d}"),
        }
    }
}

impl Error for DomainError {}

impl DomainError {
    pub fn validation(kind: ValidationKind, detail: impl Into<String>) -> Self {
        Self::Validation(kind, detail.into())
    }
    pub fn invalid_state(detail: impl Into<String>) -> Self {
        Self::Validation(ValidationKind::InvalidState, detail.into())
    }
    pub fn insufficient_funds(detail: impl Into<String>) -> Self {
        Self::InsufficientFunds(detail.into())
    }
    pub fn conflict(kind: ConflictKind, detail: impl Into<String>) -> Self {
        Self::Conflict(kind, detail.into())
    }
    pub fn not_found(kind: NotFoundKind, detail: impl Into<String>) -> Self {
        Self::NotFound(kind, detail.into())
    }
    pub fn infra(kind: InfraErrorKind, detail: impl Into<String>) -> Self {
        Self::Infra(kind, detail.into())
    }

    pub fn is_version_conflict(&self) -> bool {
        matches!(self, DomainError::Conflict(ConflictKind::VersionConflict, _))
    }

    pub fn is_invalid_state(&self) -> bool {
        matches!(
            self,
            DomainError::Validation(ValidationKind::InvalidState, _)
        )
    }
}

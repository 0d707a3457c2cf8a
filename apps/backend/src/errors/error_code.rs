//! Error codes surfaced by the HTTP API.
//!
//! Add new codes here; never pass ad-hoc strings as error codes. Every code is
//! SCREAMING_SNAKE_CASE and appears verbatim in problem+json bodies.

use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Game rules
    InvalidState,
    NotYourTurn,
    NoActiveRoll,
    IllegalMove,
    DuplicatePlayer,

    // Request validation
    InvalidStake,
    InvalidWinCondition,
    InvalidAmount,
    InvalidGameId,
    InvalidPlayerId,
    InvalidHeader,
    ValidationError,
    BadRequest,

    // Money
    InsufficientFunds,

    // Caller
    Unauthorized,

    // Not found
    GameNotFound,
    AccountNotFound,
    DepositNotFound,
    PlayerNotFound,
    NotFound,

    // Conflicts
    /// Stale game version on a compare-and-swap write
    VersionConflict,
    AlreadySettled,
    DuplicateReference,
    Conflict,

    // System
    DbError,
    DbUnavailable,
    DbTimeout,
    DataCorruption,
    /// Money moved but a follow-up write failed
    ReconciliationRequired,
    InternalError,
    ConfigError,
}

impl ErrorCode {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidState => "INVALID_STATE",
            Self::NotYourTurn => "NOT_YOUR_TURN",
            Self::NoActiveRoll => "NO_ACTIVE_ROLL",
            Self::IllegalMove => "ILLEGAL_MOVE",
            Self::DuplicatePlayer => "DUPLICATE_PLAYER",

            Self::InvalidStake => "INVALID_STAKE",
            Self::InvalidWinCondition => "INVALID_WIN_CONDITION",
            Self::InvalidAmount => "INVALID_AMOUNT",
            Self::InvalidGameId => "INVALID_GAME_ID",
            Self::InvalidPlayerId => "INVALID_PLAYER_ID",
            Self::InvalidHeader => "INVALID_HEADER",
            Self::ValidationError => "VALIDATION_ERROR",
            Self::BadRequest => "BAD_REQUEST",

            Self::InsufficientFunds => "INSUFFICIENT_FUNDS",

            Self::Unauthorized => "UNAUTHORIZED",

            Self::GameNotFound => "GAME_NOT_FOUND",
            Self::AccountNotFound => "ACCOUNT_NOT_FOUND",
            Self::DepositNotFound => "DEPOSIT_NOT_FOUND",
            Self::PlayerNotFound => "PLAYER_NOT_FOUND",
            Self::NotFound => "NOT_FOUND",

            Self::VersionConflict => "VERSION_CONFLICT",
            Self::AlreadySettled => "ALREADY_SETTLED",
            Self::DuplicateReference => "DUPLICATE_REFERENCE",
            Self::Conflict => "CONFLICT",

            Self::DbError => "DB_ERROR",
            Self::DbUnavailable => "DB_UNAVAILABLE",
            Self::DbTimeout => "DB_TIMEOUT",
            Self::DataCorruption => "DATA_CORRUPTION",
            Self::ReconciliationRequired => "RECONCILIATION_REQUIRED",
            Self::InternalError => "INTERNAL_ERROR",
            Self::ConfigError => "CONFIG_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

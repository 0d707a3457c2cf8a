//! SeaORM -> DomainError translation helpers.
//!
//! Adapters return `sea_orm::DbErr`; this module is the single place that turns
//! those into `DomainError`, so services and handlers never see driver errors.

use tracing::{error, warn};

use crate::errors::domain::{ConflictKind, DomainError, InfraErrorKind, NotFoundKind};
use crate::logging::pii::Redacted;
use crate::trace_ctx;

/// Prefix of the structured payload the CAS adapters put in `DbErr::Custom`.
pub const OPTIMISTIC_LOCK_PREFIX: &str = "OPTIMISTIC_LOCK:";
pub const GAME_NOT_FOUND_PREFIX: &str = "GAME_NOT_FOUND:";
pub const ACCOUNT_NOT_FOUND_PREFIX: &str = "ACCOUNT_NOT_FOUND:";
pub const INSUFFICIENT_FUNDS_PREFIX: &str = "INSUFFICIENT_FUNDS:";

fn mentions_sqlstate(msg: &str, code: &str) -> bool {
    msg.contains(code) || msg.contains(&format!("SQLSTATE({code})"))
}

fn is_unique_violation(msg: &str) -> bool {
    mentions_sqlstate(msg, "23505")
        || msg.contains("duplicate key value violates unique constraint")
        || msg.contains("UNIQUE constraint failed")
}

fn is_check_violation(msg: &str) -> bool {
    mentions_sqlstate(msg, "23514") || msg.contains("CHECK constraint failed")
}

/// Map a unique violation to a conflict kind by table/constraint name.
fn unique_conflict(msg: &str) -> (ConflictKind, &'static str) {
    if msg.contains("deposits.tx_ref") || msg.contains("deposits_pkey") {
        return (
            ConflictKind::DuplicateReference,
            "Deposit reference already exists",
        );
    }
    (
        ConflictKind::Other("Unique".into()),
        "Unique constraint violation",
    )
}

#[derive(serde::Deserialize)]
struct LockInfo {
    expected: i32,
    actual: i32,
}

/// Translate a `DbErr` into a `DomainError` with sanitized, PII-safe detail.
pub fn map_db_err(e: sea_orm::DbErr) -> DomainError {
    let error_msg = e.to_string();
    let trace_id = trace_ctx::trace_id();

    match &e {
        sea_orm::DbErr::RecordNotFound(_) => {
            return DomainError::not_found(NotFoundKind::Other("Record".into()), "Record not found");
        }
        sea_orm::DbErr::Custom(msg) => {
            if let Some(id) = msg.strip_prefix(GAME_NOT_FOUND_PREFIX) {
                warn!(trace_id = %trace_id, game_id = %id, "Game not found");
                return DomainError::not_found(NotFoundKind::Game, format!("Game {id} not found"));
            }
            if let Some(id) = msg.strip_prefix(ACCOUNT_NOT_FOUND_PREFIX) {
                return DomainError::not_found(
                    NotFoundKind::Account,
                    format!("Account for player {id} not found"),
                );
            }
            if let Some(detail) = msg.strip_prefix(INSUFFICIENT_FUNDS_PREFIX) {
                return DomainError::insufficient_funds(detail.to_string());
            }
            if let Some(json_str) = msg.strip_prefix(OPTIMISTIC_LOCK_PREFIX) {
                if let Ok(info) = serde_json::from_str::<LockInfo>(json_str) {
                    warn!(
                        trace_id = %trace_id,
                        expected = info.expected,
                        actual = info.actual,
                        "Optimistic lock conflict detected"
                    );
                    return DomainError::conflict(
                        ConflictKind::VersionConflict,
                        format!(
                            "Resource was modified concurrently (expected version {}, actual version {}). Please refresh and retry.",
                            info.expected, info.actual
                        ),
                    );
                }
                warn!(trace_id = %trace_id, "Optimistic lock conflict detected (version info unavailable)");
                return DomainError::conflict(
                    ConflictKind::VersionConflict,
                    "Resource was modified by another transaction; please retry",
                );
            }
        }
        sea_orm::DbErr::ConnectionAcquire(_) | sea_orm::DbErr::Conn(_) => {
            warn!(trace_id = %trace_id, raw_error = %Redacted(&error_msg), "Database unavailable");
            return DomainError::infra(InfraErrorKind::DbUnavailable, "Database unavailable");
        }
        sea_orm::DbErr::Json(_) | sea_orm::DbErr::Type(_) => {
            error!(trace_id = %trace_id, raw_error = %Redacted(&error_msg), "Stored data could not be decoded");
            return DomainError::infra(InfraErrorKind::DataCorruption, "Stored data is corrupt");
        }
        _ => {}
    }

    if is_unique_violation(&error_msg) {
        warn!(trace_id = %trace_id, raw_error = %Redacted(&error_msg), "Unique constraint violation");
        let (kind, detail) = unique_conflict(&error_msg);
        return DomainError::conflict(kind, detail);
    }

    // balance >= 0 is enforced by a CHECK constraint as a second line of defence
    if is_check_violation(&error_msg) {
        warn!(trace_id = %trace_id, raw_error = %Redacted(&error_msg), "Check constraint violation");
        return DomainError::insufficient_funds("Balance cannot go negative");
    }

    if error_msg.contains("timeout") || error_msg.contains("pool") {
        warn!(trace_id = %trace_id, raw_error = %Redacted(&error_msg), "Database timeout or pool issue");
        return DomainError::infra(InfraErrorKind::Timeout, "Database timeout");
    }

    error!(trace_id = %trace_id, raw_error = %Redacted(&error_msg), "Unhandled database error");
    DomainError::infra(
        InfraErrorKind::Other("DbErr".into()),
        "Database operation failed",
    )
}

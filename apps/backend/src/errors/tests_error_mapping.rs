// Domain error -> HTTP mapping, without HTTP or database dependencies
use crate::errors::domain::{
    ConflictKind, DomainError, InfraErrorKind, NotFoundKind, ValidationKind,
};
use crate::errors::ErrorCode;
use crate::AppError;

fn status_and_code(err: DomainError) -> (u16, ErrorCode) {
    let app: AppError = err.into();
    (app.status().as_u16(), app.code())
}

#[test]
fn rule_violations_are_409() {
    for (kind, code) in [
        (ValidationKind::InvalidState, ErrorCode::InvalidState),
        (ValidationKind::NotYourTurn, ErrorCode::NotYourTurn),
        (ValidationKind::NoActiveRoll, ErrorCode::NoActiveRoll),
        (ValidationKind::DuplicatePlayer, ErrorCode::DuplicatePlayer),
    ] {
        assert_eq!(
            status_and_code(DomainError::validation(kind, "rule")),
            (409, code)
        );
    }
}

#[test]
fn illegal_move_is_422() {
    assert_eq!(
        status_and_code(DomainError::validation(ValidationKind::IllegalMove, "no")),
        (422, ErrorCode::IllegalMove)
    );
}

#[test]
fn input_validation_is_400() {
    for (kind, code) in [
        (ValidationKind::InvalidStake, ErrorCode::InvalidStake),
        (ValidationKind::InvalidWinCondition, ErrorCode::InvalidWinCondition),
        (ValidationKind::InvalidAmount, ErrorCode::InvalidAmount),
        (ValidationKind::InvalidInput, ErrorCode::ValidationError),
        (ValidationKind::Other("x".into()), ErrorCode::ValidationError),
    ] {
        assert_eq!(
            status_and_code(DomainError::validation(kind, "input")),
            (400, code)
        );
    }
}

#[test]
fn maps_conflicts() {
    assert_eq!(
        status_and_code(DomainError::conflict(ConflictKind::VersionConflict, "stale")),
        (409, ErrorCode::VersionConflict)
    );
    assert_eq!(
        status_and_code(DomainError::conflict(ConflictKind::AlreadySettled, "paid")),
        (409, ErrorCode::AlreadySettled)
    );
    assert_eq!(
        status_and_code(DomainError::conflict(ConflictKind::DuplicateReference, "dup")),
        (409, ErrorCode::DuplicateReference)
    );
    assert_eq!(
        status_and_code(DomainError::conflict(ConflictKind::Other("x".into()), "x")),
        (409, ErrorCode::Conflict)
    );
}

#[test]
fn maps_not_found() {
    for (kind, code) in [
        (NotFoundKind::Game, ErrorCode::GameNotFound),
        (NotFoundKind::Account, ErrorCode::AccountNotFound),
        (NotFoundKind::Deposit, ErrorCode::DepositNotFound),
        (NotFoundKind::Player, ErrorCode::PlayerNotFound),
        (NotFoundKind::Other("x".into()), ErrorCode::NotFound),
    ] {
        assert_eq!(
            status_and_code(DomainError::not_found(kind, "gone")),
            (404, code)
        );
    }
}

#[test]
fn insufficient_funds_is_402() {
    assert_eq!(
        status_and_code(DomainError::insufficient_funds("short")),
        (402, ErrorCode::InsufficientFunds)
    );
}

#[test]
fn maps_infra() {
    assert_eq!(
        status_and_code(DomainError::infra(InfraErrorKind::DbUnavailable, "down")),
        (503, ErrorCode::DbUnavailable)
    );
    assert_eq!(
        status_and_code(DomainError::infra(InfraErrorKind::Timeout, "slow")),
        (500, ErrorCode::DbTimeout)
    );
    assert_eq!(
        status_and_code(DomainError::infra(InfraErrorKind::Reconciliation, "stuck")),
        (500, ErrorCode::ReconciliationRequired)
    );
    assert_eq!(
        status_and_code(DomainError::infra(InfraErrorKind::DataCorruption, "bad json")),
        (500, ErrorCode::DataCorruption)
    );
}

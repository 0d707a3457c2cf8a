//! Dice rolling and the three-sixes rule.

use rand::Rng;
use serde::Serialize;

use super::moves::{legal_moves, BONUS_ROLL};
use super::state::{GameState, GameStatus, PlayerId};
use crate::errors::domain::{DomainError, ValidationKind};

/// Consecutive sixes that forfeit the turn.
pub const MAX_SIX_STREAK: u8 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnPass {
    ThreeSixes,
    NoLegalMove,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RollOutcome {
    pub value: u8,
    /// Set when the roll ended the turn without granting a move.
    pub turn_passed: Option<TurnPass>,
    pub legal_moves: Vec<usize>,
}

pub fn roll_dice<R: Rng + ?Sized>(
    state: &GameState,
    player_id: PlayerId,
    rng: &mut R,
) -> Result<(GameState, RollOutcome), DomainError> {
    check_can_roll(state, player_id)?;
    let value: u8 = rng.random_range(1..=6);
    apply_roll(state, player_id, value)
}

/// Apply an already-drawn die value. Split from [`roll_dice`] so the rules can
/// be driven with scripted values.
pub fn apply_roll(
    state: &GameState,
    player_id: PlayerId,
    value: u8,
) -> Result<(GameState, RollOutcome), DomainError> {
    check_can_roll(state, player_id)?;
    if !(1..=6).contains(&value) {
        return Err(DomainError::validation(
            ValidationKind::InvalidInput,
            format!("die value {value} out of range"),
        ));
    }

    let mut next = state.clone();
    next.dice_roll = Some(value);

    if value == BONUS_ROLL {
        next.six_streak += 1;
        if next.six_streak >= MAX_SIX_STREAK {
            next.advance_turn();
            return Ok((
                next,
                RollOutcome {
                    value,
                    turn_passed: Some(TurnPass::ThreeSixes),
                    legal_moves: Vec::new(),
                },
            ));
        }
    } else {
        next.six_streak = 0;
    }

    let moves = legal_moves(&next, player_id, value);
    if moves.is_empty() {
        next.advance_turn();
        return Ok((
            next,
            RollOutcome {
                value,
                turn_passed: Some(TurnPass::NoLegalMove),
                legal_moves: moves,
            },
        ));
    }

    Ok((
        next,
        RollOutcome {
            value,
            turn_passed: None,
            legal_moves: moves,
        },
    ))
}

fn check_can_roll(state: &GameState, player_id: PlayerId) -> Result<(), DomainError> {
    state.require_status(GameStatus::Active)?;
    if state.current_player_id() != Some(player_id) {
        return Err(DomainError::validation(
            ValidationKind::NotYourTurn,
            format!("it is not player {player_id}'s turn"),
        ));
    }
    if state.dice_roll.is_some() {
        return Err(DomainError::invalid_state(
            "a roll is already pending; move a token first",
        ));
    }
    Ok(())
}

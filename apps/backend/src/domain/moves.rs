//! Legal-move computation and move application.

use serde::Serialize;

use super::board::{
    is_safe, Color, Position, HOME, HOME_ENTRY_RELATIVE, HOME_PATH_START, TOKENS_PER_PLAYER,
    TRACK_LEN, YARD,
};
use super::state::{GameState, GameStatus, PlayerId};
use crate::errors::domain::{DomainError, ValidationKind};

/// Roll that lets a token leave the yard and grants another roll.
pub const BONUS_ROLL: u8 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Capture {
    pub player_id: PlayerId,
    pub token_index: usize,
    pub square: i16,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoveOutcome {
    pub token_index: usize,
    pub from: i16,
    pub to: i16,
    pub captures: Vec<Capture>,
    pub winner_id: Option<PlayerId>,
    pub turn_passed: bool,
}

/// Token indices `player_id` may move with `roll`, in ascending order.
pub fn legal_moves(state: &GameState, player_id: PlayerId, roll: u8) -> Vec<usize> {
    let Some(player) = state.players.get(&player_id) else {
        return Vec::new();
    };
    let roll = i16::from(roll);
    player
        .tokens
        .iter()
        .enumerate()
        .filter(|(_, &code)| match Position::from_code(code) {
            Some(Position::Home) | None => false,
            Some(Position::Yard) => roll == i16::from(BONUS_ROLL),
            Some(Position::HomePath(pos)) => pos + roll <= HOME,
            Some(Position::Track(_)) => true,
        })
        .map(|(idx, _)| idx)
        .collect()
}

/// Where a token of `color` at `code` lands after `roll`. Callers check
/// legality first; a yard token here always enters at the start square.
pub fn destination(color: Color, code: i16, roll: u8) -> i16 {
    let roll = i16::from(roll);
    match Position::from_code(code) {
        Some(Position::Yard) => color.start_square(),
        Some(Position::HomePath(pos)) => (pos + roll).min(HOME),
        Some(Position::Track(square)) => {
            let travelled = color.relative(square) + roll;
            if travelled > HOME_ENTRY_RELATIVE {
                let overshoot = travelled - HOME_ENTRY_RELATIVE;
                (HOME_PATH_START + overshoot - 1).min(HOME)
            } else {
                (color.start_square() + travelled) % TRACK_LEN
            }
        }
        Some(Position::Home) | None => code,
    }
}

pub fn move_token(
    state: &GameState,
    player_id: PlayerId,
    token_index: usize,
) -> Result<(GameState, MoveOutcome), DomainError> {
    state.require_status(GameStatus::Active)?;
    if state.current_player_id() != Some(player_id) {
        return Err(DomainError::validation(
            ValidationKind::NotYourTurn,
            format!("it is not player {player_id}'s turn"),
        ));
    }
    let roll = state.dice_roll.ok_or_else(|| {
        DomainError::validation(ValidationKind::NoActiveRoll, "roll the dice before moving")
    })?;
    if token_index >= TOKENS_PER_PLAYER || !legal_moves(state, player_id, roll).contains(&token_index)
    {
        return Err(DomainError::validation(
            ValidationKind::IllegalMove,
            format!("token {token_index} cannot move {roll}"),
        ));
    }

    let mut next = state.clone();
    let color = next.player(player_id)?.color;
    let from = next.player(player_id)?.tokens[token_index];
    let to = destination(color, from, roll);
    if let Some(mover) = next.players.get_mut(&player_id) {
        mover.tokens[token_index] = to;
    }

    let captures = if matches!(Position::from_code(to), Some(Position::Track(_))) {
        knockout(&mut next, player_id, to)
    } else {
        Vec::new()
    };

    next.dice_roll = None;

    let winner_id = if next.player(player_id)?.tokens_home() >= next.win_condition.tokens() {
        next.status = GameStatus::Finished;
        next.winner_id = Some(player_id);
        next.six_streak = 0;
        Some(player_id)
    } else {
        None
    };

    let turn_passed = winner_id.is_none() && roll != BONUS_ROLL;
    if turn_passed {
        next.advance_turn();
    }

    Ok((
        next,
        MoveOutcome {
            token_index,
            from,
            to,
            captures,
            winner_id,
            turn_passed,
        },
    ))
}

/// Send opposing tokens on `square` back to the yard.
///
/// Safe squares never capture. An opponent with two or more tokens on the
/// square forms a block and keeps them; a lone opposing token is captured.
fn knockout(state: &mut GameState, mover: PlayerId, square: i16) -> Vec<Capture> {
    if is_safe(square) {
        return Vec::new();
    }

    let mut captures = Vec::new();
    for (&pid, player) in state.players.iter_mut() {
        if pid == mover {
            continue;
        }
        let occupying: Vec<usize> = player
            .tokens
            .iter()
            .enumerate()
            .filter(|(_, &code)| code == square)
            .map(|(idx, _)| idx)
            .collect();
        if let [idx] = occupying[..] {
            player.tokens[idx] = YARD;
            captures.push(Capture {
                player_id: pid,
                token_index: idx,
                square,
            });
        }
    }
    captures
}

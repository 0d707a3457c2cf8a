//! Lobby, activation and forfeiture.

use std::collections::BTreeMap;

use rand::seq::SliceRandom;
use rand::Rng;

use super::board::Color;
use super::money::Money;
use super::state::{GameState, GameStatus, PlayerId, PlayerState, WinCondition, PLAYERS};
use crate::errors::domain::{DomainError, ValidationKind};

/// New lobby with the creator seated as RED. The pot holds the creator's stake
/// on paper; nothing is debited until the game activates.
pub fn create(
    creator_id: PlayerId,
    username: &str,
    stake: Money,
    win_condition: WinCondition,
) -> Result<GameState, DomainError> {
    if !stake.is_positive() {
        return Err(DomainError::validation(
            ValidationKind::InvalidStake,
            format!("stake must be positive, got {stake}"),
        ));
    }

    let mut players = BTreeMap::new();
    players.insert(creator_id, PlayerState::new(username, Color::Red));

    Ok(GameState {
        game_id: 0,
        players,
        player_order: vec![creator_id],
        turn_index: 0,
        dice_roll: None,
        six_streak: 0,
        pot_amount: stake,
        stake_per_player: stake,
        win_condition,
        status: GameStatus::Lobby,
        winner_id: None,
        settlement: None,
    })
}

/// Seat the second player as YELLOW, shuffle who moves first and activate.
pub fn join<R: Rng + ?Sized>(
    state: &GameState,
    joiner_id: PlayerId,
    username: &str,
    rng: &mut R,
) -> Result<GameState, DomainError> {
    state.require_status(GameStatus::Lobby)?;
    if state.players.contains_key(&joiner_id) {
        return Err(DomainError::validation(
            ValidationKind::DuplicatePlayer,
            format!("player {joiner_id} is already seated in game {}", state.game_id),
        ));
    }
    if state.players.len() >= PLAYERS {
        return Err(DomainError::invalid_state(format!(
            "game {} is full",
            state.game_id
        )));
    }

    let pot = state
        .pot_amount
        .checked_add(state.stake_per_player)
        .ok_or_else(|| {
            DomainError::validation(ValidationKind::InvalidStake, "pot overflows")
        })?;

    let mut next = state.clone();
    next.players
        .insert(joiner_id, PlayerState::new(username, Color::Yellow));
    next.player_order.push(joiner_id);
    next.player_order.shuffle(rng);
    next.turn_index = 0;
    next.pot_amount = pot;
    next.status = GameStatus::Active;
    Ok(next)
}

/// End an active game against `forfeiting_player_id`; the other seat wins.
pub fn forfeit(
    state: &GameState,
    forfeiting_player_id: PlayerId,
) -> Result<(GameState, PlayerId), DomainError> {
    state.require_status(GameStatus::Active)?;
    state.player(forfeiting_player_id)?;
    let winner = state.opponent_of(forfeiting_player_id).ok_or_else(|| {
        DomainError::invalid_state(format!("game {} has no opponent", state.game_id))
    })?;

    let mut next = state.clone();
    next.status = GameStatus::Forfeited;
    next.winner_id = Some(winner);
    next.dice_roll = None;
    next.six_streak = 0;
    Ok((next, winner))
}

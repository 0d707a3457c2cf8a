//! Read-only projection of a game for presentation layers.

use serde::Serialize;

use super::board::Color;
use super::money::Money;
use super::moves::legal_moves;
use super::state::{GameId, GameState, GameStatus, PlayerId, Settlement, WinCondition};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerSnapshot {
    pub player_id: PlayerId,
    pub username: String,
    pub color: Color,
    pub tokens: [i16; 4],
    pub tokens_home: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameSnapshot {
    pub game_id: GameId,
    pub version: i32,
    pub status: GameStatus,
    /// Seats in turn order.
    pub players: Vec<PlayerSnapshot>,
    pub current_player_id: Option<PlayerId>,
    pub dice_roll: Option<u8>,
    pub six_streak: u8,
    /// Tokens the current player may move with the pending roll.
    pub legal_moves: Vec<usize>,
    pub pot_amount: Money,
    pub stake_per_player: Money,
    pub win_condition: WinCondition,
    pub winner_id: Option<PlayerId>,
    pub settlement: Option<Settlement>,
}

pub fn snapshot(state: &GameState, version: i32) -> GameSnapshot {
    let current_player_id = match state.status {
        GameStatus::Active => state.current_player_id(),
        _ => None,
    };
    let legal = match (current_player_id, state.dice_roll) {
        (Some(pid), Some(roll)) => legal_moves(state, pid, roll),
        _ => Vec::new(),
    };

    let players = state
        .player_order
        .iter()
        .filter_map(|pid| {
            state.players.get(pid).map(|p| PlayerSnapshot {
                player_id: *pid,
                username: p.username.clone(),
                color: p.color,
                tokens: p.tokens,
                tokens_home: p.tokens_home(),
            })
        })
        .collect();

    GameSnapshot {
        game_id: state.game_id,
        version,
        status: state.status,
        players,
        current_player_id,
        dice_roll: state.dice_roll,
        six_streak: state.six_streak,
        legal_moves: legal,
        pot_amount: state.pot_amount,
        stake_per_player: state.stake_per_player,
        win_condition: state.win_condition,
        winner_id: state.winner_id,
        settlement: state.settlement,
    }
}

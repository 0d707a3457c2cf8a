//! Test-only game state builders for domain unit tests.

use std::collections::BTreeMap;

use crate::domain::board::{Color, YARD};
use crate::domain::money::Money;
use crate::domain::state::{GameState, GameStatus, PlayerId, PlayerState, WinCondition};

pub const RED: PlayerId = 1;
pub const YELLOW: PlayerId = 2;

pub struct MakeGameArgs {
    pub red_tokens: [i16; 4],
    pub yellow_tokens: [i16; 4],
    /// Whose turn it is; RED moves first otherwise.
    pub turn: PlayerId,
    pub dice_roll: Option<u8>,
    pub six_streak: u8,
    pub win_condition: WinCondition,
    pub status: GameStatus,
}

impl Default for MakeGameArgs {
    fn default() -> Self {
        Self {
            red_tokens: [YARD; 4],
            yellow_tokens: [YARD; 4],
            turn: RED,
            dice_roll: None,
            six_streak: 0,
            win_condition: WinCondition::One,
            status: GameStatus::Active,
        }
    }
}

/// Active two-player game, RED (id 1) then YELLOW (id 2), stake 20 each.
pub fn make_game(args: MakeGameArgs) -> GameState {
    let mut players = BTreeMap::new();
    players.insert(
        RED,
        PlayerState {
            username: "red".into(),
            color: Color::Red,
            tokens: args.red_tokens,
        },
    );
    players.insert(
        YELLOW,
        PlayerState {
            username: "yellow".into(),
            color: Color::Yellow,
            tokens: args.yellow_tokens,
        },
    );
    let stake = Money::from_minor(2000);
    GameState {
        game_id: 7,
        players,
        player_order: vec![RED, YELLOW],
        turn_index: if args.turn == RED { 0 } else { 1 },
        dice_roll: args.dice_roll,
        six_streak: args.six_streak,
        pot_amount: Money::from_minor(4000),
        stake_per_player: stake,
        win_condition: args.win_condition,
        status: args.status,
        winner_id: None,
        settlement: None,
    }
}

pub fn tokens_of(state: &GameState, player_id: PlayerId) -> [i16; 4] {
    state.players[&player_id].tokens
}

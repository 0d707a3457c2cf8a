//! The game state value owned by the rules engine and persisted as a blob.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::board::{Color, HOME, TOKENS_PER_PLAYER, YARD};
use super::money::Money;
use crate::errors::domain::{DomainError, ValidationKind};

pub type PlayerId = i64;
pub type GameId = i64;

/// Number of seats in this variant.
pub const PLAYERS: usize = 2;

/// Tokens at HOME required to win.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum WinCondition {
    One,
    Two,
    Four,
}

impl WinCondition {
    pub const fn tokens(self) -> usize {
        match self {
            WinCondition::One => 1,
            WinCondition::Two => 2,
            WinCondition::Four => 4,
        }
    }
}

impl TryFrom<u8> for WinCondition {
    type Error = DomainError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(WinCondition::One),
            2 => Ok(WinCondition::Two),
            4 => Ok(WinCondition::Four),
            other => Err(DomainError::validation(
                ValidationKind::InvalidWinCondition,
                format!("win condition must be 1, 2 or 4, got {other}"),
            )),
        }
    }
}

impl From<WinCondition> for u8 {
    fn from(value: WinCondition) -> Self {
        value.tokens() as u8
    }
}

impl std::fmt::Display for WinCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tokens())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    Lobby,
    Active,
    Finished,
    Forfeited,
}

impl GameStatus {
    pub const fn is_terminal(self) -> bool {
        matches!(self, GameStatus::Finished | GameStatus::Forfeited)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            GameStatus::Lobby => "lobby",
            GameStatus::Active => "active",
            GameStatus::Finished => "finished",
            GameStatus::Forfeited => "forfeited",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerState {
    pub username: String,
    pub color: Color,
    pub tokens: [i16; TOKENS_PER_PLAYER],
}

impl PlayerState {
    pub fn new(username: impl Into<String>, color: Color) -> Self {
        Self {
            username: username.into(),
            color,
            tokens: [YARD; TOKENS_PER_PLAYER],
        }
    }

    pub fn tokens_home(&self) -> usize {
        self.tokens.iter().filter(|&&t| t == HOME).count()
    }
}

/// Payout recorded on a terminal game. Its presence is what makes payout
/// happen at most once per game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    pub winner_id: PlayerId,
    pub prize: Money,
    pub commission: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    /// Zero until the store assigns an id.
    pub game_id: GameId,
    pub players: BTreeMap<PlayerId, PlayerState>,
    pub player_order: Vec<PlayerId>,
    pub turn_index: usize,
    pub dice_roll: Option<u8>,
    pub six_streak: u8,
    pub pot_amount: Money,
    pub stake_per_player: Money,
    pub win_condition: WinCondition,
    pub status: GameStatus,
    #[serde(default)]
    pub winner_id: Option<PlayerId>,
    #[serde(default)]
    pub settlement: Option<Settlement>,
}

impl GameState {
    pub fn current_player_id(&self) -> Option<PlayerId> {
        self.player_order.get(self.turn_index).copied()
    }

    pub fn player(&self, player_id: PlayerId) -> Result<&PlayerState, DomainError> {
        self.players.get(&player_id).ok_or_else(|| {
            DomainError::not_found(
                crate::errors::domain::NotFoundKind::Player,
                format!("player {player_id} is not in game {}", self.game_id),
            )
        })
    }

    /// The other seat in a two-player game.
    pub fn opponent_of(&self, player_id: PlayerId) -> Option<PlayerId> {
        self.player_order.iter().copied().find(|&p| p != player_id)
    }

    pub fn require_status(&self, expected: GameStatus) -> Result<(), DomainError> {
        if self.status == expected {
            Ok(())
        } else {
            Err(DomainError::invalid_state(format!(
                "game {} is {}, expected {}",
                self.game_id,
                self.status.as_str(),
                expected.as_str()
            )))
        }
    }

    /// Pass the turn to the next seat, clearing any pending roll and streak.
    pub(crate) fn advance_turn(&mut self) {
        if !self.player_order.is_empty() {
            self.turn_index = (self.turn_index + 1) % self.player_order.len();
        }
        self.dice_roll = None;
        self.six_streak = 0;
    }

    /// All token codes on the board, with their owner and color.
    pub fn tokens(&self) -> impl Iterator<Item = (PlayerId, Color, usize, i16)> + '_ {
        self.players.iter().flat_map(|(&pid, p)| {
            p.tokens
                .iter()
                .enumerate()
                .map(move |(idx, &code)| (pid, p.color, idx, code))
        })
    }
}

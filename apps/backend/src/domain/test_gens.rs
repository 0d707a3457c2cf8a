// Proptest generators for board positions and game states.

use proptest::prelude::*;

use crate::domain::board::{HOME, HOME_PATH_START, TRACK_LEN, YARD};
use crate::domain::state::{GameState, WinCondition};
use crate::domain::test_state_helpers::{make_game, MakeGameArgs};

pub fn die() -> impl Strategy<Value = u8> {
    1u8..=6
}

pub fn track_square() -> impl Strategy<Value = i16> {
    0..TRACK_LEN
}

/// Any valid position code: yard, ring, home path or home.
pub fn position_code() -> impl Strategy<Value = i16> {
    prop_oneof![
        Just(YARD),
        track_square(),
        HOME_PATH_START..HOME,
        Just(HOME),
    ]
}

/// Four tokens that leave the player short of a win under `WinCondition::Four`.
pub fn tokens() -> impl Strategy<Value = [i16; 4]> {
    prop::array::uniform4(position_code()).prop_filter("not all home", |t| {
        t.iter().filter(|&&c| c == HOME).count() < 4
    })
}

pub fn win_condition() -> impl Strategy<Value = WinCondition> {
    prop_oneof![
        Just(WinCondition::One),
        Just(WinCondition::Two),
        Just(WinCondition::Four),
    ]
}

/// Fresh active game: all tokens in the yard, RED to move.
pub fn fresh_game() -> impl Strategy<Value = GameState> {
    win_condition().prop_map(|win_condition| {
        make_game(MakeGameArgs {
            win_condition,
            ..Default::default()
        })
    })
}

/// A playout script: die values paired with a token preference.
pub fn script() -> impl Strategy<Value = Vec<(u8, usize)>> {
    prop::collection::vec((die(), 0usize..4), 1..300)
}

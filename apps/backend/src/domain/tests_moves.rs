use crate::domain::board::{Color, HOME, YARD};
use crate::domain::moves::{destination, legal_moves, move_token};
use crate::domain::state::{GameStatus, WinCondition};
use crate::domain::test_state_helpers::{make_game, tokens_of, MakeGameArgs, RED, YELLOW};
use crate::errors::domain::{DomainError, ValidationKind};

#[test]
fn crossing_home_entry_by_three_lands_on_103() {
    let game = make_game(MakeGameArgs {
        red_tokens: [47, YARD, YARD, YARD],
        dice_roll: Some(6),
        ..Default::default()
    });
    let (next, outcome) = move_token(&game, RED, 0).unwrap();
    assert_eq!(outcome.to, 103);
    assert_eq!(tokens_of(&next, RED)[0], 103);

    // same rule in YELLOW's own coordinates: 22 is 48 squares from 26
    assert_eq!(destination(Color::Yellow, 22, 5), 103);
}

#[test]
fn landing_on_home_entry_stays_on_track() {
    assert_eq!(destination(Color::Red, 45, 5), 50);
    assert_eq!(destination(Color::Yellow, 20, 4), 24);
}

#[test]
fn track_wraps_around_ring() {
    assert_eq!(destination(Color::Yellow, 50, 4), 2);
    assert_eq!(destination(Color::Red, 49, 1), 50);
}

#[test]
fn yard_entry_uses_start_square() {
    assert_eq!(destination(Color::Red, YARD, 6), 0);
    assert_eq!(destination(Color::Yellow, YARD, 6), 26);
}

#[test]
fn home_path_cannot_overshoot() {
    let game = make_game(MakeGameArgs {
        red_tokens: [104, 102, HOME, YARD],
        ..Default::default()
    });
    assert_eq!(legal_moves(&game, RED, 3), vec![0, 1]);
    assert_eq!(legal_moves(&game, RED, 4), vec![1]);
    assert_eq!(legal_moves(&game, RED, 6), vec![3]);
}

#[test]
fn lone_opposing_token_is_knocked_out() {
    let game = make_game(MakeGameArgs {
        red_tokens: [3, YARD, YARD, YARD],
        yellow_tokens: [5, YARD, YARD, YARD],
        dice_roll: Some(2),
        ..Default::default()
    });
    let (next, outcome) = move_token(&game, RED, 0).unwrap();
    assert_eq!(tokens_of(&next, YELLOW)[0], YARD);
    assert_eq!(outcome.captures.len(), 1);
    assert_eq!(outcome.captures[0].player_id, YELLOW);
}

#[test]
fn safe_square_protects_opponent() {
    let game = make_game(MakeGameArgs {
        red_tokens: [5, YARD, YARD, YARD],
        yellow_tokens: [8, YARD, YARD, YARD],
        dice_roll: Some(3),
        ..Default::default()
    });
    let (next, outcome) = move_token(&game, RED, 0).unwrap();
    assert_eq!(tokens_of(&next, RED)[0], 8);
    assert_eq!(tokens_of(&next, YELLOW)[0], 8);
    assert!(outcome.captures.is_empty());
}

#[test]
fn block_is_immune_to_capture() {
    let game = make_game(MakeGameArgs {
        red_tokens: [7, YARD, YARD, YARD],
        yellow_tokens: [10, 10, YARD, YARD],
        dice_roll: Some(3),
        ..Default::default()
    });
    let (next, outcome) = move_token(&game, RED, 0).unwrap();
    assert_eq!(tokens_of(&next, YELLOW), [10, 10, YARD, YARD]);
    assert!(outcome.captures.is_empty());
}

#[test]
fn six_keeps_turn_other_rolls_pass_it() {
    let game = make_game(MakeGameArgs {
        red_tokens: [3, YARD, YARD, YARD],
        dice_roll: Some(6),
        six_streak: 1,
        ..Default::default()
    });
    let (next, outcome) = move_token(&game, RED, 0).unwrap();
    assert!(!outcome.turn_passed);
    assert_eq!(next.current_player_id(), Some(RED));
    assert_eq!(next.dice_roll, None);
    assert_eq!(next.six_streak, 1);

    let game = make_game(MakeGameArgs {
        red_tokens: [3, YARD, YARD, YARD],
        dice_roll: Some(4),
        ..Default::default()
    });
    let (next, outcome) = move_token(&game, RED, 0).unwrap();
    assert!(outcome.turn_passed);
    assert_eq!(next.current_player_id(), Some(YELLOW));
}

#[test]
fn reaching_win_condition_finishes_game() {
    let game = make_game(MakeGameArgs {
        red_tokens: [105, YARD, YARD, YARD],
        dice_roll: Some(2),
        ..Default::default()
    });
    let (next, outcome) = move_token(&game, RED, 0).unwrap();
    assert_eq!(outcome.winner_id, Some(RED));
    assert_eq!(next.status, GameStatus::Finished);
    assert_eq!(next.winner_id, Some(RED));

    let mut again = next.clone();
    again.dice_roll = Some(6);
    assert!(move_token(&again, RED, 1).unwrap_err().is_invalid_state());
}

#[test]
fn win_requires_full_count() {
    let game = make_game(MakeGameArgs {
        red_tokens: [105, YARD, YARD, YARD],
        dice_roll: Some(2),
        win_condition: WinCondition::Two,
        ..Default::default()
    });
    let (next, outcome) = move_token(&game, RED, 0).unwrap();
    assert_eq!(outcome.winner_id, None);
    assert_eq!(next.status, GameStatus::Active);

    let game = make_game(MakeGameArgs {
        red_tokens: [HOME, 104, YARD, YARD],
        dice_roll: Some(3),
        win_condition: WinCondition::Two,
        ..Default::default()
    });
    let (next, _) = move_token(&game, RED, 1).unwrap();
    assert_eq!(next.status, GameStatus::Finished);
}

#[test]
fn move_contract_violations() {
    let no_roll = make_game(MakeGameArgs {
        red_tokens: [3, YARD, YARD, YARD],
        ..Default::default()
    });
    assert!(matches!(
        move_token(&no_roll, RED, 0).unwrap_err(),
        DomainError::Validation(ValidationKind::NoActiveRoll, _)
    ));

    let rolled = make_game(MakeGameArgs {
        red_tokens: [3, YARD, HOME, YARD],
        dice_roll: Some(4),
        ..Default::default()
    });
    assert!(matches!(
        move_token(&rolled, YELLOW, 0).unwrap_err(),
        DomainError::Validation(ValidationKind::NotYourTurn, _)
    ));
    for idx in [1, 2, 4] {
        assert!(matches!(
            move_token(&rolled, RED, idx).unwrap_err(),
            DomainError::Validation(ValidationKind::IllegalMove, _)
        ));
    }
}

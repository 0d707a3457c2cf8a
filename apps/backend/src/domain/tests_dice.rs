use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

use crate::domain::board::YARD;
use crate::domain::dice::{apply_roll, roll_dice, TurnPass};
use crate::domain::moves::{legal_moves, move_token};
use crate::domain::state::GameStatus;
use crate::domain::test_state_helpers::{make_game, MakeGameArgs, RED, YELLOW};
use crate::errors::domain::{DomainError, ValidationKind};

#[test]
fn yard_token_not_legal_on_four_and_turn_passes() {
    let game = make_game(MakeGameArgs::default());
    assert!(legal_moves(&game, RED, 4).is_empty());

    let (next, outcome) = apply_roll(&game, RED, 4).unwrap();
    assert_eq!(outcome.turn_passed, Some(TurnPass::NoLegalMove));
    assert_eq!(next.current_player_id(), Some(YELLOW));
    assert_eq!(next.dice_roll, None);
}

#[test]
fn six_releases_yard_token() {
    let game = make_game(MakeGameArgs::default());
    let (next, outcome) = apply_roll(&game, RED, 6).unwrap();
    assert_eq!(outcome.turn_passed, None);
    assert_eq!(outcome.legal_moves, vec![0, 1, 2, 3]);
    assert_eq!(next.dice_roll, Some(6));
    assert_eq!(next.six_streak, 1);
}

#[test]
fn three_sixes_pass_the_turn_without_a_move() {
    let mut game = make_game(MakeGameArgs {
        red_tokens: [5, YARD, YARD, YARD],
        ..Default::default()
    });

    for _ in 0..2 {
        let (rolled, outcome) = apply_roll(&game, RED, 6).unwrap();
        assert_eq!(outcome.turn_passed, None);
        let (moved, _) = move_token(&rolled, RED, 0).unwrap();
        assert_eq!(moved.current_player_id(), Some(RED));
        game = moved;
    }
    assert_eq!(game.six_streak, 2);

    let (next, outcome) = apply_roll(&game, RED, 6).unwrap();
    assert_eq!(outcome.turn_passed, Some(TurnPass::ThreeSixes));
    assert!(outcome.legal_moves.is_empty());
    assert_eq!(next.current_player_id(), Some(YELLOW));
    assert_eq!(next.six_streak, 0);
    assert_eq!(next.dice_roll, None);
}

#[test]
fn non_six_resets_streak() {
    let game = make_game(MakeGameArgs {
        red_tokens: [5, YARD, YARD, YARD],
        six_streak: 2,
        ..Default::default()
    });
    let (next, _) = apply_roll(&game, RED, 3).unwrap();
    assert_eq!(next.six_streak, 0);
    assert_eq!(next.dice_roll, Some(3));
}

#[test]
fn pending_roll_blocks_another_roll() {
    let game = make_game(MakeGameArgs {
        red_tokens: [5, YARD, YARD, YARD],
        dice_roll: Some(2),
        ..Default::default()
    });
    assert!(apply_roll(&game, RED, 3).unwrap_err().is_invalid_state());
}

#[test]
fn only_current_player_rolls() {
    let game = make_game(MakeGameArgs::default());
    let err = apply_roll(&game, YELLOW, 3).unwrap_err();
    assert!(matches!(
        err,
        DomainError::Validation(ValidationKind::NotYourTurn, _)
    ));
}

#[test]
fn terminal_games_reject_rolls() {
    for status in [GameStatus::Finished, GameStatus::Forfeited, GameStatus::Lobby] {
        let game = make_game(MakeGameArgs {
            status,
            ..Default::default()
        });
        assert!(apply_roll(&game, RED, 3).unwrap_err().is_invalid_state());
    }
}

#[test]
fn random_rolls_stay_in_range() {
    let mut rng = ChaCha20Rng::seed_from_u64(42);
    let game = make_game(MakeGameArgs {
        red_tokens: [5, 6, 7, 9],
        ..Default::default()
    });
    for _ in 0..200 {
        let (_, outcome) = roll_dice(&game, RED, &mut rng).unwrap();
        assert!((1..=6).contains(&outcome.value));
    }
}

/// Property-based tests for board invariants across playouts and single moves
use proptest::prelude::*;

use crate::domain::board::{is_valid_code, Color, HOME, SAFE_ZONES, YARD};
use crate::domain::dice::{apply_roll, TurnPass};
use crate::domain::moves::{destination, legal_moves, move_token};
use crate::domain::state::{GameState, GameStatus, WinCondition};
use crate::domain::test_state_helpers::{make_game, tokens_of, MakeGameArgs, RED, YELLOW};
use crate::domain::{test_gens, test_prelude};

fn assert_positions_valid(state: &GameState) -> Result<(), TestCaseError> {
    for (pid, _, idx, code) in state.tokens() {
        prop_assert!(
            is_valid_code(code),
            "player {} token {} has invalid position {}",
            pid,
            idx,
            code
        );
    }
    Ok(())
}

proptest! {
    #![proptest_config(test_prelude::proptest_config())]

    /// Property: every reachable state keeps all tokens in
    /// {-1} ∪ [0,51] ∪ [101,107], and play stops once someone wins.
    #[test]
    fn prop_playout_positions_stay_valid(
        start in test_gens::fresh_game(),
        script in test_gens::script(),
    ) {
        let mut game = start;
        for (value, preference) in script {
            if game.status != GameStatus::Active {
                break;
            }
            let player = game.current_player_id().unwrap();
            let (rolled, outcome) = apply_roll(&game, player, value).unwrap();
            assert_positions_valid(&rolled)?;
            game = rolled;
            if outcome.turn_passed.is_some() {
                continue;
            }
            let choices = legal_moves(&game, player, value);
            prop_assert!(!choices.is_empty());
            let (moved, mv) = move_token(&game, player, choices[preference % choices.len()]).unwrap();
            prop_assert!(mv.to <= HOME);
            assert_positions_valid(&moved)?;
            game = moved;
        }

        if game.status == GameStatus::Finished {
            let winner = game.winner_id.unwrap();
            prop_assert!(game.players[&winner].tokens_home() >= game.win_condition.tokens());
            prop_assert!(apply_roll(&game, winner, 3).unwrap_err().is_invalid_state());
        }
    }

    /// Property: legal destinations never leave the board or pass HOME.
    #[test]
    fn prop_destination_never_overshoots(
        code in test_gens::position_code(),
        roll in test_gens::die(),
        color in prop_oneof![Just(Color::Red), Just(Color::Yellow)],
    ) {
        let game = make_game(MakeGameArgs { red_tokens: [code, HOME, HOME, HOME], win_condition: WinCondition::Four, ..Default::default() });
        if legal_moves(&game, RED, roll).contains(&0) {
            let to = destination(color, code, roll);
            prop_assert!(is_valid_code(to));
            prop_assert!(to != YARD);
        }
    }

    /// Property: a mover landing on a safe square never removes an opposing token.
    #[test]
    fn prop_safe_square_never_captures(
        safe in prop::sample::select(SAFE_ZONES[1..].to_vec()),
        roll in test_gens::die(),
        yellow in test_gens::tokens(),
    ) {
        // every non-start safe square is at least 8, so RED reaches it without wrapping
        let from = safe - i16::from(roll);
        let game = make_game(MakeGameArgs {
            red_tokens: [from, YARD, YARD, YARD],
            yellow_tokens: yellow,
            dice_roll: Some(roll),
            win_condition: WinCondition::Four,
            ..Default::default()
        });
        let (next, outcome) = move_token(&game, RED, 0).unwrap();
        prop_assert_eq!(outcome.to, safe);
        prop_assert!(outcome.captures.is_empty());
        prop_assert_eq!(tokens_of(&next, YELLOW), yellow);
    }

    /// Property: two or more same-color tokens on a square are never cleared.
    #[test]
    fn prop_block_survives_landing(
        roll in test_gens::die(),
        to in 6i16..=50,
    ) {
        let from = to - i16::from(roll);
        let yellow = [to, to, YARD, YARD];
        let game = make_game(MakeGameArgs {
            red_tokens: [from, YARD, YARD, YARD],
            yellow_tokens: yellow,
            dice_roll: Some(roll),
            ..Default::default()
        });
        let (next, outcome) = move_token(&game, RED, 0).unwrap();
        prop_assert_eq!(outcome.to, to);
        prop_assert_eq!(tokens_of(&next, YELLOW), yellow);
    }

    /// Property: the game finishes exactly when the mover reaches the win count.
    #[test]
    fn prop_win_iff_condition_met(
        red in test_gens::tokens(),
        roll in test_gens::die(),
        win_condition in test_gens::win_condition(),
        pick in 0usize..4,
    ) {
        let game = make_game(MakeGameArgs {
            red_tokens: red,
            dice_roll: Some(roll),
            win_condition,
            ..Default::default()
        });
        let before_home = game.players[&RED].tokens_home();
        prop_assume!(before_home < win_condition.tokens());
        let choices = legal_moves(&game, RED, roll);
        prop_assume!(!choices.is_empty());
        let (next, outcome) = move_token(&game, RED, choices[pick % choices.len()]).unwrap();
        let reached = next.players[&RED].tokens_home() >= win_condition.tokens();
        prop_assert_eq!(next.status == GameStatus::Finished, reached);
        prop_assert_eq!(outcome.winner_id.is_some(), reached);
    }

    /// Property: a third consecutive six always hands the turn over with a clean streak.
    #[test]
    fn prop_third_six_changes_turn(red in test_gens::tokens()) {
        let game = make_game(MakeGameArgs {
            red_tokens: red,
            six_streak: 2,
            win_condition: WinCondition::Four,
            ..Default::default()
        });
        let (next, outcome) = apply_roll(&game, RED, 6).unwrap();
        prop_assert_eq!(outcome.turn_passed, Some(TurnPass::ThreeSixes));
        prop_assert_eq!(next.current_player_id(), Some(YELLOW));
        prop_assert_eq!(next.six_streak, 0);
        prop_assert_eq!(next.dice_roll, None);
        prop_assert_eq!(tokens_of(&next, RED), red);
    }
}

use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

use crate::domain::board::{Color, YARD};
use crate::domain::lifecycle::{create, forfeit, join};
use crate::domain::money::Money;
use crate::domain::state::{GameStatus, WinCondition};
use crate::domain::test_state_helpers::{make_game, MakeGameArgs, RED, YELLOW};
use crate::errors::domain::{DomainError, ValidationKind};

fn twenty() -> Money {
    Money::from_minor(2000)
}

#[test]
fn create_seats_creator_as_red_in_lobby() {
    let game = create(10, "alice", twenty(), WinCondition::One).unwrap();
    assert_eq!(game.status, GameStatus::Lobby);
    assert_eq!(game.player_order, vec![10]);
    assert_eq!(game.players[&10].color, Color::Red);
    assert_eq!(game.players[&10].tokens, [YARD; 4]);
    assert_eq!(game.pot_amount, twenty());
    assert_eq!(game.stake_per_player, twenty());
    assert_eq!(game.dice_roll, None);
}

#[test]
fn create_rejects_non_positive_stake() {
    let err = create(10, "alice", Money::ZERO, WinCondition::One).unwrap_err();
    assert!(matches!(
        err,
        DomainError::Validation(ValidationKind::InvalidStake, _)
    ));
}

#[test]
fn join_activates_and_doubles_pot() {
    let mut rng = ChaCha20Rng::seed_from_u64(1);
    let lobby = create(10, "alice", twenty(), WinCondition::One).unwrap();
    let game = join(&lobby, 20, "bob", &mut rng).unwrap();

    assert_eq!(game.status, GameStatus::Active);
    assert_eq!(game.pot_amount, Money::from_minor(4000));
    assert_eq!(game.players[&20].color, Color::Yellow);
    let mut order = game.player_order.clone();
    order.sort();
    assert_eq!(order, vec![10, 20]);
    assert_eq!(game.turn_index, 0);
    // input untouched
    assert_eq!(lobby.status, GameStatus::Lobby);
}

#[test]
fn join_order_is_randomized() {
    let lobby = create(10, "alice", twenty(), WinCondition::One).unwrap();
    let mut creator_first = 0;
    for seed in 0..64 {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        let game = join(&lobby, 20, "bob", &mut rng).unwrap();
        if game.player_order[0] == 10 {
            creator_first += 1;
        }
    }
    assert!(creator_first > 0 && creator_first < 64);
}

#[test]
fn join_rejects_creator_and_non_lobby() {
    let mut rng = ChaCha20Rng::seed_from_u64(1);
    let lobby = create(10, "alice", twenty(), WinCondition::One).unwrap();
    let err = join(&lobby, 10, "alice", &mut rng).unwrap_err();
    assert!(matches!(
        err,
        DomainError::Validation(ValidationKind::DuplicatePlayer, _)
    ));

    let active = join(&lobby, 20, "bob", &mut rng).unwrap();
    let err = join(&active, 30, "carol", &mut rng).unwrap_err();
    assert!(err.is_invalid_state());
}

#[test]
fn forfeit_awards_the_other_player() {
    let game = make_game(MakeGameArgs::default());
    let (next, winner) = forfeit(&game, RED).unwrap();
    assert_eq!(winner, YELLOW);
    assert_eq!(next.status, GameStatus::Forfeited);
    assert_eq!(next.winner_id, Some(YELLOW));
}

#[test]
fn forfeit_requires_active_game_and_known_player() {
    let lobby = create(10, "alice", twenty(), WinCondition::One).unwrap();
    assert!(forfeit(&lobby, 10).unwrap_err().is_invalid_state());

    let game = make_game(MakeGameArgs::default());
    assert!(matches!(
        forfeit(&game, 99).unwrap_err(),
        DomainError::NotFound(_, _)
    ));

    let (done, _) = forfeit(&game, RED).unwrap();
    assert!(forfeit(&done, YELLOW).unwrap_err().is_invalid_state());
}

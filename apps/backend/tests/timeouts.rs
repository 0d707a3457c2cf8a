//! Inactivity forfeits driven by the timeout supervisor on a paused clock.

mod common;

use std::time::Duration;

use common::{active_game, balance, m, memory_state_with, CREATOR, JOINER};
use ludo_backend::config::game::GameConfig;
use ludo_backend::domain::game_transition::GameTransition;
use ludo_backend::domain::state::{GameStatus, WinCondition};
use ludo_backend::AppState;

const TIMEOUT: Duration = Duration::from_secs(30);

async fn state() -> AppState {
    memory_state_with(GameConfig {
        game_timeout: TIMEOUT,
        ..GameConfig::default()
    })
    .await
}

#[tokio::test(start_paused = true)]
async fn idle_game_forfeits_current_player() {
    let state = state().await;
    let started = active_game(&state, "20", WinCondition::One).await;
    let game_id = started.game_id();
    let idle = started.state.current_player_id().unwrap();
    let opponent = started.state.opponent_of(idle).unwrap();
    state.timeouts.observe(&started);

    tokio::time::sleep(TIMEOUT + Duration::from_secs(1)).await;

    let view = state.flow.view(game_id).await.unwrap();
    assert_eq!(view.status, GameStatus::Forfeited);
    assert_eq!(view.winner_id, Some(opponent));
    // pot 40, 10% commission
    assert_eq!(balance(&state, opponent).await, m("116"));
    assert_eq!(balance(&state, idle).await, m("80"));
    assert_eq!(state.ledger.commission_balance().await.unwrap(), m("4"));
    assert_eq!(state.timeouts.armed_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn second_fire_after_forfeit_is_a_no_op() {
    let state = state().await;
    let started = active_game(&state, "20", WinCondition::One).await;
    let game_id = started.game_id();
    let generation = state.timeouts.schedule(game_id, started.version);

    let first = state.timeouts.fire(game_id, generation).await;
    let forfeited = first.expect("first fire forfeits");
    assert!(forfeited
        .transitions
        .iter()
        .any(|t| matches!(t, GameTransition::GameForfeited { .. })));

    let before = (balance(&state, CREATOR).await, balance(&state, JOINER).await);
    assert!(state.timeouts.fire(game_id, generation).await.is_none());
    assert_eq!(state.flow.expire(game_id, None).await.unwrap(), None);
    let after = (balance(&state, CREATOR).await, balance(&state, JOINER).await);
    assert_eq!(before, after);
    assert_eq!(state.ledger.commission_balance().await.unwrap(), m("4"));
}

#[tokio::test(start_paused = true)]
async fn activity_rearms_the_timer() {
    let state = state().await;
    let started = active_game(&state, "20", WinCondition::One).await;
    let game_id = started.game_id();
    state.timeouts.observe(&started);
    let first_generation = state.timeouts.generation_of(game_id).unwrap();

    tokio::time::sleep(TIMEOUT - Duration::from_secs(5)).await;
    let player = started.state.current_player_id().unwrap();
    let (rolled, _) = state.flow.roll_dice(game_id, player, None).await.unwrap();
    state.timeouts.observe(&rolled);
    assert!(state.timeouts.generation_of(game_id).unwrap() > first_generation);

    // past the first deadline but inside the re-armed window
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(
        state.flow.view(game_id).await.unwrap().status,
        GameStatus::Active
    );

    // a superseded generation firing late does nothing
    assert!(state.timeouts.fire(game_id, first_generation).await.is_none());
    assert_eq!(
        state.flow.view(game_id).await.unwrap().status,
        GameStatus::Active
    );

    tokio::time::sleep(TIMEOUT).await;
    assert_eq!(
        state.flow.view(game_id).await.unwrap().status,
        GameStatus::Forfeited
    );
}

#[tokio::test(start_paused = true)]
async fn older_update_observed_late_keeps_the_newer_timer() {
    let state = state().await;
    let started = active_game(&state, "20", WinCondition::One).await;
    let game_id = started.game_id();
    let player = started.state.current_player_id().unwrap();
    let (rolled, _) = state.flow.roll_dice(game_id, player, None).await.unwrap();
    assert!(rolled.version > started.version);

    // handlers finish out of order
    state.timeouts.observe(&rolled);
    let newest = state.timeouts.generation_of(game_id).unwrap();
    state.timeouts.observe(&started);
    assert_eq!(state.timeouts.generation_of(game_id), Some(newest));
    assert_eq!(state.timeouts.schedule(game_id, rolled.version), newest);

    tokio::time::sleep(TIMEOUT + Duration::from_secs(1)).await;
    let view = state.flow.view(game_id).await.unwrap();
    assert_eq!(view.status, GameStatus::Forfeited);
    assert_eq!(state.timeouts.armed_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn timer_armed_before_an_action_does_not_forfeit() {
    let state = state().await;
    let started = active_game(&state, "20", WinCondition::One).await;
    let game_id = started.game_id();
    let generation = state.timeouts.schedule(game_id, started.version);

    // action commits but the caller never re-arms
    let player = started.state.current_player_id().unwrap();
    state.flow.roll_dice(game_id, player, None).await.unwrap();

    assert!(state.timeouts.fire(game_id, generation).await.is_none());
    assert_eq!(
        state.flow.view(game_id).await.unwrap().status,
        GameStatus::Active
    );
}

#[tokio::test(start_paused = true)]
async fn lobby_games_are_never_timed() {
    let state = state().await;
    common::fund(&state, CREATOR, "100").await;
    let lobby = state
        .flow
        .create_game(CREATOR, "creator", m("20"), WinCondition::One)
        .await
        .unwrap();
    state.timeouts.observe(&lobby);
    assert_eq!(state.timeouts.armed_count(), 0);
    assert_eq!(state.flow.expire(lobby.game_id(), None).await.unwrap(), None);
}

#[tokio::test(start_paused = true)]
async fn resume_arms_every_active_game() {
    let state = state().await;
    let started = active_game(&state, "20", WinCondition::One).await;
    common::fund(&state, 3001, "100").await;
    state
        .flow
        .create_game(3001, "lobby-only", m("20"), WinCondition::One)
        .await
        .unwrap();

    assert_eq!(state.timeouts.resume_active().await.unwrap(), 1);
    assert!(state.timeouts.generation_of(started.game_id()).is_some());

    tokio::time::sleep(TIMEOUT + Duration::from_secs(1)).await;
    assert_eq!(
        state.flow.view(started.game_id()).await.unwrap().status,
        GameStatus::Forfeited
    );
}

#[tokio::test(start_paused = true)]
async fn shutdown_cancels_pending_timers() {
    let state = state().await;
    let started = active_game(&state, "20", WinCondition::One).await;
    state.timeouts.observe(&started);
    state.timeouts.shutdown();

    tokio::time::sleep(TIMEOUT * 2).await;
    assert_eq!(
        state.flow.view(started.game_id()).await.unwrap().status,
        GameStatus::Active
    );
}

#![allow(dead_code)]

// tests/common/mod.rs
use actix_web::body::BoxBody;
use actix_web::dev::ServiceResponse;
use actix_web::test;
use ludo_backend::config::db::DbProfile;
use ludo_backend::config::game::GameConfig;
use ludo_backend::domain::money::Money;
use ludo_backend::domain::state::{GameId, PlayerId, WinCondition};
use ludo_backend::infra::state::build_state;
use ludo_backend::repos::ledger::LedgerEntryKind;
use ludo_backend::services::{GameFlowService, GameUpdate};
use ludo_backend::AppState;
use serde_json::Value;

// Logging is auto-installed for every test binary
#[ctor::ctor]
fn init_logging() {
    backend_test_support::logging::init();
}

pub const SEED: u64 = 0x5eed_1d0;
pub const CREATOR: PlayerId = 1001;
pub const JOINER: PlayerId = 1002;

pub fn m(s: &str) -> Money {
    s.parse().expect("valid money literal")
}

/// In-memory state with deterministic dice.
pub async fn memory_state() -> AppState {
    memory_state_with(GameConfig::default()).await
}

pub async fn memory_state_with(config: GameConfig) -> AppState {
    build_state()
        .with_config(config)
        .with_seed(SEED)
        .build()
        .await
        .expect("build in-memory state")
}

/// SQLite-backed state, migrated, with deterministic dice.
pub async fn sqlite_state() -> AppState {
    build_state()
        .with_db(DbProfile::SqliteMemory)
        .with_seed(SEED)
        .build()
        .await
        .expect("build sqlite state")
}

/// Open an account and deposit `amount` into it.
pub async fn fund(state: &AppState, player_id: PlayerId, amount: &str) {
    state
        .ledger
        .open_account(player_id, &format!("player{player_id}"))
        .await
        .expect("open account");
    state
        .ledger
        .credit(player_id, m(amount), LedgerEntryKind::Deposit, "test-seed")
        .await
        .expect("seed deposit");
}

pub async fn balance(state: &AppState, player_id: PlayerId) -> Money {
    state
        .ledger
        .account(player_id)
        .await
        .expect("account exists")
        .balance
}

/// Fund both players with 100, open a lobby at `stake` and join it.
pub async fn active_game(state: &AppState, stake: &str, win: WinCondition) -> GameUpdate {
    fund(state, CREATOR, "100").await;
    fund(state, JOINER, "100").await;
    let lobby = state
        .flow
        .create_game(CREATOR, "creator", m(stake), win)
        .await
        .expect("create lobby");
    state
        .flow
        .join_game(lobby.game_id(), JOINER, "joiner", None)
        .await
        .expect("join lobby")
}

/// Roll and take the first legal move until the game ends.
pub async fn play_to_end(flow: &GameFlowService, game_id: GameId) -> GameUpdate {
    let mut last = None;
    for _ in 0..20_000 {
        let view = flow.view(game_id).await.expect("view game");
        if view.status.is_terminal() {
            return last.expect("game ended during play");
        }
        let player = view.current_player_id.expect("active game has a current player");
        let (update, roll) = flow
            .roll_dice(game_id, player, None)
            .await
            .expect("current player can roll");
        last = Some(update);
        if roll.turn_passed.is_none() {
            let token = roll.legal_moves[0];
            let (update, _) = flow
                .move_token(game_id, player, token, None)
                .await
                .expect("legal move succeeds");
            last = Some(update);
        }
    }
    panic!("game {game_id} did not finish");
}

/// Read a JSON body from a test-service response.
pub async fn json_body(resp: ServiceResponse<BoxBody>) -> Value {
    let body = test::read_body(resp).await;
    serde_json::from_slice(&body).expect("response body is JSON")
}

//! Game flow orchestration - bridges the pure rules engine with storage and escrow.
//!
//! Every mutation of one game runs under that game's async mutex and commits
//! with compare-and-swap on the stored version. The mutex serializes callers in
//! this process; the CAS catches writers elsewhere, and a lost race is retried
//! from a fresh read up to `version_retry_limit` times.

use std::sync::Arc;

use dashmap::DashMap;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::game::GameConfig;
use crate::domain::dice::{self, RollOutcome};
use crate::domain::game_transition::{derive_game_transitions, GameLifecycleView, GameTransition};
use crate::domain::money::Money;
use crate::domain::moves::{self, MoveOutcome};
use crate::domain::snapshot::{snapshot, GameSnapshot};
use crate::domain::lifecycle;
use crate::domain::state::{GameId, GameState, GameStatus, PlayerId, WinCondition};
use crate::errors::domain::{ConflictKind, DomainError, ValidationKind};
use crate::repos::games::{GameStore, StoredGame};
use crate::repos::ledger::Ledger;
use crate::services::escrow::EscrowCoordinator;

/// Result of a committed mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct GameUpdate {
    pub state: GameState,
    pub version: i32,
    pub transitions: Vec<GameTransition>,
}

impl GameUpdate {
    pub fn game_id(&self) -> GameId {
        self.state.game_id
    }

    pub fn snapshot(&self) -> GameSnapshot {
        snapshot(&self.state, self.version)
    }
}

fn version_mismatch(expected: i32, actual: i32) -> DomainError {
    DomainError::conflict(
        ConflictKind::VersionConflict,
        format!(
            "Resource was modified concurrently (expected version {expected}, actual version {actual}). Please refresh and retry."
        ),
    )
}

/// Reject early when the caller pinned a version that is no longer current.
fn check_expected(stored: &StoredGame, expected: Option<i32>) -> Result<(), DomainError> {
    match expected {
        Some(expected) if expected != stored.version => {
            Err(version_mismatch(expected, stored.version))
        }
        _ => Ok(()),
    }
}

pub struct GameFlowService {
    store: Arc<dyn GameStore>,
    ledger: Arc<dyn Ledger>,
    escrow: EscrowCoordinator,
    config: Arc<GameConfig>,
    locks: DashMap<GameId, Arc<Mutex<()>>>,
    rng: parking_lot::Mutex<ChaCha20Rng>,
}

impl GameFlowService {
    pub fn new(
        store: Arc<dyn GameStore>,
        ledger: Arc<dyn Ledger>,
        config: Arc<GameConfig>,
    ) -> Self {
        let escrow = EscrowCoordinator::new(Arc::clone(&ledger), config.commission_rate);
        Self {
            store,
            ledger,
            escrow,
            config,
            locks: DashMap::new(),
            rng: parking_lot::Mutex::new(ChaCha20Rng::from_os_rng()),
        }
    }

    /// Replace the dice/seat RNG; tests seed it for reproducible games.
    pub fn with_seed(self, seed: u64) -> Self {
        *self.rng.lock() = ChaCha20Rng::seed_from_u64(seed);
        self
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn GameStore> {
        &self.store
    }

    fn lock_for(&self, game_id: GameId) -> Arc<Mutex<()>> {
        Arc::clone(self.locks.entry(game_id).or_default().value())
    }

    /// Drop the mutex of a finished game once nobody else holds it.
    fn release_lock(&self, game_id: GameId) {
        self.locks
            .remove_if(&game_id, |_, lock| Arc::strong_count(lock) == 1);
    }

    /// Open a lobby. The stake must be one of the configured options and the
    /// creator must currently be able to cover it; nothing is debited yet.
    pub async fn create_game(
        &self,
        creator_id: PlayerId,
        username: &str,
        stake: Money,
        win_condition: WinCondition,
    ) -> Result<GameUpdate, DomainError> {
        if !self.config.is_stake_option(stake) {
            return Err(DomainError::validation(
                ValidationKind::InvalidStake,
                format!("stake {stake} is not one of the offered options"),
            ));
        }

        let account = self.ledger.open_account(creator_id, username).await?;
        if account.balance < stake {
            return Err(DomainError::insufficient_funds(format!(
                "balance {} cannot cover stake {stake}",
                account.balance
            )));
        }

        let state = lifecycle::create(creator_id, username, stake, win_condition)?;
        let before = GameLifecycleView::of(&state, 0);
        let stored = self.store.create(state).await?;
        let after = GameLifecycleView::of(&stored.state, stored.version);

        info!(
            game_id = stored.state.game_id,
            creator_id,
            stake = %stake,
            win_condition = %win_condition,
            "Game created"
        );

        Ok(GameUpdate {
            transitions: derive_game_transitions(&before, &after),
            state: stored.state,
            version: stored.version,
        })
    }

    /// Seat the second player and activate the game, escrowing both stakes.
    ///
    /// When either stake cannot be collected the join fails and the game
    /// stays in the lobby. When the activation cannot be committed the stakes
    /// are refunded before retrying or failing.
    pub async fn join_game(
        &self,
        game_id: GameId,
        joiner_id: PlayerId,
        username: &str,
        expected_version: Option<i32>,
    ) -> Result<GameUpdate, DomainError> {
        self.ledger.open_account(joiner_id, username).await?;

        let lock = self.lock_for(game_id);
        let _guard = lock.lock().await;
        let mut last_error = None;

        for attempt in 0..self.config.version_retry_limit {
            let stored = self.store.load(game_id).await?;
            check_expected(&stored, expected_version)?;

            let next = {
                let mut rng = self.rng.lock();
                lifecycle::join(&stored.state, joiner_id, username, &mut *rng)?
            };

            self.escrow.collect_stakes(&next).await?;

            match self.store.save(&next, Some(stored.version)).await {
                Ok(version) => {
                    let transitions = derive_game_transitions(
                        &GameLifecycleView::of(&stored.state, stored.version),
                        &GameLifecycleView::of(&next, version),
                    );
                    info!(
                        game_id,
                        joiner_id,
                        first_player = ?next.current_player_id(),
                        pot = %next.pot_amount,
                        "Player joined; game started"
                    );
                    return Ok(GameUpdate {
                        state: next,
                        version,
                        transitions,
                    });
                }
                Err(e) => {
                    self.escrow.refund_stakes(&next).await?;
                    if !e.is_version_conflict() {
                        return Err(e);
                    }
                    warn!(game_id, attempt, "Join lost a version race; retrying");
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            DomainError::conflict(ConflictKind::VersionConflict, "join retries exhausted")
        }))
    }

    pub async fn roll_dice(
        &self,
        game_id: GameId,
        player_id: PlayerId,
        expected_version: Option<i32>,
    ) -> Result<(GameUpdate, RollOutcome), DomainError> {
        let (update, outcome) = self
            .commit_with_retry(game_id, expected_version, |state, rng| {
                dice::roll_dice(state, player_id, rng)
            })
            .await?;
        debug!(
            game_id,
            player_id,
            value = outcome.value,
            passed = ?outcome.turn_passed,
            "Dice rolled"
        );
        Ok((update, outcome))
    }

    pub async fn move_token(
        &self,
        game_id: GameId,
        player_id: PlayerId,
        token_index: usize,
        expected_version: Option<i32>,
    ) -> Result<(GameUpdate, MoveOutcome), DomainError> {
        let (update, outcome) = self
            .commit_with_retry(game_id, expected_version, |state, _| {
                moves::move_token(state, player_id, token_index)
            })
            .await?;
        debug!(
            game_id,
            player_id,
            token_index,
            from = outcome.from,
            to = outcome.to,
            captures = outcome.captures.len(),
            "Token moved"
        );
        if let Some(winner_id) = outcome.winner_id {
            info!(game_id, winner_id, "Game won");
        }
        Ok((update, outcome))
    }

    /// Forfeit the player whose turn it is because the game sat idle.
    ///
    /// `armed_version` is the version the caller saw when it started waiting;
    /// if any action committed since then the game was not idle and nothing
    /// happens. Returns `None` whenever the forfeit does not apply (version
    /// moved, game no longer active), which makes late or duplicate timers
    /// harmless.
    pub async fn expire(
        &self,
        game_id: GameId,
        armed_version: Option<i32>,
    ) -> Result<Option<GameUpdate>, DomainError> {
        let result = self
            .commit_with_retry(game_id, armed_version, |state, _| {
                state.require_status(GameStatus::Active)?;
                let loser = state.current_player_id().ok_or_else(|| {
                    DomainError::invalid_state(format!("game {game_id} has no current player"))
                })?;
                let (next, winner) = lifecycle::forfeit(state, loser)?;
                Ok((next, (loser, winner)))
            })
            .await;

        match result {
            Ok((update, (loser, winner))) => {
                info!(game_id, loser, winner, "Game forfeited on timeout");
                Ok(Some(update))
            }
            Err(e) if e.is_invalid_state() => {
                debug!(game_id, "Timeout fired for a game that is no longer active");
                Ok(None)
            }
            Err(e) if e.is_version_conflict() && armed_version.is_some() => {
                debug!(game_id, ?armed_version, "Timeout superseded by later activity");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Read-only projection with the legal moves for any pending roll.
    pub async fn view(&self, game_id: GameId) -> Result<GameSnapshot, DomainError> {
        let stored = self.store.load(game_id).await?;
        Ok(snapshot(&stored.state, stored.version))
    }

    /// Run `apply` under the game's mutex; forget the mutex once the game ends.
    async fn commit_with_retry<T, F>(
        &self,
        game_id: GameId,
        expected_version: Option<i32>,
        apply: F,
    ) -> Result<(GameUpdate, T), DomainError>
    where
        F: FnMut(&GameState, &mut ChaCha20Rng) -> Result<(GameState, T), DomainError> + Send,
        T: Send,
    {
        let lock = self.lock_for(game_id);
        let result = {
            let _guard = lock.lock().await;
            self.commit_locked(game_id, expected_version, apply).await
        };
        drop(lock);

        if let Ok((update, _)) = &result {
            if update.state.status.is_terminal() {
                self.release_lock(game_id);
            }
        }
        result
    }

    /// Load, apply, settle if terminal, and commit with CAS; retried on
    /// version conflicts that the caller did not pin. Payout happens only
    /// after the settled state is committed, so only the committing caller
    /// ever disburses.
    async fn commit_locked<T, F>(
        &self,
        game_id: GameId,
        expected_version: Option<i32>,
        mut apply: F,
    ) -> Result<(GameUpdate, T), DomainError>
    where
        F: FnMut(&GameState, &mut ChaCha20Rng) -> Result<(GameState, T), DomainError> + Send,
        T: Send,
    {
        let mut last_error = None;

        for attempt in 0..self.config.version_retry_limit {
            let stored = self.store.load(game_id).await?;
            check_expected(&stored, expected_version)?;

            let (mut next, output) = {
                let mut rng = self.rng.lock();
                apply(&stored.state, &mut *rng)?
            };

            let settlement = if next.status.is_terminal() {
                let (settled, settlement) = self.escrow.settle(&next)?;
                next = settled;
                Some(settlement)
            } else {
                None
            };

            match self.store.save(&next, Some(stored.version)).await {
                Ok(version) => {
                    let transitions = derive_game_transitions(
                        &GameLifecycleView::of(&stored.state, stored.version),
                        &GameLifecycleView::of(&next, version),
                    );
                    for transition in &transitions {
                        debug!(game_id, version, ?transition, "Game transition");
                    }
                    if let Some(settlement) = settlement {
                        self.escrow.disburse(game_id, &settlement).await?;
                    }
                    return Ok((
                        GameUpdate {
                            state: next,
                            version,
                            transitions,
                        },
                        output,
                    ));
                }
                Err(e) if e.is_version_conflict() && expected_version.is_none() => {
                    warn!(game_id, attempt, "Game version moved during commit; retrying");
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or_else(|| {
            DomainError::conflict(ConflictKind::VersionConflict, "commit retries exhausted")
        }))
    }
}

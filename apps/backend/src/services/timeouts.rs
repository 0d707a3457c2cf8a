//! Inactivity timers that forfeit idle games.
//!
//! Each arm of a game's timer gets a fresh generation and records the game
//! version it was armed at. Re-arming cancels the previous task, and a timer
//! that fires anyway is ignored unless its generation is still the newest one
//! for that game. The forfeit itself is pinned to the armed version, so any
//! action committed after arming turns the timer into a no-op.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::domain::state::{GameId, GameStatus};
use crate::errors::domain::DomainError;
use crate::services::game_flow::{GameFlowService, GameUpdate};

#[derive(Debug, Clone)]
struct ArmedTimer {
    generation: u64,
    version: i32,
    cancel: CancellationToken,
}

pub struct TimeoutSupervisor {
    flow: Arc<GameFlowService>,
    timeout: Duration,
    timers: DashMap<GameId, ArmedTimer>,
    next_generation: AtomicU64,
    shutdown: CancellationToken,
}

impl TimeoutSupervisor {
    pub fn new(flow: Arc<GameFlowService>, timeout: Duration) -> Arc<Self> {
        Arc::new(Self {
            flow,
            timeout,
            timers: DashMap::new(),
            next_generation: AtomicU64::new(0),
            shutdown: CancellationToken::new(),
        })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Arm (or re-arm) the timer for `game_id` at `version`. Returns the
    /// generation that now owns the game. A timer already armed at the same or
    /// a newer version is kept, so updates observed out of order never pin the
    /// game to an older version.
    pub fn schedule(self: &Arc<Self>, game_id: GameId, version: i32) -> u64 {
        let cancel = self.shutdown.child_token();
        let generation = match self.timers.entry(game_id) {
            Entry::Occupied(current) if current.get().version >= version => {
                debug!(
                    game_id,
                    version,
                    armed_version = current.get().version,
                    "Older update ignored by timeout"
                );
                return current.get().generation;
            }
            Entry::Occupied(mut current) => {
                let generation = self.next_generation.fetch_add(1, Ordering::Relaxed) + 1;
                let previous = current.insert(ArmedTimer {
                    generation,
                    version,
                    cancel: cancel.clone(),
                });
                previous.cancel.cancel();
                generation
            }
            Entry::Vacant(slot) => {
                let generation = self.next_generation.fetch_add(1, Ordering::Relaxed) + 1;
                slot.insert(ArmedTimer {
                    generation,
                    version,
                    cancel: cancel.clone(),
                });
                generation
            }
        };

        let this = Arc::clone(self);
        tokio::spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!(game_id, generation, "Timeout disarmed");
                }
                _ = tokio::time::sleep(this.timeout) => {
                    this.fire(game_id, generation).await;
                }
            }
        });

        debug!(game_id, generation, version, "Timeout armed");
        generation
    }

    /// Drop the timer for a game that no longer needs one.
    pub fn cancel(&self, game_id: GameId) {
        if let Some((_, armed)) = self.timers.remove(&game_id) {
            armed.cancel.cancel();
        }
    }

    /// Keep the timer in step with a committed update: active games get a
    /// fresh window, ended games lose their timer.
    pub fn observe(self: &Arc<Self>, update: &GameUpdate) {
        match update.state.status {
            GameStatus::Active => {
                self.schedule(update.game_id(), update.version);
            }
            GameStatus::Finished | GameStatus::Forfeited => self.cancel(update.game_id()),
            GameStatus::Lobby => {}
        }
    }

    /// Arm a timer for every active game, e.g. after a restart.
    pub async fn resume_active(self: &Arc<Self>) -> Result<usize, DomainError> {
        let ids = self.flow.store().active_game_ids().await?;
        let mut armed = 0;
        for game_id in ids {
            match self.flow.store().load(game_id).await {
                Ok(stored) if stored.state.status == GameStatus::Active => {
                    self.schedule(game_id, stored.version);
                    armed += 1;
                }
                Ok(_) => {}
                Err(e) => warn!(game_id, error = %e, "Could not resume timeout"),
            }
        }
        info!(armed, timeout_secs = self.timeout.as_secs(), "Timeouts resumed");
        Ok(armed)
    }

    /// Newest generation armed for `game_id`, if any.
    pub fn generation_of(&self, game_id: GameId) -> Option<u64> {
        self.timers.get(&game_id).map(|t| t.generation)
    }

    pub fn armed_count(&self) -> usize {
        self.timers.len()
    }

    /// Handle an expiry. Stale generations are ignored; the current one runs
    /// the forfeit pinned to the version it was armed at.
    pub async fn fire(&self, game_id: GameId, generation: u64) -> Option<GameUpdate> {
        let version = match self.timers.get(&game_id) {
            Some(armed) if armed.generation == generation => armed.version,
            _ => {
                debug!(game_id, generation, "Stale timeout ignored");
                return None;
            }
        };

        let outcome = match self.flow.expire(game_id, Some(version)).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(game_id, generation, error = %e, "Timeout forfeit failed");
                None
            }
        };

        self.timers
            .remove_if(&game_id, |_, armed| armed.generation == generation);
        outcome
    }

    /// Cancel every pending timer.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
        self.timers.clear();
    }
}

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::domain::state::{GameId, GameState, GameStatus};
use crate::errors::domain::{ConflictKind, DomainError, NotFoundKind};
use crate::repos::games::{GameStore, StoredGame};

#[derive(Debug, Default)]
pub struct MemoryGameStore {
    next_id: AtomicI64,
    games: Mutex<HashMap<GameId, StoredGame>>,
}

impl MemoryGameStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn game_not_found(game_id: GameId) -> DomainError {
    DomainError::not_found(NotFoundKind::Game, format!("Game {game_id} not found"))
}

#[async_trait]
impl GameStore for MemoryGameStore {
    async fn create(&self, mut state: GameState) -> Result<StoredGame, DomainError> {
        state.game_id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let stored = StoredGame { state, version: 1 };
        self.games
            .lock()
            .insert(stored.state.game_id, stored.clone());
        Ok(stored)
    }

    async fn load(&self, game_id: GameId) -> Result<StoredGame, DomainError> {
        self.games
            .lock()
            .get(&game_id)
            .cloned()
            .ok_or_else(|| game_not_found(game_id))
    }

    async fn save(
        &self,
        state: &GameState,
        expected_version: Option<i32>,
    ) -> Result<i32, DomainError> {
        let mut games = self.games.lock();
        let current = games
            .get_mut(&state.game_id)
            .ok_or_else(|| game_not_found(state.game_id))?;

        if let Some(expected) = expected_version {
            if current.version != expected {
                return Err(DomainError::conflict(
                    ConflictKind::VersionConflict,
                    format!(
                        "Resource was modified concurrently (expected version {expected}, actual version {}). Please refresh and retry.",
                        current.version
                    ),
                ));
            }
        }

        current.state = state.clone();
        current.version += 1;
        Ok(current.version)
    }

    async fn active_game_ids(&self) -> Result<Vec<GameId>, DomainError> {
        let mut ids: Vec<GameId> = self
            .games
            .lock()
            .values()
            .filter(|g| g.state.status == GameStatus::Active)
            .map(|g| g.state.game_id)
            .collect();
        ids.sort_unstable();
        Ok(ids)
    }
}

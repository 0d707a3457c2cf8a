//! Durable keyed storage for game state.

use async_trait::async_trait;

use crate::domain::state::{GameId, GameState};
use crate::errors::domain::DomainError;

/// A game as last committed, with the version stamp used for compare-and-swap.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredGame {
    pub state: GameState,
    pub version: i32,
}

#[async_trait]
pub trait GameStore: Send + Sync {
    /// Persist a new game, assigning its id. The returned state carries the id
    /// and starts at version 1.
    async fn create(&self, state: GameState) -> Result<StoredGame, DomainError>;

    /// `NotFound(Game)` when the id is unknown.
    async fn load(&self, game_id: GameId) -> Result<StoredGame, DomainError>;

    /// Write `state` under its `game_id`. With `expected_version` the write only
    /// succeeds if the stored version still matches, otherwise it fails with
    /// `Conflict(VersionConflict)`. Returns the new version.
    async fn save(
        &self,
        state: &GameState,
        expected_version: Option<i32>,
    ) -> Result<i32, DomainError>;

    /// Ids of games currently in `active` status.
    async fn active_game_ids(&self) -> Result<Vec<GameId>, DomainError>;
}

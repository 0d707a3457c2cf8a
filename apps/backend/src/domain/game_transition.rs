use serde::Serialize;

use crate::domain::state::{GameState, GameStatus, PlayerId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameLifecycleView {
    pub version: i32,
    pub turn: Option<PlayerId>,
    pub status: GameStatus,
    pub winner: Option<PlayerId>,
    pub players: Vec<PlayerId>,
}

impl GameLifecycleView {
    pub fn of(state: &GameState, version: i32) -> Self {
        let turn = match state.status {
            GameStatus::Active => state.current_player_id(),
            _ => None,
        };
        Self {
            version,
            turn,
            status: state.status,
            winner: state.winner_id,
            players: state.player_order.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameTransition {
    /// Edge-triggered: a new player took a seat.
    PlayerJoined { player_id: PlayerId },

    /// Edge-triggered: Lobby -> Active, stakes are escrowed.
    GameStarted,

    /// Edge-triggered: the turn became a specific player.
    TurnBecame { player_id: PlayerId },

    /// Edge-triggered: Active -> Finished.
    GameFinished { winner_id: PlayerId },

    /// Edge-triggered: Active -> Forfeited.
    GameForfeited { winner_id: PlayerId },
}

impl GameTransition {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            GameTransition::GameFinished { .. } | GameTransition::GameForfeited { .. }
        )
    }
}

/// Derive domain transitions from before/after lifecycle state.
pub fn derive_game_transitions(
    before: &GameLifecycleView,
    after: &GameLifecycleView,
) -> Vec<GameTransition> {
    let mut transitions = Vec::new();

    for &player_id in &after.players {
        if !before.players.contains(&player_id) {
            transitions.push(GameTransition::PlayerJoined { player_id });
        }
    }

    if before.status == GameStatus::Lobby && after.status == GameStatus::Active {
        transitions.push(GameTransition::GameStarted);
    }

    if let Some(player_id) = after.turn {
        if before.turn != Some(player_id) {
            transitions.push(GameTransition::TurnBecame { player_id });
        }
    }

    if before.status != after.status {
        match (after.status, after.winner) {
            (GameStatus::Finished, Some(winner_id)) => {
                transitions.push(GameTransition::GameFinished { winner_id })
            }
            (GameStatus::Forfeited, Some(winner_id)) => {
                transitions.push(GameTransition::GameForfeited { winner_id })
            }
            _ => {}
        }
    }

    transitions
}

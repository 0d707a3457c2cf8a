//! Domain layer: pure Ludo rules, money arithmetic and conversation steps.

pub mod board;
pub mod conversation;
pub mod dice;
pub mod game_transition;
pub mod lifecycle;
pub mod money;
pub mod moves;
pub mod snapshot;
pub mod state;

#[cfg(test)]
mod test_gens;
#[cfg(test)]
mod test_prelude;
#[cfg(test)]
mod test_state_helpers;
#[cfg(test)]
mod tests_conversation;
#[cfg(test)]
mod tests_dice;
#[cfg(test)]
mod tests_lifecycle;
#[cfg(test)]
mod tests_moves;
#[cfg(test)]
mod tests_props_positions;

// Re-exports for ergonomics
pub use board::Color;
pub use dice::{roll_dice, RollOutcome, TurnPass};
pub use game_transition::{derive_game_transitions, GameLifecycleView, GameTransition};
pub use money::{CommissionRate, Money};
pub use moves::{legal_moves, move_token, MoveOutcome};
pub use snapshot::{snapshot, GameSnapshot};
pub use state::{GameId, GameState, GameStatus, PlayerId, Settlement, WinCondition};

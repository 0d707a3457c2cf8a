//! Moves money in lockstep with game lifecycle edges.
//!
//! Stakes are taken when a lobby activates and the pot is paid out when a game
//! ends. Callers hold the per-game serialization discipline; this module only
//! guarantees the money side: stake collection is all-or-nothing and a game is
//! settled at most once.

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::domain::money::{CommissionRate, Money};
use crate::domain::state::{GameId, GameState, PlayerId, Settlement};
use crate::errors::domain::{ConflictKind, DomainError, InfraErrorKind};
use crate::repos::ledger::{Ledger, LedgerEntryKind};

pub fn stake_reference(game_id: GameId) -> String {
    format!("game:{game_id}:stake")
}

pub fn payout_reference(game_id: GameId) -> String {
    format!("game:{game_id}:payout")
}

#[derive(Clone)]
pub struct EscrowCoordinator {
    ledger: Arc<dyn Ledger>,
    commission_rate: CommissionRate,
}

impl EscrowCoordinator {
    pub fn new(ledger: Arc<dyn Ledger>, commission_rate: CommissionRate) -> Self {
        Self {
            ledger,
            commission_rate,
        }
    }

    pub fn commission_rate(&self) -> CommissionRate {
        self.commission_rate
    }

    /// Debit `stake_per_player` from every seated player, or from nobody.
    ///
    /// Debits run in seat order; when one fails, the ones already applied are
    /// credited back before the original error is returned, so balances end
    /// exactly where they started.
    pub async fn collect_stakes(&self, state: &GameState) -> Result<(), DomainError> {
        let stake = state.stake_per_player;
        let reference = stake_reference(state.game_id);
        let mut debited: Vec<PlayerId> = Vec::with_capacity(state.player_order.len());

        for &player_id in &state.player_order {
            match self
                .ledger
                .debit(player_id, stake, LedgerEntryKind::Stake, &reference)
                .await
            {
                Ok(_) => debited.push(player_id),
                Err(e) => {
                    warn!(
                        game_id = state.game_id,
                        player_id,
                        error = %e,
                        compensating = debited.len(),
                        "Stake collection failed"
                    );
                    self.credit_back(state.game_id, &debited, stake).await?;
                    return Err(e);
                }
            }
        }

        info!(
            game_id = state.game_id,
            stake = %stake,
            pot = %state.pot_amount,
            "Stakes collected"
        );
        Ok(())
    }

    /// Return collected stakes after an activation that could not be committed.
    pub async fn refund_stakes(&self, state: &GameState) -> Result<(), DomainError> {
        self.credit_back(state.game_id, &state.player_order, state.stake_per_player)
            .await?;
        info!(game_id = state.game_id, "Stakes refunded");
        Ok(())
    }

    async fn credit_back(
        &self,
        game_id: GameId,
        players: &[PlayerId],
        stake: Money,
    ) -> Result<(), DomainError> {
        let reference = format!("game:{game_id}:refund");
        for &player_id in players {
            if let Err(e) = self
                .ledger
                .credit(player_id, stake, LedgerEntryKind::StakeRefund, &reference)
                .await
            {
                error!(
                    game_id,
                    player_id,
                    stake = %stake,
                    error = %e,
                    "Stake refund failed; manual reconciliation required"
                );
                return Err(DomainError::infra(
                    InfraErrorKind::Reconciliation,
                    format!("stake refund for player {player_id} in game {game_id} failed"),
                ));
            }
        }
        Ok(())
    }

    /// Mark a terminal game as settled.
    ///
    /// Pure bookkeeping on the state value. The caller commits the returned
    /// state and only then calls [`disburse`](Self::disburse); a game that
    /// already carries a settlement is rejected so a second payout can never
    /// be computed.
    pub fn settle(&self, state: &GameState) -> Result<(GameState, Settlement), DomainError> {
        if state.settlement.is_some() {
            return Err(DomainError::conflict(
                ConflictKind::AlreadySettled,
                format!("game {} was already paid out", state.game_id),
            ));
        }
        if !state.status.is_terminal() {
            return Err(DomainError::invalid_state(format!(
                "game {} is {} and cannot be settled",
                state.game_id,
                state.status.as_str()
            )));
        }
        let winner_id = state.winner_id.ok_or_else(|| {
            DomainError::invalid_state(format!("game {} ended without a winner", state.game_id))
        })?;

        let (prize, commission) = self.commission_rate.split(state.pot_amount);
        let settlement = Settlement {
            winner_id,
            prize,
            commission,
        };
        let mut next = state.clone();
        next.settlement = Some(settlement);
        Ok((next, settlement))
    }

    /// Credit the winner and book the commission for a committed settlement.
    pub async fn disburse(
        &self,
        game_id: GameId,
        settlement: &Settlement,
    ) -> Result<(), DomainError> {
        let reference = payout_reference(game_id);

        if settlement.prize.is_positive() {
            if let Err(e) = self
                .ledger
                .credit(
                    settlement.winner_id,
                    settlement.prize,
                    LedgerEntryKind::Prize,
                    &reference,
                )
                .await
            {
                error!(
                    game_id,
                    winner_id = settlement.winner_id,
                    prize = %settlement.prize,
                    error = %e,
                    "Prize credit failed; manual reconciliation required"
                );
                return Err(DomainError::infra(
                    InfraErrorKind::Reconciliation,
                    format!("prize for game {game_id} was not credited"),
                ));
            }
        }

        if settlement.commission.is_positive() {
            if let Err(e) = self
                .ledger
                .record_commission(settlement.commission, &reference)
                .await
            {
                error!(
                    game_id,
                    commission = %settlement.commission,
                    error = %e,
                    "Commission booking failed; manual reconciliation required"
                );
                return Err(DomainError::infra(
                    InfraErrorKind::Reconciliation,
                    format!("commission for game {game_id} was not booked"),
                ));
            }
        }

        info!(
            game_id,
            winner_id = settlement.winner_id,
            prize = %settlement.prize,
            commission = %settlement.commission,
            "Payout disbursed"
        );
        Ok(())
    }

    /// Settle and disburse in one step, for callers that commit the settled
    /// state themselves under their own serialization.
    pub async fn payout(&self, state: &GameState) -> Result<GameState, DomainError> {
        let (settled, settlement) = self.settle(state)?;
        self.disburse(settled.game_id, &settlement).await?;
        Ok(settled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemoryLedger;
    use crate::domain::board::Color;
    use crate::domain::lifecycle;
    use crate::domain::state::{GameStatus, PlayerState, WinCondition};

    fn m(minor: i64) -> Money {
        Money::from_minor(minor)
    }

    async fn funded_ledger(balances: &[(PlayerId, i64)]) -> Arc<MemoryLedger> {
        let ledger = Arc::new(MemoryLedger::new());
        for &(pid, minor) in balances {
            ledger.open_account(pid, &format!("p{pid}")).await.unwrap();
            if minor > 0 {
                ledger
                    .credit(pid, m(minor), LedgerEntryKind::Deposit, "seed")
                    .await
                    .unwrap();
            }
        }
        ledger
    }

    fn active_game(stake: i64) -> GameState {
        let mut game = lifecycle::create(1, "p1", m(stake), WinCondition::One).unwrap();
        game.game_id = 5;
        game.players.insert(2, PlayerState::new("p2", Color::Yellow));
        game.player_order = vec![1, 2];
        game.pot_amount = m(stake * 2);
        game.status = GameStatus::Active;
        game
    }

    #[tokio::test]
    async fn collect_is_all_or_nothing() {
        let ledger = funded_ledger(&[(1, 5000), (2, 1000)]).await;
        let escrow = EscrowCoordinator::new(ledger.clone(), CommissionRate::default());

        let err = escrow.collect_stakes(&active_game(2000)).await.unwrap_err();
        assert!(matches!(err, DomainError::InsufficientFunds(_)));
        assert_eq!(ledger.account(1).await.unwrap().balance, m(5000));
        assert_eq!(ledger.account(2).await.unwrap().balance, m(1000));
    }

    #[tokio::test]
    async fn collect_debits_both() {
        let ledger = funded_ledger(&[(1, 5000), (2, 2000)]).await;
        let escrow = EscrowCoordinator::new(ledger.clone(), CommissionRate::default());

        escrow.collect_stakes(&active_game(2000)).await.unwrap();
        assert_eq!(ledger.account(1).await.unwrap().balance, m(3000));
        assert_eq!(ledger.account(2).await.unwrap().balance, Money::ZERO);
    }

    #[tokio::test]
    async fn settle_then_disburse_pays_net_of_commission() {
        let ledger = funded_ledger(&[(1, 0), (2, 0)]).await;
        let rate = CommissionRate::from_bps(1000).unwrap();
        let escrow = EscrowCoordinator::new(ledger.clone(), rate);

        let mut game = active_game(2000);
        game.status = GameStatus::Forfeited;
        game.winner_id = Some(2);

        let (settled, settlement) = escrow.settle(&game).unwrap();
        assert_eq!(settlement.prize, m(3600));
        assert_eq!(settlement.commission, m(400));
        escrow.disburse(settled.game_id, &settlement).await.unwrap();

        assert_eq!(ledger.account(2).await.unwrap().balance, m(3600));
        assert_eq!(ledger.commission_balance().await.unwrap(), m(400));

        let again = escrow.settle(&settled).unwrap_err();
        assert!(matches!(
            again,
            DomainError::Conflict(ConflictKind::AlreadySettled, _)
        ));
    }

    #[tokio::test]
    async fn non_terminal_games_cannot_settle() {
        let ledger = funded_ledger(&[]).await;
        let escrow = EscrowCoordinator::new(ledger, CommissionRate::default());
        assert!(escrow
            .settle(&active_game(2000))
            .unwrap_err()
            .is_invalid_state());
    }
}

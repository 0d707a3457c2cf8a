//! Chat-driven flows on top of the game and payment services.
//!
//! Each user has exactly one conversation step, kept in a keyed arena. An
//! input is first folded into the step under that user's entry lock (so two
//! messages from one user cannot both read the old step), then the resulting
//! effect runs with the lock released.

use std::sync::Arc;

use dashmap::DashMap;
use serde::Serialize;
use tracing::debug;

use crate::domain::conversation::{
    advance, ConversationEffect, ConversationInput, ConversationRules, ConversationState, Prompt,
};
use crate::domain::money::Money;
use crate::domain::snapshot::GameSnapshot;
use crate::domain::state::PlayerId;
use crate::errors::domain::DomainError;
use crate::repos::payments::WithdrawalRequest;
use crate::services::game_flow::{GameFlowService, GameUpdate};
use crate::services::payments::PaymentService;

/// What the transport should show the user after an input.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConversationReply {
    Prompt { prompt: Prompt },
    GameCreated { game: GameSnapshot },
    DepositInitiated { tx_ref: String, amount: Money },
    WithdrawalRequested { request: WithdrawalRequest },
    Rejected { reason: String },
    Cancelled,
    Ignored,
}

/// Reply plus the step the user is now in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversationTurn {
    pub state: ConversationState,
    pub reply: ConversationReply,
    /// Set when the effect created a game, so callers can arm its timer.
    #[serde(skip)]
    pub game_update: Option<GameUpdate>,
}

pub struct ConversationService {
    flow: Arc<GameFlowService>,
    payments: Arc<PaymentService>,
    states: DashMap<PlayerId, ConversationState>,
}

impl ConversationService {
    pub fn new(flow: Arc<GameFlowService>, payments: Arc<PaymentService>) -> Self {
        Self {
            flow,
            payments,
            states: DashMap::new(),
        }
    }

    pub fn state_of(&self, user_id: PlayerId) -> ConversationState {
        self.states
            .get(&user_id)
            .map(|s| s.value().clone())
            .unwrap_or_default()
    }

    /// Advance the user's conversation and execute the effect.
    ///
    /// The new step is stored before the effect runs; when the effect fails
    /// (e.g. the balance cannot cover the stake) the user stays in that step
    /// and the error is returned.
    pub async fn handle(
        &self,
        user_id: PlayerId,
        username: &str,
        input: ConversationInput,
    ) -> Result<ConversationTurn, DomainError> {
        let config = self.flow.config();
        let rules = ConversationRules {
            stake_options: &config.stake_options,
            min_deposit: config.min_deposit,
        };

        let (state, effect) = {
            let mut entry = self.states.entry(user_id).or_default();
            let (next, effect) = advance(entry.value(), input, &rules);
            *entry = next.clone();
            (next, effect)
        };
        if state == ConversationState::Idle {
            self.states.remove_if(&user_id, |_, s| *s == ConversationState::Idle);
        }
        debug!(user_id, step = ?state, "Conversation advanced");

        let mut game_update = None;
        let reply = match effect {
            ConversationEffect::Prompt(prompt) => ConversationReply::Prompt { prompt },
            ConversationEffect::CreateGame {
                stake,
                win_condition,
            } => {
                let update = self
                    .flow
                    .create_game(user_id, username, stake, win_condition)
                    .await?;
                let game = update.snapshot();
                game_update = Some(update);
                ConversationReply::GameCreated { game }
            }
            ConversationEffect::InitiateDeposit { amount } => {
                let deposit = self
                    .payments
                    .initiate_deposit(user_id, username, amount)
                    .await?;
                ConversationReply::DepositInitiated {
                    tx_ref: deposit.tx_ref,
                    amount: deposit.amount,
                }
            }
            ConversationEffect::RequestWithdrawal {
                amount,
                account_details,
            } => {
                let request = self
                    .payments
                    .request_withdrawal(user_id, amount, &account_details)
                    .await?;
                ConversationReply::WithdrawalRequested { request }
            }
            ConversationEffect::Reject { reason } => ConversationReply::Rejected { reason },
            ConversationEffect::Cancelled => ConversationReply::Cancelled,
            ConversationEffect::Ignored => ConversationReply::Ignored,
        };

        Ok(ConversationTurn {
            state,
            reply,
            game_update,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{MemoryGameStore, MemoryLedger, MemoryPaymentRecords};
    use crate::config::game::GameConfig;
    use crate::domain::state::GameStatus;
    use crate::errors::domain::NotFoundKind;
    use crate::repos::ledger::{Ledger, LedgerEntryKind};

    fn m(s: &str) -> Money {
        s.parse().unwrap()
    }

    fn text(s: &str) -> ConversationInput {
        ConversationInput::Text { text: s.into() }
    }

    fn service() -> (ConversationService, Arc<MemoryLedger>) {
        let ledger = Arc::new(MemoryLedger::new());
        let config = Arc::new(GameConfig::default());
        let flow = Arc::new(
            GameFlowService::new(Arc::new(MemoryGameStore::new()), ledger.clone(), config.clone())
                .with_seed(7),
        );
        let payments = Arc::new(PaymentService::new(
            ledger.clone(),
            Arc::new(MemoryPaymentRecords::new()),
            config.min_deposit,
        ));
        (ConversationService::new(flow, payments), ledger)
    }

    #[tokio::test]
    async fn new_game_conversation_creates_lobby() {
        let (svc, ledger) = service();
        ledger.open_account(1, "abebe").await.unwrap();
        ledger
            .credit(1, m("100"), LedgerEntryKind::Deposit, "seed")
            .await
            .unwrap();

        svc.handle(1, "abebe", ConversationInput::NewGame).await.unwrap();
        assert_eq!(svc.state_of(1), ConversationState::ChoosingStake);
        svc.handle(1, "abebe", ConversationInput::ChooseStake { amount: m("50") })
            .await
            .unwrap();
        let turn = svc
            .handle(1, "abebe", ConversationInput::ChooseWinCondition { tokens: 1 })
            .await
            .unwrap();

        match turn.reply {
            ConversationReply::GameCreated { game } => {
                assert_eq!(game.status, GameStatus::Lobby);
                assert_eq!(game.stake_per_player, m("50"));
            }
            other => panic!("unexpected reply {other:?}"),
        }
        assert!(turn.game_update.is_some());
        assert_eq!(svc.state_of(1), ConversationState::Idle);
        // creating a lobby does not debit
        assert_eq!(ledger.account(1).await.unwrap().balance, m("100"));
    }

    #[tokio::test]
    async fn steps_are_per_user() {
        let (svc, _) = service();
        svc.handle(1, "abebe", ConversationInput::Deposit).await.unwrap();
        svc.handle(2, "sara", ConversationInput::Withdraw).await.unwrap();
        assert_eq!(svc.state_of(1), ConversationState::AwaitingDepositAmount);
        assert_eq!(svc.state_of(2), ConversationState::AwaitingWithdrawalAmount);

        let turn = svc.handle(1, "abebe", text("25")).await.unwrap();
        assert!(matches!(
            turn.reply,
            ConversationReply::DepositInitiated { amount, .. } if amount == m("25")
        ));
        assert_eq!(svc.state_of(2), ConversationState::AwaitingWithdrawalAmount);
    }

    #[tokio::test]
    async fn failed_effect_leaves_user_idle() {
        let (svc, _) = service();
        svc.handle(3, "kebede", ConversationInput::Withdraw).await.unwrap();
        svc.handle(3, "kebede", text("40")).await.unwrap();
        let err = svc
            .handle(3, "kebede", text("CBE 1000123456789"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound(NotFoundKind::Account, _)));
        assert_eq!(svc.state_of(3), ConversationState::Idle);
    }
}

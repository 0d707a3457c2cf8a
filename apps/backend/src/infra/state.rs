use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::adapters::memory::{MemoryGameStore, MemoryLedger, MemoryPaymentRecords};
use crate::adapters::{SeaGameStore, SeaLedger, SeaPaymentRecords};
use crate::config::db::DbProfile;
use crate::config::game::GameConfig;
use crate::error::AppError;
use crate::infra::db::bootstrap_db;
use crate::repos::games::GameStore;
use crate::repos::ledger::Ledger;
use crate::repos::payments::PaymentRecords;
use crate::services::{ConversationService, GameFlowService, PaymentService, TimeoutSupervisor};
use crate::state::app_state::AppState;

/// Builder for creating AppState instances (used in both tests and main)
pub struct StateBuilder {
    config: GameConfig,
    db_profile: Option<DbProfile>,
    seed: Option<u64>,
    webhook_secret: Option<String>,
}

impl StateBuilder {
    pub fn new() -> Self {
        Self {
            config: GameConfig::default(),
            db_profile: None,
            seed: None,
            webhook_secret: None,
        }
    }

    pub fn with_db(mut self, profile: DbProfile) -> Self {
        self.db_profile = Some(profile);
        self
    }

    pub fn with_config(mut self, config: GameConfig) -> Self {
        self.config = config;
        self
    }

    /// Deterministic dice and seating.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_webhook_secret(mut self, secret: impl Into<String>) -> Self {
        self.webhook_secret = Some(secret.into());
        self
    }

    pub async fn build(self) -> Result<AppState, AppError> {
        let (db, store, ledger, records): (
            Option<DatabaseConnection>,
            Arc<dyn GameStore>,
            Arc<dyn Ledger>,
            Arc<dyn PaymentRecords>,
        ) = match self.db_profile {
            None | Some(DbProfile::InMemory) => (
                None,
                Arc::new(MemoryGameStore::new()),
                Arc::new(MemoryLedger::new()),
                Arc::new(MemoryPaymentRecords::new()),
            ),
            Some(profile) => {
                // single entrypoint: build + migrate
                let conn = bootstrap_db(profile).await?;
                (
                    Some(conn.clone()),
                    Arc::new(SeaGameStore::new(conn.clone())),
                    Arc::new(SeaLedger::new(conn.clone())),
                    Arc::new(SeaPaymentRecords::new(conn)),
                )
            }
        };

        let config = Arc::new(self.config);
        let mut flow = GameFlowService::new(store, Arc::clone(&ledger), Arc::clone(&config));
        if let Some(seed) = self.seed {
            flow = flow.with_seed(seed);
        }
        let flow = Arc::new(flow);
        let payments = Arc::new(PaymentService::new(
            Arc::clone(&ledger),
            records,
            config.min_deposit,
        ));
        let conversations = Arc::new(ConversationService::new(
            Arc::clone(&flow),
            Arc::clone(&payments),
        ));
        let timeouts = TimeoutSupervisor::new(Arc::clone(&flow), config.game_timeout);

        Ok(AppState {
            config,
            db,
            ledger,
            flow,
            payments,
            conversations,
            timeouts,
            webhook_secret: self.webhook_secret,
        })
    }
}

impl Default for StateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub fn build_state() -> StateBuilder {
    StateBuilder::new()
}

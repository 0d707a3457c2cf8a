use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::config::game::GameConfig;
use crate::repos::ledger::Ledger;
use crate::services::{ConversationService, GameFlowService, PaymentService, TimeoutSupervisor};

/// Shared services handed to every request handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<GameConfig>,
    /// Present when stores are database-backed
    pub db: Option<DatabaseConnection>,
    pub ledger: Arc<dyn Ledger>,
    pub flow: Arc<GameFlowService>,
    pub payments: Arc<PaymentService>,
    pub conversations: Arc<ConversationService>,
    pub timeouts: Arc<TimeoutSupervisor>,
    /// Shared secret the payment gateway presents on confirmation callbacks
    pub webhook_secret: Option<String>,
}

impl AppState {
    pub fn db(&self) -> Option<&DatabaseConnection> {
        self.db.as_ref()
    }
}

pub mod conversations;
pub mod escrow;
pub mod game_flow;
pub mod payments;
pub mod timeouts;

pub use conversations::{ConversationReply, ConversationService, ConversationTurn};
pub use escrow::EscrowCoordinator;
pub use game_flow::{GameFlowService, GameUpdate};
pub use payments::{DepositResolution, PaymentService};
pub use timeouts::TimeoutSupervisor;

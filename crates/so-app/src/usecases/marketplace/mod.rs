//! Celebrity video marketplace flow.

mod orchestrator;
mod state;

pub use orchestrator::{MarketplaceFlowError, MarketplaceOrchestrator};
pub use state::MarketFlowState;

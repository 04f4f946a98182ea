//! Auth and profile flow: sign-in, registration and the profile editor.

mod orchestrator;
mod state;

pub use orchestrator::{AuthFlowError, AuthFlowOrchestrator};
pub use state::AuthFlowState;

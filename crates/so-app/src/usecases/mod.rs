pub mod auth_flow;
pub mod context;
pub mod marketplace;
pub mod session;

pub use auth_flow::{AuthFlowError, AuthFlowOrchestrator};
pub use context::FlowContext;
pub use marketplace::{MarketplaceFlowError, MarketplaceOrchestrator};
pub use session::{SessionBridge, SessionSubscription};

/// Composite message when the account exists but its profile row could not be written.
pub(crate) fn profile_setup_failed(message: &str) -> String {
    format!("Account created but profile setup failed: {message}")
}

pub(crate) const SIGNUP_NOTICE: &str =
    "Signup successful! Please check your email to confirm your account.";

//! Port interfaces for the application layer
//!
//! Ports define the contract between the flow orchestrators (use cases)
//! and infrastructure implementations. The authentication + data-store
//! provider is reached only through these traits, so the orchestrators can
//! run against the hosted service, the in-memory backend or test doubles.

pub mod auth_provider;
pub mod errors;
pub mod flow_event;
pub mod record_store;
pub mod session_change_handler;

pub use auth_provider::{AuthChange, AuthEvent, AuthProviderPort, AuthSubscription};
pub use errors::ProviderError;
pub use flow_event::{FlowEventPort, MarketEventPort, NoopFlowEvents};
pub use record_store::{Filter, RecordStorePort};
pub use session_change_handler::SessionChangeHandler;

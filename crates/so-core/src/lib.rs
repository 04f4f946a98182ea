//! # so-core
//!
//! Core domain models and flow logic for Shoutout.
//!
//! This crate contains pure business logic without any infrastructure dependencies:
//! form state and validation, the auth and marketplace view state machines,
//! session/profile models and the ports implemented by provider adapters.

pub mod config;
pub mod form;
pub mod ids;
pub mod marketplace;
pub mod ports;
pub mod security;
pub mod session;
pub mod view;

// Re-export commonly used types at the crate root
pub use config::AppConfig;
pub use form::{ErrorKey, ErrorState, FieldName, FieldValue, FormState, ValidationScope};
pub use ids::{CelebrityId, RequestId, SubscriptionId, UserId};
pub use marketplace::{MarketSnapshot, MarketView, Role};
pub use session::{AuthUser, Profile, Session, SessionUser, UserMetadata};
pub use view::{FlowSnapshot, ViewState, ViewStateMachine};

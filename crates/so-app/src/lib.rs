//! # so-app
//!
//! Use cases for Shoutout: the session bridge, the auth/profile flow
//! orchestrator, the marketplace orchestrator and the typed record stores
//! they read and write through.

pub mod stores;
pub mod usecases;

pub use stores::{MarketplaceStore, ProfileStore, TableNames};
pub use usecases::{
    AuthFlowError, AuthFlowOrchestrator, MarketplaceFlowError, MarketplaceOrchestrator,
    SessionBridge, SessionSubscription,
};
